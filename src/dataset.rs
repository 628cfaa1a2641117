//! Reading baseline polygons from text files.
//!
//! Every line of a page file holds one polygon `x1,y1;x2,y2;...;xn,yn`. In
//! article files blank lines separate the articles. List files (`.lst`) name
//! one page file per line.

use crate::evaluation::article::ArticlePage;
use crate::evaluation::Page;
use crate::polygon::Polygon;
use crate::utils::extension;
use anyhow::{anyhow, Result};
use log::{debug, warn};
use regex::Regex;
use std::fs::File;
use std::io::prelude::*;

lazy_static! {
    static ref POINT_REGEX: Regex =
        Regex::new(r"^\s*([+-]?\d+)\s*,\s*([+-]?\d+)\s*(?:,.*)?$").unwrap();
}

/// Outcome of loading a single page file.
#[derive(Debug, PartialEq, Eq)]
pub enum LoadedPolys {
    Polygons(Vec<Polygon>),
    /// the file holds no polygon at all
    Empty,
    /// at least one line couldn't be parsed
    Malformed,
}

/// Outcome of loading a single article file.
#[derive(Debug, PartialEq, Eq)]
pub enum LoadedArticles {
    Articles(Vec<Vec<Polygon>>),
    Empty,
    Malformed,
}

fn read_file(file_path: &str) -> Result<String> {
    let mut file =
        File::open(file_path).map_err(|err| anyhow!("couldn't open file {}: {}", file_path, err))?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

/// Parses a polygon given as `x1,y1;x2,y2;...;xn,yn`.
///
/// At least two points are required, coordinates beyond the second one of a
/// point are ignored.
pub fn parse_string(string_polygon: &str) -> Result<Polygon> {
    let points = string_polygon.split(';').collect::<Vec<&str>>();
    if points.len() < 2 {
        return Err(anyhow!("Wrong polygon string format: {}", string_polygon));
    }

    let mut polygon = Polygon::default();
    for point in points {
        let caps = POINT_REGEX
            .captures(point)
            .ok_or_else(|| anyhow!("Wrong point format: '{}'", point))?;
        let x = caps[1].parse::<i32>()?;
        let y = caps[2].parse::<i32>()?;
        polygon.add_point(x, y);
    }
    Ok(polygon)
}

/// Inverse of [`parse_string`].
pub fn poly_to_string(polygon: &Polygon) -> String {
    polygon
        .points()
        .map(|(x, y)| format!("{},{}", x, y))
        .collect::<Vec<String>>()
        .join(";")
}

/// Trimmed, non blank lines of a text file.
pub fn load_text_file(file_path: &str) -> Result<Vec<String>> {
    Ok(read_file(file_path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

fn parse_lines<'a>(
    file_path: &str,
    lines: impl Iterator<Item = &'a str>,
) -> Option<Vec<Polygon>> {
    let mut polygons = Vec::new();
    for (idx, line) in lines.enumerate() {
        match parse_string(line) {
            Ok(polygon) => polygons.push(polygon),
            Err(err) => {
                warn!("{}: polygon {} malformed: {}", file_path, idx + 1, err);
                return None;
            }
        }
    }
    Some(polygons)
}

/// Loads the polygons of a page file, one per non blank line.
pub fn get_polys_from_file(file_path: &str) -> Result<LoadedPolys> {
    let lines = load_text_file(file_path)?;
    if lines.is_empty() {
        debug!("{} holds no polygons", file_path);
        return Ok(LoadedPolys::Empty);
    }
    Ok(match parse_lines(file_path, lines.iter().map(String::as_str)) {
        Some(polygons) => LoadedPolys::Polygons(polygons),
        None => LoadedPolys::Malformed,
    })
}

/// Loads the articles of a page file, articles being separated by blank lines.
pub fn get_articles_from_file(file_path: &str) -> Result<LoadedArticles> {
    let content = read_file(file_path)?;
    let mut articles = Vec::new();
    let mut article = Vec::new();
    for line in content.lines().map(str::trim) {
        if line.is_empty() {
            if !article.is_empty() {
                articles.push(std::mem::take(&mut article));
            }
        } else {
            article.push(line);
        }
    }
    if !article.is_empty() {
        articles.push(article);
    }
    if articles.is_empty() {
        debug!("{} holds no articles", file_path);
        return Ok(LoadedArticles::Empty);
    }

    let mut res = Vec::with_capacity(articles.len());
    for article in articles {
        match parse_lines(file_path, article.into_iter()) {
            Some(polygons) => res.push(polygons),
            None => return Ok(LoadedArticles::Malformed),
        }
    }
    Ok(LoadedArticles::Articles(res))
}

/// Page files named by `arg`: a `.txt` file stands for itself, a `.lst` file
/// lists one page file per line.
pub fn resolve_file_list(arg: &str) -> Result<Vec<String>> {
    match extension(arg).as_str() {
        "txt" => Ok(vec![arg.to_string()]),
        "lst" => load_text_file(arg),
        _ => Err(anyhow!("{} is neither a txt nor a lst file", arg)),
    }
}

fn polys_or_skip(file_path: &str) -> Option<Vec<Polygon>> {
    match get_polys_from_file(file_path) {
        Ok(LoadedPolys::Polygons(polygons)) => Some(polygons),
        Ok(LoadedPolys::Empty) => Some(Vec::new()),
        Ok(LoadedPolys::Malformed) => {
            warn!("Error loading: {}, skipping.", file_path);
            None
        }
        Err(err) => {
            warn!("Error loading: {} ({}), skipping.", file_path, err);
            None
        }
    }
}

fn articles_or_skip(file_path: &str) -> Option<Vec<Vec<Polygon>>> {
    match get_articles_from_file(file_path) {
        Ok(LoadedArticles::Articles(articles)) => Some(articles),
        Ok(LoadedArticles::Empty) => Some(Vec::new()),
        Ok(LoadedArticles::Malformed) => {
            warn!("Error loading: {}, skipping.", file_path);
            None
        }
        Err(err) => {
            warn!("Error loading: {} ({}), skipping.", file_path, err);
            None
        }
    }
}

fn load_pairs<T>(
    list_truth: &[String],
    list_reco: &[String],
    load: impl Fn(&str) -> Option<T>,
) -> Result<Vec<(String, (T, T))>> {
    if list_truth.is_empty() || list_reco.is_empty() {
        return Err(anyhow!("Truth- and/or reco-file list empty."));
    }
    if list_truth.len() != list_reco.len() {
        return Err(anyhow!(
            "Same reco- and truth-list length required ({} vs {}).",
            list_reco.len(),
            list_truth.len()
        ));
    }

    let mut pages = Vec::with_capacity(list_truth.len());
    for (truth_path, reco_path) in list_truth.iter().zip(list_reco) {
        // a page is only evaluated if both of its files could be loaded
        if let (Some(truth), Some(reco)) = (load(truth_path.as_str()), load(reco_path.as_str())) {
            pages.push((truth_path.clone(), (truth, reco)));
        }
    }
    debug!("loaded {} of {} pages", pages.len(), list_truth.len());
    Ok(pages)
}

/// Loads the truth and reco polygons of every page, named by their truth
/// file. Pages with an unreadable or malformed file are skipped.
pub fn load_pages(list_truth: &[String], list_reco: &[String]) -> Result<Vec<(String, Page)>> {
    load_pairs(list_truth, list_reco, polys_or_skip)
}

/// Like [`load_pages`] for article files.
pub fn load_article_pages(
    list_truth: &[String],
    list_reco: &[String],
) -> Result<Vec<(String, ArticlePage)>> {
    load_pairs(list_truth, list_reco, articles_or_skip)
}

//! Evaluation of article groupings.
//!
//! An article is a group of baselines. Every reco article is compared with
//! every truth article on line level, the articles are then aligned one to one
//! on the F-measure of these comparisons. Tolerances of the truth lines are
//! always estimated on the whole page.

use super::measure::{reduce_ticks, BaselineMeasure};
use super::metrics::{f_measure, greedy_alignment, Alignment};
use super::{score_normalized, EvalConfig};
use crate::polygon::Polygon;
use crate::resample::norm_poly_dists;
use anyhow::Result;
use log::{debug, info};
use ndarray::Array2;
use rayon::prelude::*;
use serde::Serialize;
use std::ops::Range;

/// Truth and reco articles of a single page.
pub type ArticlePage = (Vec<Vec<Polygon>>, Vec<Vec<Polygon>>);

/// Article level results of a single page.
#[derive(Clone, Debug, Serialize)]
pub struct ArticleScore {
    /// 1 x #reco articles
    pub precision: Array2<f64>,
    /// 1 x #truth articles
    pub recall: Array2<f64>,
    /// row: reco article, col: truth article, score: F-measure of the pair
    pub alignments: Vec<Alignment>,
}

fn article_ranges(articles: &[Vec<Polygon>]) -> Vec<Range<usize>> {
    let mut start = 0;
    articles
        .iter()
        .map(|article| {
            let range = start..start + article.len();
            start = range.end;
            range
        })
        .collect()
}

/// Evaluates pages of articles and accumulates the results on article level
/// (a single tolerance tick).
#[derive(Clone, Debug)]
pub struct ArticleMeasureEval {
    config: EvalConfig,
    measure: BaselineMeasure,
}

impl ArticleMeasureEval {
    pub fn new(config: EvalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            measure: BaselineMeasure::new(None),
        })
    }

    pub fn measure(&self) -> &BaselineMeasure {
        &self.measure
    }

    pub fn into_measure(self) -> BaselineMeasure {
        self.measure
    }

    pub fn score_articles(
        &self,
        truth_articles: &[Vec<Polygon>],
        reco_articles: &[Vec<Polygon>],
    ) -> ArticleScore {
        let truth_ranges = article_ranges(truth_articles);
        let reco_ranges = article_ranges(reco_articles);
        let truth_norm = norm_poly_dists(&truth_articles.concat(), self.config.poly_tick_dist);
        let reco_norm = norm_poly_dists(&reco_articles.concat(), self.config.poly_tick_dist);
        let truth_tols = self.config.truth_line_tols(&truth_norm);
        let n_ticks = self.config.tolerance.n_ticks();
        let operating_tick = self.config.operating_tick;

        let shape = (reco_ranges.len(), truth_ranges.len());
        let mut precisions = Array2::<f64>::zeros(shape);
        let mut recalls = Array2::<f64>::zeros(shape);
        let mut f_measures = Array2::<f64>::zeros(shape);
        for (i, reco_range) in reco_ranges.iter().enumerate() {
            for (j, truth_range) in truth_ranges.iter().enumerate() {
                let score = score_normalized(
                    &truth_norm[truth_range.clone()],
                    &reco_norm[reco_range.clone()],
                    &truth_tols[truth_range.clone()],
                    n_ticks,
                );
                let precision = reduce_ticks(score.per_tick_precision().view(), operating_tick);
                let recall = reduce_ticks(score.per_tick_recall().view(), operating_tick);
                precisions[[i, j]] = precision;
                recalls[[i, j]] = recall;
                f_measures[[i, j]] = f_measure(precision, recall);
            }
        }

        let alignments = greedy_alignment(f_measures.view());
        let mut precision = Array2::<f64>::zeros((1, reco_ranges.len()));
        let mut recall = Array2::<f64>::zeros((1, truth_ranges.len()));
        for alignment in &alignments {
            precision[[0, alignment.row]] = precisions[[alignment.row, alignment.col]];
            recall[[0, alignment.col]] = recalls[[alignment.row, alignment.col]];
        }
        debug!(
            "aligned {} of {} reco to {} truth articles",
            alignments.len(),
            reco_ranges.len(),
            truth_ranges.len()
        );

        ArticleScore {
            precision,
            recall,
            alignments,
        }
    }

    /// Scores the articles of a single page and adds the results.
    pub fn calc_measure_for_page_articles(
        &mut self,
        truth_articles: &[Vec<Polygon>],
        reco_articles: &[Vec<Polygon>],
    ) -> ArticleScore {
        let score = self.score_articles(truth_articles, reco_articles);
        self.add_article_score(score.clone());
        score
    }

    pub fn add_article_score(&mut self, score: ArticleScore) {
        self.measure
            .add_per_dist_tol_tick_per_line_precision(score.precision);
        self.measure.add_per_dist_tol_tick_per_line_recall(score.recall);
    }

    /// Scores all pages in parallel; results are added in input order.
    pub fn evaluate_pages(&mut self, pages: &[ArticlePage]) {
        let n_pages = pages.len();
        let evaluator = &*self;
        let scores = measure_time!("evaluating article pages", || {
            pages
                .par_iter()
                .map(|(truth, reco)| evaluator.score_articles(truth, reco))
                .collect::<Vec<ArticleScore>>()
        });
        for score in scores {
            self.add_article_score(score);
        }
        info!(
            "evaluated articles of {} pages: P {:.4} R {:.4} F {:.4}",
            n_pages,
            self.measure.result().precision,
            self.measure.result().recall,
            self.measure.f_measure()
        );
    }
}

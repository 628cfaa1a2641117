extern crate log;
extern crate log4rs;

use anyhow::Result;
use baseline_measure::dataset::{load_article_pages, load_pages, resolve_file_list};
use baseline_measure::evaluation::article::ArticleMeasureEval;
use baseline_measure::evaluation::options::{build_app, EvalOptions};
use baseline_measure::evaluation::{BaselineMeasureEval, EvalConfig, Page};
use baseline_measure::measure_time;
use baseline_measure::report::{MeasureReport, Report};
use log::{info, warn};
use std::path::Path;

fn evaluate_lines(
    config: EvalConfig,
    files: &[String],
    pages: &[Page],
    threshold_tf: Option<f64>,
) -> Result<MeasureReport> {
    let mut eval = BaselineMeasureEval::new(config)?;
    eval.evaluate_pages(pages);
    Ok(MeasureReport::new(files, eval.measure(), threshold_tf))
}

fn run(opts: &EvalOptions) -> Result<Report> {
    let config = opts.eval_config()?;
    info!("evaluating with {:?}", config);
    let list_truth = resolve_file_list(opts.truth)?;
    let list_reco = resolve_file_list(opts.reco)?;

    if !opts.articles {
        let pages = measure_time!(
            "loading pages",
            || load_pages(&list_truth, &list_reco),
            LogType::Info
        )?;
        let (files, pages): (Vec<String>, Vec<Page>) = pages.into_iter().unzip();
        return Ok(Report {
            config,
            lines: evaluate_lines(config, &files, &pages, opts.threshold_tf)?,
            articles: None,
        });
    }

    let pages = measure_time!(
        "loading article pages",
        || load_article_pages(&list_truth, &list_reco),
        LogType::Info
    )?;
    let (files, article_pages): (Vec<String>, Vec<_>) = pages.into_iter().unzip();
    let line_pages = article_pages
        .iter()
        .map(|(truth, reco)| (truth.concat(), reco.concat()))
        .collect::<Vec<Page>>();
    let lines = evaluate_lines(config, &files, &line_pages, opts.threshold_tf)?;

    let mut article_eval = ArticleMeasureEval::new(config)?;
    article_eval.evaluate_pages(&article_pages);
    Ok(Report {
        config,
        lines,
        articles: Some(MeasureReport::new(
            &files,
            article_eval.measure(),
            opts.threshold_tf,
        )),
    })
}

fn main() -> Result<()> {
    let matches = build_app().get_matches();
    let opts = EvalOptions::new(&matches)?;
    if Path::new(opts.log_config).exists() {
        log4rs::init_file(opts.log_config, Default::default())?;
    } else {
        eprintln!("log config {} not found, logging disabled", opts.log_config);
    }

    let report = run(&opts)?;
    if report.lines.pages.is_empty() {
        warn!("no page could be evaluated");
    }
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }

    Ok(())
}

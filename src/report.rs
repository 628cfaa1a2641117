use crate::evaluation::measure::{BaselineMeasure, TrueFalseCounts};
use crate::evaluation::EvalConfig;
use itertools::izip;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Debug, Serialize)]
pub struct PageReport {
    pub file: String,
    pub precision: f64,
    pub recall: f64,
    pub f_measure: f64,
    /// reco lines: true / false positives
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypo_counts: Option<TrueFalseCounts>,
    /// truth lines: true positives / false negatives
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt_counts: Option<TrueFalseCounts>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MeasureReport {
    pub pages: Vec<PageReport>,
    pub precision: f64,
    pub recall: f64,
    pub f_measure: f64,
}

impl MeasureReport {
    /// Summary of `measure`, whose pages were added in the order of `files`.
    pub fn new(files: &[String], measure: &BaselineMeasure, threshold_tf: Option<f64>) -> Self {
        let result = measure.result();
        let n_pages = measure.n_pages();
        let hypo_counts: Vec<Option<TrueFalseCounts>> = match threshold_tf {
            Some(threshold) => measure
                .page_wise_true_false_counts_hypo(threshold)
                .into_iter()
                .map(Some)
                .collect(),
            None => vec![None; n_pages],
        };
        let gt_counts: Vec<Option<TrueFalseCounts>> = match threshold_tf {
            Some(threshold) => measure
                .page_wise_true_false_counts_gt(threshold)
                .into_iter()
                .map(Some)
                .collect(),
            None => vec![None; n_pages],
        };

        let pages = izip!(
            files,
            &result.page_wise_precision,
            &result.page_wise_recall,
            measure.page_wise_f_measure(),
            hypo_counts,
            gt_counts
        )
        .map(
            |(file, &precision, &recall, f_measure, hypo_counts, gt_counts)| PageReport {
                file: file.clone(),
                precision,
                recall,
                f_measure,
                hypo_counts,
                gt_counts,
            },
        )
        .collect();

        Self {
            pages,
            precision: result.precision,
            recall: result.recall,
            f_measure: measure.f_measure(),
        }
    }
}

impl fmt::Display for MeasureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for page in &self.pages {
            write!(
                f,
                "{}: P {:.4} R {:.4} F {:.4}",
                page.file, page.precision, page.recall, page.f_measure
            )?;
            if let (Some(hypo), Some(gt)) = (page.hypo_counts, page.gt_counts) {
                write!(
                    f,
                    " (TP {} FP {} FN {})",
                    hypo.n_true, hypo.n_false, gt.n_false
                )?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "Avg (over {} pages): P {:.4} R {:.4} F {:.4}",
            self.pages.len(),
            self.precision,
            self.recall,
            self.f_measure
        )
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub config: EvalConfig,
    pub lines: MeasureReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub articles: Option<MeasureReport>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Baselines")?;
        writeln!(f, "{}", self.lines)?;
        if let Some(articles) = &self.articles {
            writeln!(f)?;
            writeln!(f, "Articles")?;
            writeln!(f, "{}", articles)?;
        }
        Ok(())
    }
}

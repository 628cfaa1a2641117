use super::metrics::f_measure;
use itertools::izip;
use log::debug;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::Serialize;

/// Accumulated precision and recall values of all pages added so far.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MeasureResult {
    /// per page: #ticks x #truth lines
    pub page_wise_per_dist_tol_tick_per_line_recall: Vec<Array2<f64>>,
    pub page_wise_per_dist_tol_tick_recall: Vec<Array1<f64>>,
    pub page_wise_recall: Vec<f64>,
    pub recall: f64,
    /// per page: #ticks x #reco lines
    pub page_wise_per_dist_tol_tick_per_line_precision: Vec<Array2<f64>>,
    pub page_wise_per_dist_tol_tick_precision: Vec<Array1<f64>>,
    pub page_wise_precision: Vec<f64>,
    pub precision: f64,
}

/// Number of lines of a page scoring at least / below a threshold.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TrueFalseCounts {
    pub n_true: usize,
    pub n_false: usize,
}

/// Mean over the lines (columns) for every tick. A page without lines
/// scores 1 for every tick.
pub fn per_tick_mean(per_line: &Array2<f64>) -> Array1<f64> {
    per_line
        .mean_axis(Axis(1))
        .unwrap_or_else(|| Array1::ones(per_line.nrows()))
}

/// Reduces per tick values to a single one: the value at `operating_tick`
/// if given, the mean over all ticks otherwise.
pub fn reduce_ticks(per_tick: ArrayView1<f64>, operating_tick: Option<usize>) -> f64 {
    if let Some(value) = operating_tick.and_then(|tick| per_tick.get(tick)) {
        return *value;
    }
    per_tick.mean().unwrap_or(0.)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Append only accumulator of page results.
#[derive(Clone, Debug, Default)]
pub struct BaselineMeasure {
    result: MeasureResult,
    operating_tick: Option<usize>,
}

impl BaselineMeasure {
    pub fn new(operating_tick: Option<usize>) -> Self {
        Self {
            result: MeasureResult::default(),
            operating_tick,
        }
    }

    pub fn result(&self) -> &MeasureResult {
        &self.result
    }

    pub fn operating_tick(&self) -> Option<usize> {
        self.operating_tick
    }

    pub fn n_pages(&self) -> usize {
        self.result.page_wise_precision.len()
    }

    /// Adds the #ticks x #reco lines precision matrix of one page.
    pub fn add_per_dist_tol_tick_per_line_precision(&mut self, per_line: Array2<f64>) {
        let per_tick = per_tick_mean(&per_line);
        let page_value = reduce_ticks(per_tick.view(), self.operating_tick);
        debug!(
            "page {}: precision {:.4} over {} reco lines",
            self.result.page_wise_precision.len(),
            page_value,
            per_line.ncols()
        );

        let result = &mut self.result;
        result.page_wise_per_dist_tol_tick_per_line_precision.push(per_line);
        result.page_wise_per_dist_tol_tick_precision.push(per_tick);
        result.page_wise_precision.push(page_value);
        result.precision = mean(&result.page_wise_precision);
    }

    /// Adds the #ticks x #truth lines recall matrix of one page.
    pub fn add_per_dist_tol_tick_per_line_recall(&mut self, per_line: Array2<f64>) {
        let per_tick = per_tick_mean(&per_line);
        let page_value = reduce_ticks(per_tick.view(), self.operating_tick);
        debug!(
            "page {}: recall {:.4} over {} truth lines",
            self.result.page_wise_recall.len(),
            page_value,
            per_line.ncols()
        );

        let result = &mut self.result;
        result.page_wise_per_dist_tol_tick_per_line_recall.push(per_line);
        result.page_wise_per_dist_tol_tick_recall.push(per_tick);
        result.page_wise_recall.push(page_value);
        result.recall = mean(&result.page_wise_recall);
    }

    pub fn page_wise_f_measure(&self) -> Vec<f64> {
        izip!(&self.result.page_wise_precision, &self.result.page_wise_recall)
            .map(|(&precision, &recall)| f_measure(precision, recall))
            .collect()
    }

    pub fn f_measure(&self) -> f64 {
        f_measure(self.result.precision, self.result.recall)
    }

    /// True / false positives per page: reco lines whose precision reaches
    /// `threshold` count as true positives.
    pub fn page_wise_true_false_counts_hypo(&self, threshold: f64) -> Vec<TrueFalseCounts> {
        self.true_false_counts(
            &self.result.page_wise_per_dist_tol_tick_per_line_precision,
            threshold,
        )
    }

    /// True positives / false negatives per page: truth lines whose recall
    /// reaches `threshold` count as found.
    pub fn page_wise_true_false_counts_gt(&self, threshold: f64) -> Vec<TrueFalseCounts> {
        self.true_false_counts(
            &self.result.page_wise_per_dist_tol_tick_per_line_recall,
            threshold,
        )
    }

    fn true_false_counts(&self, pages: &[Array2<f64>], threshold: f64) -> Vec<TrueFalseCounts> {
        pages
            .iter()
            .map(|per_line| {
                let n_true = per_line
                    .axis_iter(Axis(1))
                    .filter(|line| reduce_ticks(line.view(), self.operating_tick) >= threshold)
                    .count();
                TrueFalseCounts {
                    n_true,
                    n_false: per_line.ncols() - n_true,
                }
            })
            .collect()
    }
}

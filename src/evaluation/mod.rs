pub mod article;
pub mod measure;
pub mod metrics;
pub mod options;

use crate::polygon::Polygon;
use crate::resample::norm_poly_dists;
use crate::tolerance::calc_tols;
use anyhow::{anyhow, Result};
use log::{debug, info};
use measure::{per_tick_mean, BaselineMeasure};
use metrics::{count_rel_hits, count_rel_hits_list, greedy_alignment};
use ndarray::{Array1, Array2, Array3, Axis};
use rayon::prelude::*;
use serde::Serialize;

/// Maximal interline distance considered by the dynamic tolerances.
pub const DEFAULT_MAX_D: f64 = 250.;
pub const DEFAULT_REL_TOL: f64 = 0.25;
pub const DEFAULT_POLY_TICK_DIST: u32 = 5;

/// Truth and reco baselines of a single page.
pub type Page = (Vec<Polygon>, Vec<Polygon>);

/// How the distance tolerances of the truth lines are chosen.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub enum ToleranceMode {
    /// The same ticks `min_tol..=max_tol` for every truth line.
    Fixed { min_tol: u32, max_tol: u32 },
    /// One tick per line, `rel_tol` times the estimated interline distance.
    Dynamic { rel_tol: f64, max_d: f64 },
}

impl ToleranceMode {
    /// Fixed tolerances, or dynamic ones if `min_tol` is negative.
    pub fn from_limits(min_tol: i64, max_tol: i64, rel_tol: f64) -> Result<Self> {
        if min_tol < 0 {
            return Ok(ToleranceMode::Dynamic {
                rel_tol,
                max_d: DEFAULT_MAX_D,
            });
        }
        if max_tol < min_tol {
            return Err(anyhow!(
                "min_tol ({}) can't exceed max_tol ({})",
                min_tol,
                max_tol
            ));
        }
        if max_tol > u32::MAX as i64 {
            return Err(anyhow!("max_tol {} is too large", max_tol));
        }
        Ok(ToleranceMode::Fixed {
            min_tol: min_tol as u32,
            max_tol: max_tol as u32,
        })
    }

    pub fn n_ticks(&self) -> usize {
        match *self {
            ToleranceMode::Fixed { min_tol, max_tol } => {
                max_tol.saturating_sub(min_tol) as usize + 1
            }
            ToleranceMode::Dynamic { .. } => 1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct EvalConfig {
    pub tolerance: ToleranceMode,
    /// desired distance of consecutive baseline points after resampling
    pub poly_tick_dist: u32,
    /// tick reported as page value; the mean over all ticks if not set
    pub operating_tick: Option<usize>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            tolerance: ToleranceMode::Dynamic {
                rel_tol: DEFAULT_REL_TOL,
                max_d: DEFAULT_MAX_D,
            },
            poly_tick_dist: DEFAULT_POLY_TICK_DIST,
            operating_tick: None,
        }
    }
}

impl EvalConfig {
    pub fn validate(&self) -> Result<()> {
        match self.tolerance {
            ToleranceMode::Fixed { min_tol, max_tol } if min_tol > max_tol => {
                return Err(anyhow!(
                    "min_tol ({}) can't exceed max_tol ({})",
                    min_tol,
                    max_tol
                ));
            }
            ToleranceMode::Dynamic { rel_tol, .. } if !(rel_tol > 0. && rel_tol <= 1.) => {
                return Err(anyhow!("rel_tol has to be in the range (0,1], got {}", rel_tol));
            }
            ToleranceMode::Dynamic { max_d, .. } if !(max_d > 0.) => {
                return Err(anyhow!("max_d has to be positive, got {}", max_d));
            }
            _ => {}
        }
        if self.poly_tick_dist == 0 {
            return Err(anyhow!("poly_tick_dist has to be positive"));
        }
        if let Some(tick) = self.operating_tick {
            let n_ticks = self.tolerance.n_ticks();
            if tick >= n_ticks {
                return Err(anyhow!(
                    "operating tick {} out of range, only {} tolerance ticks",
                    tick,
                    n_ticks
                ));
            }
        }
        Ok(())
    }

    /// Tolerance values per (normalized) truth line, ascending per line.
    pub fn truth_line_tols(&self, truth_norm: &[Polygon]) -> Vec<Vec<f64>> {
        match self.tolerance {
            ToleranceMode::Fixed { min_tol, max_tol } => {
                let ticks = (min_tol..=max_tol).map(f64::from).collect::<Vec<f64>>();
                vec![ticks; truth_norm.len()]
            }
            ToleranceMode::Dynamic { rel_tol, max_d } => {
                calc_tols(truth_norm, self.poly_tick_dist, max_d, rel_tol)
                    .into_iter()
                    .map(|tol| vec![tol])
                    .collect()
            }
        }
    }
}

/// Line level results of a single page.
#[derive(Clone, Debug, Serialize)]
pub struct PageScore {
    /// #ticks x #reco lines
    pub precision: Array2<f64>,
    /// #ticks x #truth lines
    pub recall: Array2<f64>,
}

impl PageScore {
    pub fn per_tick_precision(&self) -> Array1<f64> {
        per_tick_mean(&self.precision)
    }

    pub fn per_tick_recall(&self) -> Array1<f64> {
        per_tick_mean(&self.recall)
    }
}

/// Scores already normalized polygons given the tolerances of every truth line.
pub fn score_normalized(
    truth_norm: &[Polygon],
    reco_norm: &[Polygon],
    truth_tols: &[Vec<f64>],
    n_ticks: usize,
) -> PageScore {
    PageScore {
        precision: calc_precision(truth_norm, reco_norm, truth_tols, n_ticks),
        recall: calc_recall(truth_norm, reco_norm, truth_tols, n_ticks),
    }
}

/// Precision of every reco line for every tick.
///
/// For each tick the reco lines are greedily aligned to the truth lines on
/// their relative hits; reco lines left without a partner score 0.
pub fn calc_precision(
    truth_norm: &[Polygon],
    reco_norm: &[Polygon],
    truth_tols: &[Vec<f64>],
    n_ticks: usize,
) -> Array2<f64> {
    let mut rel_hits = Array3::<f64>::zeros((n_ticks, reco_norm.len(), truth_norm.len()));
    for (i, poly_reco) in reco_norm.iter().enumerate() {
        for (j, (poly_truth, tols)) in truth_norm.iter().zip(truth_tols).enumerate() {
            let hits = count_rel_hits(poly_reco, poly_truth, tols);
            for (tick, hit) in hits.into_iter().enumerate().take(n_ticks) {
                rel_hits[[tick, i, j]] = hit;
            }
        }
    }

    let mut precision = Array2::<f64>::zeros((n_ticks, reco_norm.len()));
    for (tick, hits) in rel_hits.axis_iter(Axis(0)).enumerate() {
        for alignment in greedy_alignment(hits) {
            precision[[tick, alignment.row]] = alignment.score;
        }
    }
    precision
}

/// Recall of every truth line for every tick, counted against the points of
/// all reco lines.
pub fn calc_recall(
    truth_norm: &[Polygon],
    reco_norm: &[Polygon],
    truth_tols: &[Vec<f64>],
    n_ticks: usize,
) -> Array2<f64> {
    let mut recall = Array2::<f64>::zeros((n_ticks, truth_norm.len()));
    for (j, (poly_truth, tols)) in truth_norm.iter().zip(truth_tols).enumerate() {
        let hits = count_rel_hits_list(poly_truth, reco_norm, tols);
        for (tick, hit) in hits.into_iter().enumerate().take(n_ticks) {
            recall[[tick, j]] = hit;
        }
    }
    recall
}

/// Evaluates pages of baselines and accumulates their results.
#[derive(Clone, Debug)]
pub struct BaselineMeasureEval {
    config: EvalConfig,
    measure: BaselineMeasure,
}

impl BaselineMeasureEval {
    pub fn new(config: EvalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            measure: BaselineMeasure::new(config.operating_tick),
        })
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn measure(&self) -> &BaselineMeasure {
        &self.measure
    }

    pub fn into_measure(self) -> BaselineMeasure {
        self.measure
    }

    /// Scores a single page without touching the accumulated results.
    pub fn score_page(&self, polys_truth: &[Polygon], polys_reco: &[Polygon]) -> PageScore {
        let truth_norm = norm_poly_dists(polys_truth, self.config.poly_tick_dist);
        let reco_norm = norm_poly_dists(polys_reco, self.config.poly_tick_dist);
        let truth_tols = self.config.truth_line_tols(&truth_norm);
        debug!(
            "scoring {} reco against {} truth lines",
            reco_norm.len(),
            truth_norm.len()
        );
        score_normalized(
            &truth_norm,
            &reco_norm,
            &truth_tols,
            self.config.tolerance.n_ticks(),
        )
    }

    /// Scores a single page and adds its results.
    pub fn calc_measure_for_page_baseline_polys(
        &mut self,
        polys_truth: &[Polygon],
        polys_reco: &[Polygon],
    ) -> PageScore {
        let score = self.score_page(polys_truth, polys_reco);
        self.add_page_score(score.clone());
        score
    }

    pub fn add_page_score(&mut self, score: PageScore) {
        self.measure
            .add_per_dist_tol_tick_per_line_precision(score.precision);
        self.measure.add_per_dist_tol_tick_per_line_recall(score.recall);
    }

    /// Scores all pages in parallel; results are added in input order.
    pub fn evaluate_pages(&mut self, pages: &[Page]) {
        let n_pages = pages.len();
        let evaluator = &*self;
        let scores = measure_time!("evaluating pages", || {
            pages
                .par_iter()
                .map(|(truth, reco)| evaluator.score_page(truth, reco))
                .collect::<Vec<PageScore>>()
        });
        for score in scores {
            self.add_page_score(score);
        }
        info!(
            "evaluated {} pages: P {:.4} R {:.4} F {:.4}",
            n_pages,
            self.measure.result().precision,
            self.measure.result().recall,
            self.measure.f_measure()
        );
    }
}

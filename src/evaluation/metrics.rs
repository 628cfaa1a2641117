use crate::polygon::Polygon;
use log::trace;
use ndarray::ArrayView2;
use serde::Serialize;

/// Match picked by [`greedy_alignment`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Alignment {
    pub row: usize,
    pub col: usize,
    pub score: f64,
}

/// Credit a point at (Manhattan) distance `min_dist` earns for tolerance `tol`.
///
/// Full credit up to `tol`, decaying linearly to zero at `3 * tol`.
pub fn credit(min_dist: f64, tol: f64) -> f64 {
    if min_dist <= tol {
        1.
    } else if tol < min_dist && min_dist < 3. * tol {
        (3. * tol - min_dist) / (2. * tol)
    } else {
        0.
    }
}

/// True if the bounding boxes of both polygons are too far apart for any
/// point pair to earn credit at tolerances up to `max_tol`.
pub fn is_out_of_reach(to_count: &Polygon, reference: &Polygon, max_tol: f64) -> bool {
    let intersection = to_count
        .bounding_box()
        .intersection(&reference.bounding_box());
    (intersection.width.min(intersection.height) as f64) < -3. * max_tol
}

fn update_min_dists(
    to_count: &Polygon,
    reference: &Polygon,
    first_tol: f64,
    min_dists: &mut [f64],
) {
    for (min_dist, (x, y)) in min_dists.iter_mut().zip(to_count.points()) {
        for (ref_x, ref_y) in reference.points() {
            let dist = (x as i64 - ref_x as i64).abs() + (y as i64 - ref_y as i64).abs();
            let dist = dist as f64;
            if dist < *min_dist {
                *min_dist = dist;
            }
            if *min_dist <= first_tol {
                break;
            }
        }
    }
}

fn rel_hits_from_min_dists(min_dists: &[f64], tols: &[f64]) -> Vec<f64> {
    let mut rel_hits = vec![0.; tols.len()];
    if min_dists.is_empty() {
        return rel_hits;
    }
    for &min_dist in min_dists {
        for (hits, &tol) in rel_hits.iter_mut().zip(tols.iter()) {
            *hits += credit(min_dist, tol);
        }
    }
    let n_points = min_dists.len() as f64;
    for hits in rel_hits.iter_mut() {
        *hits /= n_points;
    }
    rel_hits
}

/// Relative hits of the points of `to_count` against the points of
/// `reference`, one value in `[0, 1]` per tolerance.
///
/// `tols` is expected in ascending order, its last value decides whether
/// the polygons are close enough to be compared at all.
pub fn count_rel_hits(to_count: &Polygon, reference: &Polygon, tols: &[f64]) -> Vec<f64> {
    let (first_tol, max_tol) = match (tols.first(), tols.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Vec::new(),
    };
    if is_out_of_reach(to_count, reference, max_tol) {
        trace!("bounding boxes too far apart, skipping point comparison");
        return vec![0.; tols.len()];
    }

    let mut min_dists = vec![f64::INFINITY; to_count.n_points()];
    update_min_dists(to_count, reference, first_tol, &mut min_dists);
    rel_hits_from_min_dists(&min_dists, tols)
}

/// Like [`count_rel_hits`], but the nearest point is searched among the points
/// of all `references`. References out of reach are skipped one by one.
pub fn count_rel_hits_list(
    to_count: &Polygon,
    references: &[Polygon],
    tols: &[f64],
) -> Vec<f64> {
    let (first_tol, max_tol) = match (tols.first(), tols.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Vec::new(),
    };

    let mut min_dists = vec![f64::INFINITY; to_count.n_points()];
    for reference in references {
        if is_out_of_reach(to_count, reference, max_tol) {
            continue;
        }
        update_min_dists(to_count, reference, first_tol, &mut min_dists);
    }
    rel_hits_from_min_dists(&min_dists, tols)
}

/// Greedy one-to-one assignment of rows to columns.
///
/// Repeatedly takes the largest remaining score (first one in row-major
/// order on ties) and blocks its row and column. Not an optimal assignment.
pub fn greedy_alignment(scores: ArrayView2<f64>) -> Vec<Alignment> {
    let mut scores = scores.to_owned();
    let mut alignments = Vec::with_capacity(scores.nrows().min(scores.ncols()));

    loop {
        let mut best: Option<((usize, usize), f64)> = None;
        for (idx, &score) in scores.indexed_iter() {
            if score.is_nan() {
                continue;
            }
            if best.map_or(true, |(_, max)| score > max) {
                best = Some((idx, score));
            }
        }
        let ((row, col), score) = match best {
            Some(best) if best.1 >= 0. => best,
            _ => break,
        };
        alignments.push(Alignment { row, col, score });
        scores.row_mut(row).fill(-1.);
        scores.column_mut(col).fill(-1.);
    }
    alignments
}

/// Harmonic mean of precision and recall, 0 if both are 0.
pub fn f_measure(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0. {
        0.
    } else {
        2. * precision * recall / (precision + recall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < f64::EPSILON
    }

    fn line(points: &[(i32, i32)]) -> Polygon {
        Polygon::from_points(points)
    }

    #[test]
    fn credit_band() {
        assert!(close(credit(5., 5.), 1.));
        assert!(close(credit(5., 4.), 0.875));
        assert!(close(credit(12., 4.), 0.));
        assert!(close(credit(0., 0.), 1.));
        assert!(close(credit(1., 0.), 0.));
    }

    #[test]
    fn count_rel_hits_at_tolerance_boundary() {
        let reco = line(&[(0, 0), (10, 0)]);
        let truth = line(&[(0, 5), (10, 5)]);
        assert_eq!(count_rel_hits(&reco, &truth, &[5.]), vec![1.]);
        assert_eq!(count_rel_hits(&reco, &truth, &[4.]), vec![0.875]);
    }

    #[test]
    fn count_rel_hits_multiple_tolerances() {
        let reco = line(&[(0, 0), (10, 0)]);
        let truth = line(&[(0, 5), (10, 5)]);
        let hits = count_rel_hits(&reco, &truth, &[1., 2., 4., 5., 6.]);
        assert_eq!(hits.len(), 5);
        assert!(close(hits[0], 0.));
        assert!(close(hits[1], 0.25));
        assert!(close(hits[2], 0.875));
        assert!(close(hits[3], 1.));
        assert!(close(hits[4], 1.));
    }

    #[test]
    fn count_rel_hits_self_similarity() {
        let polys = [
            line(&[(3, 4)]),
            line(&[(0, 0), (5, 0), (10, 2), (15, 7)]),
            line(&[(100, 20), (90, 40)]),
        ];
        for poly in &polys {
            for hit in count_rel_hits(poly, poly, &[0., 1., 10.]) {
                assert!(close(hit, 1.));
            }
        }
    }

    #[test]
    fn count_rel_hits_is_monotone_in_tolerance() {
        let reco = line(&[(0, 0), (5, 1), (10, 3), (15, 8), (20, 12)]);
        let truth = line(&[(0, 6), (10, 6), (20, 6)]);
        let tols = (0..30).map(|t| t as f64).collect::<Vec<f64>>();
        let hits = count_rel_hits(&reco, &truth, &tols);
        for pair in hits.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert!(close(*hits.last().unwrap(), 1.));
    }

    #[test]
    fn count_rel_hits_rejects_far_polygons() {
        let reco = line(&[(0, 0), (10, 0)]);
        let truth = line(&[(0, 100), (10, 100)]);
        assert!(is_out_of_reach(&reco, &truth, 5.));
        assert_eq!(count_rel_hits(&reco, &truth, &[1., 5.]), vec![0., 0.]);

        // gap of 14 < 3 * 5, compared point by point
        let near = line(&[(0, 14), (10, 14)]);
        assert!(!is_out_of_reach(&reco, &near, 5.));
        assert_eq!(count_rel_hits(&reco, &near, &[5.]), vec![(15. - 14.) / 10.]);
    }

    #[test]
    fn count_rel_hits_degenerate_inputs() {
        let reco = line(&[(0, 0), (10, 0)]);
        assert!(count_rel_hits(&reco, &reco, &[]).is_empty());
        assert_eq!(count_rel_hits(&Polygon::default(), &reco, &[5.]), vec![0.]);
        assert_eq!(count_rel_hits(&reco, &Polygon::default(), &[5.]), vec![0.]);
    }

    #[test]
    fn count_rel_hits_list_uses_nearest_reference() {
        let truth = line(&[(0, 0), (10, 0), (20, 0)]);
        let recos = vec![
            line(&[(0, 2), (10, 2)]),
            line(&[(20, 8), (30, 8)]),
            line(&[(500, 500), (600, 500)]),
        ];
        // second reco is out of reach at 2, (20,0) falls back to (10,2)
        let hits = count_rel_hits_list(&truth, &recos, &[2.]);
        assert!(close(hits[0], 2. / 3.));

        let hits = count_rel_hits_list(&truth, &recos, &[4.]);
        assert!(close(hits[0], (1. + 1. + 0.5) / 3.));
    }

    #[test]
    fn count_rel_hits_list_all_rejected() {
        let truth = line(&[(0, 0), (10, 0)]);
        let recos = vec![line(&[(500, 500), (600, 500)])];
        assert_eq!(count_rel_hits_list(&truth, &recos, &[5., 10.]), vec![0., 0.]);
        assert_eq!(count_rel_hits_list(&truth, &[], &[5.]), vec![0.]);
    }

    #[test]
    fn greedy_alignment_is_greedy() {
        let scores = arr2(&[[0.9, 0.8], [0.85, 0.1]]);
        let alignments = greedy_alignment(scores.view());
        assert_eq!(
            alignments,
            vec![
                Alignment {
                    row: 0,
                    col: 0,
                    score: 0.9
                },
                Alignment {
                    row: 1,
                    col: 1,
                    score: 0.1
                }
            ]
        );
    }

    #[test]
    fn greedy_alignment_breaks_ties_row_major() {
        let scores = Array2::from_elem((2, 2), 0.5);
        let alignments = greedy_alignment(scores.view());
        assert_eq!(alignments.len(), 2);
        assert_eq!((alignments[0].row, alignments[0].col), (0, 0));
        assert_eq!((alignments[1].row, alignments[1].col), (1, 1));
        assert_eq!(alignments, greedy_alignment(scores.view()));
    }

    #[test]
    fn greedy_alignment_never_reuses_indices() {
        let scores = arr2(&[[0.1, 0.7], [0.3, 0.9], [0.0, 0.2]]);
        let alignments = greedy_alignment(scores.view());
        assert_eq!(alignments.len(), 2);
        assert_eq!((alignments[0].row, alignments[0].col), (1, 1));
        assert_eq!((alignments[1].row, alignments[1].col), (0, 0));
        let mut rows = alignments.iter().map(|a| a.row).collect::<Vec<_>>();
        let mut cols = alignments.iter().map(|a| a.col).collect::<Vec<_>>();
        rows.dedup();
        cols.dedup();
        assert_eq!(rows.len(), 2);
        assert_eq!(cols.len(), 2);
    }

    #[test]
    fn greedy_alignment_matches_zero_scores() {
        let alignments = greedy_alignment(arr2(&[[0., 0.]]).view());
        assert_eq!(
            alignments,
            vec![Alignment {
                row: 0,
                col: 0,
                score: 0.
            }]
        );
    }

    #[test]
    fn greedy_alignment_of_empty_matrix() {
        let scores = Array2::<f64>::zeros((0, 3));
        assert!(greedy_alignment(scores.view()).is_empty());
    }

    #[test]
    fn f_measure_boundaries() {
        assert!(close(f_measure(0., 0.), 0.));
        assert!(close(f_measure(1., 1.), 1.));
        assert!(close(f_measure(0.5, 0.5), 0.5));
        assert!(close(f_measure(1., 0.5), 2. / 3.));
    }
}

//! Per baseline tolerances derived from the spacing of neighbouring
//! ground truth baselines.
//!
//! For every truth line the closest other truth line lying next to it (i.e.
//! overlapping it along the reading direction) is searched. The perpendicular
//! distance to it approximates the interline distance, a fraction of which is
//! used as the tolerance of that line.

use crate::polygon::{Polygon, Rectangle};
use crate::regression::calc_reg_line_stats;
use log::debug;

/// Manhattan distance of `point` to the rectangle `bb` (0 if inside).
pub fn get_dist_fast(point: (i32, i32), bb: &Rectangle) -> f64 {
    let (x, y) = (point.0 as f64, point.1 as f64);
    let (left, top) = (bb.x as f64, bb.y as f64);
    let right = left + bb.width as f64;
    let bottom = top + bb.height as f64;

    let mut dist = 0.;
    if x < left {
        dist += left - x;
    }
    if x > right {
        dist += x - right;
    }
    if y < top {
        dist += top - y;
    }
    if y > bottom {
        dist += y - bottom;
    }
    dist
}

/// Component of `p1 - p2` along the orientation vector (upward pointing y).
pub fn get_in_dist(p1: (i32, i32), p2: (i32, i32), or_vec_x: f64, or_vec_y: f64) -> f64 {
    let diff_x = p1.0 as f64 - p2.0 as f64;
    let diff_y = -(p1.1 as f64) + p2.1 as f64;
    diff_x * or_vec_x + diff_y * or_vec_y
}

/// Component of `p1 - p2` perpendicular to the orientation vector.
pub fn get_off_dist(p1: (i32, i32), p2: (i32, i32), or_vec_x: f64, or_vec_y: f64) -> f64 {
    let diff_x = p1.0 as f64 - p2.0 as f64;
    let diff_y = -(p1.1 as f64) + p2.1 as f64;
    diff_x * or_vec_y - diff_y * or_vec_x
}

/// Calculates the tolerance of every (normalized) truth baseline.
///
/// * `tick_dist` - point distance the polygons were normalized to
/// * `max_d` - maximal interline distance taken into account
/// * `rel_tol` - fraction of the interline distance used as tolerance
pub fn calc_tols(
    poly_truth_norm: &[Polygon],
    tick_dist: u32,
    max_d: f64,
    rel_tol: f64,
) -> Vec<f64> {
    let mut tols = Vec::with_capacity(poly_truth_norm.len());

    for (idx_a, poly_a) in poly_truth_norm.iter().enumerate() {
        let (pt_a1, pt_a2) = match (poly_a.first(), poly_a.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                tols.push(0.);
                continue;
            }
        };
        let angle = calc_reg_line_stats(poly_a).0;
        let (or_vec_x, or_vec_y) = (angle.cos(), angle.sin());
        let mut dist = max_d;

        for p_a in poly_a.points() {
            for (idx_b, poly_b) in poly_truth_norm.iter().enumerate() {
                if idx_b == idx_a || poly_b.is_empty() {
                    continue;
                }
                if get_dist_fast(p_a, &poly_b.bounding_box()) > dist {
                    continue;
                }
                if !overlaps_along_line(pt_a1, pt_a2, poly_b, or_vec_x, or_vec_y) {
                    continue;
                }
                for p_b in poly_b.points() {
                    if get_in_dist(p_a, p_b, or_vec_x, or_vec_y).abs() <= 2. * tick_dist as f64 {
                        dist = dist.min(get_off_dist(p_a, p_b, or_vec_x, or_vec_y).abs());
                    }
                }
            }
        }

        tols.push(if dist < max_d { dist } else { 0. });
    }

    let (sum_val, cnt) = tols
        .iter()
        .filter(|&&tol| tol != 0.)
        .fold((0., 0), |(sum, cnt), tol| (sum + tol, cnt + 1));
    let mean_val = if cnt != 0 { sum_val / cnt as f64 } else { max_d };
    debug!(
        "estimated {} of {} interline distances, mean {:.2}",
        cnt,
        tols.len(),
        mean_val
    );

    tols.iter()
        .map(|&tol| {
            let tol = if tol == 0. { mean_val } else { tol };
            tol * rel_tol
        })
        .collect()
}

// false if `poly_b` lies completely before or after the line `a1 -> a2`
fn overlaps_along_line(
    pt_a1: (i32, i32),
    pt_a2: (i32, i32),
    poly_b: &Polygon,
    or_vec_x: f64,
    or_vec_y: f64,
) -> bool {
    let (pt_b1, pt_b2) = match (poly_b.first(), poly_b.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return false,
    };
    let in_dists = [
        get_in_dist(pt_a1, pt_b1, or_vec_x, or_vec_y),
        get_in_dist(pt_a1, pt_b2, or_vec_x, or_vec_y),
        get_in_dist(pt_a2, pt_b1, or_vec_x, or_vec_y),
        get_in_dist(pt_a2, pt_b2, or_vec_x, or_vec_y),
    ];
    let all_before = in_dists.iter().all(|&d| d < 0.);
    let all_after = in_dists.iter().all(|&d| d > 0.);
    !(all_before || all_after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resample::norm_poly_dists;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn dist_fast_to_rectangle() {
        let bb = Rectangle::new(10, 10, 20, 5);
        assert!(close(get_dist_fast((15, 12), &bb), 0.));
        assert!(close(get_dist_fast((5, 12), &bb), 5.));
        assert!(close(get_dist_fast((35, 20), &bb), 10.));
        assert!(close(get_dist_fast((0, 0), &bb), 20.));
    }

    #[test]
    fn in_and_off_dist_for_horizontal_orientation() {
        // orientation angle 0 → (1, 0)
        assert!(close(get_in_dist((10, 0), (4, 3), 1., 0.), 6.));
        assert!(close(get_off_dist((10, 0), (4, 3), 1., 0.), -3.));
    }

    #[test]
    fn tolerances_of_equidistant_lines() {
        let polys = vec![
            Polygon::from_points(&[(0, 100), (400, 100)]),
            Polygon::from_points(&[(0, 140), (400, 140)]),
            Polygon::from_points(&[(0, 180), (400, 180)]),
        ];
        let normed = norm_poly_dists(&polys, 5);
        let tols = calc_tols(&normed, 5, 250., 0.25);
        assert_eq!(tols.len(), 3);
        for tol in tols {
            assert!(close(tol, 10.));
        }
    }

    #[test]
    fn lines_without_neighbours_get_mean_tolerance() {
        let polys = vec![
            Polygon::from_points(&[(0, 100), (400, 100)]),
            Polygon::from_points(&[(0, 160), (400, 160)]),
            // far right, no overlap along the reading direction
            Polygon::from_points(&[(2000, 100), (2400, 100)]),
        ];
        let normed = norm_poly_dists(&polys, 5);
        let tols = calc_tols(&normed, 5, 250., 0.5);
        assert!(close(tols[0], 30.));
        assert!(close(tols[1], 30.));
        assert!(close(tols[2], 30.));
    }

    #[test]
    fn only_points_next_to_each_other_count() {
        let polys = vec![
            Polygon::from_points(&[(0, 100), (400, 100)]),
            // starts 40 px below the end of the first line and comes much
            // closer to it further right, beyond its end
            Polygon::from_points(&[(390, 140), (410, 140), (600, 140), (600, 105), (800, 105)]),
        ];
        let normed = norm_poly_dists(&polys, 5);
        let tols = calc_tols(&normed, 5, 250., 0.25);
        assert!(close(tols[0], 10.));
    }

    #[test]
    fn single_line_gets_max_distance() {
        let normed = norm_poly_dists(&[Polygon::from_points(&[(0, 0), (100, 0)])], 5);
        let tols = calc_tols(&normed, 5, 250., 0.25);
        assert_eq!(tols.len(), 1);
        assert!(close(tols[0], 62.5));
    }

    #[test]
    fn empty_truth_has_no_tolerances() {
        assert!(calc_tols(&[], 5, 250., 0.25).is_empty());
    }
}

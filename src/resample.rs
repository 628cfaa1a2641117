//! Resampling of baseline polygons to a common point density.
//!
//! Baselines come with arbitrary sampling (two end points for a straight
//! line, dozens of points for a curved one). Before scoring, every polygon is
//! first blown up to a pixel-connected chain and afterwards thinned out to
//! points roughly `des_dist` pixels apart.

use crate::polygon::Polygon;
use log::{debug, warn};

/// Polygons with at most this many points are left untouched by [`thin_out`].
pub const MIN_POINTS: usize = 20;
/// Bounding boxes larger than this are treated as corrupt input.
pub const MAX_EXTENT: i32 = 100_000;

/// Inserts the integer points lying on every edge of `polygon`.
///
/// The points are generated along the dominant axis of each edge, the other
/// coordinate is interpolated and rounded half away from zero.
pub fn blow_up(polygon: &Polygon) -> Polygon {
    let n_points = polygon.n_points();
    if n_points <= 1 {
        return polygon.points().collect();
    }

    let mut res = Polygon::default();
    for i in 1..n_points {
        let (x1, y1) = polygon.point(i - 1);
        let (x2, y2) = polygon.point(i);
        let is_last = i == n_points - 1;
        let diff_x = (x2 as i64 - x1 as i64).abs();
        let diff_y = (y2 as i64 - y1 as i64).abs();

        // coincident points
        if diff_x.max(diff_y) < 1 {
            if is_last {
                res.add_point(x2, y2);
            }
            continue;
        }

        res.add_point(x1, y1);
        if diff_x >= diff_y {
            for j in 1..diff_x {
                let xn = if x1 < x2 { x1 as i64 + j } else { x1 as i64 - j };
                let yn = interpolate(
                    y1,
                    xn - x1 as i64,
                    y2 as i64 - y1 as i64,
                    x2 as i64 - x1 as i64,
                );
                res.add_point(xn as i32, yn as i32);
            }
        } else {
            for j in 1..diff_y {
                let yn = if y1 < y2 { y1 as i64 + j } else { y1 as i64 - j };
                let xn = interpolate(
                    x1,
                    yn - y1 as i64,
                    x2 as i64 - x1 as i64,
                    y2 as i64 - y1 as i64,
                );
                res.add_point(xn as i32, yn as i32);
            }
        }
        if is_last {
            res.add_point(x2, y2);
        }
    }
    res
}

// start + offset * num / den, rounded half away from zero
fn interpolate(start: i32, offset: i64, num: i64, den: i64) -> f64 {
    (start as f64 + (offset * num) as f64 / den as f64).round()
}

/// Subsamples a (blown up) polygon so that consecutive points are about
/// `des_dist` points apart, keeping at least [`MIN_POINTS`] points and always
/// keeping the last one.
pub fn thin_out(polygon: &Polygon, des_dist: u32) -> Polygon {
    let n_points = polygon.n_points();
    if n_points <= MIN_POINTS || des_dist == 0 {
        return polygon.clone();
    }

    let dist = n_points - 1;
    let des_pts = MIN_POINTS.max(dist / des_dist as usize + 1);
    let step = dist as f64 / (des_pts - 1) as f64;

    let mut res = Polygon::default();
    for i in 0..des_pts - 1 {
        let idx = (i as f64 * step) as usize;
        let (x, y) = polygon.point(idx);
        res.add_point(x, y);
    }
    let (x, y) = polygon.point(n_points - 1);
    res.add_point(x, y);
    res
}

/// Normalizes every polygon of `polys` to points about `des_dist` apart.
///
/// The returned polygons already carry their bounding box.
pub fn norm_poly_dists(polys: &[Polygon], des_dist: u32) -> Vec<Polygon> {
    polys
        .iter()
        .map(|poly| {
            let bb = poly.bounding_box();
            let normed = if bb.width > MAX_EXTENT || bb.height > MAX_EXTENT {
                warn!(
                    "polygon with bounding box {}x{} exceeds {} px, replacing it by a single point",
                    bb.width, bb.height, MAX_EXTENT
                );
                Polygon::from_points(&[(0, 0)])
            } else {
                thin_out(&blow_up(poly), des_dist)
            };
            normed.bounding_box();
            debug!(
                "normalized polygon from {} to {} points",
                poly.n_points(),
                normed.n_points()
            );
            normed
        })
        .collect()
}

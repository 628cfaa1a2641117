use crate::polygon::Polygon;
use log::warn;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

const MIN_DET: f64 = 1e-9;

/// Least squares fit of `y = intercept + slope * x`.
///
/// Returns `(intercept, slope)`. A numerically unstable system yields
/// `(0.0, 0.0)`.
pub fn calc_line(x_points: &[f64], y_points: &[f64]) -> (f64, f64) {
    let n = x_points.len() as f64;
    let (sum_x, sum_xx, sum_y, sum_xy) = x_points.iter().zip(y_points.iter()).fold(
        (0., 0., 0., 0.),
        |(sx, sxx, sy, sxy), (&x, &y)| (sx + x, sxx + x * x, sy + y, sxy + x * y),
    );

    let det = n * sum_xx - sum_x * sum_x;
    if det < MIN_DET {
        warn!("linear regression is numerically unstable (det = {})", det);
        return (0., 0.);
    }
    let intercept = (sum_xx * sum_y - sum_x * sum_xy) / det;
    let slope = (n * sum_xy - sum_x * sum_y) / det;
    (intercept, slope)
}

/// Direction angle of a baseline and the intercept of its regression line.
///
/// The fit is done with negated y coordinates so the angle is measured
/// counter clockwise in the usual upward pointing frame. The angle lies in
/// `[0, 2π)` and points from the first towards the last point of the
/// baseline (vertical baselines always get `π/2`).
pub fn calc_reg_line_stats(poly: &Polygon) -> (f64, f64) {
    let n_points = poly.n_points();
    if n_points <= 1 {
        return (0., 0.);
    }

    let xs = poly.x_points();
    let ys = poly.y_points();
    let mut intercept = f64::INFINITY;
    let slope;
    if n_points > 2 {
        let x_min = xs.iter().min().copied().unwrap_or_default();
        let x_max = xs.iter().max().copied().unwrap_or_default();
        if x_max == x_min {
            slope = f64::INFINITY;
        } else {
            let x_vals = xs.iter().map(|&x| x as f64).collect::<Vec<f64>>();
            let y_vals = ys.iter().map(|&y| -(y as f64)).collect::<Vec<f64>>();
            let (n, m) = calc_line(&x_vals, &y_vals);
            intercept = n;
            slope = m;
        }
    } else {
        let (x1, x2) = (xs[0] as f64, xs[1] as f64);
        let (y1, y2) = (-(ys[0] as f64), -(ys[1] as f64));
        if xs[0] == xs[1] {
            slope = f64::INFINITY;
        } else {
            slope = (y2 - y1) / (x2 - x1);
            intercept = y2 - slope * x2;
        }
    }

    let mut angle = if slope.is_infinite() {
        FRAC_PI_2
    } else {
        slope.atan()
    };

    let (first_x, first_y) = (xs[0], ys[0]);
    let (last_x, last_y) = (xs[n_points - 1], ys[n_points - 1]);
    if -FRAC_PI_2 < angle && angle <= -FRAC_PI_4 && first_y > last_y {
        angle += PI;
    }
    if -FRAC_PI_4 < angle && angle <= FRAC_PI_4 && first_x > last_x {
        angle += PI;
    }
    if FRAC_PI_4 < angle && angle < FRAC_PI_2 && first_y < last_y {
        angle += PI;
    }
    if angle < 0. {
        angle += 2. * PI;
    }

    (angle, intercept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn calc_line_fits_points() {
        let (intercept, slope) = calc_line(&[1., 2., 3.], &[10., 20., 15.]);
        assert!(close(intercept, 10.));
        assert!(close(slope, 2.5));
    }

    #[test]
    fn calc_line_unstable_system() {
        assert_eq!(calc_line(&[2., 2., 2.], &[1., 2., 3.]), (0., 0.));
    }

    #[test]
    fn angle_of_trivial_polygons() {
        assert_eq!(calc_reg_line_stats(&Polygon::default()), (0., 0.));
        assert_eq!(calc_reg_line_stats(&Polygon::from_points(&[(3, 4)])), (0., 0.));
    }

    #[test]
    fn angle_follows_reading_direction() {
        let left_to_right = Polygon::from_points(&[(0, 10), (50, 10), (100, 10)]);
        let (angle, intercept) = calc_reg_line_stats(&left_to_right);
        assert!(close(angle, 0.));
        assert!(close(intercept, -10.));

        let right_to_left = Polygon::from_points(&[(100, 10), (50, 10), (0, 10)]);
        assert!(close(calc_reg_line_stats(&right_to_left).0, PI));
    }

    #[test]
    fn angle_of_two_point_polygons() {
        let rising = Polygon::from_points(&[(0, 0), (10, -10)]);
        let (angle, intercept) = calc_reg_line_stats(&rising);
        assert!(close(angle, FRAC_PI_4));
        assert!(close(intercept, 0.));

        let reversed = Polygon::from_points(&[(10, -10), (0, 0)]);
        assert!(close(calc_reg_line_stats(&reversed).0, 5. * FRAC_PI_4));

        let steep = Polygon::from_points(&[(0, 0), (1, 10)]);
        let angle = calc_reg_line_stats(&steep).0;
        // going down in image coordinates
        assert!(angle > 3. * FRAC_PI_2 && angle < 2. * PI);
    }

    #[test]
    fn angle_of_falling_line() {
        let falling = Polygon::from_points(&[(0, 0), (1, 1), (2, 2)]);
        assert!(close(calc_reg_line_stats(&falling).0, 7. * FRAC_PI_4));
    }

    #[test]
    fn angle_of_steep_falling_line_ending_above_start() {
        let polygon = Polygon::new(
            (0..100).collect(),
            (0..99).map(|i| 2 * i).chain(vec![-1]).collect(),
        )
        .unwrap();
        let (angle, intercept) = calc_reg_line_stats(&polygon);
        assert!(close(angle, -1.08233671731 + PI));
        assert!(close(intercept, -3.86178217822));
    }

    #[test]
    fn angle_of_steep_rising_line() {
        let upward = Polygon::from_points(&[(0, 10), (1, 0)]);
        let (angle, intercept) = calc_reg_line_stats(&upward);
        assert!(close(angle, 10f64.atan()));
        assert!(close(intercept, -10.));

        let downward = Polygon::from_points(&[(1, 0), (0, 10)]);
        assert!(close(calc_reg_line_stats(&downward).0, 10f64.atan() + PI));
    }

    #[test]
    fn angle_of_vertical_line() {
        let down = Polygon::from_points(&[(5, 0), (5, 10), (5, 20)]);
        let (angle, intercept) = calc_reg_line_stats(&down);
        assert!(close(angle, FRAC_PI_2));
        assert!(intercept.is_infinite());

        let two_points = Polygon::from_points(&[(5, 20), (5, 0)]);
        assert!(close(calc_reg_line_stats(&two_points).0, FRAC_PI_2));
    }
}

use anyhow::{anyhow, Result};
use geo::algorithm::bounding_rect::BoundingRect;
use geo::{Coordinate, LineString, Rect};
use once_cell::sync::OnceCell;
use std::iter::FromIterator;

/// Axis aligned rectangle given by its upper left corner and its extents.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

fn saturate(value: i64) -> i32 {
    if value < i32::MIN as i64 {
        i32::MIN
    } else if value > i32::MAX as i64 {
        i32::MAX
    } else {
        value as i32
    }
}

fn translate_axis(pos: &mut i32, extent: &mut i32, delta: i32) {
    let moved = *pos as i64 + delta as i64;
    let clamped = saturate(moved);
    if *extent >= 0 && clamped as i64 != moved {
        *extent = saturate(*extent as i64 + moved - clamped as i64);
    }
    *pos = clamped;
}

impl From<Rect<i32>> for Rectangle {
    fn from(rect: Rect<i32>) -> Self {
        let (min, max) = (rect.min(), rect.max());
        Rectangle {
            x: min.x,
            y: min.y,
            width: saturate(max.x as i64 - min.x as i64),
            height: saturate(max.y as i64 - min.y as i64),
        }
    }
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Corners in clockwise order starting at the upper left one.
    pub fn vertices(&self) -> [(i32, i32); 4] {
        let right = self.x.saturating_add(self.width);
        let bottom = self.y.saturating_add(self.height);
        [
            (self.x, self.y),
            (right, self.y),
            (right, bottom),
            (self.x, bottom),
        ]
    }

    /// Moves the rectangle. A corner clamped at the `i32` bounds keeps the
    /// far edges where an unbounded translation would have put them.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        translate_axis(&mut self.x, &mut self.width, dx);
        translate_axis(&mut self.y, &mut self.height, dy);
    }

    /// Overlap of two rectangles.
    ///
    /// The extents are not clamped at zero: for disjoint rectangles the
    /// resulting width and/or height is negative and equals the gap between
    /// them along that axis.
    pub fn intersection(&self, other: &Rectangle) -> Rectangle {
        let tx1 = (self.x as i64).max(other.x as i64);
        let ty1 = (self.y as i64).max(other.y as i64);
        let tx2 = (self.x as i64 + self.width as i64).min(other.x as i64 + other.width as i64);
        let ty2 = (self.y as i64 + self.height as i64).min(other.y as i64 + other.height as i64);

        Rectangle {
            x: saturate(tx1),
            y: saturate(ty1),
            width: saturate(tx2 - tx1),
            height: saturate(ty2 - ty1),
        }
    }
}

/// Baseline polygon with integer pixel coordinates.
///
/// The bounding box is computed on first request and afterwards kept up to
/// date while points are appended.
#[derive(Clone, Debug, Default)]
pub struct Polygon {
    x_points: Vec<i32>,
    y_points: Vec<i32>,
    bounds: OnceCell<Rectangle>,
}

impl Polygon {
    pub fn new(x_points: Vec<i32>, y_points: Vec<i32>) -> Result<Self> {
        if x_points.len() != y_points.len() {
            return Err(anyhow!(
                "Bounds error: got {} x coordinates and {} y coordinates",
                x_points.len(),
                y_points.len()
            ));
        }
        Ok(Self {
            x_points,
            y_points,
            bounds: OnceCell::new(),
        })
    }

    pub fn from_points(points: &[(i32, i32)]) -> Self {
        points.iter().copied().collect()
    }

    pub fn n_points(&self) -> usize {
        self.x_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_points.is_empty()
    }

    pub fn x_points(&self) -> &[i32] {
        &self.x_points
    }

    pub fn y_points(&self) -> &[i32] {
        &self.y_points
    }

    pub fn point(&self, idx: usize) -> (i32, i32) {
        (self.x_points[idx], self.y_points[idx])
    }

    pub fn points(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.x_points
            .iter()
            .copied()
            .zip(self.y_points.iter().copied())
    }

    pub fn first(&self) -> Option<(i32, i32)> {
        if self.is_empty() {
            None
        } else {
            Some(self.point(0))
        }
    }

    pub fn last(&self) -> Option<(i32, i32)> {
        if self.is_empty() {
            None
        } else {
            Some(self.point(self.n_points() - 1))
        }
    }

    pub fn add_point(&mut self, x: i32, y: i32) {
        self.x_points.push(x);
        self.y_points.push(y);
        if let Some(bounds) = self.bounds.get_mut() {
            update_bounds(bounds, x, y);
        }
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        for x in self.x_points.iter_mut() {
            *x = x.saturating_add(dx);
        }
        for y in self.y_points.iter_mut() {
            *y = y.saturating_add(dy);
        }
        if let Some(bounds) = self.bounds.get_mut() {
            bounds.translate(dx, dy);
        }
    }

    /// Smallest rectangle containing every point of the polygon.
    pub fn bounding_box(&self) -> Rectangle {
        if self.is_empty() {
            return Rectangle::default();
        }
        *self.bounds.get_or_init(|| self.calculate_bounds())
    }

    /// Whether the bounding box is already cached.
    pub fn has_bounds(&self) -> bool {
        self.bounds.get().is_some()
    }

    fn calculate_bounds(&self) -> Rectangle {
        LineString::from(self)
            .bounding_rect()
            .map(Rectangle::from)
            .unwrap_or_default()
    }
}

fn update_bounds(bounds: &mut Rectangle, x: i32, y: i32) {
    if x < bounds.x {
        bounds.width = saturate(bounds.width as i64 + (bounds.x as i64 - x as i64));
        bounds.x = x;
    } else {
        bounds.width = bounds.width.max(saturate(x as i64 - bounds.x as i64));
    }
    if y < bounds.y {
        bounds.height = saturate(bounds.height as i64 + (bounds.y as i64 - y as i64));
        bounds.y = y;
    } else {
        bounds.height = bounds.height.max(saturate(y as i64 - bounds.y as i64));
    }
}

impl PartialEq for Polygon {
    fn eq(&self, other: &Self) -> bool {
        self.x_points == other.x_points && self.y_points == other.y_points
    }
}

impl Eq for Polygon {}

impl FromIterator<(i32, i32)> for Polygon {
    fn from_iter<I: IntoIterator<Item = (i32, i32)>>(iter: I) -> Self {
        let mut polygon = Polygon::default();
        for (x, y) in iter {
            polygon.add_point(x, y);
        }
        polygon
    }
}

impl From<&LineString<i32>> for Polygon {
    fn from(line: &LineString<i32>) -> Self {
        line.0.iter().map(|c| (c.x, c.y)).collect()
    }
}

impl From<&Polygon> for LineString<i32> {
    fn from(polygon: &Polygon) -> Self {
        LineString(
            polygon
                .points()
                .map(|(x, y)| Coordinate { x, y })
                .collect::<Vec<Coordinate<i32>>>(),
        )
    }
}

use tracing::debug;

use crate::error::{check_len, Result};
use crate::view::PlaneCoords;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    indices: Vec<usize>,
}

impl Selection {
    pub fn all(len: usize) -> Self {
        Self {
            indices: (0..len).collect(),
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn retain_by(&mut self, data: &[f64], keep: impl Fn(f64) -> bool) {
        self.indices.retain(|&index| keep(data[index]));
    }

    pub fn take<T: Clone>(&self, data: &[T]) -> Vec<T> {
        self.indices.iter().map(|&index| data[index].clone()).collect()
    }

    pub fn take_coords(&self, coords: &PlaneCoords) -> PlaneCoords {
        PlaneCoords {
            x: self.take(&coords.x),
            y: self.take(&coords.y),
            depth: self.take(&coords.depth),
        }
    }
}

/// Square footprint of side `width`, optionally a slab `depth * width` thick.
/// A non-positive depth means no slab.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub depth: Option<f64>,
}

impl Viewport {
    pub fn new(width: f64, depth: Option<f64>) -> Self {
        Self { width, depth }
    }

    /// Depth is tested first, then x, then y; each pass only looks at what
    /// the previous one kept. Coordinate columns must share one length.
    pub fn select(&self, coords: &PlaneCoords) -> Selection {
        let half = self.width / 2.0;
        let mut selection = Selection::all(coords.len());
        if let Some(depth) = self.depth.filter(|depth| *depth > 0.0) {
            let half_depth = depth * self.width / 2.0;
            selection.retain_by(&coords.depth, |z| z.abs() < half_depth);
        }
        selection.retain_by(&coords.x, |x| x.abs() < half);
        selection.retain_by(&coords.y, |y| y.abs() < half);
        selection
    }

    /// Every entry of `carried` comes back filtered with the same selection.
    pub fn trim(
        &self,
        coords: &PlaneCoords,
        carried: &[&[f64]],
    ) -> Result<(PlaneCoords, Vec<Vec<f64>>, Selection)> {
        check_len("y", coords.len(), coords.y.len())?;
        check_len("depth", coords.len(), coords.depth.len())?;
        for data in carried {
            check_len("carried array", coords.len(), data.len())?;
        }
        let selection = self.select(coords);
        let trimmed = selection.take_coords(coords);
        let carried = carried.iter().map(|data| selection.take(*data)).collect();
        log_extent(&trimmed, coords.len());
        Ok((trimmed, carried, selection))
    }
}

fn log_extent(coords: &PlaneCoords, before: usize) {
    if coords.is_empty() {
        debug!(before, "viewport trim left no particles");
        return;
    }
    let (x_min, x_max) = extent(&coords.x);
    let (y_min, y_max) = extent(&coords.y);
    debug!(
        before,
        after = coords.len(),
        x_min,
        x_max,
        y_min,
        y_max,
        "viewport trimmed"
    );
}

fn extent(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}

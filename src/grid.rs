use crate::error::{ProjectionError, Result};
use crate::field::Field2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid2 {
    width: f64,
    pps: usize,
}

impl Grid2 {
    pub fn new(width: f64, pps: usize) -> Result<Self> {
        if pps == 0 || !width.is_finite() || width <= 0.0 {
            return Err(ProjectionError::InvalidGrid { width, pps });
        }
        Ok(Self { width, pps })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn pps(&self) -> usize {
        self.pps
    }

    pub fn resolution(&self) -> f64 {
        self.width / self.pps as f64
    }

    pub fn size(&self) -> usize {
        self.pps * self.pps
    }

    pub fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.pps && j < self.pps);
        j * self.pps + i
    }

    /// Continuous pixel coordinate of a physical coordinate along either axis.
    pub fn pixel_coord(&self, coord: f64) -> f64 {
        (coord + self.width / 2.0) / self.width * self.pps as f64
    }

    pub fn center(&self, index: usize) -> f64 {
        -self.width / 2.0 + (index as f64 + 0.5) * self.width / self.pps as f64
    }

    pub fn cell_center(&self, i: usize, j: usize) -> (f64, f64) {
        (self.center(i), self.center(j))
    }

    /// Inclusive pixel range touched by `[coord - h, coord + h]`, or `None`
    /// when the footprint misses the grid.
    pub fn footprint(&self, coord: f64, h: f64) -> Option<(usize, usize)> {
        let lo = self.pixel_coord(coord - h).floor();
        let hi = self.pixel_coord(coord + h).ceil();
        let last = (self.pps - 1) as f64;
        if hi < 0.0 || lo > last || lo.is_nan() || hi.is_nan() {
            return None;
        }
        Some((lo.max(0.0) as usize, hi.min(last) as usize))
    }

    pub fn mesh(&self) -> (Field2, Field2) {
        let x = Field2::from_fn(*self, |i, _j| self.center(i));
        let y = Field2::from_fn(*self, |_i, j| self.center(j));
        (x, y)
    }
}

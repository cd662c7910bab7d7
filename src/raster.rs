use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{check_len, ProjectionError, Result};
use crate::field::Field2;
use crate::grid::Grid2;
use crate::kernel::cubic_spline_sq;

const PAR_MIN_LEN_DEFAULT: usize = 1024;

fn par_min_len() -> usize {
    static MIN_LEN: OnceLock<usize> = OnceLock::new();
    *MIN_LEN.get_or_init(|| {
        std::env::var("SPH_PAR_MIN_LEN")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(PAR_MIN_LEN_DEFAULT)
    })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterBackend {
    #[default]
    Parallel,
    Sequential,
}

impl FromStr for RasterBackend {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "parallel" => Ok(RasterBackend::Parallel),
            "sequential" => Ok(RasterBackend::Sequential),
            other => Err(ProjectionError::UnknownBackend(other.to_string())),
        }
    }
}

impl fmt::Display for RasterBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterBackend::Parallel => f.write_str("parallel"),
            RasterBackend::Sequential => f.write_str("sequential"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RasterInput<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub scalar: &'a [f64],
    pub smoothing: &'a [f64],
}

impl RasterInput<'_> {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    fn validate(&self) -> Result<()> {
        let n = self.len();
        check_len("y", n, self.y.len())?;
        check_len("scalar", n, self.scalar.len())?;
        check_len("smoothing", n, self.smoothing.len())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub particles: usize,
    /// Particles dropped for a non-positive or non-finite smoothing length.
    pub skipped: usize,
}

struct Accumulator {
    numerator: Vec<f64>,
    denominator: Vec<f64>,
    skipped: usize,
}

impl Accumulator {
    fn new(size: usize) -> Self {
        Self {
            numerator: vec![0.0; size],
            denominator: vec![0.0; size],
            skipped: 0,
        }
    }

    fn splat(&mut self, grid: Grid2, x: f64, y: f64, scalar: f64, h: f64) {
        if !(h > 0.0 && h.is_finite()) {
            self.skipped += 1;
            return;
        }
        let Some((i_min, i_max)) = grid.footprint(x, h) else {
            return;
        };
        let Some((j_min, j_max)) = grid.footprint(y, h) else {
            return;
        };
        let inv_h2 = 1.0 / (h * h);
        let weight = scalar * scalar;
        let weighted = weight * scalar;
        let stride = grid.pps();
        for j in j_min..=j_max {
            let dy = y - grid.center(j);
            let dy2 = dy * dy;
            let row = j * stride;
            for i in i_min..=i_max {
                let dx = x - grid.center(i);
                let r2 = (dx * dx + dy2) * inv_h2;
                if r2 > 1.0 {
                    continue;
                }
                let w = cubic_spline_sq(r2);
                self.numerator[row + i] += weighted * w;
                self.denominator[row + i] += weight * w;
            }
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for (value, other_value) in self.numerator.iter_mut().zip(&other.numerator) {
            *value += other_value;
        }
        for (value, other_value) in self.denominator.iter_mut().zip(&other.denominator) {
            *value += other_value;
        }
        self.skipped += other.skipped;
        self
    }

    fn normalize(self, grid: Grid2) -> Field2 {
        let mut data = self.numerator;
        for (value, weight) in data.iter_mut().zip(&self.denominator) {
            if *weight > 0.0 {
                *value /= *weight;
            } else {
                *value = 0.0;
            }
        }
        Field2::from_vec(grid, data)
    }
}

/// Pixels no particle reaches stay at `0.0`; an empty input yields an
/// all-zero image. The result is an `s²`-weighted mean of the scalar, not a
/// kernel density sum.
pub fn scalar_map(
    grid: Grid2,
    input: RasterInput<'_>,
    backend: RasterBackend,
) -> Result<(Field2, RasterStats)> {
    input.validate()?;
    let n = input.len();
    let acc = match backend {
        RasterBackend::Sequential => {
            let mut acc = Accumulator::new(grid.size());
            for k in 0..n {
                acc.splat(
                    grid,
                    input.x[k],
                    input.y[k],
                    input.scalar[k],
                    input.smoothing[k],
                );
            }
            acc
        }
        RasterBackend::Parallel => (0..n)
            .into_par_iter()
            .with_min_len(par_min_len())
            .fold(
                || Accumulator::new(grid.size()),
                |mut acc, k| {
                    acc.splat(
                        grid,
                        input.x[k],
                        input.y[k],
                        input.scalar[k],
                        input.smoothing[k],
                    );
                    acc
                },
            )
            .reduce(|| Accumulator::new(grid.size()), Accumulator::merge),
    };
    let stats = RasterStats {
        particles: n,
        skipped: acc.skipped,
    };
    if stats.skipped > 0 {
        warn!(
            skipped = stats.skipped,
            particles = n,
            "skipped particles with degenerate smoothing length"
        );
    }
    Ok((acc.normalize(grid), stats))
}

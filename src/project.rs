use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ProjectionError, Result};
use crate::field::Field2;
use crate::grid::Grid2;
use crate::particles::ParticleSet;
use crate::raster::{scalar_map, RasterBackend, RasterInput, RasterStats};
use crate::trim::Viewport;
use crate::view::{set_viewpoint, Centering, ViewAxes};
use crate::Vec3;

pub const SINK_SMOOTHING_SCALE: f64 = 0.5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageScale {
    /// `log10` per pixel. Empty pixels become `-inf` and are left that way.
    #[default]
    Log,
    Linear,
}

impl FromStr for ImageScale {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "log" => Ok(ImageScale::Log),
            "linear" => Ok(ImageScale::Linear),
            other => Err(ProjectionError::UnknownImageScale(other.to_string())),
        }
    }
}

impl fmt::Display for ImageScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageScale::Log => f.write_str("log"),
            ImageScale::Linear => f.write_str("linear"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionParams {
    pub width: f64,
    pub pps: usize,
    /// Slab thickness as a fraction of `width`; `None` keeps the full column.
    pub depth: Option<f64>,
    pub axes: ViewAxes,
    pub centering: Centering,
    pub smoothing_scale: f64,
    pub imscale: ImageScale,
    pub backend: RasterBackend,
    pub density_ceiling: Option<f64>,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            width: 1.0,
            pps: 500,
            depth: None,
            axes: ViewAxes::Xy,
            centering: Centering::DensityWeighted,
            smoothing_scale: 1.7,
            imscale: ImageScale::Log,
            backend: RasterBackend::Parallel,
            density_ceiling: Some(1e12),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SinkMarker {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub mass: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    pub x: Field2,
    pub y: Field2,
    pub image: Field2,
    pub sinks: Vec<SinkMarker>,
    /// External marker sets in the view frame, in the order they were passed.
    pub markers: Vec<Vec<Vec3>>,
    pub stats: RasterStats,
}

pub fn project(particles: &ParticleSet, params: &ProjectionParams) -> Result<Projection> {
    run(particles, params, false, &[])
}

/// Like [`project`], but also records sink markers, draws sinks with
/// smoothing lengths shrunk by [`SINK_SMOOTHING_SCALE`], and moves `markers`
/// into the view frame alongside the particles.
pub fn project_with_sinks(
    particles: &ParticleSet,
    params: &ProjectionParams,
    markers: &[&[Vec3]],
) -> Result<Projection> {
    run(particles, params, true, markers)
}

fn run(
    particles: &ParticleSet,
    params: &ProjectionParams,
    with_sinks: bool,
    markers: &[&[Vec3]],
) -> Result<Projection> {
    let grid = Grid2::new(params.width, params.pps)?;

    if let (Some(ceiling), Some(max)) = (params.density_ceiling, particles.max_scalar()) {
        if max > ceiling {
            warn!(max, ceiling, "scalar field exceeds expected ceiling");
        }
    }

    let frame = set_viewpoint(
        particles.positions(),
        params.axes,
        params.centering,
        Some(particles.scalar()),
        markers,
    )?;
    debug!(
        axes = %params.axes,
        cx = frame.center.x,
        cy = frame.center.y,
        cz = frame.center.z,
        "view frame set"
    );

    let mut smoothing = particles.smoothing().to_vec();
    let mut sinks = Vec::new();
    if with_sinks {
        for &index in particles.sink_ids() {
            let p = frame.coords.point(index);
            sinks.push(SinkMarker {
                x: p.x,
                y: p.y,
                z: p.z,
                mass: particles.mass(index),
            });
            smoothing[index] *= SINK_SMOOTHING_SCALE;
        }
    }

    let viewport = Viewport::new(params.width, params.depth);
    let (coords, _, selection) = viewport.trim(&frame.coords, &[])?;
    let scalar = selection.take(particles.scalar());
    let smoothing = selection.take(&smoothing);

    // Degenerate lengths pass through untouched; the rasterizer skips and counts them.
    let floor = grid.resolution() / 2.0;
    let smoothing: Vec<f64> = smoothing
        .iter()
        .map(|&h| {
            if h > 0.0 && h.is_finite() {
                (params.smoothing_scale * h).max(floor)
            } else {
                h
            }
        })
        .collect();

    let input = RasterInput {
        x: &coords.x,
        y: &coords.y,
        scalar: &scalar,
        smoothing: &smoothing,
    };
    let (mut image, stats) = scalar_map(grid, input, params.backend)?;

    let (min_value, max_value) = image.min_max();
    info!(
        particles = stats.particles,
        backend = %params.backend,
        min = min_value,
        max = max_value,
        "scalar map done"
    );

    if params.imscale == ImageScale::Log {
        image.map_in_place(f64::log10);
        let non_finite = image.count_where(|value| !value.is_finite());
        if non_finite > 0 {
            debug!(non_finite, "log image has non-finite pixels");
        }
    }

    let (x, y) = grid.mesh();
    Ok(Projection {
        x,
        y,
        image,
        sinks,
        markers: frame.markers,
        stats,
    })
}

mod error;
mod field;
mod grid;
mod kernel;
mod particles;
mod project;
mod raster;
mod trim;
mod vec3;
mod view;

pub use error::{ProjectionError, Result};
pub use field::Field2;
pub use grid::Grid2;
pub use kernel::{cubic_spline, cubic_spline_sq};
pub use particles::ParticleSet;
pub use project::{
    project, project_with_sinks, ImageScale, Projection, ProjectionParams, SinkMarker,
    SINK_SMOOTHING_SCALE,
};
pub use raster::{scalar_map, RasterBackend, RasterInput, RasterStats};
pub use trim::{Selection, Viewport};
pub use vec3::Vec3;
pub use view::{set_viewpoint, Centering, PlaneCoords, ViewAxes, ViewFrame};

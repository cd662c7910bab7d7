use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProjectionError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("configuration error: unknown view axes {0:?} (expected xy, xz or yz)")]
    UnknownViewAxes(String),

    #[error("configuration error: unknown image scale {0:?} (expected log or linear)")]
    UnknownImageScale(String),

    #[error("configuration error: unknown raster backend {0:?} (expected parallel or sequential)")]
    UnknownBackend(String),

    #[error("length mismatch for {field}: expected {expected}, got {got}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid grid: width {width}, pixels per side {pps}")]
    InvalidGrid { width: f64, pps: usize },

    #[error("sink index {index} out of range for {len} particles")]
    SinkOutOfRange { index: usize, len: usize },
}

pub(crate) fn check_len(field: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(ProjectionError::LengthMismatch {
            field,
            expected,
            got,
        })
    }
}

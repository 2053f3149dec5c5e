use thiserror::Error;

/// Precondition failures detected before any pixel is touched.
///
/// Geometric misses (behind the camera, outside the source) are not errors;
/// those pixels are simply left unwritten.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("image has zero extent ({width}x{height})")]
    EmptyImage { width: usize, height: usize },

    #[error("image size {width}x{height}x{stride} overflows usize")]
    SizeOverflow {
        width: usize,
        height: usize,
        stride: usize,
    },

    #[error("buffer holds {actual} bytes, layout needs {required}")]
    BufferTooSmall { required: usize, actual: usize },

    #[error("channel stride {stride} is smaller than the {required} channel(s) read or written")]
    StrideTooSmall { stride: usize, required: usize },

    #[error("{role} grid must be at least 2x2, got {width}x{height}")]
    GridTooSmall {
        role: &'static str,
        width: usize,
        height: usize,
    },

    #[error("mask is {mask_width}x{mask_height} but source is {width}x{height}")]
    MaskMismatch {
        mask_width: usize,
        mask_height: usize,
        width: usize,
        height: usize,
    },

    #[error("aperture half-angle {0} rad is outside (0, pi/2)")]
    ApertureOutOfRange(f64),
}

pub type Result<T> = std::result::Result<T, ProjectionError>;

//! Error types for blockmotion.

use thiserror::Error;

/// Result alias for blockmotion operations.
pub type MotionResult<T> = std::result::Result<T, MotionError>;

/// Errors that can occur when estimating or compensating motion.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MotionError {
    /// Width or height is zero, or their product overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer cannot hold the requested image.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// The block size does not tile the frame exactly.
    #[error("block size {block_size} does not divide {width}x{height}")]
    BlockSizeMismatch {
        width: usize,
        height: usize,
        block_size: usize,
    },
    /// Current and previous frames differ in size.
    #[error("frame sizes differ: current {current:?}, previous {previous:?}")]
    FrameSizeMismatch {
        current: (usize, usize),
        previous: (usize, usize),
    },
    /// The motion field does not have one vector per block.
    #[error("motion field has {got} vectors, expected {expected}")]
    FieldSizeMismatch { expected: usize, got: usize },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Reading or writing a vector file failed.
    #[error("vector file I/O failed: {reason}")]
    Io { reason: String },
    /// Decoding or encoding an image file failed.
    #[error("image I/O failed: {reason}")]
    ImageIo { reason: String },
}

impl From<std::io::Error> for MotionError {
    fn from(err: std::io::Error) -> Self {
        MotionError::Io {
            reason: err.to_string(),
        }
    }
}

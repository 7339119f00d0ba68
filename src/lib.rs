//! Blockmotion is a block-matching motion estimation engine for
//! single-channel 8-bit frames.
//!
//! Frames are tiled into square blocks and each block gets one motion vector
//! pointing to where its content sits in the previous frame. Vectors come
//! from an exhaustive full search or from PMVFAST, can be refined to
//! quarter-pixel precision, stored in a flat binary format, and used to
//! predict a frame from its predecessor by block compensation.
//!
//! Multi-channel images are handled by running the engine once per plane.
//! Optional features: `rayon` (row-parallel full search, refinement and
//! compensation), `simd` (vectorised SAD), `image-io` (file loading),
//! `tracing` (spans and summary events).

pub mod codec;
pub mod compensate;
pub mod field;
pub mod grid;
pub mod image;
pub mod kernel;
pub mod quality;
pub mod search;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use codec::{load_field, load_vectors, read_vectors, save_vectors, write_vectors};
pub use compensate::{block_compensate, compensate};
pub use field::{MotionField, MotionVector};
pub use grid::BlockGrid;
pub use crate::image::{ImageView, OwnedImage};
pub use kernel::{sad, sample_bilinear};
pub use search::diamond::{diamond_search, DiamondPattern};
pub use search::full::{full_search, FULL_SEARCH_RANGE};
pub use search::pmvfast::{pmvfast, PmvfastThresholds};
pub use search::subpixel::subpixel_refine;
pub use search::{check_frames, Algorithm, EstimateConfig, Estimator};
pub use util::{MotionError, MotionResult};

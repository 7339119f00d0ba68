//! Sampling and block distortion kernels.
//!
//! `scalar` holds the reference implementations. With the `simd` feature the
//! distortion metric switches to a vectorised kernel for integer-aligned
//! blocks that lie fully inside the search frame; every other placement
//! falls back to the scalar path, so results are identical either way.

use crate::ImageView;

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

pub use scalar::sample_bilinear;

/// Block distortion metric between an integer-aligned reference block and a
/// possibly fractional search block.
pub trait BlockMetric {
    /// Distortion of the `size x size` block at `(ref_x, ref_y)` in
    /// `reference` against the block at `(search_x, search_y)` in `search`.
    ///
    /// No bounds validation is performed: samples outside `search` read as
    /// zero, and the reference block must lie inside `reference`.
    fn distortion(
        reference: ImageView<'_, u8>,
        search: ImageView<'_, u8>,
        ref_x: usize,
        ref_y: usize,
        search_x: f32,
        search_y: f32,
        size: usize,
    ) -> f32;
}

#[cfg(not(feature = "simd"))]
use scalar::SadScalar as Sad;
#[cfg(feature = "simd")]
use simd::SadSimd as Sad;

/// Sum of absolute differences using the fastest kernel compiled in.
#[inline]
pub fn sad(
    reference: ImageView<'_, u8>,
    search: ImageView<'_, u8>,
    ref_x: usize,
    ref_y: usize,
    search_x: f32,
    search_y: f32,
    size: usize,
) -> f32 {
    <Sad as BlockMetric>::distortion(reference, search, ref_x, ref_y, search_x, search_y, size)
}

//! SIMD-accelerated distortion using the `wide` crate.
//!
//! Only integer-aligned search blocks that lie fully inside the search image
//! take the vector path: there bilinear sampling reduces to a plain load, and
//! every partial sum is an integer well below 2^24, so the f32 total matches
//! the scalar kernel exactly regardless of summation order.

use crate::kernel::scalar::SadScalar;
use crate::kernel::BlockMetric;
use crate::ImageView;
use wide::f32x8;

const LANES: usize = 8;

/// Load 8 u8 values and convert to f32x8.
#[inline]
fn load_u8x8_as_f32x8(slice: &[u8]) -> f32x8 {
    f32x8::from([
        slice[0] as f32,
        slice[1] as f32,
        slice[2] as f32,
        slice[3] as f32,
        slice[4] as f32,
        slice[5] as f32,
        slice[6] as f32,
        slice[7] as f32,
    ])
}

/// Horizontal sum of f32x8.
#[inline]
fn hsum(v: f32x8) -> f32 {
    let arr = v.to_array();
    arr[0] + arr[1] + arr[2] + arr[3] + arr[4] + arr[5] + arr[6] + arr[7]
}

/// SIMD sum of absolute differences with a scalar fallback.
pub struct SadSimd;

impl SadSimd {
    fn aligned(
        reference: ImageView<'_, u8>,
        search: ImageView<'_, u8>,
        ref_x: usize,
        ref_y: usize,
        sx: usize,
        sy: usize,
        size: usize,
    ) -> Option<f32> {
        let simd_end = size / LANES * LANES;
        let mut acc = f32x8::ZERO;
        let mut rem = 0.0f32;

        for y in 0..size {
            let ref_row = reference.row(ref_y + y)?.get(ref_x..ref_x + size)?;
            let search_row = search.row(sy + y)?.get(sx..sx + size)?;

            let mut x = 0;
            while x < simd_end {
                let a = load_u8x8_as_f32x8(&ref_row[x..]);
                let b = load_u8x8_as_f32x8(&search_row[x..]);
                acc += (a - b).abs();
                x += LANES;
            }
            while x < size {
                rem += (f32::from(ref_row[x]) - f32::from(search_row[x])).abs();
                x += 1;
            }
        }

        Some(hsum(acc) + rem)
    }
}

impl BlockMetric for SadSimd {
    fn distortion(
        reference: ImageView<'_, u8>,
        search: ImageView<'_, u8>,
        ref_x: usize,
        ref_y: usize,
        search_x: f32,
        search_y: f32,
        size: usize,
    ) -> f32 {
        let integral = search_x >= 0.0
            && search_y >= 0.0
            && search_x.fract() == 0.0
            && search_y.fract() == 0.0;
        if integral {
            let sx = search_x as usize;
            let sy = search_y as usize;
            if let Some(sad) = Self::aligned(reference, search, ref_x, ref_y, sx, sy, size) {
                return sad;
            }
        }
        SadScalar::distortion(reference, search, ref_x, ref_y, search_x, search_y, size)
    }
}

#[cfg(test)]
mod tests {
    use super::SadSimd;
    use crate::kernel::scalar::SadScalar;
    use crate::kernel::BlockMetric;
    use crate::ImageView;

    #[test]
    fn simd_matches_scalar_on_aligned_and_fractional_blocks() {
        let width = 40;
        let height = 40;
        let data: Vec<u8> = (0..width * height)
            .map(|i| (((i % width) * 13) ^ ((i / width) * 7)) as u8)
            .collect();
        let view = ImageView::from_slice(&data, width, height).unwrap();
        let cases = [
            (8usize, 8usize, 10.0f32, 9.0f32, 16usize),
            (0, 0, 0.0, 0.0, 12),
            (16, 16, 30.0, 30.0, 16),
            (4, 4, 5.25, 3.75, 8),
        ];
        for (rx, ry, sx, sy, size) in cases {
            let simd = SadSimd::distortion(view, view, rx, ry, sx, sy, size);
            let scalar = SadScalar::distortion(view, view, rx, ry, sx, sy, size);
            assert_eq!(simd, scalar);
        }
    }
}

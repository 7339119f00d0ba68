//! Scalar reference kernels.

use crate::kernel::BlockMetric;
use crate::ImageView;

/// Samples `image` at a fractional location using bilinear interpolation.
///
/// Locations with `fx >= width` or `fy >= height` return 0. Otherwise the
/// four neighbours of `(floor(fx), floor(fy))` are blended, and any
/// neighbour outside the image contributes 0 rather than the nearest edge
/// sample, so estimates darken towards the frame border. The blend is
/// rounded to the nearest integer.
pub fn sample_bilinear(image: ImageView<'_, u8>, fx: f32, fy: f32) -> u8 {
    if !fx.is_finite() || !fy.is_finite() {
        return 0;
    }
    if fx >= image.width() as f32 || fy >= image.height() as f32 {
        return 0;
    }

    let x0 = fx.floor();
    let y0 = fy.floor();
    let a = fx - x0;
    let b = fy - y0;
    let ix = x0 as i64;
    let iy = y0 as i64;

    let g = pixel_or_zero(image, ix, iy);
    let h = pixel_or_zero(image, ix, iy + 1);
    let i = pixel_or_zero(image, ix + 1, iy);
    let j = pixel_or_zero(image, ix + 1, iy + 1);

    let oma = 1.0 - a;
    let omb = 1.0 - b;
    let value = oma * omb * g + b * oma * h + a * omb * i + a * b * j;
    value.round().clamp(0.0, 255.0) as u8
}

#[inline]
fn pixel_or_zero(image: ImageView<'_, u8>, x: i64, y: i64) -> f32 {
    if x < 0 || y < 0 {
        return 0.0;
    }
    image
        .get(x as usize, y as usize)
        .map_or(0.0, |&value| f32::from(value))
}

/// Scalar sum of absolute differences.
pub struct SadScalar;

impl BlockMetric for SadScalar {
    fn distortion(
        reference: ImageView<'_, u8>,
        search: ImageView<'_, u8>,
        ref_x: usize,
        ref_y: usize,
        search_x: f32,
        search_y: f32,
        size: usize,
    ) -> f32 {
        let mut sad = 0.0f32;
        for y in 0..size {
            let ref_row = reference.row(ref_y + y);
            let sy = search_y + y as f32;
            for x in 0..size {
                let value = ref_row
                    .and_then(|row| row.get(ref_x + x))
                    .map_or(0, |&v| i32::from(v));
                let sample = i32::from(sample_bilinear(search, search_x + x as f32, sy));
                sad += (value - sample).abs() as f32;
            }
        }
        sad
    }
}

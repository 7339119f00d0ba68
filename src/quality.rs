//! Reconstruction quality metrics.

use crate::util::{MotionError, MotionResult};
use crate::ImageView;

const PEAK: f64 = 255.0;

/// PSNR of two identical frames in dB.
pub const PSNR_IDENTICAL: f64 = 361.201_999_099_219_56;

fn check_same_size(a: ImageView<'_, u8>, b: ImageView<'_, u8>) -> MotionResult<()> {
    if a.width() != b.width() || a.height() != b.height() {
        return Err(MotionError::FrameSizeMismatch {
            current: (a.width(), a.height()),
            previous: (b.width(), b.height()),
        });
    }
    Ok(())
}

fn fold_pixels<F: FnMut(u8, u8)>(a: ImageView<'_, u8>, b: ImageView<'_, u8>, mut f: F) {
    for y in 0..a.height() {
        if let (Some(ra), Some(rb)) = (a.row(y), b.row(y)) {
            for (&pa, &pb) in ra.iter().zip(rb) {
                f(pa, pb);
            }
        }
    }
}

/// Mean squared error between two frames.
pub fn mse(a: ImageView<'_, u8>, b: ImageView<'_, u8>) -> MotionResult<f64> {
    check_same_size(a, b)?;
    let mut sum = 0.0f64;
    fold_pixels(a, b, |pa, pb| {
        let d = f64::from(pa) - f64::from(pb);
        sum += d * d;
    });
    Ok(sum / (a.width() * a.height()) as f64)
}

/// Peak signal-to-noise ratio in dB for 8-bit frames.
///
/// The RMS error is offset by `f64::EPSILON`, so identical frames score a
/// finite [`PSNR_IDENTICAL`] rather than infinity.
pub fn psnr(a: ImageView<'_, u8>, b: ImageView<'_, u8>) -> MotionResult<f64> {
    let rms = mse(a, b)?.sqrt();
    Ok(20.0 * (PEAK / (rms + f64::EPSILON)).log10())
}

/// Largest absolute per-pixel difference.
pub fn max_abs_diff(a: ImageView<'_, u8>, b: ImageView<'_, u8>) -> MotionResult<u8> {
    check_same_size(a, b)?;
    let mut max = 0u8;
    fold_pixels(a, b, |pa, pb| max = max.max(pa.abs_diff(pb)));
    Ok(max)
}

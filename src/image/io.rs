//! Convenience helpers for loading and saving frames via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Color files are split
//! into independent planes so each can be compensated on its own.

use crate::image::{ImageView, OwnedImage};
use crate::util::{MotionError, MotionResult};
use std::path::Path;

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &image::GrayImage) -> MotionResult<ImageView<'_, u8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    ImageView::from_slice(img.as_raw(), width, height)
}

/// Creates an owned image from a grayscale image buffer.
pub fn owned_from_gray_image(img: &image::GrayImage) -> MotionResult<OwnedImage> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    OwnedImage::new(img.as_raw().clone(), width, height)
}

/// Creates an owned grayscale image from a dynamic image.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> MotionResult<OwnedImage> {
    let gray = img.to_luma8();
    owned_from_gray_image(&gray)
}

/// Loads an image from disk and converts it to a grayscale owned image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> MotionResult<OwnedImage> {
    let img = open(path.as_ref())?;
    owned_from_dynamic_image(&img)
}

/// Loads an image from disk as one plane per color channel.
///
/// Single-channel files yield one plane; anything else is converted to RGB
/// and yields three planes (alpha is dropped).
pub fn load_planes<P: AsRef<Path>>(path: P) -> MotionResult<Vec<OwnedImage>> {
    let img = open(path.as_ref())?;
    if img.color().channel_count() == 1 {
        return Ok(vec![owned_from_dynamic_image(&img)?]);
    }

    let rgb = img.to_rgb8();
    let width = rgb.width() as usize;
    let height = rgb.height() as usize;
    let mut planes = vec![Vec::with_capacity(width * height); 3];
    for pixel in rgb.pixels() {
        for (plane, &value) in planes.iter_mut().zip(pixel.0.iter()) {
            plane.push(value);
        }
    }
    planes
        .into_iter()
        .map(|data| OwnedImage::new(data, width, height))
        .collect()
}

/// Saves a single plane as a grayscale image.
pub fn save_gray_image<P: AsRef<Path>>(img: &OwnedImage, path: P) -> MotionResult<()> {
    let gray = image::GrayImage::from_raw(
        img.width() as u32,
        img.height() as u32,
        img.data().to_vec(),
    )
    .ok_or(MotionError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    gray.save(path).map_err(image_io_error)
}

/// Merges one or three planes and saves them as a grayscale or RGB image.
pub fn save_planes<P: AsRef<Path>>(planes: &[OwnedImage], path: P) -> MotionResult<()> {
    match planes {
        [gray] => save_gray_image(gray, path),
        [r, g, b] => {
            let width = r.width();
            let height = r.height();
            if [g, b]
                .iter()
                .any(|p| p.width() != width || p.height() != height)
            {
                return Err(MotionError::InvalidInput("color planes differ in size"));
            }
            let mut data = Vec::with_capacity(width * height * 3);
            for ((&rv, &gv), &bv) in r.data().iter().zip(g.data()).zip(b.data()) {
                data.extend_from_slice(&[rv, gv, bv]);
            }
            let rgb = image::RgbImage::from_raw(width as u32, height as u32, data)
                .ok_or(MotionError::InvalidDimensions { width, height })?;
            rgb.save(path).map_err(image_io_error)
        }
        _ => Err(MotionError::InvalidInput("expected one or three planes")),
    }
}

fn open(path: &Path) -> MotionResult<image::DynamicImage> {
    image::open(path).map_err(image_io_error)
}

fn image_io_error(err: image::ImageError) -> MotionError {
    MotionError::ImageIo {
        reason: err.to_string(),
    }
}

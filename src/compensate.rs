//! Block motion compensation.
//!
//! Each output pixel `(x, y)` of block `b` is sampled from the previous
//! frame at `(x + v.x, y + v.y)`, where `v` is the vector of `b`. Samples
//! falling outside the previous frame read as zero.

use crate::field::MotionVector;
use crate::grid::BlockGrid;
use crate::image::OwnedImage;
use crate::kernel::sample_bilinear;
use crate::trace::{trace_event, trace_span};
use crate::util::{MotionError, MotionResult};
use crate::ImageView;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

fn check_vectors(
    previous: ImageView<'_, u8>,
    vectors: &[MotionVector],
    block_size: usize,
) -> MotionResult<BlockGrid> {
    let grid = BlockGrid::for_view(previous, block_size)?;
    if vectors.len() != grid.len() {
        return Err(MotionError::FieldSizeMismatch {
            expected: grid.len(),
            got: vectors.len(),
        });
    }
    Ok(grid)
}

fn prepare_output(output: &mut OwnedImage, grid: BlockGrid) -> MotionResult<()> {
    if output.width() != grid.width() || output.height() != grid.height() {
        *output = OwnedImage::zeros(grid.width(), grid.height())?;
    }
    Ok(())
}

/// Fills block row `by` of the output. `rows` holds `block_size` output
/// rows starting at `by * block_size`.
fn compensate_block_row(
    previous: ImageView<'_, u8>,
    vectors: &[MotionVector],
    grid: BlockGrid,
    by: usize,
    rows: &mut [u8],
) {
    let size = grid.block_size();
    let width = grid.width();
    for bx in 0..grid.blocks_wide() {
        let vector = vectors[grid.index(bx, by)];
        for j in 0..size {
            let y = by * size + j;
            let row = &mut rows[j * width..(j + 1) * width];
            for i in 0..size {
                let x = bx * size + i;
                row[x] = sample_bilinear(previous, x as f32 + vector.x, y as f32 + vector.y);
            }
        }
    }
}

/// Predicts a frame from `previous` and one vector per block.
///
/// Fails without touching `output` if `block_size` does not tile the frame
/// or `vectors` does not hold exactly one vector per block. `output` is
/// reallocated when its size differs from `previous`.
pub fn block_compensate(
    previous: ImageView<'_, u8>,
    vectors: &[MotionVector],
    block_size: usize,
    output: &mut OwnedImage,
) -> MotionResult<()> {
    let grid = check_vectors(previous, vectors, block_size)?;
    let _span = trace_span!("block_compensate", blocks = grid.len()).entered();
    prepare_output(output, grid)?;

    let band = grid.width() * block_size;
    for (by, rows) in output.data_mut().chunks_mut(band).enumerate() {
        compensate_block_row(previous, vectors, grid, by, rows);
    }

    trace_event!("block_compensate_done", blocks = grid.len());
    Ok(())
}

/// Block compensation with block rows distributed across the rayon pool.
#[cfg(feature = "rayon")]
pub fn block_compensate_par(
    previous: ImageView<'_, u8>,
    vectors: &[MotionVector],
    block_size: usize,
    output: &mut OwnedImage,
) -> MotionResult<()> {
    let grid = check_vectors(previous, vectors, block_size)?;
    let _span = trace_span!("block_compensate", blocks = grid.len(), parallel = true).entered();
    prepare_output(output, grid)?;

    let band = grid.width() * block_size;
    output
        .data_mut()
        .par_chunks_mut(band)
        .enumerate()
        .for_each(|(by, rows)| compensate_block_row(previous, vectors, grid, by, rows));

    trace_event!("block_compensate_done", blocks = grid.len());
    Ok(())
}

/// Allocating form of [`block_compensate`].
pub fn compensate(
    previous: ImageView<'_, u8>,
    vectors: &[MotionVector],
    block_size: usize,
) -> MotionResult<OwnedImage> {
    let mut output = OwnedImage::zeros(previous.width(), previous.height())?;
    block_compensate(previous, vectors, block_size, &mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::{block_compensate, compensate};
    use crate::field::MotionVector;
    use crate::image::OwnedImage;
    use crate::util::MotionError;
    use crate::ImageView;

    #[test]
    fn whole_pixel_shift_moves_content() {
        let data: Vec<u8> = (0..8 * 8).map(|i| i as u8).collect();
        let view = ImageView::from_slice(&data, 8, 8).unwrap();
        let out = compensate(view, &[MotionVector::new(1.0, 0.0)], 8).unwrap();
        assert_eq!(out.data()[0], 1);
        assert_eq!(out.data()[6], 7);
        // Last column samples past the right edge.
        assert_eq!(out.data()[7], 0);
    }

    #[test]
    fn wrong_vector_count_leaves_output_untouched() {
        let data = vec![5u8; 16 * 16];
        let view = ImageView::from_slice(&data, 16, 16).unwrap();
        let mut output = OwnedImage::new(vec![42u8; 4], 2, 2).unwrap();
        let err = block_compensate(view, &[MotionVector::ZERO; 3], 8, &mut output).unwrap_err();
        assert_eq!(
            err,
            MotionError::FieldSizeMismatch {
                expected: 4,
                got: 3
            }
        );
        assert_eq!(output.data(), &[42u8; 4]);
    }
}

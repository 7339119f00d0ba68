//! Exhaustive (full search) block matching.
//!
//! Every integer origin within `FULL_SEARCH_RANGE` pixels of the block origin
//! is scored in raster order. The lowest SAD wins; on ties the first
//! candidate found is kept, except that the zero-motion origin always wins a
//! tie.

use crate::field::{MotionField, MotionVector};
use crate::grid::BlockGrid;
use crate::kernel::sad;
use crate::search::{check_frames, Best, SAD_CEILING};
use crate::trace::{trace_event, trace_span};
use crate::util::MotionResult;
use crate::ImageView;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Half-width of the full-search window in pixels.
pub const FULL_SEARCH_RANGE: i64 = 16;

/// Inclusive window of candidate origins for the block at `(ox, oy)`.
///
/// The upper bound keeps the whole block inside the previous frame; the
/// lower bound is clamped to the frame extent only.
pub fn search_window(grid: BlockGrid, ox: usize, oy: usize) -> (i64, i64, i64, i64) {
    let width = grid.width() as i64;
    let height = grid.height() as i64;
    let block = grid.block_size() as i64;
    let (ox, oy) = (ox as i64, oy as i64);

    let x_min = (ox - FULL_SEARCH_RANGE).clamp(0, width);
    let x_max = (ox + FULL_SEARCH_RANGE).clamp(0, width - block);
    let y_min = (oy - FULL_SEARCH_RANGE).clamp(0, height);
    let y_max = (oy + FULL_SEARCH_RANGE).clamp(0, height - block);
    (x_min, y_min, x_max, y_max)
}

fn search_block(
    current: ImageView<'_, u8>,
    previous: ImageView<'_, u8>,
    grid: BlockGrid,
    bx: usize,
    by: usize,
) -> MotionVector {
    let size = grid.block_size();
    let (ox, oy) = grid.origin(bx, by);
    let (x_min, y_min, x_max, y_max) = search_window(grid, ox, oy);

    let mut best = Best::below(SAD_CEILING);
    for y in y_min..=y_max {
        for x in x_min..=x_max {
            let bdm = sad(current, previous, ox, oy, x as f32, y as f32, size);
            let vector = MotionVector::new((x - ox as i64) as f32, (y - oy as i64) as f32);
            let zero_motion = x == ox as i64 && y == oy as i64;
            if !best.offer(vector, bdm) && zero_motion && bdm == best.threshold() {
                best.replace(vector, bdm);
            }
        }
    }
    best.item().unwrap_or(MotionVector::ZERO)
}

/// Estimates one integer vector per block by exhaustive search.
pub fn full_search(
    current: ImageView<'_, u8>,
    previous: ImageView<'_, u8>,
    block_size: usize,
) -> MotionResult<MotionField> {
    let grid = check_frames(current, previous, block_size)?;
    let _span = trace_span!("full_search", blocks = grid.len(), block_size = block_size).entered();

    let vectors = grid
        .blocks()
        .map(|(bx, by)| search_block(current, previous, grid, bx, by))
        .collect();

    trace_event!("full_search_done", blocks = grid.len());
    MotionField::from_vectors(grid, vectors)
}

/// Full search with block rows distributed across the rayon pool.
#[cfg(feature = "rayon")]
pub fn full_search_par(
    current: ImageView<'_, u8>,
    previous: ImageView<'_, u8>,
    block_size: usize,
) -> MotionResult<MotionField> {
    let grid = check_frames(current, previous, block_size)?;
    let _span = trace_span!(
        "full_search",
        blocks = grid.len(),
        block_size = block_size,
        parallel = true
    )
    .entered();

    let rows: Vec<Vec<MotionVector>> = (0..grid.blocks_high())
        .into_par_iter()
        .map(|by| {
            (0..grid.blocks_wide())
                .map(|bx| search_block(current, previous, grid, bx, by))
                .collect()
        })
        .collect();

    trace_event!("full_search_done", blocks = grid.len());
    MotionField::from_vectors(grid, rows.into_iter().flatten().collect())
}

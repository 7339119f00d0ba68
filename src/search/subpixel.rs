//! Quarter-pixel refinement of integer motion fields.
//!
//! Each vector is re-scored over a 7x7 grid of quarter-pixel offsets around
//! it. A direction is disabled (its bound collapses to 0) when the block
//! already touches the corresponding frame edge; this is decided once per
//! block before scanning.

use crate::field::{MotionField, MotionVector};
use crate::grid::BlockGrid;
use crate::kernel::sad;
use crate::search::{check_field, Best, SAD_CEILING};
use crate::trace::{trace_event, trace_span};
use crate::util::MotionResult;
use crate::ImageView;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Number of quarter steps searched on each side of the integer vector.
pub const SUBPIXEL_STEPS: i32 = 3;

/// Fractional step size in pixels.
pub const SUBPIXEL_STEP: f32 = 0.25;

fn refine_block(
    current: ImageView<'_, u8>,
    previous: ImageView<'_, u8>,
    grid: BlockGrid,
    bx: usize,
    by: usize,
    vector: MotionVector,
) -> MotionVector {
    let size = grid.block_size();
    let (ox, oy) = grid.origin(bx, by);
    let (fx, fy) = (ox as f32, oy as f32);
    let block = size as f32;

    let (mut min_x, mut max_x) = (-SUBPIXEL_STEPS, SUBPIXEL_STEPS);
    let (mut min_y, mut max_y) = (-SUBPIXEL_STEPS, SUBPIXEL_STEPS);
    if fx + vector.x + block >= previous.width() as f32 {
        max_x = 0;
    }
    if fy + vector.y + block >= previous.height() as f32 {
        max_y = 0;
    }
    if fx + vector.x <= 0.0 {
        min_x = 0;
    }
    if fy + vector.y <= 0.0 {
        min_y = 0;
    }

    let mut best = Best::below(SAD_CEILING);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let candidate = vector.offset(x as f32 * SUBPIXEL_STEP, y as f32 * SUBPIXEL_STEP);
            let error = sad(
                current,
                previous,
                ox,
                oy,
                fx + candidate.x,
                fy + candidate.y,
                size,
            );
            best.offer(candidate, error);
        }
    }
    best.item().unwrap_or(vector)
}

/// Refines every vector of `field` in place to quarter-pixel precision.
pub fn subpixel_refine(
    current: ImageView<'_, u8>,
    previous: ImageView<'_, u8>,
    field: &mut MotionField,
) -> MotionResult<()> {
    let grid = check_field(current, previous, field)?;
    let _span = trace_span!("subpixel_refine", blocks = grid.len()).entered();

    for (bx, by) in grid.blocks() {
        if let Some(vector) = field.get(bx, by) {
            let refined = refine_block(current, previous, grid, bx, by, vector);
            field.set(bx, by, refined);
        }
    }

    trace_event!("subpixel_refine_done", blocks = grid.len());
    Ok(())
}

/// Quarter-pixel refinement with block rows distributed across the rayon
/// pool.
#[cfg(feature = "rayon")]
pub fn subpixel_refine_par(
    current: ImageView<'_, u8>,
    previous: ImageView<'_, u8>,
    field: &mut MotionField,
) -> MotionResult<()> {
    let grid = check_field(current, previous, field)?;
    let _span = trace_span!("subpixel_refine", blocks = grid.len(), parallel = true).entered();

    field
        .vectors_mut()
        .par_chunks_mut(grid.blocks_wide())
        .enumerate()
        .for_each(|(by, row)| {
            for (bx, vector) in row.iter_mut().enumerate() {
                *vector = refine_block(current, previous, grid, bx, by, *vector);
            }
        });

    trace_event!("subpixel_refine_done", blocks = grid.len());
    Ok(())
}

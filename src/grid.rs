//! Block grid geometry.
//!
//! A frame of `width x height` samples is tiled by square blocks of
//! `block_size`. Both dimensions must be exact multiples of the block size;
//! blocks are addressed by `(bx, by)` and stored in raster order.

use crate::image::ImageView;
use crate::util::{MotionError, MotionResult};

/// Validated tiling of a frame into square blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockGrid {
    width: usize,
    height: usize,
    block_size: usize,
    blocks_wide: usize,
    blocks_high: usize,
}

impl BlockGrid {
    /// Creates a grid, rejecting block sizes that do not tile the frame.
    pub fn new(width: usize, height: usize, block_size: usize) -> MotionResult<Self> {
        if width == 0 || height == 0 {
            return Err(MotionError::InvalidDimensions { width, height });
        }
        if block_size == 0 || width % block_size != 0 || height % block_size != 0 {
            return Err(MotionError::BlockSizeMismatch {
                width,
                height,
                block_size,
            });
        }
        Ok(Self {
            width,
            height,
            block_size,
            blocks_wide: width / block_size,
            blocks_high: height / block_size,
        })
    }

    /// Creates the grid covering `view`.
    pub fn for_view<T>(view: ImageView<'_, T>, block_size: usize) -> MotionResult<Self> {
        Self::new(view.width(), view.height(), block_size)
    }

    /// Frame width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Side length of a block in pixels.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of block columns.
    pub fn blocks_wide(&self) -> usize {
        self.blocks_wide
    }

    /// Number of block rows.
    pub fn blocks_high(&self) -> usize {
        self.blocks_high
    }

    /// Total number of blocks.
    pub fn len(&self) -> usize {
        self.blocks_wide * self.blocks_high
    }

    /// Always false for a validated grid.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raster index of block `(bx, by)`.
    pub fn index(&self, bx: usize, by: usize) -> usize {
        by * self.blocks_wide + bx
    }

    /// Top-left pixel of block `(bx, by)`.
    pub fn origin(&self, bx: usize, by: usize) -> (usize, usize) {
        (bx * self.block_size, by * self.block_size)
    }

    /// Iterates block coordinates in raster order.
    pub fn blocks(&self) -> impl Iterator<Item = (usize, usize)> {
        let wide = self.blocks_wide;
        (0..self.blocks_high).flat_map(move |by| (0..wide).map(move |bx| (bx, by)))
    }
}

//! Motion vectors and per-block motion fields.
//!
//! A vector `(x, y)` attached to block `(bx, by)` says that the content at
//! the block origin in the current frame is found at `origin + (x, y)` in
//! the previous frame.

use crate::grid::BlockGrid;
use crate::util::{MotionError, MotionResult};

/// Displacement of one block between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionVector {
    /// Horizontal displacement in pixels.
    pub x: f32,
    /// Vertical displacement in pixels.
    pub y: f32,
}

impl MotionVector {
    /// No motion.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a vector.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    pub fn magnitude(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub(crate) fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// One motion vector per block, in raster order.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionField {
    grid: BlockGrid,
    vectors: Vec<MotionVector>,
}

impl MotionField {
    /// Creates a field of zero vectors sized to `grid`.
    pub fn zeros(grid: BlockGrid) -> Self {
        Self {
            grid,
            vectors: vec![MotionVector::ZERO; grid.len()],
        }
    }

    /// Wraps raster-ordered vectors, checking there is one per block.
    pub fn from_vectors(grid: BlockGrid, vectors: Vec<MotionVector>) -> MotionResult<Self> {
        if vectors.len() != grid.len() {
            return Err(MotionError::FieldSizeMismatch {
                expected: grid.len(),
                got: vectors.len(),
            });
        }
        Ok(Self { grid, vectors })
    }

    /// Grid the field is laid out on.
    pub fn grid(&self) -> BlockGrid {
        self.grid
    }

    /// Vectors in raster order.
    pub fn vectors(&self) -> &[MotionVector] {
        &self.vectors
    }

    #[cfg(feature = "rayon")]
    pub(crate) fn vectors_mut(&mut self) -> &mut [MotionVector] {
        &mut self.vectors
    }

    /// Consumes the field and returns its vectors.
    pub fn into_vectors(self) -> Vec<MotionVector> {
        self.vectors
    }

    /// Number of vectors (equals the number of blocks).
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// True when the field holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Vector of block `(bx, by)`, or `None` outside the grid.
    pub fn get(&self, bx: usize, by: usize) -> Option<MotionVector> {
        if bx >= self.grid.blocks_wide() || by >= self.grid.blocks_high() {
            return None;
        }
        self.vectors.get(self.grid.index(bx, by)).copied()
    }

    pub(crate) fn set(&mut self, bx: usize, by: usize, vector: MotionVector) {
        let idx = self.grid.index(bx, by);
        if let Some(slot) = self.vectors.get_mut(idx) {
            *slot = vector;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MotionField, MotionVector};
    use crate::grid::BlockGrid;
    use crate::util::MotionError;

    #[test]
    fn field_rejects_wrong_vector_count() {
        let grid = BlockGrid::new(32, 32, 16).unwrap();
        let err = MotionField::from_vectors(grid, vec![MotionVector::ZERO; 3]).unwrap_err();
        assert_eq!(
            err,
            MotionError::FieldSizeMismatch {
                expected: 4,
                got: 3
            }
        );
    }

    #[test]
    fn field_get_is_bounds_checked() {
        let grid = BlockGrid::new(32, 16, 16).unwrap();
        let mut field = MotionField::zeros(grid);
        field.set(1, 0, MotionVector::new(2.0, -1.0));
        assert_eq!(field.get(1, 0), Some(MotionVector::new(2.0, -1.0)));
        assert_eq!(field.vectors()[1], MotionVector::new(2.0, -1.0));
        assert_eq!(field.get(2, 0), None);
        assert_eq!(field.get(0, 1), None);
    }
}

//! Block matching estimators.
//!
//! Two integer-precision estimators are provided: an exhaustive search of a
//! fixed window around each block (`full`) and the predictor-seeded diamond
//! search PMVFAST (`pmvfast`, built on `diamond`). Either field can then be
//! upgraded to quarter-pixel precision by `subpixel`. [`Estimator`] wires the
//! steps together behind a single configuration.

pub mod diamond;
pub mod full;
pub mod pmvfast;
pub mod subpixel;

use crate::field::MotionField;
use crate::grid::BlockGrid;
use crate::trace::{trace_event, trace_span};
use crate::util::{MotionError, MotionResult};
use crate::ImageView;

/// Upper bound on distortions accepted by the local searches.
pub(crate) const SAD_CEILING: f32 = 1e7;

/// Integer-precision search algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// Exhaustive search of a fixed window around each block.
    #[default]
    FullSearch,
    /// Predictive Motion Vector Field Adaptive Search Technique.
    Pmvfast,
}

impl Algorithm {
    /// Short lowercase name, as used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::FullSearch => "2dfs",
            Algorithm::Pmvfast => "pmvfast",
        }
    }
}

/// Estimation configuration.
#[derive(Clone, Debug)]
pub struct EstimateConfig {
    /// Integer search algorithm.
    pub algorithm: Algorithm,
    /// Block side length; must divide both frame dimensions.
    pub block_size: usize,
    /// Refine the integer field to quarter-pixel precision.
    pub subpixel: bool,
    /// Run block rows in parallel where there are no cross-block
    /// dependencies. Requires the `rayon` feature; ignored otherwise.
    pub parallel: bool,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::FullSearch,
            block_size: 16,
            subpixel: true,
            parallel: false,
        }
    }
}

/// Frame-pair motion estimator.
#[derive(Clone, Debug, Default)]
pub struct Estimator {
    config: EstimateConfig,
}

impl Estimator {
    /// Creates an estimator with the given configuration.
    pub fn new(config: EstimateConfig) -> Self {
        Self { config }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: EstimateConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &EstimateConfig {
        &self.config
    }

    /// Estimates the motion of `current` relative to `previous`.
    pub fn estimate(
        &self,
        current: ImageView<'_, u8>,
        previous: ImageView<'_, u8>,
    ) -> MotionResult<MotionField> {
        let cfg = &self.config;
        let _span = trace_span!(
            "estimate",
            algorithm = cfg.algorithm.name(),
            block_size = cfg.block_size,
            subpixel = cfg.subpixel
        )
        .entered();

        let mut field = self.estimate_integer(current, previous)?;
        if cfg.subpixel {
            self.refine(current, previous, &mut field)?;
        }
        trace_event!("estimate_done", vectors = field.len());
        Ok(field)
    }

    /// Runs only the integer-precision estimator.
    pub fn estimate_integer(
        &self,
        current: ImageView<'_, u8>,
        previous: ImageView<'_, u8>,
    ) -> MotionResult<MotionField> {
        let block_size = self.config.block_size;
        match self.config.algorithm {
            Algorithm::FullSearch => {
                #[cfg(feature = "rayon")]
                if self.config.parallel {
                    return full::full_search_par(current, previous, block_size);
                }
                full::full_search(current, previous, block_size)
            }
            Algorithm::Pmvfast => pmvfast::pmvfast(current, previous, block_size),
        }
    }

    /// Runs only the quarter-pixel refinement on an existing field.
    pub fn refine(
        &self,
        current: ImageView<'_, u8>,
        previous: ImageView<'_, u8>,
        field: &mut MotionField,
    ) -> MotionResult<()> {
        #[cfg(feature = "rayon")]
        if self.config.parallel {
            return subpixel::subpixel_refine_par(current, previous, field);
        }
        subpixel::subpixel_refine(current, previous, field)
    }
}

/// Validates a frame pair against a block size and returns its grid.
pub fn check_frames(
    current: ImageView<'_, u8>,
    previous: ImageView<'_, u8>,
    block_size: usize,
) -> MotionResult<BlockGrid> {
    if current.width() != previous.width() || current.height() != previous.height() {
        return Err(MotionError::FrameSizeMismatch {
            current: (current.width(), current.height()),
            previous: (previous.width(), previous.height()),
        });
    }
    BlockGrid::for_view(current, block_size)
}

/// Validates a frame pair against an existing field.
pub(crate) fn check_field(
    current: ImageView<'_, u8>,
    previous: ImageView<'_, u8>,
    field: &MotionField,
) -> MotionResult<BlockGrid> {
    let grid = check_frames(current, previous, field.grid().block_size())?;
    if field.len() != grid.len() {
        return Err(MotionError::FieldSizeMismatch {
            expected: grid.len(),
            got: field.len(),
        });
    }
    if field.grid() != grid {
        return Err(MotionError::InvalidInput(
            "motion field grid does not match the frames",
        ));
    }
    Ok(grid)
}

/// Running minimum over candidate distortions.
///
/// A candidate is only taken when it is strictly below the current minimum,
/// or below `ceiling` while nothing has been taken yet.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Best<T> {
    ceiling: f32,
    found: Option<(T, f32)>,
}

impl<T: Copy> Best<T> {
    pub(crate) fn below(ceiling: f32) -> Self {
        Self {
            ceiling,
            found: None,
        }
    }

    /// Current acceptance bound.
    pub(crate) fn threshold(&self) -> f32 {
        self.found.map_or(self.ceiling, |(_, sad)| sad)
    }

    /// Takes `item` if `sad` beats the threshold; returns whether it did.
    pub(crate) fn offer(&mut self, item: T, sad: f32) -> bool {
        if sad < self.threshold() {
            self.found = Some((item, sad));
            true
        } else {
            false
        }
    }

    /// Takes `item` unconditionally.
    pub(crate) fn replace(&mut self, item: T, sad: f32) {
        self.found = Some((item, sad));
    }

    pub(crate) fn item(&self) -> Option<T> {
        self.found.map(|(item, _)| item)
    }
}

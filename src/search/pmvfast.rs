//! PMVFAST block matching.
//!
//! "Predictive Motion Vector Field Adaptive Search Technique (PMVFAST) -
//! Enhancing Block Based Motion Estimation", A.M. Tourapis, O.C. Au and
//! M.L. Liou, Proceedings of SPIE, 2001.
//!
//! Blocks are visited in raster order so the left, top and top-right
//! neighbours are already resolved. Their vectors seed the search:
//!
//! 1. the median predictor is accepted outright when its SAD is below
//!    `median_stop`;
//! 2. otherwise the best in-bounds predictor becomes the diamond centre;
//! 3. a small diamond is used when the median is zero and the best
//!    predictor's SAD is low (`T2 < K`), a large diamond otherwise.

use crate::field::{MotionField, MotionVector};
use crate::kernel::sad;
use crate::search::check_frames;
use crate::search::diamond::{diamond_search, fits_strictly, DiamondPattern};
use crate::search::Best;
use crate::trace::{trace_event, trace_span};
use crate::util::MotionResult;
use crate::ImageView;

/// SAD bound for accepting a spatial predictor.
const PREDICTOR_SAD_CEILING: f32 = 10_000.0;

/// Block-size dependent PMVFAST thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PmvfastThresholds {
    /// Early termination bound for the median predictor's SAD.
    pub median_stop: f32,
    /// Lower clamp for `T1`.
    pub t1_min: f32,
    /// Upper clamp for `T1`.
    pub t1_max: f32,
    /// Added to the best predictor SAD to form `T2`.
    pub t2_offset: i32,
    /// `T2` bound below which a zero median selects the small diamond.
    pub k: i32,
}

impl PmvfastThresholds {
    /// Thresholds for 16x16 blocks, used for every size other than 8.
    pub const BLOCK_16: Self = Self {
        median_stop: 256.0,
        t1_min: 512.0,
        t1_max: 1024.0,
        t2_offset: 256,
        k: 1536,
    };

    /// Thresholds for 8x8 blocks.
    pub const BLOCK_8: Self = Self {
        median_stop: 64.0,
        t1_min: 128.0,
        t1_max: 256.0,
        t2_offset: 64,
        k: 384,
    };

    /// Selects the thresholds for `block_size`.
    pub fn for_block_size(block_size: usize) -> Self {
        if block_size == 8 {
            Self::BLOCK_8
        } else {
            Self::BLOCK_16
        }
    }
}

/// How a block's vector was obtained.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlockDecision {
    /// The median predictor was accepted without searching.
    EarlyStop,
    /// A diamond search ran from the best predictor.
    Searched {
        pattern: DiamondPattern,
        /// Best predictor SAD clamped to `[t1_min, t1_max]`. Informational.
        t1: i32,
        t2: i32,
    },
}

/// Collects the resolved left, top and top-right neighbour vectors, in
/// that order. The top-right neighbour is missing in the last column.
pub fn spatial_predictors(field: &MotionField, bx: usize, by: usize) -> Vec<MotionVector> {
    let mut predictors = Vec::with_capacity(3);
    if bx > 0 {
        predictors.extend(field.get(bx - 1, by));
    }
    if by > 0 {
        predictors.extend(field.get(bx, by - 1));
        predictors.extend(field.get(bx + 1, by - 1));
    }
    predictors
}

/// Median of the predictor set, truncated to whole pixels.
///
/// Two predictors give their mean; three give the component-wise median,
/// which need not be one of the inputs.
pub fn median_predictor(predictors: &[MotionVector]) -> (i32, i32) {
    match predictors {
        [] => (0, 0),
        [only] => (only.x as i32, only.y as i32),
        [a, b] => (((a.x + b.x) / 2.0) as i32, ((a.y + b.y) / 2.0) as i32),
        _ => {
            let mut xs: Vec<f32> = predictors.iter().map(|v| v.x).collect();
            let mut ys: Vec<f32> = predictors.iter().map(|v| v.y).collect();
            xs.sort_by(f32::total_cmp);
            ys.sort_by(f32::total_cmp);
            (xs[xs.len() / 2] as i32, ys[ys.len() / 2] as i32)
        }
    }
}

/// Resolves block `(bx, by)` and writes its vector into `field`.
pub fn estimate_block(
    current: ImageView<'_, u8>,
    previous: ImageView<'_, u8>,
    field: &mut MotionField,
    bx: usize,
    by: usize,
    thresholds: &PmvfastThresholds,
) -> BlockDecision {
    let grid = field.grid();
    let size = grid.block_size();
    let (ox, oy) = grid.origin(bx, by);
    let (fx, fy) = (ox as f32, oy as f32);

    let predictors = spatial_predictors(field, bx, by);
    let (medx, medy) = median_predictor(&predictors);
    let median = MotionVector::new(medx as f32, medy as f32);

    if fits_strictly(previous, fx + median.x, fy + median.y, size) {
        let med_sad = sad(current, previous, ox, oy, fx + median.x, fy + median.y, size);
        if med_sad < thresholds.median_stop {
            field.set(bx, by, median);
            return BlockDecision::EarlyStop;
        }
    }

    let mut best = Best::below(PREDICTOR_SAD_CEILING);
    for &predictor in &predictors {
        let sx = fx + predictor.x;
        let sy = fy + predictor.y;
        if fits_strictly(previous, sx, sy, size) {
            best.offer(predictor, sad(current, previous, ox, oy, sx, sy, size));
        }
    }
    let min_sad = best.threshold();
    let t1 = min_sad.clamp(thresholds.t1_min, thresholds.t1_max) as i32;
    let t2 = (min_sad + thresholds.t2_offset as f32) as i32;

    field.set(bx, by, best.item().unwrap_or(MotionVector::ZERO));

    let magmed = ((medx * medx + medy * medy) as f32).sqrt();
    let pattern = if magmed < 0.1 && t2 < thresholds.k {
        DiamondPattern::Small
    } else {
        DiamondPattern::Large
    };
    diamond_search(current, previous, field, bx, by, pattern);

    BlockDecision::Searched { pattern, t1, t2 }
}

/// Estimates one integer vector per block with PMVFAST.
///
/// Always sequential: each block reads its already-resolved neighbours.
pub fn pmvfast(
    current: ImageView<'_, u8>,
    previous: ImageView<'_, u8>,
    block_size: usize,
) -> MotionResult<MotionField> {
    let grid = check_frames(current, previous, block_size)?;
    let _span = trace_span!("pmvfast", blocks = grid.len(), block_size = block_size).entered();

    let thresholds = PmvfastThresholds::for_block_size(block_size);
    let mut field = MotionField::zeros(grid);
    let (mut early, mut small, mut large) = (0usize, 0usize, 0usize);

    for (bx, by) in grid.blocks() {
        match estimate_block(current, previous, &mut field, bx, by, &thresholds) {
            BlockDecision::EarlyStop => early += 1,
            BlockDecision::Searched {
                pattern: DiamondPattern::Small,
                ..
            } => small += 1,
            BlockDecision::Searched {
                pattern: DiamondPattern::Large,
                ..
            } => large += 1,
        }
    }

    trace_event!(
        "pmvfast_done",
        early_stop = early,
        small_diamond = small,
        large_diamond = large
    );
    Ok(field)
}

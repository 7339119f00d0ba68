//! Diamond-pattern local search used by PMVFAST.
//!
//! The search keeps the block's current vector in the motion field slot as
//! the pattern centre. Each round scores a worklist of pattern positions
//! relative to the centre; when a position beats the best SAD seen so far
//! the centre moves there and the next worklist holds only the positions of
//! the shifted pattern that were not already scored. The search stops when
//! no position in a round improves on the centre.

use crate::field::{MotionField, MotionVector};
use crate::kernel::sad;
use crate::search::{Best, SAD_CEILING};
use crate::ImageView;

/// Position of a candidate relative to the pattern centre.
///
/// The discriminant is the candidate's index in the pattern offset tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Centre = 0,
    Up = 1,
    Right = 2,
    Down = 3,
    Left = 4,
    UpRight = 5,
    DownRight = 6,
    DownLeft = 7,
    UpLeft = 8,
}

use Direction::*;

/// Search pattern shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiamondPattern {
    /// Centre, four orthogonal neighbours at distance 2 and four diagonal
    /// neighbours at distance 1.
    Large,
    /// Centre and four orthogonal neighbours at distance 1.
    Small,
}

const LARGE_OFFSETS: [(i32, i32); 9] = [
    (0, 0),
    (0, -2),
    (2, 0),
    (0, 2),
    (-2, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

const SMALL_OFFSETS: [(i32, i32); 5] = [(0, 0), (0, -1), (1, 0), (0, 1), (-1, 0)];

const LARGE_INITIAL: &[Direction] = &[
    Centre, Up, Right, Down, Left, UpRight, DownRight, DownLeft, UpLeft,
];

const SMALL_INITIAL: &[Direction] = &[Centre, Up, Right, Down, Left];

/// Next worklist after moving in the indexed direction.
const LARGE_NEXT: [&[Direction]; 9] = [
    &[],
    &[Left, UpLeft, Up, UpRight, Right],
    &[Up, UpRight, Right, DownRight, Down],
    &[Right, DownRight, Down, DownLeft, Left],
    &[Down, DownLeft, Left, UpLeft, Up],
    &[Up, UpRight, Right],
    &[Right, DownRight, Down],
    &[Down, DownLeft, Left],
    &[Left, UpLeft, Up],
];

const SMALL_NEXT: [&[Direction]; 5] = [
    &[],
    &[Up, Right, Left],
    &[Up, Right, Down],
    &[Right, Down, Left],
    &[Down, Left, Up],
];

impl DiamondPattern {
    /// Offset of `direction` from the centre, or `None` if the pattern has
    /// no such position.
    pub fn offset(self, direction: Direction) -> Option<(i32, i32)> {
        match self {
            DiamondPattern::Large => LARGE_OFFSETS.get(direction as usize).copied(),
            DiamondPattern::Small => SMALL_OFFSETS.get(direction as usize).copied(),
        }
    }

    /// Worklist of the first round.
    pub fn initial(self) -> &'static [Direction] {
        match self {
            DiamondPattern::Large => LARGE_INITIAL,
            DiamondPattern::Small => SMALL_INITIAL,
        }
    }

    /// Worklist after the centre moved towards `moved`.
    pub fn next(self, moved: Direction) -> &'static [Direction] {
        let table: &[&'static [Direction]] = match self {
            DiamondPattern::Large => &LARGE_NEXT,
            DiamondPattern::Small => &SMALL_NEXT,
        };
        table.get(moved as usize).copied().unwrap_or(&[])
    }
}

/// True when a block at `(sx, sy)` lies strictly inside `image`.
///
/// The far edge is exclusive, so the last whole-block origin on each axis
/// is rejected as well.
pub(crate) fn fits_strictly(image: ImageView<'_, u8>, sx: f32, sy: f32, size: usize) -> bool {
    sx >= 0.0
        && sy >= 0.0
        && sx + (size as f32) < image.width() as f32
        && sy + (size as f32) < image.height() as f32
}

/// Runs a diamond search for block `(bx, by)`, starting from the vector
/// already stored in its field slot. Returns the final vector, which is also
/// left in the slot.
///
/// Candidates whose block would leave the previous frame are skipped. If no
/// candidate can be scored in the first round the slot is left unchanged.
pub fn diamond_search(
    current: ImageView<'_, u8>,
    previous: ImageView<'_, u8>,
    field: &mut MotionField,
    bx: usize,
    by: usize,
    pattern: DiamondPattern,
) -> MotionVector {
    let grid = field.grid();
    let size = grid.block_size();
    let (ox, oy) = grid.origin(bx, by);
    let (fx, fy) = (ox as f32, oy as f32);

    let mut worklist = pattern.initial();
    let mut best = Best::below(SAD_CEILING);

    loop {
        let centre = field.get(bx, by).unwrap_or(MotionVector::ZERO);
        let mut winner = Centre;

        for &direction in worklist {
            let Some((dx, dy)) = pattern.offset(direction) else {
                continue;
            };
            let candidate = centre.offset(dx as f32, dy as f32);
            let sx = fx + candidate.x;
            let sy = fy + candidate.y;
            if !fits_strictly(previous, sx, sy, size) {
                continue;
            }
            let bdm = sad(current, previous, ox, oy, sx, sy, size);
            if best.offer(candidate, bdm) {
                winner = direction;
            }
        }

        if winner == Centre {
            return centre;
        }
        if let Some(vector) = best.item() {
            field.set(bx, by, vector);
        }
        worklist = pattern.next(winner);
    }
}

#[cfg(test)]
mod tests {
    use super::{diamond_search, DiamondPattern, Direction, Direction::*};
    use crate::field::{MotionField, MotionVector};
    use crate::grid::BlockGrid;
    use crate::ImageView;
    use std::collections::HashSet;

    const ALL: [Direction; 9] = [
        Centre, Up, Right, Down, Left, UpRight, DownRight, DownLeft, UpLeft,
    ];

    fn positions(pattern: DiamondPattern, centre: (i32, i32)) -> HashSet<(i32, i32)> {
        pattern
            .initial()
            .iter()
            .filter_map(|&d| pattern.offset(d))
            .map(|(dx, dy)| (centre.0 + dx, centre.1 + dy))
            .collect()
    }

    fn check_transitions(pattern: DiamondPattern) {
        for &moved in &pattern.initial()[1..] {
            let centre = pattern.offset(moved).unwrap();
            let old = positions(pattern, (0, 0));
            let fresh: HashSet<_> = positions(pattern, centre)
                .difference(&old)
                .copied()
                .collect();
            let listed: HashSet<_> = pattern
                .next(moved)
                .iter()
                .map(|&d| {
                    let (dx, dy) = pattern.offset(d).unwrap();
                    (centre.0 + dx, centre.1 + dy)
                })
                .collect();
            assert_eq!(listed, fresh, "{pattern:?} after {moved:?}");
        }
    }

    #[test]
    fn transitions_list_exactly_the_unscored_positions() {
        check_transitions(DiamondPattern::Large);
        check_transitions(DiamondPattern::Small);
    }

    #[test]
    fn centre_move_ends_search() {
        assert!(DiamondPattern::Large.next(Centre).is_empty());
        assert!(DiamondPattern::Small.next(Centre).is_empty());
        assert_eq!(DiamondPattern::Small.offset(UpLeft), None);
        assert_eq!(ALL.len(), DiamondPattern::Large.initial().len());
    }

    /// Radial bowl: every shift away from the true one costs SAD.
    fn bowl(width: usize, height: usize, cx: i64, cy: i64) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height as i64 {
            for x in 0..width as i64 {
                let d2 = (x - cx).pow(2) + (y - cy).pow(2);
                data.push(d2.min(255) as u8);
            }
        }
        data
    }

    fn shifted(src: &[u8], width: usize, height: usize, dx: i64, dy: i64) -> Vec<u8> {
        let mut out = vec![0u8; width * height];
        for y in 0..height as i64 {
            for x in 0..width as i64 {
                let (sx, sy) = (x + dx, y + dy);
                if sx >= 0 && sy >= 0 && sx < width as i64 && sy < height as i64 {
                    out[(y as usize) * width + x as usize] = src[(sy as usize) * width + sx as usize];
                }
            }
        }
        out
    }

    #[test]
    fn searches_converge_on_bowl() {
        let (width, height) = (32, 32);
        let previous = bowl(width, height, 12, 12);
        let current = shifted(&previous, width, height, 2, 2);
        let prev_view = ImageView::from_slice(&previous, width, height).unwrap();
        let cur_view = ImageView::from_slice(&current, width, height).unwrap();
        let grid = BlockGrid::new(width, height, 8).unwrap();

        for pattern in [DiamondPattern::Large, DiamondPattern::Small] {
            let mut field = MotionField::zeros(grid);
            let found = diamond_search(cur_view, prev_view, &mut field, 1, 1, pattern);
            assert_eq!(found, MotionVector::new(2.0, 2.0), "{pattern:?}");
            assert_eq!(field.get(1, 1), Some(found));

            let mut again = MotionField::zeros(grid);
            let repeat = diamond_search(cur_view, prev_view, &mut again, 1, 1, pattern);
            assert_eq!(repeat, found);
        }
    }

    #[test]
    fn all_candidates_out_of_bounds_leaves_slot_unchanged() {
        let data = vec![9u8; 16 * 16];
        let view = ImageView::from_slice(&data, 16, 16).unwrap();
        let grid = BlockGrid::new(16, 16, 16).unwrap();
        let mut field = MotionField::zeros(grid);
        let found = diamond_search(view, view, &mut field, 0, 0, DiamondPattern::Large);
        assert_eq!(found, MotionVector::ZERO);
    }
}

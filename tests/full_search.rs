use blockmotion::search::full::search_window;
use blockmotion::{full_search, BlockGrid, ImageView, MotionVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_frame(width: usize, height: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height).map(|_| rng.random::<u8>()).collect()
}

/// `out(x, y) = src(x + dx, y + dy)`, with `fill` where that falls outside.
fn shift_frame(src: &[u8], width: usize, height: usize, dx: i64, dy: i64, fill: u8) -> Vec<u8> {
    let mut out = vec![fill; width * height];
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let (sx, sy) = (x + dx, y + dy);
            if sx >= 0 && sy >= 0 && sx < width as i64 && sy < height as i64 {
                out[y as usize * width + x as usize] = src[sy as usize * width + sx as usize];
            }
        }
    }
    out
}

#[test]
fn recovers_known_integer_shift() {
    let (width, height, block) = (64, 64, 16);
    let (dx, dy) = (3i64, -2i64);
    let previous = random_frame(width, height, 11);
    let current = shift_frame(&previous, width, height, dx, dy, 128);
    let prev_view = ImageView::from_slice(&previous, width, height).unwrap();
    let cur_view = ImageView::from_slice(&current, width, height).unwrap();

    let field = full_search(cur_view, prev_view, block).unwrap();
    let grid = field.grid();
    assert_eq!(field.len(), 16);

    for (bx, by) in grid.blocks() {
        let (ox, oy) = grid.origin(bx, by);
        let inside = ox as i64 + dx + block as i64 <= width as i64 && oy as i64 + dy >= 0;
        if inside {
            assert_eq!(
                field.get(bx, by),
                Some(MotionVector::new(dx as f32, dy as f32)),
                "block ({bx}, {by})"
            );
        }
    }
}

#[test]
fn identical_frames_give_zero_field() {
    let previous = random_frame(32, 48, 5);
    let view = ImageView::from_slice(&previous, 32, 48).unwrap();
    let field = full_search(view, view, 8).unwrap();
    assert_eq!(field.len(), 24);
    assert!(field.vectors().iter().all(|v| *v == MotionVector::ZERO));
}

#[test]
fn vectors_stay_inside_search_window() {
    let (width, height) = (48, 48);
    let previous = random_frame(width, height, 1);
    let current = random_frame(width, height, 2);
    let prev_view = ImageView::from_slice(&previous, width, height).unwrap();
    let cur_view = ImageView::from_slice(&current, width, height).unwrap();
    let grid = BlockGrid::new(width, height, 16).unwrap();

    let field = full_search(cur_view, prev_view, 16).unwrap();
    for (bx, by) in grid.blocks() {
        let (ox, oy) = grid.origin(bx, by);
        let (x0, y0, x1, y1) = search_window(grid, ox, oy);
        let v = field.get(bx, by).unwrap();
        let (x, y) = (ox as i64 + v.x as i64, oy as i64 + v.y as i64);
        assert!(x >= x0 && x <= x1 && y >= y0 && y <= y1);
    }
}

#[test]
fn rejects_mismatched_frames() {
    let a = vec![0u8; 32 * 32];
    let b = vec![0u8; 32 * 32];
    let current = ImageView::from_slice(&a, 32, 32).unwrap();
    let previous = ImageView::from_slice(&b, 32, 32).unwrap();
    assert!(full_search(current, previous, 12).is_err());

    let small = ImageView::from_slice(&b[..32 * 16], 32, 16).unwrap();
    assert!(full_search(current, small, 16).is_err());
}

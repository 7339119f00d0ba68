use blockmotion::{full_search, pmvfast, ImageView, MotionVector, PmvfastThresholds};

fn hash_texture(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            data.push((((x * 13) ^ (y * 7) ^ (x * y)) & 0xff) as u8);
        }
    }
    data
}

fn smooth_texture(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let (xf, yf) = (x as f64, y as f64);
            let value =
                128.0 + 50.0 * (0.35 * xf + 0.2 * yf).sin() + 50.0 * (0.27 * yf - 0.15 * xf).cos();
            data.push(value.round() as u8);
        }
    }
    data
}

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

fn agrees_with_full_search_on_interior(block: usize) {
    let (width, height) = (64, 64);
    let previous = hash_texture(width, height);
    let current = shift_frame(&previous, width, height, 1, 1, 0);
    let prev_view = ImageView::from_slice(&previous, width, height).unwrap();
    let cur_view = ImageView::from_slice(&current, width, height).unwrap();

    let fast = pmvfast(cur_view, prev_view, block).unwrap();
    let exhaustive = full_search(cur_view, prev_view, block).unwrap();
    let grid = fast.grid();
    assert_eq!(grid, exhaustive.grid());

    for (bx, by) in grid.blocks() {
        if bx + 1 == grid.blocks_wide() || by + 1 == grid.blocks_high() {
            continue;
        }
        assert_eq!(fast.get(bx, by), exhaustive.get(bx, by), "block ({bx}, {by})");
        assert_eq!(fast.get(bx, by), Some(MotionVector::new(1.0, 1.0)));
    }
}

#[test]
fn matches_full_search_on_textured_shift_16() {
    agrees_with_full_search_on_interior(16);
}

#[test]
fn matches_full_search_on_textured_shift_8() {
    agrees_with_full_search_on_interior(8);
}

#[test]
fn diamond_walk_finds_smooth_shift() {
    let (width, height) = (64, 64);
    let previous = smooth_texture(width, height);
    let current = shift_frame(&previous, width, height, 3, 1, 128);
    let prev_view = ImageView::from_slice(&previous, width, height).unwrap();
    let cur_view = ImageView::from_slice(&current, width, height).unwrap();

    let field = pmvfast(cur_view, prev_view, 16).unwrap();
    for by in 0..3 {
        for bx in 0..3 {
            assert_eq!(
                field.get(bx, by),
                Some(MotionVector::new(3.0, 1.0)),
                "block ({bx}, {by})"
            );
        }
    }
}

#[test]
fn flat_frames_keep_zero_vectors_away_from_border() {
    let data = vec![77u8; 64 * 64];
    let view = ImageView::from_slice(&data, 64, 64).unwrap();
    let field = pmvfast(view, view, 16).unwrap();
    assert_eq!(field.len(), 16);
    for by in 0..3 {
        for bx in 0..3 {
            assert_eq!(field.get(bx, by), Some(MotionVector::ZERO));
        }
    }
    assert!(field.vectors().iter().all(|v| v.x.fract() == 0.0 && v.y.fract() == 0.0));
}

#[test]
fn output_is_deterministic() {
    let (width, height) = (64, 48);
    let previous = smooth_texture(width, height);
    let current = shift_frame(&previous, width, height, -2, 1, 128);
    let prev_view = ImageView::from_slice(&previous, width, height).unwrap();
    let cur_view = ImageView::from_slice(&current, width, height).unwrap();

    let first = pmvfast(cur_view, prev_view, 16).unwrap();
    let second = pmvfast(cur_view, prev_view, 16).unwrap();
    assert_eq!(first, second);
}

#[test]
fn thresholds_follow_block_size() {
    assert_eq!(PmvfastThresholds::for_block_size(8), PmvfastThresholds::BLOCK_8);
    assert_eq!(PmvfastThresholds::for_block_size(16), PmvfastThresholds::BLOCK_16);
    assert_eq!(PmvfastThresholds::for_block_size(32), PmvfastThresholds::BLOCK_16);
}

#[test]
fn rejects_non_tiling_block_size() {
    let data = vec![0u8; 40 * 40];
    let view = ImageView::from_slice(&data, 40, 40).unwrap();
    assert!(pmvfast(view, view, 16).is_err());
}

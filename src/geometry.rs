use crate::constants::{
    CELL_BIAS, CELL_HEIGHT, CELL_WIDTH, PIXEL_BIAS, TUNNEL_MAX_X, TUNNEL_MIN_X,
};
use crate::types::{Cell, PixelPos};

const SNAP_EPSILON: f32 = 1e-3;

fn axis_to_cell(pixel: f32, size: f32) -> i32 {
    let q = (pixel - PIXEL_BIAS) / size;
    let nearest = q.round();
    // A cell's own corner must map back to it even after float error.
    let whole = if (q - nearest).abs() < SNAP_EPSILON {
        nearest
    } else {
        q.trunc()
    };
    whole as i32 + CELL_BIAS
}

pub fn pixel_to_cell(pos: PixelPos) -> Cell {
    Cell::new(
        axis_to_cell(pos.x, CELL_WIDTH),
        axis_to_cell(pos.y, CELL_HEIGHT),
    )
}

pub fn cell_to_pixel(cell: Cell) -> PixelPos {
    PixelPos::new(
        (cell.x - CELL_BIAS) as f32 * CELL_WIDTH + PIXEL_BIAS,
        (cell.y - CELL_BIAS) as f32 * CELL_HEIGHT + PIXEL_BIAS,
    )
}

pub fn cell_center(cell: Cell) -> PixelPos {
    let corner = cell_to_pixel(cell);
    PixelPos::new(corner.x + CELL_WIDTH / 2.0, corner.y + CELL_HEIGHT / 2.0)
}

pub fn distance_sq(a: PixelPos, b: PixelPos) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dx * dx + dy * dy
}

/// Squared distance measured in pixels between two cells.
pub fn cell_distance_sq(a: Cell, b: Cell) -> f32 {
    distance_sq(cell_to_pixel(a), cell_to_pixel(b))
}

/// Squared distance measured in whole cells.
pub fn grid_distance_sq(a: Cell, b: Cell) -> i32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dx * dx + dy * dy
}

pub fn wrap_tunnel(x: f32) -> f32 {
    let mut x = x;
    if x > TUNNEL_MAX_X {
        x = TUNNEL_MIN_X;
    }
    if x < TUNNEL_MIN_X {
        x = TUNNEL_MAX_X;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-3
    }

    #[test]
    fn cell_corner_round_trips() {
        for x in -200..300 {
            let cell = Cell::new(x, 300 - x);
            assert_eq!(pixel_to_cell(cell_to_pixel(cell)), cell, "cell {:?}", cell);
        }
    }

    #[test]
    fn cell_center_maps_into_its_cell() {
        for x in 11..60 {
            let cell = Cell::new(x, x);
            assert_eq!(pixel_to_cell(cell_center(cell)), cell);
        }
    }

    #[test]
    fn reference_landmarks() {
        assert!(approx_eq(cell_center(Cell::new(27, 22)).x, 118.325));
        assert!(approx_eq(cell_center(Cell::new(27, 22)).y, 89.17));
        assert!(approx_eq(cell_center(Cell::new(27, 25)).y, 111.91));
        assert_eq!(pixel_to_cell(PixelPos::new(120.0, 90.0)), Cell::new(27, 22));
        assert_eq!(pixel_to_cell(PixelPos::new(125.0, 180.0)), Cell::new(28, 34));
        assert_eq!(pixel_to_cell(PixelPos::new(-4.0, 108.0)), Cell::new(11, 24));
        assert_eq!(pixel_to_cell(PixelPos::new(248.0, 113.0)), Cell::new(45, 25));
    }

    #[test]
    fn negative_offsets_truncate_toward_zero() {
        assert_eq!(pixel_to_cell(PixelPos::new(0.0, 0.0)), Cell::new(11, 11));
        assert_eq!(pixel_to_cell(PixelPos::new(-6.0, -6.0)), Cell::new(10, 10));
    }

    #[test]
    fn tunnel_wraps_both_edges() {
        assert_eq!(wrap_tunnel(248.5), -4.0);
        assert_eq!(wrap_tunnel(-4.5), 248.0);
        assert_eq!(wrap_tunnel(100.0), 100.0);
        assert_eq!(wrap_tunnel(248.0), 248.0);
    }

    #[test]
    fn distances() {
        let a = Cell::new(0, 0);
        let b = Cell::new(3, 4);
        assert_eq!(grid_distance_sq(a, b), 25);
        let expected = (3.0 * CELL_WIDTH).powi(2) + (4.0 * CELL_HEIGHT).powi(2);
        assert!((cell_distance_sq(a, b) - expected).abs() < 1e-2);
    }
}

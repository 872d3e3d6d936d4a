use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let (mut x, mut y) = (x0, y0);

    loop {
        canvas.set_pixel_signed(x, y);
        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Rough bounding-box test of a segment against a `width` x `height` pixel area
#[inline(always)]
pub fn segment_might_be_visible(p1: (i32, i32), p2: (i32, i32), width: usize, height: usize) -> bool {
    let (min_x, max_x) = (p1.0.min(p2.0), p1.0.max(p2.0));
    let (min_y, max_y) = (p1.1.min(p2.1), p1.1.max(p2.1));
    max_x >= 0 && min_x < width as i32 && max_y >= 0 && min_y < height as i32
}

/// Draw a projected polyline, skipping off-screen segments and segments that
/// jump across the whole canvas (ring wrap at the antimeridian)
pub fn draw_polyline(canvas: &mut BrailleCanvas, points: impl IntoIterator<Item = (i32, i32)>) {
    let width = canvas.width() * 2;
    let height = canvas.height() * 4;
    let mut prev: Option<(i32, i32)> = None;

    for p in points {
        if let Some(q) = prev {
            let jump = ((p.0 - q.0).abs() + (p.1 - q.1).abs()) as usize;
            if jump < width && segment_might_be_visible(q, p, width, height) {
                draw_line(canvas, q.0, q.1, p.0, p.1);
            }
        }
        prev = Some(p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        // Top dot row of every cell
        assert_eq!(canvas.row_to_string(0), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.glyph(0, 0), Some('⡇'));
        assert_eq!(canvas.glyph(0, 1), Some('⡇'));
    }

    #[test]
    fn test_polyline_skips_wrapping_segment() {
        let mut canvas = BrailleCanvas::new(10, 1);
        // Jump from the left edge to the right edge is longer than the canvas
        draw_polyline(&mut canvas, [(0, 0), (25, 0)]);
        assert_eq!(canvas.glyph(5, 0), None);

        draw_polyline(&mut canvas, [(0, 0), (3, 0)]);
        assert!(canvas.glyph(0, 0).is_some());
    }

    #[test]
    fn test_offscreen_segment_is_culled() {
        assert!(!segment_might_be_visible((-10, -10), (-2, -5), 10, 10));
        assert!(segment_might_be_visible((-10, 5), (5, 5), 10, 10));
    }
}

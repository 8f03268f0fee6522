use crate::braille::BrailleCanvas;

/// Draw a point marker (small cross)
pub fn draw_marker(canvas: &mut BrailleCanvas, x: i32, y: i32, size: i32) {
    for i in -size..=size {
        canvas.set_pixel(x + i, y);
        canvas.set_pixel(x, y + i);
    }
}

/// Draw a filled circle (for place dots)
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel(cx + dx, cy + dy);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_is_a_cross() {
        let mut canvas = BrailleCanvas::new(2, 1);
        draw_marker(&mut canvas, 1, 1, 1);
        // Dots (1,0) (0,1) (1,1) (2,1) (1,2): 0x08|0x02|0x10|0x20 and 0x02
        assert_eq!(canvas.glyph(0, 0), Some('\u{283A}'));
        assert_eq!(canvas.glyph(1, 0), Some('\u{2802}'));
    }

    #[test]
    fn test_zero_radius_circle_is_one_dot() {
        let mut canvas = BrailleCanvas::new(1, 1);
        draw_circle(&mut canvas, 1, 3, 0);
        assert_eq!(canvas.glyph(0, 0), Some('\u{2880}'));
    }
}

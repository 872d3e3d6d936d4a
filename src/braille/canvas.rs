/// Braille canvas for sub-cell line drawing in the terminal.
/// Each character cell holds a 2x4 dot grid; patterns live at U+2800..U+28FF.
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    cells: Vec<u8>, // Dot bits per character, row-major
}

/// Dot bit for (x % 2, y % 4)
const DOT_BITS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

const BLANK: char = '\u{2800}';

impl BrailleCanvas {
    /// Canvas of `width` x `height` characters (`2*width` x `4*height` dots)
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Set the dot at pixel (x, y); out-of-range pixels are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let cx = x / 2;
        let cy = y / 4;
        if cx >= self.width || cy >= self.height {
            return;
        }
        self.cells[cy * self.width + cx] |= DOT_BITS[x % 2][y % 4];
    }

    /// Signed variant; negative coordinates are ignored
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Braille glyph for a character cell, `None` when no dot is set
    pub fn glyph(&self, cx: usize, cy: usize) -> Option<char> {
        if cx >= self.width || cy >= self.height {
            return None;
        }
        match self.cells[cy * self.width + cx] {
            0 => None,
            bits => char::from_u32(BLANK as u32 + bits as u32),
        }
    }

    /// One row of glyphs, blank cells as U+2800
    pub fn row_to_string(&self, row: usize) -> String {
        (0..self.width)
            .map(|cx| self.glyph(cx, row).unwrap_or(BLANK))
            .collect()
    }
}

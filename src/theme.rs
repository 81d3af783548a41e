/// Font indices understood by the drawing backends
pub mod font {
    pub const HELVETICA: u8 = 0;
    pub const HELVETICA_BOLD: u8 = 1;
    pub const HELVETICA_ITALIC: u8 = 2;
    pub const HELVETICA_BOLD_ITALIC: u8 = 3;
    pub const COURIER: u8 = 4;
    pub const COURIER_BOLD: u8 = 5;
}

#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub background_color: u32,
    pub selection_color: u32,
    pub cursor_color: u32,
    pub text_color: u32,

    pub quote_bar_color: u32,
    pub quote_bar_width: i32,
    pub quote_text_color: u32,

    // Code blocks are drawn inside a shaded wrapper box
    pub code_background: u32,
    pub code_border: u32,
    pub code_padding: i32,

    pub padding_vertical: i32,
    pub padding_horizontal: i32,
    pub block_spacing: i32,

    pub font_size: u8,
    pub heading_sizes: [u8; 6],
}

impl Theme {
    pub fn with_font_size(font_size: u8) -> Self {
        let base = font_size.clamp(8, 72);
        Self {
            font_size: base,
            heading_sizes: [
                base + 10,
                base + 6,
                base + 4,
                base + 2,
                base,
                base.saturating_sub(1),
            ],
            ..Self::default()
        }
    }

    /// Font size for headings of the given level (1-6)
    pub fn heading_size(&self, level: u8) -> u8 {
        let index = level.clamp(1, 6) as usize - 1;
        self.heading_sizes[index]
    }

    /// Line height for text of the given size
    pub fn line_height(&self, size: u8) -> i32 {
        ((size as f32) * 1.3).ceil() as i32
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background_color: 0xFFFFF5FF, // Off-white background
            selection_color: 0xB4D5FEFF,  // Light blue selection color
            cursor_color: 0x000000FF,
            text_color: 0x000000FF,
            quote_bar_color: 0xCCCCCCFF,
            quote_bar_width: 4,
            quote_text_color: 0x555555FF,
            code_background: 0xF2F2F2FF,
            code_border: 0xDDDDDDFF,
            code_padding: 8,
            padding_vertical: 10,
            padding_horizontal: 25,
            block_spacing: 6,
            font_size: 14,
            heading_sizes: [24, 20, 18, 16, 14, 13],
        }
    }
}

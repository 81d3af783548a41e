// FLTK implementation of DrawContext

use crate::draw_context::DrawContext;
use fltk::{draw as fltk_draw, enums::*};

pub struct FltkDrawContext {
    has_focus: bool,
    is_active: bool,
}

impl FltkDrawContext {
    pub fn new(has_focus: bool, is_active: bool) -> Self {
        FltkDrawContext {
            has_focus,
            is_active,
        }
    }

    /// Grey out colors of a deactivated widget
    fn effective_color(&self, color: u32) -> Color {
        let r = ((color >> 24) & 0xFF) as u8;
        let g = ((color >> 16) & 0xFF) as u8;
        let b = ((color >> 8) & 0xFF) as u8;
        if self.is_active {
            Color::from_rgb(r, g, b)
        } else {
            let gray = ((r as u16 + g as u16 + b as u16) / 3) as u8;
            Color::from_rgb(
                ((r as u16 + gray as u16) / 2) as u8,
                ((g as u16 + gray as u16) / 2) as u8,
                ((b as u16 + gray as u16) / 2) as u8,
            )
        }
    }
}

impl DrawContext for FltkDrawContext {
    fn set_color(&mut self, color: u32) {
        fltk_draw::set_draw_color(self.effective_color(color));
    }

    fn set_font(&mut self, font: u8, size: u8) {
        fltk_draw::set_font(Font::by_index(font as usize), size as i32);
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32) {
        fltk_draw::draw_text2(text, x, y, 0, 0, Align::Left);
    }

    fn draw_rect_filled(&mut self, x: i32, y: i32, w: i32, h: i32) {
        fltk_draw::draw_rectf(x, y, w, h);
    }

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        fltk_draw::draw_line(x1, y1, x2, y2);
    }

    fn text_width(&mut self, text: &str, font: u8, size: u8) -> f64 {
        fltk_draw::set_font(Font::by_index(font as usize), size as i32);
        fltk_draw::width(text)
    }

    fn push_clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        fltk_draw::push_clip(x, y, w, h);
    }

    fn pop_clip(&mut self) {
        fltk_draw::pop_clip();
    }

    fn has_focus(&self) -> bool {
        self.has_focus
    }
}

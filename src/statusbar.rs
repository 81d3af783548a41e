use fltk::{prelude::*, *};

/// Helper function to create a brighter version of a color
fn brighten_color(color: enums::Color, factor: f32) -> enums::Color {
    let (r, g, b) = color.to_rgb();
    let new_r = ((r as f32 * factor).min(255.0)) as u8;
    let new_g = ((g as f32 * factor).min(255.0)) as u8;
    let new_b = ((b as f32 * factor).min(255.0)) as u8;
    enums::Color::from_rgb(new_r, new_g, new_b)
}

/// Bottom bar with the Save button on the left and the save status on the right
pub struct StatusBar {
    background: frame::Frame,
    save_button: button::Button,
    save_status: frame::Frame,
}

impl StatusBar {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        let bg_color = enums::Color::from_rgb(136, 167, 246);
        let text_color = enums::Color::White;
        let hover_color = brighten_color(bg_color, 1.2);

        let mut background = frame::Frame::new(x, y, w, h, None);
        background.set_frame(enums::FrameType::FlatBox);
        background.set_color(bg_color);

        let mut save_button = button::Button::new(x + 5, y, 80, h, "Save");
        save_button.set_frame(enums::FrameType::FlatBox);
        save_button.set_label_size(app::font_size() - 1);
        save_button.set_color(bg_color);
        save_button.set_label_color(text_color);
        save_button.set_tooltip("Save the document (Ctrl+S)");

        let mut but2 = save_button.clone();
        save_button.handle(move |_, evt| match evt {
            enums::Event::Enter => {
                but2.set_color(hover_color);
                but2.redraw();
                true
            }
            enums::Event::Leave => {
                but2.set_color(bg_color);
                but2.redraw();
                true
            }
            _ => false,
        });

        let mut save_status = frame::Frame::new(x + 90, y, w - 95, h, None);
        save_status.set_frame(enums::FrameType::FlatBox);
        save_status.set_align(enums::Align::Right | enums::Align::Inside);
        save_status.set_label_size(app::font_size() - 1);
        save_status.set_color(bg_color);
        save_status.set_label_color(text_color);

        StatusBar {
            background,
            save_button,
            save_status,
        }
    }

    /// Register a callback for the Save button
    pub fn on_save<F: FnMut(&mut button::Button) + 'static>(&mut self, cb: F) {
        self.save_button.set_callback(cb);
    }

    /// Set the save status text (right side)
    pub fn set_status(&mut self, text: &str) {
        self.save_status.set_label(text);
    }

    pub fn resize(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.background.resize(x, y, w, h);
        self.save_button.resize(x + 5, y, 80, h);
        self.save_status.resize(x + 90, y, w - 95, h);
    }
}

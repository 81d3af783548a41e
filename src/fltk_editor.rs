// FLTK editing surface: draws a RichDisplay and routes events into an EditorSession

use crate::fltk_draw_context::FltkDrawContext;
use crate::richtext::key_commands::KeyCommand;
use crate::richtext::rich_display::RichDisplay;
use crate::session::EditorSession;
use fltk::{app::MouseWheel, enums::*, prelude::*, valuator::Scrollbar};
use std::cell::RefCell;
use std::rc::Rc;

type Callback = Rc<RefCell<Option<Box<dyn FnMut() + 'static>>>>;

const SCROLLBAR_SIZE: i32 = 15;

pub struct FltkEditor {
    pub group: fltk::group::Group,
    pub display: Rc<RefCell<RichDisplay>>,
    change_cb: Callback,
    save_cb: Callback,
}

fn has_focus(w: &fltk::group::Group) -> bool {
    fltk::app::focus().map(|f| f.as_base_widget()).as_ref() == Some(&w.as_base_widget())
}

fn fire(cb: &Callback) {
    if let Some(cb) = &mut *cb.borrow_mut() {
        (cb)();
    }
}

/// Keep the caret in view and the scrollbar in sync after an edit
fn caret_into_view(
    w: &mut fltk::group::Group,
    display: &Rc<RefCell<RichDisplay>>,
    session: &Rc<RefCell<EditorSession>>,
    vscroll: &mut Scrollbar,
) {
    let mut ctx = FltkDrawContext::new(has_focus(w), w.active());
    let new_scroll = {
        let mut disp = display.borrow_mut();
        disp.reset_blink();
        disp.ensure_cursor_visible(session.borrow().editor(), &mut ctx);
        disp.scroll_offset()
    };
    vscroll.set_value(new_scroll as f64);
    w.redraw();
}

/// Map a key press with the command modifier to a key command
fn command_for_shortcut(key: Key) -> Option<KeyCommand> {
    if key == Key::from_char('b') {
        Some(KeyCommand::Bold)
    } else if key == Key::from_char('i') {
        Some(KeyCommand::Italic)
    } else if key == Key::from_char('u') {
        Some(KeyCommand::Underline)
    } else if key == Key::from_char('j') {
        Some(KeyCommand::Code)
    } else {
        None
    }
}

impl FltkEditor {
    pub fn new(
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        session: Rc<RefCell<EditorSession>>,
        display: RichDisplay,
    ) -> Self {
        let mut widget = fltk::group::Group::new(x, y, w, h, None);

        let display = Rc::new(RefCell::new(display));
        display
            .borrow_mut()
            .resize(x, y, w - SCROLLBAR_SIZE, h);

        let change_callback: Callback = Rc::new(RefCell::new(None));
        let save_callback: Callback = Rc::new(RefCell::new(None));

        let mut vscroll = Scrollbar::new(x + w - SCROLLBAR_SIZE, y, SCROLLBAR_SIZE, h, None);
        vscroll.set_type(fltk::valuator::ScrollbarType::Vertical);
        vscroll.set_bounds(0.0, 1000.0);
        vscroll.set_slider_size(0.5);
        vscroll.set_step(1.0, 10);
        vscroll.set_value(0.0);
        vscroll.set_callback({
            let display = display.clone();
            let mut widget_clone = widget.clone();
            move |s| {
                display.borrow_mut().set_scroll(s.value() as i32);
                widget_clone.redraw();
            }
        });

        widget.draw({
            let display = display.clone();
            let session = session.clone();
            let mut vscroll_draw = vscroll.clone();
            move |w| {
                let mut disp = display.borrow_mut();
                let mut ctx = FltkDrawContext::new(has_focus(w), w.active());

                disp.draw(session.borrow().editor(), &mut ctx);

                let content_height = disp.content_height();
                let visible_height = disp.h();
                if content_height > 0 {
                    let max_scroll = (content_height - visible_height).max(0) as f64;
                    let fraction = (visible_height as f64 / content_height as f64).min(1.0) as f32;
                    vscroll_draw.set_bounds(0.0, max_scroll);
                    vscroll_draw.set_slider_size(fraction);
                    vscroll_draw.set_value(disp.scroll_offset() as f64);
                }

                w.draw_children();
            }
        });

        widget.handle({
            let display = display.clone();
            let session = session.clone();
            let mut vscroll_handle = vscroll.clone();
            let change_cb = change_callback.clone();
            let save_cb = save_callback.clone();
            move |w, event| {
                match event {
                    Event::Push => {
                        let pos = display
                            .borrow()
                            .xy_to_position(fltk::app::event_x() - w.x(), fltk::app::event_y() - w.y());
                        {
                            let mut sess = session.borrow_mut();
                            let editor = sess.editor_mut();
                            if fltk::app::event_state().contains(Shortcut::Shift) {
                                editor.extend_selection_to(pos);
                            } else {
                                editor.set_cursor(pos);
                            }
                        }
                        w.take_focus().ok();
                        caret_into_view(w, &display, &session, &mut vscroll_handle);
                        true
                    }
                    Event::Drag => {
                        let pos = display
                            .borrow()
                            .xy_to_position(fltk::app::event_x() - w.x(), fltk::app::event_y() - w.y());
                        session.borrow_mut().editor_mut().extend_selection_to(pos);
                        caret_into_view(w, &display, &session, &mut vscroll_handle);
                        true
                    }
                    Event::MouseWheel => {
                        let amount = match fltk::app::event_dy() {
                            MouseWheel::Up => -20,
                            MouseWheel::Down => 20,
                            _ => return false,
                        };
                        let new_scroll = {
                            let mut disp = display.borrow_mut();
                            let max_scroll = (disp.content_height() - disp.h()).max(0);
                            let scroll = (disp.scroll_offset() + amount).clamp(0, max_scroll);
                            disp.set_scroll(scroll);
                            scroll
                        };
                        vscroll_handle.set_value(new_scroll as f64);
                        w.redraw();
                        true
                    }
                    Event::KeyDown => {
                        let key = fltk::app::event_key();
                        let text_input = fltk::app::event_text();
                        let state = fltk::app::event_state();

                        #[cfg(target_os = "macos")]
                        let cmd_modifier = state.contains(Shortcut::Command);
                        #[cfg(not(target_os = "macos"))]
                        let cmd_modifier = state.contains(Shortcut::Ctrl);
                        let shift_held = state.contains(Shortcut::Shift);

                        let mut changed = false;
                        let handled = if cmd_modifier {
                            if key == Key::from_char('s') {
                                fire(&save_cb);
                                true
                            } else if key == Key::from_char('a') {
                                session.borrow_mut().editor_mut().select_all();
                                true
                            } else if let Some(command) = command_for_shortcut(key) {
                                changed = session.borrow_mut().key_command(command).is_handled();
                                true
                            } else {
                                false
                            }
                        } else {
                            let mut sess = session.borrow_mut();
                            match key {
                                Key::BackSpace => {
                                    changed = sess.key_command(KeyCommand::Backspace).is_handled();
                                    true
                                }
                                Key::Delete => {
                                    changed = sess.key_command(KeyCommand::Delete).is_handled();
                                    true
                                }
                                Key::Enter | Key::KPEnter => {
                                    changed = sess.key_command(KeyCommand::SplitBlock).is_handled();
                                    true
                                }
                                Key::Left if shift_held => {
                                    sess.editor_mut().move_cursor_left_extend();
                                    true
                                }
                                Key::Left => {
                                    sess.editor_mut().move_cursor_left();
                                    true
                                }
                                Key::Right if shift_held => {
                                    sess.editor_mut().move_cursor_right_extend();
                                    true
                                }
                                Key::Right => {
                                    sess.editor_mut().move_cursor_right();
                                    true
                                }
                                Key::Up => {
                                    sess.editor_mut().move_cursor_up();
                                    true
                                }
                                Key::Down => {
                                    sess.editor_mut().move_cursor_down();
                                    true
                                }
                                Key::Home if shift_held => {
                                    sess.editor_mut().move_cursor_to_line_start_extend();
                                    true
                                }
                                Key::Home => {
                                    sess.editor_mut().move_cursor_to_line_start();
                                    true
                                }
                                Key::End if shift_held => {
                                    sess.editor_mut().move_cursor_to_line_end_extend();
                                    true
                                }
                                Key::End => {
                                    sess.editor_mut().move_cursor_to_line_end();
                                    true
                                }
                                _ if !text_input.is_empty()
                                    && !text_input.chars().any(char::is_control) =>
                                {
                                    sess.handle_input(&text_input);
                                    changed = true;
                                    true
                                }
                                _ => false,
                            }
                        };

                        if handled {
                            caret_into_view(w, &display, &session, &mut vscroll_handle);
                        }
                        if changed {
                            fire(&change_cb);
                        }
                        handled
                    }
                    Event::Paste => {
                        let pasted = fltk::app::event_text();
                        if pasted.is_empty() {
                            return false;
                        }
                        session.borrow_mut().paste(&pasted);
                        caret_into_view(w, &display, &session, &mut vscroll_handle);
                        fire(&change_cb);
                        true
                    }
                    Event::Focus | Event::Unfocus => {
                        w.redraw();
                        true
                    }
                    _ => false,
                }
            }
        });

        widget.end();
        widget.resizable(&widget);

        widget.resize_callback({
            let display = display.clone();
            let mut vscroll_resize = vscroll.clone();
            move |w, x, y, width, height| {
                display
                    .borrow_mut()
                    .resize(x, y, width - SCROLLBAR_SIZE, height);
                vscroll_resize.resize(x + width - SCROLLBAR_SIZE, y, SCROLLBAR_SIZE, height);
                w.redraw();
            }
        });

        FltkEditor {
            group: widget,
            display,
            change_cb: change_callback,
            save_cb: save_callback,
        }
    }

    /// Called after every edit that changed the document
    pub fn set_change_callback(&self, cb: Option<Box<dyn FnMut() + 'static>>) {
        *self.change_cb.borrow_mut() = cb;
    }

    /// Called for the save shortcut
    pub fn set_save_callback(&self, cb: Option<Box<dyn FnMut() + 'static>>) {
        *self.save_cb.borrow_mut() = cb;
    }

    /// Periodic tick to update cursor blinking; triggers redraw if needed
    pub fn tick(&mut self, ms_since_start: u64) {
        let changed = self.display.borrow_mut().tick(ms_since_start);
        if changed {
            self.group.redraw();
        }
    }
}

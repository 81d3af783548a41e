// Library exports for draftpad

pub mod config;
pub mod draw_context;
pub mod fltk_draw_context;
pub mod fltk_editor;
pub mod persistence;
pub mod richtext;
pub mod session;
pub mod statusbar;
pub mod storage;
pub mod theme;
pub mod window_state;

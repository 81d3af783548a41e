pub mod autoformat;
pub mod html;
pub mod key_commands;
pub mod raw;
pub mod rich_display;
pub mod structured_document;
pub mod structured_editor;
pub mod style_map;

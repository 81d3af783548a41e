// Default key command handling
// Named editor commands bound to keys by the UI layer

use super::autoformat::InputHandling;
use super::structured_document::InlineStyle;
use super::structured_editor::StructuredEditor;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Bold,
    Italic,
    Underline,
    Code,
    Backspace,
    Delete,
    SplitBlock,
}

impl KeyCommand {
    pub fn name(self) -> &'static str {
        match self {
            KeyCommand::Bold => "bold",
            KeyCommand::Italic => "italic",
            KeyCommand::Underline => "underline",
            KeyCommand::Code => "code",
            KeyCommand::Backspace => "backspace",
            KeyCommand::Delete => "delete",
            KeyCommand::SplitBlock => "split-block",
        }
    }
}

impl fmt::Display for KeyCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bold" => Ok(KeyCommand::Bold),
            "italic" => Ok(KeyCommand::Italic),
            "underline" => Ok(KeyCommand::Underline),
            "code" => Ok(KeyCommand::Code),
            "backspace" => Ok(KeyCommand::Backspace),
            "delete" => Ok(KeyCommand::Delete),
            "split-block" => Ok(KeyCommand::SplitBlock),
            other => Err(format!("unknown key command: {other}")),
        }
    }
}

/// Apply a key command to the editor
pub fn handle_key_command(editor: &mut StructuredEditor, command: KeyCommand) -> InputHandling {
    let result = match command {
        KeyCommand::Bold => editor.toggle_inline_style(InlineStyle::Bold),
        KeyCommand::Italic => editor.toggle_inline_style(InlineStyle::Italic),
        KeyCommand::Underline => editor.toggle_inline_style(InlineStyle::Underline),
        KeyCommand::Code => editor.toggle_inline_style(InlineStyle::Code),
        KeyCommand::Backspace => editor.delete_backward(),
        KeyCommand::Delete => editor.delete_forward(),
        KeyCommand::SplitBlock => editor.insert_newline(),
    };

    match result {
        Ok(()) => InputHandling::Handled,
        Err(err) => {
            tracing::warn!(%command, %err, "key command failed");
            InputHandling::NotHandled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::structured_document::DocumentPosition;

    #[test]
    fn test_command_names_round_trip() {
        for name in ["bold", "italic", "underline", "code", "backspace", "delete", "split-block"] {
            let command: KeyCommand = name.parse().unwrap();
            assert_eq!(command.name(), name);
        }
        assert!("shout".parse::<KeyCommand>().is_err());
    }

    #[test]
    fn test_bold_command_on_selection() {
        let mut editor = StructuredEditor::new();
        editor.insert_text("make me bold").unwrap();
        editor.set_selection(DocumentPosition::new(0, 8), DocumentPosition::new(0, 12));

        assert!(handle_key_command(&mut editor, KeyCommand::Bold).is_handled());
        let block = &editor.document().blocks()[0];
        assert!(block.has_style_in_range(8, 12, InlineStyle::Bold));
        assert!(!block.has_style_in_range(0, 8, InlineStyle::Bold));
    }

    #[test]
    fn test_editing_commands() {
        let mut editor = StructuredEditor::new();
        editor.insert_text("ab").unwrap();

        handle_key_command(&mut editor, KeyCommand::SplitBlock);
        assert_eq!(editor.document().block_count(), 2);

        handle_key_command(&mut editor, KeyCommand::Backspace);
        assert_eq!(editor.document().block_count(), 1);

        editor.set_cursor(DocumentPosition::start());
        handle_key_command(&mut editor, KeyCommand::Delete);
        assert_eq!(editor.document().to_plain_text(), "b");
    }
}

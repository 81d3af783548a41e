// Markdown-like autoformat shortcuts
// Typing a trigger such as "# " into an empty block formats the block instead of
// inserting the text.

use super::structured_document::{BlockType, DocumentPosition, InlineStyle};
use super::structured_editor::StructuredEditor;
use tracing::debug;

/// Whether an input event was consumed by a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputHandling {
    Handled,
    NotHandled,
}

impl InputHandling {
    pub fn is_handled(self) -> bool {
        self == InputHandling::Handled
    }
}

/// What a trigger does to the current block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    SetBlockType(BlockType),
    ToggleInlineStyle(InlineStyle),
}

/// Fixed trigger table. Matching compares the whole block text plus the typed
/// characters, so "* ", "** " and "*** " never shadow each other.
pub const TRIGGERS: [(&str, TriggerAction); 5] = [
    ("# ", TriggerAction::SetBlockType(BlockType::Heading { level: 1 })),
    ("* ", TriggerAction::ToggleInlineStyle(InlineStyle::Bold)),
    ("** ", TriggerAction::ToggleInlineStyle(InlineStyle::Red)),
    ("*** ", TriggerAction::ToggleInlineStyle(InlineStyle::Underline)),
    ("``` ", TriggerAction::SetBlockType(BlockType::CodeBlock)),
];

/// Look up the action for an exact trigger string
pub fn match_trigger(text: &str) -> Option<TriggerAction> {
    TRIGGERS
        .iter()
        .find(|(trigger, _)| *trigger == text)
        .map(|(_, action)| *action)
}

/// Styles applied by earlier triggers, one slot per channel.
/// Session state only; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedStyles {
    pub block_type: Option<BlockType>,
    pub inline_style: Option<InlineStyle>,
}

/// The trigger matcher with its applied-styles record
#[derive(Debug, Default)]
pub struct Autoformatter {
    applied: AppliedStyles,
}

impl Autoformatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> AppliedStyles {
        self.applied
    }

    /// Run before `chars` is inserted. Returns `Handled` when a trigger fired and
    /// the characters must not be inserted.
    pub fn handle_before_input(
        &mut self,
        editor: &mut StructuredEditor,
        chars: &str,
    ) -> InputHandling {
        let block_text = editor.current_block_text();
        let candidate = format!("{block_text}{chars}");

        let Some(action) = match_trigger(&candidate) else {
            return InputHandling::NotHandled;
        };

        debug!(trigger = %candidate, ?action, "autoformat trigger matched");
        self.apply(editor, block_text.len(), action);
        InputHandling::Handled
    }

    fn apply(&mut self, editor: &mut StructuredEditor, trigger_len: usize, action: TriggerAction) {
        let block_index = editor.current_block_index();

        // Drop the trigger text typed so far as one edit
        if editor
            .remove_range(
                DocumentPosition::new(block_index, 0),
                DocumentPosition::new(block_index, trigger_len),
            )
            .is_err()
        {
            return;
        }

        match action {
            TriggerAction::SetBlockType(block_type) => {
                if let Some(previous) = self.applied.block_type.take() {
                    if editor.current_block_type() == previous {
                        // toggling the active type sets the block back to unstyled
                        let _ = editor.toggle_block_type(previous);
                    }
                }
                if editor.toggle_block_type(block_type).is_ok() {
                    self.applied.block_type = Some(block_type);
                }
            }
            TriggerAction::ToggleInlineStyle(style) => {
                if let Some(previous) = self.applied.inline_style.take() {
                    if editor.current_style().contains(previous) {
                        let _ = editor.toggle_inline_style(previous);
                    }
                }
                if editor.toggle_inline_style(style).is_ok() {
                    self.applied.inline_style = Some(style);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::structured_document::TextStyle;

    /// Feed characters one at a time, inserting whatever the matcher declines
    fn type_chars(fmt: &mut Autoformatter, editor: &mut StructuredEditor, text: &str) {
        for ch in text.chars() {
            let s = ch.to_string();
            if !fmt.handle_before_input(editor, &s).is_handled() {
                editor.insert_text(&s).unwrap();
            }
        }
    }

    #[test]
    fn test_match_trigger_is_exact() {
        assert!(match_trigger("# ").is_some());
        assert!(match_trigger("## ").is_none());
        assert!(match_trigger("a# ").is_none());
        assert_eq!(
            match_trigger("*** "),
            Some(TriggerAction::ToggleInlineStyle(InlineStyle::Underline))
        );
    }

    #[test]
    fn test_every_trigger_in_empty_block() {
        for (trigger, action) in TRIGGERS {
            let mut fmt = Autoformatter::new();
            let mut editor = StructuredEditor::new();
            type_chars(&mut fmt, &mut editor, trigger);

            assert_eq!(editor.current_block_text(), "", "trigger {trigger:?}");
            match action {
                TriggerAction::SetBlockType(block_type) => {
                    assert_eq!(editor.current_block_type(), block_type)
                }
                TriggerAction::ToggleInlineStyle(style) => {
                    assert!(editor.current_style().contains(style))
                }
            }
        }
    }

    #[test]
    fn test_star_star_space_applies_red() {
        let mut fmt = Autoformatter::new();
        let mut editor = StructuredEditor::new();

        assert_eq!(fmt.handle_before_input(&mut editor, "*"), InputHandling::NotHandled);
        editor.insert_text("*").unwrap();
        assert_eq!(fmt.handle_before_input(&mut editor, "*"), InputHandling::NotHandled);
        editor.insert_text("*").unwrap();
        assert_eq!(fmt.handle_before_input(&mut editor, " "), InputHandling::Handled);

        assert_eq!(editor.current_block_text(), "");
        assert_eq!(editor.current_style(), TextStyle::plain().with(InlineStyle::Red));
        assert_eq!(fmt.applied().inline_style, Some(InlineStyle::Red));
    }

    #[test]
    fn test_trigger_after_text_does_not_fire() {
        let mut fmt = Autoformatter::new();
        let mut editor = StructuredEditor::new();
        type_chars(&mut fmt, &mut editor, "hello # ");

        assert_eq!(editor.current_block_text(), "hello # ");
        assert_eq!(editor.current_block_type(), BlockType::Unstyled);
        assert!(editor.current_style().is_plain());
    }

    #[test]
    fn test_non_trigger_input_is_inserted_unchanged() {
        let mut fmt = Autoformatter::new();
        let mut editor = StructuredEditor::new();
        type_chars(&mut fmt, &mut editor, "#a");
        assert_eq!(editor.current_block_text(), "#a");
        assert!(editor.current_style().is_plain());
        assert_eq!(fmt.applied(), AppliedStyles::default());
    }

    #[test]
    fn test_heading_then_code_block_yields_code_block() {
        let mut fmt = Autoformatter::new();
        let mut editor = StructuredEditor::new();

        type_chars(&mut fmt, &mut editor, "# ");
        assert_eq!(editor.current_block_type(), BlockType::heading(1));

        type_chars(&mut fmt, &mut editor, "``` ");
        assert_eq!(editor.current_block_type(), BlockType::CodeBlock);
        assert_eq!(editor.current_block_text(), "");
    }

    #[test]
    fn test_retyping_same_block_trigger_keeps_it() {
        let mut fmt = Autoformatter::new();
        let mut editor = StructuredEditor::new();

        type_chars(&mut fmt, &mut editor, "# ");
        type_chars(&mut fmt, &mut editor, "# ");
        assert_eq!(editor.current_block_type(), BlockType::heading(1));
    }

    #[test]
    fn test_channels_are_independent() {
        let mut fmt = Autoformatter::new();
        let mut editor = StructuredEditor::new();

        type_chars(&mut fmt, &mut editor, "# ");
        type_chars(&mut fmt, &mut editor, "* ");
        assert_eq!(editor.current_block_type(), BlockType::heading(1));
        assert!(editor.current_style().bold);

        assert_eq!(
            fmt.applied(),
            AppliedStyles {
                block_type: Some(BlockType::heading(1)),
                inline_style: Some(InlineStyle::Bold),
            }
        );
    }

    #[test]
    fn test_stale_inline_record_is_not_toggled_on() {
        let mut fmt = Autoformatter::new();
        let mut editor = StructuredEditor::new();

        type_chars(&mut fmt, &mut editor, "* ");
        type_chars(&mut fmt, &mut editor, "bold\n");
        type_chars(&mut fmt, &mut editor, "** ");

        // The second block gets red only; bold from the first trigger is not re-applied
        let style = editor.current_style();
        assert!(style.red);
        assert!(!style.bold);
    }

    #[test]
    fn test_typed_text_after_trigger_carries_style() {
        let mut fmt = Autoformatter::new();
        let mut editor = StructuredEditor::new();
        type_chars(&mut fmt, &mut editor, "*** under");

        let block = &editor.document().blocks()[0];
        assert_eq!(block.to_plain_text(), "under");
        assert!(block.has_style_in_range(0, 5, InlineStyle::Underline));
    }
}

// Editor session: the editor, its autoformatter and the backing store
// This is the event-handler surface the UI layers call into.

use crate::persistence::{self, PersistError};
use crate::richtext::autoformat::{Autoformatter, InputHandling};
use crate::richtext::key_commands::{handle_key_command, KeyCommand};
use crate::richtext::structured_document::StructuredDocument;
use crate::richtext::structured_editor::StructuredEditor;
use crate::storage::KeyValueStore;
use chrono::{DateTime, Local};
use tracing::warn;

pub struct EditorSession {
    editor: StructuredEditor,
    autoformatter: Autoformatter,
    store: Box<dyn KeyValueStore>,
    dirty: bool,
    last_save_time: Option<DateTime<Local>>,
}

impl EditorSession {
    /// Start a session from whatever the store holds
    pub fn open(store: Box<dyn KeyValueStore>) -> Result<Self, PersistError> {
        let document = persistence::load_document(store.as_ref())?;
        Ok(Self::with_document(store, document))
    }

    pub fn with_document(store: Box<dyn KeyValueStore>, document: StructuredDocument) -> Self {
        EditorSession {
            editor: StructuredEditor::with_document(document),
            autoformatter: Autoformatter::new(),
            store,
            dirty: false,
            last_save_time: None,
        }
    }

    pub fn editor(&self) -> &StructuredEditor {
        &self.editor
    }

    /// Mutable editor access for caret movement and selection
    pub fn editor_mut(&mut self) -> &mut StructuredEditor {
        &mut self.editor
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Handle one input event: autoformat first, plain insertion otherwise
    pub fn handle_input(&mut self, chars: &str) -> InputHandling {
        if chars.is_empty() {
            return InputHandling::NotHandled;
        }

        let handling = self.autoformatter.handle_before_input(&mut self.editor, chars);
        if !handling.is_handled() {
            if let Err(err) = self.editor.insert_text(chars) {
                warn!(%err, "failed to insert text");
                return handling;
            }
        }
        self.dirty = true;
        handling
    }

    /// Type text one character at a time, newlines splitting blocks
    pub fn type_text(&mut self, text: &str) {
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            if ch == '\n' {
                self.key_command(KeyCommand::SplitBlock);
            } else {
                self.handle_input(ch.encode_utf8(&mut buf));
            }
        }
    }

    /// Insert pasted text as-is; pasting never fires autoformat triggers
    pub fn paste(&mut self, text: &str) {
        match self.editor.insert_text(text) {
            Ok(()) => self.dirty = true,
            Err(err) => warn!(%err, "failed to paste text"),
        }
    }

    pub fn key_command(&mut self, command: KeyCommand) -> InputHandling {
        let handling = handle_key_command(&mut self.editor, command);
        if handling.is_handled() {
            self.dirty = true;
        }
        handling
    }

    /// Write the current document to the store
    pub fn save(&mut self) -> Result<(), PersistError> {
        persistence::save_document(self.store.as_mut(), self.editor.document())?;
        self.dirty = false;
        self.last_save_time = Some(Local::now());
        Ok(())
    }

    /// Status line text relative to `now`
    pub fn status_text(&self, now: DateTime<Local>) -> String {
        match (self.dirty, self.last_save_time) {
            (true, _) => "not saved".to_string(),
            (false, Some(time)) => format_time_since(time, now),
            (false, None) => String::new(),
        }
    }
}

/// "saved just now", "saved 5 min ago" and so on
pub fn format_time_since(time: DateTime<Local>, now: DateTime<Local>) -> String {
    let secs = (now - time).num_seconds().max(0);

    if secs < 60 {
        "saved just now".to_string()
    } else if secs < 3600 {
        format!("saved {} min ago", secs / 60)
    } else if secs < 86400 {
        let hours = secs / 3600;
        if hours == 1 {
            "saved 1 hour ago".to_string()
        } else {
            format!("saved {hours} hours ago")
        }
    } else if secs < 7 * 86400 {
        let days = secs / 86400;
        if days == 1 {
            "saved 1 day ago".to_string()
        } else {
            format!("saved {days} days ago")
        }
    } else {
        format!("saved {}", time.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::STORAGE_KEY;
    use crate::richtext::structured_document::{BlockType, InlineStyle};
    use crate::storage::MemoryStore;
    use chrono::Duration;

    fn session() -> EditorSession {
        EditorSession::open(Box::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_starts_clean_and_empty() {
        let session = session();
        assert!(session.editor().document().is_empty());
        assert!(!session.is_dirty());
        assert_eq!(session.status_text(Local::now()), "");
    }

    #[test]
    fn test_trigger_is_not_inserted() {
        let mut session = session();
        session.type_text("# ");
        assert_eq!(session.editor().current_block_text(), "");
        assert_eq!(session.editor().current_block_type(), BlockType::heading(1));
        assert!(session.is_dirty());
    }

    #[test]
    fn test_plain_typing_inserts() {
        let mut session = session();
        assert_eq!(session.handle_input("a"), InputHandling::NotHandled);
        assert_eq!(session.editor().current_block_text(), "a");
    }

    #[test]
    fn test_red_then_text() {
        let mut session = session();
        session.type_text("** alarm");
        let block = &session.editor().document().blocks()[0];
        assert_eq!(block.to_plain_text(), "alarm");
        assert!(block.has_style_in_range(0, 5, InlineStyle::Red));
    }

    #[test]
    fn test_newline_splits_block() {
        let mut session = session();
        session.type_text("one\ntwo");
        assert_eq!(session.editor().document().to_plain_text(), "one\ntwo");
    }

    #[test]
    fn test_paste_skips_triggers() {
        let mut session = session();
        session.paste("# ");
        assert_eq!(session.editor().current_block_text(), "# ");
        assert_eq!(session.editor().current_block_type(), BlockType::Unstyled);
        assert!(session.is_dirty());
    }

    #[test]
    fn test_save_writes_store_and_updates_status() {
        let mut session = session();
        session.type_text("hello");
        assert_eq!(session.status_text(Local::now()), "not saved");

        session.save().unwrap();
        assert!(!session.is_dirty());
        assert_eq!(session.status_text(Local::now()), "saved just now");
        assert!(session.store.get_item(STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_format_time_since() {
        let now = Local::now();
        assert_eq!(format_time_since(now - Duration::seconds(150), now), "saved 2 min ago");
        assert_eq!(format_time_since(now - Duration::hours(1), now), "saved 1 hour ago");
        assert_eq!(format_time_since(now - Duration::hours(5), now), "saved 5 hours ago");
        assert_eq!(format_time_since(now - Duration::days(3), now), "saved 3 days ago");
        assert!(format_time_since(now - Duration::days(30), now).starts_with("saved 20"));
    }
}

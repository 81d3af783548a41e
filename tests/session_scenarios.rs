// End-to-end editing sessions backed by a store file on disk

use draftpad::persistence::STORAGE_KEY;
use draftpad::richtext::key_commands::KeyCommand;
use draftpad::richtext::structured_document::{BlockType, InlineStyle};
use draftpad::session::EditorSession;
use draftpad::storage::{FileStore, KeyValueStore};
use tempfile::TempDir;

fn open(dir: &TempDir) -> EditorSession {
    let store = FileStore::new(dir.path().join("store.json"));
    EditorSession::open(Box::new(store)).unwrap()
}

#[test]
fn test_fresh_store_opens_empty() {
    let dir = TempDir::new().unwrap();
    let session = open(&dir);
    let doc = session.editor().document();
    assert_eq!(doc.block_count(), 1);
    assert!(doc.is_empty());
}

#[test]
fn test_saved_formatting_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut session = open(&dir);
        session.type_text("# Notes\n** urgent");
        session.save().unwrap();
    }

    let session = open(&dir);
    let blocks = session.editor().document().blocks();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].block_type, BlockType::heading(1));
    assert_eq!(blocks[0].to_plain_text(), "Notes");
    assert_eq!(blocks[1].block_type, BlockType::Unstyled);
    assert_eq!(blocks[1].to_plain_text(), "urgent");
    assert!(blocks[1].has_style_in_range(0, 6, InlineStyle::Red));
}

#[test]
fn test_unsaved_edits_are_not_persisted() {
    let dir = TempDir::new().unwrap();
    {
        let mut session = open(&dir);
        session.type_text("draft");
    }
    assert!(open(&dir).editor().document().is_empty());
}

#[test]
fn test_store_holds_raw_json_under_editor_key() {
    let dir = TempDir::new().unwrap();
    let mut session = open(&dir);
    session.type_text("``` fn main() {}");
    session.save().unwrap();

    let store = FileStore::new(dir.path().join("store.json"));
    let stored = store.get_item(STORAGE_KEY).unwrap().expect("document stored");
    let raw: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(raw["blocks"][0]["type"], "code-block");
    assert_eq!(raw["blocks"][0]["text"], "fn main() {}");
}

#[test]
fn test_style_offsets_count_utf16_units() {
    let dir = TempDir::new().unwrap();
    let mut session = open(&dir);
    session.paste("\u{1F600}");
    session.key_command(KeyCommand::Underline);
    session.type_text("ok");
    session.save().unwrap();

    let store = FileStore::new(dir.path().join("store.json"));
    let stored = store.get_item(STORAGE_KEY).unwrap().expect("document stored");
    let raw: serde_json::Value = serde_json::from_str(&stored).unwrap();
    let range = &raw["blocks"][0]["inlineStyleRanges"][0];
    assert_eq!(range["style"], "UNDERLINE");
    assert_eq!(range["offset"], 2);
    assert_eq!(range["length"], 2);
}

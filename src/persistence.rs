// Saving and loading the document under a fixed store key

use crate::richtext::raw;
use crate::richtext::structured_document::StructuredDocument;
use crate::storage::{KeyValueStore, StorageError};
use thiserror::Error;
use tracing::info;

/// Key the document is stored under
pub const STORAGE_KEY: &str = "editorContent";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("stored document is not valid raw content: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to serialize document: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Serialize the document to raw JSON and write it under `STORAGE_KEY`
pub fn save_document(
    store: &mut dyn KeyValueStore,
    document: &StructuredDocument,
) -> Result<(), PersistError> {
    let json = raw::to_json(document).map_err(PersistError::Encode)?;
    store.set_item(STORAGE_KEY, &json)?;
    info!(
        blocks = document.block_count(),
        bytes = json.len(),
        "saved document"
    );
    Ok(())
}

/// Read the stored document, or an empty one when nothing was saved yet
pub fn load_document(store: &dyn KeyValueStore) -> Result<StructuredDocument, PersistError> {
    match store.get_item(STORAGE_KEY)? {
        Some(json) => {
            let document = raw::from_json(&json).map_err(PersistError::Decode)?;
            info!(blocks = document.block_count(), "loaded document");
            Ok(document)
        }
        None => {
            info!("no saved document, starting empty");
            Ok(StructuredDocument::new())
        }
    }
}

/// Remove the stored document
pub fn clear_document(store: &mut dyn KeyValueStore) -> Result<(), PersistError> {
    store.remove_item(STORAGE_KEY)?;
    info!("cleared saved document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::structured_document::{Block, BlockType, InlineStyle, TextStyle};
    use crate::storage::MemoryStore;

    #[test]
    fn test_load_without_saved_content_is_empty() {
        let store = MemoryStore::new();
        let document = load_document(&store).unwrap();
        assert!(document.is_empty());
        assert_eq!(document, StructuredDocument::new());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let document = StructuredDocument::from_blocks(vec![
            Block::heading("a", 1).with_plain_text("Notes"),
            Block::new("b", BlockType::CodeBlock).with_plain_text("cargo run"),
            Block::unstyled("c").with_text("warning", TextStyle::plain().with(InlineStyle::Red)),
        ]);

        save_document(&mut store, &document).unwrap();
        assert!(store.get_item(STORAGE_KEY).unwrap().is_some());

        let loaded = load_document(&store).unwrap();
        assert_eq!(loaded, document);
    }

    #[test]
    fn test_malformed_content_is_an_error() {
        let mut store = MemoryStore::new();
        store.set_item(STORAGE_KEY, "{ nope").unwrap();
        assert!(matches!(load_document(&store), Err(PersistError::Decode(_))));
    }

    #[test]
    fn test_clear() {
        let mut store = MemoryStore::new();
        save_document(&mut store, &StructuredDocument::with_paragraph("x")).unwrap();
        clear_document(&mut store).unwrap();
        assert!(load_document(&store).unwrap().is_empty());
    }
}

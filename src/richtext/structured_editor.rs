// Structured Editor
// Provides editing operations on a StructuredDocument
// Caret, selection and the pending inline style live here; the document stays passive

use super::structured_document::*;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

/// Result of an editing operation
pub type EditResult = Result<(), EditError>;

/// Errors that can occur during editing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("position is outside the document")]
    InvalidPosition,
    #[error("block index {0} is out of range")]
    InvalidBlockIndex(usize),
}

/// The structured editor with cursor state
#[derive(Debug, Clone)]
pub struct StructuredEditor {
    document: StructuredDocument,
    cursor: DocumentPosition,
    selection: Option<(DocumentPosition, DocumentPosition)>, // (anchor, focus)
    // Style for the next inserted text after toggling on a collapsed selection
    style_override: Option<TextStyle>,
}

fn prev_grapheme_boundary(text: &str, offset: usize) -> usize {
    text[..offset]
        .grapheme_indices(true)
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_grapheme_boundary(text: &str, offset: usize) -> usize {
    text[offset..]
        .graphemes(true)
        .next()
        .map(|g| offset + g.len())
        .unwrap_or(text.len())
}

impl StructuredEditor {
    /// Create a new editor with an empty document
    pub fn new() -> Self {
        Self::with_document(StructuredDocument::new())
    }

    /// Create an editor with an existing document, caret at the start
    pub fn with_document(document: StructuredDocument) -> Self {
        StructuredEditor {
            document,
            cursor: DocumentPosition::start(),
            selection: None,
            style_override: None,
        }
    }

    /// Get the document
    pub fn document(&self) -> &StructuredDocument {
        &self.document
    }

    /// Get cursor position
    pub fn cursor(&self) -> DocumentPosition {
        self.cursor
    }

    /// Set cursor position (will be clamped to valid range)
    pub fn set_cursor(&mut self, pos: DocumentPosition) {
        self.cursor = self.document.clamp_position(pos);
        self.selection = None;
        self.style_override = None;
    }

    /// Get selection as (anchor, focus)
    pub fn selection(&self) -> Option<(DocumentPosition, DocumentPosition)> {
        self.selection
    }

    /// Set selection range; the caret moves to the focus
    pub fn set_selection(&mut self, anchor: DocumentPosition, focus: DocumentPosition) {
        let anchor = self.document.clamp_position(anchor);
        let focus = self.document.clamp_position(focus);
        self.selection = Some((anchor, focus));
        self.cursor = focus;
        self.style_override = None;
    }

    /// Select all content in the document
    pub fn select_all(&mut self) {
        let end = self.document.end_position();
        self.set_selection(DocumentPosition::start(), end);
    }

    /// Start or extend selection from the current cursor position to a new position
    pub fn extend_selection_to(&mut self, focus: DocumentPosition) {
        let focus = self.document.clamp_position(focus);
        let anchor = match self.selection {
            Some((anchor, _)) => anchor,
            None => self.cursor,
        };
        self.selection = Some((anchor, focus));
        self.cursor = focus;
        self.style_override = None;
    }

    /// Selected range in document order, or the collapsed caret
    pub fn selection_range(&self) -> (DocumentPosition, DocumentPosition) {
        match self.selection {
            Some((anchor, focus)) => DocumentPosition::ordered(anchor, focus),
            None => (self.cursor, self.cursor),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        let (start, end) = self.selection_range();
        start == end
    }

    /// Index of the block containing the caret (the start of the selection)
    pub fn current_block_index(&self) -> usize {
        self.selection_range().0.block_index
    }

    /// Plain text of the block containing the caret
    pub fn current_block_text(&self) -> String {
        self.document
            .block(self.current_block_index())
            .map(|b| b.to_plain_text())
            .unwrap_or_default()
    }

    /// Block type of the block containing the caret
    pub fn current_block_type(&self) -> BlockType {
        self.document
            .block(self.current_block_index())
            .map(|b| b.block_type)
            .unwrap_or(BlockType::Unstyled)
    }

    /// Style that the next typed text will get
    pub fn current_style(&self) -> TextStyle {
        if let Some(style) = self.style_override {
            return style;
        }
        let (start, _) = self.selection_range();
        self.document
            .block(start.block_index)
            .map(|b| b.style_at(start.offset))
            .unwrap_or_default()
    }

    /// The pending style override, if one was toggled on a collapsed selection
    pub fn style_override(&self) -> Option<TextStyle> {
        self.style_override
    }

    /// Insert text at cursor position, replacing any selection.
    /// Newlines split the block.
    pub fn insert_text(&mut self, text: &str) -> EditResult {
        let style = self.current_style();

        if self.selection.is_some() {
            self.delete_selection()?;
        }

        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.split_block()?;
            }
            if line.is_empty() {
                continue;
            }
            let block_index = self.cursor.block_index;
            let offset = self.cursor.offset;
            let block = self
                .document
                .blocks_mut()
                .get_mut(block_index)
                .ok_or(EditError::InvalidBlockIndex(block_index))?;
            block.insert_text(offset, line, style);
            self.cursor.offset += line.len();
        }

        self.style_override = None;
        Ok(())
    }

    /// Insert a newline at cursor (splits the block or leaves an empty list item)
    pub fn insert_newline(&mut self) -> EditResult {
        if self.selection.is_some() {
            self.delete_selection()?;
        }

        let block_index = self.cursor.block_index;
        let (block_type, is_empty) = {
            let block = self
                .document
                .block(block_index)
                .ok_or(EditError::InvalidBlockIndex(block_index))?;
            (block.block_type, block.is_empty())
        };

        // Enter on an empty list item leaves the list
        if block_type.is_list() && is_empty {
            self.document.blocks_mut()[block_index].block_type = BlockType::Unstyled;
            return Ok(());
        }

        self.split_block()
    }

    fn split_block(&mut self) -> EditResult {
        let block_index = self.cursor.block_index;
        let offset = self.cursor.offset;

        let (block_type, right_content) = {
            let block = self
                .document
                .blocks_mut()
                .get_mut(block_index)
                .ok_or(EditError::InvalidBlockIndex(block_index))?;
            (block.block_type, block.split_content_at(offset))
        };

        // Lists and code continue, everything else starts a plain block
        let new_type = match block_type {
            BlockType::UnorderedListItem | BlockType::OrderedListItem | BlockType::CodeBlock => {
                block_type
            }
            _ => BlockType::Unstyled,
        };

        let mut new_block = Block::new("", new_type);
        new_block.content = right_content;
        self.document.insert_block(block_index + 1, new_block);
        self.cursor = DocumentPosition::new(block_index + 1, 0);
        Ok(())
    }

    /// Delete character before cursor (backspace)
    pub fn delete_backward(&mut self) -> EditResult {
        if self.selection.is_some() {
            return self.delete_selection();
        }

        let block_index = self.cursor.block_index;
        let offset = self.cursor.offset;
        let block = self
            .document
            .block(block_index)
            .ok_or(EditError::InvalidBlockIndex(block_index))?;

        if offset == 0 {
            // A styled block loses its type before it merges upwards
            if block.block_type != BlockType::Unstyled && (block.is_empty() || block_index == 0)
            {
                self.document.blocks_mut()[block_index].block_type = BlockType::Unstyled;
                return Ok(());
            }

            if block_index == 0 {
                return Ok(());
            }

            let prev_len = self.document.blocks()[block_index - 1].text_len();
            let end = DocumentPosition::new(block_index, 0);
            let start = DocumentPosition::new(block_index - 1, prev_len);
            self.document.delete_range(start, end);
            self.cursor = start;
        } else {
            let text = block.to_plain_text();
            let prev = prev_grapheme_boundary(&text, offset);
            self.document.blocks_mut()[block_index].delete_text_range(prev, offset);
            self.cursor.offset = prev;
        }

        self.style_override = None;
        Ok(())
    }

    /// Delete character at cursor (delete key)
    pub fn delete_forward(&mut self) -> EditResult {
        if self.selection.is_some() {
            return self.delete_selection();
        }

        let block_index = self.cursor.block_index;
        let offset = self.cursor.offset;
        let block = self
            .document
            .block(block_index)
            .ok_or(EditError::InvalidBlockIndex(block_index))?;
        let text = block.to_plain_text();

        if offset >= text.len() {
            // At end of block - merge with next block
            if block_index + 1 < self.document.block_count() {
                self.document.delete_range(
                    DocumentPosition::new(block_index, offset),
                    DocumentPosition::new(block_index + 1, 0),
                );
            }
        } else {
            let next = next_grapheme_boundary(&text, offset);
            self.document.blocks_mut()[block_index].delete_text_range(offset, next);
        }

        self.style_override = None;
        Ok(())
    }

    /// Delete the current selection
    pub fn delete_selection(&mut self) -> EditResult {
        let Some((anchor, focus)) = self.selection else {
            return Ok(());
        };
        let (start, end) = DocumentPosition::ordered(anchor, focus);
        self.remove_range(start, end)
    }

    /// Remove [start..end) as a single edit and leave the caret at `start`
    pub fn remove_range(&mut self, start: DocumentPosition, end: DocumentPosition) -> EditResult {
        if start.block_index >= self.document.block_count()
            || end.block_index >= self.document.block_count()
        {
            return Err(EditError::InvalidPosition);
        }
        let (start, end) = DocumentPosition::ordered(
            self.document.clamp_position(start),
            self.document.clamp_position(end),
        );
        self.document.delete_range(start, end);
        self.cursor = start;
        self.selection = None;
        self.style_override = None;
        Ok(())
    }

    fn position_left_of(&self, pos: DocumentPosition) -> DocumentPosition {
        if pos.offset > 0 {
            let text = self.document.blocks()[pos.block_index].to_plain_text();
            DocumentPosition::new(pos.block_index, prev_grapheme_boundary(&text, pos.offset))
        } else if pos.block_index > 0 {
            let prev_len = self.document.blocks()[pos.block_index - 1].text_len();
            DocumentPosition::new(pos.block_index - 1, prev_len)
        } else {
            pos
        }
    }

    fn position_right_of(&self, pos: DocumentPosition) -> DocumentPosition {
        let text = self.document.blocks()[pos.block_index].to_plain_text();
        if pos.offset < text.len() {
            DocumentPosition::new(pos.block_index, next_grapheme_boundary(&text, pos.offset))
        } else if pos.block_index + 1 < self.document.block_count() {
            DocumentPosition::new(pos.block_index + 1, 0)
        } else {
            pos
        }
    }

    /// Move cursor left by one grapheme; collapses a selection to its start
    pub fn move_cursor_left(&mut self) {
        if self.selection.is_some() {
            let (start, _) = self.selection_range();
            self.set_cursor(start);
            return;
        }
        let pos = self.position_left_of(self.cursor);
        self.set_cursor(pos);
    }

    /// Move cursor right by one grapheme; collapses a selection to its end
    pub fn move_cursor_right(&mut self) {
        if self.selection.is_some() {
            let (_, end) = self.selection_range();
            self.set_cursor(end);
            return;
        }
        let pos = self.position_right_of(self.cursor);
        self.set_cursor(pos);
    }

    /// Move cursor to the previous block, keeping the offset where possible
    pub fn move_cursor_up(&mut self) {
        let pos = if self.cursor.block_index > 0 {
            DocumentPosition::new(self.cursor.block_index - 1, self.cursor.offset)
        } else {
            DocumentPosition::start()
        };
        self.set_cursor(pos);
    }

    /// Move cursor to the next block, keeping the offset where possible
    pub fn move_cursor_down(&mut self) {
        let pos = if self.cursor.block_index + 1 < self.document.block_count() {
            DocumentPosition::new(self.cursor.block_index + 1, self.cursor.offset)
        } else {
            self.document.end_position()
        };
        self.set_cursor(pos);
    }

    pub fn move_cursor_to_line_start(&mut self) {
        self.set_cursor(DocumentPosition::new(self.cursor.block_index, 0));
    }

    pub fn move_cursor_to_line_end(&mut self) {
        let len = self.document.blocks()[self.cursor.block_index].text_len();
        self.set_cursor(DocumentPosition::new(self.cursor.block_index, len));
    }

    pub fn move_cursor_left_extend(&mut self) {
        let pos = self.position_left_of(self.cursor);
        self.extend_selection_to(pos);
    }

    pub fn move_cursor_right_extend(&mut self) {
        let pos = self.position_right_of(self.cursor);
        self.extend_selection_to(pos);
    }

    pub fn move_cursor_to_line_start_extend(&mut self) {
        self.extend_selection_to(DocumentPosition::new(self.cursor.block_index, 0));
    }

    pub fn move_cursor_to_line_end_extend(&mut self) {
        let len = self.document.blocks()[self.cursor.block_index].text_len();
        self.extend_selection_to(DocumentPosition::new(self.cursor.block_index, len));
    }

    /// Toggle an inline style.
    ///
    /// On a collapsed selection this only changes the style the next typed text
    /// will get. Otherwise the style is removed if every selected character has it
    /// and added to the whole selection if not.
    pub fn toggle_inline_style(&mut self, style: InlineStyle) -> EditResult {
        let (start, end) = self.selection_range();

        if start == end {
            let mut current = self.current_style();
            current.toggle(style);
            self.style_override = Some(current);
            return Ok(());
        }

        let blocks = self.document.blocks();
        if end.block_index >= blocks.len() {
            return Err(EditError::InvalidBlockIndex(end.block_index));
        }

        let ranges: Vec<(usize, usize, usize)> = (start.block_index..=end.block_index)
            .map(|i| {
                let from = if i == start.block_index { start.offset } else { 0 };
                let to = if i == end.block_index {
                    end.offset
                } else {
                    blocks[i].text_len()
                };
                (i, from, to)
            })
            .filter(|(_, from, to)| from < to)
            .collect();

        let all_styled = !ranges.is_empty()
            && ranges
                .iter()
                .all(|&(i, from, to)| blocks[i].has_style_in_range(from, to, style));

        let blocks = self.document.blocks_mut();
        for (i, from, to) in ranges {
            blocks[i].update_styles(from, to, |s| s.set(style, !all_styled));
        }

        Ok(())
    }

    /// Toggle the block type of every block touched by the selection.
    /// If the first block already has `block_type` all of them become unstyled.
    pub fn toggle_block_type(&mut self, block_type: BlockType) -> EditResult {
        let (start, end) = self.selection_range();
        let current = self
            .document
            .block(start.block_index)
            .ok_or(EditError::InvalidBlockIndex(start.block_index))?
            .block_type;

        let target = if current == block_type {
            BlockType::Unstyled
        } else {
            block_type
        };

        for block in &mut self.document.blocks_mut()[start.block_index..=end.block_index] {
            block.block_type = target;
        }

        Ok(())
    }

    /// Set the block type for the current block
    pub fn set_block_type(&mut self, block_type: BlockType) -> EditResult {
        let block_index = self.current_block_index();
        let block = self
            .document
            .blocks_mut()
            .get_mut(block_index)
            .ok_or(EditError::InvalidBlockIndex(block_index))?;
        block.block_type = block_type;
        Ok(())
    }

    /// Plain text of the selection, blocks joined by newlines
    pub fn selected_text(&self) -> String {
        let (start, end) = self.selection_range();
        if start == end {
            return String::new();
        }

        let blocks = self.document.blocks();
        (start.block_index..=end.block_index)
            .map(|i| {
                let text = blocks[i].to_plain_text();
                let from = if i == start.block_index { start.offset } else { 0 };
                let to = if i == end.block_index {
                    end.offset
                } else {
                    text.len()
                };
                text[from..to].to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for StructuredEditor {
    fn default() -> Self {
        Self::new()
    }
}

// Structured Document Model
// Blocks of styled text runs, independent of any storage format
// The raw JSON format is only used for persistence (see raw.rs)

use std::cmp::min;
use std::fmt;

/// Unique identifier used to derive block keys
pub type ElementId = usize;

/// Named inline styles that can be applied to character ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineStyle {
    Bold,
    Italic,
    Underline,
    Code,
    Strikethrough,
    /// Custom red text color
    Red,
}

impl InlineStyle {
    /// All styles in serialization order
    pub const ALL: [InlineStyle; 6] = [
        InlineStyle::Bold,
        InlineStyle::Italic,
        InlineStyle::Underline,
        InlineStyle::Code,
        InlineStyle::Strikethrough,
        InlineStyle::Red,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InlineStyle::Bold => "BOLD",
            InlineStyle::Italic => "ITALIC",
            InlineStyle::Underline => "UNDERLINE",
            InlineStyle::Code => "CODE",
            InlineStyle::Strikethrough => "STRIKETHROUGH",
            InlineStyle::Red => "RED",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.name() == name)
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of inline styles active on a run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub red: bool,
}

impl TextStyle {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn bold() -> Self {
        TextStyle {
            bold: true,
            ..Default::default()
        }
    }

    pub fn italic() -> Self {
        TextStyle {
            italic: true,
            ..Default::default()
        }
    }

    /// Builder-style variant of `set(style, true)`
    pub fn with(mut self, style: InlineStyle) -> Self {
        self.set(style, true);
        self
    }

    pub fn contains(&self, style: InlineStyle) -> bool {
        match style {
            InlineStyle::Bold => self.bold,
            InlineStyle::Italic => self.italic,
            InlineStyle::Underline => self.underline,
            InlineStyle::Code => self.code,
            InlineStyle::Strikethrough => self.strikethrough,
            InlineStyle::Red => self.red,
        }
    }

    pub fn set(&mut self, style: InlineStyle, on: bool) {
        let flag = match style {
            InlineStyle::Bold => &mut self.bold,
            InlineStyle::Italic => &mut self.italic,
            InlineStyle::Underline => &mut self.underline,
            InlineStyle::Code => &mut self.code,
            InlineStyle::Strikethrough => &mut self.strikethrough,
            InlineStyle::Red => &mut self.red,
        };
        *flag = on;
    }

    pub fn toggle(&mut self, style: InlineStyle) {
        let on = !self.contains(style);
        self.set(style, on);
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::plain()
    }

    /// Active styles in serialization order
    pub fn styles(&self) -> impl Iterator<Item = InlineStyle> + '_ {
        InlineStyle::ALL
            .into_iter()
            .filter(move |style| self.contains(*style))
    }
}

/// A run of styled text (a contiguous piece of text with uniform styling)
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub style: TextStyle,
}

impl TextRun {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        TextRun {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, TextStyle::plain())
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Split this text run at the given byte offset
    /// Returns (left_run, right_run)
    pub fn split_at(&self, offset: usize) -> (TextRun, TextRun) {
        let (left, right) = self.text.split_at(offset);
        (
            TextRun::new(left, self.style),
            TextRun::new(right, self.style),
        )
    }

    /// Delete text in the given range [start..end)
    pub fn delete_range(&mut self, start: usize, end: usize) {
        self.text.drain(start..end);
    }
}

/// Block-level content types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Unstyled,
    Heading { level: u8 }, // 1-6
    BlockQuote,
    CodeBlock,
    UnorderedListItem,
    OrderedListItem,
}

impl BlockType {
    pub fn heading(level: u8) -> Self {
        BlockType::Heading {
            level: level.clamp(1, 6),
        }
    }

    /// Name used by the raw serialization format
    pub fn name(&self) -> &'static str {
        match self {
            BlockType::Unstyled => "unstyled",
            BlockType::Heading { level } => match level {
                1 => "header-one",
                2 => "header-two",
                3 => "header-three",
                4 => "header-four",
                5 => "header-five",
                _ => "header-six",
            },
            BlockType::BlockQuote => "blockquote",
            BlockType::CodeBlock => "code-block",
            BlockType::UnorderedListItem => "unordered-list-item",
            BlockType::OrderedListItem => "ordered-list-item",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let block_type = match name {
            "unstyled" | "paragraph" => BlockType::Unstyled,
            "header-one" => BlockType::heading(1),
            "header-two" => BlockType::heading(2),
            "header-three" => BlockType::heading(3),
            "header-four" => BlockType::heading(4),
            "header-five" => BlockType::heading(5),
            "header-six" => BlockType::heading(6),
            "blockquote" => BlockType::BlockQuote,
            "code-block" => BlockType::CodeBlock,
            "unordered-list-item" => BlockType::UnorderedListItem,
            "ordered-list-item" => BlockType::OrderedListItem,
            _ => return None,
        };
        Some(block_type)
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self,
            BlockType::UnorderedListItem | BlockType::OrderedListItem
        )
    }
}

/// A block of content
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub key: String,
    pub block_type: BlockType,
    pub content: Vec<TextRun>,
}

impl Block {
    /// Create a block. An empty key is replaced when the block is added to a document.
    pub fn new(key: impl Into<String>, block_type: BlockType) -> Self {
        Block {
            key: key.into(),
            block_type,
            content: Vec::new(),
        }
    }

    pub fn unstyled(key: impl Into<String>) -> Self {
        Self::new(key, BlockType::Unstyled)
    }

    pub fn heading(key: impl Into<String>, level: u8) -> Self {
        Self::new(key, BlockType::heading(level))
    }

    pub fn with_text(mut self, text: impl Into<String>, style: TextStyle) -> Self {
        self.content.push(TextRun::new(text, style));
        self.normalize();
        self
    }

    pub fn with_plain_text(self, text: impl Into<String>) -> Self {
        self.with_text(text, TextStyle::plain())
    }

    /// Get the total text length of this block in bytes
    pub fn text_len(&self) -> usize {
        self.content.iter().map(|run| run.len()).sum()
    }

    /// Get plain text content
    pub fn to_plain_text(&self) -> String {
        self.content.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.text_len() == 0
    }

    /// Iterate runs together with their starting byte offset
    pub fn runs_with_offsets(&self) -> impl Iterator<Item = (usize, &TextRun)> + '_ {
        self.content.iter().scan(0usize, |pos, run| {
            let start = *pos;
            *pos += run.len();
            Some((start, run))
        })
    }

    /// Style of the character before `offset`, or of the first character at offset 0
    pub fn style_at(&self, offset: usize) -> TextStyle {
        if offset == 0 {
            return self
                .content
                .iter()
                .find(|run| !run.is_empty())
                .map(|run| run.style)
                .unwrap_or_default();
        }

        for (start, run) in self.runs_with_offsets() {
            if offset > start && offset <= start + run.len() {
                return run.style;
            }
        }

        self.content.last().map(|run| run.style).unwrap_or_default()
    }

    /// True if every character in [start..end) carries `style`
    pub fn has_style_in_range(&self, start: usize, end: usize, style: InlineStyle) -> bool {
        if start >= end {
            return false;
        }

        self.runs_with_offsets()
            .filter(|(run_start, run)| *run_start < end && run_start + run.len() > start)
            .all(|(_, run)| run.style.contains(style))
    }

    /// Delete text in [start..end) within this block
    pub fn delete_text_range(&mut self, start: usize, end: usize) {
        let len = self.text_len();
        let start = min(start, len);
        let end = min(end, len);
        if start >= end {
            return;
        }

        let mut kept = Vec::with_capacity(self.content.len());
        let mut pos = 0usize;

        for mut run in self.content.drain(..) {
            let run_start = pos;
            let run_end = pos + run.len();
            pos = run_end;

            // Entirely outside the deletion range
            if run_end <= start || run_start >= end {
                kept.push(run);
                continue;
            }

            let local_start = start.saturating_sub(run_start);
            let local_end = min(run.len(), end - run_start);
            run.delete_range(local_start, local_end);
            if !run.is_empty() {
                kept.push(run);
            }
        }

        self.content = kept;
        self.normalize();
    }

    /// Split this block's content at a byte offset, returning the right part.
    /// The left part remains in self.
    pub fn split_content_at(&mut self, offset: usize) -> Vec<TextRun> {
        let offset = min(offset, self.text_len());
        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut pos = 0usize;

        for run in std::mem::take(&mut self.content) {
            let run_end = pos + run.len();
            if run_end <= offset {
                left.push(run);
            } else if pos >= offset {
                right.push(run);
            } else {
                let (l, r) = run.split_at(offset - pos);
                left.push(l);
                right.push(r);
            }
            pos = run_end;
        }

        self.content = left;
        right
    }

    /// Insert text with the given style at a byte offset
    pub fn insert_text(&mut self, offset: usize, text: &str, style: TextStyle) {
        if text.is_empty() {
            return;
        }
        let right = self.split_content_at(offset);
        self.content.push(TextRun::new(text, style));
        self.content.extend(right);
        self.normalize();
    }

    /// Apply `update` to the style of every run in [start..end)
    pub fn update_styles<F>(&mut self, start: usize, end: usize, mut update: F)
    where
        F: FnMut(&mut TextStyle),
    {
        if start >= end {
            return;
        }
        let right = self.split_content_at(end);
        let middle = self.split_content_at(start);
        for mut run in middle {
            update(&mut run.style);
            self.content.push(run);
        }
        self.content.extend(right);
        self.normalize();
    }

    /// Drop empty runs and merge neighbours with identical styles
    pub fn normalize(&mut self) {
        let mut merged: Vec<TextRun> = Vec::with_capacity(self.content.len());
        for run in self.content.drain(..) {
            if run.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.style == run.style => last.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        self.content = merged;
    }
}

/// Position within a document
/// This represents a logical cursor position in the structured content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentPosition {
    pub block_index: usize,
    pub offset: usize, // Byte offset within the block's flattened text
}

impl DocumentPosition {
    pub fn new(block_index: usize, offset: usize) -> Self {
        DocumentPosition {
            block_index,
            offset,
        }
    }

    pub fn start() -> Self {
        DocumentPosition::new(0, 0)
    }

    /// Return the two positions in document order
    pub fn ordered(a: Self, b: Self) -> (Self, Self) {
        if (a.block_index, a.offset) <= (b.block_index, b.offset) {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// The structured document. Always holds at least one block.
#[derive(Debug, Clone)]
pub struct StructuredDocument {
    blocks: Vec<Block>,
    next_id: ElementId,
}

impl StructuredDocument {
    /// Create a document with a single empty unstyled block
    pub fn new() -> Self {
        let mut doc = StructuredDocument {
            blocks: Vec::new(),
            next_id: 1,
        };
        doc.add_block(Block::unstyled(""));
        doc
    }

    /// Build a document from blocks, assigning keys where missing or duplicated
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut doc = StructuredDocument {
            blocks: Vec::with_capacity(blocks.len()),
            next_id: 1,
        };
        for block in blocks {
            doc.add_block(block);
        }
        if doc.blocks.is_empty() {
            doc.add_block(Block::unstyled(""));
        }
        doc
    }

    /// Create a simple document with one unstyled block
    pub fn with_paragraph(text: impl Into<String>) -> Self {
        Self::from_blocks(vec![Block::unstyled("").with_plain_text(text)])
    }

    /// Generate a block key not used by any block in this document
    fn generate_key(&mut self) -> String {
        loop {
            let key = format!("b{:04x}", self.next_id);
            self.next_id += 1;
            if self.find_block_index(&key).is_none() {
                return key;
            }
        }
    }

    fn ensure_key(&mut self, block: &mut Block) {
        if block.key.is_empty() || self.find_block_index(&block.key).is_some() {
            block.key = self.generate_key();
        }
    }

    /// Get blocks
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Get mutable blocks
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Add a block at the end
    pub fn add_block(&mut self, mut block: Block) {
        self.ensure_key(&mut block);
        self.blocks.push(block);
    }

    /// Insert a block at a specific position
    pub fn insert_block(&mut self, index: usize, mut block: Block) {
        self.ensure_key(&mut block);
        let index = min(index, self.blocks.len());
        self.blocks.insert(index, block);
    }

    /// Get block count
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Find block index by key
    pub fn find_block_index(&self, key: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.key == key)
    }

    /// Validate and clamp a position to document bounds
    pub fn clamp_position(&self, pos: DocumentPosition) -> DocumentPosition {
        if self.blocks.is_empty() {
            return DocumentPosition::start();
        }

        let block_index = pos.block_index.min(self.blocks.len() - 1);
        let text = self.blocks[block_index].to_plain_text();
        let mut offset = pos.offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }

        DocumentPosition::new(block_index, offset)
    }

    /// Position at the very end of the document
    pub fn end_position(&self) -> DocumentPosition {
        let last = self.blocks.len().saturating_sub(1);
        let len = self.blocks.get(last).map(|b| b.text_len()).unwrap_or(0);
        DocumentPosition::new(last, len)
    }

    /// Convert to plain text, one line per block
    pub fn to_plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.to_plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True for a single empty unstyled block with no styles
    pub fn is_empty(&self) -> bool {
        self.blocks.len() == 1
            && self.blocks[0].is_empty()
            && self.blocks[0].block_type == BlockType::Unstyled
    }

    /// Delete content in [start..end) across blocks.
    /// If the range spans multiple blocks, merges the tail of the end block into the start block
    /// and removes all blocks in between.
    pub fn delete_range(&mut self, start: DocumentPosition, end: DocumentPosition) {
        let (a, b) = DocumentPosition::ordered(self.clamp_position(start), self.clamp_position(end));

        if a.block_index == b.block_index {
            self.blocks[a.block_index].delete_text_range(a.offset, b.offset);
            return;
        }

        // Delete tail of start block
        {
            let block = &mut self.blocks[a.block_index];
            let len = block.text_len();
            block.delete_text_range(a.offset, len);
        }

        // Keep whatever follows the range in the end block
        let tail_content = self.blocks[b.block_index].split_content_at(b.offset);

        // Remove every block after the start block up to and including the end block
        self.blocks.drain(a.block_index + 1..=b.block_index);

        let block = &mut self.blocks[a.block_index];
        block.content.extend(tail_content);
        block.normalize();
    }
}

// Documents are equal when their blocks are; the key counter is bookkeeping
impl PartialEq for StructuredDocument {
    fn eq(&self, other: &Self) -> bool {
        self.blocks == other.blocks
    }
}

impl Default for StructuredDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StructuredDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "StructuredDocument ({} blocks):", self.blocks.len())?;
        for (i, block) in self.blocks.iter().enumerate() {
            write!(f, "  [{}] {}", i, block.block_type.name())?;
            for run in &block.content {
                let styles: Vec<&str> = run.style.styles().map(|s| s.name()).collect();
                if styles.is_empty() {
                    write!(f, " {:?}", run.text)?;
                } else {
                    write!(f, " {:?}<{}>", run.text, styles.join(","))?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_run() {
        let run = TextRun::plain("hello world");
        assert_eq!(run.len(), 11);

        let (left, right) = run.split_at(5);
        assert_eq!(left.text, "hello");
        assert_eq!(right.text, " world");
    }

    #[test]
    fn test_block_text_len() {
        let block = Block::unstyled("a")
            .with_plain_text("hello")
            .with_text(" world", TextStyle::bold());

        assert_eq!(block.text_len(), 11);
        assert_eq!(block.to_plain_text(), "hello world");
        assert_eq!(block.content.len(), 2);
    }

    #[test]
    fn test_new_document_has_one_empty_block() {
        let doc = StructuredDocument::new();
        assert_eq!(doc.block_count(), 1);
        assert!(doc.is_empty());
        assert_eq!(doc.blocks()[0].block_type, BlockType::Unstyled);
        assert!(!doc.blocks()[0].key.is_empty());
    }

    #[test]
    fn test_keys_are_unique() {
        let doc = StructuredDocument::from_blocks(vec![
            Block::unstyled("same"),
            Block::unstyled("same"),
            Block::unstyled(""),
        ]);
        let keys: Vec<&str> = doc.blocks().iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys[0], "same");
        assert_ne!(keys[1], "same");
        assert_ne!(keys[1], keys[2]);
    }

    #[test]
    fn test_position_clamping() {
        let doc = StructuredDocument::with_paragraph("hello");

        let clamped = doc.clamp_position(DocumentPosition::new(0, 100));
        assert_eq!(clamped.offset, 5);

        let clamped = doc.clamp_position(DocumentPosition::new(7, 2));
        assert_eq!(clamped, DocumentPosition::new(0, 2));
    }

    #[test]
    fn test_position_clamping_respects_char_boundaries() {
        let doc = StructuredDocument::with_paragraph("añb");
        // 'ñ' occupies bytes 1..3
        let clamped = doc.clamp_position(DocumentPosition::new(0, 2));
        assert_eq!(clamped.offset, 1);
    }

    #[test]
    fn test_style_at() {
        let block = Block::unstyled("a")
            .with_text("ab", TextStyle::bold())
            .with_plain_text("cd");
        assert_eq!(block.style_at(0), TextStyle::bold());
        assert_eq!(block.style_at(2), TextStyle::bold());
        assert_eq!(block.style_at(3), TextStyle::plain());
    }

    #[test]
    fn test_update_styles_splits_and_merges() {
        let mut block = Block::unstyled("a").with_plain_text("hello world");
        block.update_styles(0, 5, |s| s.set(InlineStyle::Red, true));
        assert_eq!(block.content.len(), 2);
        assert!(block.content[0].style.red);
        assert_eq!(block.content[0].text, "hello");

        block.update_styles(0, 5, |s| s.set(InlineStyle::Red, false));
        assert_eq!(block.content.len(), 1);
        assert_eq!(block.content[0].text, "hello world");
    }

    #[test]
    fn test_has_style_in_range() {
        let block = Block::unstyled("a")
            .with_text("bold", TextStyle::bold())
            .with_plain_text(" plain");
        assert!(block.has_style_in_range(0, 4, InlineStyle::Bold));
        assert!(!block.has_style_in_range(0, 6, InlineStyle::Bold));
        assert!(!block.has_style_in_range(2, 2, InlineStyle::Bold));
    }

    #[test]
    fn test_delete_range_within_block() {
        let mut doc = StructuredDocument::with_paragraph("Hello world");
        doc.delete_range(DocumentPosition::new(0, 5), DocumentPosition::new(0, 11));
        assert_eq!(doc.blocks()[0].to_plain_text(), "Hello");
    }

    #[test]
    fn test_delete_range_across_blocks_merges() {
        let mut doc = StructuredDocument::from_blocks(vec![
            Block::unstyled("").with_plain_text("First para"),
            Block::unstyled("").with_plain_text("Second"),
            Block::unstyled("").with_plain_text("Third para"),
        ]);

        // Delete from after "Fir" in block 0 to after "Th" in block 2
        doc.delete_range(DocumentPosition::new(0, 3), DocumentPosition::new(2, 2));

        assert_eq!(doc.block_count(), 1);
        assert_eq!(doc.blocks()[0].to_plain_text(), "Firird para");
    }

    #[test]
    fn test_block_type_names() {
        assert_eq!(BlockType::heading(1).name(), "header-one");
        assert_eq!(BlockType::from_name("code-block"), Some(BlockType::CodeBlock));
        assert_eq!(BlockType::from_name("atomic"), None);
        assert_eq!(InlineStyle::from_name("RED"), Some(InlineStyle::Red));
    }
}

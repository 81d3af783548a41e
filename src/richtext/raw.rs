// Raw serialization format
// A transport-neutral block/style-range structure that round-trips through JSON.
// Offsets and lengths count UTF-16 code units so stored content stays compatible
// with editors that index text that way.

use super::structured_document::{Block, BlockType, InlineStyle, StructuredDocument};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Whole-document raw content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContent {
    pub blocks: Vec<RawBlock>,
    #[serde(default)]
    pub entity_map: Map<String, Value>,
}

/// A single raw block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default = "default_block_type")]
    pub block_type: String,
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub inline_style_ranges: Vec<RawStyleRange>,
    #[serde(default)]
    pub entity_ranges: Vec<Value>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

fn default_block_type() -> String {
    BlockType::Unstyled.name().to_string()
}

/// An inline style applied to [offset, offset + length) in UTF-16 units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: String,
}

/// Byte offset of the given UTF-16 position, rounded up to a char boundary
fn utf16_to_byte(text: &str, units: usize) -> usize {
    let mut count = 0usize;
    for (i, ch) in text.char_indices() {
        if count >= units {
            return i;
        }
        count += ch.len_utf16();
    }
    text.len()
}

fn byte_to_utf16(text: &str, byte: usize) -> usize {
    text[..byte].encode_utf16().count()
}

fn block_to_raw(block: &Block) -> RawBlock {
    let text = block.to_plain_text();
    let mut ranges = Vec::new();

    let mut push_range = |style: InlineStyle, start: usize, end: usize| {
        let offset = byte_to_utf16(&text, start);
        ranges.push(RawStyleRange {
            offset,
            length: byte_to_utf16(&text, end) - offset,
            style: style.name().to_string(),
        });
    };

    for style in InlineStyle::ALL {
        let mut range_start: Option<usize> = None;
        for (start, run) in block.runs_with_offsets() {
            if run.style.contains(style) {
                range_start.get_or_insert(start);
            } else if let Some(s) = range_start.take() {
                push_range(style, s, start);
            }
        }
        if let Some(s) = range_start {
            push_range(style, s, block.text_len());
        }
    }

    RawBlock {
        key: block.key.clone(),
        text,
        block_type: block.block_type.name().to_string(),
        depth: 0,
        inline_style_ranges: ranges,
        entity_ranges: Vec::new(),
        data: Map::new(),
    }
}

fn block_from_raw(raw: &RawBlock) -> Block {
    let block_type = BlockType::from_name(&raw.block_type).unwrap_or_else(|| {
        warn!(block_type = %raw.block_type, key = %raw.key, "unknown block type, using unstyled");
        BlockType::Unstyled
    });

    let mut block = Block::new(raw.key.clone(), block_type).with_plain_text(raw.text.clone());

    for range in &raw.inline_style_ranges {
        let Some(style) = InlineStyle::from_name(&range.style) else {
            warn!(style = %range.style, key = %raw.key, "ignoring unknown inline style");
            continue;
        };
        let start = utf16_to_byte(&raw.text, range.offset);
        let end = utf16_to_byte(&raw.text, range.offset.saturating_add(range.length));
        block.update_styles(start, end, |s| s.set(style, true));
    }

    block
}

/// Convert a document into its raw form
pub fn convert_to_raw(document: &StructuredDocument) -> RawContent {
    RawContent {
        blocks: document.blocks().iter().map(block_to_raw).collect(),
        entity_map: Map::new(),
    }
}

/// Rebuild a document from raw content. A raw value without blocks yields the
/// empty document.
pub fn convert_from_raw(raw: &RawContent) -> StructuredDocument {
    StructuredDocument::from_blocks(raw.blocks.iter().map(block_from_raw).collect())
}

/// Serialize a document to the raw JSON string
pub fn to_json(document: &StructuredDocument) -> serde_json::Result<String> {
    serde_json::to_string(&convert_to_raw(document))
}

/// Parse a raw JSON string into a document
pub fn from_json(json: &str) -> serde_json::Result<StructuredDocument> {
    let raw: RawContent = serde_json::from_str(json)?;
    Ok(convert_from_raw(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::structured_document::TextStyle;

    fn sample_document() -> StructuredDocument {
        StructuredDocument::from_blocks(vec![
            Block::heading("head", 1).with_plain_text("Title"),
            Block::unstyled("body")
                .with_plain_text("plain ")
                .with_text("bold", TextStyle::bold())
                .with_text(" red", TextStyle::bold().with(InlineStyle::Red)),
            Block::new("code", BlockType::CodeBlock).with_plain_text("let x = 1;"),
        ])
    }

    #[test]
    fn test_style_ranges_are_maximal_per_style() {
        let raw = convert_to_raw(&sample_document());
        let body = &raw.blocks[1];

        assert_eq!(body.block_type, "unstyled");
        assert_eq!(
            body.inline_style_ranges,
            vec![
                RawStyleRange {
                    offset: 6,
                    length: 8,
                    style: "BOLD".into()
                },
                RawStyleRange {
                    offset: 10,
                    length: 4,
                    style: "RED".into()
                },
            ]
        );
    }

    #[test]
    fn test_round_trip_preserves_texts_styles_and_types() {
        let doc = sample_document();
        let json = to_json(&doc).unwrap();
        let restored = from_json(&json).unwrap();

        assert_eq!(restored, doc);
    }

    #[test]
    fn test_offsets_count_utf16_units() {
        let doc = StructuredDocument::from_blocks(vec![
            Block::unstyled("k")
                .with_plain_text("😀 ")
                .with_text("hi", TextStyle::bold()),
        ]);

        let raw = convert_to_raw(&doc);
        assert_eq!(raw.blocks[0].inline_style_ranges[0].offset, 3);
        assert_eq!(raw.blocks[0].inline_style_ranges[0].length, 2);

        let restored = convert_from_raw(&raw);
        assert_eq!(restored, doc);
    }

    #[test]
    fn test_parse_external_raw_json() {
        let json = r#"{
            "blocks": [
                {"key": "a1b2c", "text": "Hello red", "type": "header-one", "depth": 0,
                 "inlineStyleRanges": [{"offset": 6, "length": 3, "style": "RED"},
                                       {"offset": 0, "length": 5, "style": "SPARKLE"}],
                 "entityRanges": [], "data": {}}
            ],
            "entityMap": {}
        }"#;

        let doc = from_json(json).unwrap();
        let block = &doc.blocks()[0];
        assert_eq!(block.key, "a1b2c");
        assert_eq!(block.block_type, BlockType::heading(1));
        assert!(block.has_style_in_range(6, 9, InlineStyle::Red));
        assert!(block.style_at(1).is_plain());
    }

    #[test]
    fn test_unknown_block_type_falls_back_to_unstyled() {
        let json = r#"{"blocks": [{"key": "x", "text": "", "type": "atomic"}]}"#;
        let doc = from_json(json).unwrap();
        assert_eq!(doc.blocks()[0].block_type, BlockType::Unstyled);
    }

    #[test]
    fn test_no_blocks_gives_empty_document() {
        let doc = from_json(r#"{"blocks": [], "entityMap": {}}"#).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_malformed_json_fails() {
        assert!(from_json("{\"blocks\": 3}").is_err());
        assert!(from_json("not json").is_err());
    }
}

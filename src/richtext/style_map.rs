// Style table shared by the screen renderer and the HTML export
//
// Only two inline styles are customised: RED renders as red text and UNDERLINE as
// underlined text. Everything else keeps its default look. Code blocks are the one
// block type with a custom wrapper.

use super::structured_document::{BlockType, InlineStyle, TextStyle};
use crate::theme::font;

pub const RED: u32 = 0xFF0000FF;

/// Visual attributes contributed by one inline style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleDecl {
    pub color: Option<u32>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub monospace: bool,
}

/// Fully resolved look of a run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub color: Option<u32>,
    pub font: u8,
    pub underline: bool,
    pub strikethrough: bool,
}

/// Wrapper element grouping consecutive blocks of the same type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrapper {
    pub tag: &'static str,
    pub class: Option<&'static str>,
}

/// How a block type is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockElement {
    pub tag: &'static str,
    pub wrapper: Option<Wrapper>,
}

/// Lookup of declarations for inline styles and elements for block types
#[derive(Debug, Clone)]
pub struct StyleMap {
    custom: Vec<(InlineStyle, StyleDecl)>,
}

impl StyleMap {
    fn default_decl(style: InlineStyle) -> StyleDecl {
        match style {
            InlineStyle::Bold => StyleDecl {
                bold: true,
                ..Default::default()
            },
            InlineStyle::Italic => StyleDecl {
                italic: true,
                ..Default::default()
            },
            InlineStyle::Code => StyleDecl {
                monospace: true,
                ..Default::default()
            },
            InlineStyle::Strikethrough => StyleDecl {
                strikethrough: true,
                ..Default::default()
            },
            InlineStyle::Underline | InlineStyle::Red => StyleDecl::default(),
        }
    }

    /// Declaration for a single inline style, custom entries first
    pub fn decl(&self, style: InlineStyle) -> StyleDecl {
        self.custom
            .iter()
            .find(|(s, _)| *s == style)
            .map(|(_, decl)| *decl)
            .unwrap_or_else(|| Self::default_decl(style))
    }

    /// Merge the declarations of every active style
    pub fn combined(&self, style: TextStyle) -> StyleDecl {
        style.styles().fold(StyleDecl::default(), |acc, s| {
            let decl = self.decl(s);
            StyleDecl {
                color: decl.color.or(acc.color),
                bold: acc.bold || decl.bold,
                italic: acc.italic || decl.italic,
                underline: acc.underline || decl.underline,
                strikethrough: acc.strikethrough || decl.strikethrough,
                monospace: acc.monospace || decl.monospace,
            }
        })
    }

    /// Resolve a run's style to a font and decorations
    pub fn resolve(&self, style: TextStyle) -> ResolvedStyle {
        let decl = self.combined(style);
        let font = match (decl.monospace, decl.bold, decl.italic) {
            (true, true, _) => font::COURIER_BOLD,
            (true, false, _) => font::COURIER,
            (false, true, true) => font::HELVETICA_BOLD_ITALIC,
            (false, true, false) => font::HELVETICA_BOLD,
            (false, false, true) => font::HELVETICA_ITALIC,
            (false, false, false) => font::HELVETICA,
        };
        ResolvedStyle {
            color: decl.color,
            font,
            underline: decl.underline,
            strikethrough: decl.strikethrough,
        }
    }

    /// Inline CSS for a run, or None for unstyled text
    pub fn css(&self, style: TextStyle) -> Option<String> {
        let decl = self.combined(style);
        let mut parts = Vec::new();
        if decl.bold {
            parts.push("font-weight: bold".to_string());
        }
        if decl.italic {
            parts.push("font-style: italic".to_string());
        }
        if decl.monospace {
            parts.push("font-family: monospace".to_string());
        }
        match (decl.underline, decl.strikethrough) {
            (true, true) => parts.push("text-decoration: underline line-through".to_string()),
            (true, false) => parts.push("text-decoration: underline".to_string()),
            (false, true) => parts.push("text-decoration: line-through".to_string()),
            (false, false) => {}
        }
        if let Some(color) = decl.color {
            parts.push(format!("color: {}", css_color(color)));
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }

    /// Element and wrapper for a block type
    pub fn block_element(&self, block_type: BlockType) -> BlockElement {
        let (tag, wrapper) = match block_type {
            BlockType::Unstyled => ("div", None),
            BlockType::Heading { level } => (
                match level {
                    1 => "h1",
                    2 => "h2",
                    3 => "h3",
                    4 => "h4",
                    5 => "h5",
                    _ => "h6",
                },
                None,
            ),
            BlockType::BlockQuote => ("blockquote", None),
            BlockType::CodeBlock => (
                "div",
                Some(Wrapper {
                    tag: "div",
                    class: Some("code-block"),
                }),
            ),
            BlockType::UnorderedListItem => (
                "li",
                Some(Wrapper {
                    tag: "ul",
                    class: None,
                }),
            ),
            BlockType::OrderedListItem => (
                "li",
                Some(Wrapper {
                    tag: "ol",
                    class: None,
                }),
            ),
        };
        BlockElement { tag, wrapper }
    }
}

impl Default for StyleMap {
    fn default() -> Self {
        StyleMap {
            custom: vec![
                (
                    InlineStyle::Red,
                    StyleDecl {
                        color: Some(RED),
                        ..Default::default()
                    },
                ),
                (
                    InlineStyle::Underline,
                    StyleDecl {
                        underline: true,
                        ..Default::default()
                    },
                ),
            ],
        }
    }
}

/// Named CSS color where one exists, hex otherwise
fn css_color(color: u32) -> String {
    match color {
        RED => "red".to_string(),
        _ => format!(
            "#{:02x}{:02x}{:02x}",
            (color >> 24) & 0xFF,
            (color >> 16) & 0xFF,
            (color >> 8) & 0xFF
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_styles() {
        let map = StyleMap::default();
        assert_eq!(map.decl(InlineStyle::Red).color, Some(RED));
        assert!(map.decl(InlineStyle::Underline).underline);
    }

    #[test]
    fn test_resolve_combines_fonts_and_decorations() {
        let map = StyleMap::default();
        let resolved = map.resolve(
            TextStyle::bold()
                .with(InlineStyle::Underline)
                .with(InlineStyle::Red),
        );
        assert_eq!(resolved.font, font::HELVETICA_BOLD);
        assert!(resolved.underline);
        assert_eq!(resolved.color, Some(RED));

        let code = map.resolve(TextStyle::plain().with(InlineStyle::Code));
        assert_eq!(code.font, font::COURIER);
    }

    #[test]
    fn test_css() {
        let map = StyleMap::default();
        assert_eq!(map.css(TextStyle::plain()), None);
        assert_eq!(
            map.css(TextStyle::bold().with(InlineStyle::Red)).as_deref(),
            Some("font-weight: bold; color: red")
        );
    }

    #[test]
    fn test_code_block_has_wrapper() {
        let map = StyleMap::default();
        let element = map.block_element(BlockType::CodeBlock);
        assert_eq!(element.wrapper.and_then(|w| w.class), Some("code-block"));
        assert_eq!(map.block_element(BlockType::heading(1)).tag, "h1");
        assert!(map.block_element(BlockType::Unstyled).wrapper.is_none());
    }
}

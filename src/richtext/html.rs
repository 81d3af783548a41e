// HTML export
// Renders a document the way the editor shows it: block elements from the
// style map, consecutive wrapped blocks grouped, inline styles as spans.

use super::structured_document::{Block, StructuredDocument};
use super::style_map::{StyleMap, Wrapper};

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn open_wrapper(wrapper: Wrapper) -> String {
    match wrapper.class {
        Some(class) => format!("<{} class=\"{}\">", wrapper.tag, class),
        None => format!("<{}>", wrapper.tag),
    }
}

fn block_inner_html(block: &Block, style_map: &StyleMap) -> String {
    if block.is_empty() {
        return "<br>".to_string();
    }

    block
        .content
        .iter()
        .filter(|run| !run.is_empty())
        .map(|run| {
            let text = escape_html(&run.text);
            match style_map.css(run.style) {
                Some(css) => format!("<span style=\"{css}\">{text}</span>"),
                None => text,
            }
        })
        .collect()
}

/// Render the document as an HTML fragment, one element per line
pub fn to_html(document: &StructuredDocument, style_map: &StyleMap) -> String {
    let mut lines = Vec::new();
    let mut open: Option<Wrapper> = None;

    for block in document.blocks() {
        let element = style_map.block_element(block.block_type);

        if open != element.wrapper {
            if let Some(wrapper) = open.take() {
                lines.push(format!("</{}>", wrapper.tag));
            }
            if let Some(wrapper) = element.wrapper {
                lines.push(open_wrapper(wrapper));
                open = Some(wrapper);
            }
        }

        lines.push(format!(
            "<{tag}>{inner}</{tag}>",
            tag = element.tag,
            inner = block_inner_html(block, style_map)
        ));
    }

    if let Some(wrapper) = open {
        lines.push(format!("</{}>", wrapper.tag));
    }

    lines.join("\n")
}

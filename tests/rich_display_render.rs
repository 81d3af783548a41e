// Rendering checks for RichDisplay through the SVG backend


use draftpad::richtext::rich_display::RichDisplay;
use draftpad::richtext::structured_document::{
    Block, BlockType, InlineStyle, StructuredDocument, TextStyle,
};
use draftpad::richtext::structured_editor::StructuredEditor;
use svg_draw_context::SvgDrawContext;

fn render(editor: &StructuredEditor, focused: bool) -> String {
    let mut display = RichDisplay::new(0, 0, 400, 300);
    let mut ctx = SvgDrawContext::new(400, 300);
    ctx.set_focus(focused);
    display.draw(editor, &mut ctx);
    ctx.finish()
}

fn sample_editor() -> StructuredEditor {
    let doc = StructuredDocument::from_blocks(vec![
        Block::heading("", 1).with_plain_text("Title"),
        Block::unstyled("")
            .with_plain_text("plain ")
            .with_text("alarm", TextStyle::plain().with(InlineStyle::Red)),
        Block::new("", BlockType::CodeBlock).with_plain_text("let x = 1;"),
        Block::new("", BlockType::CodeBlock).with_plain_text("let y = 2;"),
    ]);
    StructuredEditor::with_document(doc)
}

#[test]
fn test_red_run_is_drawn_in_red() {
    let svg = render(&sample_editor(), true);
    let red_line = svg
        .lines()
        .find(|line| line.contains(">alarm</text>"))
        .expect("red run drawn");
    assert!(red_line.contains(r##"fill="#ff0000""##), "{red_line}");

    let plain_line = svg
        .lines()
        .find(|line| line.contains(">plain </text>"))
        .expect("plain run drawn");
    assert!(plain_line.contains(r##"fill="#000000""##), "{plain_line}");
}

#[test]
fn test_heading_is_bold_and_larger() {
    let svg = render(&sample_editor(), true);
    let title = svg
        .lines()
        .find(|line| line.contains(">Title</text>"))
        .expect("heading drawn");
    assert!(title.contains(r#"font-weight="bold""#), "{title}");
    assert!(title.contains(r#"font-size="24""#), "{title}");
}

#[test]
fn test_code_blocks_share_one_wrapper() {
    let svg = render(&sample_editor(), true);
    let wrappers = svg
        .lines()
        .filter(|line| line.starts_with("  <rect") && line.contains(r##"fill="#f2f2f2""##))
        .count();
    assert_eq!(wrappers, 1);

    let code = svg
        .lines()
        .find(|line| line.contains(">let </text>"))
        .expect("code drawn");
    assert!(code.contains("monospace"), "{code}");
    assert!(svg.contains(">1;</text>"));
    assert!(svg.contains(">2;</text>"));
}

#[test]
fn test_caret_only_with_focus() {
    let editor = sample_editor();
    let caret = |svg: &str| {
        svg.lines()
            .any(|line| line.starts_with(r#"  <line x1="25" y1="10" x2="25""#))
    };

    assert!(caret(&render(&editor, true)));
    assert!(!caret(&render(&editor, false)));
}

#[test]
fn test_selection_is_highlighted() {
    let mut editor = sample_editor();
    editor.select_all();
    let svg = render(&editor, true);
    assert!(svg.contains(r##"fill="#b4d5fe""##));
}

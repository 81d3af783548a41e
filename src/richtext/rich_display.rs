// Rich Display
// Lays out and renders a StructuredEditor's document onto a DrawContext

use super::structured_document::*;
use super::structured_editor::StructuredEditor;
use super::style_map::StyleMap;
use crate::draw_context::DrawContext;
use crate::theme::{font, Theme};

const LIST_INDENT: i32 = 24;
const QUOTE_INDENT: i32 = 16;

/// Layout information for a rendered line
#[derive(Debug, Clone)]
struct LayoutLine {
    /// Y position of the top of the line (content coordinates)
    y: i32,
    height: i32,
    /// Font size used for the baseline
    size: u8,
    block_index: usize,
    /// Byte offset range within the block [start, end)
    char_start: usize,
    char_end: usize,
    /// X position where an empty line's caret sits
    start_x: i32,
    runs: Vec<VisualRun>,
}

/// A visual run of text with resolved styling
#[derive(Debug, Clone)]
struct VisualRun {
    text: String,
    x: i32,
    width: i32,
    font: u8,
    size: u8,
    color: u32,
    underline: bool,
    strikethrough: bool,
    block_index: usize,
    char_range: (usize, usize),
}

/// Decorations drawn alongside a block's text
#[derive(Debug, Clone)]
enum BlockDecoration {
    Bullet { x: i32, y: i32, size: u8 },
    Number { x: i32, y: i32, size: u8, number: usize },
    QuoteBar { top: i32, bottom: i32 },
    /// Wrapper box around a run of consecutive code blocks
    CodeWrapper { top: i32, bottom: i32 },
}

/// Rich text renderer for structured documents
pub struct RichDisplay {
    x: i32,
    y: i32,
    w: i32,
    h: i32,

    theme: Theme,
    style_map: StyleMap,

    layout_lines: Vec<LayoutLine>,
    decorations: Vec<BlockDecoration>,

    scroll_offset: i32,

    blink_on: bool,
    blink_period_ms: u64,
}

impl RichDisplay {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        RichDisplay {
            x,
            y,
            w,
            h,
            theme: Theme::default(),
            style_map: StyleMap::default(),
            layout_lines: Vec::new(),
            decorations: Vec::new(),
            scroll_offset: 0,
            blink_on: true,
            blink_period_ms: 1000,
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn set_scroll(&mut self, offset: i32) {
        self.scroll_offset = offset.max(0);
    }

    pub fn scroll_offset(&self) -> i32 {
        self.scroll_offset
    }

    /// Height of the laid out content, including bottom padding
    pub fn content_height(&self) -> i32 {
        self.layout_lines
            .last()
            .map(|line| line.y + line.height + self.theme.padding_vertical)
            .unwrap_or(0)
    }

    pub fn resize(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.x = x;
        self.y = y;
        self.w = w;
        self.h = h;
    }

    pub fn h(&self) -> i32 {
        self.h
    }

    /// Update blink state based on elapsed ms. Returns true if visual state changed.
    pub fn tick(&mut self, ms_since_start: u64) -> bool {
        let half_period = (self.blink_period_ms / 2).max(1);
        let on = (ms_since_start / half_period) % 2 == 0;
        if on != self.blink_on {
            self.blink_on = on;
            true
        } else {
            false
        }
    }

    /// Keep the caret visible while typing
    pub fn reset_blink(&mut self) {
        self.blink_on = true;
    }

    /// Scroll minimally so the cursor's line is inside the viewport
    pub fn ensure_cursor_visible(&mut self, editor: &StructuredEditor, ctx: &mut dyn DrawContext) {
        self.layout(editor.document(), ctx);

        let Some((_, cy, ch)) = self.cursor_visual_position(editor, ctx) else {
            return;
        };

        let margin = 8;
        let mut new_scroll = self.scroll_offset;
        if cy < self.scroll_offset + margin {
            new_scroll = (cy - margin).max(0);
        }
        if cy + ch > self.scroll_offset + self.h - margin {
            new_scroll = (cy + ch + margin - self.h).max(0);
        }

        let max_scroll = (self.content_height() - self.h).max(0);
        self.scroll_offset = new_scroll.min(max_scroll);
    }

    /// Lay out the whole document
    pub fn layout(&mut self, document: &StructuredDocument, ctx: &mut dyn DrawContext) {
        self.layout_lines.clear();
        self.decorations.clear();

        let mut current_y = self.theme.padding_vertical;
        let mut ordered_number = 0;
        let mut code_top: Option<i32> = None;
        let blocks = document.blocks();

        for (block_index, block) in blocks.iter().enumerate() {
            ordered_number = match block.block_type {
                BlockType::OrderedListItem => ordered_number + 1,
                _ => 0,
            };

            if block.block_type == BlockType::CodeBlock && code_top.is_none() {
                code_top = Some(current_y);
                current_y += self.theme.code_padding;
            }

            let block_top = current_y;
            current_y = self.layout_block(block, block_index, current_y, ordered_number, ctx);

            if block.block_type == BlockType::BlockQuote {
                self.decorations.push(BlockDecoration::QuoteBar {
                    top: block_top,
                    bottom: current_y,
                });
            }

            let next_is_code = blocks
                .get(block_index + 1)
                .is_some_and(|next| next.block_type == BlockType::CodeBlock);
            if let Some(top) = code_top {
                if !next_is_code {
                    current_y += self.theme.code_padding;
                    self.decorations.push(BlockDecoration::CodeWrapper {
                        top,
                        bottom: current_y,
                    });
                    code_top = None;
                    current_y += self.theme.block_spacing;
                }
            } else {
                current_y += self.theme.block_spacing;
            }
        }
    }

    fn block_font_size(&self, block_type: BlockType) -> u8 {
        match block_type {
            BlockType::Heading { level } => self.theme.heading_size(level),
            _ => self.theme.font_size,
        }
    }

    fn block_indent(&self, block_type: BlockType) -> i32 {
        match block_type {
            BlockType::UnorderedListItem | BlockType::OrderedListItem => LIST_INDENT,
            BlockType::BlockQuote => QUOTE_INDENT,
            BlockType::CodeBlock => self.theme.code_padding,
            _ => 0,
        }
    }

    /// Font for a run inside a block; headings are bold, code blocks monospace
    fn block_font(block_type: BlockType, run_font: u8) -> u8 {
        match block_type {
            BlockType::Heading { .. } => match run_font {
                font::HELVETICA => font::HELVETICA_BOLD,
                font::HELVETICA_ITALIC => font::HELVETICA_BOLD_ITALIC,
                font::COURIER => font::COURIER_BOLD,
                other => other,
            },
            BlockType::CodeBlock => match run_font {
                font::HELVETICA_BOLD | font::HELVETICA_BOLD_ITALIC | font::COURIER_BOLD => {
                    font::COURIER_BOLD
                }
                _ => font::COURIER,
            },
            _ => run_font,
        }
    }

    /// Layout a single block, returning the y position after it
    fn layout_block(
        &mut self,
        block: &Block,
        block_index: usize,
        y: i32,
        ordered_number: usize,
        ctx: &mut dyn DrawContext,
    ) -> i32 {
        let size = self.block_font_size(block.block_type);
        let line_height = self.theme.line_height(size);
        let start_x = self.theme.padding_horizontal + self.block_indent(block.block_type);
        let max_x = self.w - self.theme.padding_horizontal;
        let default_color = match block.block_type {
            BlockType::BlockQuote => self.theme.quote_text_color,
            _ => self.theme.text_color,
        };

        match block.block_type {
            BlockType::UnorderedListItem => self.decorations.push(BlockDecoration::Bullet {
                x: start_x - LIST_INDENT / 2 - 3,
                y,
                size,
            }),
            BlockType::OrderedListItem => self.decorations.push(BlockDecoration::Number {
                x: start_x - LIST_INDENT + 2,
                y,
                size,
                number: ordered_number,
            }),
            _ => {}
        }

        let mut lines: Vec<Vec<VisualRun>> = Vec::new();
        let mut current_line: Vec<VisualRun> = Vec::new();
        let mut current_x = start_x;

        for (run_offset, run) in block.runs_with_offsets() {
            let resolved = self.style_map.resolve(run.style);
            let run_font = Self::block_font(block.block_type, resolved.font);
            let color = resolved.color.unwrap_or(default_color);

            for (start, end) in word_segments(&run.text) {
                let text = &run.text[start..end];
                let width = ctx.text_width(text, run_font, size) as i32;

                if current_x + width > max_x && current_x > start_x {
                    lines.push(std::mem::take(&mut current_line));
                    current_x = start_x;
                }

                current_line.push(VisualRun {
                    text: text.to_string(),
                    x: current_x,
                    width,
                    font: run_font,
                    size,
                    color,
                    underline: resolved.underline,
                    strikethrough: resolved.strikethrough,
                    block_index,
                    char_range: (run_offset + start, run_offset + end),
                });
                current_x += width;
            }
        }
        if !current_line.is_empty() || lines.is_empty() {
            lines.push(current_line);
        }

        let mut current_y = y;
        let mut char_start = 0;
        for runs in lines {
            let char_end = runs.last().map(|r| r.char_range.1).unwrap_or(char_start);
            self.layout_lines.push(LayoutLine {
                y: current_y,
                height: line_height,
                size,
                block_index,
                char_start,
                char_end,
                start_x,
                runs,
            });
            char_start = char_end;
            current_y += line_height;
        }

        current_y
    }

    /// Selected byte range within a run, relative to the run's text
    fn run_selection_range(
        selection: Option<(DocumentPosition, DocumentPosition)>,
        run: &VisualRun,
    ) -> Option<(usize, usize)> {
        let (anchor, focus) = selection?;
        let (sel_start, sel_end) = DocumentPosition::ordered(anchor, focus);

        if run.block_index < sel_start.block_index || run.block_index > sel_end.block_index {
            return None;
        }

        let (run_start, run_end) = run.char_range;
        let start = if run.block_index == sel_start.block_index {
            sel_start.offset
        } else {
            0
        };
        let end = if run.block_index == sel_end.block_index {
            sel_end.offset
        } else {
            usize::MAX
        };

        if run_end <= start || run_start >= end {
            return None;
        }

        let len = run_end - run_start;
        Some((
            start.saturating_sub(run_start).min(len),
            end.saturating_sub(run_start).min(len),
        ))
    }

    /// Draw the editor's document
    pub fn draw(&mut self, editor: &StructuredEditor, ctx: &mut dyn DrawContext) {
        self.layout(editor.document(), ctx);

        ctx.set_color(self.theme.background_color);
        ctx.draw_rect_filled(self.x, self.y, self.w, self.h);
        ctx.push_clip(self.x, self.y, self.w, self.h);

        self.draw_decorations(ctx);

        let viewport_top = self.scroll_offset;
        let viewport_bottom = self.scroll_offset + self.h;
        let selection = editor.selection();

        for line in &self.layout_lines {
            if line.y + line.height < viewport_top || line.y > viewport_bottom {
                continue;
            }

            let line_top = self.y + line.y - self.scroll_offset;
            let baseline = line_top + line.size as i32;

            for run in &line.runs {
                let draw_x = self.x + run.x;
                ctx.set_font(run.font, run.size);

                if let Some((sel_start, sel_end)) = Self::run_selection_range(selection, run) {
                    if sel_end > sel_start {
                        let before = ctx.text_width(&run.text[..sel_start], run.font, run.size);
                        let selected =
                            ctx.text_width(&run.text[sel_start..sel_end], run.font, run.size);
                        ctx.set_color(self.theme.selection_color);
                        ctx.draw_rect_filled(
                            draw_x + before as i32,
                            line_top,
                            selected as i32,
                            line.height,
                        );
                    }
                }

                ctx.set_color(run.color);
                ctx.draw_text(&run.text, draw_x, baseline);

                if run.underline {
                    ctx.draw_line(draw_x, baseline + 2, draw_x + run.width, baseline + 2);
                }
                if run.strikethrough {
                    let strike_y = baseline - (run.size as i32) / 3;
                    ctx.draw_line(draw_x, strike_y, draw_x + run.width, strike_y);
                }
            }
        }

        // Caret only when the widget has keyboard focus
        if ctx.has_focus() && self.blink_on && editor.is_collapsed() {
            if let Some((cx, cy, ch)) = self.cursor_visual_position(editor, ctx) {
                let screen_y = self.y + cy - self.scroll_offset;
                let screen_x = self.x + cx;
                if screen_y >= self.y && screen_y < self.y + self.h {
                    ctx.set_color(self.theme.cursor_color);
                    ctx.draw_line(screen_x, screen_y, screen_x, screen_y + ch);
                }
            }
        }

        ctx.pop_clip();
    }

    fn draw_decorations(&self, ctx: &mut dyn DrawContext) {
        let left = self.x + self.theme.padding_horizontal;
        let right = self.x + self.w - self.theme.padding_horizontal;

        for decoration in &self.decorations {
            match *decoration {
                BlockDecoration::CodeWrapper { top, bottom } => {
                    let top = self.y + top - self.scroll_offset;
                    let bottom = self.y + bottom - self.scroll_offset;
                    ctx.set_color(self.theme.code_background);
                    ctx.draw_rect_filled(left, top, right - left, bottom - top);
                    ctx.set_color(self.theme.code_border);
                    ctx.draw_line(left, top, right, top);
                    ctx.draw_line(left, bottom, right, bottom);
                    ctx.draw_line(left, top, left, bottom);
                    ctx.draw_line(right, top, right, bottom);
                }
                BlockDecoration::QuoteBar { top, bottom } => {
                    ctx.set_color(self.theme.quote_bar_color);
                    ctx.draw_rect_filled(
                        left,
                        self.y + top - self.scroll_offset,
                        self.theme.quote_bar_width,
                        bottom - top,
                    );
                }
                BlockDecoration::Bullet { x, y, size } => {
                    ctx.set_color(self.theme.text_color);
                    ctx.set_font(font::HELVETICA, size);
                    ctx.draw_text(
                        "\u{2022}",
                        self.x + x,
                        self.y + y - self.scroll_offset + size as i32,
                    );
                }
                BlockDecoration::Number { x, y, size, number } => {
                    ctx.set_color(self.theme.text_color);
                    ctx.set_font(font::HELVETICA, size);
                    ctx.draw_text(
                        &format!("{number}."),
                        self.x + x,
                        self.y + y - self.scroll_offset + size as i32,
                    );
                }
            }
        }
    }

    /// Visual position of the cursor (x, y, height) relative to the widget
    fn cursor_visual_position(
        &self,
        editor: &StructuredEditor,
        ctx: &mut dyn DrawContext,
    ) -> Option<(i32, i32, i32)> {
        let cursor = editor.cursor();

        let line = self
            .layout_lines
            .iter()
            .filter(|line| line.block_index == cursor.block_index)
            .find(|line| cursor.offset >= line.char_start && cursor.offset <= line.char_end)?;

        let mut x = line.start_x;
        for run in &line.runs {
            let (run_start, run_end) = run.char_range;
            if cursor.offset >= run_start && cursor.offset <= run_end {
                let before = &run.text[..cursor.offset - run_start];
                x = run.x + ctx.text_width(before, run.font, run.size) as i32;
                break;
            }
            if cursor.offset > run_end {
                x = run.x + run.width;
            }
        }

        Some((x, line.y, line.height))
    }

    /// Convert widget-relative x,y coordinates to a document position
    pub fn xy_to_position(&self, x: i32, y: i32) -> DocumentPosition {
        let adjusted_y = y + self.scroll_offset;

        fn offset_in_line(line: &LayoutLine, x: i32) -> usize {
            let mut offset = line.char_start;
            for run in &line.runs {
                let run_end_x = run.x + run.width;
                if x >= run.x && x < run_end_x {
                    let boundaries: Vec<usize> = run.text.char_indices().map(|(i, _)| i).collect();
                    if run.width <= 0 || boundaries.is_empty() {
                        return run.char_range.0;
                    }
                    let index = (((x - run.x) as f64 / run.width as f64)
                        * boundaries.len() as f64)
                        .round() as usize;
                    let byte = boundaries.get(index).copied().unwrap_or(run.text.len());
                    return run.char_range.0 + byte;
                }
                if x >= run_end_x {
                    offset = run.char_range.1;
                }
            }
            offset
        }

        if let Some(line) = self
            .layout_lines
            .iter()
            .find(|line| adjusted_y >= line.y && adjusted_y < line.y + line.height)
        {
            return DocumentPosition::new(line.block_index, offset_in_line(line, x));
        }

        // No direct hit: pick the vertically nearest line
        let nearest = self.layout_lines.iter().min_by_key(|line| {
            if adjusted_y < line.y {
                line.y - adjusted_y
            } else {
                adjusted_y - (line.y + line.height)
            }
        });

        match nearest {
            Some(line) => DocumentPosition::new(line.block_index, offset_in_line(line, x)),
            None => DocumentPosition::start(),
        }
    }
}

/// Split text into wrap segments: leading whitespace, then each word with its trailing whitespace
fn word_segments(text: &str) -> Vec<(usize, usize)> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut prev_space = false;

    for (i, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        if i > start && prev_space && !space {
            segments.push((start, i));
            start = i;
        }
        prev_space = space;
    }
    if start < text.len() {
        segments.push((start, text.len()));
    }
    segments
}

//! Measurement and drawing for each block kind.
//!
//! Every `*_height` function is pure: it reads the context and its arguments
//! and nothing else. Drawing functions take the origin the paginator decided on.

use crate::fonts::{Face, FontEntry, PT_TO_MM};

use super::RenderContext;
use super::canvas::Canvas;

pub(crate) const LINE_FACTOR: f32 = 1.15;
pub(crate) const LINE_GAP: f32 = 0.6;
/// Baseline offset from the top of a line, in font-size units.
const BASELINE_RATIO: f32 = 0.93;

pub(crate) const HEADER_SIZE: f32 = 13.0;
pub(crate) const LABEL_SIZE: f32 = 8.0;
pub(crate) const VALUE_SIZE: f32 = 10.0;
pub(crate) const BULLET_SIZE: f32 = 10.0;
pub(crate) const CAPTION_SIZE: f32 = 9.0;

const SECTION_SPACE_BEFORE: f32 = 4.0;
const DIVIDER_GAP: f32 = 1.5;
const DIVIDER_THICKNESS: f32 = 0.4;
const SECTION_SPACE_AFTER: f32 = 4.0;
pub(crate) const ROW_GAP: f32 = 3.0;
pub(crate) const GUTTER: f32 = 8.0;
pub(crate) const BULLET_INDENT: f32 = 5.0;
const BULLET_GAP: f32 = 1.5;
const CAPTION_GAP: f32 = 1.5;
const IMAGE_GAP: f32 = 4.0;

pub(crate) const BULLET_MARKER: &str = "\u{2022}";
pub(crate) const PLACEHOLDER: &str = "\u{2014}";

/// Height of one text line at `font_size` points.
pub(crate) fn line_height(font_size: f32) -> f32 {
    font_size * PT_TO_MM * LINE_FACTOR + LINE_GAP
}

fn baseline(top: f32, font_size: f32) -> f32 {
    top + font_size * PT_TO_MM * BASELINE_RATIO
}

/// Values render as an em dash when empty.
pub(crate) fn display_value(value: &str) -> &str {
    if value.trim().is_empty() {
        PLACEHOLDER
    } else {
        value
    }
}

/// Greedy word wrapping as a lazy, restartable sequence of line slices.
///
/// Explicit `\n` starts a new line; a single word wider than the line is broken
/// between characters. Every call to `next` consumes input, so the sequence is
/// always finite.
#[derive(Clone)]
pub(crate) struct WrapLines<'a> {
    font: &'a FontEntry,
    font_size: f32,
    max_width: f32,
    rest: &'a str,
    done: bool,
}

pub(crate) fn wrap<'a>(
    font: &'a FontEntry,
    text: &'a str,
    font_size: f32,
    max_width: f32,
) -> WrapLines<'a> {
    WrapLines {
        font,
        font_size,
        max_width,
        rest: text,
        done: text.trim().is_empty(),
    }
}

impl<'a> WrapLines<'a> {
    /// Byte length of the longest prefix of `word` that fits, at least one char.
    fn fitting_prefix(&self, word: &str) -> usize {
        let mut width = 0.0;
        let mut end = 0;
        for (idx, ch) in word.char_indices() {
            width += self.font.text_width(ch.encode_utf8(&mut [0; 4]), self.font_size);
            if width > self.max_width && end > 0 {
                break;
            }
            end = idx + ch.len_utf8();
        }
        end
    }
}

impl<'a> Iterator for WrapLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.done {
            return None;
        }
        let paragraph_end = self.rest.find('\n').unwrap_or(self.rest.len());
        let paragraph = &self.rest[..paragraph_end];
        let lead = paragraph.len() - paragraph.trim_start().len();
        let body = &paragraph[lead..];

        let mut line_end = 0;
        let mut width = 0.0;
        let mut pending_space = 0.0;
        let mut cursor = 0;
        while cursor < body.len() {
            let tail = &body[cursor..];
            let is_space = tail.starts_with(char::is_whitespace);
            let token_len = tail
                .find(|c: char| c.is_whitespace() != is_space)
                .unwrap_or(tail.len());
            let token = &tail[..token_len];
            let token_width = self.font.text_width(token, self.font_size);

            if is_space {
                pending_space += token_width;
            } else if line_end == 0 && token_width > self.max_width {
                line_end = cursor + self.fitting_prefix(token);
                break;
            } else if line_end > 0 && width + pending_space + token_width > self.max_width {
                break;
            } else {
                width += pending_space + token_width;
                pending_space = 0.0;
                line_end = cursor + token_len;
            }
            cursor += token_len;
        }

        let line = &body[..line_end];
        let remaining = &body[line_end..];
        if remaining.trim().is_empty() {
            // Paragraph exhausted: continue after the newline, if any.
            if paragraph_end < self.rest.len() && !self.rest[paragraph_end + 1..].is_empty() {
                self.rest = &self.rest[paragraph_end + 1..];
            } else {
                self.done = true;
            }
        } else {
            self.rest = &self.rest[lead + line_end..];
        }
        Some(line.trim_end())
    }
}

fn wrapped_line_count(font: &FontEntry, text: &str, font_size: f32, width: f32) -> usize {
    wrap(font, text, font_size, width).count().max(1)
}

fn draw_wrapped(
    canvas: &mut Canvas,
    font: &FontEntry,
    text: &str,
    font_size: f32,
    color: [u8; 3],
    x: f32,
    top: f32,
    width: f32,
) -> f32 {
    let lh = line_height(font_size);
    let mut y = top;
    let mut lines = 0;
    for line in wrap(font, text, font_size, width) {
        canvas.text(x, baseline(y, font_size), font, font_size, color, line);
        y += lh;
        lines += 1;
    }
    if lines == 0 {
        y += lh;
    }
    y
}

// Section header

pub(crate) fn section_header_height() -> f32 {
    SECTION_SPACE_BEFORE
        + line_height(HEADER_SIZE)
        + DIVIDER_GAP
        + DIVIDER_THICKNESS
        + SECTION_SPACE_AFTER
}

/// Height of the smallest field that can follow a header: one label line, one
/// value line and the row gap, as measured by `label_value_height`.
pub(crate) fn keep_with_next_height() -> f32 {
    line_height(LABEL_SIZE) + line_height(VALUE_SIZE) + ROW_GAP
}

pub(crate) fn draw_section_header(ctx: &RenderContext, canvas: &mut Canvas, title: &str, top: f32) {
    let page = &ctx.config.page;
    let theme = &ctx.config.theme;
    let title_top = top + SECTION_SPACE_BEFORE;
    canvas.text(
        page.margin,
        baseline(title_top, HEADER_SIZE),
        ctx.fonts.face(Face::Bold),
        HEADER_SIZE,
        theme.header_fill,
        title,
    );
    let rule_y = title_top + line_height(HEADER_SIZE) + DIVIDER_GAP;
    canvas.rule(
        page.margin,
        page.width - page.margin,
        rule_y,
        DIVIDER_THICKNESS,
        theme.accent,
    );
}

// Label / value

fn field_height(ctx: &RenderContext, label: &str, value: &str, width: f32) -> f32 {
    let label_lines = wrapped_line_count(ctx.fonts.face(Face::Regular), label, LABEL_SIZE, width);
    let value_lines = wrapped_line_count(
        ctx.fonts.face(Face::Bold),
        display_value(value),
        VALUE_SIZE,
        width,
    );
    label_lines as f32 * line_height(LABEL_SIZE) + value_lines as f32 * line_height(VALUE_SIZE)
}

fn draw_field(
    ctx: &RenderContext,
    canvas: &mut Canvas,
    label: &str,
    value: &str,
    x: f32,
    top: f32,
    width: f32,
) {
    let theme = &ctx.config.theme;
    let value_top = draw_wrapped(
        canvas,
        ctx.fonts.face(Face::Regular),
        label,
        LABEL_SIZE,
        theme.muted,
        x,
        top,
        width,
    );
    draw_wrapped(
        canvas,
        ctx.fonts.face(Face::Bold),
        display_value(value),
        VALUE_SIZE,
        theme.text,
        x,
        value_top,
        width,
    );
}

pub(crate) fn label_value_height(ctx: &RenderContext, label: &str, value: &str, width: f32) -> f32 {
    field_height(ctx, label, value, width) + ROW_GAP
}

pub(crate) fn draw_label_value(
    ctx: &RenderContext,
    canvas: &mut Canvas,
    label: &str,
    value: &str,
    top: f32,
) {
    let page = &ctx.config.page;
    draw_field(ctx, canvas, label, value, page.margin, top, page.content_width());
}

// Two columns

pub(crate) fn column_width(content_width: f32) -> f32 {
    (content_width - GUTTER) / 2.0
}

pub(crate) fn two_column_height(
    ctx: &RenderContext,
    left: (&str, &str),
    right: (&str, &str),
    width: f32,
) -> f32 {
    let col = column_width(width);
    field_height(ctx, left.0, left.1, col).max(field_height(ctx, right.0, right.1, col)) + ROW_GAP
}

pub(crate) fn draw_two_column(
    ctx: &RenderContext,
    canvas: &mut Canvas,
    left: (&str, &str),
    right: (&str, &str),
    top: f32,
) {
    let page = &ctx.config.page;
    let col = column_width(page.content_width());
    draw_field(ctx, canvas, left.0, left.1, page.margin, top, col);
    draw_field(ctx, canvas, right.0, right.1, page.margin + col + GUTTER, top, col);
}

// Bullet items

pub(crate) fn bullet_item_height(ctx: &RenderContext, item: &str, width: f32) -> f32 {
    let lines = wrapped_line_count(
        ctx.fonts.face(Face::Regular),
        item,
        BULLET_SIZE,
        width - BULLET_INDENT,
    );
    lines as f32 * line_height(BULLET_SIZE) + BULLET_GAP
}

pub(crate) fn draw_bullet_item(ctx: &RenderContext, canvas: &mut Canvas, item: &str, top: f32) {
    let page = &ctx.config.page;
    let theme = &ctx.config.theme;
    let font = ctx.fonts.face(Face::Regular);
    canvas.text(
        page.margin + 1.0,
        baseline(top, BULLET_SIZE),
        font,
        BULLET_SIZE,
        theme.accent,
        BULLET_MARKER,
    );
    draw_wrapped(
        canvas,
        font,
        item,
        BULLET_SIZE,
        theme.text,
        page.margin + BULLET_INDENT,
        top,
        page.content_width() - BULLET_INDENT,
    );
}

// Images

pub(crate) fn image_block_height(image_height: f32, caption: Option<&str>) -> f32 {
    let caption_height = match caption {
        Some(_) => CAPTION_GAP + line_height(CAPTION_SIZE),
        None => 0.0,
    };
    image_height + caption_height + IMAGE_GAP
}

pub(crate) fn draw_image_block(
    ctx: &RenderContext,
    canvas: &mut Canvas,
    image_name: &str,
    size: (f32, f32),
    caption: Option<&str>,
    top: f32,
) {
    let page = &ctx.config.page;
    let (width, height) = size;
    // Opaque backing so transparent pixels do not show the page fill.
    canvas.fill_rect(page.margin, top, width, height, [255, 255, 255]);
    canvas.image(image_name, page.margin, top, width, height);
    if let Some(caption) = caption {
        let caption_top = top + height + CAPTION_GAP;
        canvas.text(
            page.margin,
            baseline(caption_top, CAPTION_SIZE),
            ctx.fonts.face(Face::Regular),
            CAPTION_SIZE,
            ctx.config.theme.muted,
            caption,
        );
    }
}

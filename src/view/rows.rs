//! Row painting and cell-level text helpers.
//!
//! Messages are laid out on a character grid: a fixed gutter, then the
//! message wrapped (or clipped) to the remaining columns. The same layout
//! is used to turn a mouse drag back into the selected substring.

use super::styles::RowStyles;
use super::GUTTER_WIDTH;
use crate::state::{LogRowsFrame, RenderedRow};
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthChar;

/// A cell position inside one row: visual line and column in the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TextPosition {
    pub line: usize,
    pub column: usize,
}

impl TextPosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Control characters would break the grid; show them as spaces.
fn display_chars(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().map(|c| if c.is_control() { ' ' } else { c })
}

/// Visual lines of a message.
///
/// With `wrap` the message is split every `width` columns (a wide glyph
/// that would straddle the edge moves to the next line). Without it the
/// whole message is one line and the terminal clips it. Always at least
/// one line.
pub fn message_lines(message: &str, wrap: bool, width: usize) -> Vec<String> {
    if !wrap || width == 0 {
        return vec![display_chars(message).collect()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for c in display_chars(message) {
        let w = c.width().unwrap_or(0);
        if used + w > width && used > 0 {
            lines.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(c);
        used += w;
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Substring of `line` covering columns `[start, end)`.
///
/// A glyph is included when its first column falls in the range.
pub fn slice_columns(line: &str, start: usize, end: usize) -> &str {
    let mut column = 0;
    let mut from = line.len();
    let mut to = line.len();
    for (byte, c) in line.char_indices() {
        if column >= end {
            to = byte;
            break;
        }
        if column >= start && from == line.len() {
            from = byte;
        }
        column += c.width().unwrap_or(0);
    }
    if from > to {
        return "";
    }
    &line[from..to]
}

/// Text between two positions of a laid-out row, inclusive of the cell
/// under `to`. Positions may come in either order. Lines are joined
/// without separators since they are pieces of one message.
pub fn selected_text(lines: &[String], from: TextPosition, to: TextPosition) -> String {
    let (start, end) = if from <= to { (from, to) } else { (to, from) };
    let last = lines.len().saturating_sub(1);
    let end_line = end.line.min(last);

    let mut text = String::new();
    for (index, line) in lines.iter().enumerate().take(end_line + 1).skip(start.line) {
        let first = if index == start.line { start.column } else { 0 };
        let past = if index == end.line {
            end.column + 1
        } else {
            usize::MAX
        };
        text.push_str(slice_columns(line, first, past));
    }
    text
}

/// Gutter text for the first line of a row: marker, duplicate badge, gap.
pub fn gutter(row: &RenderedRow, show_duplicates: bool, hovered: bool) -> String {
    let marker = if row.pinned {
        '*'
    } else if row.permalinked {
        '#'
    } else if hovered {
        '>'
    } else {
        ' '
    };
    let badge = match row.row.duplicates() {
        n if show_duplicates && n > 0 => format!("x{}", n + 1),
        _ => String::new(),
    };
    let badge_width = GUTTER_WIDTH as usize - 2;
    format!("{marker}{badge:>badge_width$} ")
}

/// Visual line count a row actually takes at `width` message columns.
pub fn measured_lines(row: &RenderedRow, wrap: bool, width: usize) -> usize {
    message_lines(row.row.raw(), wrap, width).len()
}

/// Paint the frame's rows into `area`.
///
/// Rows are positioned by their content offset relative to the frame's
/// scroll offset; rows straddling the top edge lose their first lines.
pub fn render_rows(
    frame: &mut Frame,
    area: Rect,
    rows: &LogRowsFrame,
    wrap: bool,
    hovered_uid: Option<&str>,
    styles: &RowStyles,
) {
    let message_width = (area.width as usize).saturating_sub(GUTTER_WIDTH as usize);
    let top = rows.range.scroll_offset;
    let bottom = top + area.height as usize;
    let blank_gutter = " ".repeat(GUTTER_WIDTH as usize);

    let mut lines: Vec<Line> = Vec::with_capacity(area.height as usize);
    for rendered in &rows.rows {
        let hovered = hovered_uid == Some(rendered.row.uid());
        let style = styles.row_style(rendered, hovered);
        let text_lines = message_lines(rendered.row.raw(), wrap, message_width);
        for (line_index, text) in text_lines.into_iter().enumerate() {
            let y = rendered.offset + line_index;
            if y < top || y >= bottom {
                continue;
            }
            let gutter_text = if line_index == 0 {
                gutter(rendered, rows.show_duplicates, hovered)
            } else {
                blank_gutter.clone()
            };
            let target = y - top;
            while lines.len() < target {
                lines.push(Line::default());
            }
            if lines.len() == target {
                lines.push(Line::from(vec![
                    Span::styled(gutter_text, styles.gutter),
                    Span::styled(text, style),
                ]));
            }
        }
    }

    frame.render_widget(Paragraph::new(lines), area);
}

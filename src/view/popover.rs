//! Selection popover widget.

use super::styles::RowStyles;
use crate::engine::Point;
use crate::state::{PopoverAction, PopoverSize, SelectionState};
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

/// Menu entries, top to bottom.
const ACTIONS: [(PopoverAction, &str); 2] = [
    (PopoverAction::FilterValue, "[f] Filter for value"),
    (PopoverAction::FilterOutValue, "[F] Filter out value"),
];

/// Screen rectangle of a popover anchored at `position`, clipped to `area`.
pub fn popover_rect(position: Point, size: PopoverSize, area: Rect) -> Rect {
    let clamp = |value: u32| u16::try_from(value).unwrap_or(u16::MAX);
    Rect::new(
        clamp(position.x),
        clamp(position.y),
        clamp(size.width),
        clamp(size.height),
    )
    .intersection(area)
}

/// Action under a cell of the popover, if any. Borders are inert.
pub fn action_at(rect: Rect, column: u16, row: u16) -> Option<PopoverAction> {
    let inner = Block::default().borders(Borders::ALL).inner(rect);
    let inside = column >= inner.x
        && column < inner.right()
        && row >= inner.y
        && row < inner.bottom();
    if !inside {
        return None;
    }
    ACTIONS
        .get(usize::from(row - inner.y))
        .map(|(action, _)| *action)
}

/// Paint the popover for `selection` over whatever is below it.
pub fn render_popover(
    frame: &mut Frame,
    selection: &SelectionState,
    size: PopoverSize,
    styles: &RowStyles,
) {
    let rect = popover_rect(selection.popover_position, size, frame.area());
    if rect.is_empty() {
        return;
    }

    let title = format!(" {:?} ", selection.text);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(styles.popover);
    let lines: Vec<Line> = ACTIONS.iter().map(|(_, label)| Line::from(*label)).collect();

    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_is_clipped_to_area() {
        let rect = popover_rect(Point::new(70, 20), PopoverSize::new(26, 4), Rect::new(0, 0, 80, 22));
        assert_eq!(rect, Rect::new(70, 20, 10, 2));
    }

    #[test]
    fn rows_map_to_actions() {
        let rect = Rect::new(10, 5, 26, 4);
        assert_eq!(action_at(rect, 12, 6), Some(PopoverAction::FilterValue));
        assert_eq!(action_at(rect, 12, 7), Some(PopoverAction::FilterOutValue));
    }

    #[test]
    fn borders_and_outside_cells_are_inert() {
        let rect = Rect::new(10, 5, 26, 4);
        assert_eq!(action_at(rect, 12, 5), None);
        assert_eq!(action_at(rect, 10, 6), None);
        assert_eq!(action_at(rect, 12, 8), None);
        assert_eq!(action_at(rect, 40, 6), None);
    }
}

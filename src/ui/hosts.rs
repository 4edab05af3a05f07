//! Host list widget
//!
//! Renders the visible window as numbered rows with scroll markers.

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{block::Title, Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::engine::{Mode, Row, SelectionMode, View};

use super::theme::{Symbols, Theme};

/// Draw the host list
pub fn draw(frame: &mut Frame, view: &View, theme: &Theme, area: Rect) {
    let focused = matches!(view.mode, Mode::Browsing);
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            theme.border_focused()
        } else {
            theme.border()
        })
        .title(" Results ");

    if view.more_above {
        block = block.title(
            Title::from(Span::styled(
                format!(" {} ", Symbols::MORE_ABOVE),
                theme.muted(),
            ))
            .alignment(Alignment::Right),
        );
    }
    if view.more_below {
        block = block.title_bottom(
            Line::from(Span::styled(format!(" {} ", Symbols::MORE_BELOW), theme.muted()))
                .alignment(Alignment::Right),
        );
    }

    let width = view.rows.last().map_or(1, |row| row.number.to_string().len());

    let mut items: Vec<ListItem> = view
        .rows
        .iter()
        .map(|row| row_to_list_item(row, view.selection, theme, width))
        .collect();

    if items.is_empty() {
        let message = if view.total == 0 {
            "  No hosts."
        } else {
            "  No hosts match the filter."
        };
        items.push(ListItem::new(Line::from(Span::styled(message, theme.muted()))));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.cursor())
        .highlight_symbol(Symbols::CURSOR);

    let mut state = ListState::default();
    state.select(view.cursor);

    frame.render_stateful_widget(list, area, &mut state);
}

/// `[n] host`, with a mark column in toggle mode
fn row_to_list_item<'a>(
    row: &'a Row,
    selection: SelectionMode,
    theme: &Theme,
    width: usize,
) -> ListItem<'a> {
    let mut spans = vec![Span::styled(
        format!("[{:>width$}] ", row.number, width = width),
        theme.number(),
    )];

    if selection == SelectionMode::Toggle {
        let mark = if row.selected {
            Span::styled(Symbols::MARKED, theme.marked())
        } else {
            Span::styled(Symbols::UNMARKED, theme.muted())
        };
        spans.push(mark);
        spans.push(Span::raw(" "));
    }

    let name_style = if row.selected {
        theme.marked()
    } else {
        theme.normal()
    };
    spans.push(Span::styled(row.name.as_str(), name_style));

    ListItem::new(Line::from(spans))
}

//! Input lines and dialogs
//!
//! Renders the numeric entry line, the filter bar and the connect prompt.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::engine::{SelectionMode, View};

use super::{layout::centered_rect_fixed, theme::Theme};

/// Draw the entry line shown while browsing, with the status message on the right
pub fn draw_entry_line(
    frame: &mut Frame,
    view: &View,
    theme: &Theme,
    status: Option<&str>,
    area: Rect,
) {
    let mut spans = vec![Span::styled(" Hosts: ", theme.prompt())];
    match view.selection {
        SelectionMode::Index => {
            spans.push(Span::styled(view.entry.clone(), theme.normal()));
            spans.push(Span::styled(" ", theme.input_cursor()));
        }
        SelectionMode::Toggle => {
            spans.push(Span::styled(format!("{} selected", view.selected), theme.normal()));
            if !view.entry.is_empty() {
                spans.push(Span::styled(format!("  #{}", view.entry), theme.muted()));
            }
        }
    }
    if !view.filter.is_empty() {
        spans.push(Span::styled(format!("  /{}", view.filter), theme.muted()));
    }

    if let Some(message) = status {
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let padding = (area.width as usize).saturating_sub(used + message.chars().count() + 1);
        spans.push(Span::raw(" ".repeat(padding.max(2))));
        spans.push(Span::styled(message.to_string(), theme.warning()));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the filter bar
pub fn draw_filter_bar(frame: &mut Frame, view: &View, theme: &Theme, area: Rect) {
    let filter_line = Line::from(vec![
        Span::styled(" / ", theme.prompt()),
        Span::styled(view.filter.clone(), theme.normal()),
        Span::styled("_", theme.input_cursor()),
    ]);

    frame.render_widget(Paragraph::new(filter_line), area);
}

/// Draw the "really connect" prompt
pub fn draw_confirm_dialog(frame: &mut Frame, theme: &Theme, targets: &[String]) {
    let question = match targets {
        [target] => format!("Really connect to {}?", target),
        targets => format!("Really connect to {} hosts?", targets.len()),
    };
    let width = (question.chars().count() as u16 + 6).max(30);
    let area = centered_rect_fixed(width, 6, frame.size());

    // Clear background
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_focused())
        .title(" Confirm ");

    let content = Paragraph::new(vec![
        Line::from(Span::raw("")),
        Line::from(Span::styled(question, theme.warning())),
        Line::from(Span::raw("")),
        Line::from(vec![
            Span::styled("[y] ", theme.key()),
            Span::styled("Connect  ", theme.key_desc()),
            Span::styled("[any] ", theme.key()),
            Span::styled("Cancel", theme.key_desc()),
        ]),
    ])
    .block(block);

    frame.render_widget(content, area);
}

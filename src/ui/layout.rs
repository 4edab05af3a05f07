//! Main layout and rendering
//!
//! Splits the screen into header, host list, entry line and footer, and
//! places overlays on top.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::engine::{Mode, SelectionMode, View};

use super::{help, hosts, input, theme::Theme};

/// Rows taken by everything except the list body
const CHROME_ROWS: u16 = 1 + 1 + 2 + 2;

/// Number of host rows that fit a terminal `height` rows tall
pub fn list_capacity(height: u16) -> usize {
    usize::from(height.saturating_sub(CHROME_ROWS)).max(1)
}

/// Main draw function
pub fn draw(frame: &mut Frame, view: &View, theme: &Theme, status: Option<&str>) {
    let size = frame.size();

    // Main layout: header, list, entry, footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Host list
            Constraint::Length(1), // Entry / filter
            Constraint::Length(2), // Footer
        ])
        .split(size);

    draw_header(frame, view, theme, chunks[0]);
    hosts::draw(frame, view, theme, chunks[1]);

    match view.mode.base() {
        Mode::Filtering => input::draw_filter_bar(frame, view, theme, chunks[2]),
        _ => input::draw_entry_line(frame, view, theme, status, chunks[2]),
    }

    draw_footer(frame, view, theme, chunks[3]);

    // Overlays
    match &view.mode {
        Mode::Help { previous } => help::draw(frame, previous, theme),
        Mode::ConfirmingExit { targets } => input::draw_confirm_dialog(frame, theme, targets),
        _ => {}
    }
}

/// Draw header
fn draw_header(frame: &mut Frame, view: &View, theme: &Theme, area: Rect) {
    let title = if view.matched == view.total {
        format!(" upssh - Hosts ({}) ", view.total)
    } else {
        format!(" upssh - Hosts ({}/{}) ", view.matched, view.total)
    };

    let help_hint = "[?] Help  [q] Quit";

    let padding = (area.width as usize).saturating_sub(title.len() + help_hint.len());

    let header = Line::from(vec![
        Span::styled(title, theme.title()),
        Span::raw(" ".repeat(padding.max(1))),
        Span::styled(help_hint, theme.muted()),
    ]);

    frame.render_widget(Paragraph::new(header), area);
}

/// Key hints for the current mode
fn footer_keys(view: &View) -> Vec<(&'static str, &'static str)> {
    match (view.mode.base(), view.selection) {
        (Mode::Filtering, _) => vec![
            ("[Enter]", "Keep filter"),
            ("[Esc]", "Clear filter"),
            ("[,]", "New term"),
            ("[Up/Down]", "Move"),
        ],
        (_, SelectionMode::Index) => vec![
            ("[0-9]", "Pick row"),
            ("[,]", "Add another"),
            ("[Enter]", "Connect"),
            ("[/]", "Filter"),
            ("[*]", "All shown"),
            ("[Del]", "Clear entry"),
        ],
        (_, SelectionMode::Toggle) => vec![
            ("[Space]", "Toggle"),
            ("[0-9]", "Toggle row"),
            ("[Enter]", "Connect"),
            ("[/]", "Filter"),
            ("[*]", "All shown"),
        ],
    }
}

/// Draw footer with key hints
fn draw_footer(frame: &mut Frame, view: &View, theme: &Theme, area: Rect) {
    let mut spans = Vec::new();
    for (i, (key, desc)) in footer_keys(view).into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(key, theme.key()));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(desc, theme.key_desc()));
    }

    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(theme.border()),
    );

    frame.render_widget(footer, area);
}

/// Center a rect within another
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Create a fixed-size centered rect
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = (r.width.saturating_sub(width)) / 2;
    let y = (r.height.saturating_sub(height)) / 2;

    Rect {
        x: r.x + x,
        y: r.y + y,
        width: width.min(r.width),
        height: height.min(r.height),
    }
}

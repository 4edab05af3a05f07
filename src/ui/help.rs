//! Help overlay widget

use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::engine::Mode;

use super::{layout::centered_rect, theme::Theme};

type Section = (&'static str, Vec<(&'static str, &'static str)>);

/// Keybinding sections, the mode the help was opened from first
fn sections(previous: &Mode) -> Vec<Section> {
    let browsing = (
        "Browsing",
        vec![
            ("0-9", "Type a row number"),
            (",", "Start another row number"),
            ("Enter", "Connect to the entered rows"),
            ("Del / Bksp", "Clear the pending entry"),
            ("j / Down", "Move down"),
            ("k / Up", "Move up"),
            ("Space", "Toggle host (toggle mode)"),
            ("* / Ctrl-a", "Connect to every shown host"),
            ("/", "Filter hosts"),
            ("q / Esc", "Quit without connecting"),
        ],
    );
    let filtering = (
        "Filtering",
        vec![
            ("a-z 0-9 . -", "Add to the filter"),
            (",", "Start another term (all must match)"),
            ("Bksp", "Remove a character"),
            ("Enter", "Keep the filter and browse"),
            ("Esc", "Clear the filter"),
        ],
    );
    let general = (
        "General",
        vec![("? / F1", "Show this help"), ("Ctrl-c", "Quit")],
    );

    match previous {
        Mode::Filtering => vec![filtering, browsing, general],
        _ => vec![browsing, filtering, general],
    }
}

/// Draw the help overlay
pub fn draw(frame: &mut Frame, previous: &Mode, theme: &Theme) {
    let area = centered_rect(60, 80, frame.size());

    // Clear the background
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_focused())
        .title(" Help - Keyboard Shortcuts ")
        .style(theme.overlay());

    let mut lines: Vec<Line> = Vec::new();

    for (section_name, keys) in sections(previous) {
        lines.push(Line::from(Span::raw("")));
        lines.push(Line::from(Span::styled(
            format!(" {} ", section_name),
            theme.header(),
        )));

        for (key, desc) in keys {
            lines.push(Line::from(vec![
                Span::raw("   "),
                Span::styled(format!("{:<14}", key), theme.key()),
                Span::styled(desc, theme.key_desc()),
            ]));
        }
    }

    lines.push(Line::from(Span::raw("")));
    lines.push(Line::from(Span::styled(
        " Press any key to close ",
        theme.muted(),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

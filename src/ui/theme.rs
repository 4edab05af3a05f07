//! UI theme and styling
//!
//! Defines colors, styles, and glyphs for the host picker.

use ratatui::style::{Color, Modifier, Style};
use tracing::warn;

/// Theme configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Primary foreground color
    pub fg: Color,
    /// Primary background color
    pub bg: Color,
    /// Accent color for titles and keys
    pub accent: Color,
    /// Color of toggled hosts
    pub marked: Color,
    /// Warning color
    pub warning: Color,
    /// Muted/dimmed color
    pub muted: Color,
    /// Border color
    pub border: Color,
    /// Cursor row background
    pub cursor_bg: Color,
    /// Cursor row foreground
    pub cursor_fg: Color,
    /// Overlay background
    pub overlay_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            fg: Color::White,
            bg: Color::Reset,
            accent: Color::Cyan,
            marked: Color::Green,
            warning: Color::Yellow,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            cursor_bg: Color::Rgb(40, 44, 52),
            cursor_fg: Color::Cyan,
            overlay_bg: Color::Rgb(20, 20, 20),
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            fg: Color::Black,
            bg: Color::White,
            accent: Color::Blue,
            marked: Color::Rgb(0, 128, 0),
            warning: Color::Rgb(200, 150, 0),
            muted: Color::Gray,
            border: Color::Gray,
            cursor_bg: Color::Rgb(230, 240, 255),
            cursor_fg: Color::Blue,
            overlay_bg: Color::Rgb(245, 245, 245),
        }
    }

    /// Look a theme up by its configured name, falling back to dark
    pub fn by_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" | "" => Self::dark(),
            "light" => Self::light(),
            other => {
                warn!(theme = other, "unknown theme, using dark");
                Self::dark()
            }
        }
    }

    /// Normal text style
    pub fn normal(&self) -> Style {
        Style::default().fg(self.fg)
    }

    /// Muted/dimmed text
    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Title style
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Highlighted row
    pub fn cursor(&self) -> Style {
        Style::default()
            .fg(self.cursor_fg)
            .bg(self.cursor_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Toggled host
    pub fn marked(&self) -> Style {
        Style::default()
            .fg(self.marked)
            .add_modifier(Modifier::BOLD)
    }

    /// Row number column
    pub fn number(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    /// Key hint style
    pub fn key(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Key description style
    pub fn key_desc(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Header/section style
    pub fn header(&self) -> Style {
        Style::default().fg(self.muted).add_modifier(Modifier::BOLD)
    }

    /// Input cursor style
    pub fn input_cursor(&self) -> Style {
        Style::default().fg(self.bg).bg(self.fg)
    }

    /// Prompt text style
    pub fn prompt(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Help overlay style
    pub fn overlay(&self) -> Style {
        Style::default().fg(self.fg).bg(self.overlay_bg)
    }
}

/// Symbols used in the UI
pub struct Symbols;

impl Symbols {
    /// Highlight marker for the cursor row
    pub const CURSOR: &'static str = "> ";
    /// Toggled host
    pub const MARKED: &'static str = "\u{25CF}"; // ●
    /// Untoggled host
    pub const UNMARKED: &'static str = "\u{25CB}"; // ○
    /// More rows above the window
    pub const MORE_ABOVE: &'static str = "\u{25B2} more"; // ▲
    /// More rows below the window
    pub const MORE_BELOW: &'static str = "\u{25BC} more"; // ▼
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(Theme::by_name("light"), Theme::light());
        assert_eq!(Theme::by_name(" Light "), Theme::light());
        assert_eq!(Theme::by_name("dark"), Theme::dark());
        assert_eq!(Theme::by_name("solarized"), Theme::dark());
    }
}

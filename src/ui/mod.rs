//! UI module
//!
//! Renders the engine's `View`; holds no state of its own.

mod help;
mod hosts;
mod input;
mod layout;
pub mod theme;

use ratatui::Frame;

use crate::engine::View;

pub use layout::list_capacity;
pub use theme::Theme;

/// Main draw function
pub fn draw(frame: &mut Frame, view: &View, theme: &Theme, status: Option<&str>) {
    layout::draw(frame, view, theme, status);
}

//! Event handling for the TUI
//!
//! Reads terminal events on a background task and decodes keys into engine
//! input events according to the current mode.

use anyhow::Result;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use std::io::{stdout, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::engine::{InputEvent, Mode};

/// Application events
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Key press event
    Key(KeyEvent),
    /// Bracketed paste
    Paste(String),
    /// Terminal resize
    Resize(u16, u16),
    /// Tick event for periodic redraws
    Tick,
    /// Error event
    Error(String),
}

/// Event handler configuration
pub struct EventConfig {
    /// Tick rate in milliseconds
    pub tick_rate_ms: u64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 250 }
    }
}

/// Event reader running on a blocking task
pub struct EventHandler {
    /// Channel receiver for events
    rx: mpsc::UnboundedReceiver<AppEvent>,
    /// Tells the reader to stop before its next poll
    stop: Arc<AtomicBool>,
    /// Handle to the reader task
    task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(config: EventConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tick_rate = Duration::from_millis(config.tick_rate_ms.max(10));
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let task = tokio::task::spawn_blocking(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                let event = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                        Ok(Event::Paste(text)) => AppEvent::Paste(text),
                        Ok(Event::Resize(w, h)) => AppEvent::Resize(w, h),
                        Ok(_) => continue,
                        Err(e) => AppEvent::Error(e.to_string()),
                    }
                } else {
                    AppEvent::Tick
                };

                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, stop, task }
    }

    /// Get the next event
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    /// Stop reading and wait for the reader to let go of stdin
    pub async fn shutdown(self) {
        self.stop.store(true, Ordering::Relaxed);
        drop(self.rx);
        let _ = self.task.await;
    }
}

/// Decode a key press for the given mode
pub fn key_to_input(key: KeyEvent, mode: &Mode) -> Option<InputEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(InputEvent::Quit);
    }

    match mode {
        // Any key leaves the help overlay
        Mode::Help { .. } => Some(InputEvent::Other),
        Mode::Filtering => filtering_input(key),
        Mode::ConfirmingExit { .. } => Some(match key.code {
            KeyCode::F(1) => InputEvent::Help,
            KeyCode::Char(c) => InputEvent::Char(c),
            _ => InputEvent::Other,
        }),
        Mode::Browsing => Some(browsing_input(key)),
    }
}

/// Keys while browsing the list
fn browsing_input(key: KeyEvent) -> InputEvent {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('d') if ctrl => InputEvent::Quit,
        KeyCode::Char('a') if ctrl => InputEvent::SelectAll,
        KeyCode::Char('q') | KeyCode::Esc => InputEvent::Quit,

        KeyCode::Char('/') => InputEvent::EnterFilter,
        KeyCode::Char('?') | KeyCode::F(1) => InputEvent::Help,
        KeyCode::Enter => InputEvent::Confirm,
        KeyCode::Backspace | KeyCode::Delete => InputEvent::Backspace,
        KeyCode::Char(c @ '0'..='9') => InputEvent::Digit(c as u8 - b'0'),
        KeyCode::Char(',') => InputEvent::Comma,

        // Navigation - vim style
        KeyCode::Char('k') | KeyCode::Up => InputEvent::Up,
        KeyCode::Char('j') | KeyCode::Down => InputEvent::Down,

        KeyCode::Char(' ') => InputEvent::ToggleSelect,
        KeyCode::Char('*') => InputEvent::SelectAll,
        KeyCode::Char(c) => InputEvent::Char(c),
        _ => InputEvent::Other,
    }
}

/// Keys while editing the filter
fn filtering_input(key: KeyEvent) -> Option<InputEvent> {
    match key.code {
        KeyCode::Esc => Some(InputEvent::ClearFilter),
        KeyCode::Enter => Some(InputEvent::Confirm),
        KeyCode::Backspace | KeyCode::Delete => Some(InputEvent::Backspace),
        KeyCode::F(1) => Some(InputEvent::Help),

        // Allow navigation while filtering
        KeyCode::Up => Some(InputEvent::Up),
        KeyCode::Down => Some(InputEvent::Down),

        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(InputEvent::Char(c))
        }
        _ => None,
    }
}

/// Terminal management
pub struct Terminal {
    /// The terminal backend
    pub backend: ratatui::Terminal<ratatui::backend::CrosstermBackend<Stdout>>,
}

impl Terminal {
    /// Create and initialize a new terminal
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableBracketedPaste)?;

        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let terminal = ratatui::Terminal::new(backend)?;

        Ok(Self { backend: terminal })
    }

    /// Restore terminal to original state
    pub fn restore(&mut self) -> Result<()> {
        disable_raw_mode()?;
        self.backend.backend_mut().execute(DisableBracketedPaste)?;
        self.backend.backend_mut().execute(LeaveAlternateScreen)?;
        self.backend.show_cursor()?;
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

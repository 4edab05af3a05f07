//! Application loop
//!
//! Wires terminal events into the selection engine and its views into the
//! renderer. Runs until the engine finalizes a selection.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::engine::{Engine, EngineOptions, InputEvent, Step, View};
use crate::event::{key_to_input, AppEvent, EventConfig, EventHandler, Terminal};
use crate::status::StatusLine;
use crate::ui::{self, Theme};

/// Main application state
pub struct App {
    engine: Engine,
    view: View,
    theme: Theme,
    status: StatusLine,
    /// Window size fixed by configuration; follows the terminal otherwise
    fixed_rows: Option<usize>,
    tick_rate_ms: u64,
}

impl App {
    /// Create a picker over `hosts`
    pub fn new(hosts: Vec<String>, settings: &Settings) -> Self {
        let fixed_rows = settings.ui.rows.filter(|&rows| rows > 0);
        let engine = Engine::new(
            hosts,
            EngineOptions {
                selection: settings.ui.selection,
                confirm: settings.ui.confirm,
                capacity: fixed_rows,
            },
        );
        let view = engine.view();

        Self {
            engine,
            view,
            theme: Theme::by_name(&settings.ui.theme),
            status: StatusLine::new(Duration::from_millis(settings.ui.status_timeout_ms)),
            fixed_rows,
            tick_rate_ms: settings.ui.tick_rate_ms,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    /// Run the picker; returns the chosen hosts, empty when the operator quit
    pub async fn run(&mut self) -> Result<Vec<String>> {
        let mut terminal = Terminal::new().context("Failed to initialize terminal")?;
        let mut events = EventHandler::new(EventConfig {
            tick_rate_ms: self.tick_rate_ms,
        });

        let result = self.event_loop(&mut terminal, &mut events).await;

        // Stop reading stdin before a session inherits it
        events.shutdown().await;
        terminal.restore()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal,
        events: &mut EventHandler,
    ) -> Result<Vec<String>> {
        if self.fixed_rows.is_none() {
            let size = terminal.backend.size()?;
            self.resize(size.height);
        }
        self.status
            .post(format!("loaded {} hosts", self.engine.hosts().len()));

        loop {
            let status = self.status.current();
            terminal.backend.draw(|frame| {
                ui::draw(frame, &self.view, &self.theme, status.as_deref());
            })?;

            let Some(event) = events.next().await else {
                debug!("event stream closed");
                return Ok(Vec::new());
            };

            if let Some(targets) = self.apply(event) {
                return Ok(targets);
            }
        }
    }

    /// Apply one terminal event; `Some` once the selection is final
    pub fn apply(&mut self, event: AppEvent) -> Option<Vec<String>> {
        let input = match event {
            AppEvent::Key(key) => key_to_input(key, self.engine.mode())?,
            AppEvent::Paste(text) => InputEvent::Paste(text),
            AppEvent::Resize(_, height) => {
                self.resize(height);
                return None;
            }
            AppEvent::Tick => return None,
            AppEvent::Error(e) => {
                warn!(error = %e, "terminal event error");
                self.status.post(format!("input error: {}", e));
                return None;
            }
        };

        let before = self.view.selected;
        match self.engine.handle(input) {
            Step::Render(view) => {
                if view.selected != before {
                    self.status.post(format!("{} selected", view.selected));
                }
                self.view = view;
                None
            }
            Step::Finalized(targets) => {
                debug!(count = targets.len(), "selection finalized");
                Some(targets)
            }
        }
    }

    /// Follow the terminal height unless the window size is fixed
    fn resize(&mut self, height: u16) {
        if self.fixed_rows.is_none() {
            self.engine.set_capacity(Some(ui::list_capacity(height)));
            self.view = self.engine.view();
        }
    }
}

//! Interactive host selection engine
//!
//! Owns the full host list, the filter, the scroll window, the pending
//! selection and the input mode. Every keystroke goes through
//! [`Engine::handle`], which either asks for a redraw or finalizes the list
//! of chosen hosts. Nothing in here performs I/O.

pub mod filter;
pub mod selection;
pub mod window;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use filter::FilterPredicate;
pub use selection::SelectionAccumulator;
pub use window::ScrollWindow;

use filter::is_filter_char;
use selection::parse_index;

/// One host from the inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    /// Canonical host name
    pub name: String,
    /// Position in the full list, stable for the session
    pub index: usize,
    /// Toggle-select flag
    pub selected: bool,
}

/// How hosts get picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Typed row numbers, comma separated for several hosts
    #[default]
    Index,
    /// Per-row flags toggled with the cursor
    Toggle,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Index => write!(f, "index"),
            SelectionMode::Toggle => write!(f, "toggle"),
        }
    }
}

/// Engine behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineOptions {
    pub selection: SelectionMode,
    /// Ask "really connect?" before finalizing
    pub confirm: bool,
    /// Maximum rows in the visible window (`None` = unbounded)
    pub capacity: Option<usize>,
}

/// Current input mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Moving around and typing row numbers
    Browsing,
    /// Editing the filter
    Filtering,
    /// Waiting for `y` before connecting
    ConfirmingExit { targets: Vec<String> },
    /// Help overlay on top of the previous mode
    Help { previous: Box<Mode> },
}

impl Mode {
    /// The mode underneath any help overlay
    pub fn base(&self) -> &Mode {
        match self {
            Mode::Help { previous } => previous.base(),
            other => other,
        }
    }
}

/// Abstract input, already decoded from raw key events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    EnterFilter,
    Help,
    Confirm,
    Backspace,
    /// A digit `0..=9`
    Digit(u8),
    Comma,
    Char(char),
    Up,
    Down,
    ToggleSelect,
    SelectAll,
    ClearFilter,
    Paste(String),
    /// Any key with no binding in the current mode
    Other,
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// State changed (or not); redraw with this view
    Render(View),
    /// Selection is over; an empty list means the operator cancelled
    Finalized(Vec<String>),
}

/// One numbered row in the visible window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// One-based number to type for this row
    pub number: usize,
    pub name: String,
    pub selected: bool,
}

/// Everything the renderer needs for the next frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub mode: Mode,
    pub selection: SelectionMode,
    pub rows: Vec<Row>,
    /// Highlighted row, `None` when nothing is visible
    pub cursor: Option<usize>,
    pub filter: String,
    /// Typed entry so far, e.g. `web1, 3`
    pub entry: String,
    /// Hosts passing the filter
    pub matched: usize,
    pub total: usize,
    pub selected: usize,
    pub more_above: bool,
    pub more_below: bool,
}

/// Selection engine state
#[derive(Debug, Clone)]
pub struct Engine {
    hosts: Vec<HostRecord>,
    filter: FilterPredicate,
    /// Indices into `hosts` passing the filter, in host order
    matched: Vec<usize>,
    window: ScrollWindow,
    accumulator: SelectionAccumulator,
    mode: Mode,
    options: EngineOptions,
}

impl Engine {
    /// Create an engine over `names`; empty names are skipped
    pub fn new<I, S>(names: I, options: EngineOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let hosts: Vec<HostRecord> = names
            .into_iter()
            .map(Into::<String>::into)
            .filter(|name| !name.is_empty())
            .enumerate()
            .map(|(index, name)| HostRecord {
                name,
                index,
                selected: false,
            })
            .collect();

        let matched = (0..hosts.len()).collect();

        Self {
            hosts,
            filter: FilterPredicate::default(),
            matched,
            window: ScrollWindow::new(options.capacity),
            accumulator: SelectionAccumulator::default(),
            mode: Mode::Browsing,
            options,
        }
    }

    pub fn hosts(&self) -> &[HostRecord] {
        &self.hosts
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn filter(&self) -> &FilterPredicate {
        &self.filter
    }

    pub fn accumulator(&self) -> &SelectionAccumulator {
        &self.accumulator
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The records currently shown, in display order
    pub fn visible(&self) -> Vec<&HostRecord> {
        self.matched[self.window.range(self.matched.len())]
            .iter()
            .map(|&i| &self.hosts[i])
            .collect()
    }

    pub fn visible_names(&self) -> Vec<String> {
        self.visible().into_iter().map(|h| h.name.clone()).collect()
    }

    /// Highlighted row within the visible window
    pub fn cursor(&self) -> Option<usize> {
        if self.window.range(self.matched.len()).is_empty() {
            None
        } else {
            Some(self.window.cursor())
        }
    }

    pub fn selected_count(&self) -> usize {
        self.hosts.iter().filter(|h| h.selected).count()
    }

    /// Change the window size, e.g. after a terminal resize
    pub fn set_capacity(&mut self, capacity: Option<usize>) {
        self.options.capacity = capacity;
        self.window.set_capacity(capacity, self.matched.len());
    }

    /// Apply one input event
    pub fn handle(&mut self, event: InputEvent) -> Step {
        match self.transition(event) {
            Some(targets) => Step::Finalized(targets),
            None => Step::Render(self.view()),
        }
    }

    /// Snapshot for rendering
    pub fn view(&self) -> View {
        let rows = self
            .visible()
            .into_iter()
            .enumerate()
            .map(|(i, host)| Row {
                number: i + 1,
                name: host.name.clone(),
                selected: host.selected,
            })
            .collect();

        View {
            mode: self.mode.clone(),
            selection: self.options.selection,
            rows,
            cursor: self.cursor(),
            filter: self.filter.to_string(),
            entry: self.accumulator.to_string(),
            matched: self.matched.len(),
            total: self.hosts.len(),
            selected: self.selected_count(),
            more_above: self.window.more_above(),
            more_below: self.window.more_below(self.matched.len()),
        }
    }

    fn transition(&mut self, event: InputEvent) -> Option<Vec<String>> {
        if let Mode::Help { previous } = &self.mode {
            self.mode = (**previous).clone();
            return None;
        }

        match event {
            InputEvent::Paste(text) => self.paste(&text),
            InputEvent::Help => {
                let previous = std::mem::replace(&mut self.mode, Mode::Browsing);
                self.mode = Mode::Help {
                    previous: Box::new(previous),
                };
                None
            }
            event => match self.mode {
                Mode::Browsing => self.browse(event),
                Mode::Filtering => self.edit_filter(event),
                Mode::ConfirmingExit { .. } => self.answer_confirm(event),
                Mode::Help { .. } => None,
            },
        }
    }

    fn paste(&mut self, text: &str) -> Option<Vec<String>> {
        for c in text.chars() {
            let event = match (&self.mode, c) {
                (_, '\n' | '\r') => continue,
                (Mode::Browsing, ',') => InputEvent::Comma,
                (Mode::Browsing, c) if c.is_ascii_digit() => InputEvent::Digit(c as u8 - b'0'),
                (Mode::Filtering, c) => InputEvent::Char(c),
                _ => continue,
            };
            if let Some(targets) = self.transition(event) {
                return Some(targets);
            }
        }
        None
    }

    fn browse(&mut self, event: InputEvent) -> Option<Vec<String>> {
        match event {
            InputEvent::Quit => {
                self.accumulator.reset();
                return Some(Vec::new());
            }
            InputEvent::SelectAll => return Some(self.visible_names()),
            InputEvent::Confirm => return self.confirm(),
            InputEvent::EnterFilter => self.mode = Mode::Filtering,
            InputEvent::Digit(d) => {
                if let Some(c) = char::from_digit(u32::from(d), 10) {
                    self.accumulator.push_digit(c);
                }
            }
            InputEvent::Comma => {
                if self.commit_entry() && self.options.selection == SelectionMode::Index {
                    self.accumulator.open_slot();
                }
            }
            InputEvent::Backspace => self.clear_pending_entry(),
            InputEvent::Up => self.window.up(),
            InputEvent::Down => self.window.down(self.matched.len()),
            InputEvent::ToggleSelect if self.options.selection == SelectionMode::Toggle => {
                if let Some(index) = self.cursor_host() {
                    let host = &mut self.hosts[index];
                    host.selected = !host.selected;
                }
            }
            InputEvent::ClearFilter => {
                self.filter.clear();
                self.refilter();
            }
            _ => {
                self.commit_entry();
            }
        }
        None
    }

    fn edit_filter(&mut self, event: InputEvent) -> Option<Vec<String>> {
        match event {
            InputEvent::Quit => {
                self.accumulator.reset();
                return Some(Vec::new());
            }
            InputEvent::SelectAll => return Some(self.visible_names()),
            InputEvent::Confirm => self.mode = Mode::Browsing,
            InputEvent::ClearFilter => {
                self.filter.clear();
                self.refilter();
                self.mode = Mode::Browsing;
            }
            InputEvent::Backspace => {
                self.filter.backspace();
                self.refilter();
            }
            InputEvent::Comma => {
                self.filter.open_term();
                self.refilter();
            }
            InputEvent::Digit(d) => {
                if let Some(c) = char::from_digit(u32::from(d), 10) {
                    self.filter.push_char(c);
                    self.refilter();
                }
            }
            InputEvent::Char(',') => {
                self.filter.open_term();
                self.refilter();
            }
            InputEvent::Char(c) if is_filter_char(c) => {
                self.filter.push_char(c);
                self.refilter();
            }
            InputEvent::Up => self.window.up(),
            InputEvent::Down => self.window.down(self.matched.len()),
            _ => {}
        }
        None
    }

    fn answer_confirm(&mut self, event: InputEvent) -> Option<Vec<String>> {
        if let InputEvent::Char('y' | 'Y') = event {
            if let Mode::ConfirmingExit { targets } = std::mem::replace(&mut self.mode, Mode::Browsing)
            {
                return Some(targets);
            }
            return None;
        }

        self.mode = Mode::Browsing;
        self.accumulator.reset();
        for host in &mut self.hosts {
            host.selected = false;
        }
        None
    }

    fn confirm(&mut self) -> Option<Vec<String>> {
        if !self.commit_entry() {
            return None;
        }

        let targets = self.pending_targets();
        if targets.is_empty() {
            return None;
        }

        if self.options.confirm {
            self.mode = Mode::ConfirmingExit { targets };
            None
        } else {
            Some(targets)
        }
    }

    /// Resolve typed digits against the window as it is right now.
    ///
    /// Returns false when digits were typed but name no visible row; the
    /// digits are then left in place for correction.
    fn commit_entry(&mut self) -> bool {
        if self.accumulator.buffer().is_empty() {
            return true;
        }

        let range = self.window.range(self.matched.len());
        let Some(row) = parse_index(self.accumulator.buffer(), range.len()) else {
            return false;
        };
        let index = self.matched[range.start + row];

        match self.options.selection {
            SelectionMode::Index => {
                let name = self.hosts[index].name.clone();
                self.accumulator.resolve(name);
            }
            SelectionMode::Toggle => {
                self.hosts[index].selected = true;
                self.accumulator.clear_buffer();
            }
        }
        true
    }

    fn clear_pending_entry(&mut self) {
        match self.options.selection {
            SelectionMode::Index => self.accumulator.clear_pending(),
            SelectionMode::Toggle => {
                if !self.accumulator.buffer().is_empty() {
                    self.accumulator.clear_buffer();
                } else if let Some(index) = self.cursor_host() {
                    self.hosts[index].selected = false;
                }
            }
        }
    }

    fn pending_targets(&self) -> Vec<String> {
        let chosen = match self.options.selection {
            SelectionMode::Index => self.accumulator.targets(),
            SelectionMode::Toggle => self
                .hosts
                .iter()
                .filter(|h| h.selected)
                .map(|h| h.name.clone())
                .collect(),
        };

        if chosen.is_empty() {
            self.cursor_host()
                .map(|i| vec![self.hosts[i].name.clone()])
                .unwrap_or_default()
        } else {
            chosen
        }
    }

    /// Index into `hosts` of the highlighted row
    fn cursor_host(&self) -> Option<usize> {
        let range = self.window.range(self.matched.len());
        let cursor = self.cursor()?;
        self.matched.get(range.start + cursor).copied()
    }

    fn refilter(&mut self) {
        self.matched = self
            .hosts
            .iter()
            .filter(|h| self.filter.matches(&h.name))
            .map(|h| h.index)
            .collect();
        self.window.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn engine(names: &[&str]) -> Engine {
        Engine::new(names.iter().copied(), EngineOptions::default())
    }

    fn feed(engine: &mut Engine, events: impl IntoIterator<Item = InputEvent>) -> Option<Step> {
        let mut last = None;
        for event in events {
            let step = engine.handle(event);
            if let Step::Finalized(_) = step {
                return Some(step);
            }
            last = Some(step);
        }
        last
    }

    fn typed(text: &str) -> Vec<InputEvent> {
        text.chars()
            .map(|c| match c {
                '0'..='9' => InputEvent::Digit(c as u8 - b'0'),
                ',' => InputEvent::Comma,
                c => InputEvent::Char(c),
            })
            .collect()
    }

    fn finalized(step: Option<Step>) -> Vec<String> {
        match step {
            Some(Step::Finalized(targets)) => targets,
            other => panic!("expected finalized selection, got {other:?}"),
        }
    }

    #[test]
    fn test_starts_browsing_with_everything_visible() {
        let engine = engine(&["web1", "web2", "db1"]);
        assert_eq!(engine.mode(), &Mode::Browsing);
        assert_eq!(engine.visible_names(), vec!["web1", "web2", "db1"]);
        assert_eq!(engine.cursor(), Some(0));
    }

    #[test]
    fn test_empty_names_are_skipped() {
        let engine = engine(&["web1", "", "db1"]);
        let indices: Vec<usize> = engine.hosts().iter().map(|h| h.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_scenario_filter_then_index() {
        let mut engine = engine(&["web1", "web2", "db1"]);
        let mut events = vec![InputEvent::EnterFilter];
        events.extend(typed("web"));
        events.push(InputEvent::Confirm);
        feed(&mut engine, events);

        assert_eq!(engine.mode(), &Mode::Browsing);
        assert_eq!(engine.visible_names(), vec!["web1", "web2"]);

        let step = feed(&mut engine, [InputEvent::Digit(2), InputEvent::Confirm]);
        assert_eq!(finalized(step), vec!["web2"]);
    }

    #[test]
    fn test_scenario_select_all_without_filter() {
        let mut engine = engine(&["web1", "web2", "db1"]);
        let step = feed(&mut engine, [InputEvent::SelectAll]);
        assert_eq!(finalized(step), vec!["web1", "web2", "db1"]);
    }

    #[test]
    fn test_scenario_comma_entry_keeps_order() {
        let mut engine = engine(&["web1", "web2", "db1"]);
        let mut events = typed("1,2");
        events.push(InputEvent::Confirm);
        assert_eq!(finalized(feed(&mut engine, events)), vec!["web1", "web2"]);
    }

    #[test]
    fn test_multi_index_uses_entry_order() {
        let mut engine = engine(&["h1", "h2", "h3", "h4", "h5"]);
        let mut events = typed("5,1,3");
        events.push(InputEvent::Confirm);
        assert_eq!(finalized(feed(&mut engine, events)), vec!["h5", "h1", "h3"]);
    }

    #[test]
    fn test_index_resolves_against_current_filter() {
        let mut engine = engine(&["a1", "b1c", "bc2", "d"]);
        let mut events = vec![InputEvent::EnterFilter];
        events.extend(typed("b,c"));
        events.push(InputEvent::Confirm);
        feed(&mut engine, events);
        assert_eq!(engine.visible_names(), vec!["b1c", "bc2"]);

        let step = feed(&mut engine, [InputEvent::Digit(2), InputEvent::Confirm]);
        assert_eq!(finalized(step), vec!["bc2"]);
    }

    #[test]
    fn test_digits_typed_before_filter_change_are_revalidated() {
        let mut engine = engine(&["web1", "web2", "db1"]);
        feed(&mut engine, [InputEvent::Digit(3), InputEvent::EnterFilter]);
        feed(&mut engine, typed("web"));
        feed(&mut engine, [InputEvent::Confirm]);

        // 3 named db1 before the filter; now only two rows exist
        let step = engine.handle(InputEvent::Confirm);
        assert!(matches!(step, Step::Render(_)));
        assert_eq!(engine.accumulator().buffer(), "3");
    }

    #[test]
    fn test_zero_and_out_of_range_are_ignored() {
        for digits in ["0", "4", "10"] {
            let mut engine = engine(&["web1", "web2", "db1"]);
            let mut events = typed(digits);
            events.push(InputEvent::Confirm);
            let step = feed(&mut engine, events);

            assert!(matches!(step, Some(Step::Render(_))), "{digits} finalized");
            assert_eq!(engine.mode(), &Mode::Browsing);
            assert_eq!(engine.accumulator().buffer(), digits);
            assert!(engine.accumulator().targets().is_empty());
        }
    }

    #[test]
    fn test_empty_window_rejects_everything() {
        let mut engine = engine(&[]);
        let step = feed(&mut engine, [InputEvent::Digit(1), InputEvent::Confirm]);
        assert!(matches!(step, Some(Step::Render(_))));
        assert_eq!(engine.cursor(), None);

        let step = engine.handle(InputEvent::Backspace);
        assert!(matches!(step, Step::Render(_)));
        assert!(matches!(engine.handle(InputEvent::Confirm), Step::Render(_)));
    }

    #[test]
    fn test_confirm_without_entry_uses_cursor() {
        let mut engine = engine(&["web1", "web2", "db1"]);
        let step = feed(&mut engine, [InputEvent::Down, InputEvent::Down, InputEvent::Confirm]);
        assert_eq!(finalized(step), vec!["db1"]);
    }

    #[test]
    fn test_quit_discards_pending_selection() {
        let mut engine = engine(&["web1", "web2", "db1"]);
        let mut events = typed("1,2");
        events.push(InputEvent::Quit);
        assert!(finalized(feed(&mut engine, events)).is_empty());
    }

    #[test]
    fn test_select_all_ignores_digit_buffer() {
        let mut engine = engine(&["web1", "web2", "db1"]);
        let step = feed(
            &mut engine,
            [InputEvent::Digit(9), InputEvent::Digit(1), InputEvent::SelectAll],
        );
        assert_eq!(finalized(step), vec!["web1", "web2", "db1"]);
    }

    #[test]
    fn test_select_all_takes_only_the_window() {
        let options = EngineOptions {
            capacity: Some(2),
            ..EngineOptions::default()
        };
        let mut engine = Engine::new(["a", "b", "c", "d"], options);
        let step = feed(&mut engine, [InputEvent::Down, InputEvent::Down, InputEvent::SelectAll]);
        assert_eq!(finalized(step), vec!["b", "c"]);
    }

    #[test]
    fn test_backspace_clears_buffer_and_last_target() {
        let mut engine = engine(&["web1", "web2", "db1"]);
        feed(&mut engine, typed("1,3"));
        engine.handle(InputEvent::Backspace);
        assert_eq!(engine.accumulator().buffer(), "");
        assert_eq!(engine.accumulator().targets(), vec!["web1"]);

        let mut events = typed("2");
        events.push(InputEvent::Confirm);
        assert_eq!(finalized(feed(&mut engine, events)), vec!["web1", "web2"]);
    }

    #[test]
    fn test_unbound_key_resolves_entry() {
        let mut engine = engine(&["web1", "web2", "db1"]);
        feed(&mut engine, [InputEvent::Digit(2), InputEvent::Other]);
        assert_eq!(engine.accumulator().buffer(), "");
        assert_eq!(engine.accumulator().targets(), vec!["web2"]);

        // A fresh number overwrites the pending target
        feed(&mut engine, [InputEvent::Digit(3), InputEvent::Char('x')]);
        assert_eq!(engine.accumulator().targets(), vec!["db1"]);
    }

    #[test]
    fn test_filter_backspace_and_clear() {
        let mut engine = engine(&["web1", "web2", "db1"]);
        engine.handle(InputEvent::EnterFilter);
        feed(&mut engine, typed("web,2"));
        assert_eq!(engine.visible_names(), vec!["web2"]);

        engine.handle(InputEvent::Backspace);
        assert_eq!(engine.filter().to_string(), "web");
        assert_eq!(engine.visible_names(), vec!["web1", "web2"]);

        engine.handle(InputEvent::ClearFilter);
        assert_eq!(engine.mode(), &Mode::Browsing);
        assert!(engine.filter().is_empty());
        assert_eq!(engine.visible().len(), 3);
    }

    #[test]
    fn test_filter_rejects_disallowed_chars() {
        let mut engine = engine(&["web1", "web2", "db1"]);
        engine.handle(InputEvent::EnterFilter);
        feed(&mut engine, typed("w e/b*"));
        assert_eq!(engine.filter().to_string(), "web");
    }

    #[test]
    fn test_filter_is_kept_when_leaving_filter_mode() {
        let mut engine = engine(&["web1", "web2", "db1"]);
        engine.handle(InputEvent::EnterFilter);
        feed(&mut engine, typed("db"));
        engine.handle(InputEvent::Confirm);
        assert_eq!(engine.mode(), &Mode::Browsing);
        assert_eq!(engine.filter().to_string(), "db");
        assert_eq!(engine.visible_names(), vec!["db1"]);
    }

    #[test]
    fn test_filter_change_resets_scroll() {
        let options = EngineOptions {
            capacity: Some(2),
            ..EngineOptions::default()
        };
        let mut engine = Engine::new(["a1", "a2", "a3", "a4"], options);
        feed(&mut engine, [InputEvent::Down, InputEvent::Down, InputEvent::Down]);
        assert_eq!(engine.visible_names(), vec!["a3", "a4"]);

        engine.handle(InputEvent::EnterFilter);
        engine.handle(InputEvent::Char('a'));
        assert_eq!(engine.visible_names(), vec!["a1", "a2"]);
        assert_eq!(engine.cursor(), Some(0));
    }

    #[test]
    fn test_scroll_markers() {
        let options = EngineOptions {
            capacity: Some(2),
            ..EngineOptions::default()
        };
        let mut engine = Engine::new(["a", "b", "c"], options);
        let view = engine.view();
        assert!(!view.more_above);
        assert!(view.more_below);

        let Step::Render(view) = feed(&mut engine, [InputEvent::Down, InputEvent::Down]).unwrap()
        else {
            panic!("expected render");
        };
        assert!(view.more_above);
        assert!(!view.more_below);
        assert_eq!(view.rows[0].number, 1);
        assert_eq!(view.rows[0].name, "b");
    }

    #[test]
    fn test_index_counts_from_top_of_window() {
        let options = EngineOptions {
            capacity: Some(2),
            ..EngineOptions::default()
        };
        let mut engine = Engine::new(["a", "b", "c"], options);
        let step = feed(
            &mut engine,
            [InputEvent::Down, InputEvent::Down, InputEvent::Digit(2), InputEvent::Confirm],
        );
        assert_eq!(finalized(step), vec!["c"]);
    }

    #[test]
    fn test_confirming_exit_accepts_only_y() {
        let options = EngineOptions {
            confirm: true,
            ..EngineOptions::default()
        };
        let mut engine = Engine::new(["web1", "web2"], options);
        feed(&mut engine, [InputEvent::Digit(2), InputEvent::Confirm]);
        assert_eq!(
            engine.mode(),
            &Mode::ConfirmingExit {
                targets: vec!["web2".to_string()]
            }
        );

        engine.handle(InputEvent::Char('n'));
        assert_eq!(engine.mode(), &Mode::Browsing);
        assert!(engine.accumulator().is_empty());

        let step = feed(
            &mut engine,
            [InputEvent::Digit(1), InputEvent::Confirm, InputEvent::Char('y')],
        );
        assert_eq!(finalized(step), vec!["web1"]);
    }

    #[test]
    fn test_confirm_key_does_not_accept_confirmation() {
        let options = EngineOptions {
            confirm: true,
            ..EngineOptions::default()
        };
        let mut engine = Engine::new(["web1"], options);
        feed(&mut engine, [InputEvent::Confirm]);
        assert!(matches!(engine.mode(), Mode::ConfirmingExit { .. }));
        assert!(matches!(engine.handle(InputEvent::Confirm), Step::Render(_)));
        assert_eq!(engine.mode(), &Mode::Browsing);
    }

    #[test]
    fn test_help_returns_to_previous_mode_untouched() {
        let mut engine = engine(&["web1", "web2", "db1"]);
        engine.handle(InputEvent::EnterFilter);
        feed(&mut engine, typed("web"));

        engine.handle(InputEvent::Help);
        assert_eq!(engine.mode().base(), &Mode::Filtering);

        // The dismissing key is swallowed
        engine.handle(InputEvent::Char('x'));
        assert_eq!(engine.mode(), &Mode::Filtering);
        assert_eq!(engine.filter().to_string(), "web");
    }

    #[test]
    fn test_help_over_confirm_prompt_keeps_it() {
        let options = EngineOptions {
            confirm: true,
            ..EngineOptions::default()
        };
        let mut engine = Engine::new(["web1", "web2"], options);
        feed(&mut engine, [InputEvent::Digit(2), InputEvent::Confirm]);

        engine.handle(InputEvent::Help);
        engine.handle(InputEvent::Other);
        assert_eq!(
            engine.mode(),
            &Mode::ConfirmingExit {
                targets: vec!["web2".to_string()]
            }
        );
        assert_eq!(finalized(feed(&mut engine, [InputEvent::Char('y')])), vec!["web2"]);
    }

    #[test]
    fn test_help_swallows_quit() {
        let mut engine = engine(&["web1"]);
        engine.handle(InputEvent::Help);
        assert!(matches!(engine.handle(InputEvent::Quit), Step::Render(_)));
        assert_eq!(engine.mode(), &Mode::Browsing);
    }

    #[test]
    fn test_toggle_selection() {
        let options = EngineOptions {
            selection: SelectionMode::Toggle,
            ..EngineOptions::default()
        };
        let mut engine = Engine::new(["web1", "web2", "db1"], options);
        feed(
            &mut engine,
            [
                InputEvent::Down,
                InputEvent::Down,
                InputEvent::ToggleSelect,
                InputEvent::Up,
                InputEvent::Up,
                InputEvent::ToggleSelect,
            ],
        );
        assert_eq!(engine.selected_count(), 2);

        // Toggle mode reports hosts in list order
        assert_eq!(
            finalized(feed(&mut engine, [InputEvent::Confirm])),
            vec!["web1", "db1"]
        );
    }

    #[test]
    fn test_toggle_mode_digits_mark_rows() {
        let options = EngineOptions {
            selection: SelectionMode::Toggle,
            ..EngineOptions::default()
        };
        let mut engine = Engine::new(["web1", "web2", "db1"], options);
        let mut events = typed("3,2");
        events.push(InputEvent::Confirm);
        assert_eq!(finalized(feed(&mut engine, events)), vec!["web2", "db1"]);
    }

    #[test]
    fn test_toggle_mode_backspace_unmarks_cursor_row() {
        let options = EngineOptions {
            selection: SelectionMode::Toggle,
            ..EngineOptions::default()
        };
        let mut engine = Engine::new(["web1", "web2"], options);
        feed(&mut engine, [InputEvent::ToggleSelect, InputEvent::Backspace]);
        assert_eq!(engine.selected_count(), 0);
    }

    #[test]
    fn test_toggle_key_ignored_in_index_mode() {
        let mut engine = engine(&["web1", "web2"]);
        engine.handle(InputEvent::ToggleSelect);
        assert_eq!(engine.selected_count(), 0);
    }

    #[test]
    fn test_paste_feeds_characters() {
        let mut engine = engine(&["web1", "web2", "db1"]);
        engine.handle(InputEvent::EnterFilter);
        engine.handle(InputEvent::Paste("db\n".to_string()));
        assert_eq!(engine.filter().to_string(), "db");
        engine.handle(InputEvent::Confirm);

        engine.handle(InputEvent::ClearFilter);
        engine.handle(InputEvent::Paste("3,1".to_string()));
        let step = engine.handle(InputEvent::Confirm);
        assert_eq!(finalized(Some(step)), vec!["db1", "web1"]);
    }

    #[test]
    fn test_capacity_change_keeps_cursor_in_window() {
        let mut engine = engine(&["a", "b", "c", "d"]);
        feed(&mut engine, [InputEvent::Down, InputEvent::Down, InputEvent::Down]);
        engine.set_capacity(Some(2));
        assert_eq!(engine.visible().len(), 2);
        assert!(engine.cursor().is_some_and(|c| c < 2));
    }

    fn highlighted(engine: &Engine) -> Option<String> {
        let view = engine.view();
        view.cursor.map(|c| view.rows[c].name.clone())
    }

    #[test]
    fn test_growing_window_keeps_highlighted_host() {
        let options = EngineOptions {
            capacity: Some(2),
            ..EngineOptions::default()
        };
        let mut engine = Engine::new(["a", "b", "c", "d", "e", "f"], options);
        feed(&mut engine, std::iter::repeat(InputEvent::Down).take(5));
        assert_eq!(highlighted(&engine).as_deref(), Some("f"));

        engine.set_capacity(Some(5));
        assert_eq!(highlighted(&engine).as_deref(), Some("f"));
        assert_eq!(finalized(feed(&mut engine, [InputEvent::Confirm])), vec!["f"]);
    }

    #[test]
    fn test_shrinking_window_keeps_highlighted_host() {
        let mut engine = engine(&["a", "b", "c", "d", "e"]);
        feed(&mut engine, std::iter::repeat(InputEvent::Down).take(4));
        assert_eq!(highlighted(&engine).as_deref(), Some("e"));

        engine.set_capacity(Some(2));
        assert_eq!(engine.visible_names(), vec!["d", "e"]);
        assert_eq!(highlighted(&engine).as_deref(), Some("e"));
    }

    proptest! {
        #[test]
        fn prop_typed_filter_shows_hosts_matching_every_term(
            names in proptest::collection::vec("[a-c0-2]{1,5}", 0..12),
            terms in proptest::collection::vec("[a-c0-2]{1,2}", 1..4),
        ) {
            let mut engine = Engine::new(names.clone(), EngineOptions::default());
            engine.handle(InputEvent::EnterFilter);
            feed(&mut engine, typed(&terms.join(",")));

            let expected: Vec<String> = names
                .into_iter()
                .filter(|name| terms.iter().all(|term| name.contains(term.as_str())))
                .collect();
            prop_assert_eq!(engine.visible_names(), expected);
        }
    }

    #[test]
    fn test_view_reports_entry_and_counts() {
        let mut engine = engine(&["web1", "web2", "db1"]);
        feed(&mut engine, typed("1,2"));
        let view = engine.view();
        assert_eq!(view.entry, "web1, 2");
        assert_eq!(view.total, 3);
        assert_eq!(view.matched, 3);
        assert_eq!(view.cursor, Some(0));
        assert_eq!(view.rows.len(), 3);
    }
}

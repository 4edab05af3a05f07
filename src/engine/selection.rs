//! Numeric index entry and the multi-host target accumulator

use std::fmt;

/// Parse a typed one-based row number against the current visible row count.
///
/// Returns the zero-based row, or `None` for anything unparseable, zero, or
/// past the last visible row.
pub fn parse_index(buffer: &str, visible: usize) -> Option<usize> {
    let n: usize = buffer.parse().ok()?;
    if (1..=visible).contains(&n) {
        Some(n - 1)
    } else {
        None
    }
}

/// Hosts chosen by typed index, one slot per comma-separated entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionAccumulator {
    slots: Vec<Option<String>>,
    buffer: String,
}

impl Default for SelectionAccumulator {
    fn default() -> Self {
        Self {
            slots: vec![None],
            buffer: String::new(),
        }
    }
}

impl SelectionAccumulator {
    /// Digits typed since the last resolution
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn push_digit(&mut self, digit: char) {
        self.buffer.push(digit);
    }

    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Store `name` in the last slot and clear the digit buffer
    pub fn resolve(&mut self, name: String) {
        self.buffer.clear();
        match self.slots.last_mut() {
            Some(slot) => *slot = Some(name),
            None => self.slots.push(Some(name)),
        }
    }

    /// Start a new slot if the current one already holds a target
    pub fn open_slot(&mut self) -> bool {
        if matches!(self.slots.last(), Some(Some(_))) {
            self.slots.push(None);
            true
        } else {
            false
        }
    }

    /// Drop the digit buffer and the last target.
    ///
    /// With nothing pending in the last slot, the slot itself is removed
    /// (undoing a comma) unless it is the only one.
    pub fn clear_pending(&mut self) {
        let last_pending = matches!(self.slots.last(), Some(Some(_)));
        if !self.buffer.is_empty() || last_pending {
            self.buffer.clear();
            if let Some(slot) = self.slots.last_mut() {
                *slot = None;
            }
        } else if self.slots.len() > 1 {
            self.slots.pop();
        }
    }

    /// Resolved targets in entry order
    pub fn targets(&self) -> Vec<String> {
        self.slots.iter().flatten().cloned().collect()
    }

    pub fn has_targets(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.slots.len() == 1 && !self.has_targets()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for SelectionAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.slots.len().saturating_sub(1);
        let parts: Vec<&str> = self
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                Some(name) if i < last || self.buffer.is_empty() => name.as_str(),
                _ if i == last => self.buffer.as_str(),
                _ => "",
            })
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

//! Fixed-capacity scroll window over the filtered host list

use std::ops::Range;

/// Scroll offset and cursor over a list of `len` items, showing at most
/// `capacity` of them at once.
///
/// The window moves one position at a time when the cursor runs off either
/// edge, never a full page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollWindow {
    offset: usize,
    cursor: usize,
    capacity: usize,
}

impl ScrollWindow {
    /// `None` means unbounded; a zero capacity is treated as one row
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            offset: 0,
            cursor: 0,
            capacity: capacity.unwrap_or(usize::MAX).max(1),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Cursor row relative to the top of the window
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Positions (into the filtered list) currently shown
    pub fn range(&self, len: usize) -> Range<usize> {
        let start = self.offset.min(len);
        let end = start.saturating_add(self.capacity).min(len);
        start..end
    }

    /// Something is scrolled off above the window. Positions count over the
    /// filtered list, not the full host list.
    pub fn more_above(&self) -> bool {
        self.offset > 0
    }

    /// Something is left below the window, relative to the filtered list
    pub fn more_below(&self, len: usize) -> bool {
        self.range(len).end < len
    }

    pub fn down(&mut self, len: usize) {
        let visible = self.range(len).len();
        if self.cursor + 1 < visible {
            self.cursor += 1;
        } else if self.more_below(len) {
            self.offset += 1;
        }
    }

    pub fn up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        } else if self.offset > 0 {
            self.offset -= 1;
        }
    }

    /// Back to the top, used whenever the underlying list changes
    pub fn reset(&mut self) {
        self.offset = 0;
        self.cursor = 0;
    }

    pub fn set_capacity(&mut self, capacity: Option<usize>, len: usize) {
        self.capacity = capacity.unwrap_or(usize::MAX).max(1);
        self.clamp(len);
    }

    /// Pull offset and cursor back inside a list of `len` items, keeping the
    /// highlighted position when it still exists
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.reset();
            return;
        }
        let position = (self.offset + self.cursor).min(len - 1);

        self.offset = self.offset.min(len.saturating_sub(self.capacity));
        if position >= self.offset.saturating_add(self.capacity) {
            self.offset = position + 1 - self.capacity;
        }
        self.cursor = position - self.offset;
    }
}

impl Default for ScrollWindow {
    fn default() -> Self {
        Self::new(None)
    }
}

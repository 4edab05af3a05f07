//! Multi-term substring filter
//!
//! A host stays visible only when its name contains every term.

use std::fmt;

/// Characters accepted while typing a filter term
pub fn is_filter_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ',')
}

/// Ordered list of substring terms, combined with logical AND
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPredicate {
    /// Always holds at least one (possibly empty) term; the last one is being edited
    terms: Vec<String>,
}

impl Default for FilterPredicate {
    fn default() -> Self {
        Self {
            terms: vec![String::new()],
        }
    }
}

impl FilterPredicate {
    /// Build a predicate from already-committed terms
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        if terms.is_empty() {
            Self::default()
        } else {
            Self { terms }
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// True when no term restricts anything
    pub fn is_empty(&self) -> bool {
        self.terms.iter().all(String::is_empty)
    }

    /// Whether `name` contains every term
    pub fn matches(&self, name: &str) -> bool {
        self.terms.iter().all(|term| name.contains(term.as_str()))
    }

    /// Append a character to the term being edited
    pub fn push_char(&mut self, c: char) {
        if let Some(term) = self.terms.last_mut() {
            term.push(c);
        }
    }

    /// Commit the current term and start a new empty one.
    ///
    /// Does nothing while the current term is still empty.
    pub fn open_term(&mut self) {
        if self.terms.last().is_some_and(|term| !term.is_empty()) {
            self.terms.push(String::new());
        }
    }

    /// Remove the last character of the current term.
    ///
    /// A term that is (or becomes) empty is dropped as long as another term
    /// remains; the only remaining term is emptied but kept.
    pub fn backspace(&mut self) {
        let Some(term) = self.terms.last_mut() else {
            self.terms.push(String::new());
            return;
        };

        let popped = term.pop();
        if (popped.is_none() || term.is_empty()) && self.terms.len() > 1 {
            self.terms.pop();
        }
    }

    /// Explicit clear: back to a single empty term
    pub fn clear(&mut self) {
        self.terms.clear();
        self.terms.push(String::new());
    }
}

impl fmt::Display for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.terms.join(","))
    }
}

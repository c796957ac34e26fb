//! Redaction of privately-marked note content
//!
//! A private section starts at an occurrence of the marker and ends at the
//! next occurrence of the same marker; both markers and everything between
//! them are removed. Markers pair strictly in order of appearance, so there
//! is no nesting. An unmatched trailing marker makes the rest of the note
//! private.
//!
//! The output never contains the marker: if removing a section splices
//! the surrounding text into a new marker, redaction runs again.

use crate::error::{RecapitanError, Result};
use crate::types::{JournalEntry, SanitizedEntry};

/// Marker used when settings do not override it
pub const DEFAULT_PRIVATE_MARKER: &str = ":::private";

/// Removes private sections from note text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivacyManager {
    marker: String,
}

impl PrivacyManager {
    /// Create a manager for `marker`; an empty marker is rejected
    pub fn new(marker: impl Into<String>) -> Result<Self> {
        let marker = marker.into();
        if marker.is_empty() {
            return Err(RecapitanError::Configuration(
                "private marker cannot be empty".to_string(),
            ));
        }
        Ok(Self { marker })
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Whether `text` contains at least one marker
    pub fn has_private_sections(&self, text: &str) -> bool {
        text.contains(self.marker.as_str())
    }

    /// Return `text` with every private section removed
    pub fn remove_private_sections(&self, text: &str) -> String {
        let mut redacted = text.to_string();
        while self.has_private_sections(&redacted) {
            redacted = self.strip_sections(&redacted);
        }
        redacted
    }

    /// Redacted copy of a journal entry
    pub fn sanitize(&self, entry: &JournalEntry) -> SanitizedEntry {
        SanitizedEntry {
            date: entry.date,
            content: self.remove_private_sections(&entry.content),
        }
    }

    /// Keep the public segments: those before an odd-numbered marker
    fn strip_sections(&self, text: &str) -> String {
        text.split(self.marker.as_str()).step_by(2).collect()
    }
}

impl Default for PrivacyManager {
    fn default() -> Self {
        Self {
            marker: DEFAULT_PRIVATE_MARKER.to_string(),
        }
    }
}

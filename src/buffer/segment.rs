//! Segment: The atomic rendering unit of typed text.
//!
//! A segment is a run of graphemes sharing one style. The host renderer
//! turns each segment into one styled element; the engine never renders.
//!
//! ```text
//! ┌──────────────┬──────────────┬──────┬──────────────┐
//! │ "Hello "     │ "world"      │ "\n" │ "again"      │
//! │ color: None  │ color: #f00  │ NL   │ color: None  │
//! └──────────────┴──────────────┴──────┴──────────────┘
//! ```

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Background (and optional foreground) applied over already-typed text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HighlightStyle {
    /// Background color, passed through to the host as-is (e.g. `"#ff0"`).
    pub background: String,
    /// Optional text color while highlighted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl HighlightStyle {
    /// Create a highlight with only a background color.
    pub fn new(background: impl Into<String>) -> Self {
        Self {
            background: background.into(),
            color: None,
        }
    }

    /// Set the text color used inside the highlight.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// A styled run of text.
///
/// Newline segments carry no text and stand for a single `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Segment {
    /// The text content of the run.
    pub text: String,
    /// Text color, `None` for the host default.
    pub color: Option<String>,
    /// Highlight applied to the run, if any.
    pub highlight: Option<HighlightStyle>,
    /// Whether this segment is a line break.
    pub is_new_line: bool,
}

impl Segment {
    /// Create a text segment.
    pub fn new(
        text: impl Into<String>,
        color: Option<String>,
        highlight: Option<HighlightStyle>,
    ) -> Self {
        Self {
            text: text.into(),
            color,
            highlight,
            is_new_line: false,
        }
    }

    /// Create a line-break segment.
    pub const fn new_line() -> Self {
        Self {
            text: String::new(),
            color: None,
            highlight: None,
            is_new_line: true,
        }
    }

    /// Number of typing units (graphemes) in this segment.
    ///
    /// A newline segment counts as one unit.
    pub fn unit_count(&self) -> usize {
        if self.is_new_line {
            1
        } else {
            self.text.graphemes(true).count()
        }
    }

    /// Check whether a grapheme typed with the given style can extend this run.
    pub fn accepts(&self, color: Option<&str>, highlight: Option<&HighlightStyle>) -> bool {
        !self.is_new_line && self.color.as_deref() == color && self.highlight.as_ref() == highlight
    }

    /// Plain text of the segment, with newline segments rendered as `\n`.
    pub fn as_plain(&self) -> &str {
        if self.is_new_line {
            "\n"
        } else {
            &self.text
        }
    }

    /// Byte offset of the `unit`-th grapheme (or the text length past the end).
    pub(crate) fn byte_offset(&self, unit: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(unit)
            .map_or(self.text.len(), |(idx, _)| idx)
    }

    /// Split off a copy of the units in `start..end` with a different highlight.
    pub(crate) fn slice(&self, start: usize, end: usize, highlight: Option<HighlightStyle>) -> Self {
        let from = self.byte_offset(start);
        let to = self.byte_offset(end);
        Self::new(&self.text[from..to], self.color.clone(), highlight)
    }
}

/// Whether a typing unit counts as whitespace for word rules.
pub(crate) fn is_whitespace_unit(grapheme: &str) -> bool {
    grapheme.chars().all(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_unit_count() {
        assert_eq!(Segment::new("héllo", None, None).unit_count(), 5);
        assert_eq!(Segment::new("e\u{301}", None, None).unit_count(), 1);
        assert_eq!(Segment::new_line().unit_count(), 1);
    }

    #[test]
    fn test_segment_accepts_matching_style() {
        let seg = Segment::new("a", Some("#f00".into()), None);
        assert!(seg.accepts(Some("#f00"), None));
        assert!(!seg.accepts(None, None));
        assert!(!seg.accepts(Some("#f00"), Some(&HighlightStyle::new("#ff0"))));
        assert!(!Segment::new_line().accepts(None, None));
    }

    #[test]
    fn test_segment_slice() {
        let seg = Segment::new("hello", Some("#0f0".into()), None);
        let mid = seg.slice(1, 4, Some(HighlightStyle::new("#ff0")));
        assert_eq!(mid.text, "ell");
        assert_eq!(mid.color.as_deref(), Some("#0f0"));
        assert!(mid.highlight.is_some());
    }

    #[test]
    fn test_whitespace_unit() {
        assert!(is_whitespace_unit(" "));
        assert!(is_whitespace_unit("\t"));
        assert!(!is_whitespace_unit("a"));
    }
}

//! Operation types: One queued, user-authored animation step.

use crate::buffer::HighlightStyle;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which end of the buffer `HighlightWords` counts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordsFrom {
    /// Count words from the start of the buffer.
    Start,
    /// Count words from the end of the buffer.
    #[default]
    End,
}

/// Per-operation options for typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeOptions {
    /// Per-grapheme delay overriding the configured type speed.
    pub speed: Option<Duration>,
    /// Text announced to assistive technology instead of the typed text.
    pub screen_reader_text: Option<String>,
    /// Whether the announcer is called when the operation completes.
    pub announce_completion: bool,
}

impl Default for TypeOptions {
    fn default() -> Self {
        Self {
            speed: None,
            screen_reader_text: None,
            announce_completion: true,
        }
    }
}

impl TypeOptions {
    /// Options with a speed override.
    pub fn with_speed(speed: Duration) -> Self {
        Self {
            speed: Some(speed),
            ..Self::default()
        }
    }
}

/// A queued animation step.
///
/// Operations are immutable once enqueued and consumed exactly once per pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Type text one grapheme at a time.
    Type {
        /// The text to type.
        text: String,
        /// Speed and announcement options.
        options: TypeOptions,
    },
    /// Delete graphemes from the tail.
    DeleteLetters(usize),
    /// Delete whitespace-delimited words from the tail.
    DeleteWords(usize),
    /// Delete everything that was on screen when the operation started.
    DeleteAll,
    /// Wait without touching the buffer.
    PauseFor(Duration),
    /// Set (or clear with `None`) the color for subsequently typed text.
    Colorize(Option<String>),
    /// Highlight a unit range of already-typed text.
    Highlight {
        /// First unit to highlight.
        start: usize,
        /// Number of units.
        length: usize,
        /// Highlight style.
        style: HighlightStyle,
    },
    /// Highlight whole words from one end of the buffer.
    HighlightWords {
        /// Number of words.
        count: usize,
        /// End of the buffer to count from.
        from: WordsFrom,
        /// Highlight style.
        style: HighlightStyle,
    },
    /// Insert a line break.
    NewLine,
    /// Clear the buffer.
    Reset,
}

impl Operation {
    /// Short name used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Type { .. } => "type",
            Self::DeleteLetters(_) => "delete_letters",
            Self::DeleteWords(_) => "delete_words",
            Self::DeleteAll => "delete_all",
            Self::PauseFor(_) => "pause_for",
            Self::Colorize(_) => "colorize",
            Self::Highlight { .. } => "highlight",
            Self::HighlightWords { .. } => "highlight_words",
            Self::NewLine => "new_line",
            Self::Reset => "reset",
        }
    }

    /// Whether the operation waits on the clock.
    pub const fn is_timed(&self) -> bool {
        matches!(
            self,
            Self::Type { .. }
                | Self::DeleteLetters(_)
                | Self::DeleteWords(_)
                | Self::DeleteAll
                | Self::PauseFor(_)
        )
    }
}

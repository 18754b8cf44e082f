//! Scripts: Declarative typing sequences loaded from TOML.
//!
//! ```toml
//! steps = [
//!     { type = "Hello, world" },
//!     { pause_for = 500 },
//!     { delete_words = 1 },
//!     { colorize = "#f00" },
//!     { type = { text = "Rust", speed_ms = 120, screen_reader_text = "Rust" } },
//!     "new_line",
//!     { highlight_words = { count = 1, from = "end", background = "#ff0" } },
//! ]
//! ```
//!
//! Counts and durations are signed in the file; negative values clamp to zero.

use super::operation::{Operation, TypeOptions, WordsFrom};
use crate::buffer::HighlightStyle;
use crate::config::{clamp_count, clamp_millis};
use crate::error::ScriptError;
use serde::Deserialize;
use std::path::Path;

/// A `type` step: either bare text or text with options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TypeStep {
    /// Bare text typed at the configured speed.
    Text(String),
    /// Text with per-step options.
    Detailed {
        /// The text to type.
        text: String,
        /// Per-grapheme delay in milliseconds.
        #[serde(default)]
        speed_ms: Option<i64>,
        /// Announcement text replacing the typed text.
        #[serde(default)]
        screen_reader_text: Option<String>,
        /// Whether to announce on completion.
        #[serde(default = "default_announce")]
        announce_completion: bool,
    },
}

const fn default_announce() -> bool {
    true
}

/// A `highlight` step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HighlightStep {
    /// First unit to highlight.
    pub start: i64,
    /// Number of units.
    pub length: i64,
    /// Highlight background.
    pub background: String,
    /// Optional text color inside the highlight.
    #[serde(default)]
    pub color: Option<String>,
}

/// A `highlight_words` step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HighlightWordsStep {
    /// Number of words.
    pub count: i64,
    /// End of the buffer to count from.
    #[serde(default)]
    pub from: WordsFrom,
    /// Highlight background.
    pub background: String,
    /// Optional text color inside the highlight.
    #[serde(default)]
    pub color: Option<String>,
}

/// One step of a script, mirroring the builder methods.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    /// Type text.
    Type(TypeStep),
    /// Delete graphemes.
    DeleteLetters(i64),
    /// Delete words.
    DeleteWords(i64),
    /// Delete everything.
    DeleteAll,
    /// Wait for the given milliseconds.
    PauseFor(i64),
    /// Set the typing color; an empty string clears it.
    Colorize(String),
    /// Highlight a unit range.
    Highlight(HighlightStep),
    /// Highlight words from one end.
    HighlightWords(HighlightWordsStep),
    /// Insert a line break.
    NewLine,
    /// Clear the buffer.
    Reset,
}

/// A declarative typing script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Steps in execution order.
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl Script {
    /// Parse a script from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ScriptError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a script from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Convert the steps into queue operations, clamping negative numbers.
    pub fn to_operations(&self) -> Vec<Operation> {
        self.steps.iter().map(ScriptStep::to_operation).collect()
    }
}

impl ScriptStep {
    /// Convert one step into an operation.
    pub fn to_operation(&self) -> Operation {
        match self {
            Self::Type(TypeStep::Text(text)) => Operation::Type {
                text: text.clone(),
                options: TypeOptions::default(),
            },
            Self::Type(TypeStep::Detailed {
                text,
                speed_ms,
                screen_reader_text,
                announce_completion,
            }) => Operation::Type {
                text: text.clone(),
                options: TypeOptions {
                    speed: speed_ms.map(clamp_millis),
                    screen_reader_text: screen_reader_text.clone(),
                    announce_completion: *announce_completion,
                },
            },
            Self::DeleteLetters(n) => Operation::DeleteLetters(clamp_count(*n)),
            Self::DeleteWords(n) => Operation::DeleteWords(clamp_count(*n)),
            Self::DeleteAll => Operation::DeleteAll,
            Self::PauseFor(ms) => Operation::PauseFor(clamp_millis(*ms)),
            Self::Colorize(color) => {
                Operation::Colorize(Some(color.clone()).filter(|c| !c.is_empty()))
            }
            Self::Highlight(step) => Operation::Highlight {
                start: clamp_count(step.start),
                length: clamp_count(step.length),
                style: style(&step.background, step.color.as_ref()),
            },
            Self::HighlightWords(step) => Operation::HighlightWords {
                count: clamp_count(step.count),
                from: step.from,
                style: style(&step.background, step.color.as_ref()),
            },
            Self::NewLine => Operation::NewLine,
            Self::Reset => Operation::Reset,
        }
    }
}

fn style(background: &str, color: Option<&String>) -> HighlightStyle {
    HighlightStyle {
        background: background.to_owned(),
        color: color.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_script_parse_mixed_steps() {
        let script = Script::from_toml_str(
            r##"
            steps = [
                { type = "Hi" },
                { pause_for = 500 },
                { delete_letters = 1 },
                "delete_all",
                "new_line",
                { colorize = "#f00" },
            ]
            "##,
        )
        .unwrap();

        let ops = script.to_operations();
        assert_eq!(ops.len(), 6);
        assert_eq!(
            ops[0],
            Operation::Type {
                text: "Hi".into(),
                options: TypeOptions::default()
            }
        );
        assert_eq!(ops[1], Operation::PauseFor(Duration::from_millis(500)));
        assert_eq!(ops[3], Operation::DeleteAll);
        assert_eq!(ops[4], Operation::NewLine);
        assert_eq!(ops[5], Operation::Colorize(Some("#f00".into())));
    }

    #[test]
    fn test_script_negative_values_clamp() {
        let script = Script::from_toml_str(
            r#"steps = [ { delete_letters = -3 }, { pause_for = -10 }, { type = { text = "x", speed_ms = -5 } } ]"#,
        )
        .unwrap();
        let ops = script.to_operations();
        assert_eq!(ops[0], Operation::DeleteLetters(0));
        assert_eq!(ops[1], Operation::PauseFor(Duration::ZERO));
        match &ops[2] {
            Operation::Type { options, .. } => assert_eq!(options.speed, Some(Duration::ZERO)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_script_empty_colorize_clears() {
        let script = Script::from_toml_str(r#"steps = [ { colorize = "" } ]"#).unwrap();
        assert_eq!(script.to_operations(), vec![Operation::Colorize(None)]);
    }

    #[test]
    fn test_script_highlight_words() {
        let script = Script::from_toml_str(
            r##"steps = [ { highlight_words = { count = 2, from = "start", background = "#ff0", color = "#000" } } ]"##,
        )
        .unwrap();
        assert_eq!(
            script.to_operations(),
            vec![Operation::HighlightWords {
                count: 2,
                from: WordsFrom::Start,
                style: HighlightStyle::new("#ff0").with_color("#000"),
            }]
        );
    }

    #[test]
    fn test_script_rejects_unknown_step() {
        assert!(Script::from_toml_str(r#"steps = [ { explode = 1 } ]"#).is_err());
    }
}

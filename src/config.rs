//! Configuration: Engine options fixed at construction.
//!
//! A new configuration requires a new engine. Options can be built in code
//! (`TypewriterConfig::default()` plus field updates) or read from TOML:
//!
//! ```toml
//! type_speed_ms = 40
//! delete_speed_ms = 20
//! loop = true
//! cursor_style = "bar"
//! aria_live = "assertive"
//! max_visible_segments = 200
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Cursor shape hint for the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorStyle {
    /// Full-cell block.
    #[default]
    Block,
    /// Underline.
    Underline,
    /// Thin vertical bar.
    Bar,
}

/// ARIA live-region politeness passed to the announcer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AriaLive {
    /// No announcements.
    Off,
    /// Announce when the user is idle.
    #[default]
    Polite,
    /// Announce immediately.
    Assertive,
}

/// Configuration for a [`Typewriter`](crate::Typewriter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypewriterConfig {
    /// Default per-grapheme delay for typing.
    #[serde(rename = "type_speed_ms", with = "clamped_millis")]
    pub type_speed: Duration,
    /// Default per-grapheme delay for deletion.
    #[serde(rename = "delete_speed_ms", with = "clamped_millis")]
    pub delete_speed: Duration,
    /// Replay the recorded operations after the queue drains.
    #[serde(rename = "loop")]
    pub loop_enabled: bool,
    /// Extra delay before each loop restart.
    #[serde(rename = "loop_delay_ms", with = "clamped_millis")]
    pub loop_delay: Duration,
    /// Cursor shape hint.
    pub cursor_style: CursorStyle,
    /// Cursor color hint.
    pub cursor_color: Option<String>,
    /// Cursor blink period hint.
    #[serde(rename = "cursor_blink_speed_ms", with = "clamped_millis")]
    pub cursor_blink_speed: Duration,
    /// Whether the cursor is shown at all.
    pub show_cursor: bool,
    /// Hide the cursor once the queue has drained.
    pub hide_cursor_on_complete: bool,
    /// Skip per-grapheme pacing when the host reports reduced motion.
    pub respect_reduced_motion: bool,
    /// Accept Space/Escape/R from the host key handler.
    pub enable_keyboard_controls: bool,
    /// Live-region politeness for announcements.
    pub aria_live: AriaLive,
    /// Accessible label passed to the announcer.
    pub aria_label: Option<String>,
    /// Accessible role passed to the announcer.
    pub role: String,
    /// Number of trailing segments exposed to the host, `None` for all.
    pub max_visible_segments: Option<usize>,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            type_speed: Duration::from_millis(50),
            delete_speed: Duration::from_millis(30),
            loop_enabled: false,
            loop_delay: Duration::ZERO,
            cursor_style: CursorStyle::Block,
            cursor_color: None,
            cursor_blink_speed: Duration::from_millis(530),
            show_cursor: true,
            hide_cursor_on_complete: false,
            respect_reduced_motion: true,
            enable_keyboard_controls: false,
            aria_live: AriaLive::Polite,
            aria_label: None,
            role: "status".to_string(),
            max_visible_segments: None,
        }
    }
}

impl TypewriterConfig {
    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_visible_segments == Some(0) {
            return Err(ConfigError::InvalidWindow);
        }
        if self.cursor_color.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(ConfigError::BlankField("cursor_color"));
        }
        if self.role.trim().is_empty() {
            return Err(ConfigError::BlankField("role"));
        }
        Ok(())
    }
}

/// Clamp a signed count to zero.
pub(crate) fn clamp_count(value: i64) -> usize {
    usize::try_from(value.max(0)).unwrap_or(usize::MAX)
}

/// Clamp signed milliseconds to a non-negative duration.
pub(crate) fn clamp_millis(value: i64) -> Duration {
    Duration::from_millis(u64::try_from(value).unwrap_or(0))
}

/// Millisecond durations that accept negative input as zero.
mod clamped_millis {
    use super::clamp_millis;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        i64::deserialize(deserializer).map(clamp_millis)
    }
}

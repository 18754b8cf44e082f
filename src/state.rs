//! Typewriter state: The read-only snapshot handed to the host renderer.

use crate::buffer::{Segment, SegmentBuffer};
use crate::config::{CursorStyle, TypewriterConfig};
use crate::window::{VirtualWindow, WindowMetrics};
use bitflags::bitflags;
use std::time::Duration;

bitflags! {
    /// Playback flags carried by every snapshot.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PlaybackFlags: u8 {
        /// Running or paused mid-queue.
        const TYPING = 0b0000_0001;
        /// Paused by the host.
        const PAUSED = 0b0000_0010;
        /// Typing with looping configured.
        const LOOPING = 0b0000_0100;
        /// The cursor should be drawn.
        const CURSOR_VISIBLE = 0b0000_1000;
        /// `pause()` would take effect.
        const CAN_BE_PAUSED = 0b0001_0000;
        /// Pacing is disabled for reduced motion.
        const REDUCED_MOTION = 0b0010_0000;
    }
}

/// Cursor presentation hints, passed through from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorHints {
    /// Cursor shape.
    pub style: CursorStyle,
    /// Cursor color.
    pub color: Option<String>,
    /// Blink period.
    pub blink_speed: Duration,
}

impl CursorHints {
    pub(crate) fn from_config(config: &TypewriterConfig) -> Self {
        Self {
            style: config.cursor_style,
            color: config.cursor_color.clone(),
            blink_speed: config.cursor_blink_speed,
        }
    }
}

/// Externally observable snapshot of a typewriter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypewriterState {
    /// Every segment in the buffer.
    pub segments: Vec<Segment>,
    /// Plain text of the whole buffer.
    pub current_text: String,
    /// Plain text of the virtualization window.
    pub visible_text: String,
    /// Playback flags.
    pub flags: PlaybackFlags,
    /// Virtualization counters.
    pub window: WindowMetrics,
    /// Cursor hints.
    pub cursor: CursorHints,
}

impl TypewriterState {
    /// Snapshot of an empty, idle engine.
    pub(crate) fn empty(cursor: CursorHints, flags: PlaybackFlags) -> Self {
        Self {
            segments: Vec::new(),
            current_text: String::new(),
            visible_text: String::new(),
            flags,
            window: WindowMetrics::default(),
            cursor,
        }
    }

    /// Rebuild the snapshot from the buffer.
    pub(crate) fn capture(
        buffer: &SegmentBuffer,
        window: &VirtualWindow,
        flags: PlaybackFlags,
        cursor: CursorHints,
    ) -> Self {
        let view = window.project(buffer.segments());
        Self {
            segments: buffer.segments().to_vec(),
            current_text: buffer.to_plain_text(),
            visible_text: view.visible.iter().map(Segment::as_plain).collect(),
            flags,
            window: view.metrics,
            cursor,
        }
    }

    /// The trailing segments inside the virtualization window.
    pub fn visible_segments(&self) -> &[Segment] {
        let start = self.segments.len().saturating_sub(self.window.visible_segments);
        &self.segments[start..]
    }

    /// Whether playback is running or paused mid-queue.
    pub const fn is_typing(&self) -> bool {
        self.flags.contains(PlaybackFlags::TYPING)
    }

    /// Whether playback is paused.
    pub const fn is_paused(&self) -> bool {
        self.flags.contains(PlaybackFlags::PAUSED)
    }

    /// Whether a looping run is in progress.
    pub const fn is_looping(&self) -> bool {
        self.flags.contains(PlaybackFlags::LOOPING)
    }

    /// Whether the cursor should be drawn.
    pub const fn cursor_visible(&self) -> bool {
        self.flags.contains(PlaybackFlags::CURSOR_VISIBLE)
    }

    /// Whether `pause()` would take effect.
    pub const fn can_be_paused(&self) -> bool {
        self.flags.contains(PlaybackFlags::CAN_BE_PAUSED)
    }

    /// Whether pacing is disabled for reduced motion.
    pub const fn reduced_motion(&self) -> bool {
        self.flags.contains(PlaybackFlags::REDUCED_MOTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_capture_windowed() {
        let mut buffer = SegmentBuffer::new();
        buffer.append_grapheme("a", Some("#f00"), None);
        buffer.append_new_line();
        buffer.append_grapheme("b", None, None);

        let config = TypewriterConfig::default();
        let state = TypewriterState::capture(
            &buffer,
            &VirtualWindow::new(Some(2)),
            PlaybackFlags::TYPING,
            CursorHints::from_config(&config),
        );
        assert_eq!(state.current_text, "a\nb");
        assert_eq!(state.visible_text, "\nb");
        assert_eq!(state.visible_segments().len(), 2);
        assert_eq!(state.window.total_segments, 3);
        assert!(state.is_typing());
        assert!(!state.is_paused());
    }
}

//! Message types for the playback actor.
//!
//! These enums define the protocol between the host and the playback thread.

use crate::queue::Operation;
use crossterm::event::KeyEvent;

/// Commands accepted by a typewriter, either directly through
/// [`Typewriter::apply`](crate::Typewriter::apply) or over the playback
/// actor's channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackCommand {
    /// Begin consuming the queue.
    Start,
    /// Suspend, preserving the remaining wait.
    Pause,
    /// Continue after a pause.
    Resume,
    /// Pause if running, resume if paused.
    TogglePause,
    /// Complete the current operation immediately.
    Skip,
    /// Cancel and discard all queued operations.
    Stop,
    /// Stop, clear the buffer and forget the color.
    Reset,
    /// Append an operation to the queue.
    Enqueue(Operation),
    /// A key press, honored only when keyboard controls are enabled.
    Key(KeyEvent),
    /// The host's reduced-motion preference changed.
    ReducedMotion(bool),
    /// Destroy the typewriter and end the playback thread.
    Shutdown,
}

impl PlaybackCommand {
    /// Short name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::TogglePause => "toggle_pause",
            Self::Skip => "skip",
            Self::Stop => "stop",
            Self::Reset => "reset",
            Self::Enqueue(_) => "enqueue",
            Self::Key(_) => "key",
            Self::ReducedMotion(_) => "reduced_motion",
            Self::Shutdown => "shutdown",
        }
    }
}

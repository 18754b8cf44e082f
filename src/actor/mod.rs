//! Actor Model: Message-passing playback on dedicated threads.
//!
//! The engine itself is single-threaded and polled. This module provides
//! the threads a terminal host usually wants around it:
//! - **Playback Actor**: Owns the typewriter, sleeps until the next wakeup
//! - **Input Actor**: Polls terminal key presses, forwards them to the host
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐      KeyEvent       ┌──────────────┐
//! │ Input Thread │ ─────────────────▶  │              │
//! └──────────────┘                     │     Host     │
//!                                      │              │
//! ┌──────────────┐   PlaybackCommand   │              │
//! │   Playback   │ ◀────────────────── │              │
//! │    Thread    │ ──────────────────▶ │              │
//! └──────────────┘   TypewriterState   └──────────────┘
//! ```

mod input;
mod messages;
mod playback;

pub use input::{command_for_key, InputActor};
pub use messages::PlaybackCommand;
pub use playback::PlaybackActor;

//! # Quill
//!
//! A framework-agnostic typewriter animation engine.
//!
//! Quill types, deletes, colors and highlights text over time and hands
//! read-only snapshots to whatever renders them: a terminal, a GUI widget or
//! a test harness. It renders nothing itself.
//!
//! ## Core Concepts
//!
//! - **Operation queue**: Fluent builder calls become a FIFO of operations
//! - **Segment buffer**: Typed text as styled runs of grapheme clusters
//! - **Polled timing**: The engine reports its next deadline and never sleeps
//! - **Snapshots**: Every change publishes a [`TypewriterState`]
//! - **Actor model**: An optional playback thread drives the engine in real time
//!
//! ## Example
//!
//! ```rust,ignore
//! use quill::{Typewriter, TypewriterConfig};
//! use std::time::Duration;
//!
//! let mut tw = Typewriter::new(TypewriterConfig::default())?;
//! tw.type_text("Hello, world")
//!     .pause_for(Duration::from_millis(800))
//!     .delete_words(1)
//!     .colorize("#f0a")
//!     .type_text("Quill");
//! tw.subscribe(|state| println!("{}", state.visible_text));
//! tw.start();
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod a11y;
pub mod actor;
pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod queue;
pub mod state;
pub mod window;

// Re-exports for convenience
pub use a11y::{Announcement, Announcer, LiveRegion};
pub use actor::{PlaybackActor, PlaybackCommand};
pub use buffer::{HighlightStyle, Segment, SegmentBuffer};
pub use config::{AriaLive, CursorStyle, TypewriterConfig};
pub use engine::{Clock, ManualClock, Phase, SubscriptionId, SystemClock, Typewriter, Wakeup};
pub use error::{ConfigError, ScriptError};
pub use events::{EventKind, TypewriterEvent};
pub use queue::{Operation, Script, TypeOptions, WordsFrom};
pub use state::{PlaybackFlags, TypewriterState};
pub use window::{VirtualWindow, WindowMetrics, WindowView};

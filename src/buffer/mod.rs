//! Segment buffer primitives.
//!
//! This module contains the data model for typed text:
//! - `Segment`: A styled run of graphemes (or a line break)
//! - `HighlightStyle`: Background/foreground applied over typed text
//! - `SegmentBuffer`: The ordered list of segments currently on screen

mod segment;
mod segments;

pub use segment::{HighlightStyle, Segment};
pub use segments::SegmentBuffer;

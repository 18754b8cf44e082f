//! Virtualization window: The trailing slice of segments handed to the host.
//!
//! Long typing sessions can accumulate thousands of segments. The window
//! keeps only the last `max_visible_segments` for materialization and
//! summarizes the rest, the way a scrollback view shows only the bottom of
//! its history. The projection is pure; the buffer is never touched.

use crate::buffer::Segment;
use std::num::NonZeroUsize;

/// Counters describing a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowMetrics {
    /// Segments in the buffer.
    pub total_segments: usize,
    /// Segments inside the window.
    pub visible_segments: usize,
    /// Segments summarized away.
    pub hidden_segments: usize,
    /// Units (graphemes plus line breaks) in the hidden segments.
    pub hidden_units: usize,
}

/// A projected view over a segment slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowView<'a> {
    /// Segments the host should materialize.
    pub visible: &'a [Segment],
    /// Counters for host-side metrics.
    pub metrics: WindowMetrics,
}

/// Trailing window over a segment list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VirtualWindow {
    /// Window size, `None` to expose every segment.
    max_visible: Option<NonZeroUsize>,
}

impl VirtualWindow {
    /// Create a window; `None` or zero disables virtualization.
    pub fn new(max_visible: Option<usize>) -> Self {
        Self {
            max_visible: max_visible.and_then(NonZeroUsize::new),
        }
    }

    /// The configured window size.
    pub fn max_visible(&self) -> Option<usize> {
        self.max_visible.map(NonZeroUsize::get)
    }

    /// Project the trailing window over `segments`.
    pub fn project<'a>(&self, segments: &'a [Segment]) -> WindowView<'a> {
        let total = segments.len();
        let visible_count = self.max_visible.map_or(total, |max| total.min(max.get()));
        let (hidden, visible) = segments.split_at(total - visible_count);

        WindowView {
            visible,
            metrics: WindowMetrics {
                total_segments: total,
                visible_segments: visible_count,
                hidden_segments: hidden.len(),
                hidden_units: hidden.iter().map(Segment::unit_count).sum(),
            },
        }
    }
}

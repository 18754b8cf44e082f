//! Segment buffer: The ordered list of runs that is "what has been typed".
//!
//! Appends extend the trailing run when the style matches, so typing a
//! sentence in one color costs O(1) amortized per grapheme. Deletion only
//! ever touches the tail; earlier segments are never disturbed.

use super::segment::{is_whitespace_unit, HighlightStyle, Segment};
use unicode_segmentation::UnicodeSegmentation;

/// Ordered, mutable list of styled text runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentBuffer {
    /// Segments in display order.
    segments: Vec<Segment>,
}

impl SegmentBuffer {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// All segments in display order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Check if nothing has been typed.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append one grapheme with the given style.
    ///
    /// Extends the last segment if its style matches and the grapheme stays a
    /// unit of its own there, else opens a new one. A lone combining mark
    /// typed after `e` is therefore still one deletable unit.
    pub fn append_grapheme(
        &mut self,
        grapheme: &str,
        color: Option<&str>,
        highlight: Option<&HighlightStyle>,
    ) {
        if grapheme.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(last)
                if last.accepts(color, highlight) && stays_separate(&last.text, grapheme) =>
            {
                last.text.push_str(grapheme);
            }
            _ => self.segments.push(Segment::new(
                grapheme,
                color.map(str::to_owned),
                highlight.cloned(),
            )),
        }
    }

    /// Append a line break.
    pub fn append_new_line(&mut self) {
        self.segments.push(Segment::new_line());
    }

    /// Remove up to `count` units from the end of the buffer.
    ///
    /// Removing more than exists empties the buffer. Returns the number of
    /// units actually removed.
    pub fn remove_trailing(&mut self, count: usize) -> usize {
        let mut removed = 0;
        while removed < count {
            let Some(last) = self.segments.last_mut() else {
                break;
            };
            if !last.is_new_line {
                if let Some((idx, _)) = last.text.grapheme_indices(true).next_back() {
                    last.text.truncate(idx);
                    removed += 1;
                    if !last.text.is_empty() {
                        continue;
                    }
                }
                self.segments.pop();
                continue;
            }
            self.segments.pop();
            removed += 1;
        }
        removed
    }

    /// Apply a highlight to the units in `start..start + length`.
    ///
    /// The range is clamped to the buffer. Segments straddling a boundary are
    /// split; newline segments are left untouched. Returns `true` if anything
    /// was restyled.
    pub fn highlight_range(&mut self, start: usize, length: usize, style: &HighlightStyle) -> bool {
        let end = start.saturating_add(length).min(self.total_length());
        if start >= end {
            return false;
        }

        let mut changed = false;
        let mut pos = 0;
        let mut out = Vec::with_capacity(self.segments.len() + 2);
        for seg in self.segments.drain(..) {
            let units = seg.unit_count();
            let (seg_start, seg_end) = (pos, pos + units);
            pos = seg_end;

            if seg.is_new_line || seg_end <= start || seg_start >= end {
                out.push(seg);
                continue;
            }

            let from = start.saturating_sub(seg_start);
            let to = (end - seg_start).min(units);
            if from > 0 {
                out.push(seg.slice(0, from, seg.highlight.clone()));
            }
            out.push(seg.slice(from, to, Some(style.clone())));
            if to < units {
                out.push(seg.slice(to, units, seg.highlight.clone()));
            }
            changed = true;
        }
        self.segments = out;
        changed
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Total number of units (graphemes plus line breaks).
    pub fn total_length(&self) -> usize {
        self.segments.iter().map(Segment::unit_count).sum()
    }

    /// Concatenated text, with line breaks rendered as `\n`.
    pub fn to_plain_text(&self) -> String {
        self.segments.iter().map(Segment::as_plain).collect()
    }

    /// Per-unit whitespace map, in display order.
    ///
    /// Line breaks count as whitespace.
    pub fn whitespace_map(&self) -> Vec<bool> {
        let mut map = Vec::new();
        for seg in &self.segments {
            if seg.is_new_line {
                map.push(true);
            } else {
                map.extend(seg.text.graphemes(true).map(is_whitespace_unit));
            }
        }
        map
    }
}

/// Whether `grapheme` appended to `text` remains a cluster of its own.
///
/// Only the trailing cluster of `text` can combine with what follows.
fn stays_separate(text: &str, grapheme: &str) -> bool {
    let Some(tail) = text.graphemes(true).next_back() else {
        return true;
    };
    let mut joined = String::with_capacity(tail.len() + grapheme.len());
    joined.push_str(tail);
    joined.push_str(grapheme);
    joined.graphemes(true).count() == 2
}

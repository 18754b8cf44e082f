//! Queue executor: Consumes operations one at a time against the buffer.
//!
//! The executor is a pollable state machine. [`QueueExecutor::advance`]
//! applies everything that is due at `now` and leaves at most one armed
//! [`Wait`]; the driver sleeps until that deadline and calls it again.
//!
//! ```text
//!            start()            queue empty, no loop
//!   Idle ───────────▶ Running ──────────────────────▶ Idle
//!                     │    ▲   queue empty, loop
//!             pause() │    │   ──▶ rewind recorded ops ──┐
//!                     ▼    │ resume()                    │
//!                     Paused                  Running ◀──┘
//! ```
//!
//! The unit of interruption is "wait, then apply one grapheme": a cancelled
//! wait never leaves half an operation step applied. Deadlines chain from
//! the previous deadline, so a late wakeup catches up instead of drifting.

use super::wait::Wait;
use crate::buffer::SegmentBuffer;
use crate::queue::{words, Operation, OperationQueue, WordsFrom};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use unicode_segmentation::UnicodeSegmentation;

/// Minimum delay before replaying a loop iteration that took no time.
pub const MIN_LOOP_GAP: Duration = Duration::from_millis(16);

/// Execution phase of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Nothing running.
    #[default]
    Idle,
    /// Consuming the queue.
    Running,
    /// Suspended with the current wait frozen.
    Paused,
}

/// Whether text operations are paced per grapheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pacing {
    /// One grapheme per configured delay.
    Paced,
    /// Whole operation at once (reduced motion).
    Instant,
}

/// Timing options copied from the configuration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Timing {
    pub type_speed: Duration,
    pub delete_speed: Duration,
    pub loop_enabled: bool,
    pub loop_delay: Duration,
}

/// Executor flags reported alongside every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Status {
    pub phase: Phase,
    /// The last run drained without looping.
    pub finished: bool,
}

/// Something the controller must react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    /// The buffer changed.
    Mutated,
    /// A `Type` operation completed with this announcement text.
    Typed(String),
    /// The recorded operations were rewound for another pass.
    LoopRestarted(u64),
    /// The queue drained and playback went idle.
    Drained,
}

pub(crate) type Sink<'a> = dyn FnMut(Step, &SegmentBuffer, Status) + 'a;

/// The operation currently being executed.
#[derive(Debug, Clone)]
enum Active {
    Typing {
        units: VecDeque<String>,
        speed: Duration,
        announcement: Option<String>,
    },
    Deleting {
        remaining: usize,
        speed: Duration,
    },
    Pausing {
        duration: Duration,
        elapsed: bool,
    },
    LoopGap {
        duration: Duration,
        elapsed: bool,
    },
}

impl Active {
    fn is_done(&self, buffer: &SegmentBuffer) -> bool {
        match self {
            Self::Typing { units, .. } => units.is_empty(),
            Self::Deleting { remaining, .. } => *remaining == 0 || buffer.is_empty(),
            Self::Pausing { elapsed, .. } | Self::LoopGap { elapsed, .. } => *elapsed,
        }
    }

    const fn delay(&self) -> Duration {
        match self {
            Self::Typing { speed, .. } | Self::Deleting { speed, .. } => *speed,
            Self::Pausing { duration, .. } | Self::LoopGap { duration, .. } => *duration,
        }
    }

    const fn is_text(&self) -> bool {
        matches!(self, Self::Typing { .. } | Self::Deleting { .. })
    }
}

/// Runs queued operations against a segment buffer.
#[derive(Debug)]
pub(crate) struct QueueExecutor {
    timing: Timing,
    queue: OperationQueue,
    phase: Phase,
    active: Option<Active>,
    wait: Option<Wait>,
    /// Bumped on every cancellation; stale timer callbacks compare against it.
    generation: u64,
    /// Color applied to typed graphemes.
    color: Option<String>,
    /// Color in effect when the current run started; each loop pass
    /// begins from it.
    pass_color: Option<String>,
    iteration: u64,
    /// Whether the current pass armed any paced wait.
    waited_this_pass: bool,
    finished: bool,
}

impl QueueExecutor {
    pub(crate) const fn new(timing: Timing) -> Self {
        Self {
            timing,
            queue: OperationQueue::new(),
            phase: Phase::Idle,
            active: None,
            wait: None,
            generation: 0,
            color: None,
            pass_color: None,
            iteration: 0,
            waited_this_pass: false,
            finished: false,
        }
    }

    pub(crate) fn push(&mut self, op: Operation) {
        self.queue.push(op);
    }

    pub(crate) fn pending(&self) -> usize {
        self.queue.len()
    }

    pub(crate) const fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) const fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) const fn status(&self) -> Status {
        Status {
            phase: self.phase,
            finished: self.finished,
        }
    }

    /// Deadline of the armed wait, if playback is running.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        if self.phase == Phase::Running {
            self.wait.map(|w| w.deadline())
        } else {
            None
        }
    }

    /// Leave `Idle`. Returns `false` if already running or nothing is queued.
    pub(crate) fn start(&mut self) -> bool {
        if self.phase != Phase::Idle {
            debug!(phase = ?self.phase, "start ignored: already active");
            return false;
        }
        if self.queue.is_empty() {
            debug!("start ignored: queue is empty");
            return false;
        }
        self.phase = Phase::Running;
        self.finished = false;
        self.iteration = 0;
        self.waited_this_pass = false;
        self.pass_color.clone_from(&self.color);
        debug!(pending = self.queue.len(), "playback started");
        true
    }

    pub(crate) fn pause(&mut self, now: Instant) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.phase = Phase::Paused;
        if let Some(wait) = self.wait.as_mut() {
            wait.freeze(now);
            trace!(remaining = ?wait.remaining(now), "wait frozen");
        }
        self.generation += 1;
        debug!("playback paused");
        true
    }

    pub(crate) fn resume(&mut self, now: Instant) -> bool {
        if self.phase != Phase::Paused {
            return false;
        }
        self.phase = Phase::Running;
        if let Some(wait) = self.wait.as_mut() {
            wait.thaw(now);
        }
        self.generation += 1;
        debug!("playback resumed");
        true
    }

    /// Cancel the wait and drop every pending and recorded operation.
    pub(crate) fn stop(&mut self) {
        self.queue.discard();
        self.active = None;
        self.wait = None;
        self.phase = Phase::Idle;
        self.generation += 1;
        debug!("playback stopped");
    }

    /// Stop and forget the typing color.
    pub(crate) fn reset(&mut self) {
        self.stop();
        self.color = None;
        self.pass_color = None;
        self.finished = false;
    }

    /// Complete the current operation at once. Timing of later operations
    /// is unaffected; a paused executor stays paused.
    pub(crate) fn skip(&mut self, buffer: &mut SegmentBuffer, sink: &mut Sink<'_>) -> bool {
        if self.phase == Phase::Idle {
            return false;
        }
        self.generation += 1;
        self.wait = None;
        if let Some(active) = self.active.take() {
            debug!("skipping current operation");
            self.complete(active, buffer, sink);
        }
        true
    }

    /// Apply everything due at `now`.
    pub(crate) fn advance(
        &mut self,
        buffer: &mut SegmentBuffer,
        now: Instant,
        pacing: Pacing,
        sink: &mut Sink<'_>,
    ) {
        let mut logical = now;
        while self.phase == Phase::Running {
            if let Some(wait) = self.wait {
                if !wait.is_due(now) {
                    break;
                }
                logical = wait.deadline();
                self.wait = None;
                self.apply_unit(buffer, sink);
                continue;
            }

            let Some(active) = self.active.as_ref() else {
                match self.queue.pop() {
                    Some(op) => self.begin(op, buffer, sink),
                    None => self.drain(buffer, sink),
                }
                continue;
            };

            let done = active.is_done(buffer);
            let instant = pacing == Pacing::Instant && active.is_text();
            let delay = active.delay();
            let is_gap = matches!(active, Active::LoopGap { .. });

            if done || instant {
                if let Some(active) = self.active.take() {
                    self.complete(active, buffer, sink);
                }
            } else if delay.is_zero() {
                self.apply_unit(buffer, sink);
            } else {
                if !is_gap {
                    self.waited_this_pass = true;
                }
                self.wait = Some(Wait::new(logical, delay));
            }
        }
    }

    fn emit(&self, step: Step, buffer: &SegmentBuffer, sink: &mut Sink<'_>) {
        sink(step, buffer, self.status());
    }

    /// Start an operation. Untimed operations apply here and leave no
    /// active state behind.
    fn begin(&mut self, op: Operation, buffer: &mut SegmentBuffer, sink: &mut Sink<'_>) {
        trace!(op = op.name(), timed = op.is_timed(), "operation begins");
        match op {
            Operation::Type { text, options } => {
                let units = text.graphemes(true).map(str::to_owned).collect();
                let announcement = if options.announce_completion {
                    Some(options.screen_reader_text.unwrap_or(text)).filter(|t| !t.is_empty())
                } else {
                    None
                };
                self.active = Some(Active::Typing {
                    units,
                    speed: options.speed.unwrap_or(self.timing.type_speed),
                    announcement,
                });
            }
            Operation::DeleteLetters(count) => self.begin_delete(count),
            Operation::DeleteWords(count) => {
                let span = words::trailing_delete_span(&buffer.whitespace_map(), count);
                self.begin_delete(span);
            }
            Operation::DeleteAll => self.begin_delete(buffer.total_length()),
            Operation::PauseFor(duration) => {
                self.active = Some(Active::Pausing {
                    duration,
                    elapsed: false,
                });
            }
            Operation::Colorize(color) => {
                self.color = color.filter(|c| !c.is_empty());
            }
            Operation::Highlight {
                start,
                length,
                style,
            } => {
                if buffer.highlight_range(start, length, &style) {
                    self.emit(Step::Mutated, buffer, sink);
                }
            }
            Operation::HighlightWords { count, from, style } => {
                let ws = buffer.whitespace_map();
                let range = match from {
                    WordsFrom::Start => words::leading_word_range(&ws, count),
                    WordsFrom::End => words::trailing_word_range(&ws, count),
                };
                if let Some((start, length)) = range {
                    if buffer.highlight_range(start, length, &style) {
                        self.emit(Step::Mutated, buffer, sink);
                    }
                }
            }
            Operation::NewLine => {
                buffer.append_new_line();
                self.emit(Step::Mutated, buffer, sink);
            }
            Operation::Reset => {
                buffer.clear();
                self.emit(Step::Mutated, buffer, sink);
            }
        }
    }

    fn begin_delete(&mut self, count: usize) {
        self.active = Some(Active::Deleting {
            remaining: count,
            speed: self.timing.delete_speed,
        });
    }

    /// Apply the single step guarded by the wait that just elapsed.
    fn apply_unit(&mut self, buffer: &mut SegmentBuffer, sink: &mut Sink<'_>) {
        let mutated = match self.active.as_mut() {
            Some(Active::Typing { units, .. }) => units.pop_front().is_some_and(|unit| {
                type_unit(buffer, &unit, self.color.as_deref());
                true
            }),
            Some(Active::Deleting { remaining, .. }) => {
                *remaining = remaining.saturating_sub(1);
                buffer.remove_trailing(1) > 0
            }
            Some(Active::Pausing { elapsed, .. } | Active::LoopGap { elapsed, .. }) => {
                *elapsed = true;
                false
            }
            None => false,
        };
        if mutated {
            self.emit(Step::Mutated, buffer, sink);
        }
    }

    /// Materialize whatever is left of `active` and finish it.
    fn complete(&mut self, active: Active, buffer: &mut SegmentBuffer, sink: &mut Sink<'_>) {
        match active {
            Active::Typing {
                units,
                announcement,
                ..
            } => {
                if !units.is_empty() {
                    for unit in &units {
                        type_unit(buffer, unit, self.color.as_deref());
                    }
                    self.emit(Step::Mutated, buffer, sink);
                }
                if let Some(text) = announcement {
                    self.emit(Step::Typed(text), buffer, sink);
                }
            }
            Active::Deleting { remaining, .. } => {
                if buffer.remove_trailing(remaining) > 0 {
                    self.emit(Step::Mutated, buffer, sink);
                }
            }
            Active::Pausing { .. } | Active::LoopGap { .. } => {}
        }
    }

    /// The pending queue ran dry: loop or go idle.
    fn drain(&mut self, buffer: &SegmentBuffer, sink: &mut Sink<'_>) {
        if self.timing.loop_enabled && self.queue.recorded_len() > 0 {
            self.iteration += 1;
            let gap = if self.waited_this_pass {
                self.timing.loop_delay
            } else {
                self.timing.loop_delay.max(MIN_LOOP_GAP)
            };
            self.waited_this_pass = false;
            self.queue.rewind();
            self.color.clone_from(&self.pass_color);
            debug!(iteration = self.iteration, "loop restart");
            self.emit(Step::LoopRestarted(self.iteration), buffer, sink);
            if !gap.is_zero() {
                self.active = Some(Active::LoopGap {
                    duration: gap,
                    elapsed: false,
                });
            }
            return;
        }

        self.phase = Phase::Idle;
        self.finished = true;
        self.queue.forget_recorded();
        debug!("queue drained");
        self.emit(Step::Drained, buffer, sink);
    }
}

/// Append one typed grapheme; line-break graphemes become newline segments.
fn type_unit(buffer: &mut SegmentBuffer, unit: &str, color: Option<&str>) {
    if unit.chars().all(|c| c == '\n' || c == '\r') {
        buffer.append_new_line();
    } else {
        buffer.append_grapheme(unit, color, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::TypeOptions;

    const MS: Duration = Duration::from_millis(1);

    fn timing(loop_enabled: bool) -> Timing {
        Timing {
            type_speed: MS * 10,
            delete_speed: MS * 5,
            loop_enabled,
            loop_delay: Duration::ZERO,
        }
    }

    fn type_op(text: &str) -> Operation {
        Operation::Type {
            text: text.into(),
            options: TypeOptions::default(),
        }
    }

    fn run(
        exec: &mut QueueExecutor,
        buffer: &mut SegmentBuffer,
        now: Instant,
        steps: &mut Vec<Step>,
    ) {
        exec.advance(buffer, now, Pacing::Paced, &mut |step, _, _| steps.push(step));
    }

    #[test]
    fn test_executor_types_one_grapheme_per_wait() {
        let t0 = Instant::now();
        let mut exec = QueueExecutor::new(timing(false));
        let mut buffer = SegmentBuffer::new();
        let mut steps = Vec::new();
        exec.push(type_op("Hi"));
        assert!(exec.start());

        run(&mut exec, &mut buffer, t0, &mut steps);
        assert_eq!(buffer.to_plain_text(), "");
        assert_eq!(exec.next_deadline(), Some(t0 + MS * 10));

        run(&mut exec, &mut buffer, t0 + MS * 10, &mut steps);
        assert_eq!(buffer.to_plain_text(), "H");

        run(&mut exec, &mut buffer, t0 + MS * 20, &mut steps);
        assert_eq!(buffer.to_plain_text(), "Hi");
        assert_eq!(exec.phase(), Phase::Idle);
        assert_eq!(steps.last(), Some(&Step::Drained));
        assert!(steps.contains(&Step::Typed("Hi".into())));
    }

    #[test]
    fn test_executor_late_wakeup_catches_up() {
        let t0 = Instant::now();
        let mut exec = QueueExecutor::new(timing(false));
        let mut buffer = SegmentBuffer::new();
        let mut steps = Vec::new();
        exec.push(type_op("abc"));
        exec.start();
        run(&mut exec, &mut buffer, t0, &mut steps);
        run(&mut exec, &mut buffer, t0 + MS * 25, &mut steps);
        assert_eq!(buffer.to_plain_text(), "ab");
        assert_eq!(exec.next_deadline(), Some(t0 + MS * 30));
    }

    #[test]
    fn test_executor_start_is_idempotent() {
        let mut exec = QueueExecutor::new(timing(false));
        assert!(!exec.start());
        exec.push(type_op("x"));
        assert!(exec.start());
        assert!(!exec.start());
    }

    #[test]
    fn test_executor_pause_preserves_remaining() {
        let t0 = Instant::now();
        let mut exec = QueueExecutor::new(timing(false));
        let mut buffer = SegmentBuffer::new();
        let mut steps = Vec::new();
        exec.push(Operation::PauseFor(MS * 100));
        exec.push(type_op("x"));
        exec.start();
        run(&mut exec, &mut buffer, t0, &mut steps);

        assert!(exec.pause(t0 + MS * 40));
        assert!(!exec.pause(t0 + MS * 41));
        assert_eq!(exec.next_deadline(), None);
        run(&mut exec, &mut buffer, t0 + MS * 500, &mut steps);
        assert_eq!(exec.phase(), Phase::Paused);

        assert!(exec.resume(t0 + MS * 1000));
        assert_eq!(exec.next_deadline(), Some(t0 + MS * 1060));
    }

    #[test]
    fn test_executor_delete_stops_at_empty() {
        let t0 = Instant::now();
        let mut exec = QueueExecutor::new(timing(false));
        let mut buffer = SegmentBuffer::new();
        let mut steps = Vec::new();
        exec.push(type_op("ab"));
        exec.push(Operation::DeleteLetters(10));
        exec.start();
        run(&mut exec, &mut buffer, t0 + Duration::from_secs(1), &mut steps);
        assert!(buffer.is_empty());
        assert_eq!(exec.phase(), Phase::Idle);
    }

    #[test]
    fn test_executor_skip_completes_current_only() {
        let t0 = Instant::now();
        let mut exec = QueueExecutor::new(timing(false));
        let mut buffer = SegmentBuffer::new();
        let mut steps = Vec::new();
        exec.push(type_op("hello"));
        exec.push(type_op("!"));
        exec.start();
        run(&mut exec, &mut buffer, t0, &mut steps);
        let generation = exec.generation();

        assert!(exec.skip(&mut buffer, &mut |step, _, _| steps.push(step)));
        assert!(exec.generation() > generation);
        assert_eq!(buffer.to_plain_text(), "hello");

        run(&mut exec, &mut buffer, t0, &mut steps);
        assert_eq!(exec.next_deadline(), Some(t0 + MS * 10));
    }

    #[test]
    fn test_executor_stop_discards_queue() {
        let mut exec = QueueExecutor::new(timing(true));
        exec.push(type_op("abc"));
        exec.push(Operation::DeleteAll);
        exec.start();
        exec.stop();
        assert_eq!(exec.pending(), 0);
        assert_eq!(exec.phase(), Phase::Idle);
        assert!(!exec.start());
    }

    #[test]
    fn test_executor_loop_rewinds_recorded() {
        let t0 = Instant::now();
        let mut exec = QueueExecutor::new(timing(true));
        let mut buffer = SegmentBuffer::new();
        let mut steps = Vec::new();
        exec.push(type_op("a"));
        exec.push(Operation::DeleteAll);
        exec.start();
        run(&mut exec, &mut buffer, t0 + MS * 15, &mut steps);

        assert_eq!(exec.phase(), Phase::Running);
        assert!(steps.contains(&Step::LoopRestarted(1)));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_executor_loop_pass_restores_start_color() {
        let t0 = Instant::now();
        let mut exec = QueueExecutor::new(Timing {
            type_speed: Duration::ZERO,
            delete_speed: Duration::ZERO,
            ..timing(true)
        });
        let mut buffer = SegmentBuffer::new();
        let mut steps = Vec::new();
        exec.push(type_op("a"));
        exec.push(Operation::Colorize(Some("#f00".into())));
        exec.push(type_op("b"));
        exec.push(Operation::PauseFor(MS * 50));
        exec.push(Operation::DeleteAll);
        exec.start();

        run(&mut exec, &mut buffer, t0, &mut steps);
        let first = buffer.clone();
        assert_eq!(first.segment_count(), 2);

        // The pause elapses, everything is deleted and pass two runs up
        // to its own pause.
        run(&mut exec, &mut buffer, t0 + MS * 50, &mut steps);
        assert!(steps.contains(&Step::LoopRestarted(1)));
        assert_eq!(exec.next_deadline(), Some(t0 + MS * 100));
        assert_eq!(buffer, first);
        assert_eq!(buffer.segments()[0].color, None);
    }

    #[test]
    fn test_executor_zero_time_loop_is_throttled() {
        let t0 = Instant::now();
        let mut exec = QueueExecutor::new(timing(true));
        let mut buffer = SegmentBuffer::new();
        let mut steps = Vec::new();
        exec.push(Operation::Reset);
        exec.start();
        run(&mut exec, &mut buffer, t0, &mut steps);
        assert_eq!(exec.next_deadline(), Some(t0 + MIN_LOOP_GAP));
    }

    #[test]
    fn test_executor_instant_pacing_materializes() {
        let t0 = Instant::now();
        let mut exec = QueueExecutor::new(timing(false));
        let mut buffer = SegmentBuffer::new();
        let mut mutations = 0;
        exec.push(type_op("hello"));
        exec.start();
        exec.advance(&mut buffer, t0, Pacing::Instant, &mut |step, _, _| {
            if step == Step::Mutated {
                mutations += 1;
            }
        });
        assert_eq!(buffer.to_plain_text(), "hello");
        assert_eq!(mutations, 1);
        assert_eq!(exec.phase(), Phase::Idle);
    }

    #[test]
    fn test_executor_typed_newline_becomes_segment() {
        let mut exec = QueueExecutor::new(Timing {
            type_speed: Duration::ZERO,
            ..timing(false)
        });
        let mut buffer = SegmentBuffer::new();
        let mut steps = Vec::new();
        exec.push(type_op("a\nb"));
        exec.start();
        run(&mut exec, &mut buffer, Instant::now(), &mut steps);
        assert_eq!(buffer.segment_count(), 3);
        assert!(buffer.segments()[1].is_new_line);
    }
}

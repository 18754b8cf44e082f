//! Typewriter: The playback controller hosts drive.
//!
//! A [`Typewriter`] owns the segment buffer and the executor. Builder calls
//! append operations; `start()` begins consuming them. The host polls the
//! engine: it reads [`Typewriter::next_wakeup`], arranges to be called back
//! at that deadline, and passes the wakeup's generation to
//! [`Typewriter::on_timer`]. Callbacks from a superseded wait are ignored.
//!
//! ```ignore
//! let mut tw = Typewriter::new(TypewriterConfig::default())?;
//! tw.type_text("Hello").pause_for(Duration::from_millis(500)).delete_all();
//! tw.start();
//! while let Some(wakeup) = tw.next_wakeup() {
//!     std::thread::sleep(wakeup.deadline.saturating_duration_since(Instant::now()));
//!     tw.on_timer(wakeup.generation);
//! }
//! ```

use super::clock::{Clock, SystemClock};
use super::executor::{Pacing, Phase, QueueExecutor, Status, Step, Timing};
use crate::a11y::{Announcement, Announcer};
use crate::actor::{command_for_key, PlaybackCommand};
use crate::buffer::{HighlightStyle, SegmentBuffer};
use crate::config::{AriaLive, TypewriterConfig};
use crate::error::ConfigError;
use crate::events::{EventKind, Listeners, TypewriterEvent};
use crate::queue::{Operation, Script, TypeOptions, WordsFrom};
use crate::state::{CursorHints, PlaybackFlags, TypewriterState};
use crate::window::{VirtualWindow, WindowView};
use crossterm::event::KeyEvent;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Handle returned by [`Typewriter::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// When the engine next needs to run, and the generation to hand back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wakeup {
    /// Instant the armed wait elapses.
    pub deadline: Instant,
    /// Generation to pass to [`Typewriter::on_timer`].
    pub generation: u64,
}

type Subscriber = Box<dyn FnMut(&TypewriterState) + Send>;

/// Everything that observes the engine: snapshot, subscribers, listeners
/// and the announcer.
struct Outlet {
    config: TypewriterConfig,
    window: VirtualWindow,
    cursor: CursorHints,
    /// Effective flag: configured and requested by the host.
    reduced_motion: bool,
    state: TypewriterState,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    listeners: Listeners,
    announcer: Option<Box<dyn Announcer>>,
}

impl Outlet {
    fn new(config: TypewriterConfig) -> Self {
        let cursor = CursorHints::from_config(&config);
        let mut outlet = Self {
            window: VirtualWindow::new(config.max_visible_segments),
            state: TypewriterState::empty(cursor.clone(), PlaybackFlags::empty()),
            cursor,
            config,
            reduced_motion: false,
            subscribers: Vec::new(),
            next_subscription: 0,
            listeners: Listeners::default(),
            announcer: None,
        };
        outlet.state.flags = outlet.flags(Status {
            phase: Phase::Idle,
            finished: false,
        });
        outlet
    }

    fn flags(&self, status: Status) -> PlaybackFlags {
        let mut flags = match status.phase {
            Phase::Idle => PlaybackFlags::empty(),
            Phase::Running => PlaybackFlags::TYPING | PlaybackFlags::CAN_BE_PAUSED,
            Phase::Paused => PlaybackFlags::TYPING | PlaybackFlags::PAUSED,
        };
        if self.config.loop_enabled && flags.contains(PlaybackFlags::TYPING) {
            flags |= PlaybackFlags::LOOPING;
        }
        if self.config.show_cursor && !(self.config.hide_cursor_on_complete && status.finished) {
            flags |= PlaybackFlags::CURSOR_VISIBLE;
        }
        if self.reduced_motion {
            flags |= PlaybackFlags::REDUCED_MOTION;
        }
        flags
    }

    const fn pacing(&self) -> Pacing {
        if self.reduced_motion {
            Pacing::Instant
        } else {
            Pacing::Paced
        }
    }

    fn publish(&mut self, buffer: &SegmentBuffer, status: Status) {
        self.state =
            TypewriterState::capture(buffer, &self.window, self.flags(status), self.cursor.clone());
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.state);
        }
    }

    fn handle(&mut self, step: Step, buffer: &SegmentBuffer, status: Status) {
        match step {
            Step::Mutated => self.publish(buffer, status),
            Step::Typed(text) => self.announce(text),
            Step::LoopRestarted(iteration) => {
                self.listeners.emit(&TypewriterEvent::Loop { iteration });
            }
            Step::Drained => {
                self.publish(buffer, status);
                self.listeners.emit(&TypewriterEvent::TypeEnd);
            }
        }
    }

    fn announce(&mut self, text: String) {
        if self.config.aria_live == AriaLive::Off {
            return;
        }
        let Some(announcer) = self.announcer.as_mut() else {
            return;
        };
        trace!(chars = text.len(), "announcing completed text");
        announcer.announce(&Announcement {
            text,
            politeness: self.config.aria_live,
            label: self.config.aria_label.clone(),
            role: self.config.role.clone(),
        });
    }

    fn clear_callbacks(&mut self) {
        self.subscribers.clear();
        self.listeners.clear();
        self.announcer = None;
    }
}

/// A typewriter animation engine.
///
/// Builder methods return `&mut Self` so calls chain:
///
/// ```ignore
/// tw.type_text("Hello")
///     .pause_for(Duration::from_millis(300))
///     .delete_letters(5)
///     .colorize("#0af")
///     .type_text("World");
/// ```
pub struct Typewriter {
    clock: Arc<dyn Clock>,
    executor: QueueExecutor,
    buffer: SegmentBuffer,
    outlet: Outlet,
    /// The host's motion-reduction preference.
    prefers_reduced_motion: bool,
}

impl Typewriter {
    /// Create a typewriter driven by the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn new(config: TypewriterConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a typewriter reading time from `clock`.
    ///
    /// # Arguments
    ///
    /// * `config` - Speeds, looping, cursor and accessibility options.
    /// * `clock` - Time source; tests pass a [`ManualClock`](super::ManualClock).
    ///
    /// # Returns
    ///
    /// An idle typewriter with an empty buffer and queue.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn with_clock(config: TypewriterConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;
        let executor = QueueExecutor::new(Timing {
            type_speed: config.type_speed,
            delete_speed: config.delete_speed,
            loop_enabled: config.loop_enabled,
            loop_delay: config.loop_delay,
        });
        debug!(
            type_speed = ?config.type_speed,
            delete_speed = ?config.delete_speed,
            loop_enabled = config.loop_enabled,
            "typewriter created"
        );
        Ok(Self {
            clock,
            executor,
            buffer: SegmentBuffer::new(),
            outlet: Outlet::new(config),
            prefers_reduced_motion: false,
        })
    }

    /// The configuration this engine was built with.
    pub const fn config(&self) -> &TypewriterConfig {
        &self.outlet.config
    }

    // ========================================================================
    // Builder
    // ========================================================================

    /// Append an operation to the queue.
    pub fn enqueue(&mut self, op: Operation) -> &mut Self {
        trace!(op = op.name(), "enqueue");
        self.executor.push(op);
        self
    }

    /// Type `text` at the configured speed.
    pub fn type_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.type_text_with(text, TypeOptions::default())
    }

    /// Type `text` with per-operation options.
    pub fn type_text_with(&mut self, text: impl Into<String>, options: TypeOptions) -> &mut Self {
        self.enqueue(Operation::Type {
            text: text.into(),
            options,
        })
    }

    /// Delete `count` trailing graphemes.
    pub fn delete_letters(&mut self, count: usize) -> &mut Self {
        self.enqueue(Operation::DeleteLetters(count))
    }

    /// Delete `count` trailing words.
    pub fn delete_words(&mut self, count: usize) -> &mut Self {
        self.enqueue(Operation::DeleteWords(count))
    }

    /// Delete everything typed so far.
    pub fn delete_all(&mut self) -> &mut Self {
        self.enqueue(Operation::DeleteAll)
    }

    /// Wait before the next operation.
    pub fn pause_for(&mut self, duration: Duration) -> &mut Self {
        self.enqueue(Operation::PauseFor(duration))
    }

    /// Color subsequently typed text. An empty color clears it.
    pub fn colorize(&mut self, color: impl Into<String>) -> &mut Self {
        let color = color.into();
        self.enqueue(Operation::Colorize((!color.is_empty()).then_some(color)))
    }

    /// Type subsequent text without a color.
    pub fn clear_color(&mut self) -> &mut Self {
        self.enqueue(Operation::Colorize(None))
    }

    /// Highlight `length` already-typed graphemes starting at `start`.
    pub fn highlight(&mut self, start: usize, length: usize, style: HighlightStyle) -> &mut Self {
        self.enqueue(Operation::Highlight {
            start,
            length,
            style,
        })
    }

    /// Highlight `count` words counted from one end of the buffer.
    pub fn highlight_words(
        &mut self,
        count: usize,
        from: WordsFrom,
        style: HighlightStyle,
    ) -> &mut Self {
        self.enqueue(Operation::HighlightWords { count, from, style })
    }

    /// Append a line break.
    pub fn new_line(&mut self) -> &mut Self {
        self.enqueue(Operation::NewLine)
    }

    /// Clear the buffer when this point in the queue is reached.
    pub fn reset_text(&mut self) -> &mut Self {
        self.enqueue(Operation::Reset)
    }

    /// Append every step of a script.
    pub fn enqueue_script(&mut self, script: &Script) -> &mut Self {
        for op in script.to_operations() {
            self.enqueue(op);
        }
        self
    }

    // ========================================================================
    // Playback control
    // ========================================================================

    /// Begin consuming the queue.
    ///
    /// Returns `false` without firing any event if playback is already
    /// active or nothing is queued.
    pub fn start(&mut self) -> bool {
        if !self.executor.start() {
            return false;
        }
        self.outlet.listeners.emit(&TypewriterEvent::TypeStart);
        self.publish();
        self.advance();
        true
    }

    /// Suspend playback, preserving the remaining time of the current wait.
    pub fn pause(&mut self) -> bool {
        let now = self.clock.now();
        if !self.executor.pause(now) {
            return false;
        }
        self.publish();
        true
    }

    /// Continue after [`pause`](Self::pause).
    pub fn resume(&mut self) -> bool {
        let now = self.clock.now();
        if !self.executor.resume(now) {
            return false;
        }
        self.publish();
        self.advance();
        true
    }

    /// Pause if running, resume if paused.
    pub fn toggle_pause(&mut self) -> bool {
        match self.executor.phase() {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            Phase::Idle => false,
        }
    }

    /// Complete the current operation immediately.
    ///
    /// Later operations keep their own timing. A paused engine stays paused.
    pub fn skip(&mut self) -> bool {
        let Self {
            executor,
            buffer,
            outlet,
            ..
        } = self;
        // The phase is unchanged; the completed step publishes its own mutation.
        if !executor.skip(buffer, &mut |step, buf, status| outlet.handle(step, buf, status)) {
            return false;
        }
        self.advance();
        true
    }

    /// Cancel the current wait and discard every queued operation.
    ///
    /// The buffer is left as it is.
    pub fn stop(&mut self) {
        let was_active = self.executor.phase() != Phase::Idle;
        self.executor.stop();
        if was_active {
            self.publish();
        }
    }

    /// Stop, clear the buffer and forget the typing color.
    pub fn reset(&mut self) {
        self.executor.reset();
        self.buffer.clear();
        debug!("typewriter reset");
        self.publish();
    }

    /// Cancel everything and drop every subscriber, listener and announcer.
    pub fn destroy(&mut self) {
        self.executor.stop();
        self.outlet.clear_callbacks();
        debug!("typewriter destroyed");
    }

    /// Apply all work due at the clock's current instant.
    pub fn advance(&mut self) {
        let now = self.clock.now();
        let pacing = self.outlet.pacing();
        let Self {
            executor,
            buffer,
            outlet,
            ..
        } = self;
        executor.advance(buffer, now, pacing, &mut |step, buf, status| {
            outlet.handle(step, buf, status);
        });
    }

    /// Timer callback for a wakeup. Stale generations are ignored.
    pub fn on_timer(&mut self, generation: u64) -> bool {
        if generation != self.executor.generation() {
            trace!(
                generation,
                current = self.executor.generation(),
                "stale timer ignored"
            );
            return false;
        }
        self.advance();
        true
    }

    /// The next time the engine needs to run, if playback is running.
    pub fn next_wakeup(&self) -> Option<Wakeup> {
        self.executor.next_deadline().map(|deadline| Wakeup {
            deadline,
            generation: self.executor.generation(),
        })
    }

    /// Apply a command, returning whether it had an effect.
    pub fn apply(&mut self, command: PlaybackCommand) -> bool {
        trace!(command = command.name(), "apply");
        match command {
            PlaybackCommand::Start => self.start(),
            PlaybackCommand::Pause => self.pause(),
            PlaybackCommand::Resume => self.resume(),
            PlaybackCommand::TogglePause => self.toggle_pause(),
            PlaybackCommand::Skip => self.skip(),
            PlaybackCommand::Stop => {
                self.stop();
                true
            }
            PlaybackCommand::Reset => {
                self.reset();
                true
            }
            PlaybackCommand::Enqueue(op) => {
                self.enqueue(op);
                true
            }
            PlaybackCommand::Key(key) => self.handle_key(key),
            PlaybackCommand::ReducedMotion(prefers) => self.set_prefers_reduced_motion(prefers),
            PlaybackCommand::Shutdown => {
                self.destroy();
                true
            }
        }
    }

    /// Handle a keyboard control. Ignored unless keyboard controls are
    /// enabled in the configuration.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if !self.outlet.config.enable_keyboard_controls {
            return false;
        }
        match command_for_key(key) {
            Some(command) => {
                debug!(command = command.name(), "keyboard control");
                self.apply(command)
            }
            None => false,
        }
    }

    /// Record the host's motion-reduction preference. Takes effect from the
    /// next text operation step. Returns whether the effective flag changed.
    pub fn set_prefers_reduced_motion(&mut self, prefers: bool) -> bool {
        self.prefers_reduced_motion = prefers;
        let effective = self.outlet.config.respect_reduced_motion && prefers;
        if effective == self.outlet.reduced_motion {
            return false;
        }
        self.outlet.reduced_motion = effective;
        debug!(reduced_motion = effective, "motion preference changed");
        self.publish();
        true
    }

    /// The host's last reported motion-reduction preference.
    pub const fn prefers_reduced_motion(&self) -> bool {
        self.prefers_reduced_motion
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// The latest snapshot.
    pub const fn state(&self) -> &TypewriterState {
        &self.outlet.state
    }

    /// Current execution phase.
    pub const fn phase(&self) -> Phase {
        self.executor.phase()
    }

    /// Operations not yet consumed in the current pass.
    pub fn pending(&self) -> usize {
        self.executor.pending()
    }

    /// Project the virtualization window over the live buffer.
    pub fn window_view(&self) -> WindowView<'_> {
        self.outlet.window.project(self.buffer.segments())
    }

    /// Call `subscriber` with every new snapshot.
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&TypewriterState) + Send + 'static,
    {
        let id = SubscriptionId(self.outlet.next_subscription);
        self.outlet.next_subscription += 1;
        self.outlet.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.outlet.subscribers.len();
        self.outlet.subscribers.retain(|(sid, _)| *sid != id);
        self.outlet.subscribers.len() != before
    }

    /// Register a lifecycle listener. Listeners run in registration order.
    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> &mut Self
    where
        F: FnMut(&TypewriterEvent) + Send + 'static,
    {
        self.outlet.listeners.add(kind, Box::new(listener));
        self
    }

    /// Install the collaborator receiving completed-text announcements.
    pub fn set_announcer(&mut self, announcer: impl Announcer + 'static) {
        self.outlet.announcer = Some(Box::new(announcer));
    }

    fn publish(&mut self) {
        let status = self.executor.status();
        self.outlet.publish(&self.buffer, status);
    }
}

impl fmt::Debug for Typewriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typewriter")
            .field("phase", &self.executor.phase())
            .field("pending", &self.executor.pending())
            .field("text", &self.outlet.state.current_text)
            .finish_non_exhaustive()
    }
}

impl Drop for Typewriter {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ManualClock;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::Mutex;

    const MS: Duration = Duration::from_millis(1);

    fn typewriter(config: TypewriterConfig) -> (Typewriter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let tw = Typewriter::with_clock(config, Arc::clone(&clock) as Arc<dyn Clock>).unwrap();
        (tw, clock)
    }

    fn tick(tw: &mut Typewriter, clock: &ManualClock, by: Duration) {
        clock.advance(by);
        tw.advance();
    }

    #[test]
    fn test_typewriter_rejects_invalid_config() {
        let config = TypewriterConfig {
            max_visible_segments: Some(0),
            ..TypewriterConfig::default()
        };
        assert!(Typewriter::new(config).is_err());
    }

    #[test]
    fn test_typewriter_initial_state() {
        let (tw, _) = typewriter(TypewriterConfig::default());
        let state = tw.state();
        assert!(state.segments.is_empty());
        assert!(!state.is_typing());
        assert!(state.cursor_visible());
        assert_eq!(tw.phase(), Phase::Idle);
    }

    #[test]
    fn test_typewriter_stale_timer_ignored() {
        let (mut tw, clock) = typewriter(TypewriterConfig::default());
        tw.type_text("ab");
        tw.start();
        let wakeup = tw.next_wakeup().unwrap();
        tw.pause();
        tw.resume();
        clock.advance(MS * 50);
        assert!(!tw.on_timer(wakeup.generation));
        assert_eq!(tw.state().current_text, "");

        let fresh = tw.next_wakeup().unwrap();
        assert!(tw.on_timer(fresh.generation));
        assert_eq!(tw.state().current_text, "a");
    }

    #[test]
    fn test_typewriter_subscribers_see_each_grapheme() {
        let (mut tw, clock) = typewriter(TypewriterConfig::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        tw.subscribe(move |state| sink.lock().unwrap().push(state.current_text.clone()));
        tw.type_text("ok").start();
        tick(&mut tw, &clock, MS * 100);

        let seen = seen.lock().unwrap();
        assert!(seen.contains(&"o".to_string()));
        assert_eq!(seen.last().map(String::as_str), Some("ok"));
    }

    fn count_publications(tw: &mut Typewriter) -> Arc<Mutex<usize>> {
        let hits = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&hits);
        tw.subscribe(move |_| *counter.lock().unwrap() += 1);
        hits
    }

    #[test]
    fn test_typewriter_skip_publishes_once() {
        let (mut tw, clock) = typewriter(TypewriterConfig::default());
        tw.type_text("Hello").type_text("!").start();
        tick(&mut tw, &clock, MS * 50);
        let hits = count_publications(&mut tw);

        assert!(tw.skip());
        assert_eq!(tw.state().current_text, "Hello");
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_typewriter_stop_when_idle_publishes_nothing() {
        let (mut tw, _) = typewriter(TypewriterConfig::default());
        let hits = count_publications(&mut tw);
        tw.stop();
        tw.type_text("queued").stop();
        assert_eq!(*hits.lock().unwrap(), 0);
        assert_eq!(tw.pending(), 0);

        tw.type_text("abc").start();
        let before = *hits.lock().unwrap();
        tw.stop();
        assert_eq!(*hits.lock().unwrap(), before + 1);
        assert!(!tw.state().is_typing());
    }

    #[test]
    fn test_typewriter_unsubscribe() {
        let (mut tw, _) = typewriter(TypewriterConfig::default());
        let id = tw.subscribe(|_| {});
        assert!(tw.unsubscribe(id));
        assert!(!tw.unsubscribe(id));
    }

    #[test]
    fn test_typewriter_keyboard_gated_by_config() {
        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);

        let (mut tw, _) = typewriter(TypewriterConfig::default());
        tw.type_text("abc").start();
        assert!(!tw.handle_key(space));
        assert_eq!(tw.phase(), Phase::Running);

        let (mut tw, _) = typewriter(TypewriterConfig {
            enable_keyboard_controls: true,
            ..TypewriterConfig::default()
        });
        tw.type_text("abc").start();
        assert!(tw.handle_key(space));
        assert_eq!(tw.phase(), Phase::Paused);
        assert!(tw.handle_key(space));
        assert_eq!(tw.phase(), Phase::Running);
    }

    #[test]
    fn test_typewriter_reduced_motion_respects_config() {
        let (mut tw, _) = typewriter(TypewriterConfig {
            respect_reduced_motion: false,
            ..TypewriterConfig::default()
        });
        assert!(!tw.set_prefers_reduced_motion(true));
        assert!(tw.prefers_reduced_motion());
        assert!(!tw.state().reduced_motion());

        let (mut tw, _) = typewriter(TypewriterConfig::default());
        assert!(tw.set_prefers_reduced_motion(true));
        assert!(tw.state().reduced_motion());
        tw.type_text("instant").start();
        assert_eq!(tw.state().current_text, "instant");
        assert!(!tw.state().is_typing());
    }

    #[test]
    fn test_typewriter_destroy_clears_callbacks() {
        let (mut tw, clock) = typewriter(TypewriterConfig::default());
        let hits = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&hits);
        tw.subscribe(move |_| *counter.lock().unwrap() += 1);
        tw.type_text("abc").start();
        let before = *hits.lock().unwrap();

        tw.destroy();
        assert_eq!(tw.next_wakeup(), None);
        tw.type_text("more").start();
        tick(&mut tw, &clock, MS * 500);
        assert_eq!(*hits.lock().unwrap(), before);
    }
}

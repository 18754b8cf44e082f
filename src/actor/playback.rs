//! Playback Actor: Dedicated thread that drives a typewriter in real time.
//!
//! The thread sleeps until either a command arrives or the typewriter's
//! next wakeup is due, using `select!` over the command channel and a
//! deadline channel. It never busy-waits: with nothing armed it blocks on
//! commands alone.

use super::messages::PlaybackCommand;
use crate::engine::Typewriter;
use crate::state::TypewriterState;
use crossbeam_channel::{at, bounded, never, select, unbounded, Receiver, Sender};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Playback actor that owns a typewriter on its own thread.
///
/// The typewriter should use the system clock; wakeup deadlines are slept
/// on in wall time.
pub struct PlaybackActor {
    /// Handle to the playback thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    /// Command sender.
    command_tx: Sender<PlaybackCommand>,
    /// Snapshots published by the typewriter.
    state_rx: Receiver<TypewriterState>,
}

impl PlaybackActor {
    /// Move `typewriter` onto a new playback thread.
    ///
    /// Every snapshot the typewriter publishes is forwarded to
    /// [`states`](Self::states). The snapshot channel is unbounded, so the
    /// host must keep draining it; use [`spawn_bounded`](Self::spawn_bounded)
    /// when it may fall behind.
    ///
    /// # Arguments
    ///
    /// * `typewriter` - The engine to drive, usually on the system clock.
    ///
    /// # Returns
    ///
    /// The playback actor handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(mut typewriter: Typewriter) -> io::Result<Self> {
        let (state_tx, state_rx) = unbounded();
        typewriter.subscribe(move |state| {
            let _ = state_tx.send(state.clone());
        });
        Self::spawn_with(typewriter, state_rx)
    }

    /// Like [`spawn`](Self::spawn), but holding at most `capacity` snapshots.
    ///
    /// Snapshots published while the channel is full are dropped, so a slow
    /// host sees a gap rather than a growing backlog.
    ///
    /// # Arguments
    ///
    /// * `typewriter` - The engine to drive, usually on the system clock.
    /// * `capacity` - Snapshots buffered before new ones are dropped.
    ///
    /// # Returns
    ///
    /// The playback actor handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn_bounded(mut typewriter: Typewriter, capacity: usize) -> io::Result<Self> {
        let (state_tx, state_rx) = bounded(capacity);
        typewriter.subscribe(move |state| {
            // Non-blocking: if the host is behind, skip this snapshot
            let _ = state_tx.try_send(state.clone());
        });
        Self::spawn_with(typewriter, state_rx)
    }

    fn spawn_with(typewriter: Typewriter, state_rx: Receiver<TypewriterState>) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = Arc::clone(&shutdown);
        let (command_tx, command_rx) = unbounded();

        let handle = thread::Builder::new()
            .name("quill-playback".to_string())
            .spawn(move || Self::run_loop(typewriter, &command_rx, &shutdown_clone))?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
            command_tx,
            state_rx,
        })
    }

    /// Send a command. Returns `false` if the thread has exited.
    pub fn send(&self, command: PlaybackCommand) -> bool {
        self.command_tx.send(command).is_ok()
    }

    /// A sender for other threads (the input actor, for example).
    pub fn sender(&self) -> Sender<PlaybackCommand> {
        self.command_tx.clone()
    }

    /// Snapshots in publication order.
    ///
    /// The channel disconnects once the playback thread has destroyed the
    /// typewriter.
    #[inline]
    pub const fn states(&self) -> &Receiver<TypewriterState> {
        &self.state_rx
    }

    /// Signal the playback thread to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // Wake the thread if it is blocked on the command channel.
        let _ = self.command_tx.send(PlaybackCommand::Shutdown);
    }

    /// Wait for the playback thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop(
        mut typewriter: Typewriter,
        commands: &Receiver<PlaybackCommand>,
        shutdown: &AtomicBool,
    ) {
        debug!("playback thread started");
        while !shutdown.load(Ordering::Relaxed) {
            let wakeup = typewriter.next_wakeup();
            let timer = wakeup.map_or_else(never, |w| at(w.deadline));

            select! {
                recv(commands) -> command => match command {
                    Ok(PlaybackCommand::Shutdown) | Err(_) => break,
                    Ok(command) => {
                        typewriter.apply(command);
                    }
                },
                recv(timer) -> _ => {
                    if let Some(wakeup) = wakeup {
                        typewriter.on_timer(wakeup.generation);
                    }
                }
            }
        }
        typewriter.destroy();
        debug!("playback thread stopped");
    }
}

impl Drop for PlaybackActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TypewriterConfig;
    use std::time::Duration;

    fn fast_typewriter() -> Typewriter {
        let config = TypewriterConfig {
            type_speed: Duration::from_millis(1),
            delete_speed: Duration::from_millis(1),
            ..TypewriterConfig::default()
        };
        Typewriter::new(config).unwrap()
    }

    #[test]
    fn test_playback_types_in_real_time() {
        let mut tw = fast_typewriter();
        tw.type_text("hey");
        let actor = PlaybackActor::spawn(tw).unwrap();
        assert!(actor.send(PlaybackCommand::Start));

        let last = loop {
            let state = actor
                .states()
                .recv_timeout(Duration::from_secs(2))
                .unwrap();
            if !state.is_typing() {
                break state;
            }
        };
        assert_eq!(last.current_text, "hey");
        actor.join();
    }

    #[test]
    fn test_playback_enqueue_over_channel() {
        let actor = PlaybackActor::spawn(fast_typewriter()).unwrap();
        let sender = actor.sender();
        sender
            .send(PlaybackCommand::Enqueue(crate::queue::Operation::NewLine))
            .unwrap();
        sender.send(PlaybackCommand::Start).unwrap();

        let state = actor
            .states()
            .iter()
            .find(|s| !s.is_typing() && !s.segments.is_empty())
            .unwrap();
        assert_eq!(state.current_text, "\n");
        actor.join();
    }

    #[test]
    fn test_playback_bounded_drops_excess_snapshots() {
        let config = TypewriterConfig {
            type_speed: Duration::ZERO,
            ..TypewriterConfig::default()
        };
        let mut tw = Typewriter::new(config).unwrap();
        tw.type_text("a long line of text");
        let actor = PlaybackActor::spawn_bounded(tw, 2).unwrap();
        let states = actor.states().clone();
        actor.send(PlaybackCommand::Start);
        actor.join();

        assert_eq!(states.try_iter().count(), 2);
    }

    #[test]
    fn test_playback_shutdown_disconnects_states() {
        let actor = PlaybackActor::spawn(fast_typewriter()).unwrap();
        let states = actor.states().clone();
        actor.join();
        assert!(states.recv_timeout(Duration::from_secs(1)).is_err());
    }
}

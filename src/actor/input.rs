//! Input Actor: Keyboard bindings and a thread polling terminal keys.
//!
//! Bindings follow the usual typewriter controls:
//! - **Space**: pause or resume
//! - **Escape**: skip the current operation
//! - **R**: reset
//!
//! Only plain key presses count; releases, repeats and chorded keys
//! (Ctrl, Alt, Super) are ignored.

use super::messages::PlaybackCommand;
use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::warn;

/// Map a key event to the playback command it is bound to.
pub fn command_for_key(key: KeyEvent) -> Option<PlaybackCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
    {
        return None;
    }
    match key.code {
        KeyCode::Char(' ') => Some(PlaybackCommand::TogglePause),
        KeyCode::Esc => Some(PlaybackCommand::Skip),
        KeyCode::Char('r' | 'R') => Some(PlaybackCommand::Reset),
        _ => None,
    }
}

/// Input actor that forwards terminal key presses.
///
/// The actor does not interpret keys; the host decides which ones reach
/// the typewriter (usually as [`PlaybackCommand::Key`]).
pub struct InputActor {
    /// Handle to the input thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

impl InputActor {
    /// Spawn the input thread.
    ///
    /// # Arguments
    ///
    /// * `sender` - Channel to send key presses to the host.
    /// * `poll_timeout` - How long to wait for events before checking shutdown.
    ///
    /// # Returns
    ///
    /// The input actor handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(sender: Sender<KeyEvent>, poll_timeout: Duration) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("quill-input".to_string())
            .spawn(move || Self::run_loop(&sender, &shutdown_clone, poll_timeout))?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
        })
    }

    /// Signal the input thread to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the input thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop(sender: &Sender<KeyEvent>, shutdown: &AtomicBool, poll_timeout: Duration) {
        while !shutdown.load(Ordering::Relaxed) {
            match event::poll(poll_timeout) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        if sender.send(key).is_err() {
                            // Receiver dropped
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "failed to read terminal event");
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "failed to poll terminal events");
                    break;
                }
            }
        }
    }
}

impl Drop for InputActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(
            command_for_key(press(KeyCode::Char(' '))),
            Some(PlaybackCommand::TogglePause)
        );
        assert_eq!(command_for_key(press(KeyCode::Esc)), Some(PlaybackCommand::Skip));
        assert_eq!(
            command_for_key(press(KeyCode::Char('r'))),
            Some(PlaybackCommand::Reset)
        );
        assert_eq!(
            command_for_key(KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT)),
            Some(PlaybackCommand::Reset)
        );
        assert_eq!(command_for_key(press(KeyCode::Enter)), None);
    }

    #[test]
    fn test_key_release_and_chords_ignored() {
        let mut release = press(KeyCode::Esc);
        release.kind = KeyEventKind::Release;
        assert_eq!(command_for_key(release), None);

        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(command_for_key(ctrl_r), None);
    }
}

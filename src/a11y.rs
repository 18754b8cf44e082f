//! Accessibility announcer: Screen-reader text derived from completed typing.
//!
//! The engine renders nothing. When a `Type` operation completes it hands an
//! [`Announcement`] to the installed [`Announcer`]; the host decides how to
//! update its live region.

use crate::config::AriaLive;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// Text for an ARIA live region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// The text to announce.
    pub text: String,
    /// Live-region politeness.
    pub politeness: AriaLive,
    /// Accessible label of the typewriter.
    pub label: Option<String>,
    /// Accessible role of the typewriter.
    pub role: String,
}

/// Receives one announcement per completed `Type` operation.
pub trait Announcer: Send {
    /// Deliver an announcement.
    fn announce(&mut self, announcement: &Announcement);
}

impl<F> Announcer for F
where
    F: FnMut(&Announcement) + Send,
{
    fn announce(&mut self, announcement: &Announcement) {
        self(announcement);
    }
}

#[derive(Debug, Default)]
struct LiveRegionInner {
    history: VecDeque<Announcement>,
}

/// Reference announcer keeping the latest message and a bounded history.
///
/// Clones share the same region, so the host can keep one handle and give
/// another to the engine.
#[derive(Debug, Clone)]
pub struct LiveRegion {
    inner: Arc<Mutex<LiveRegionInner>>,
    capacity: usize,
}

impl LiveRegion {
    /// Create a region keeping at most `capacity` announcements.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LiveRegionInner::default())),
            capacity: capacity.max(1),
        }
    }

    /// The most recent announcement.
    pub fn latest(&self) -> Option<Announcement> {
        self.lock().history.back().cloned()
    }

    /// All retained announcements, oldest first.
    pub fn history(&self) -> Vec<Announcement> {
        self.lock().history.iter().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LiveRegionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LiveRegion {
    fn default() -> Self {
        Self::new(32)
    }
}

impl Announcer for LiveRegion {
    fn announce(&mut self, announcement: &Announcement) {
        let capacity = self.capacity;
        let mut inner = self.lock();
        while inner.history.len() >= capacity {
            inner.history.pop_front();
        }
        inner.history.push_back(announcement.clone());
    }
}

//! Lifecycle events and their listener registry.

/// Event names accepted by [`Typewriter::on`](crate::Typewriter::on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Playback went from idle to running.
    TypeStart,
    /// The queue drained without looping.
    TypeEnd,
    /// A loop iteration restarted.
    Loop,
}

/// A lifecycle event delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypewriterEvent {
    /// Playback went from idle to running.
    TypeStart,
    /// The queue drained without looping.
    TypeEnd,
    /// A loop iteration restarted.
    Loop {
        /// Restart count, starting at 1.
        iteration: u64,
    },
}

impl TypewriterEvent {
    /// The kind listeners register for.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::TypeStart => EventKind::TypeStart,
            Self::TypeEnd => EventKind::TypeEnd,
            Self::Loop { .. } => EventKind::Loop,
        }
    }
}

type Listener = Box<dyn FnMut(&TypewriterEvent) + Send>;

/// Listeners in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: Vec<(EventKind, Listener)>,
}

impl Listeners {
    pub(crate) fn add(&mut self, kind: EventKind, listener: Listener) {
        self.entries.push((kind, listener));
    }

    pub(crate) fn emit(&mut self, event: &TypewriterEvent) {
        let kind = event.kind();
        for (_, listener) in self.entries.iter_mut().filter(|(k, _)| *k == kind) {
            listener(event);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

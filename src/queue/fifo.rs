//! Operation queue: Pending FIFO plus the recorded script used for looping.

use super::operation::Operation;
use std::collections::VecDeque;

/// Strict FIFO of pending operations.
///
/// Every pushed operation is also recorded, so a loop restart can replay the
/// original sequence without the caller re-issuing builder calls.
#[derive(Debug, Clone, Default)]
pub struct OperationQueue {
    /// Operations not yet consumed in the current pass.
    pending: VecDeque<Operation>,
    /// Every operation pushed since the last discard, in order.
    recorded: Vec<Operation>,
}

impl OperationQueue {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            recorded: Vec::new(),
        }
    }

    /// Append an operation to the tail.
    pub fn push(&mut self, op: Operation) {
        self.recorded.push(op.clone());
        self.pending.push_back(op);
    }

    /// Take the next pending operation.
    pub fn pop(&mut self) -> Option<Operation> {
        self.pending.pop_front()
    }

    /// Refill the pending queue from the recorded script.
    pub fn rewind(&mut self) {
        self.pending = self.recorded.iter().cloned().collect();
    }

    /// Drop every pending and recorded operation.
    pub fn discard(&mut self) {
        self.pending.clear();
        self.recorded.clear();
    }

    /// Forget the recorded script, keeping pending operations.
    pub fn forget_recorded(&mut self) {
        self.recorded.clear();
        self.recorded.extend(self.pending.iter().cloned());
    }

    /// Number of pending operations.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if no operation is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of recorded operations.
    pub fn recorded_len(&self) -> usize {
        self.recorded.len()
    }
}

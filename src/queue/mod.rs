//! Operation queue and the script model that feeds it.
//!
//! Builder calls on [`Typewriter`](crate::Typewriter) and loaded
//! [`Script`]s both end up as [`Operation`]s appended to an
//! [`OperationQueue`]. The queue is a strict FIFO; the executor consumes each
//! operation exactly once per pass.

mod fifo;
mod operation;
mod script;
pub mod words;

pub use fifo::OperationQueue;
pub use operation::{Operation, TypeOptions, WordsFrom};
pub use script::{HighlightStep, HighlightWordsStep, Script, ScriptStep, TypeStep};

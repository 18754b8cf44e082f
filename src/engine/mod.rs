//! Engine: Timing, execution and playback control.
//!
//! - **Clock**: where "now" comes from (system or manual)
//! - **Executor**: consumes the operation queue against the segment buffer
//! - **Typewriter**: the controller hosts build, start and observe
//!
//! The engine never sleeps and never spawns threads. Hosts either poll it
//! with [`Typewriter::next_wakeup`] / [`Typewriter::on_timer`], or hand it
//! to a [`PlaybackActor`](crate::actor::PlaybackActor).

mod clock;
mod executor;
mod typewriter;
mod wait;

pub use clock::{Clock, ManualClock, SystemClock};
pub use executor::{Phase, MIN_LOOP_GAP};
pub use typewriter::{SubscriptionId, Typewriter, Wakeup};

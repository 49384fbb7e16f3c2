//! Worker primitives shared by the sift search runtime.
//!
//! * [`spawn`] attaches tasks to the current tokio runtime, falling back to a
//!   small process-wide runtime when called from synchronous code.
//! * [`SettledJoinSet`] joins keyed tasks without letting one failure cancel
//!   its siblings.
//! * [`GenerationClock`] hands out monotonic batch generations.

mod class;
mod join_set;
mod spawn;
mod token;

pub use class::TaskClass;
pub use join_set::{SettledJoinSet, panic_message};
pub use spawn::{current_handle, spawn};
pub use token::GenerationClock;

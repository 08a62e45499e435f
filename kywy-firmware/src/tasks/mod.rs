//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod battery;
pub mod input;

pub use battery::battery_task;
pub use input::input_task;

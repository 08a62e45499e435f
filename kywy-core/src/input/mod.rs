//! Button input pipeline
//!
//! Raw pin levels go through a per-button debounce state machine which
//! emits [`ButtonEvent`]s on confirmed transitions only. The machine is
//! advanced by an external periodic tick; it never blocks and never
//! buffers events across ticks.

mod debounce;
mod event;

pub use debounce::{ButtonBank, DebounceConfig, Debouncer};
pub use event::{ButtonEvent, ButtonId, ButtonState};

//! Board-agnostic core logic for the Kywy handheld
//!
//! This crate contains all device logic that does not depend on specific
//! hardware implementations:
//!
//! - Button identity, state, and event types
//! - Debounce state machine for raw button input
//! - Battery voltage classification
//! - Packed 1-bpp framebuffer with dirty-line tracking
//! - Sprite sheet and animation engine
//! - Capability traits implemented by board support code

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod battery;
pub mod framebuffer;
pub mod input;
pub mod sprite;
pub mod traits;

//! Hardware driver implementations for the Kywy handheld
//!
//! Drivers are generic over the capability traits in
//! [`kywy_core::traits`] and over [`embedded_hal_async::spi::SpiDevice`]
//! for the display transport, so every driver can be exercised on the
//! host with mock hardware.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod battery;
pub mod buttons;
pub mod display;

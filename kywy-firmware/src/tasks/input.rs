//! Button scan task
//!
//! Drives the debouncing scanner on a fixed tick and forwards confirmed
//! events to the main loop. The scanner itself never waits; this task
//! is its external tick source.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use crate::board::Buttons;
use crate::channels::BUTTON_EVENTS;

/// Scan period; four samples fit inside one debounce interval
pub const SCAN_INTERVAL_MS: u64 = 5;

#[embassy_executor::task]
pub async fn input_task(mut buttons: Buttons) {
    info!("Input task started");

    let mut ticker = Ticker::every(Duration::from_millis(SCAN_INTERVAL_MS));

    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis() as u32;

        for event in buttons.poll(now_ms) {
            if BUTTON_EVENTS.try_send(event).is_err() {
                warn!("Button event queue full, dropping {}", event);
            }
        }
    }
}

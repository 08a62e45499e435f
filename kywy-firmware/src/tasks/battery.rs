//! Battery sample task
//!
//! Periodically samples the battery and publishes the latest status.
//! Transitions are logged; the raw status stream is left to the main
//! loop to debounce if it needs hysteresis.

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::board::Battery;
use crate::channels::BATTERY_STATUS;

/// Sample period
pub const SAMPLE_INTERVAL_SECS: u64 = 2;

#[embassy_executor::task]
pub async fn battery_task(mut battery: Battery) {
    info!("Battery task started");

    let mut ticker = Ticker::every(Duration::from_secs(SAMPLE_INTERVAL_SECS));
    let mut last = None;

    loop {
        ticker.next().await;

        let status = battery.read().await;
        if last != Some(status) {
            info!("Battery status: {}", status);
            last = Some(status);
        }
        BATTERY_STATUS.signal(status);
    }
}

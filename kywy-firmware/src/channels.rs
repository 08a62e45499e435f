//! Inter-task communication channels
//!
//! Static embassy-sync primitives connecting the scan/sample tasks to
//! the main loop.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use kywy_core::battery::BatteryStatus;
use kywy_core::input::ButtonEvent;

/// Channel capacity for debounced button events
pub const BUTTON_CHANNEL_CAPACITY: usize = 16;

/// Debounced button events from the scan task
///
/// When the consumer lags the scan task drops events instead of
/// stalling the scan.
pub static BUTTON_EVENTS: Channel<CriticalSectionRawMutex, ButtonEvent, BUTTON_CHANNEL_CAPACITY> =
    Channel::new();

/// Latest battery status from the sample task
pub static BATTERY_STATUS: Signal<CriticalSectionRawMutex, BatteryStatus> = Signal::new();

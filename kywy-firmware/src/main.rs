//! Kywy handheld firmware
//!
//! Bring-up binary for the RP2040-based Kywy board: composes the
//! display, button, and battery drivers, spawns the scan/sample tasks,
//! and renders a minimal status surface.

#![no_std]
#![no_main]

use core::fmt::Write as _;

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{Either, select};
use embassy_time::Timer;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use heapless::String;
use {defmt_rtt as _, panic_probe as _};

use kywy_core::battery::BatteryStatus;
use kywy_core::input::ButtonEvent;

use crate::board::{Board, Display};
use crate::channels::{BATTERY_STATUS, BUTTON_EVENTS};

mod board;
mod channels;
mod tasks;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Kywy firmware starting...");

    let p = embassy_rp::init(Default::default());

    let board = match Board::init(p).await {
        Ok(board) => board,
        Err(e) => {
            // The panel did not come up; nothing useful can run
            error!("Display bring-up failed: {}", Debug2Format(&e));
            loop {
                Timer::after_secs(1).await;
            }
        }
    };
    info!("Board initialized");

    let Board {
        mut display,
        buttons,
        battery,
    } = board;

    spawner.spawn(tasks::input_task(buttons)).unwrap();
    spawner.spawn(tasks::battery_task(battery)).unwrap();
    info!("All tasks spawned");

    let mut last_event: Option<ButtonEvent> = None;
    let mut battery_status: Option<BatteryStatus> = None;

    render(&mut display, last_event, battery_status);
    if let Err(e) = display.flush().await {
        warn!("Display flush failed: {}", Debug2Format(&e));
    }

    loop {
        match select(BUTTON_EVENTS.receive(), BATTERY_STATUS.wait()).await {
            Either::First(event) => {
                debug!("Button event: {}", event);
                last_event = Some(event);
            }
            Either::Second(status) => {
                battery_status = Some(status);
            }
        }

        render(&mut display, last_event, battery_status);
        if let Err(e) = display.flush().await {
            // Not retried here; the next state change tries again
            warn!("Display flush failed: {}", Debug2Format(&e));
        }
    }
}

/// Draw the status surface into the display's framebuffer
fn render(display: &mut Display, last_event: Option<ButtonEvent>, battery: Option<BatteryStatus>) {
    display.framebuffer_mut().fill(false);
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);

    Text::new("Kywy", Point::new(4, 12), style).draw(display).ok();

    let mut line: String<24> = String::new();
    let _ = write!(line, "BAT {}", battery.map_or("--", battery_label));
    Text::new(&line, Point::new(4, 30), style).draw(display).ok();

    if let Some(event) = last_event {
        let mut line: String<24> = String::new();
        let _ = write!(line, "{:?} {:?}", event.id, event.state);
        Text::new(&line, Point::new(4, 48), style).draw(display).ok();
    }
}

fn battery_label(status: BatteryStatus) -> &'static str {
    match status {
        BatteryStatus::Critical => "CRIT",
        BatteryStatus::Low => "LOW",
        BatteryStatus::Normal => "OK",
        BatteryStatus::Full => "FULL",
        BatteryStatus::Charging => "CHG",
        BatteryStatus::Unknown => "--",
    }
}

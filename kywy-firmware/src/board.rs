//! Kywy board bring-up
//!
//! Pin map and peripheral composition for the RP2040-based Kywy
//! handheld. This is the single place that owns the SPI bus and the
//! peripheral pins; everything above it works with the generic drivers.
//!
//! Pin map:
//!
//! | Function        | GPIO            |
//! |-----------------|-----------------|
//! | SPI0 SCK        | 18              |
//! | SPI0 MOSI       | 19              |
//! | SPI0 MISO       | 16              |
//! | Display CS      | 17 (active high)|
//! | Display DISP    | 22              |
//! | Button left     | 12              |
//! | Button right    | 2               |
//! | D-pad up        | 9               |
//! | D-pad down      | 3               |
//! | D-pad left      | 6               |
//! | D-pad right     | 7               |
//! | D-pad center    | 8               |
//! | Battery ADC     | 26              |
//! | Charge detect   | 10              |
//! | Charge standby  | 11              |

use core::convert::Infallible;

use embassy_embedded_hal::shared_bus::asynch::spi::SpiDeviceWithConfig;
use embassy_rp::Peripherals;
use embassy_rp::adc::{self, Adc};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{self, Phase, Polarity, Spi};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use static_cell::StaticCell;

use kywy_core::input::DebounceConfig;
use kywy_core::traits::{AdcSource, InputPin, OutputPin};
use kywy_drivers::battery::BatteryMonitor;
use kywy_drivers::buttons::{ButtonPins, ButtonScanner};
use kywy_drivers::display::KywyDisplay;

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => adc::InterruptHandler;
});

/// Display SPI clock
const SPI_FREQUENCY: u32 = 1_000_000;

/// Shared SPI0 bus; the display borrows it per transaction
type SpiBus = Mutex<CriticalSectionRawMutex, Spi<'static, SPI0, spi::Async>>;

static SPI_BUS: StaticCell<SpiBus> = StaticCell::new();

/// SPI device handle for the display
pub type DisplaySpi =
    SpiDeviceWithConfig<'static, CriticalSectionRawMutex, Spi<'static, SPI0, spi::Async>, ChipSelect>;

/// Transport error surfaced by display operations
pub type DisplayError = embassy_embedded_hal::shared_bus::SpiDeviceError<spi::Error, Infallible>;

pub type Display = KywyDisplay<DisplaySpi, EnablePin>;
pub type Buttons = ButtonScanner<ActiveLowInput>;
pub type Battery = BatteryMonitor<BatteryAdc, ActiveLowInput>;

/// The assembled board
pub struct Board {
    pub display: Display,
    pub buttons: Buttons,
    pub battery: Battery,
}

impl Board {
    /// Bring up every peripheral and return the composed board
    ///
    /// Owns the device's pins and the SPI bus from here on. Fails only
    /// if the display does not come up; buttons and battery have no
    /// fallible bring-up.
    pub async fn init(p: Peripherals) -> Result<Self, DisplayError> {
        // Shared SPI bus: the display is the only device today, the SD
        // card slot hangs off the same bus.
        let bus_config = spi::Config::default();
        let bus = SPI_BUS.init(Mutex::new(Spi::new(
            p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, p.DMA_CH0, p.DMA_CH1, bus_config,
        )));

        let mut display_config = spi::Config::default();
        display_config.frequency = SPI_FREQUENCY;
        display_config.polarity = Polarity::IdleLow;
        display_config.phase = Phase::CaptureOnFirstTransition;

        // The panel's chip select is active high
        let cs = ChipSelect(Output::new(p.PIN_17, Level::Low));
        let display_spi = SpiDeviceWithConfig::new(bus, cs, display_config);
        let disp = EnablePin(Output::new(p.PIN_22, Level::Low));
        let display = KywyDisplay::new(display_spi, disp).await?;

        let buttons = ButtonScanner::new(
            ButtonPins {
                left: ActiveLowInput::new(Input::new(p.PIN_12, Pull::Up)),
                right: ActiveLowInput::new(Input::new(p.PIN_2, Pull::Up)),
                dup: ActiveLowInput::new(Input::new(p.PIN_9, Pull::Up)),
                ddown: ActiveLowInput::new(Input::new(p.PIN_3, Pull::Up)),
                dleft: ActiveLowInput::new(Input::new(p.PIN_6, Pull::Up)),
                dright: ActiveLowInput::new(Input::new(p.PIN_7, Pull::Up)),
                dcenter: ActiveLowInput::new(Input::new(p.PIN_8, Pull::Up)),
            },
            DebounceConfig::default(),
        );

        let adc = Adc::new(p.ADC, Irqs, adc::Config::default());
        let channel = adc::Channel::new_pin(p.PIN_26, Pull::None);
        let battery = BatteryMonitor::new(
            BatteryAdc { adc, channel },
            ActiveLowInput::new(Input::new(p.PIN_10, Pull::Up)),
            ActiveLowInput::new(Input::new(p.PIN_11, Pull::Up)),
        );

        Ok(Board {
            display,
            buttons,
            battery,
        })
    }
}

/// Active-low input line with Schmitt trigger
///
/// Buttons short to ground when pressed; the charger's open-drain
/// status lines pull low when asserted.
pub struct ActiveLowInput(Input<'static>);

impl ActiveLowInput {
    pub fn new(mut input: Input<'static>) -> Self {
        input.set_schmitt(true);
        Self(input)
    }
}

impl InputPin for ActiveLowInput {
    fn is_active(&self) -> bool {
        self.0.is_low()
    }
}

/// Display enable (DISP) line
pub struct EnablePin(Output<'static>);

impl OutputPin for EnablePin {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }
}

/// Inverted chip-select adapter for the active-high panel CS
///
/// `SpiDeviceWithConfig` asserts CS by driving it low; the panel wants
/// the opposite polarity.
pub struct ChipSelect(Output<'static>);

impl embedded_hal::digital::ErrorType for ChipSelect {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for ChipSelect {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.set_high();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.set_low();
        Ok(())
    }
}

/// Battery divider ADC channel
pub struct BatteryAdc {
    adc: Adc<'static, adc::Async>,
    channel: adc::Channel<'static>,
}

impl AdcSource for BatteryAdc {
    type Error = adc::Error;

    async fn sample(&mut self) -> Result<u16, adc::Error> {
        self.adc.read(&mut self.channel).await
    }
}

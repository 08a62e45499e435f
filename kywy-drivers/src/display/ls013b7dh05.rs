//! LS013B7DH05 memory LCD driver
//!
//! 144x168 monochrome Sharp memory-in-pixel panel. The controller is
//! write-only over SPI; each transaction carries a mode byte, and line
//! writes carry the line address and payload with every byte
//! bit-reversed (the panel shifts LSB first). VCOM must alternate
//! periodically to avoid DC bias on the liquid crystal; by default the
//! driver toggles it on every flush.
//!
//! Drawing mutates the owned framebuffer only. [`KywyDisplay::flush`]
//! transmits the dirty line range, one write transaction per line:
//!
//! ```text
//! [ 0x80 | vcom, bitrev(line + 1), bitrev(d0) .. bitrev(d17), 0x00, 0x00 ]
//! ```
//!
//! Transport errors are returned to the caller and never retried here;
//! the framebuffer and its dirty range are left untouched so a caller
//! retry retransmits the same lines.

use core::ops::Not;

use embedded_graphics::{
    Pixel,
    draw_target::DrawTarget,
    pixelcolor::BinaryColor,
    prelude::{OriginDimensions, Size},
};
use embedded_hal_async::spi::SpiDevice;

use kywy_core::framebuffer::{BYTES_PER_LINE, Framebuffer, Orientation};
use kywy_core::traits::OutputPin;

/// Bytes per line write transaction: mode, address, payload, trailer
const LINE_PACKET_SIZE: usize = 2 + BYTES_PER_LINE + 2;

/// Controller mode bytes
mod cmd {
    /// No-op, used to latch a VCOM level on its own
    pub const NOP: u8 = 0x00;
    /// Clear all controller memory
    pub const CLEAR_ALL: u8 = 0x20;
    /// Write one or more lines
    pub const WRITE_LINE: u8 = 0x80;
}

/// VCOM polarity bit carried in every mode byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vcom {
    Lo = 0x00,
    Hi = 0x40,
}

impl Not for Vcom {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Vcom::Lo => Vcom::Hi,
            Vcom::Hi => Vcom::Lo,
        }
    }
}

/// Driver for the Kywy's Sharp memory LCD
///
/// Owns the framebuffer and the SPI device for its lifetime; the
/// `SpiDevice` contract guarantees no other owner drives the bus during
/// a transaction. `DISP` is the panel's display-enable line.
pub struct KywyDisplay<SPI, DISP> {
    spi: SPI,
    disp: DISP,
    fb: Framebuffer,
    line_buf: [u8; LINE_PACKET_SIZE],
    vcom: Vcom,
    auto_vcom: bool,
}

impl<SPI, DISP> KywyDisplay<SPI, DISP>
where
    SPI: SpiDevice,
    DISP: OutputPin,
{
    /// Bring up the panel and return a ready display
    ///
    /// Runs the power-on sequence: display disabled, VCOM known, all
    /// controller memory cleared, display enabled. A transport failure
    /// here is fatal to bring-up and no handle is returned.
    pub async fn new(spi: SPI, disp: DISP) -> Result<Self, SPI::Error> {
        let mut display = Self {
            spi,
            disp,
            fb: Framebuffer::new(),
            line_buf: [0x00; LINE_PACKET_SIZE],
            vcom: Vcom::Hi,
            auto_vcom: true,
        };
        display.disp.set_low();
        display.clear_screen().await?;
        display.disp.set_high();
        Ok(display)
    }

    /// Drive the panel enable line; takes effect immediately
    pub fn set_power(&mut self, on: bool) {
        self.disp.set_state(on);
    }

    /// The owned framebuffer, for drawing
    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.fb
    }

    /// The owned framebuffer, read-only
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    /// Change the logical drawing orientation; takes effect immediately
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.fb.set_orientation(orientation);
    }

    /// Toggle VCOM on every flush (default on)
    ///
    /// When disabled the caller must pulse [`Self::toggle_vcom`]
    /// periodically, per the panel datasheet.
    pub fn set_auto_vcom(&mut self, enable: bool) {
        self.auto_vcom = enable;
    }

    pub fn auto_vcom(&self) -> bool {
        self.auto_vcom
    }

    /// Logical width in pixels
    pub fn width(&self) -> usize {
        self.fb.width()
    }

    /// Logical height in pixels
    pub fn height(&self) -> usize {
        self.fb.height()
    }

    /// Transmit the dirty line range to the controller
    ///
    /// One write transaction per dirty line, in ascending line order;
    /// calls are strictly ordered by `&mut self`. With nothing dirty
    /// this only maintains the VCOM alternation. On a transport error
    /// the framebuffer and dirty range are unchanged and the error is
    /// the caller's to handle.
    pub async fn flush(&mut self) -> Result<(), SPI::Error> {
        let Some((first, last)) = self.fb.dirty_lines() else {
            if self.auto_vcom {
                self.toggle_vcom().await?;
            }
            return Ok(());
        };

        if self.auto_vcom {
            self.vcom = !self.vcom;
        }

        for line in first..=last {
            self.line_buf[0] = cmd::WRITE_LINE | self.vcom as u8;
            // The controller addresses lines from 1 and reads bits LSB first
            self.line_buf[1] = (line as u8 + 1).reverse_bits();
            for (out, &raw) in self.line_buf[2..2 + BYTES_PER_LINE]
                .iter_mut()
                .zip(self.fb.line(line).iter())
            {
                *out = raw.reverse_bits();
            }
            self.line_buf[2 + BYTES_PER_LINE] = 0x00;
            self.line_buf[3 + BYTES_PER_LINE] = 0x00;

            self.spi.write(&self.line_buf).await?;
        }

        self.fb.mark_clean();
        Ok(())
    }

    /// Clear the controller memory and the framebuffer together
    pub async fn clear_screen(&mut self) -> Result<(), SPI::Error> {
        if self.auto_vcom {
            self.vcom = !self.vcom;
        }
        self.spi
            .write(&[cmd::CLEAR_ALL | self.vcom as u8, 0x00])
            .await?;
        self.fb.fill(false);
        self.fb.mark_clean();
        Ok(())
    }

    /// Flip VCOM and latch it with a no-op transaction
    pub async fn toggle_vcom(&mut self) -> Result<(), SPI::Error> {
        self.vcom = !self.vcom;
        self.spi.write(&[cmd::NOP | self.vcom as u8, 0x00]).await
    }
}

impl<SPI, DISP> OriginDimensions for KywyDisplay<SPI, DISP> {
    fn size(&self) -> Size {
        Size::new(self.fb.width() as u32, self.fb.height() as u32)
    }
}

impl<SPI, DISP> DrawTarget for KywyDisplay<SPI, DISP> {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.fb.draw_iter(pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embedded_hal::spi::{Error, ErrorKind, ErrorType, Operation};
    use kywy_core::framebuffer::HEIGHT;
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct BusFault;

    impl Error for BusFault {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Records every write transaction; can be armed to fail after a
    /// number of successful transactions.
    struct MockSpi {
        writes: Vec<Vec<u8>>,
        fail_after: Option<usize>,
    }

    impl MockSpi {
        fn new() -> Self {
            Self {
                writes: Vec::new(),
                fail_after: None,
            }
        }
    }

    impl ErrorType for MockSpi {
        type Error = BusFault;
    }

    impl SpiDevice for MockSpi {
        async fn transaction(
            &mut self,
            operations: &mut [Operation<'_, u8>],
        ) -> Result<(), BusFault> {
            if let Some(limit) = self.fail_after {
                if self.writes.len() >= limit {
                    return Err(BusFault);
                }
            }
            for op in operations.iter() {
                if let Operation::Write(data) = op {
                    self.writes.push(data.to_vec());
                }
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockPin {
        high: bool,
    }

    impl kywy_core::traits::OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }
    }

    fn new_display() -> KywyDisplay<MockSpi, MockPin> {
        block_on(KywyDisplay::new(MockSpi::new(), MockPin::default())).unwrap()
    }

    #[test]
    fn init_clears_controller_and_enables_panel() {
        let display = new_display();
        // VCOM starts Hi and toggles to Lo for the clear command
        assert_eq!(display.spi.writes, vec![vec![cmd::CLEAR_ALL, 0x00]]);
        assert!(display.disp.high);
        assert_eq!(display.framebuffer().dirty_lines(), None);
    }

    #[test]
    fn init_failure_returns_no_handle() {
        let mut spi = MockSpi::new();
        spi.fail_after = Some(0);
        assert!(block_on(KywyDisplay::new(spi, MockPin::default())).is_err());
    }

    #[test]
    fn flush_sends_line_packets_in_wire_format() {
        let mut display = new_display();
        display.spi.writes.clear();

        display.framebuffer_mut().set_pixel(0, 0, true);
        display.framebuffer_mut().set_pixel(1, 0, true);
        block_on(display.flush()).unwrap();

        assert_eq!(display.spi.writes.len(), 1);
        let packet = &display.spi.writes[0];
        assert_eq!(packet.len(), LINE_PACKET_SIZE);
        // VCOM toggled back to Hi for this flush
        assert_eq!(packet[0], cmd::WRITE_LINE | Vcom::Hi as u8);
        // Line 0 addressed as 1, bit-reversed
        assert_eq!(packet[1], 1u8.reverse_bits());
        // Pixels 0 and 1 are buffer bits 0 and 1, bit-reversed on the wire
        assert_eq!(packet[2], 0b1100_0000);
        assert!(packet[3..2 + BYTES_PER_LINE].iter().all(|&b| b == 0x00));
        assert_eq!(&packet[2 + BYTES_PER_LINE..], &[0x00, 0x00]);

        assert_eq!(display.framebuffer().dirty_lines(), None);
    }

    #[test]
    fn flush_covers_exactly_the_dirty_range() {
        let mut display = new_display();
        display.spi.writes.clear();

        display.framebuffer_mut().set_pixel(0, 3, true);
        display.framebuffer_mut().set_pixel(0, 5, true);
        block_on(display.flush()).unwrap();

        // Lines 3..=5 inclusive, ascending
        assert_eq!(display.spi.writes.len(), 3);
        for (i, line) in (3u8..=5).enumerate() {
            assert_eq!(display.spi.writes[i][1], (line + 1).reverse_bits());
        }
    }

    #[test]
    fn clean_flush_only_pulses_vcom() {
        let mut display = new_display();
        display.spi.writes.clear();

        block_on(display.flush()).unwrap();
        assert_eq!(display.spi.writes, vec![vec![cmd::NOP | Vcom::Hi as u8, 0x00]]);
    }

    #[test]
    fn failed_flush_leaves_framebuffer_and_dirty_range_intact() {
        let mut display = new_display();
        display.framebuffer_mut().fill(true);
        let snapshot = *display.framebuffer().data();
        let dirty = display.framebuffer().dirty_lines();

        display.spi.writes.clear();
        display.spi.fail_after = Some(2);
        assert!(block_on(display.flush()).is_err());

        assert_eq!(display.framebuffer().data(), &snapshot);
        assert_eq!(display.framebuffer().dirty_lines(), dirty);

        // Caller-level retry transmits the full range
        display.spi.fail_after = None;
        display.spi.writes.clear();
        block_on(display.flush()).unwrap();
        assert_eq!(display.spi.writes.len(), HEIGHT);
        assert_eq!(display.framebuffer().dirty_lines(), None);
    }

    #[test]
    fn clear_screen_resets_framebuffer_and_controller_together() {
        let mut display = new_display();
        display.framebuffer_mut().fill(true);
        display.spi.writes.clear();

        block_on(display.clear_screen()).unwrap();
        assert_eq!(display.spi.writes.len(), 1);
        assert_eq!(display.spi.writes[0][0] & !0x40, cmd::CLEAR_ALL);
        assert!(display.framebuffer().data().iter().all(|&b| b == 0x00));
        assert_eq!(display.framebuffer().dirty_lines(), None);
    }

    #[test]
    fn vcom_alternates_across_flushes() {
        let mut display = new_display();
        display.spi.writes.clear();

        display.framebuffer_mut().set_pixel(0, 0, true);
        block_on(display.flush()).unwrap();
        display.framebuffer_mut().set_pixel(0, 0, false);
        block_on(display.flush()).unwrap();

        let first = display.spi.writes[0][0] & 0x40;
        let second = display.spi.writes[1][0] & 0x40;
        assert_ne!(first, second);
    }

    #[test]
    fn auto_vcom_off_keeps_polarity() {
        let mut display = new_display();
        display.set_auto_vcom(false);
        display.spi.writes.clear();

        display.framebuffer_mut().set_pixel(0, 0, true);
        block_on(display.flush()).unwrap();
        display.framebuffer_mut().set_pixel(1, 0, true);
        block_on(display.flush()).unwrap();

        assert_eq!(
            display.spi.writes[0][0] & 0x40,
            display.spi.writes[1][0] & 0x40
        );
    }

    #[test]
    fn set_power_drives_enable_line() {
        let mut display = new_display();
        display.set_power(false);
        assert!(!display.disp.high);
        display.set_power(true);
        assert!(display.disp.high);
    }
}

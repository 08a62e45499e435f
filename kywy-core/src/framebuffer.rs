//! Packed 1-bpp framebuffer for the 144x168 memory LCD
//!
//! Pixels are stored row-major, least-significant bit first within each
//! byte, matching the panel's in-memory layout (the driver bit-reverses
//! each byte for the wire). Drawing only mutates this buffer; the dirty
//! line range records what a flush must retransmit.
//!
//! Out-of-bounds writes clip silently.

use core::convert::Infallible;

use embedded_graphics::{
    Pixel,
    draw_target::DrawTarget,
    pixelcolor::BinaryColor,
    prelude::{OriginDimensions, Size},
};

/// Panel width in pixels
pub const WIDTH: usize = 144;
/// Panel height in pixels (lines)
pub const HEIGHT: usize = 168;
/// Packed bytes per panel line
pub const BYTES_PER_LINE: usize = WIDTH / 8;
/// Total framebuffer size in bytes
pub const BUFFER_SIZE: usize = BYTES_PER_LINE * HEIGHT;

/// Software display orientation
///
/// The panel has no orientation register; rotation is applied when
/// mapping logical draw coordinates onto physical panel coordinates.
/// Takes effect for subsequent drawing, immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    /// Native portrait, 144x168
    #[default]
    Deg0,
    /// Rotated clockwise, 168x144
    Deg90,
    /// Upside down, 144x168
    Deg180,
    /// Rotated counter-clockwise, 168x144
    Deg270,
}

impl Orientation {
    /// Logical axes are swapped relative to the panel
    pub fn swaps_axes(self) -> bool {
        matches!(self, Orientation::Deg90 | Orientation::Deg270)
    }
}

/// In-memory pixel buffer mirrored to the panel by the display driver
pub struct Framebuffer {
    buf: [u8; BUFFER_SIZE],
    /// Inclusive physical line range touched since the last flush
    dirty: Option<(usize, usize)>,
    orientation: Orientation,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    /// Create a blank (all pixels off) framebuffer
    ///
    /// Starts fully dirty so the first flush transmits the deterministic
    /// blank frame.
    pub fn new() -> Self {
        Self {
            buf: [0x00; BUFFER_SIZE],
            dirty: Some((0, HEIGHT - 1)),
            orientation: Orientation::Deg0,
        }
    }

    /// Logical width under the current orientation
    pub fn width(&self) -> usize {
        if self.orientation.swaps_axes() {
            HEIGHT
        } else {
            WIDTH
        }
    }

    /// Logical height under the current orientation
    pub fn height(&self) -> usize {
        if self.orientation.swaps_axes() {
            WIDTH
        } else {
            HEIGHT
        }
    }

    /// Current orientation
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Change the orientation
    ///
    /// Existing content is not remapped; the full buffer is marked dirty.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        self.mark_all_dirty();
    }

    /// Map logical coordinates to physical panel coordinates
    fn map(&self, x: usize, y: usize) -> Option<(usize, usize)> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(match self.orientation {
            Orientation::Deg0 => (x, y),
            Orientation::Deg90 => (y, HEIGHT - 1 - x),
            Orientation::Deg180 => (WIDTH - 1 - x, HEIGHT - 1 - y),
            Orientation::Deg270 => (WIDTH - 1 - y, x),
        })
    }

    /// Set one pixel; out-of-bounds coordinates clip silently
    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        let Some((px, py)) = self.map(x, y) else {
            return;
        };
        let index = py * BYTES_PER_LINE + px / 8;
        let bit = px % 8;
        if on {
            self.buf[index] |= 1 << bit;
        } else {
            self.buf[index] &= !(1 << bit);
        }
        self.mark_line_dirty(py);
    }

    /// Read one pixel; out-of-bounds reads as off
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let Some((px, py)) = self.map(x, y) else {
            return false;
        };
        self.buf[py * BYTES_PER_LINE + px / 8] & (1 << (px % 8)) != 0
    }

    /// Fill the whole buffer with one level
    pub fn fill(&mut self, on: bool) {
        self.buf.fill(if on { 0xFF } else { 0x00 });
        self.mark_all_dirty();
    }

    /// Fill a rectangle; clipped to the logical bounds
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, on: bool) {
        for yy in y..y.saturating_add(h) {
            for xx in x..x.saturating_add(w) {
                self.set_pixel(xx, yy, on);
            }
        }
    }

    /// Packed bytes of one physical panel line; `line` must be below
    /// [`HEIGHT`]
    pub fn line(&self, line: usize) -> &[u8] {
        let start = line * BYTES_PER_LINE;
        &self.buf[start..start + BYTES_PER_LINE]
    }

    /// Whole packed buffer
    pub fn data(&self) -> &[u8; BUFFER_SIZE] {
        &self.buf
    }

    /// Inclusive physical line range touched since the last flush
    pub fn dirty_lines(&self) -> Option<(usize, usize)> {
        self.dirty
    }

    /// Forget the dirty range (called by the driver after a full flush)
    pub fn mark_clean(&mut self) {
        self.dirty = None;
    }

    /// Mark every line dirty (forces a full retransmit)
    pub fn mark_all_dirty(&mut self) {
        self.dirty = Some((0, HEIGHT - 1));
    }

    fn mark_line_dirty(&mut self, line: usize) {
        self.dirty = Some(match self.dirty {
            None => (line, line),
            Some((lo, hi)) => (lo.min(line), hi.max(line)),
        });
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x >= 0 && coord.y >= 0 {
                self.set_pixel(coord.x as usize, coord.y as usize, color.is_on());
            }
        }
        Ok(())
    }
}

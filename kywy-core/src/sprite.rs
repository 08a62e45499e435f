//! Sprite sheets and frame animation
//!
//! A [`SpriteSheet`] slices a monochrome BMP into fixed-size cells.
//! Cells draw onto any [`DrawTarget`] with optional mirroring and
//! quarter-turn rotation; [`Animation`] steps through a list of cells.

use embedded_graphics::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{Point, Size},
    pixelcolor::BinaryColor,
    prelude::*,
};
use heapless::Vec;
use tinybmp::{Bmp, ParseError};

/// Maximum animations per sprite instance
pub const MAX_ANIMATIONS: usize = 4;

/// Quarter-turn rotation applied when drawing a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

/// Drawing options for one cell
#[derive(Debug, Clone, Copy, Default)]
pub struct SpriteOptions {
    pub flip_x: bool,
    pub flip_y: bool,
    pub rotation: Rotation,
}

/// A sprite sheet backed by a monochrome BMP
///
/// The image is divided into a grid of equally sized cells; partial
/// cells at the right/bottom edge are ignored.
#[derive(Debug)]
pub struct SpriteSheet<'a> {
    bmp: Bmp<'a, BinaryColor>,
    cell: Size,
    grid: Size,
}

impl<'a> SpriteSheet<'a> {
    /// Parse a BMP and slice it into `cell`-sized sprites
    pub fn new(bmp_data: &'a [u8], cell: Size) -> Result<Self, ParseError> {
        let bmp = Bmp::from_slice(bmp_data)?;
        let image = bmp.size();
        let grid = Size::new(image.width / cell.width, image.height / cell.height);
        Ok(Self { bmp, cell, grid })
    }

    /// Size of one cell in pixels
    pub fn cell_size(&self) -> Size {
        self.cell
    }

    /// Number of cells per axis
    pub fn grid(&self) -> Size {
        self.grid
    }

    /// Borrow one cell; `None` outside the grid
    pub fn sprite(&self, col: u32, row: u32) -> Option<Sprite<'_>> {
        if col >= self.grid.width || row >= self.grid.height {
            return None;
        }
        Some(Sprite {
            sheet: self,
            origin: Point::new(
                (col * self.cell.width) as i32,
                (row * self.cell.height) as i32,
            ),
        })
    }
}

/// One cell of a sprite sheet
pub struct Sprite<'a> {
    sheet: &'a SpriteSheet<'a>,
    origin: Point,
}

impl Sprite<'_> {
    /// Drawn size under the given options (rotation may swap axes)
    pub fn size(&self, options: SpriteOptions) -> Size {
        let cell = self.sheet.cell;
        match options.rotation {
            Rotation::None | Rotation::Cw180 => cell,
            Rotation::Cw90 | Rotation::Cw270 => Size::new(cell.height, cell.width),
        }
    }

    /// Draw the cell with its top-left corner at `pos`
    ///
    /// The cell is opaque: off pixels overwrite the background. Flips
    /// apply before rotation.
    pub fn draw<D>(
        &self,
        target: &mut D,
        pos: Point,
        options: SpriteOptions,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let w = self.sheet.cell.width as i32;
        let h = self.sheet.cell.height as i32;
        let origin = self.origin;

        target.draw_iter(self.sheet.bmp.pixels().filter_map(|Pixel(p, color)| {
            let mut sx = p.x - origin.x;
            let mut sy = p.y - origin.y;
            if sx < 0 || sy < 0 || sx >= w || sy >= h {
                return None;
            }

            if options.flip_x {
                sx = w - 1 - sx;
            }
            if options.flip_y {
                sy = h - 1 - sy;
            }

            let (ox, oy) = match options.rotation {
                Rotation::None => (sx, sy),
                Rotation::Cw90 => (h - 1 - sy, sx),
                Rotation::Cw180 => (w - 1 - sx, h - 1 - sy),
                Rotation::Cw270 => (sy, w - 1 - sx),
            };

            Some(Pixel(pos + Point::new(ox, oy), color))
        }))
    }
}

/// A sequence of sheet cells played frame by frame
#[derive(Debug, Clone, Copy)]
pub struct Animation<'a> {
    sheet: &'a SpriteSheet<'a>,
    /// Cell coordinates per frame, as (col, row)
    frames: &'a [(u32, u32)],
    looped: bool,
    current: usize,
    finished: bool,
}

impl<'a> Animation<'a> {
    pub fn new(sheet: &'a SpriteSheet<'a>, frames: &'a [(u32, u32)], looped: bool) -> Self {
        Self {
            sheet,
            frames,
            looped,
            current: 0,
            finished: frames.is_empty(),
        }
    }

    /// Step to the next frame
    ///
    /// A looped animation wraps; a one-shot animation holds its last
    /// frame and reports finished.
    pub fn advance(&mut self) {
        if self.frames.is_empty() {
            return;
        }
        if self.current + 1 < self.frames.len() {
            self.current += 1;
        } else if self.looped {
            self.current = 0;
        } else {
            self.finished = true;
        }
    }

    /// Restart from the first frame
    pub fn reset(&mut self) {
        self.current = 0;
        self.finished = self.frames.is_empty();
    }

    /// Sprite for the current frame; `None` for an empty frame list or
    /// a frame outside the sheet grid
    pub fn current_sprite(&self) -> Option<Sprite<'a>> {
        let (col, row) = *self.frames.get(self.current)?;
        self.sheet.sprite(col, row)
    }

    /// Current frame index
    pub fn current_frame(&self) -> usize {
        self.current
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// A positioned sprite with a small set of switchable animations
pub struct SpriteInstance<'a> {
    animations: Vec<Animation<'a>, MAX_ANIMATIONS>,
    active: usize,
    pub position: Point,
}

impl<'a> SpriteInstance<'a> {
    pub fn new(animations: Vec<Animation<'a>, MAX_ANIMATIONS>, position: Point) -> Self {
        Self {
            animations,
            active: 0,
            position,
        }
    }

    /// Translate the instance
    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.position += Point::new(dx, dy);
    }

    /// Active animation
    pub fn current(&self) -> Option<&Animation<'a>> {
        self.animations.get(self.active)
    }

    /// Switch to another animation and restart it; out-of-range indices
    /// are ignored
    pub fn trigger(&mut self, index: usize) {
        if let Some(animation) = self.animations.get_mut(index) {
            self.active = index;
            animation.reset();
        }
    }

    /// Advance the active animation, falling back to `default_index`
    /// when a one-shot animation completes
    pub fn update(&mut self, default_index: usize) {
        let Some(animation) = self.animations.get_mut(self.active) else {
            return;
        };
        animation.advance();
        if !animation.is_looped() && animation.is_finished() {
            self.trigger(default_index);
        }
    }

    /// Draw the active animation's current frame at the instance position
    pub fn draw<D>(&self, target: &mut D, options: SpriteOptions) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        if let Some(sprite) = self.current().and_then(Animation::current_sprite) {
            sprite.draw(target, self.position, options)?;
        }
        Ok(())
    }
}

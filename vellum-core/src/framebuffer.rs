//! Frame buffer
//!
//! Pixels are stored at 2 bits each, four to a byte, leftmost pixel in the
//! most significant bits. This is the same packing the panel data bus uses,
//! so a row of the buffer maps one-to-one onto the bytes clocked out for
//! that row.
//!
//! A pixel value is an ink level: 0 is bare paper, [`PixelDepth::max_level`]
//! is full ink. Monochrome buffers only ever hold 0 or 1.
//!
//! The storage is borrowed so the caller decides where it lives (a static
//! buffer, PSRAM, or a stack array in tests).

use core::convert::Infallible;

use embedded_graphics_core::draw_target::DrawTarget;
use embedded_graphics_core::geometry::{OriginDimensions, Size};
use embedded_graphics_core::pixelcolor::{BinaryColor, Gray2, GrayColor};
use embedded_graphics_core::Pixel;

use crate::config::{ConfigError, PanelGeometry, PixelDepth};

/// Pixels per byte
pub const PIXELS_PER_BYTE: usize = 4;

/// 2-bit-per-pixel frame buffer
pub struct FrameBuffer<'a> {
    buf: &'a mut [u8],
    geometry: PanelGeometry,
    depth: PixelDepth,
}

impl<'a> FrameBuffer<'a> {
    /// Wrap caller-provided storage
    ///
    /// The storage must be exactly [`PanelGeometry::buffer_len`] bytes.
    /// It is cleared to paper.
    pub fn new(
        buf: &'a mut [u8],
        geometry: PanelGeometry,
        depth: PixelDepth,
    ) -> Result<Self, ConfigError> {
        geometry.validate()?;
        let required = geometry.buffer_len();
        if buf.len() != required {
            return Err(ConfigError::BufferSize {
                required,
                actual: buf.len(),
            });
        }

        buf.fill(0);
        Ok(Self {
            buf,
            geometry,
            depth,
        })
    }

    pub fn width(&self) -> u16 {
        self.geometry.width
    }

    pub fn height(&self) -> u16 {
        self.geometry.height
    }

    pub fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    pub fn depth(&self) -> PixelDepth {
        self.depth
    }

    /// Raw packed bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..]
    }

    /// Packed bytes of one row, `None` below the panel
    pub fn row(&self, y: u16) -> Option<&[u8]> {
        if y >= self.geometry.height {
            return None;
        }
        let stride = self.geometry.bytes_per_row();
        let start = y as usize * stride;
        self.buf.get(start..start + stride)
    }

    /// Read a pixel, `None` outside the panel
    pub fn pixel(&self, x: u16, y: u16) -> Option<u8> {
        let (index, shift) = self.locate(x, y)?;
        Some((self.buf[index] >> shift) & 0b11)
    }

    /// Write a pixel, quantized to the buffer depth
    ///
    /// Writes outside the panel are ignored.
    pub fn set_pixel(&mut self, x: u16, y: u16, level: u8) {
        let level = self.depth.quantize(level);
        if let Some((index, shift)) = self.locate(x, y) {
            let byte = &mut self.buf[index];
            *byte = (*byte & !(0b11 << shift)) | (level << shift);
        }
    }

    /// Write a pixel from an RGB colour using Rec.709 luminance
    pub fn set_pixel_rgb(&mut self, x: u16, y: u16, red: u8, green: u8, blue: u8) {
        let level = ink_from_luminance(luminance(red, green, blue), self.depth);
        self.set_pixel(x, y, level);
    }

    /// Set every pixel to the same level
    pub fn fill(&mut self, level: u8) {
        let level = self.depth.quantize(level);
        let byte = level << 6 | level << 4 | level << 2 | level;
        self.buf.fill(byte);
    }

    /// Reset every pixel to paper
    pub fn clear(&mut self) {
        self.buf.fill(0);
    }

    /// Copy another buffer's content into this one
    ///
    /// Both buffers must share the same geometry.
    pub fn copy_from(&mut self, other: &FrameBuffer<'_>) {
        if other.geometry == self.geometry {
            self.buf.copy_from_slice(&other.buf[..]);
        }
    }

    /// Two-colour drawing view (`On` is ink)
    pub fn binary(&mut self) -> BinaryTarget<'_, 'a> {
        BinaryTarget { fb: self }
    }

    fn locate(&self, x: u16, y: u16) -> Option<(usize, u8)> {
        if x >= self.geometry.width || y >= self.geometry.height {
            return None;
        }
        let index = y as usize * self.geometry.bytes_per_row() + x as usize / PIXELS_PER_BYTE;
        let shift = 6 - 2 * (x as usize % PIXELS_PER_BYTE) as u8;
        Some((index, shift))
    }
}

/// Rec.709 relative luminance in 0..=255
pub fn luminance(red: u8, green: u8, blue: u8) -> u8 {
    let y = red as u32 * 2126 + green as u32 * 7152 + blue as u32 * 722;
    (y / 10_000) as u8
}

/// Ink level for a luminance value at a given depth
pub fn ink_from_luminance(luma: u8, depth: PixelDepth) -> u8 {
    match depth {
        PixelDepth::Monochrome => (luma < 128) as u8,
        PixelDepth::Greyscale => 3 - (luma >> 6),
    }
}

impl OriginDimensions for FrameBuffer<'_> {
    fn size(&self) -> Size {
        Size::new(self.geometry.width as u32, self.geometry.height as u32)
    }
}

impl DrawTarget for FrameBuffer<'_> {
    type Color = Gray2;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 || point.x > u16::MAX as i32 || point.y > u16::MAX as i32
            {
                continue;
            }
            // Gray2 luma 0 is black, 3 is white
            let luma = color.luma() << 6;
            let level = ink_from_luminance(luma, self.depth);
            self.set_pixel(point.x as u16, point.y as u16, level);
        }
        Ok(())
    }
}

/// [`DrawTarget`] for [`BinaryColor`] over a frame buffer
pub struct BinaryTarget<'f, 'a> {
    fb: &'f mut FrameBuffer<'a>,
}

impl OriginDimensions for BinaryTarget<'_, '_> {
    fn size(&self) -> Size {
        self.fb.size()
    }
}

impl DrawTarget for BinaryTarget<'_, '_> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let ink = self.fb.depth.max_level();
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u16::try_from(point.x), u16::try_from(point.y)) else {
                continue;
            };
            let level = if color.is_on() { ink } else { 0 };
            self.fb.set_pixel(x, y, level);
        }
        Ok(())
    }
}

mod color;
mod pixel_buffer;
mod raster;
mod sink;

pub use color::{ColorPicker, RandomColors, SolidColor};
pub use pixel_buffer::{checked_cells, PixelBuffer, FAR_DEPTH, MAX_PIXELS};
pub use raster::{Rasterizer, TriangleOutcome, DEPTH_TOLERANCE};
pub use sink::{ImageSink, PngSink};

#[cfg(test)]
pub use sink::RecordingSink;

use serde::{Deserialize, Serialize};

pub const DEFAULT_WIDTH: u32 = 500;
pub const DEFAULT_HEIGHT: u32 = 500;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const CYAN: Color = Color::new(0, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::CYAN
    }
}

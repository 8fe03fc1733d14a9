use log::warn;

use super::Color;

/// Depth of an untouched pixel; larger z is nearer the viewer
pub const FAR_DEPTH: f64 = f64::NEG_INFINITY;

/// Largest frame accepted, in pixels (4096x4096)
pub const MAX_PIXELS: u64 = 1 << 24;

/// Pixel count of a `width` x `height` frame, or None past `MAX_PIXELS`
pub fn checked_cells(width: u32, height: u32) -> Option<usize> {
    let cells = u64::from(width).checked_mul(u64::from(height))?;
    if cells > MAX_PIXELS {
        return None;
    }
    usize::try_from(cells).ok()
}

/// Narrow a clip intersection back to screen coordinates without wrapping
#[inline]
fn narrow(v: i128) -> i32 {
    v.clamp(i32::MIN.into(), i32::MAX.into()) as i32
}

/// Write an opaque RGBA pixel to slice
#[inline]
fn write_pixel(dest: &mut [u8], color: Color) {
    dest[0] = color.r;
    dest[1] = color.g;
    dest[2] = color.b;
    dest[3] = 255;
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8 pixel grid with a parallel depth grid of the same dimensions.
/// Row `y` of the buffer is row `y` of the saved image.
#[derive(Clone)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
    depth: Vec<f64>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a blank buffer with every depth set to `FAR_DEPTH`.
    /// Sizes past `MAX_PIXELS` yield an empty 0x0 buffer.
    pub fn with_size(width: u32, height: u32) -> Self {
        let (width, height, pixel_count) = match checked_cells(width, height) {
            Some(cells) => (width, height, cells),
            None => {
                warn!("frame size {}x{} exceeds {} pixels", width, height, MAX_PIXELS);
                (0, 0, 0)
            },
        };
        Self {
            pixels: vec![0; pixel_count * 4],
            depth: vec![FAR_DEPTH; pixel_count],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    #[inline]
    fn cell(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Set a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if self.in_bounds(x, y) {
            let idx = self.cell(x, y) * 4;
            write_pixel(&mut self.pixels[idx..idx + 4], color);
        }
    }

    /// Read a pixel from the buffer (bounds checked)
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        if self.in_bounds(x, y) {
            let idx = self.cell(x, y) * 4;
            Some(Color::new(
                self.pixels[idx],
                self.pixels[idx + 1],
                self.pixels[idx + 2],
            ))
        } else {
            None
        }
    }

    // ========================================================================
    // Depth Buffer
    // ========================================================================

    /// Depth at (x, y); off-screen reads report `FAR_DEPTH`
    #[inline]
    pub fn depth_at(&self, x: i32, y: i32) -> f64 {
        if self.in_bounds(x, y) {
            self.depth[self.cell(x, y)]
        } else {
            FAR_DEPTH
        }
    }

    /// Keep the nearer of the stored depth and `z`. No-op off-screen.
    #[inline]
    pub fn raise_depth(&mut self, x: i32, y: i32, z: f64) {
        if self.in_bounds(x, y) {
            let cell = self.cell(x, y);
            if self.depth[cell] < z {
                self.depth[cell] = z;
            }
        }
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    /// Draw a horizontal line
    pub fn hline(&mut self, x1: i32, x2: i32, y: i32, color: Color) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        let first = self.cell(start, y) * 4;
        let last = self.cell(end, y) * 4 + 4;
        for px in self.pixels[first..last].chunks_exact_mut(4) {
            write_pixel(px, color);
        }
    }

    /// Draw a line using Bresenham's algorithm with Cohen-Sutherland clipping
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        if y0 == y1 {
            self.hline(x0, x1, y0, color);
            return;
        }
        let Some((cx0, cy0, cx1, cy1)) = self.clip_line(x0, y0, x1, y1) else {
            return;
        };

        let dx = (cx1 - cx0).abs();
        let dy = -((cy1 - cy0).abs());
        let sx = if cx0 < cx1 { 1 } else { -1 };
        let sy = if cy0 < cy1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = cx0;
        let mut y = cy0;

        loop {
            self.set_pixel(x, y, color);
            if x == cx1 && y == cy1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Cohen-Sutherland line clipping
    /// Returns the clipped endpoints, or None when nothing is on screen
    fn clip_line(
        &self,
        mut x0: i32,
        mut y0: i32,
        mut x1: i32,
        mut y1: i32,
    ) -> Option<(i32, i32, i32, i32)> {
        const INSIDE: u8 = 0;
        const LEFT: u8 = 1;
        const RIGHT: u8 = 2;
        const BOTTOM: u8 = 4;
        const TOP: u8 = 8;
        // Converges in at most 4 rounds for valid input
        const MAX_ITERATIONS: u32 = 16;

        let w = self.width as i32;
        let h = self.height as i32;

        let outcode = |x: i32, y: i32| -> u8 {
            let mut code = INSIDE;
            if x < 0 {
                code |= LEFT;
            } else if x >= w {
                code |= RIGHT;
            }
            if y < 0 {
                code |= TOP;
            } else if y >= h {
                code |= BOTTOM;
            }
            code
        };

        let mut code0 = outcode(x0, y0);
        let mut code1 = outcode(x1, y1);

        for _ in 0..MAX_ITERATIONS {
            if (code0 | code1) == 0 {
                return Some((x0, y0, x1, y1));
            }
            if (code0 & code1) != 0 {
                return None;
            }

            let code_out = if code0 != 0 { code0 } else { code1 };
            // Wide math: endpoints may be saturated far off screen
            let (fx0, fy0) = (i128::from(x0), i128::from(y0));
            let dy = i128::from(y1) - fy0;
            let dx = i128::from(x1) - fx0;
            let (x, y);

            if (code_out & BOTTOM) != 0 {
                if dy == 0 {
                    return None;
                }
                x = narrow(fx0 + dx * (i128::from(h - 1) - fy0) / dy);
                y = h - 1;
            } else if (code_out & TOP) != 0 {
                if dy == 0 {
                    return None;
                }
                x = narrow(fx0 + dx * -fy0 / dy);
                y = 0;
            } else if (code_out & RIGHT) != 0 {
                if dx == 0 {
                    return None;
                }
                y = narrow(fy0 + dy * (i128::from(w - 1) - fx0) / dx);
                x = w - 1;
            } else {
                if dx == 0 {
                    return None;
                }
                y = narrow(fy0 + dy * -fx0 / dx);
                x = 0;
            }

            if code_out == code0 {
                x0 = x;
                y0 = y;
                code0 = outcode(x0, y0);
            } else {
                x1 = x;
                y1 = y;
                code1 = outcode(x1, y1);
            }
        }

        None
    }

    /// Raw RGBA8 bytes, row-major from the top row
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of pixels that differ from blank black
    pub fn painted_pixels(&self) -> usize {
        self.pixels
            .chunks_exact(4)
            .filter(|px| px[..3].iter().any(|&c| c != 0))
            .count()
    }
}

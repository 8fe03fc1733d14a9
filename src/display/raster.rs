//! Z-buffered line and triangle rasterizer
//!
//! Depth and color are decoupled in `draw_line`: every call pushes its depth
//! into the z-buffer, but color is only written when both endpoints were
//! visible before the call. The fill of a triangle is a stack of horizontal
//! `draw_line` spans, so the same rule governs edges and interiors.

use log::{info, warn};

use super::{Color, ColorPicker, ImageSink, PixelBuffer};
use crate::geometry::PointBatch;

/// Slack allowed when testing an endpoint against the z-buffer, so a
/// triangle's fill does not hide behind its own edges
pub const DEPTH_TOLERANCE: f64 = 1.0;

/// What `draw_triangle` did with a triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleOutcome {
    /// Facing away from the viewer; nothing written
    Culled,
    /// All three vertices on one scanline; edges drawn, no fill
    Flat,
    /// Filled with the given number of spans in each pass
    Filled {
        lower_spans: usize,
        upper_spans: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct Vertex {
    x: f64,
    y: i32,
    z: f64,
}

impl Vertex {
    /// Position on the edge `self -> to` at scanline `y`
    #[inline]
    fn toward(&self, to: &Vertex, y: i32) -> (f64, f64) {
        let t = (y as f64 - self.y as f64) / (to.y as f64 - self.y as f64);
        (self.x + (to.x - self.x) * t, self.z + (to.z - self.z) * t)
    }
}

/// Owns the frame buffer for one frame and draws point batches into it
pub struct Rasterizer<P: ColorPicker> {
    buffer: PixelBuffer,
    picker: P,
}

impl<P: ColorPicker> Rasterizer<P> {
    pub fn new(width: u32, height: u32, picker: P) -> Self {
        Self {
            buffer: PixelBuffer::with_size(width, height),
            picker,
        }
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Replace the frame buffer with a blank one at far depth
    pub fn reset(&mut self) {
        self.buffer = PixelBuffer::with_size(self.buffer.width(), self.buffer.height());
    }

    /// Z-tested line. Callers pass endpoints with `y0 <= y1`.
    ///
    /// Depth is stepped per scanline over `y0..y1`; a horizontal call steps
    /// the columns `x0..=x1` instead. Color covers the whole segment and is
    /// written only if neither endpoint was already behind the z-buffer.
    pub fn draw_line(&mut self, x0: i32, y0: i32, z0: f64, x1: i32, y1: i32, z1: f64, color: Color) {
        let visible = self.buffer.depth_at(x0, y0) <= z0 + DEPTH_TOLERANCE
            && self.buffer.depth_at(x1, y1) <= z1 + DEPTH_TOLERANCE;

        if y0 == y1 {
            let (xa, za, xb, zb) = if x0 <= x1 {
                (x0, z0, x1, z1)
            } else {
                (x1, z1, x0, z0)
            };
            let run = xb as f64 - xa as f64;
            let first = xa.max(0);
            let last = xb.min(self.buffer.width() as i32 - 1);
            for x in first..=last {
                let t = if run > 0.0 { (x as f64 - xa as f64) / run } else { 0.0 };
                self.buffer.raise_depth(x, y0, za + (zb - za) * t);
            }
        } else {
            let rise = y1 as f64 - y0 as f64;
            let first = y0.max(0);
            let last = y1.min(self.buffer.height() as i32);
            for y in first..last {
                let t = (y as f64 - y0 as f64) / rise;
                let x = (x0 as f64 + (x1 as f64 - x0 as f64) * t) as i32;
                self.buffer.raise_depth(x, y, z0 + (z1 - z0) * t);
            }
        }

        if visible {
            self.buffer.line(x0, y0, x1, y1, color);
        }
    }

    /// Draw the triangle made of the three points at `start`: edges in
    /// `color`, interior in one color from the picker
    pub fn draw_triangle(&mut self, batch: &PointBatch, start: usize, color: Color) -> TriangleOutcome {
        if !batch.faces_viewer(start) {
            return TriangleOutcome::Culled;
        }

        let vertices = [0, 1, 2].map(|i| {
            let p = batch.point(start + i);
            Vertex {
                x: p[0],
                y: p[1].round() as i32,
                z: p[2],
            }
        });

        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            let (lo, hi) = if vertices[a].y <= vertices[b].y {
                (vertices[a], vertices[b])
            } else {
                (vertices[b], vertices[a])
            };
            self.draw_line(lo.x as i32, lo.y, lo.z, hi.x as i32, hi.y, hi.z, color);
        }

        // Stable sort: ties keep encounter order
        let mut sorted = vertices;
        sorted.sort_by_key(|v| v.y);
        let [bottom, mid, top] = sorted;

        if bottom.y == top.y {
            warn!("flat triangle at y={}, skipping fill", bottom.y);
            return TriangleOutcome::Flat;
        }

        let fill = self.picker.next_color();
        let height = self.buffer.height() as i32;

        let mut lower_spans = 0;
        for y in bottom.y.max(0)..mid.y.min(height) {
            let (xa, za) = bottom.toward(&top, y);
            let (xb, zb) = bottom.toward(&mid, y);
            self.draw_line(xa as i32, y, za, xb as i32, y, zb, fill);
            lower_spans += 1;
        }

        let mut upper_spans = 0;
        for y in mid.y.max(0)..top.y.min(height) {
            let (xa, za) = bottom.toward(&top, y);
            let (xb, zb) = mid.toward(&top, y);
            self.draw_line(xa as i32, y, za, xb as i32, y, zb, fill);
            upper_spans += 1;
        }

        TriangleOutcome::Filled {
            lower_spans,
            upper_spans,
        }
    }

    /// Draw every complete triangle in the batch; returns how many were filled
    pub fn draw_polygons(&mut self, batch: &PointBatch, color: Color) -> usize {
        (0..batch.triangles().count())
            .filter(|&triangle| {
                matches!(
                    self.draw_triangle(batch, triangle * 3, color),
                    TriangleOutcome::Filled { .. }
                )
            })
            .count()
    }

    /// Draw every complete segment in the batch
    pub fn draw_lines(&mut self, batch: &PointBatch, color: Color) {
        for [a, b] in batch.segments() {
            let (lo, hi) = if a[1] <= b[1] { (a, b) } else { (b, a) };
            self.draw_line(
                lo[0] as i32,
                lo[1] as i32,
                lo[2],
                hi[0] as i32,
                hi[1] as i32,
                hi[2],
                color,
            );
        }
    }

    /// Hand the current frame to `sink`. Failures are logged, never fatal.
    pub fn save(&self, sink: &mut dyn ImageSink, name: &str) -> bool {
        match sink.write_image(&self.buffer, name) {
            Ok(()) => {
                info!("saved {}", name);
                true
            },
            Err(e) => {
                warn!("could not write {}: {}", name, e);
                false
            },
        }
    }
}

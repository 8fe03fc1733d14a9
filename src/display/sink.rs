//! Image output
//!
//! The rasterizer never touches the filesystem itself; finished frames are
//! handed to an `ImageSink` together with a relative file name.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::PixelBuffer;
use crate::error::Result;

/// Accepts a finished frame and a file name
pub trait ImageSink {
    fn write_image(&mut self, buffer: &PixelBuffer, name: &str) -> Result<()>;
}

/// Writes 8-bit RGBA PNG files below a root directory
pub struct PngSink {
    root: PathBuf,
}

impl PngSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageSink for PngSink {
    fn write_image(&mut self, buffer: &PixelBuffer, name: &str) -> Result<()> {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = BufWriter::new(File::create(&path)?);
        let mut encoder = png::Encoder::new(file, buffer.width(), buffer.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(buffer.as_bytes())?;
        writer.finish()?;
        Ok(())
    }
}

/// Keeps every written frame in memory
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSink {
    pub images: Vec<(String, PixelBuffer)>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn names(&self) -> Vec<String> {
        self.images.iter().map(|(name, _)| name.clone()).collect()
    }
}

#[cfg(test)]
impl ImageSink for RecordingSink {
    fn write_image(&mut self, buffer: &PixelBuffer, name: &str) -> Result<()> {
        self.images.push((name.to_string(), buffer.clone()));
        Ok(())
    }
}

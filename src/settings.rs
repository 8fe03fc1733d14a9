//! Render settings
//!
//! Defaults match a 500x500 frame with frames written as
//! `anim/<basename>NNN.png`. A JSON file can override any field.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::display::{checked_cells, Color, DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_PIXELS};
use crate::error::{RenderError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Root directory handed to the PNG sink
    pub output_dir: PathBuf,
    /// Subdirectory (below `output_dir`) for numbered animation frames
    pub frames_dir: PathBuf,
    pub extension: String,
    /// Lower bound on the zero-padded frame number width
    pub min_frame_digits: usize,
    /// Basename used when `frames` is not followed by `basename`
    pub default_basename: String,
    /// Color of line segments and triangle edges
    pub edge_color: Color,
    /// Fixed seed for the random fill colors
    pub seed: Option<u64>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            output_dir: PathBuf::from("."),
            frames_dir: PathBuf::from("anim"),
            extension: "png".to_string(),
            min_frame_digits: 3,
            default_basename: "A".to_string(),
            edge_color: Color::CYAN,
            seed: None,
        }
    }
}

impl RenderSettings {
    /// Load settings from a JSON file; missing fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::Settings(format!(
                "resolution must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if checked_cells(self.width, self.height).is_none() {
            return Err(RenderError::Settings(format!(
                "resolution {}x{} exceeds {} pixels",
                self.width, self.height, MAX_PIXELS
            )));
        }
        if self.extension.is_empty() {
            return Err(RenderError::Settings("extension must not be empty".into()));
        }
        Ok(())
    }

    /// Width of the frame number so file names sort numerically
    pub fn frame_digits(&self, frames: usize) -> usize {
        let last = frames.saturating_sub(1);
        let digits = last.checked_ilog10().map_or(1, |d| d as usize + 1);
        digits.max(self.min_frame_digits)
    }

    /// `<frames_dir>/<basename><frame, zero padded>.<extension>`
    pub fn frame_file_name(&self, basename: &str, frame: usize, frames: usize) -> String {
        let file = format!(
            "{}{:0width$}.{}",
            basename,
            frame,
            self.extension,
            width = self.frame_digits(frames)
        );
        self.frames_dir.join(file).to_string_lossy().into_owned()
    }
}

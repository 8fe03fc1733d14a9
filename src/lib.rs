//! Scene-script renderer
//!
//! Replays a list of scene commands (transforms, solids, knob variations)
//! once per animation frame and rasterizes the result with a z-buffered
//! scanline renderer.

pub mod animation;
pub mod display;
pub mod error;
pub mod geometry;
pub mod interpreter;
pub mod math3d;
pub mod script;
pub mod settings;

pub use animation::{KnobSchedule, KnobTable, Variation};
pub use display::{Color, ColorPicker, ImageSink, PixelBuffer, PngSink, RandomColors, Rasterizer, SolidColor};
pub use error::{RenderError, Result};
pub use geometry::PointBatch;
pub use interpreter::{Interpreter, OriginStack, Phase, RenderReport};
pub use math3d::{Transform, Vec3};
pub use script::{Axis, Command, Script};
pub use settings::RenderSettings;

//! Scene interpreter
//!
//! Walks the command list once per animation frame. The first pass reads the
//! animation header, the second expands every `vary` into knob tables, and
//! each frame then replays the whole script against a fresh `FrameContext`.

use log::{debug, error, info, warn};

use crate::animation::{KnobSchedule, KnobTable};
use crate::display::{Color, ColorPicker, ImageSink, Rasterizer};
use crate::error::{RenderError, Result};
use crate::geometry::PointBatch;
use crate::math3d::Transform;
use crate::script::{vec3, Axis, Command, Script};
use crate::settings::RenderSettings;

// ============================================================================
// Origin stack
// ============================================================================

/// Stack of coordinate frames; the bottom entry is always the identity
#[derive(Debug, Clone)]
pub struct OriginStack {
    stack: Vec<Transform>,
}

impl OriginStack {
    pub fn new() -> Self {
        Self {
            stack: vec![Transform::identity()],
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn top(&self) -> &Transform {
        // The identity at the bottom is never popped
        &self.stack[self.stack.len() - 1]
    }

    /// Duplicate the current top
    pub fn push(&mut self) {
        self.stack.push(*self.top());
    }

    pub fn pop(&mut self) -> Result<()> {
        if self.stack.len() <= 1 {
            return Err(RenderError::StackUnderflow);
        }
        self.stack.pop();
        Ok(())
    }

    /// Replace the top with `candidate × top`
    pub fn compose(&mut self, candidate: &Transform) {
        let last = self.stack.len() - 1;
        self.stack[last] = candidate.multiply(&self.stack[last]);
    }
}

impl Default for OriginStack {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Frame context
// ============================================================================

/// Everything a single frame mutates. Reset at the start of every frame.
pub struct FrameContext<P: ColorPicker> {
    pub origins: OriginStack,
    pub scratch: PointBatch,
    pub raster: Rasterizer<P>,
}

impl<P: ColorPicker> FrameContext<P> {
    pub fn new(width: u32, height: u32, picker: P) -> Self {
        Self {
            origins: OriginStack::new(),
            scratch: PointBatch::new(),
            raster: Rasterizer::new(width, height, picker),
        }
    }

    fn begin(&mut self) {
        self.origins = OriginStack::new();
        self.scratch.clear();
        self.raster.reset();
    }

    fn draw_solid(&mut self, color: Color) {
        self.scratch.transform(self.origins.top());
        self.raster.draw_polygons(&self.scratch, color);
        self.scratch.clear();
    }

    fn draw_segments(&mut self, color: Color) {
        self.scratch.transform(self.origins.top());
        self.raster.draw_lines(&self.scratch, color);
        self.scratch.clear();
    }
}

// ============================================================================
// Interpreter
// ============================================================================

/// Where the interpreter is in its run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FirstPass,
    SecondPass,
    SingleFrame,
    MultiFrame(usize),
    Done,
}

/// Animation header found by the first pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    pub frames: usize,
    pub basename: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub frames_rendered: usize,
    pub images_written: usize,
    pub write_failures: usize,
}

impl RenderReport {
    fn record(&mut self, written: bool) {
        if written {
            self.images_written += 1;
        } else {
            self.write_failures += 1;
        }
    }
}

/// Read `frames` and `basename`. A `vary` without a leading `frames` is fatal.
pub fn first_pass(commands: &[Command], settings: &RenderSettings) -> Result<Animation> {
    if let Some(Command::Frames { count }) = commands.first() {
        let basename = if let Some(Command::Basename { name }) = commands.get(1) {
            name.clone()
        } else {
            info!("Using default basename: {}", settings.default_basename);
            settings.default_basename.clone()
        };
        return Ok(Animation {
            frames: *count,
            basename,
        });
    }

    if commands.iter().any(|c| matches!(c, Command::Vary(_))) {
        error!("script contains VARY, but FRAMES is not the first command");
        return Err(RenderError::VaryWithoutFrames);
    }

    Ok(Animation {
        frames: 1,
        basename: settings.default_basename.clone(),
    })
}

/// Multiplier a transform command gets from its knob in the current frame
fn knob_factor(command: &Command, knobs: Option<&KnobTable>) -> f64 {
    let Some(name) = command.knob() else {
        return 1.0;
    };
    let Some(table) = knobs else {
        debug!("single frame render, ignoring knob '{}'", name);
        return 1.0;
    };
    if let Some(&value) = table.get(name) {
        value
    } else {
        info!("knob '{}' does not exist, using literal values for: {}", name, command);
        1.0
    }
}

pub struct Interpreter<'a> {
    script: &'a Script,
    settings: &'a RenderSettings,
    phase: Phase,
}

impl<'a> Interpreter<'a> {
    pub fn new(script: &'a Script, settings: &'a RenderSettings) -> Self {
        Self {
            script,
            settings,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        debug!("{:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Render every frame of the script into `sink`
    pub fn run<P: ColorPicker>(&mut self, picker: P, sink: &mut dyn ImageSink) -> Result<RenderReport> {
        self.enter(Phase::FirstPass);
        let animation = first_pass(&self.script.commands, self.settings)?;

        self.enter(Phase::SecondPass);
        let knobs = KnobSchedule::build(self.script.variations(), animation.frames);
        debug!("knob tables:\n{}", knobs);

        let mut ctx = FrameContext::new(self.settings.width, self.settings.height, picker);
        let mut report = RenderReport::default();

        if animation.frames <= 1 {
            self.enter(Phase::SingleFrame);
            ctx = self.render_frame(ctx, None, Some(&mut *sink), &mut report);
            report.frames_rendered = 1;
        } else {
            for frame in 0..animation.frames {
                self.enter(Phase::MultiFrame(frame));
                ctx = self.render_frame(ctx, knobs.table(frame), None, &mut report);
                report.frames_rendered += 1;

                let name = self
                    .settings
                    .frame_file_name(&animation.basename, frame, animation.frames);
                report.record(ctx.raster.save(sink, &name));
            }
        }

        self.enter(Phase::Done);
        Ok(report)
    }

    /// Replay the script once. `knobs` is present only for animation frames;
    /// `save_sink` is present only for single frame renders, where `save`
    /// commands write their literal file name.
    pub fn render_frame<P: ColorPicker>(
        &self,
        mut ctx: FrameContext<P>,
        knobs: Option<&KnobTable>,
        mut save_sink: Option<&mut dyn ImageSink>,
        report: &mut RenderReport,
    ) -> FrameContext<P> {
        let edge = self.settings.edge_color;
        ctx.begin();

        for command in &self.script.commands {
            match command {
                Command::Frames { .. } | Command::Basename { .. } | Command::Vary(_) => {},
                Command::Push => ctx.origins.push(),
                Command::Pop => {
                    if let Err(e) = ctx.origins.pop() {
                        warn!("{}", e);
                    }
                },
                Command::Move { values, .. } => {
                    let k = knob_factor(command, knobs);
                    debug!("moving {} {} {} (knob={})", values[0] * k, values[1] * k, values[2] * k, k);
                    ctx.origins
                        .compose(&Transform::translate(values[0] * k, values[1] * k, values[2] * k));
                },
                Command::Scale { values, .. } => {
                    let k = knob_factor(command, knobs);
                    debug!("scaling {} {} {} (knob={})", values[0] * k, values[1] * k, values[2] * k, k);
                    ctx.origins
                        .compose(&Transform::scale(values[0] * k, values[1] * k, values[2] * k));
                },
                Command::Rotate { axis, degrees, .. } => {
                    let k = knob_factor(command, knobs);
                    let angle = degrees.to_radians() * k;
                    debug!("rotating {:?} by {} radians (knob={})", axis, angle, k);
                    let rotation = match axis {
                        Axis::X => Transform::rotate_x(angle),
                        Axis::Y => Transform::rotate_y(angle),
                        Axis::Z => Transform::rotate_z(angle),
                    };
                    ctx.origins.compose(&rotation);
                },
                Command::Box { corner1, corner2 } => {
                    ctx.scratch.add_box(vec3(*corner1), vec3(*corner2));
                    ctx.draw_solid(edge);
                },
                Command::Sphere { center, radius } => {
                    ctx.scratch.add_sphere(vec3(*center), *radius);
                    ctx.draw_solid(edge);
                },
                Command::Torus {
                    center,
                    inner_radius,
                    outer_radius,
                } => {
                    ctx.scratch.add_torus(vec3(*center), *inner_radius, *outer_radius);
                    ctx.draw_solid(edge);
                },
                Command::Line { p0, p1 } => {
                    ctx.scratch.add_line(vec3(*p0), vec3(*p1));
                    ctx.draw_segments(edge);
                },
                Command::Save { name } => match save_sink.as_deref_mut() {
                    Some(sink) => report.record(ctx.raster.save(sink, name)),
                    None => debug!("animation frames are saved automatically, ignoring save {}", name),
                },
            }
        }

        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Variation;
    use crate::display::{RecordingSink, SolidColor};

    const GRAY: Color = Color::new(90, 90, 90);

    fn settings() -> RenderSettings {
        RenderSettings {
            width: 200,
            height: 200,
            ..RenderSettings::default()
        }
    }

    fn run(commands: Vec<Command>) -> (Result<RenderReport>, RecordingSink) {
        let script = Script::new(commands);
        let settings = settings();
        let mut sink = RecordingSink::default();
        let result = Interpreter::new(&script, &settings).run(SolidColor(GRAY), &mut sink);
        (result, sink)
    }

    fn vary(knob: &str, start: usize, end: usize, from: f64, to: f64) -> Command {
        Command::Vary(Variation {
            knob: knob.to_string(),
            start_frame: start,
            end_frame: end,
            start_value: from,
            end_value: to,
        })
    }

    fn vertical_line() -> Command {
        Command::Line {
            p0: [0.0, 0.0, 0.0],
            p1: [0.0, 10.0, 0.0],
        }
    }

    #[test]
    fn test_single_frame_box_saves_one_image() {
        let (result, sink) = run(vec![
            Command::Frames { count: 1 },
            Command::Box {
                corner1: [0.0, 0.0, 0.0],
                corner2: [10.0, 10.0, 10.0],
            },
            Command::Save {
                name: "out.png".into(),
            },
        ]);
        let report = result.unwrap();
        assert_eq!(report.images_written, 1);
        assert_eq!(sink.names(), vec!["out.png".to_string()]);

        let image = &sink.images[0].1;
        assert!(image.painted_pixels() > 0);
        assert_eq!(image.get_pixel(5, 5), Some(GRAY));
    }

    #[test]
    fn test_vary_without_frames_is_fatal() {
        let (result, sink) = run(vec![
            Command::Box {
                corner1: [0.0, 0.0, 0.0],
                corner2: [10.0, 10.0, 10.0],
            },
            Command::Save {
                name: "out.png".into(),
            },
            vary("k", 0, 1, 0.0, 1.0),
        ]);
        assert!(matches!(result, Err(RenderError::VaryWithoutFrames)));
        assert!(sink.images.is_empty());
    }

    #[test]
    fn test_first_pass_header() {
        let s = settings();
        let animation = first_pass(
            &[
                Command::Frames { count: 12 },
                Command::Basename {
                    name: "spin".into(),
                },
            ],
            &s,
        )
        .unwrap();
        assert_eq!(animation.frames, 12);
        assert_eq!(animation.basename, "spin");

        let animation = first_pass(&[Command::Frames { count: 3 }, Command::Push], &s).unwrap();
        assert_eq!(animation.basename, "A");

        let animation = first_pass(&[Command::Push], &s).unwrap();
        assert_eq!(animation.frames, 1);
    }

    #[test]
    fn test_animation_writes_padded_frames_and_ignores_save() {
        let (result, sink) = run(vec![
            Command::Frames { count: 3 },
            Command::Basename {
                name: "spin".into(),
            },
            vertical_line(),
            Command::Save {
                name: "ignored.png".into(),
            },
        ]);
        let report = result.unwrap();
        assert_eq!(report.frames_rendered, 3);
        assert_eq!(report.images_written, 3);

        let s = settings();
        let expected: Vec<String> = (0..3).map(|f| s.frame_file_name("spin", f, 3)).collect();
        assert_eq!(sink.names(), expected);
        assert!(expected[2].ends_with("spin002.png"));
    }

    #[test]
    fn test_knob_scales_move_per_frame() {
        let (result, sink) = run(vec![
            Command::Frames { count: 2 },
            Command::Basename { name: "k".into() },
            Command::Move {
                values: [100.0, 0.0, 0.0],
                knob: Some("slide".into()),
            },
            vertical_line(),
            vary("slide", 0, 1, 0.0, 1.0),
        ]);
        result.unwrap();
        let first = &sink.images[0].1;
        let second = &sink.images[1].1;

        assert_eq!(first.get_pixel(0, 5), Some(Color::CYAN));
        assert_eq!(first.get_pixel(100, 5), Some(Color::BLACK));
        // Each frame starts from a blank buffer
        assert_eq!(second.get_pixel(0, 5), Some(Color::BLACK));
        assert_eq!(second.get_pixel(100, 5), Some(Color::CYAN));
    }

    #[test]
    fn test_knob_scales_scale_per_frame() {
        let (result, sink) = run(vec![
            Command::Frames { count: 2 },
            Command::Scale {
                values: [10.0, 10.0, 10.0],
                knob: Some("grow".into()),
            },
            Command::Line {
                p0: [1.0, 0.0, 0.0],
                p1: [1.0, 10.0, 0.0],
            },
            vary("grow", 0, 1, 0.0, 1.0),
        ]);
        result.unwrap();
        let first = &sink.images[0].1;
        let second = &sink.images[1].1;

        // A zero knob collapses the line onto the origin
        assert_eq!(first.get_pixel(0, 0), Some(Color::CYAN));
        assert_eq!(first.painted_pixels(), 1);
        assert_eq!(first.get_pixel(10, 50), Some(Color::BLACK));

        assert_eq!(second.get_pixel(10, 50), Some(Color::CYAN));
        assert_eq!(second.get_pixel(1, 5), Some(Color::BLACK));
    }

    #[test]
    fn test_knob_scales_rotate_per_frame() {
        let (result, sink) = run(vec![
            Command::Frames { count: 2 },
            Command::Rotate {
                axis: Axis::Z,
                degrees: 90.0,
                knob: Some("turn".into()),
            },
            Command::Line {
                p0: [0.0, 0.0, 0.0],
                p1: [50.0, 0.0, 0.0],
            },
            vary("turn", 0, 1, 0.0, 1.0),
        ]);
        result.unwrap();
        let first = &sink.images[0].1;
        let second = &sink.images[1].1;

        // A zero knob leaves the line unrotated along +x
        assert_eq!(first.get_pixel(30, 0), Some(Color::CYAN));
        assert_eq!(first.get_pixel(0, 30), Some(Color::BLACK));

        // A full knob turns it onto +y
        assert_eq!(second.get_pixel(0, 30), Some(Color::CYAN));
        assert_eq!(second.get_pixel(30, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_missing_knob_uses_literal_values() {
        let (result, sink) = run(vec![
            Command::Frames { count: 2 },
            Command::Move {
                values: [50.0, 0.0, 0.0],
                knob: Some("nope".into()),
            },
            vertical_line(),
            vary("other", 0, 1, 0.0, 1.0),
        ]);
        result.unwrap();
        for (_, image) in &sink.images {
            assert_eq!(image.get_pixel(50, 5), Some(Color::CYAN));
        }
    }

    #[test]
    fn test_single_frame_ignores_knobs() {
        let (result, sink) = run(vec![
            Command::Move {
                values: [30.0, 0.0, 0.0],
                knob: Some("k".into()),
            },
            vertical_line(),
            Command::Save {
                name: "still.png".into(),
            },
        ]);
        result.unwrap();
        assert_eq!(sink.images[0].1.get_pixel(30, 5), Some(Color::CYAN));
    }

    #[test]
    fn test_push_pop_restores_frame() {
        let (result, sink) = run(vec![
            Command::Push,
            Command::Move {
                values: [100.0, 0.0, 0.0],
                knob: None,
            },
            Command::Pop,
            vertical_line(),
            Command::Pop,
            Command::Save {
                name: "pushpop.png".into(),
            },
        ]);
        result.unwrap();
        let image = &sink.images[0].1;
        assert_eq!(image.get_pixel(0, 5), Some(Color::CYAN));
        assert_eq!(image.get_pixel(100, 5), Some(Color::BLACK));
    }

    #[test]
    fn test_origin_stack_composes_in_local_frame() {
        let mut stack = OriginStack::new();
        assert!(matches!(stack.pop(), Err(RenderError::StackUnderflow)));
        assert_eq!(stack.depth(), 1);

        stack.push();
        stack.compose(&Transform::translate(10.0, 0.0, 0.0));
        stack.compose(&Transform::scale(2.0, 2.0, 2.0));
        assert_eq!(stack.top().apply([1.0, 0.0, 0.0, 1.0]), [12.0, 0.0, 0.0, 1.0]);

        stack.pop().unwrap();
        assert_eq!(*stack.top(), Transform::identity());
    }

    #[test]
    fn test_run_ends_in_done() {
        let script = Script::new(vec![vertical_line()]);
        let s = settings();
        let mut sink = RecordingSink::default();
        let mut interpreter = Interpreter::new(&script, &s);
        assert_eq!(interpreter.phase(), Phase::Idle);
        interpreter.run(SolidColor(GRAY), &mut sink).unwrap();
        assert_eq!(interpreter.phase(), Phase::Done);
        // No save command in a single frame script means no output
        assert!(sink.images.is_empty());
    }
}

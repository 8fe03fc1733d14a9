//! Parsed scene scripts
//!
//! The text parser lives outside this crate; its output (an ordered command
//! list plus the symbol table) arrives as JSON, e.g.
//!
//! ```json
//! {
//!   "commands": [
//!     { "op": "frames", "count": 20 },
//!     { "op": "basename", "name": "spin" },
//!     { "op": "rotate", "axis": "y", "degrees": 360, "knob": "turn" },
//!     { "op": "box", "corner1": [100, 100, 0], "corner2": [200, 200, -100] },
//!     { "op": "vary", "knob": "turn", "start_frame": 0, "end_frame": 19,
//!       "start_value": 0, "end_value": 1 }
//!   ],
//!   "symbols": { "turn": 0.0 }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::Variation;
use crate::error::Result;
use crate::math3d::Vec3;

/// Rotation axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

/// One scene command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Command {
    Frames {
        count: usize,
    },
    Basename {
        name: String,
    },
    Push,
    Pop,
    Move {
        values: [f64; 3],
        #[serde(default)]
        knob: Option<String>,
    },
    Scale {
        values: [f64; 3],
        #[serde(default)]
        knob: Option<String>,
    },
    Rotate {
        axis: Axis,
        degrees: f64,
        #[serde(default)]
        knob: Option<String>,
    },
    Box {
        corner1: [f64; 3],
        corner2: [f64; 3],
    },
    Sphere {
        center: [f64; 3],
        radius: f64,
    },
    Torus {
        center: [f64; 3],
        inner_radius: f64,
        outer_radius: f64,
    },
    Line {
        p0: [f64; 3],
        p1: [f64; 3],
    },
    Vary(Variation),
    Save {
        name: String,
    },
}

impl Command {
    /// Knob this command is scaled by, if any
    pub fn knob(&self) -> Option<&str> {
        match self {
            Command::Move { knob, .. } | Command::Scale { knob, .. } | Command::Rotate { knob, .. } => {
                knob.as_deref()
            },
            _ => None,
        }
    }
}

#[inline]
pub fn vec3(v: [f64; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

fn fmt_triple(v: &[f64; 3]) -> String {
    format!("{} {} {}", v[0], v[1], v[2])
}

fn fmt_knob(knob: &Option<String>) -> String {
    knob.as_ref().map(|k| format!(" knob={}", k)).unwrap_or_default()
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Frames { count } => write!(f, "frames {}", count),
            Command::Basename { name } => write!(f, "basename {}", name),
            Command::Push => write!(f, "push"),
            Command::Pop => write!(f, "pop"),
            Command::Move { values, knob } => write!(f, "move {}{}", fmt_triple(values), fmt_knob(knob)),
            Command::Scale { values, knob } => {
                write!(f, "scale {}{}", fmt_triple(values), fmt_knob(knob))
            },
            Command::Rotate {
                axis,
                degrees,
                knob,
            } => write!(f, "rotate {:?} {}{}", axis, degrees, fmt_knob(knob)),
            Command::Box { corner1, corner2 } => {
                write!(f, "box {} {}", fmt_triple(corner1), fmt_triple(corner2))
            },
            Command::Sphere { center, radius } => write!(f, "sphere {} {}", fmt_triple(center), radius),
            Command::Torus {
                center,
                inner_radius,
                outer_radius,
            } => write!(f, "torus {} {} {}", fmt_triple(center), inner_radius, outer_radius),
            Command::Line { p0, p1 } => write!(f, "line {} {}", fmt_triple(p0), fmt_triple(p1)),
            Command::Vary(v) => write!(
                f,
                "vary {} {} to {} values {} to {}",
                v.knob, v.start_frame, v.end_frame, v.start_value, v.end_value
            ),
            Command::Save { name } => write!(f, "save {}", name),
        }
    }
}

/// Ordered command list plus the parser's symbol table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    pub commands: Vec<Command>,
    #[serde(default)]
    pub symbols: BTreeMap<String, f64>,
}

impl Script {
    pub fn new(commands: Vec<Command>) -> Self {
        Self {
            commands,
            symbols: BTreeMap::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load script from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Every `vary` command, in script order
    pub fn variations(&self) -> impl Iterator<Item = &Variation> {
        self.commands.iter().filter_map(|c| match c {
            Command::Vary(v) => Some(v),
            _ => None,
        })
    }

    /// Human-readable dump of the commands, symbol table and knob list
    pub fn listing(&self) -> String {
        let mut out = String::new();
        out.push_str("Commands:\n");
        for command in &self.commands {
            out.push_str(&format!("  {}\n", command));
        }
        out.push_str("Symbol Table:\n");
        for (name, value) in &self.symbols {
            out.push_str(&format!("  {}={}\n", name, value));
        }
        out.push_str("Knob List:\nID\tNAME\tVALUE\n");
        for (id, (name, value)) in self.symbols.iter().enumerate() {
            out.push_str(&format!("{}\t{}\t{:6.2}\n", id, name, value));
        }
        out
    }
}

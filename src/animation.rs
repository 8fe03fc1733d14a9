//! Knob interpolation
//!
//! Each `vary` command describes a linear ramp for one named knob. Before any
//! frame is drawn the ramps are expanded into one `KnobTable` per frame.

use std::collections::BTreeMap;
use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

/// Linear ramp of one knob between two frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    pub knob: String,
    pub start_frame: usize,
    pub end_frame: usize,
    pub start_value: f64,
    pub end_value: f64,
}

impl Variation {
    /// Knob value at `frame`: held before the ramp, held after it
    pub fn value_at(&self, frame: usize) -> f64 {
        if frame < self.start_frame {
            self.start_value
        } else if frame >= self.end_frame {
            self.end_value
        } else {
            let extent =
                (frame - self.start_frame) as f64 / (self.end_frame - self.start_frame) as f64;
            self.start_value + (self.end_value - self.start_value) * extent
        }
    }
}

/// Knob values for a single frame, keyed by knob name
pub type KnobTable = BTreeMap<String, f64>;

/// Knob tables for every frame of an animation
#[derive(Debug, Clone, Default)]
pub struct KnobSchedule {
    tables: Vec<KnobTable>,
    conflicts: Vec<Variation>,
}

impl KnobSchedule {
    /// Expand `variations` over `total_frames` frames. A knob that is varied
    /// twice keeps its first range; later ones are reported in `conflicts`.
    pub fn build<'a>(
        variations: impl IntoIterator<Item = &'a Variation>,
        total_frames: usize,
    ) -> Self {
        let mut tables = vec![KnobTable::new(); total_frames];
        let mut conflicts = Vec::new();
        let mut seen: BTreeMap<&str, &Variation> = BTreeMap::new();

        for variation in variations {
            if let Some(first) = seen.get(variation.knob.as_str()) {
                warn!(
                    "knob '{}' is already varied over frames {}..{}; overlapping ranges are unsupported, ignoring {}..{}",
                    variation.knob,
                    first.start_frame,
                    first.end_frame,
                    variation.start_frame,
                    variation.end_frame
                );
                conflicts.push(variation.clone());
                continue;
            }
            seen.insert(&variation.knob, variation);

            for (frame, table) in tables.iter_mut().enumerate() {
                table.insert(variation.knob.clone(), variation.value_at(frame));
            }
        }

        Self { tables, conflicts }
    }

    pub fn frame_count(&self) -> usize {
        self.tables.len()
    }

    pub fn table(&self, frame: usize) -> Option<&KnobTable> {
        self.tables.get(frame)
    }

    pub fn value(&self, frame: usize, knob: &str) -> Option<f64> {
        self.tables.get(frame)?.get(knob).copied()
    }

    /// Variations that were dropped because their knob was already taken
    pub fn conflicts(&self) -> &[Variation] {
        &self.conflicts
    }
}

impl fmt::Display for KnobSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (frame, table) in self.tables.iter().enumerate() {
            write!(f, "frame {}:", frame)?;
            for (knob, value) in table {
                write!(f, " {}={:.4}", knob, value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(knob: &str, start: usize, end: usize, from: f64, to: f64) -> Variation {
        Variation {
            knob: knob.to_string(),
            start_frame: start,
            end_frame: end,
            start_value: from,
            end_value: to,
        }
    }

    #[test]
    fn test_linear_ramp_values() {
        let schedule = KnobSchedule::build(&[ramp("k", 2, 6, 0.0, 1.0)], 8);
        let expected = [0.0, 0.0, 0.0, 0.25, 0.5, 0.75, 1.0, 1.0];
        assert_eq!(schedule.frame_count(), 8);
        for (frame, want) in expected.iter().enumerate() {
            let got = schedule.value(frame, "k").unwrap();
            assert!((got - want).abs() < 1e-12, "frame {}: {} != {}", frame, got, want);
        }
    }

    #[test]
    fn test_independent_knobs_share_frames() {
        let schedule =
            KnobSchedule::build(&[ramp("a", 0, 4, 0.0, 4.0), ramp("b", 0, 2, 10.0, 0.0)], 4);
        assert_eq!(schedule.value(1, "a"), Some(1.0));
        assert_eq!(schedule.value(1, "b"), Some(5.0));
        assert_eq!(schedule.table(3).unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_knob_keeps_first_range() {
        let schedule =
            KnobSchedule::build(&[ramp("k", 0, 2, 0.0, 1.0), ramp("k", 0, 2, 5.0, 9.0)], 3);
        assert_eq!(schedule.value(2, "k"), Some(1.0));
        assert_eq!(schedule.conflicts().len(), 1);
        assert_eq!(schedule.conflicts()[0].start_value, 5.0);
        assert_eq!(schedule.table(0).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_range_steps_at_start() {
        let v = ramp("k", 3, 3, 1.0, 2.0);
        assert_eq!(v.value_at(2), 1.0);
        assert_eq!(v.value_at(3), 2.0);
    }

    #[test]
    fn test_missing_knob_or_frame() {
        let schedule = KnobSchedule::build(&[ramp("k", 0, 1, 0.0, 1.0)], 2);
        assert_eq!(schedule.value(0, "other"), None);
        assert_eq!(schedule.value(5, "k"), None);
    }
}

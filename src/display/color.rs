//! Fill color selection for triangles
//!
//! Every filled triangle asks its picker for exactly one color. The default
//! picks uniformly at random, which gives the faceted look that makes depth
//! ordering easy to eyeball.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Color;

/// Source of per-triangle fill colors
pub trait ColorPicker {
    fn next_color(&mut self) -> Color;
}

/// Uniform random color per triangle
pub struct RandomColors {
    rng: StdRng,
}

impl RandomColors {
    /// Seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomColors {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorPicker for RandomColors {
    fn next_color(&mut self) -> Color {
        Color::new(self.rng.gen(), self.rng.gen(), self.rng.gen())
    }
}

/// Same color for every triangle
#[derive(Debug, Clone, Copy)]
pub struct SolidColor(pub Color);

impl ColorPicker for SolidColor {
    fn next_color(&mut self) -> Color {
        self.0
    }
}

impl<P: ColorPicker + ?Sized> ColorPicker for Box<P> {
    fn next_color(&mut self) -> Color {
        (**self).next_color()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_colors_repeat() {
        let mut a = RandomColors::seeded(42);
        let mut b = RandomColors::seeded(42);
        for _ in 0..16 {
            assert_eq!(a.next_color(), b.next_color());
        }
    }

    #[test]
    fn test_solid_color_is_constant() {
        let mut picker = SolidColor(Color::new(9, 8, 7));
        assert_eq!(picker.next_color(), Color::new(9, 8, 7));
        assert_eq!(picker.next_color(), Color::new(9, 8, 7));
    }
}

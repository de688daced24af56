//! Background starfield point cloud.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Stars generated at full quality.
pub const FULL_STAR_COUNT: usize = 10_000;
/// Edge length of the cube the stars are scattered in.
pub const STARFIELD_EXTENT: f32 = 2000.0;

/// Star positions, uniformly scattered in a cube centred on the origin.
#[derive(Debug, Clone)]
pub struct Starfield {
    pub points: Vec<Vec3>,
}

impl Starfield {
    /// `factor` scales [`FULL_STAR_COUNT`]; see `QualitySettings::star_factor`.
    pub fn generate(seed: u64, factor: f32) -> Self {
        let count = (FULL_STAR_COUNT as f32 * factor.clamp(0.0, 1.0)).round() as usize;
        let mut rng = StdRng::seed_from_u64(seed);
        let half = STARFIELD_EXTENT * 0.5;
        let points = (0..count)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                )
            })
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_follows_quality_factor() {
        assert_eq!(Starfield::generate(1, 1.0).len(), FULL_STAR_COUNT);
        assert_eq!(Starfield::generate(1, 0.3).len(), 3_000);
        assert!(Starfield::generate(1, 0.0).is_empty());
    }

    #[test]
    fn stars_stay_inside_the_cube() {
        let field = Starfield::generate(7, 0.1);
        let half = STARFIELD_EXTENT * 0.5;
        assert!(field.points.iter().all(|p| p.abs().max_element() <= half));
    }

    #[test]
    fn same_seed_same_sky() {
        let a = Starfield::generate(42, 0.05);
        let b = Starfield::generate(42, 0.05);
        assert_eq!(a.points, b.points);
    }
}

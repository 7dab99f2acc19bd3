//! Procedural closed-loop centerline generation.
//!
//! Places control points at sorted random angles on an annulus and
//! sweeps a closed Catmull-Rom spline through them, giving a varied
//! but always-drivable circuit. Deterministic for a given seed.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Tuning for the loop generator.
#[derive(Resource, Clone, Copy, Debug)]
pub struct TrackGenConfig {
    /// Overall size of the course (diameter-ish, world units).
    pub extent: f32,
    /// Control point count range.
    pub min_control_points: usize,
    pub max_control_points: usize,
    /// Spline samples emitted per control segment.
    pub samples_per_segment: usize,
    /// Annulus radii as fractions of `extent`.
    pub min_radius_factor: f32,
    pub max_radius_factor: f32,
    /// Per-point radial jitter as a fraction of `extent`.
    pub wobble_factor: f32,
    /// Lane width as a fraction of `extent`.
    pub width_factor: f32,
}

impl Default for TrackGenConfig {
    fn default() -> Self {
        Self {
            extent: 120.0,
            min_control_points: 8,
            max_control_points: 12,
            samples_per_segment: 22,
            min_radius_factor: 0.28,
            max_radius_factor: 0.45,
            wobble_factor: 0.04,
            width_factor: 0.22,
        }
    }
}

impl TrackGenConfig {
    /// Lane width matching the generated course scale.
    pub fn track_width(&self) -> f32 {
        self.extent * self.width_factor
    }
}

/// Generate a closed-loop centerline polyline around the origin.
pub fn generate_loop(config: &TrackGenConfig, seed: u64) -> Vec<Vec2> {
    let mut rng = StdRng::seed_from_u64(seed);

    let count = rng.gen_range(config.min_control_points..=config.max_control_points);
    let mut angles: Vec<f32> = (0..count)
        .map(|_| rng.gen::<f32>() * std::f32::consts::TAU)
        .collect();
    angles.sort_by(f32::total_cmp);

    let min_radius = config.extent * config.min_radius_factor;
    let max_radius = config.extent * config.max_radius_factor;
    let control_points: Vec<Vec2> = angles
        .iter()
        .map(|&angle| {
            let radius = min_radius + rng.gen::<f32>() * (max_radius - min_radius);
            let wobble = (rng.gen::<f32>() - 0.5) * config.extent * config.wobble_factor;
            Vec2::from_angle(angle) * (radius + wobble)
        })
        .collect();

    let n = control_points.len();
    let mut centerline = Vec::with_capacity(n * config.samples_per_segment);
    for i in 0..n {
        let p0 = control_points[(i + n - 1) % n];
        let p1 = control_points[i];
        let p2 = control_points[(i + 1) % n];
        let p3 = control_points[(i + 2) % n];
        for step in 0..config.samples_per_segment {
            let t = step as f32 / config.samples_per_segment as f32;
            centerline.push(catmull_rom(p0, p1, p2, p3, t));
        }
    }
    centerline
}

/// Uniform Catmull-Rom interpolation between `p1` and `p2`.
fn catmull_rom(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * p1
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_gives_same_centerline() {
        let config = TrackGenConfig::default();
        assert_eq!(generate_loop(&config, 7), generate_loop(&config, 7));
    }

    #[test]
    fn sample_count_matches_segments() {
        let config = TrackGenConfig::default();
        for seed in 0..8 {
            let centerline = generate_loop(&config, seed);
            let segments = centerline.len() / config.samples_per_segment;
            assert_eq!(centerline.len(), segments * config.samples_per_segment);
            assert!(segments >= config.min_control_points);
            assert!(segments <= config.max_control_points);
        }
    }

    #[test]
    fn centerline_stays_within_course_bounds() {
        let config = TrackGenConfig::default();
        // Catmull-Rom can slightly overshoot its control points, so
        // allow headroom beyond the annulus itself.
        let bound = config.extent * (config.max_radius_factor + config.wobble_factor) * 1.2;
        for point in generate_loop(&config, 42) {
            assert!(point.length() <= bound);
        }
    }

    #[test]
    fn spline_interpolates_control_points_at_t_zero() {
        let p0 = Vec2::new(-1.0, 0.0);
        let p1 = Vec2::new(0.0, 1.0);
        let p2 = Vec2::new(1.0, 0.0);
        let p3 = Vec2::new(2.0, 1.0);
        assert!(catmull_rom(p0, p1, p2, p3, 0.0).distance(p1) < 1e-5);
    }
}

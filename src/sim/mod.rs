//! Fixed-timestep simulation orchestrator.
//!
//! `SimContext` owns the car, the active track geometry, and the chase
//! camera rig, and advances them deterministically in 1/60 s steps
//! drained from an accumulator of wall-clock frame deltas. The Bevy
//! layer is a thin host: one system feeds frame time in, others mirror
//! the car and camera poses out. Exclusive `ResMut` access to the
//! context is the single synchronization point, so input, track loads,
//! ticks, and resizes cannot interleave.

use bevy::prelude::*;

use crate::track::mesh::TrackGeometry;
use crate::vehicle::{self, CarConfig, CarState};

/// Fixed physics timestep (s).
pub const PHYSICS_STEP: f32 = 1.0 / 60.0;
/// Frame deltas are clamped here so a stall cannot trigger a
/// runaway catch-up loop.
pub const MAX_FRAME_DELTA: f32 = 0.25;

/// Lateral containment bound as a fraction of track width.
const LATERAL_BOUND: f32 = 0.45;
/// Sliding-window reach behind/ahead of the remembered nearest sample.
const SEARCH_BEHIND: usize = 5;
const SEARCH_AHEAD: usize = 6;

/// Chase camera trailing distance behind the car.
const CAMERA_BACK: f32 = 8.0;
/// Chase camera height above the track plane.
const CAMERA_UP: f32 = 3.0;
/// Vertical lift of the look-at target above the car.
const TARGET_LIFT: f32 = 0.5;
/// Exponential smoothing rate (1/s) for the camera rig.
const CAMERA_SMOOTHING: f32 = 6.0;

pub struct SimPlugin;

impl Plugin for SimPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimContext>()
            .add_systems(Update, drive_simulation);
    }
}

/// Smoothed chase camera pose in world space.
#[derive(Clone, Copy, Debug)]
pub struct CameraRig {
    pub pos: Vec3,
    pub target: Vec3,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            pos: Vec3::new(0.0, 4.0, 12.0),
            target: Vec3::ZERO,
        }
    }
}

/// Perspective parameters recomputed on window resize, consumed only
/// by the render layer.
#[derive(Clone, Copy, Debug)]
pub struct ProjectionParams {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            fov_y: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 500.0,
        }
    }
}

/// Normalized control channels as fed by the host.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputChannels {
    pub steer: f32,
    pub throttle: f32,
    pub brake: f32,
}

/// The whole mutable simulation state, owned by the host as a single
/// resource and mutated only through the methods below.
#[derive(Resource, Default)]
pub struct SimContext {
    pub car: CarState,
    pub car_config: CarConfig,
    pub geometry: Option<TrackGeometry>,
    pub camera: CameraRig,
    pub input: InputChannels,
    pub projection: ProjectionParams,
    /// Wall-clock time not yet consumed by fixed steps.
    accumulator: f32,
    /// Remembered nearest-sample index bounding the lateral search.
    nearest_sample: usize,
}

impl SimContext {
    /// Whether a track is loaded and physics steps run.
    pub fn is_active(&self) -> bool {
        self.geometry.is_some()
    }

    /// Install freshly built geometry and reseed the car and camera.
    ///
    /// The car starts at the first sample facing along its tangent;
    /// a zero tangent falls back to the first-to-second sample
    /// direction, then to +X.
    pub fn load_track(&mut self, geometry: TrackGeometry) {
        self.car = CarState::default();
        if let (Some(&first), Some(&tangent)) =
            (geometry.samples.first(), geometry.tangents.first())
        {
            self.car.pos = first;
            let mut seed_dir = tangent;
            if seed_dir.length() < 1e-4 && geometry.samples.len() > 1 {
                seed_dir = geometry.samples[1] - first;
            }
            if seed_dir.length() < 1e-4 {
                seed_dir = Vec2::X;
            }
            self.car.heading = seed_dir.y.atan2(seed_dir.x);
        }

        self.input = InputChannels::default();
        self.nearest_sample = 0;
        let (pos, target) = desired_camera_pose(&self.car);
        self.camera = CameraRig { pos, target };
        self.geometry = Some(geometry);
    }

    /// Set normalized steer/drive axes. The drive axis sign selects
    /// throttle (non-negative) or brake (negative).
    pub fn set_input(&mut self, steer_axis: f32, drive_axis: f32) {
        self.input.steer = steer_axis.clamp(-1.0, 1.0);
        let drive = drive_axis.clamp(-1.0, 1.0);
        if drive >= 0.0 {
            self.input.throttle = drive;
            self.input.brake = 0.0;
        } else {
            self.input.throttle = 0.0;
            self.input.brake = -drive;
        }
    }

    /// Zero all control channels (pointer release / keys up).
    pub fn clear_input(&mut self) {
        self.input = InputChannels::default();
    }

    /// Consume a wall-clock frame delta, running fixed physics steps
    /// for as much of it as the accumulator covers.
    pub fn advance(&mut self, delta_seconds: f32) {
        self.accumulator += delta_seconds.clamp(0.0, MAX_FRAME_DELTA);
        while self.accumulator >= PHYSICS_STEP {
            self.step_fixed(PHYSICS_STEP);
            self.accumulator -= PHYSICS_STEP;
        }
    }

    /// Recompute projection parameters for a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    /// One fixed step: dynamics, lateral containment, camera smoothing.
    /// No-op until a track is loaded.
    fn step_fixed(&mut self, dt: f32) {
        let Some(geometry) = &self.geometry else {
            return;
        };

        self.car.steer = self.input.steer * self.car_config.max_steer;
        self.car.throttle = self.input.throttle;
        self.car.brake = self.input.brake;
        vehicle::step(&mut self.car, &self.car_config, dt);

        // Nearest-sample search over a window around the last hit. The
        // car cannot cross more than a few sample spacings per step, so
        // the window always contains the true minimum.
        let samples = &geometry.samples;
        if !samples.is_empty() {
            let mut best_index = self.nearest_sample.min(samples.len() - 1);
            let mut best_distance = f32::MAX;
            let start = best_index.saturating_sub(SEARCH_BEHIND);
            let end = (best_index + SEARCH_AHEAD).min(samples.len());
            for (i, sample) in samples.iter().enumerate().take(end).skip(start) {
                let distance = self.car.pos.distance(*sample);
                if distance < best_distance {
                    best_distance = distance;
                    best_index = i;
                }
            }
            self.nearest_sample = best_index;

            // Soft guardrail: pull the car back onto the ribbon when
            // its lateral offset exceeds the bound.
            let nearest = samples[best_index];
            let offset = self.car.pos - nearest;
            let offset_length = offset.length();
            let max_offset = geometry.width * LATERAL_BOUND;
            if offset_length > max_offset && offset_length > 1e-4 {
                self.car.pos = nearest + offset * (max_offset / offset_length);
            }
        }

        let (desired_pos, desired_target) = desired_camera_pose(&self.car);
        let smoothing = 1.0 - (-dt * CAMERA_SMOOTHING).exp();
        self.camera.pos = self.camera.pos.lerp(desired_pos, smoothing);
        self.camera.target = self.camera.target.lerp(desired_target, smoothing);
    }
}

/// Chase pose derived from the car: look at the car from a fixed
/// offset behind its heading, lifted above the track plane.
fn desired_camera_pose(car: &CarState) -> (Vec3, Vec3) {
    let forward = Vec2::new(car.heading.cos(), car.heading.sin());
    let target = Vec3::new(car.pos.x, TARGET_LIFT, car.pos.y);
    let pos = target - Vec3::new(forward.x, 0.0, forward.y) * CAMERA_BACK
        + Vec3::new(0.0, CAMERA_UP, 0.0);
    (pos, target)
}

/// Feed the frame delta into the fixed-step accumulator.
fn drive_simulation(time: Res<Time>, mut sim: ResMut<SimContext>) {
    sim.advance(time.delta_secs());
}

//! Bicycle-model vehicle dynamics.
//!
//! A single fixed-timestep state transition: clamp inputs, integrate
//! longitudinal speed, derive yaw rate from steering geometry, then
//! integrate heading and position. Inputs are never rejected, only
//! clamped, so the step cannot fail.

use bevy::prelude::*;

/// Tuning constants for the vehicle. Domain values, not derived.
#[derive(Resource, Clone, Copy, Debug)]
pub struct CarConfig {
    /// Maximum steering angle (radians).
    pub max_steer: f32,
    /// Top forward speed (m/s).
    pub max_speed: f32,
    /// Top reverse speed (m/s, negative).
    pub max_reverse_speed: f32,
    /// Full-throttle acceleration (m/s^2).
    pub engine_accel: f32,
    /// Full-brake deceleration (m/s^2).
    pub brake_decel: f32,
    /// Rolling resistance coefficient.
    pub rolling_friction: f32,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            max_steer: 0.5,
            max_speed: 60.0,
            max_reverse_speed: -10.0,
            engine_accel: 12.0,
            brake_decel: 25.0,
            rolling_friction: 3.0,
        }
    }
}

/// Kinematic state of the car in the 2D track plane.
#[derive(Clone, Copy, Debug)]
pub struct CarState {
    /// Steering angle (radians), clamped to `±max_steer` each step.
    pub steer: f32,
    /// Throttle in [0, 1].
    pub throttle: f32,
    /// Brake in [0, 1].
    pub brake: f32,
    /// Heading angle (radians), accumulates unbounded.
    pub heading: f32,
    /// Signed speed (negative = reverse).
    pub speed: f32,
    /// Position in the track plane.
    pub pos: Vec2,
    /// Front-to-rear axle distance (m).
    pub wheelbase: f32,
}

impl Default for CarState {
    fn default() -> Self {
        Self {
            steer: 0.0,
            throttle: 0.0,
            brake: 0.0,
            heading: 0.0,
            speed: 0.0,
            pos: Vec2::ZERO,
            wheelbase: 2.6,
        }
    }
}

/// Advance the car by one fixed timestep. No-op when `dt <= 0`.
pub fn step(car: &mut CarState, config: &CarConfig, dt: f32) {
    if dt <= 0.0 {
        return;
    }

    let steer = car.steer.clamp(-config.max_steer, config.max_steer);
    let throttle = car.throttle.clamp(0.0, 1.0);
    let brake = car.brake.clamp(0.0, 1.0);

    // Rolling resistance uses the pre-integration speed.
    let mut acceleration = throttle * config.engine_accel - brake * config.brake_decel;
    acceleration -= car.speed.clamp(config.max_reverse_speed, config.max_speed)
        * config.rolling_friction
        * 0.02;

    let previous_speed = car.speed;
    car.speed += acceleration * dt;
    // Braking bleeds forward speed off to a stop, never into reverse.
    if brake > 0.0 && throttle <= 0.0 && previous_speed >= 0.0 && car.speed < 0.0 {
        car.speed = 0.0;
    }
    car.speed = car.speed.clamp(config.max_reverse_speed, config.max_speed);

    // Bicycle model; the epsilon guard keeps tan() out of the
    // near-straight singularity.
    let mut angular_velocity = 0.0;
    if steer.abs() > 1e-4 {
        let turn_radius = car.wheelbase / steer.tan();
        angular_velocity = car.speed / turn_radius;
    }
    car.heading += angular_velocity * dt;

    let forward = Vec2::new(car.heading.cos(), car.heading.sin());
    car.pos += forward * (car.speed * dt);
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn full_throttle_accelerates_to_max_speed() {
        let config = CarConfig::default();
        let mut car = CarState {
            throttle: 1.0,
            ..default()
        };
        let mut previous = car.speed;
        for _ in 0..60 * 30 {
            step(&mut car, &config, DT);
            assert!(
                car.speed > previous || car.speed == config.max_speed,
                "speed must rise until clamped"
            );
            previous = car.speed;
        }
        assert_eq!(car.speed, config.max_speed);
    }

    #[test]
    fn braking_stops_without_reversing() {
        let config = CarConfig::default();
        let mut car = CarState {
            speed: 30.0,
            brake: 1.0,
            ..default()
        };
        let mut previous = car.speed;
        for _ in 0..60 * 5 {
            step(&mut car, &config, DT);
            assert!(car.speed <= previous);
            assert!(car.speed >= 0.0, "braking alone must not reverse the car");
            previous = car.speed;
        }
        assert_eq!(car.speed, 0.0);
    }

    #[test]
    fn steering_sign_drives_heading_sign() {
        let config = CarConfig::default();
        for steer in [0.3, -0.3] {
            let mut car = CarState {
                speed: 10.0,
                steer,
                ..default()
            };
            step(&mut car, &config, DT);
            assert_eq!(car.heading.signum(), steer.signum());
        }
    }

    #[test]
    fn zero_steer_holds_heading() {
        let config = CarConfig::default();
        let mut car = CarState {
            speed: 25.0,
            heading: 1.2,
            ..default()
        };
        for _ in 0..120 {
            step(&mut car, &config, DT);
        }
        assert_eq!(car.heading, 1.2);
    }

    #[test]
    fn position_integrates_along_heading() {
        let config = CarConfig::default();
        let mut car = CarState {
            speed: 12.0,
            heading: std::f32::consts::FRAC_PI_2,
            ..default()
        };
        step(&mut car, &config, DT);
        assert!(car.pos.x.abs() < 1e-5);
        assert!(car.pos.y > 0.0);
    }

    #[test]
    fn out_of_range_inputs_are_clamped_not_rejected() {
        let config = CarConfig::default();
        let mut car = CarState {
            steer: 9.0,
            throttle: 5.0,
            brake: -2.0,
            speed: 10.0,
            ..default()
        };
        step(&mut car, &config, DT);
        // Steer clamped to max_steer, throttle to 1, brake to 0.
        assert!(car.heading > 0.0);
        assert!(car.speed > 10.0);
    }

    #[test]
    fn non_positive_dt_is_a_no_op() {
        let config = CarConfig::default();
        let mut car = CarState {
            speed: 10.0,
            throttle: 1.0,
            ..default()
        };
        let before = car;
        step(&mut car, &config, 0.0);
        step(&mut car, &config, -0.1);
        assert_eq!(car.speed, before.speed);
        assert_eq!(car.pos, before.pos);
    }
}

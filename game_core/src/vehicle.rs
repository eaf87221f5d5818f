//! Arcade vehicle model
//!
//! Throttle becomes impulses along the car's own axis, steering sets the
//! angular velocity from a fixed turning radius, and at the end of every tick
//! the velocity is snapped back onto the facing axis so the car never slides
//! sideways. Impulses first, snap last: swapping them changes the handling.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::input::{ControlInput, Steer, Throttle};
use crate::physics::{Body2D, BodyHandle, Material, PhysicsSpace, Pose};

/// Whether the car currently treats its facing as forward or backward travel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TravelDirection {
    #[default]
    Forward,
    Reverse,
}

impl TravelDirection {
    /// +1 forward, -1 reverse
    pub fn sign(self) -> f32 {
        match self {
            TravelDirection::Forward => 1.0,
            TravelDirection::Reverse => -1.0,
        }
    }
}

/// One car and the body it drives
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub body: BodyHandle,
    /// Reserved for a progressive steering rate; the model keeps it at zero.
    pub steering: f32,
    pub direction: TravelDirection,
}

impl Vehicle {
    /// Spawn a fresh car body into `space`
    pub fn spawn(space: &mut PhysicsSpace, pose: Pose, config: &Config) -> Self {
        let body = space.add_box(
            pose,
            Vec2::new(config.car_length, config.car_width),
            config.car_mass,
            Material {
                friction: config.car_friction,
                elasticity: 0.0,
            },
        );
        Self {
            body,
            steering: 0.0,
            direction: TravelDirection::Forward,
        }
    }

    pub fn reverse_sign(&self) -> f32 {
        self.direction.sign()
    }

    /// Apply one tick of driver input to the car's body
    pub fn update<B: Body2D + ?Sized>(
        &mut self,
        body: &mut B,
        input: ControlInput,
        config: &Config,
    ) {
        let forward = Vec2::from_angle(body.angle());
        let impulse = Vec2::X * config.car_impulse;
        let brake = impulse * config.brake_multiplier;

        match input.throttle {
            Throttle::Accelerate => {
                match self.direction {
                    TravelDirection::Forward => body.apply_local_impulse(impulse),
                    TravelDirection::Reverse => body.apply_local_impulse(brake),
                }
                if body.velocity().length() < config.reverse_switch_speed {
                    self.direction = TravelDirection::Forward;
                }
            }
            Throttle::Brake => {
                match self.direction {
                    TravelDirection::Reverse => body.apply_local_impulse(-impulse),
                    TravelDirection::Forward => body.apply_local_impulse(-brake),
                }
                if body.velocity().length() < config.reverse_switch_speed {
                    self.direction = TravelDirection::Reverse;
                }
            }
            Throttle::Handbrake => match self.direction {
                TravelDirection::Reverse => body.apply_local_impulse(brake),
                TravelDirection::Forward => body.apply_local_impulse(-brake),
            },
            Throttle::Idle => {
                let speed = (body.velocity().length() - config.free_deceleration).max(0.0);
                body.set_velocity(forward * self.reverse_sign() * speed);
            }
        }

        let speed = body.velocity().length();
        let radius = config.turning_radius();
        let omega = match input.steer {
            Steer::Left => -speed / radius * self.reverse_sign(),
            Steer::Right => speed / radius * self.reverse_sign(),
            Steer::Straight => 0.0,
        };
        body.set_angular_velocity(omega);

        // Drift cancellation and speed cap
        let speed = body.velocity().length().min(config.max_speed);
        body.set_velocity(forward * self.reverse_sign() * speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::MockBody;
    use proptest::prelude::*;

    fn car(direction: TravelDirection) -> Vehicle {
        let mut space = PhysicsSpace::new();
        let mut vehicle = Vehicle::spawn(&mut space, Pose::default(), &Config::new());
        vehicle.direction = direction;
        vehicle
    }

    fn travel(reverse: bool) -> TravelDirection {
        if reverse {
            TravelDirection::Reverse
        } else {
            TravelDirection::Forward
        }
    }

    fn body(angle: f32, velocity: Vec2) -> MockBody {
        MockBody::new(angle, velocity, Config::new().car_mass)
    }

    fn accelerate() -> ControlInput {
        ControlInput::new(Throttle::Accelerate, Steer::Straight)
    }

    fn brake() -> ControlInput {
        ControlInput::new(Throttle::Brake, Steer::Straight)
    }

    #[test]
    fn test_accelerate_adds_one_impulse_step() {
        let config = Config::new();
        let mut vehicle = car(TravelDirection::Forward);
        let mut b = body(0.0, Vec2::new(10.0, 0.0));

        vehicle.update(&mut b, accelerate(), &config);

        assert!((b.velocity.x - 11.0).abs() < 1e-5, "got {}", b.velocity.x);
        assert!(b.velocity.y.abs() < 1e-5);
        assert_eq!(vehicle.direction, TravelDirection::Forward);
        assert_eq!(b.omega, 0.0);
    }

    #[test]
    fn test_accelerate_from_rest_at_angle() {
        let config = Config::new();
        let mut vehicle = car(TravelDirection::Forward);
        let angle = std::f32::consts::FRAC_PI_2;
        let mut b = body(angle, Vec2::ZERO);

        vehicle.update(&mut b, accelerate(), &config);

        assert!(b.velocity.x.abs() < 1e-5);
        assert!((b.velocity.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_speed_is_capped() {
        let config = Config::new();
        let mut vehicle = car(TravelDirection::Forward);
        let mut b = body(0.0, Vec2::new(config.max_speed, 0.0));

        vehicle.update(&mut b, accelerate(), &config);

        assert!((b.velocity.length() - config.max_speed).abs() < 1e-3);
    }

    #[test]
    fn test_brake_at_speed_keeps_forward() {
        let config = Config::new();
        let mut vehicle = car(TravelDirection::Forward);
        let mut b = body(0.0, Vec2::new(50.0, 0.0));

        vehicle.update(&mut b, brake(), &config);

        // 25 impulse on 5 mass removes 5 units/s
        assert!((b.velocity.x - 45.0).abs() < 1e-4);
        assert_eq!(vehicle.direction, TravelDirection::Forward);
    }

    #[test]
    fn test_brake_when_slow_switches_to_reverse() {
        let config = Config::new();
        let mut vehicle = car(TravelDirection::Forward);
        let mut b = body(0.0, Vec2::new(3.0, 0.0));

        vehicle.update(&mut b, brake(), &config);

        assert_eq!(vehicle.direction, TravelDirection::Reverse);
        // Snapped onto the facing axis, pointing backwards
        assert!(b.velocity.x <= 0.0);
        assert!(b.velocity.y.abs() < 1e-5);
    }

    #[test]
    fn test_reversing_builds_speed_backwards() {
        let config = Config::new();
        let mut vehicle = car(TravelDirection::Reverse);
        let mut b = body(0.0, Vec2::new(-10.0, 0.0));

        vehicle.update(&mut b, brake(), &config);

        assert!((b.velocity.x + 11.0).abs() < 1e-5);
        assert_eq!(vehicle.direction, TravelDirection::Reverse);
    }

    #[test]
    fn test_accelerate_while_reversing_brakes_hard() {
        let config = Config::new();
        let mut vehicle = car(TravelDirection::Reverse);
        let mut b = body(0.0, Vec2::new(-40.0, 0.0));

        vehicle.update(&mut b, accelerate(), &config);

        assert!((b.velocity.x + 35.0).abs() < 1e-4);
        assert_eq!(vehicle.direction, TravelDirection::Reverse);
    }

    #[test]
    fn test_handbrake_opposes_travel() {
        let config = Config::new();
        let handbrake = ControlInput::new(Throttle::Handbrake, Steer::Straight);

        let mut forward = car(TravelDirection::Forward);
        let mut b = body(0.0, Vec2::new(30.0, 0.0));
        forward.update(&mut b, handbrake, &config);
        assert!((b.velocity.x - 25.0).abs() < 1e-4);

        let mut backward = car(TravelDirection::Reverse);
        let mut b = body(0.0, Vec2::new(-30.0, 0.0));
        backward.update(&mut b, handbrake, &config);
        assert!((b.velocity.x + 25.0).abs() < 1e-4);
        assert_eq!(backward.direction, TravelDirection::Reverse);
    }

    #[test]
    fn test_idle_decelerates() {
        let config = Config::new();
        let mut vehicle = car(TravelDirection::Forward);
        let mut b = body(0.0, Vec2::new(10.0, 0.0));

        vehicle.update(&mut b, ControlInput::IDLE, &config);

        let expected = 10.0 - config.free_deceleration;
        assert!((b.velocity.x - expected).abs() < 1e-5);
    }

    #[test]
    fn test_idle_clamps_at_zero() {
        let config = Config::new();
        let mut vehicle = car(TravelDirection::Forward);
        let mut b = body(0.0, Vec2::new(0.2, 0.0));

        vehicle.update(&mut b, ControlInput::IDLE, &config);
        assert_eq!(b.velocity, Vec2::ZERO);

        vehicle.update(&mut b, ControlInput::IDLE, &config);
        assert_eq!(b.velocity, Vec2::ZERO, "no oscillation around zero");
    }

    #[test]
    fn test_steering_sets_angular_velocity() {
        let config = Config::new();
        let radius = config.turning_radius();

        let mut vehicle = car(TravelDirection::Forward);
        let mut b = body(0.0, Vec2::new(33.0, 0.0));
        let right = ControlInput::new(Throttle::Handbrake, Steer::Right);
        vehicle.update(&mut b, right, &config);
        let speed = b.velocity.length();
        assert!((b.omega - speed / radius).abs() < 1e-5);

        let mut b = body(0.0, Vec2::new(33.0, 0.0));
        let left = ControlInput::new(Throttle::Handbrake, Steer::Left);
        vehicle.update(&mut b, left, &config);
        assert!((b.omega + b.velocity.length() / radius).abs() < 1e-5);
    }

    #[test]
    fn test_steering_flips_in_reverse() {
        let config = Config::new();
        let mut vehicle = car(TravelDirection::Reverse);
        let mut b = body(0.0, Vec2::new(-20.0, 0.0));

        let input = ControlInput::new(Throttle::Brake, Steer::Right);
        vehicle.update(&mut b, input, &config);

        assert!(b.omega < 0.0, "right turn in reverse rotates the other way");
    }

    #[test]
    fn test_straight_clears_rotation() {
        let config = Config::new();
        let mut vehicle = car(TravelDirection::Forward);
        let mut b = body(0.0, Vec2::new(20.0, 0.0));
        b.omega = 3.0;

        vehicle.update(&mut b, accelerate(), &config);

        assert_eq!(b.omega, 0.0);
    }

    #[test]
    fn test_lateral_velocity_is_removed() {
        let config = Config::new();
        let mut vehicle = car(TravelDirection::Forward);
        let mut b = body(0.0, Vec2::new(30.0, 40.0));

        vehicle.update(&mut b, accelerate(), &config);

        assert!(b.velocity.y.abs() < 1e-5, "sideways slip must be gone");
        assert!(b.velocity.x > 0.0);
    }

    #[test]
    fn test_fresh_vehicle_is_forward() {
        let vehicle = car(TravelDirection::Forward);
        assert_eq!(vehicle.reverse_sign(), 1.0);
        assert_eq!(vehicle.steering, 0.0);
    }

    fn any_input() -> impl Strategy<Value = ControlInput> {
        let throttle = prop_oneof![
            Just(Throttle::Accelerate),
            Just(Throttle::Brake),
            Just(Throttle::Handbrake),
            Just(Throttle::Idle),
        ];
        let steer = prop_oneof![Just(Steer::Left), Just(Steer::Right), Just(Steer::Straight)];
        (throttle, steer).prop_map(|(t, s)| ControlInput::new(t, s))
    }

    proptest! {
        #[test]
        fn prop_velocity_parallel_to_facing_and_capped(
            angle in -3.2f32..3.2,
            vx in -300.0f32..300.0,
            vy in -300.0f32..300.0,
            reverse in any::<bool>(),
            input in any_input(),
        ) {
            let config = Config::new();
            let direction = travel(reverse);
            let mut vehicle = car(direction);
            let mut b = body(angle, Vec2::new(vx, vy));

            vehicle.update(&mut b, input, &config);

            let forward = Vec2::from_angle(angle);
            let speed = b.velocity.length();
            prop_assert!(speed <= config.max_speed + 1e-3);
            prop_assert!(forward.perp_dot(b.velocity).abs() <= 1e-3 * speed.max(1.0));
        }

        #[test]
        fn prop_direction_only_flips_when_slow(
            speed in 0.0f32..300.0,
            reverse in any::<bool>(),
            input in any_input(),
        ) {
            let config = Config::new();
            let direction = travel(reverse);
            let mut vehicle = car(direction);
            let mut b = body(0.0, Vec2::new(speed * direction.sign(), 0.0));

            vehicle.update(&mut b, input, &config);

            // The largest single-tick change is one brake impulse
            let max_step = config.car_impulse * config.brake_multiplier / config.car_mass;
            if vehicle.direction != direction {
                prop_assert!(speed < config.reverse_switch_speed + max_step);
            }
        }
    }
}

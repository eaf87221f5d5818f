//! Seeded computer driver: both cars chase the ball
//!
//! Each car turns towards the ball and accelerates. Now and then a car backs
//! off for a short random spell so two cars pinned against each other or a
//! wall can come unstuck. The same seed always gives the same match.

use std::f32::consts::{PI, TAU};

use game_core::{ControlInput, InputSource, Pose, Snapshot, Steer, Throttle, TickInput};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Heading error (radians) below which the car drives straight
const AIM_TOLERANCE: f32 = 0.15;
/// Chance per tick of starting a back-off spell
const BACKOFF_CHANCE: f64 = 0.01;

/// Deterministic random source, seeded once per run
pub struct GameRng(pub StdRng);

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

pub struct Autopilot {
    rng: GameRng,
    /// Ticks left in each car's back-off spell
    backoff: [u32; 2],
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
            backoff: [0; 2],
        }
    }

    fn drive(&mut self, index: usize, pose: Pose, ball: Vec2) -> ControlInput {
        if self.backoff[index] == 0 && self.rng.0.gen_bool(BACKOFF_CHANCE) {
            self.backoff[index] = self.rng.0.gen_range(10..40);
            log::trace!(
                "autopilot: car {index} backing off for {} ticks",
                self.backoff[index]
            );
        }

        if self.backoff[index] > 0 {
            self.backoff[index] -= 1;
            return ControlInput::new(Throttle::Brake, Steer::Straight);
        }

        ControlInput::new(Throttle::Accelerate, steer_towards(pose, ball))
    }
}

impl InputSource for Autopilot {
    fn poll(&mut self, snapshot: &Snapshot) -> TickInput {
        let a = self.drive(0, snapshot.vehicles[0], snapshot.ball);
        let b = self.drive(1, snapshot.vehicles[1], snapshot.ball);
        TickInput::new([a, b])
    }
}

/// Signed angle from the car's heading to `target`, in (-PI, PI]
pub fn heading_error(pose: Pose, target: Vec2) -> f32 {
    let to_target = target - pose.position;
    if to_target == Vec2::ZERO {
        return 0.0;
    }
    let error = (to_target.y.atan2(to_target.x) - pose.angle).rem_euclid(TAU);
    if error > PI {
        error - TAU
    } else {
        error
    }
}

/// Left steering lowers the heading angle, right raises it
pub fn steer_towards(pose: Pose, target: Vec2) -> Steer {
    let error = heading_error(pose, target);
    if error < -AIM_TOLERANCE {
        Steer::Left
    } else if error > AIM_TOLERANCE {
        Steer::Right
    } else {
        Steer::Straight
    }
}

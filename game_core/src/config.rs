use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::params::Params;
use crate::physics::Pose;

/// Match configuration
///
/// Every field defaults to its [`Params`] constant; the runner may override
/// any subset from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub car_length: f32,
    pub car_width: f32,
    pub car_mass: f32,
    pub car_impulse: f32,
    pub car_turn_degrees: f32,
    pub brake_multiplier: f32,
    pub free_deceleration: f32,
    pub car_friction: f32,
    pub max_speed: f32,
    pub reverse_switch_speed: f32,
    pub field_width: f32,
    pub field_height: f32,
    pub goal_height: f32,
    pub goal_depth: f32,
    pub field_friction: f32,
    pub field_elasticity: f32,
    pub ball_mass: f32,
    pub ball_radius: f32,
    pub ball_elasticity: f32,
    pub ball_friction: f32,
    pub ball_deceleration: f32,
    pub second_car_y_offset: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            car_length: Params::CAR_LENGTH,
            car_width: Params::CAR_WIDTH,
            car_mass: Params::CAR_MASS,
            car_impulse: Params::CAR_IMPULSE,
            car_turn_degrees: Params::CAR_TURN_DEGREES,
            brake_multiplier: Params::BRAKE_MULTIPLIER,
            free_deceleration: Params::FREE_DECELERATION,
            car_friction: Params::CAR_FRICTION,
            max_speed: Params::MAX_SPEED,
            reverse_switch_speed: Params::REVERSE_SWITCH_SPEED,
            field_width: Params::FIELD_WIDTH,
            field_height: Params::FIELD_HEIGHT,
            goal_height: Params::GOAL_HEIGHT,
            goal_depth: Params::GOAL_DEPTH,
            field_friction: Params::FIELD_FRICTION,
            field_elasticity: Params::FIELD_ELASTICITY,
            ball_mass: Params::BALL_MASS,
            ball_radius: Params::BALL_RADIUS,
            ball_elasticity: Params::BALL_ELASTICITY,
            ball_friction: Params::BALL_FRICTION,
            ball_deceleration: Params::BALL_DECELERATION,
            second_car_y_offset: Params::SECOND_CAR_Y_OFFSET,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject values that would break the physics space or the motion model
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("car_length", self.car_length),
            ("car_width", self.car_width),
            ("car_mass", self.car_mass),
            ("max_speed", self.max_speed),
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("goal_depth", self.goal_depth),
            ("ball_mass", self.ball_mass),
            ("ball_radius", self.ball_radius),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidConfig {
                    field,
                    reason: "must be finite and positive",
                });
            }
        }

        let non_negative = [
            ("car_impulse", self.car_impulse),
            ("brake_multiplier", self.brake_multiplier),
            ("free_deceleration", self.free_deceleration),
            ("car_friction", self.car_friction),
            ("reverse_switch_speed", self.reverse_switch_speed),
            ("field_friction", self.field_friction),
            ("field_elasticity", self.field_elasticity),
            ("ball_elasticity", self.ball_elasticity),
            ("ball_friction", self.ball_friction),
            ("ball_deceleration", self.ball_deceleration),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::InvalidConfig {
                    field,
                    reason: "must be finite and non-negative",
                });
            }
        }

        if !(self.car_turn_degrees > 0.0 && self.car_turn_degrees < 180.0) {
            return Err(SimError::InvalidConfig {
                field: "car_turn_degrees",
                reason: "must lie strictly between 0 and 180",
            });
        }
        if !(self.goal_height > 0.0 && self.goal_height < self.field_height) {
            return Err(SimError::InvalidConfig {
                field: "goal_height",
                reason: "must be positive and smaller than field_height",
            });
        }
        if self.goal_depth >= self.field_width {
            return Err(SimError::InvalidConfig {
                field: "goal_depth",
                reason: "must be smaller than field_width",
            });
        }
        Ok(())
    }

    /// Full drawable width: the field plus one goal box
    pub fn total_width(&self) -> f32 {
        self.field_width + self.goal_depth
    }

    /// Height of the wall segment above (and below) each goal mouth
    pub fn side_wall(&self) -> f32 {
        (self.field_height - self.goal_height) / 2.0
    }

    /// Crossing this x towards the left scores for the right side
    pub fn left_goal_x(&self) -> f32 {
        self.goal_depth
    }

    /// Crossing this x towards the right scores for the left side
    pub fn right_goal_x(&self) -> f32 {
        self.field_width
    }

    /// Upper edge of both goal mouths
    pub fn top_goal_y(&self) -> f32 {
        self.side_wall()
    }

    /// Lower edge of both goal mouths
    pub fn bottom_goal_y(&self) -> f32 {
        self.side_wall() + self.goal_height
    }

    pub fn ball_spawn(&self) -> Vec2 {
        Vec2::new(self.total_width() / 2.0, self.field_height / 2.0)
    }

    /// Spawn pose for vehicle 0 (left, facing east) or 1 (right, facing west)
    pub fn car_spawn(&self, index: usize) -> Pose {
        let third = self.total_width() / 3.0;
        let mid_y = self.field_height / 2.0;
        if index == 0 {
            Pose::new(Vec2::new(third, mid_y), 0.0)
        } else {
            Pose::new(
                Vec2::new(2.0 * third, mid_y + self.second_car_y_offset),
                std::f32::consts::PI,
            )
        }
    }

    pub fn turning_radius(&self) -> f32 {
        self.car_length / self.car_turn_degrees.to_radians().sin()
    }
}

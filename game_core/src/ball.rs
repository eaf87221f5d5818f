use glam::Vec2;

use crate::config::Config;
use crate::physics::{Body2D, BodyHandle, Material, PhysicsSpace};

/// The match ball
#[derive(Debug, Clone)]
pub struct Ball {
    pub body: BodyHandle,
}

impl Ball {
    /// Spawn the ball at `position`, optionally kicked off by `impulse`
    pub fn spawn(space: &mut PhysicsSpace, position: Vec2, impulse: Vec2, config: &Config) -> Self {
        let body = space.add_circle(
            position,
            config.ball_radius,
            config.ball_mass,
            Material {
                friction: config.ball_friction,
                elasticity: config.ball_elasticity,
            },
        );
        if impulse != Vec2::ZERO {
            if let Some(mut b) = space.body_mut(body) {
                b.apply_local_impulse(impulse);
            }
        }
        Self { body }
    }

    /// Linear rolling drag: lose `deceleration` speed per tick, keep heading.
    /// A ball at rest has no heading and is left alone.
    pub fn decelerate<B: Body2D + ?Sized>(body: &mut B, deceleration: f32) {
        let velocity = body.velocity();
        let Some(heading) = velocity.try_normalize() else {
            return;
        };
        let speed = (velocity.length() - deceleration).max(0.0);
        body.set_velocity(heading * speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::MockBody;
    use proptest::prelude::*;

    #[test]
    fn test_decelerate_preserves_heading() {
        let mut b = MockBody::new(0.0, Vec2::new(3.0, 4.0), 0.1);
        Ball::decelerate(&mut b, 0.1);
        assert!((b.velocity.length() - 4.9).abs() < 1e-5);
        let heading = b.velocity.normalize();
        assert!((heading - Vec2::new(0.6, 0.8)).length() < 1e-5);
    }

    #[test]
    fn test_decelerate_clamps_at_zero() {
        let mut b = MockBody::new(0.0, Vec2::new(0.05, 0.0), 0.1);
        Ball::decelerate(&mut b, 0.1);
        assert_eq!(b.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_decelerate_at_rest_is_noop() {
        let mut b = MockBody::new(0.0, Vec2::ZERO, 0.1);
        Ball::decelerate(&mut b, 0.1);
        assert_eq!(b.velocity, Vec2::ZERO);
        assert!(!b.velocity.x.is_nan());
    }

    #[test]
    fn test_spawn_with_kickoff_impulse() {
        let config = Config::new();
        let mut space = PhysicsSpace::new();
        let kick = Vec2::new(1.0, 0.0);
        let ball = Ball::spawn(&mut space, config.ball_spawn(), kick, &config);

        let vel = space.velocity(ball.body).unwrap();
        assert!((vel.x - 1.0 / config.ball_mass).abs() < 1e-2);
        assert!(vel.y.abs() < 1e-4);
    }

    #[test]
    fn test_spawn_without_impulse_is_at_rest() {
        let config = Config::new();
        let mut space = PhysicsSpace::new();
        let ball = Ball::spawn(&mut space, config.ball_spawn(), Vec2::ZERO, &config);

        assert_eq!(space.velocity(ball.body).unwrap(), Vec2::ZERO);
        let pose = space.pose(ball.body).unwrap();
        assert!((pose.position - config.ball_spawn()).length() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_speed_drops_by_constant_never_negative(
            vx in -500.0f32..500.0,
            vy in -500.0f32..500.0,
            decel in 0.0f32..5.0,
        ) {
            let before = Vec2::new(vx, vy);
            let mut b = MockBody::new(0.0, before, 0.1);

            Ball::decelerate(&mut b, decel);

            let expected = (before.length() - decel).max(0.0);
            prop_assert!((b.velocity.length() - expected).abs() < 1e-3);
            if b.velocity != Vec2::ZERO {
                prop_assert!(b.velocity.dot(before) > 0.0, "heading must not invert");
            }
        }
    }
}

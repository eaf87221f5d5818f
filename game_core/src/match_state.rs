//! Match state: the two cars, the ball, the score, and the goal/reset rules
//!
//! The physics space is not owned here; it is passed in by whoever drives the
//! match so bodies can be added and removed on reset.

use glam::Vec2;

use crate::arena::{Arena, GoalLines};
use crate::ball::Ball;
use crate::config::Config;
use crate::error::{Result, SimError};
use crate::input::ControlInput;
use crate::physics::{PhysicsSpace, Pose};
use crate::resources::{Events, Score, Side, Snapshot};
use crate::vehicle::Vehicle;

pub struct MatchState {
    pub config: Config,
    pub vehicles: [Vehicle; 2],
    pub ball: Ball,
    pub score: Score,
    /// Also gates goal detection
    pub walls_enabled: bool,
    /// Only built when walls are enabled
    pub arena: Option<Arena>,
    goal_lines: GoalLines,
}

impl MatchState {
    /// Validate `config`, build the arena if requested and spawn every object
    pub fn new(space: &mut PhysicsSpace, config: Config, walls_enabled: bool) -> Result<Self> {
        config.validate()?;

        let arena = walls_enabled.then(|| {
            let arena = Arena::new(&config);
            arena.materialize(space, &config);
            arena
        });

        let (ball, vehicles) = spawn_objects(space, &config);
        let state = Self {
            goal_lines: GoalLines::from_config(&config),
            config,
            vehicles,
            ball,
            score: Score::new(),
            walls_enabled,
            arena,
        };
        state.ensure_bodies(space)?;

        let walls = space.static_count();
        log::debug!("match: created with {walls} wall colliders");
        Ok(state)
    }

    fn ensure_bodies(&self, space: &PhysicsSpace) -> Result<()> {
        if !space.contains(self.ball.body) {
            return Err(SimError::MissingBody("ball"));
        }
        if self.vehicles.iter().any(|v| !space.contains(v.body)) {
            return Err(SimError::MissingBody("vehicle"));
        }
        Ok(())
    }

    /// Everything the core does in one tick before the physics step:
    /// cars in fixed order, ball drag, then the goal check.
    pub fn update(
        &mut self,
        space: &mut PhysicsSpace,
        controls: &[ControlInput; 2],
        events: &mut Events,
    ) {
        for (vehicle, input) in self.vehicles.iter_mut().zip(controls) {
            if let Some(mut body) = space.body_mut(vehicle.body) {
                vehicle.update(&mut body, *input, &self.config);
            }
        }

        if let Some(mut body) = space.body_mut(self.ball.body) {
            Ball::decelerate(&mut body, self.config.ball_deceleration);
        }

        if self.walls_enabled {
            self.check_goal(space, events);
        }
    }

    /// Score and reset once the ball is past a goal line.
    ///
    /// Past the line but wide of the posts still resets, without a point.
    /// Does nothing with walls disabled. Returns the scoring side, if any.
    pub fn check_goal(&mut self, space: &mut PhysicsSpace, events: &mut Events) -> Option<Side> {
        if !self.walls_enabled {
            return None;
        }
        let position = space.pose(self.ball.body)?.position;
        let crossing = self.goal_lines.crossing(position)?;

        let scorer = crossing.scorer();
        if let Some(side) = scorer {
            self.score.increment(side);
            events.record_goal(side);
            log::info!("goal for {side:?} ({})", self.score);
        } else {
            log::debug!(
                "ball left past the {:?} line outside the mouth at y={:.1}",
                crossing.end,
                position.y
            );
        }

        self.reset(space);
        events.reset = true;
        scorer
    }

    /// Remove the cars and ball from the space and respawn them at their
    /// fixed poses. The score is kept.
    pub fn reset(&mut self, space: &mut PhysicsSpace) {
        for vehicle in &self.vehicles {
            space.remove_body(vehicle.body);
        }
        space.remove_body(self.ball.body);

        let (ball, vehicles) = spawn_objects(space, &self.config);
        self.ball = ball;
        self.vehicles = vehicles;
        log::debug!("match: objects reset to spawn");
    }

    pub fn ball_position(&self, space: &PhysicsSpace) -> Vec2 {
        space
            .pose(self.ball.body)
            .map(|p| p.position)
            .unwrap_or_else(|| self.config.ball_spawn())
    }

    pub fn vehicle_pose(&self, space: &PhysicsSpace, index: usize) -> Pose {
        space
            .pose(self.vehicles[index].body)
            .unwrap_or_else(|| self.config.car_spawn(index))
    }

    pub fn snapshot(&self, space: &PhysicsSpace, tick: u64) -> Snapshot {
        Snapshot {
            tick,
            vehicles: [self.vehicle_pose(space, 0), self.vehicle_pose(space, 1)],
            ball: self.ball_position(space),
            score: self.score,
        }
    }

    pub fn goal_lines(&self) -> GoalLines {
        self.goal_lines
    }
}

fn spawn_objects(space: &mut PhysicsSpace, config: &Config) -> (Ball, [Vehicle; 2]) {
    let ball = Ball::spawn(space, config.ball_spawn(), Vec2::ZERO, config);
    let vehicles = [
        Vehicle::spawn(space, config.car_spawn(0), config),
        Vehicle::spawn(space, config.car_spawn(1), config),
    ];
    (ball, vehicles)
}

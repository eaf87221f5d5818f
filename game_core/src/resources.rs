use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::physics::Pose;

/// Time resource for tracking simulation time
#[derive(Debug, Clone, Copy, Default)]
pub struct Time {
    pub dt: f32,   // Delta time for this tick (before clamping)
    pub now: f32,  // Total simulated time
    pub tick: u64, // Ticks completed
}

impl Time {
    pub fn new(dt: f32, now: f32) -> Self {
        Self { dt, now, tick: 0 }
    }
}

/// Field end / team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Match score; persists across resets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub left: u32,
    pub right: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, side: Side) {
        match side {
            Side::Left => self.left = self.left.saturating_add(1),
            Side::Right => self.right = self.right.saturating_add(1),
        }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Left: {} Right: {}", self.left, self.right)
    }
}

/// Events that occurred during this tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Events {
    pub left_scored: bool,
    pub right_scored: bool,
    pub reset: bool,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.left_scored = false;
        self.right_scored = false;
        self.reset = false;
    }

    pub fn record_goal(&mut self, side: Side) {
        match side {
            Side::Left => self.left_scored = true,
            Side::Right => self.right_scored = true,
        }
    }

    pub fn scorer(&self) -> Option<Side> {
        if self.left_scored {
            Some(Side::Left)
        } else if self.right_scored {
            Some(Side::Right)
        } else {
            None
        }
    }
}

/// Read-only view of one tick, handed to presenters and input sources
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub vehicles: [Pose; 2],
    pub ball: Vec2,
    pub score: Score,
}

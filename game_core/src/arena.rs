use glam::Vec2;

use crate::config::Config;
use crate::physics::{Material, PhysicsSpace};
use crate::resources::Side;

/// Static wall line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }
}

/// Field boundary with a goal box on each end
///
/// ```text
///        D                         W
///   +----+-------------------------+----+   y = 0
///        |                         |
///   +----+ S                     S +----+
///   |                                   |   goal mouths
///   +----+ S+G                 S+G +----+
///        |                         |
///   +----+-------------------------+----+   y = H
/// ```
#[derive(Debug, Clone)]
pub struct Arena {
    pub segments: Vec<Segment>,
}

impl Arena {
    pub fn new(config: &Config) -> Self {
        let w = config.field_width;
        let h = config.field_height;
        let d = config.goal_depth;
        let g = config.goal_height;
        let s = config.side_wall();
        let p = |x: f32, y: f32| Vec2::new(x, y);

        let segments = vec![
            // Long walls between the goal lines
            Segment::new(p(d, 0.0), p(w, 0.0)),
            Segment::new(p(w, h), p(d, h)),
            // Right goal: upper post, box, lower post
            Segment::new(p(w, 0.0), p(w, s)),
            Segment::new(p(w, s), p(w + d, s)),
            Segment::new(p(w + d, s), p(w + d, s + g)),
            Segment::new(p(w, s + g), p(w + d, s + g)),
            Segment::new(p(w, s + g), p(w, h)),
            // Left goal
            Segment::new(p(d, s), p(d, 0.0)),
            Segment::new(p(d, s), p(0.0, s)),
            Segment::new(p(0.0, s), p(0.0, s + g)),
            Segment::new(p(d, s + g), p(0.0, s + g)),
            Segment::new(p(d, s + g), p(d, h)),
        ];

        Self { segments }
    }

    /// Add every wall to `space` as a static segment
    pub fn materialize(&self, space: &mut PhysicsSpace, config: &Config) {
        let material = Material {
            friction: config.field_friction,
            elasticity: config.field_elasticity,
        };
        for segment in &self.segments {
            space.add_static_segment(segment.a, segment.b, material);
        }
        log::debug!("arena: {} wall segments added", self.segments.len());
    }
}

/// A ball centre beyond one of the goal lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalCrossing {
    /// Which end of the field the ball left through
    pub end: Side,
    /// Whether it went in between the posts
    pub in_mouth: bool,
}

impl GoalCrossing {
    /// The side credited with the point, if any
    pub fn scorer(&self) -> Option<Side> {
        self.in_mouth.then(|| self.end.opponent())
    }
}

/// Goal line coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalLines {
    pub left_x: f32,
    pub right_x: f32,
    pub top_y: f32,
    pub bottom_y: f32,
}

impl GoalLines {
    pub fn from_config(config: &Config) -> Self {
        Self {
            left_x: config.left_goal_x(),
            right_x: config.right_goal_x(),
            top_y: config.top_goal_y(),
            bottom_y: config.bottom_goal_y(),
        }
    }

    /// Open interval: a ball exactly on a post edge is not in the mouth
    pub fn in_mouth(&self, y: f32) -> bool {
        y > self.top_y && y < self.bottom_y
    }

    pub fn crossing(&self, position: Vec2) -> Option<GoalCrossing> {
        let end = if position.x < self.left_x {
            Side::Left
        } else if position.x > self.right_x {
            Side::Right
        } else {
            return None;
        };
        Some(GoalCrossing {
            end,
            in_mouth: self.in_mouth(position.y),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_has_twelve_walls() {
        let arena = Arena::new(&Config::new());
        assert_eq!(arena.segments.len(), 12);
    }

    #[test]
    fn test_walls_stay_inside_drawable_area() {
        let config = Config::new();
        let arena = Arena::new(&config);
        for seg in &arena.segments {
            for p in [seg.a, seg.b] {
                assert!(p.x >= 0.0 && p.x <= config.total_width() + 1e-3);
                assert!(p.y >= 0.0 && p.y <= config.field_height + 1e-3);
            }
        }
    }

    #[test]
    fn test_materialize_adds_static_colliders_only() {
        let config = Config::new();
        let mut space = PhysicsSpace::new();
        Arena::new(&config).materialize(&mut space, &config);
        assert_eq!(space.static_count(), 12);
        assert_eq!(space.body_count(), 0);
    }

    #[test]
    fn test_crossing_inside_field_is_none() {
        let lines = GoalLines::from_config(&Config::new());
        assert_eq!(lines.crossing(Vec2::new(200.0, 150.0)), None);
        assert_eq!(lines.crossing(Vec2::new(lines.left_x, 150.0)), None);
    }

    #[test]
    fn test_crossing_left_mouth_scores_for_right() {
        let lines = GoalLines::from_config(&Config::new());
        let mouth = (lines.top_y + lines.bottom_y) / 2.0;
        let crossing = lines.crossing(Vec2::new(lines.left_x - 1.0, mouth)).unwrap();
        assert_eq!(crossing.end, Side::Left);
        assert_eq!(crossing.scorer(), Some(Side::Right));
    }

    #[test]
    fn test_crossing_right_mouth_scores_for_left() {
        let lines = GoalLines::from_config(&Config::new());
        let crossing = lines
            .crossing(Vec2::new(lines.right_x + 1.0, lines.top_y + 1.0))
            .unwrap();
        assert_eq!(crossing.scorer(), Some(Side::Left));
    }

    #[test]
    fn test_crossing_wide_of_posts_has_no_scorer() {
        let lines = GoalLines::from_config(&Config::new());
        let crossing = lines
            .crossing(Vec2::new(lines.left_x - 1.0, lines.top_y - 10.0))
            .unwrap();
        assert!(!crossing.in_mouth);
        assert_eq!(crossing.scorer(), None);

        let on_post = lines
            .crossing(Vec2::new(lines.right_x + 1.0, lines.bottom_y))
            .unwrap();
        assert_eq!(on_post.scorer(), None);
    }
}

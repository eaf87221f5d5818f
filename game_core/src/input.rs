//! Per-tick control input
//!
//! Two independent axes. Within an axis the first held key wins, in the
//! order the variants are declared.

use serde::{Deserialize, Serialize};

/// Throttle axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Throttle {
    Accelerate,
    Brake,
    Handbrake,
    #[default]
    Idle,
}

/// Steering axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Steer {
    Left,
    Right,
    #[default]
    Straight,
}

/// What one vehicle is asked to do this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlInput {
    pub throttle: Throttle,
    pub steer: Steer,
}

impl ControlInput {
    pub const IDLE: Self = Self {
        throttle: Throttle::Idle,
        steer: Steer::Straight,
    };

    pub fn new(throttle: Throttle, steer: Steer) -> Self {
        Self { throttle, steer }
    }

    /// Map held keys onto the two axes
    pub fn from_keys(keys: KeySnapshot) -> Self {
        let throttle = if keys.up {
            Throttle::Accelerate
        } else if keys.down {
            Throttle::Brake
        } else if keys.space {
            Throttle::Handbrake
        } else {
            Throttle::Idle
        };

        let steer = if keys.left {
            Steer::Left
        } else if keys.right {
            Steer::Right
        } else {
            Steer::Straight
        };

        Self { throttle, steer }
    }

    /// The minimal key set that maps back onto this input
    pub fn to_keys(self) -> KeySnapshot {
        KeySnapshot {
            up: self.throttle == Throttle::Accelerate,
            down: self.throttle == Throttle::Brake,
            space: self.throttle == Throttle::Handbrake,
            left: self.steer == Steer::Left,
            right: self.steer == Steer::Right,
        }
    }
}

/// Which of the driving keys are held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySnapshot {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub space: bool,
}

impl KeySnapshot {
    const UP: u8 = 1 << 0;
    const DOWN: u8 = 1 << 1;
    const LEFT: u8 = 1 << 2;
    const RIGHT: u8 = 1 << 3;
    const SPACE: u8 = 1 << 4;

    /// Pack into a bitmask for the wire
    pub fn to_bits(self) -> u8 {
        let mut bits = 0;
        if self.up {
            bits |= Self::UP;
        }
        if self.down {
            bits |= Self::DOWN;
        }
        if self.left {
            bits |= Self::LEFT;
        }
        if self.right {
            bits |= Self::RIGHT;
        }
        if self.space {
            bits |= Self::SPACE;
        }
        bits
    }

    /// Unknown bits are ignored
    pub fn from_bits(bits: u8) -> Self {
        Self {
            up: bits & Self::UP != 0,
            down: bits & Self::DOWN != 0,
            left: bits & Self::LEFT != 0,
            right: bits & Self::RIGHT != 0,
            space: bits & Self::SPACE != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keys_is_idle() {
        assert_eq!(
            ControlInput::from_keys(KeySnapshot::default()),
            ControlInput::IDLE
        );
    }

    #[test]
    fn test_up_wins_over_down_and_space() {
        let keys = KeySnapshot {
            up: true,
            down: true,
            space: true,
            ..KeySnapshot::default()
        };
        assert_eq!(ControlInput::from_keys(keys).throttle, Throttle::Accelerate);
    }

    #[test]
    fn test_down_wins_over_space() {
        let keys = KeySnapshot {
            down: true,
            space: true,
            ..KeySnapshot::default()
        };
        assert_eq!(ControlInput::from_keys(keys).throttle, Throttle::Brake);
    }

    #[test]
    fn test_left_wins_over_right() {
        let keys = KeySnapshot {
            left: true,
            right: true,
            ..KeySnapshot::default()
        };
        assert_eq!(ControlInput::from_keys(keys).steer, Steer::Left);
    }

    #[test]
    fn test_steering_is_independent_of_throttle() {
        let keys = KeySnapshot {
            space: true,
            right: true,
            ..KeySnapshot::default()
        };
        assert_eq!(
            ControlInput::from_keys(keys),
            ControlInput::new(Throttle::Handbrake, Steer::Right)
        );
    }

    #[test]
    fn test_to_keys_maps_back() {
        for throttle in [
            Throttle::Accelerate,
            Throttle::Brake,
            Throttle::Handbrake,
            Throttle::Idle,
        ] {
            for steer in [Steer::Left, Steer::Right, Steer::Straight] {
                let input = ControlInput::new(throttle, steer);
                assert_eq!(ControlInput::from_keys(input.to_keys()), input);
            }
        }
    }

    #[test]
    fn test_key_bits() {
        let keys = KeySnapshot {
            up: true,
            right: true,
            ..KeySnapshot::default()
        };
        assert_eq!(keys.to_bits(), 0b0_1001);
        assert_eq!(KeySnapshot::from_bits(keys.to_bits()), keys);
        assert_eq!(KeySnapshot::from_bits(0b1110_0000), KeySnapshot::default());
    }
}

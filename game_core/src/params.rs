/// Tuning parameters for car soccer
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Car
    pub const CAR_LENGTH: f32 = 16.5;
    pub const CAR_WIDTH: f32 = 8.5;
    pub const CAR_MASS: f32 = 5.0;
    pub const CAR_IMPULSE: f32 = 5.0; // Impulse per tick for throttle input
    pub const CAR_TURN_DEGREES: f32 = 30.0; // Fixed steering angle
    pub const BRAKE_MULTIPLIER: f32 = 5.0; // Multiplier of CAR_IMPULSE when braking
    pub const FREE_DECELERATION: f32 = 0.5; // Speed lost per tick with no throttle
    pub const CAR_FRICTION: f32 = 0.5;
    pub const MAX_SPEED: f32 = 200.0;
    pub const REVERSE_SWITCH_SPEED: f32 = 5.0; // Below this, travel direction may flip

    // Field
    pub const FIELD_WIDTH: f32 = 426.72;
    pub const FIELD_HEIGHT: f32 = 304.8;
    pub const GOAL_HEIGHT: f32 = 81.28;
    pub const GOAL_DEPTH: f32 = 25.4;
    pub const FIELD_FRICTION: f32 = 0.3;
    pub const FIELD_ELASTICITY: f32 = 0.5;

    // Ball
    pub const BALL_MASS: f32 = 0.1;
    pub const BALL_RADIUS: f32 = 6.85 / 2.0;
    pub const BALL_ELASTICITY: f32 = 1.0;
    pub const BALL_FRICTION: f32 = 0.5;
    pub const BALL_DECELERATION: f32 = 0.1; // Speed lost per tick

    // Spawns
    pub const SECOND_CAR_Y_OFFSET: f32 = 50.0;

    // Loop
    pub const TICK_RATE: u32 = 60;
    pub const MAX_DT: f32 = 0.1; // Clamp to avoid instability after stalls
    pub const HEARTBEAT_TICKS: u64 = 60;
}

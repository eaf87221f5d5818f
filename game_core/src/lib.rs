pub mod arena;
pub mod ball;
pub mod config;
pub mod error;
pub mod input;
pub mod match_state;
pub mod params;
pub mod physics;
pub mod resources;
pub mod sim_loop;
pub mod vehicle;

pub use arena::*;
pub use ball::*;
pub use config::*;
pub use error::*;
pub use input::*;
pub use match_state::*;
pub use params::*;
pub use physics::*;
pub use resources::*;
pub use sim_loop::*;
pub use vehicle::*;

/// Run one deterministic tick of the match
///
/// Control inputs are applied to both cars, the ball is slowed, goals are
/// checked, then the physics space is advanced by `time.dt` clamped to
/// `Params::MAX_DT`.
pub fn step(
    state: &mut MatchState,
    space: &mut PhysicsSpace,
    time: &mut Time,
    controls: &[ControlInput; 2],
    events: &mut Events,
) {
    // Clamp dt to prevent large jumps
    let clamped_dt = time.dt.clamp(0.0, Params::MAX_DT);

    // Clear events at start of tick
    events.clear();

    // 1. Cars, ball drag, goal check
    state.update(space, controls, events);

    // 2. Integrate and resolve collisions
    space.step(clamped_dt);

    time.now += clamped_dt;
    time.tick += 1;

    log::trace!(
        "tick {} dt={:.4} ball={:?}",
        time.tick,
        clamped_dt,
        state.ball_position(space)
    );
}

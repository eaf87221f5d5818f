//! Fixed-rate driver around [`MatchState`]
//!
//! Time, control input, and output are collaborators behind the [`Clock`],
//! [`InputSource`] and [`Presenter`] traits so the loop runs the same way
//! against a real window, a headless runner, or a test harness.

use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::Result;
use crate::input::ControlInput;
use crate::match_state::MatchState;
use crate::params::Params;
use crate::physics::PhysicsSpace;
use crate::resources::{Events, Score, Snapshot, Time};

/// Source of time for frame pacing, in seconds
pub trait Clock {
    fn now(&self) -> f64;
    fn sleep(&mut self, secs: f64);
}

impl<T: Clock + ?Sized> Clock for Box<T> {
    fn now(&self) -> f64 {
        (**self).now()
    }

    fn sleep(&mut self, secs: f64) {
        (**self).sleep(secs)
    }
}

/// Wall-clock time
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn sleep(&mut self, secs: f64) {
        if secs > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(secs));
        }
    }
}

/// Simulated time that only moves when the loop sleeps.
/// Every tick then sees exactly one frame of dt and nothing blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStepClock {
    now: f64,
}

impl FixedStepClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for FixedStepClock {
    fn now(&self) -> f64 {
        self.now
    }

    fn sleep(&mut self, secs: f64) {
        self.now += secs.max(0.0);
    }
}

/// Control inputs for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickInput {
    /// Car A then car B
    pub controls: [ControlInput; 2],
    pub quit: bool,
}

impl TickInput {
    pub fn new(controls: [ControlInput; 2]) -> Self {
        Self {
            controls,
            quit: false,
        }
    }

    pub fn quit() -> Self {
        Self {
            controls: [ControlInput::IDLE; 2],
            quit: true,
        }
    }
}

/// Polled once per tick, before the match is updated
pub trait InputSource {
    fn poll(&mut self, snapshot: &Snapshot) -> TickInput;
}

impl<T: InputSource + ?Sized> InputSource for Box<T> {
    fn poll(&mut self, snapshot: &Snapshot) -> TickInput {
        (**self).poll(snapshot)
    }
}

/// Both cars coast forever
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleInput;

impl InputSource for IdleInput {
    fn poll(&mut self, _snapshot: &Snapshot) -> TickInput {
        TickInput::default()
    }
}

/// Receives the state after every tick
pub trait Presenter {
    fn present(&mut self, snapshot: &Snapshot, events: &Events);
}

impl<T: Presenter + ?Sized> Presenter for Box<T> {
    fn present(&mut self, snapshot: &Snapshot, events: &Events) {
        (**self).present(snapshot, events)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _snapshot: &Snapshot, _events: &Events) {}
}

pub struct SimulationLoop<C: Clock, I: InputSource, P: Presenter> {
    pub state: MatchState,
    pub space: PhysicsSpace,
    pub time: Time,
    pub events: Events,
    clock: C,
    input: I,
    presenter: P,
    tick_rate: u32,
    max_ticks: Option<u64>,
    exit_requested: bool,
}

impl<C: Clock, I: InputSource, P: Presenter> SimulationLoop<C, I, P> {
    /// Build the physics space and match. Fails on an invalid config.
    pub fn new(
        config: Config,
        walls_enabled: bool,
        clock: C,
        input: I,
        presenter: P,
    ) -> Result<Self> {
        let mut space = PhysicsSpace::new();
        let state = MatchState::new(&mut space, config, walls_enabled)?;
        Ok(Self {
            state,
            space,
            time: Time::default(),
            events: Events::new(),
            clock,
            input,
            presenter,
            tick_rate: Params::TICK_RATE,
            max_ticks: None,
            exit_requested: false,
        })
    }

    /// Frames per second to pace to; zero is treated as one
    pub fn with_tick_rate(mut self, tick_rate: u32) -> Self {
        self.tick_rate = tick_rate.max(1);
        self
    }

    /// Stop after this many ticks in total
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn score(&self) -> Score {
        self.state.score
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot(&self.space, self.time.tick)
    }

    /// Stop at the next tick boundary
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Run one tick with the given controls and elapsed time, then present
    pub fn tick(&mut self, controls: &[ControlInput; 2], dt: f32) -> Snapshot {
        self.time.dt = dt;
        crate::step(
            &mut self.state,
            &mut self.space,
            &mut self.time,
            controls,
            &mut self.events,
        );

        if self.time.tick % Params::HEARTBEAT_TICKS == 0 {
            log::info!(
                "sim: running, tick={}, t={:.2}s, score {}",
                self.time.tick,
                self.time.now,
                self.state.score
            );
        }

        let snapshot = self.snapshot();
        self.presenter.present(&snapshot, &self.events);
        snapshot
    }

    /// Tick until the input source quits, `request_exit` is called, or the
    /// tick limit is reached. Returns the final score.
    pub fn run(&mut self) -> Score {
        let frame = 1.0 / f64::from(self.tick_rate);
        // First tick sees one nominal frame
        let mut last = self.clock.now() - frame;

        log::info!(
            "sim: starting at {} Hz, walls_enabled={}",
            self.tick_rate,
            self.state.walls_enabled
        );

        while !self.exit_requested {
            if self.max_ticks.is_some_and(|max| self.time.tick >= max) {
                log::debug!("sim: tick limit reached");
                break;
            }

            let frame_start = self.clock.now();
            let dt = (frame_start - last) as f32;
            last = frame_start;

            let input = self.input.poll(&self.snapshot());
            if input.quit {
                log::info!("sim: quit requested at tick {}", self.time.tick);
                break;
            }

            self.tick(&input.controls, dt);

            let elapsed = self.clock.now() - frame_start;
            if elapsed < frame {
                self.clock.sleep(frame - elapsed);
            }
        }

        log::info!(
            "sim: finished after {} ticks, {}",
            self.time.tick,
            self.state.score
        );
        self.state.score
    }
}

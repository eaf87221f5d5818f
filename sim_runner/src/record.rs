//! Match recording and replay
//!
//! A recording is a stream of length-prefixed [`Record`] frames. It opens
//! with a `Record::Header` holding the walls flag and config the match was
//! built with. Then for every tick come the keys each player held
//! (`C2S::Input`, tagged with the tick as `seq`) and what the simulator
//! produced (goal, reset, state). Replaying feeds the recorded keys back in
//! and compares each state the loop reaches with the recorded one.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::rc::Rc;

use game_core::{
    Config, ControlInput, Events, InputSource, KeySnapshot, Presenter, Side, Snapshot, TickInput,
};
use proto::{read_frame, write_frame, CarFrame, Record, StateFrame, C2S, S2C};

/// How a recorded match was built
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSetup {
    pub walls: bool,
    pub config: Config,
}

impl MatchSetup {
    pub fn new(walls: bool, config: Config) -> Self {
        Self { walls, config }
    }

    fn to_record(&self) -> io::Result<Record> {
        let config = serde_json::to_string(&self.config).map_err(invalid_data)?;
        Ok(Record::Header {
            walls: self.walls,
            config,
        })
    }

    fn from_record(walls: bool, config: &str) -> io::Result<Self> {
        let config = serde_json::from_str(config).map_err(invalid_data)?;
        Ok(Self { walls, config })
    }
}

/// Writes records, remembering the first failure instead of panicking
/// mid-tick. Check [`FrameLog::finish`] when the run is over.
pub struct FrameLog<W: Write> {
    writer: W,
    error: Option<io::Error>,
    frames: u64,
}

pub type SharedLog<W> = Rc<RefCell<FrameLog<W>>>;

impl<W: Write> FrameLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
            frames: 0,
        }
    }

    pub fn shared(writer: W) -> SharedLog<W> {
        Rc::new(RefCell::new(Self::new(writer)))
    }

    /// Must come before any input or output
    pub fn push_setup(&mut self, setup: &MatchSetup) {
        match setup.to_record() {
            Ok(record) => self.push(&record),
            Err(e) => self.fail(e),
        }
    }

    pub fn push(&mut self, record: &Record) {
        if self.error.is_some() {
            return;
        }
        let result = record
            .to_bytes()
            .map_err(invalid_data)
            .and_then(|bytes| write_frame(&mut self.writer, &bytes));
        match result {
            Ok(()) => self.frames += 1,
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, e: io::Error) {
        log::warn!("record: write failed after {} frames: {e}", self.frames);
        if self.error.is_none() {
            self.error = Some(e);
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Flush and hand back the writer, or the first error seen
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Passes input through while logging it
pub struct RecordingInput<I: InputSource, W: Write> {
    inner: I,
    log: SharedLog<W>,
}

impl<I: InputSource, W: Write> RecordingInput<I, W> {
    pub fn new(inner: I, log: SharedLog<W>) -> Self {
        Self { inner, log }
    }
}

impl<I: InputSource, W: Write> InputSource for RecordingInput<I, W> {
    fn poll(&mut self, snapshot: &Snapshot) -> TickInput {
        let input = self.inner.poll(snapshot);
        let mut log = self.log.borrow_mut();
        if input.quit {
            log.push(&Record::Input(C2S::Quit));
            return input;
        }
        for (player_id, control) in (0u8..).zip(input.controls) {
            log.push(&Record::Input(C2S::Input {
                player_id,
                keys: control.to_keys().to_bits(),
                seq: tick_seq(snapshot.tick),
            }));
        }
        input
    }
}

/// Logs every tick's output, then hands it on
pub struct RecordingPresenter<P: Presenter, W: Write> {
    inner: P,
    log: SharedLog<W>,
}

impl<P: Presenter, W: Write> RecordingPresenter<P, W> {
    pub fn new(inner: P, log: SharedLog<W>) -> Self {
        Self { inner, log }
    }
}

impl<P: Presenter, W: Write> Presenter for RecordingPresenter<P, W> {
    fn present(&mut self, snapshot: &Snapshot, events: &Events) {
        {
            let mut log = self.log.borrow_mut();
            if let Some(side) = events.scorer() {
                log.push(&Record::Output(S2C::Goal {
                    scorer: side_id(side),
                }));
            }
            if events.reset {
                log.push(&Record::Output(S2C::Reset));
            }
            log.push(&Record::Output(S2C::State(state_frame(snapshot))));
        }
        self.inner.present(snapshot, events);
    }
}

/// Recorded keys played back tick by tick; quits when they run out.
///
/// Every poll also checks the state the loop reached against the recorded
/// frame for that tick and warns once, at the first mismatch.
#[derive(Debug)]
pub struct ReplayInput {
    pub setup: MatchSetup,
    ticks: BTreeMap<u32, [KeySnapshot; 2]>,
    /// State frames found in the recording, in tick order
    pub states: Vec<StateFrame>,
    cursor: u32,
    diverged_at: Option<u64>,
}

impl ReplayInput {
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let Some(Record::Header { walls, config }) = next_record(&mut reader)? else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "recording does not start with a header",
            ));
        };
        let setup = MatchSetup::from_record(walls, &config)?;

        let mut replay = Self {
            setup,
            ticks: BTreeMap::new(),
            states: Vec::new(),
            cursor: 0,
            diverged_at: None,
        };
        while let Some(record) = next_record(&mut reader)? {
            match record {
                Record::Input(C2S::Input {
                    player_id,
                    keys,
                    seq,
                }) => {
                    let slot = usize::from(player_id);
                    if slot >= 2 {
                        log::warn!("replay: ignoring input for player {player_id}");
                        continue;
                    }
                    replay.ticks.entry(seq).or_default()[slot] = KeySnapshot::from_bits(keys);
                }
                Record::Input(C2S::Quit) => break,
                Record::Output(S2C::State(frame)) => replay.states.push(frame),
                Record::Output(_) => {}
                Record::Header { .. } => log::warn!("replay: ignoring a second header"),
            }
        }
        log::debug!(
            "replay: {} ticks of input, {} state frames",
            replay.ticks.len(),
            replay.states.len()
        );
        Ok(replay)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// First tick whose state differed from the recording
    pub fn diverged_at(&self) -> Option<u64> {
        self.diverged_at
    }

    fn check(&mut self, snapshot: &Snapshot) {
        if self.diverged_at.is_some() || snapshot.tick == 0 {
            return;
        }
        let index = usize::try_from(snapshot.tick - 1).unwrap_or(usize::MAX);
        let Some(expected) = self.states.get(index) else {
            return;
        };
        if state_frame(snapshot) != *expected {
            log::warn!("replay: tick {} differs from the recording", snapshot.tick);
            self.diverged_at = Some(snapshot.tick);
        }
    }
}

impl InputSource for ReplayInput {
    fn poll(&mut self, snapshot: &Snapshot) -> TickInput {
        self.check(snapshot);
        let Some(keys) = self.ticks.get(&self.cursor) else {
            let end = self.cursor;
            match self.diverged_at() {
                Some(tick) => log::warn!("replay: ended at tick {end}, diverged at {tick}"),
                None => log::info!("replay: ended at tick {end}, every state matched"),
            }
            return TickInput::quit();
        };
        self.cursor += 1;
        TickInput::new([
            ControlInput::from_keys(keys[0]),
            ControlInput::from_keys(keys[1]),
        ])
    }
}

pub fn state_frame(snapshot: &Snapshot) -> StateFrame {
    let car = |i: usize| CarFrame {
        x: snapshot.vehicles[i].position.x,
        y: snapshot.vehicles[i].position.y,
        angle: snapshot.vehicles[i].angle,
    };
    StateFrame {
        tick: tick_seq(snapshot.tick),
        cars: [car(0), car(1)],
        ball_x: snapshot.ball.x,
        ball_y: snapshot.ball.y,
        score_left: snapshot.score.left,
        score_right: snapshot.score.right,
    }
}

fn next_record<R: Read>(reader: &mut R) -> io::Result<Option<Record>> {
    let Some(frame) = read_frame(reader)? else {
        return Ok(None);
    };
    Record::from_bytes(&frame).map(Some).map_err(invalid_data)
}

fn invalid_data<E: std::fmt::Display>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e.to_string())
}

fn side_id(side: Side) -> u8 {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}

fn tick_seq(tick: u64) -> u32 {
    u32::try_from(tick).unwrap_or(u32::MAX)
}

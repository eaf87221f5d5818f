//! Car soccer runner
//!
//! Builds a match from the command line and drives it with the seeded
//! autopilot or a recorded match, printing the score whenever it changes.

mod autopilot;
mod record;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use game_core::{
    Clock, Config, Events, FixedStepClock, InputSource, Params, Presenter, Score, SimulationLoop,
    Snapshot, SystemClock,
};

use autopilot::Autopilot;
use record::{FrameLog, MatchSetup, RecordingInput, RecordingPresenter, ReplayInput};

/// Headless runs without `--ticks` stop after one simulated minute
const DEFAULT_HEADLESS_TICKS: u64 = 60 * 60;

#[derive(Parser, Debug)]
#[command(name = "sim_runner", version, about = "Run a two-car soccer match")]
struct Args {
    /// Build the field walls and enable goals
    #[arg(long)]
    walls: bool,
    /// Stop after this many ticks
    #[arg(long)]
    ticks: Option<u64>,
    /// Ticks per second
    #[arg(long, default_value_t = Params::TICK_RATE)]
    tick_rate: u32,
    /// Fixed dt and no sleeping; runs as fast as possible
    #[arg(long)]
    headless: bool,
    /// Autopilot seed
    #[arg(long, default_value_t = 12345)]
    seed: u64,
    /// JSON file overriding any config fields
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write inputs and state frames to this file
    #[arg(long, conflicts_with = "replay")]
    record: Option<PathBuf>,
    /// Drive the cars from a recording instead of the autopilot; the
    /// recording's config is used and `--walls` must match it
    #[arg(long, conflicts_with = "config")]
    replay: Option<PathBuf>,
}

/// Prints the score when a goal goes in
#[derive(Debug, Default)]
struct ScorePrinter {
    last: Score,
}

impl Presenter for ScorePrinter {
    fn present(&mut self, snapshot: &Snapshot, events: &Events) {
        if snapshot.score != self.last {
            println!("{}", snapshot.score);
            self.last = snapshot.score;
        } else if events.reset {
            log::info!("tick {}: ball out, no goal", snapshot.tick);
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::new());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: Config = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    log::info!("config loaded from {}", path.display());
    Ok(config)
}

/// Open a recording that can drive a match built with `walls`
fn open_replay(path: &Path, walls: bool) -> Result<ReplayInput> {
    let file = File::open(path)
        .with_context(|| format!("opening recording {}", path.display()))?;
    let replay = ReplayInput::from_reader(BufReader::new(file))
        .with_context(|| format!("reading recording {}", path.display()))?;
    if replay.is_empty() {
        bail!("recording {} has no input", path.display());
    }
    if replay.setup.walls != walls {
        bail!(
            "{} was recorded with walls={}, not walls={walls}",
            path.display(),
            replay.setup.walls
        );
    }
    log::info!("replaying {} ticks from {}", replay.len(), path.display());
    Ok(replay)
}

fn main() -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env).init();
    let args = Args::parse();
    log::debug!("{args:?}");

    let replay = match &args.replay {
        Some(path) => Some(open_replay(path, args.walls)?),
        None => None,
    };
    let config = match &replay {
        Some(replay) => replay.setup.config.clone(),
        None => load_config(args.config.as_deref())?,
    };

    let clock: Box<dyn Clock> = if args.headless {
        Box::new(FixedStepClock::new())
    } else {
        Box::new(SystemClock::new())
    };

    let input: Box<dyn InputSource> = match replay {
        Some(replay) => Box::new(replay),
        None => Box::new(Autopilot::new(args.seed)),
    };

    let log = match &args.record {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating recording {}", path.display()))?;
            let log = FrameLog::shared(BufWriter::new(file));
            let setup = MatchSetup::new(args.walls, config.clone());
            log.borrow_mut().push_setup(&setup);
            Some(log)
        }
        None => None,
    };

    let (input, presenter): (Box<dyn InputSource>, Box<dyn Presenter>) = match &log {
        Some(log) => {
            let input = RecordingInput::new(input, Rc::clone(log));
            let printer = RecordingPresenter::new(ScorePrinter::default(), Rc::clone(log));
            (Box::new(input), Box::new(printer))
        }
        None => (input, Box::new(ScorePrinter::default())),
    };

    let mut sim = SimulationLoop::new(config, args.walls, clock, input, presenter)
        .context("building match")?
        .with_tick_rate(args.tick_rate);
    let max_ticks = args
        .ticks
        .or_else(|| args.headless.then_some(DEFAULT_HEADLESS_TICKS));
    if let Some(max) = max_ticks {
        sim = sim.with_max_ticks(max);
    }

    let score = sim.run();
    drop(sim);

    if let (Some(log), Some(path)) = (log, &args.record) {
        let log = Rc::try_unwrap(log)
            .map_err(|_| anyhow::anyhow!("recording still in use"))?
            .into_inner();
        let frames = log.frames();
        log.finish()
            .with_context(|| format!("writing recording {}", path.display()))?;
        log::info!("recorded {frames} frames to {}", path.display());
    }

    println!("Final score: {score}");
    Ok(())
}

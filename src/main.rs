use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use rookbot::actuator::{ActuatorSink, AngleTable, SerialActuator};
use rookbot::config::{EngineConfig, RobotConfig, Side};
use rookbot::persist::StateStore;
use rookbot::render::board_text;
use rookbot::vision::{GridFile, VisionProvider};
use rookbot::{Advance, GameSession, Position, SessionError, TurnState};

#[derive(Parser, Debug)]
#[command(name = "rookbot", about = "Run the chess robot against a human over a sensed board")]
struct Args {
    /// JSON config file; built-in defaults are used without one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Robot's color: 'w' for white, 'b' for black
    #[arg(long)]
    side: Option<String>,

    /// Engine search depth in plies
    #[arg(long)]
    depth: Option<u32>,

    /// Continue the game in the save file instead of starting fresh
    #[arg(long)]
    resume: bool,

    /// File the vision process writes the latest occupancy grid to
    #[arg(long)]
    grid: Option<PathBuf>,

    /// Path to a UCI engine binary, replacing the configured engine
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Debug logging
    #[arg(long)]
    verbose: bool,
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, text: &str) -> Result<Option<String>> {
    print!("{}", text);
    io::stdout().flush()?;
    lines.next().transpose().context("reading operator input")
}

fn main() -> Result<()> {
    let args = Args::parse();
    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let mut cfg = match &args.config {
        Some(path) => RobotConfig::load(path)?,
        None => RobotConfig::default(),
    };
    if let Some(side) = &args.side {
        cfg.robot_side = side.parse::<Side>()?;
    }
    if let Some(depth) = args.depth {
        cfg.depth = depth;
    }
    if let Some(grid) = args.grid {
        cfg.grid_path = grid;
    }
    if let Some(path) = args.engine {
        cfg.engine = EngineConfig::Uci { path };
    }

    let mut engine = cfg.engine.build().context("starting chess engine")?;
    let mut vision = GridFile::new(&cfg.grid_path);
    let mut arm: Option<SerialActuator<File>> = match &cfg.actuator_port {
        Some(port) => {
            let table = AngleTable::load(&cfg.squares_path)
                .with_context(|| format!("loading square angles from {}", cfg.squares_path.display()))?;
            Some(SerialActuator::open(port, table)?)
        }
        None => {
            info!("no actuator port configured, robot moves are printed only");
            None
        }
    };

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let store = StateStore::new(&cfg.save_path);
    let session: GameSession<Position> = if args.resume {
        let record = store.load()?;
        GameSession::resume(&record, cfg.robot_side.color(), cfg.depth)?
    } else {
        if prompt(&mut lines, "Set up the starting position and press Enter ")?.is_none() {
            return Ok(());
        }
        let initial = vision.capture_grid()?;
        GameSession::new(Position::startpos(), cfg.robot_side.color(), &initial, cfg.depth)?
    };
    let mut session = session.with_store(store);
    let flipped = session.robot_side() == cozy_chess::Color::Black;
    println!("{}", board_text(session.position(), flipped, true));

    loop {
        let text = match session.state() {
            TurnState::GameOver(outcome) => {
                println!("Game over: {}", outcome);
                break;
            }
            TurnState::EngineTurn => "Robot to move. Enter to continue, q to quit: ",
            TurnState::HumanTurn => "Make your move, then press Enter (q to quit): ",
        };
        match prompt(&mut lines, text)? {
            None => break,
            Some(line) if line.trim().eq_ignore_ascii_case("q") => break,
            Some(_) => {}
        }
        match session.advance(&mut engine, &mut vision) {
            Ok(Advance::Engine(details)) => {
                println!("Robot: {}", serde_json::to_string(&details)?);
                if let Some(arm) = arm.as_mut() {
                    let ack = arm.send(&details)?;
                    info!("actuator acknowledged with {:#04x}", ack);
                }
                println!("{}", board_text(session.position(), flipped, true));
            }
            Ok(Advance::Human(mv)) => {
                println!("You played {}", mv);
                println!("{}", board_text(session.position(), flipped, true));
            }
            Ok(Advance::NoMove) => println!("No change on the board."),
            Err(err) if err.is_recoverable() => {
                warn!("{}", err);
                println!("Could not read a move ({}). Check the board and try again.", err);
            }
            Err(SessionError::GameOver(outcome)) => {
                println!("Game over: {}", outcome);
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

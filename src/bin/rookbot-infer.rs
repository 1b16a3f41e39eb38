use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use rookbot::encoder::{encode, MoveDetails};
use rookbot::inference::infer;
use rookbot::vision::{GridFile, VisionProvider};
use rookbot::{LegalityOracle, Orientation, Position};

#[derive(Parser, Debug)]
#[command(name = "rookbot-infer", about = "Infer the move between two sensed grids")]
struct Args {
    /// Position the `before` grid was taken from
    #[arg(long, default_value = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")]
    fen: String,

    #[arg(long)]
    before: PathBuf,

    #[arg(long)]
    after: PathBuf,

    /// WT, WB, WL or WR; learned from the `before` grid when omitted
    #[arg(long)]
    orientation: Option<String>,

    /// Mirror the details into Black's frame
    #[arg(long)]
    black: bool,
}

#[derive(Serialize)]
struct Report {
    fen: String,
    orientation: String,
    #[serde(rename = "move")]
    mv: Option<String>,
    details: Option<MoveDetails>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let position = Position::from_fen(&args.fen)?;
    let before = GridFile::new(&args.before).capture_grid()?;
    let after = GridFile::new(&args.after).capture_grid()?;
    let orientation = match &args.orientation {
        Some(tag) => tag.parse::<Orientation>()?,
        None => Orientation::learn(&before).context("learning orientation from the before grid")?,
    };

    let mv = infer(&orientation.normalize(&before), &orientation.normalize(&after), &position)?;
    let side = if args.black { cozy_chess::Color::Black } else { cozy_chess::Color::White };
    let report = Report {
        fen: position.serialize(),
        orientation: orientation.to_string(),
        mv: mv.map(|m| m.to_string()),
        details: mv.map(|m| encode(&m, side)),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

use std::path::PathBuf;
use thiserror::Error;

use crate::oracle::Outcome;
use crate::session::TurnState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("expected 8 rows, found {0}")]
    RowCount(usize),
    #[error("row {row}: expected 8 cells, found {found}")]
    ColumnCount { row: usize, found: usize },
    #[error("row {row}: unrecognised cell token {token:?}")]
    Token { row: usize, token: String },
    #[error("cell code {0} is not one of -1, 0, 1")]
    Code(i8),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrientationError {
    #[error("initial grid matches no orientation pattern (is the board in the starting position?)")]
    NoPattern,
    #[error("initial grid matches {0} orientation patterns")]
    Ambiguous(usize),
    #[error("unknown orientation tag {0:?}")]
    UnknownTag(String),
    #[error("grid cannot be normalised before an orientation is learned")]
    Unset,
}

/// Rejections from move inference. None of them mutate session state; the caller retries with a fresh frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InferenceError {
    #[error("occupancy diff does not describe a single move")]
    InvalidDiff,
    #[error("{0} squares changed, expected 2 or 4")]
    InvalidMoveCount(usize),
    #[error("four changed squares do not form an available castle")]
    InvalidCastle,
    #[error("inferred move {0} is illegal in the current position")]
    IllegalMove(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("chess engine unavailable: {0}")]
    Unavailable(String),
    #[error("engine protocol error: {0}")]
    Protocol(String),
    #[error("engine returned no move for {0}")]
    NoMove(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error("invalid FEN {fen:?}: {reason}")]
    Fen { fen: String, reason: String },
    #[error("move {0} cannot be played in this position")]
    Illegal(String),
    #[error("malformed move text {0:?}")]
    MoveText(String),
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to access saved state at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("saved state is missing line {0}")]
    MissingLine(usize),
    #[error("saved turn flag {0:?} is neither True nor False")]
    TurnFlag(String),
    #[error(transparent)]
    Orientation(#[from] OrientationError),
}

#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("squares file line {line}: {reason}")]
    Table { line: usize, reason: String },
    #[error("squares file holds {0} entries, expected 64")]
    TableSize(usize),
    #[error("malformed square pair {0:?}")]
    MoveText(String),
    #[error("angle {0} does not fit in a packet byte")]
    AngleRange(i32),
    #[error("actuator link closed before acknowledging")]
    NoAck,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("failed to read grid from {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("no more frames")]
    Exhausted,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid config {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("unknown side {0:?}, use white or black")]
    Side(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Orientation(#[from] OrientationError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Position(#[from] PositionError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Vision(#[from] VisionError),
    #[error("game over: {0}")]
    GameOver(Outcome),
    #[error("that move is not allowed during {0:?}")]
    OutOfTurn(TurnState),
}

impl SessionError {
    /// Only inference rejections can be retried with another frame; everything else ends the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SessionError::Inference(_))
    }
}

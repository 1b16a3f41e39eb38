// Board tracking and move inference for an occupancy-sensing chess robot
pub mod actuator;
pub mod board;
pub mod config;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod inference;
pub mod oracle;
pub mod persist;
pub mod render;
pub mod search;
pub mod session;
pub mod vision;

pub use board::{CanonicalGrid, Cell, OccupancyGrid, Orientation, Position};
pub use encoder::MoveDetails;
pub use error::{InferenceError, SessionError};
pub use oracle::{BoardMove, LegalityOracle, MoveKind, Outcome};
pub use session::{Advance, GameSession, TurnState};

//! Sources of the robot's own moves.

pub mod uci;

use log::debug;

use crate::board::Position;
use crate::error::EngineError;
use crate::search::{SearchParams, Searcher};

pub use uci::UciEngine;

pub trait MoveProvider {
    /// Best move for the FEN position in long algebraic notation (`e2e4`, `e7e8q`), searching `depth` plies.
    /// Blocks until the search completes.
    fn best_move(&mut self, fen: &str, depth: u32) -> Result<String, EngineError>;
}

impl<T: MoveProvider + ?Sized> MoveProvider for Box<T> {
    fn best_move(&mut self, fen: &str, depth: u32) -> Result<String, EngineError> {
        (**self).best_move(fen, depth)
    }
}

/// In-process alpha-beta engine.
pub struct SearchEngine {
    searcher: Searcher,
    threads: usize,
    max_nodes: Option<u64>,
}

impl Default for SearchEngine {
    fn default() -> Self { Self::new(1) }
}

impl SearchEngine {
    pub fn new(threads: usize) -> Self {
        Self { searcher: Searcher::default(), threads: threads.max(1), max_nodes: None }
    }

    pub fn with_max_nodes(mut self, max_nodes: u64) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }
}

impl MoveProvider for SearchEngine {
    fn best_move(&mut self, fen: &str, depth: u32) -> Result<String, EngineError> {
        let position = Position::from_fen(fen).map_err(|e| EngineError::Protocol(e.to_string()))?;
        let params = SearchParams { depth, threads: self.threads, max_nodes: self.max_nodes };
        let res = self.searcher.search_with_params(position.board(), params);
        let mv = res.bestmove.ok_or_else(|| EngineError::NoMove(fen.to_string()))?;
        debug!("builtin engine: {} score {} nodes {}", mv, res.score_cp, res.nodes);
        Ok(position.from_cozy(mv).to_string())
    }
}

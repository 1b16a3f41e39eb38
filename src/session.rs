//! The turn machine: owns the authoritative position, the canonical grid and the learned orientation, and
//! moves the game forward one validated move at a time.

use cozy_chess::Color;
use log::{info, warn};

use crate::board::{CanonicalGrid, OccupancyGrid, Orientation, Position};
use crate::encoder::{encode, MoveDetails};
use crate::engine::MoveProvider;
use crate::error::SessionError;
use crate::inference::infer;
use crate::oracle::{BoardMove, LegalityOracle, Outcome};
use crate::persist::{PersistedState, StateStore};
use crate::vision::VisionProvider;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnState {
    EngineTurn,
    HumanTurn,
    GameOver(Outcome),
}

/// Result of one [`GameSession::advance`] step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    Engine(MoveDetails),
    Human(BoardMove),
    /// The sensed board has not changed since the last move.
    NoMove,
}

pub struct GameSession<O = Position> {
    position: O,
    grid: CanonicalGrid,
    orientation: Orientation,
    robot_side: Color,
    robot_to_move: bool,
    depth: u32,
    store: Option<StateStore>,
    last_details: Option<MoveDetails>,
}

impl<O: LegalityOracle + Clone> GameSession<O> {
    /// Starts a fresh game. `initial` must be the raw grid of the untouched starting setup so the orientation
    /// can be learned from it.
    pub fn new(position: O, robot_side: Color, initial: &OccupancyGrid, depth: u32) -> Result<Self, SessionError> {
        let orientation = Orientation::learn(initial)?;
        let grid = CanonicalGrid::from_oracle(&position);
        if orientation.normalize(initial) != grid {
            warn!("initial board reading does not match the starting position");
        }
        let robot_to_move = position.side_to_move() == robot_side;
        info!("new game: robot plays {:?}, board orientation {}", robot_side, orientation);
        Ok(Self {
            position,
            grid,
            orientation,
            robot_side,
            robot_to_move,
            depth,
            store: None,
            last_details: None,
        })
    }

    /// Rebuilds a session from a saved record. The grid is re-derived from the position, never from a stale
    /// sensor reading.
    pub fn resume(record: &PersistedState, robot_side: Color, depth: u32) -> Result<Self, SessionError> {
        let position = O::deserialize(&record.fen)?;
        let stm = position.side_to_move();
        let saved_side = if record.robot_to_move { stm } else { !stm };
        if saved_side != robot_side {
            warn!("saved game has the robot playing {:?}, overriding configured {:?}", saved_side, robot_side);
        }
        let grid = CanonicalGrid::from_oracle(&position);
        info!("resumed game at {} ({})", record.fen, if record.robot_to_move { "robot to move" } else { "human to move" });
        Ok(Self {
            position,
            grid,
            orientation: record.orientation,
            robot_side: saved_side,
            robot_to_move: record.robot_to_move,
            depth,
            store: None,
            last_details: None,
        })
    }

    /// Persists state to `store` after every applied move.
    pub fn with_store(mut self, store: StateStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn state(&self) -> TurnState {
        match self.position.outcome() {
            Some(outcome) => TurnState::GameOver(outcome),
            None if self.robot_to_move => TurnState::EngineTurn,
            None => TurnState::HumanTurn,
        }
    }

    pub fn is_robots_turn(&self) -> bool { self.robot_to_move }

    pub fn orientation(&self) -> Orientation { self.orientation }

    pub fn grid(&self) -> &CanonicalGrid { &self.grid }

    pub fn position(&self) -> &O { &self.position }

    pub fn robot_side(&self) -> Color { self.robot_side }

    /// Details of the most recent robot move, for the actuator.
    pub fn last_details(&self) -> Option<&MoveDetails> { self.last_details.as_ref() }

    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            fen: self.position.serialize(),
            robot_to_move: self.robot_to_move,
            orientation: self.orientation,
        }
    }

    fn expect_state(&self, wanted: TurnState) -> Result<(), SessionError> {
        match self.state() {
            TurnState::GameOver(outcome) => Err(SessionError::GameOver(outcome)),
            state if state == wanted => Ok(()),
            state => Err(SessionError::OutOfTurn(state)),
        }
    }

    /// Asks the engine for a move and applies it.
    pub fn play_engine_turn<E: MoveProvider + ?Sized>(&mut self, engine: &mut E) -> Result<MoveDetails, SessionError> {
        self.expect_state(TurnState::EngineTurn)?;
        let text = engine.best_move(&self.position.serialize(), self.depth)?;
        let mv = self.position.parse_uci(&text)?;
        let mut next = self.position.clone();
        next.push(&mv)?;
        let grid = CanonicalGrid::from_oracle(&next);
        let details = encode(&mv, self.robot_side);
        self.commit(next, grid, false)?;
        info!("robot plays {} ({:?}), arm move {}", mv, mv.kind, details.move_string);
        self.last_details = Some(details.clone());
        Ok(details)
    }

    /// Infers the human's move from a raw sensor grid. `Ok(None)` means the board is unchanged; on any error
    /// the session is left exactly as it was.
    pub fn play_human_turn(&mut self, raw: &OccupancyGrid) -> Result<Option<BoardMove>, SessionError> {
        self.expect_state(TurnState::HumanTurn)?;
        let seen = self.orientation.normalize(raw);
        let Some(mv) = infer(&self.grid, &seen, &self.position)? else {
            return Ok(None);
        };
        let mut next = self.position.clone();
        next.push(&mv)?;
        self.commit(next, seen, true)?;
        info!("human played {} ({:?})", mv, mv.kind);
        Ok(Some(mv))
    }

    /// Plays whichever side is due: the engine on the robot's turn, otherwise one frame from `vision`.
    pub fn advance<E, V>(&mut self, engine: &mut E, vision: &mut V) -> Result<Advance, SessionError>
    where
        E: MoveProvider + ?Sized,
        V: VisionProvider + ?Sized,
    {
        match self.state() {
            TurnState::GameOver(outcome) => Err(SessionError::GameOver(outcome)),
            TurnState::EngineTurn => self.play_engine_turn(engine).map(Advance::Engine),
            TurnState::HumanTurn => {
                let raw = vision.capture_grid()?;
                Ok(self.play_human_turn(&raw)?.map_or(Advance::NoMove, Advance::Human))
            }
        }
    }

    // Persist first; in-memory state only changes once the record is on disk.
    fn commit(&mut self, next: O, grid: CanonicalGrid, robot_to_move: bool) -> Result<(), SessionError> {
        if let Some(store) = &self.store {
            let record = PersistedState { fen: next.serialize(), robot_to_move, orientation: self.orientation };
            store.save(&record)?;
        }
        self.position = next;
        self.grid = grid;
        self.robot_to_move = robot_to_move;
        if let Some(outcome) = self.position.outcome() {
            info!("game over: {}", outcome);
        }
        Ok(())
    }
}

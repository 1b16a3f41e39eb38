use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;

use cozy_chess::Color;
use pretty_assertions::assert_eq;

use rookbot::board::{CanonicalGrid, OccupancyGrid, Orientation, Position};
use rookbot::engine::{MoveProvider, SearchEngine};
use rookbot::error::{EngineError, InferenceError, PositionError, SessionError};
use rookbot::oracle::{LegalityOracle, MoveKind, Outcome};
use rookbot::persist::StateStore;
use rookbot::session::{Advance, GameSession, TurnState};
use rookbot::vision::ScriptedVision;

/// Plays a fixed list of replies regardless of the position.
struct ScriptedEngine(VecDeque<&'static str>);

impl ScriptedEngine {
    fn new(moves: &[&'static str]) -> Self { Self(moves.iter().copied().collect()) }
}

impl MoveProvider for ScriptedEngine {
    fn best_move(&mut self, fen: &str, _depth: u32) -> Result<String, EngineError> {
        self.0.pop_front().map(str::to_string).ok_or_else(|| EngineError::NoMove(fen.to_string()))
    }
}

fn start_grid() -> OccupancyGrid {
    *CanonicalGrid::from_oracle(&Position::startpos()).grid()
}

/// The raw (white-at-bottom) reading after `uci` is played on `pos`.
fn frame_after(pos: &Position, uci: &str) -> OccupancyGrid {
    let mut next = pos.clone();
    next.push(&pos.parse_uci(uci).expect("move text")).expect("legal move");
    *CanonicalGrid::from_oracle(&next).grid()
}

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join(format!("rookbot_{}", name));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn white_robot_opens_then_reads_the_reply() {
    let mut session = GameSession::new(Position::startpos(), Color::White, &start_grid(), 3).expect("session");
    assert_eq!(session.orientation(), Orientation::WhiteBottom);
    assert_eq!(session.state(), TurnState::EngineTurn);

    let details = session.play_engine_turn(&mut ScriptedEngine::new(&["e2e4"])).expect("engine move");
    assert_eq!(details.move_string, "e2e4");
    assert_eq!(details.kind, MoveKind::Normal);
    assert_eq!(session.last_details(), Some(&details));
    assert_eq!(session.state(), TurnState::HumanTurn);
    assert_eq!(*session.grid(), CanonicalGrid::from_oracle(session.position()));

    let frame = frame_after(session.position(), "e7e5");
    let mv = session.play_human_turn(&frame).expect("inferred").expect("a move");
    assert_eq!(mv.to_string(), "e7e5");
    assert_eq!(session.state(), TurnState::EngineTurn);
    assert_eq!(session.grid().grid(), &frame);
}

#[test]
fn black_robot_waits_for_the_human_and_mirrors_its_reply() {
    let mut session = GameSession::new(Position::startpos(), Color::Black, &start_grid(), 3).expect("session");
    assert_eq!(session.state(), TurnState::HumanTurn);

    let opening = frame_after(session.position(), "e2e4");
    let mut vision = ScriptedVision::new([start_grid()]);
    vision.push(opening);
    let mut engine = ScriptedEngine::new(&["e7e5"]);

    assert_eq!(session.advance(&mut engine, &mut vision).expect("step"), Advance::NoMove);
    assert!(!session.is_robots_turn());
    match session.advance(&mut engine, &mut vision).expect("step") {
        Advance::Human(mv) => assert_eq!(mv.to_string(), "e2e4"),
        other => panic!("expected the human move, got {other:?}"),
    }
    assert_eq!(vision.remaining(), 0);
    match session.advance(&mut engine, &mut vision).expect("step") {
        // e7e5 seen from Black's side of the board
        Advance::Engine(details) => assert_eq!(details.move_string, "d2d4"),
        other => panic!("expected the robot move, got {other:?}"),
    }
}

#[test]
fn rotated_camera_still_reads_moves() {
    let initial = OccupancyGrid::parse(&["WW....BB"; 8].join("\n")).expect("grid");
    let mut session = GameSession::new(Position::startpos(), Color::Black, &initial, 3).expect("session");
    assert_eq!(session.orientation(), Orientation::WhiteLeft);

    // e2e4 in the left-hand frame: the pawn on raw row 4 moves two columns right
    let mut frame = initial;
    frame.set(4, 1, rookbot::Cell::Empty);
    frame.set(4, 3, rookbot::Cell::White);
    let mv = session.play_human_turn(&frame).expect("inferred").expect("a move");
    assert_eq!(mv.to_string(), "e2e4");
}

#[test]
fn failed_human_turn_changes_nothing() {
    let dir = scratch("failed-turn");
    let store = StateStore::new(dir.join("last position.txt"));
    let mut session = GameSession::new(Position::startpos(), Color::White, &start_grid(), 3)
        .expect("session")
        .with_store(store.clone());
    session.play_engine_turn(&mut ScriptedEngine::new(&["d2d4"])).expect("engine move");
    let saved = fs::read(store.path()).expect("state written");
    let before = session.snapshot();
    let grid = *session.grid();

    // three black pawns lifted at once
    let mut frame = *grid.grid();
    for col in 0..3 {
        frame.set(1, col, rookbot::Cell::Empty);
    }
    let err = session.play_human_turn(&frame).unwrap_err();
    assert!(err.is_recoverable());
    assert!(matches!(err, SessionError::Inference(InferenceError::InvalidMoveCount(3))));

    assert_eq!(session.snapshot(), before);
    assert_eq!(*session.grid(), grid);
    assert_eq!(fs::read(store.path()).expect("state still there"), saved);
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn moves_out_of_turn_are_refused() {
    let mut session = GameSession::new(Position::startpos(), Color::White, &start_grid(), 3).expect("session");
    let err = session.play_human_turn(&start_grid()).unwrap_err();
    assert!(matches!(err, SessionError::OutOfTurn(TurnState::EngineTurn)));
    assert!(!err.is_recoverable());
}

#[test]
fn illegal_engine_move_is_not_applied() {
    let mut session = GameSession::new(Position::startpos(), Color::White, &start_grid(), 3).expect("session");
    let err = session.play_engine_turn(&mut ScriptedEngine::new(&["e2e5"])).unwrap_err();
    assert!(matches!(err, SessionError::Position(PositionError::Illegal(_))));
    assert_eq!(session.state(), TurnState::EngineTurn);
    assert_eq!(session.position().fen(), Position::startpos().fen());
}

#[test]
fn mate_ends_the_game() {
    let mut session = GameSession::new(Position::startpos(), Color::Black, &start_grid(), 3).expect("session");
    let mut engine = ScriptedEngine::new(&["e7e5", "d8h4"]);

    let f3 = frame_after(session.position(), "f2f3");
    session.play_human_turn(&f3).expect("f3").expect("a move");
    session.play_engine_turn(&mut engine).expect("e5");
    let g4 = frame_after(session.position(), "g2g4");
    session.play_human_turn(&g4).expect("g4").expect("a move");
    session.play_engine_turn(&mut engine).expect("Qh4");

    let outcome = Outcome::Checkmate { winner: Color::Black };
    assert_eq!(session.state(), TurnState::GameOver(outcome));
    assert!(session.position().is_game_over());
    let mut vision = ScriptedVision::default();
    assert!(matches!(session.advance(&mut engine, &mut vision), Err(SessionError::GameOver(o)) if o == outcome));
}

#[test]
fn resumed_session_behaves_like_the_live_one() {
    let dir = scratch("resume");
    let store = StateStore::new(dir.join("saves").join("last position.txt"));
    let mut live = GameSession::new(Position::startpos(), Color::White, &start_grid(), 2)
        .expect("session")
        .with_store(store.clone());
    live.play_engine_turn(&mut ScriptedEngine::new(&["g1f3"])).expect("engine move");
    let reply = frame_after(live.position(), "d7d5");
    live.play_human_turn(&reply).expect("inferred").expect("a move");

    let record = store.load().expect("saved state");
    assert_eq!(record, live.snapshot());
    let mut resumed: GameSession = GameSession::resume(&record, Color::White, 2).expect("resume");
    assert_eq!(resumed.state(), live.state());
    assert_eq!(resumed.orientation(), live.orientation());
    assert_eq!(resumed.grid(), live.grid());

    let a = live.play_engine_turn(&mut SearchEngine::default()).expect("live move");
    let b = resumed.play_engine_turn(&mut SearchEngine::default()).expect("resumed move");
    assert_eq!(a, b);
    assert_eq!(live.snapshot(), resumed.snapshot());
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn resume_trusts_the_saved_turn_over_the_configured_side() {
    let record = rookbot::persist::PersistedState {
        fen: Position::startpos().fen(),
        robot_to_move: true,
        orientation: Orientation::WhiteTop,
    };
    let session: GameSession = GameSession::resume(&record, Color::Black, 3).expect("resume");
    assert_eq!(session.robot_side(), Color::White);
    assert_eq!(session.state(), TurnState::EngineTurn);
    assert_eq!(session.orientation(), Orientation::WhiteTop);
}

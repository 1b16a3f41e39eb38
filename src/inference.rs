//! Recovers the move a human made from two canonical occupancy grids.
//!
//! Occupancy sensing cannot tell pieces apart, so the engine leans on two things: the handful of diff shapes a
//! single legal move can produce, and the authoritative position to break the remaining ties.
//!
//! Per-cell diff values are `|previous.code() - next.code()|` with Empty = -1, Black = 0, White = 1:
//!
//! | value | meaning                                             |
//! |-------|-----------------------------------------------------|
//! | 0     | unchanged                                           |
//! | 1     | Empty <-> Black, or Black <-> White (a capture)     |
//! | 2     | Empty <-> White                                     |
//! | 3+    | impossible for a single move, the reading is bad    |

use cozy_chess::{Color, Piece, Square};
use log::{debug, warn};

use crate::board::grid::{CanonicalGrid, SIZE};
use crate::error::InferenceError;
use crate::oracle::{promotion_rank, BoardMove, CastleSide, LegalityOracle};

/// Per-cell diff values between two canonical grids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellDiff([[u8; SIZE]; SIZE]);

impl CellDiff {
    pub fn between(previous: &CanonicalGrid, next: &CanonicalGrid) -> Self {
        let mut values = [[0u8; SIZE]; SIZE];
        for (row, line) in values.iter_mut().enumerate() {
            for (col, v) in line.iter_mut().enumerate() {
                let a = previous.grid().cell(row, col).code();
                let b = next.grid().cell(row, col).code();
                *v = (a - b).unsigned_abs();
            }
        }
        Self(values)
    }

    /// Raw diff values, e.g. from a sensor pipeline that computes its own differences.
    pub fn from_values(values: [[u8; SIZE]; SIZE]) -> Self { Self(values) }

    pub fn value(&self, row: usize, col: usize) -> u8 { self.0[row][col] }
}

/// What a diff says about the move, before any position lookups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffShape {
    NoMove,
    /// Changed squares in row-major order (rank 8 first, files ascending).
    Candidate { squares: Vec<Square>, side: Color, white_capture: bool },
    Invalid,
}

pub fn classify(diff: &CellDiff) -> DiffShape {
    let mut ones = Vec::new();
    let mut twos = Vec::new();
    let mut changed = Vec::new();
    for row in 0..SIZE {
        for col in 0..SIZE {
            let sq = CanonicalGrid::square_at(row, col);
            match diff.value(row, col) {
                0 => continue,
                1 => ones.push(sq),
                2 => twos.push(sq),
                _ => return DiffShape::Invalid,
            }
            changed.push(sq);
        }
    }
    match (ones.is_empty(), twos.is_empty()) {
        (true, true) => DiffShape::NoMove,
        // only Empty <-> White changes: White moved (or castled)
        (true, false) => DiffShape::Candidate { squares: twos, side: Color::White, white_capture: false },
        // only 1s: Black moved or captured
        (false, true) => DiffShape::Candidate { squares: ones, side: Color::Black, white_capture: false },
        // a 2 where White left and a 1 where White replaced Black
        (false, false) => DiffShape::Candidate { squares: changed, side: Color::White, white_capture: true },
    }
}

/// Infers the move between two canonical grids. `Ok(None)` means nothing changed.
///
/// The oracle must describe the position the `previous` grid was taken from.
pub fn infer<O: LegalityOracle + ?Sized>(
    previous: &CanonicalGrid,
    next: &CanonicalGrid,
    oracle: &O,
) -> Result<Option<BoardMove>, InferenceError> {
    if previous == next {
        return Ok(None);
    }
    let diff = CellDiff::between(previous, next);
    let shape = classify(&diff);
    debug!("diff shape: {:?}", shape);
    let candidate = match shape {
        DiffShape::NoMove => return Ok(None),
        DiffShape::Invalid => return Err(InferenceError::InvalidDiff),
        DiffShape::Candidate { squares, side, white_capture } => match squares.as_slice() {
            &[a, b] => resolve_pair(a, b, white_capture, oracle)?,
            &[a, b, c, d] => resolve_castle([a, b, c, d], side, oracle)?,
            other => return Err(InferenceError::InvalidMoveCount(other.len())),
        },
    };
    if !oracle.is_legal(&candidate) {
        warn!("rejecting illegal inferred move {}", candidate);
        return Err(InferenceError::IllegalMove(candidate.to_string()));
    }
    debug!("inferred {} ({:?})", candidate, candidate.kind);
    Ok(Some(candidate))
}

/// Two changed squares: a plain move or a capture by either side.
fn resolve_pair<O: LegalityOracle + ?Sized>(
    a: Square,
    b: Square,
    white_capture: bool,
    oracle: &O,
) -> Result<BoardMove, InferenceError> {
    let colors = (oracle.color_at(a), oracle.color_at(b));
    debug!("colors before move: {} {:?}, {} {:?}", a, colors.0, b, colors.1);
    let (from, to) = match (white_capture, colors) {
        // White ends up on the square Black held.
        (true, (Some(Color::White), Some(Color::Black))) => (a, b),
        (true, (Some(Color::Black), Some(Color::White))) => (b, a),
        (true, _) => return Err(InferenceError::InvalidDiff),
        // Black ends up on the square White held.
        (false, (Some(Color::Black), Some(Color::White))) => (a, b),
        (false, (Some(Color::White), Some(Color::Black))) => (b, a),
        // Plain movement: the source is the only square that held a piece.
        (false, (Some(_), None)) => (a, b),
        (false, (None, Some(_))) => (b, a),
        (false, (None, None)) | (false, (Some(_), Some(_))) => return Err(InferenceError::InvalidDiff),
    };
    let mv = oracle.describe(from, to, promotion(oracle, from, to));
    // Castles only come from the four-square shape.
    if mv.kind.castle_side().is_some() {
        warn!("king moved {} without its rook", mv);
        return Err(InferenceError::InvalidCastle);
    }
    Ok(mv)
}

/// The promoted piece cannot be sensed; a pawn reaching the last rank becomes a queen.
fn promotion<O: LegalityOracle + ?Sized>(oracle: &O, from: Square, to: Square) -> Option<Piece> {
    let color = oracle.color_at(from)?;
    (oracle.piece_type_at(from) == Some(Piece::Pawn) && to.rank() == promotion_rank(color)).then_some(Piece::Queen)
}

/// Four changed squares on one rank: king and rook swapped past each other.
fn resolve_castle<O: LegalityOracle + ?Sized>(
    squares: [Square; 4],
    side: Color,
    oracle: &O,
) -> Result<BoardMove, InferenceError> {
    let [first, second, third, last] = squares;
    let inner_empty = oracle.piece_type_at(second).is_none() && oracle.piece_type_at(third).is_none();
    let castle = match (oracle.piece_type_at(first), inner_empty, oracle.piece_type_at(last)) {
        (Some(Piece::Rook), true, Some(Piece::King)) => CastleSide::Queenside,
        (Some(Piece::King), true, Some(Piece::Rook)) => CastleSide::Kingside,
        _ => return Err(InferenceError::InvalidCastle),
    };
    if !oracle.castling_rights().has(side, castle) {
        warn!("{:?} castle for {:?} seen but the right is gone", castle, side);
        return Err(InferenceError::InvalidCastle);
    }
    Ok(BoardMove::castle(side, castle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_any_three_is_invalid() {
        let mut values = [[0u8; SIZE]; SIZE];
        values[6][4] = 2;
        values[4][4] = 3;
        assert_eq!(classify(&CellDiff::from_values(values)), DiffShape::Invalid);
    }

    #[test]
    fn classify_mixed_values_is_white_capture_in_row_major_order() {
        let mut values = [[0u8; SIZE]; SIZE];
        values[4][4] = 2; // e4
        values[3][3] = 1; // d5
        match classify(&CellDiff::from_values(values)) {
            DiffShape::Candidate { squares, side, white_capture } => {
                assert_eq!(squares, vec![Square::D5, Square::E4]);
                assert_eq!(side, Color::White);
                assert!(white_capture);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn classify_zero_diff_is_no_move() {
        assert_eq!(classify(&CellDiff::from_values([[0; SIZE]; SIZE])), DiffShape::NoMove);
    }
}

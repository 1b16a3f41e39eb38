use cozy_chess::{Color, File, Rank, Square};
use serde::Serialize;

use crate::oracle::{BoardMove, MoveKind};

/// What the arm needs to carry out a robot move, in the robot's own frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MoveDetails {
    /// From and to squares, e.g. `e2e4`.
    pub move_string: String,
    pub kind: MoveKind,
    /// Rook from/to squares, castling only.
    pub rook_move_string: Option<String>,
}

impl MoveDetails {
    pub fn flag(&self) -> u8 { self.kind.flag() }
}

/// Maps a board square into the robot's frame. The arm always addresses squares from its own side of the
/// board, so a robot playing Black sees the board mirrored end to end.
pub fn robot_frame(square: Square, robot_side: Color) -> Square {
    match robot_side {
        Color::White => square,
        Color::Black => Square::new(File::index(7 - square.file() as usize), Rank::index(7 - square.rank() as usize)),
    }
}

fn pair(from: Square, to: Square, robot_side: Color) -> String {
    format!("{}{}", robot_frame(from, robot_side), robot_frame(to, robot_side))
}

pub fn encode(mv: &BoardMove, robot_side: Color) -> MoveDetails {
    let rook_move_string = mv.kind.castle_side().map(|castle| {
        // rook squares are fixed per side of the board, on the king's rank
        let rank = mv.from.rank();
        pair(Square::new(castle.rook_source(), rank), Square::new(castle.rook_target(), rank), robot_side)
    });
    MoveDetails { move_string: pair(mv.from, mv.to, robot_side), kind: mv.kind, rook_move_string }
}

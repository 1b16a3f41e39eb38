//! The rules boundary: move representation and the queries the inference engine and turn machine need from
//! an authoritative chess position.

use std::fmt;

use cozy_chess::{Color, File, Piece, Rank, Square};
use serde::Serialize;

use crate::error::PositionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Normal,
    Capture,
    CastleKingside,
    CastleQueenside,
}

impl MoveKind {
    /// Flag byte understood by the arm controller.
    pub fn flag(self) -> u8 {
        match self {
            MoveKind::Normal => 0,
            MoveKind::Capture => 1,
            MoveKind::CastleKingside => 2,
            MoveKind::CastleQueenside => 3,
        }
    }

    pub fn castle_side(self) -> Option<CastleSide> {
        match self {
            MoveKind::CastleKingside => Some(CastleSide::Kingside),
            MoveKind::CastleQueenside => Some(CastleSide::Queenside),
            MoveKind::Normal | MoveKind::Capture => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    pub fn kind(self) -> MoveKind {
        match self {
            CastleSide::Kingside => MoveKind::CastleKingside,
            CastleSide::Queenside => MoveKind::CastleQueenside,
        }
    }
    pub fn king_target(self) -> File {
        match self { CastleSide::Kingside => File::G, CastleSide::Queenside => File::C }
    }
    pub fn rook_source(self) -> File {
        match self { CastleSide::Kingside => File::H, CastleSide::Queenside => File::A }
    }
    pub fn rook_target(self) -> File {
        match self { CastleSide::Kingside => File::F, CastleSide::Queenside => File::D }
    }
}

pub fn home_rank(color: Color) -> Rank {
    match color { Color::White => Rank::First, Color::Black => Rank::Eighth }
}

pub fn promotion_rank(color: Color) -> Rank {
    match color { Color::White => Rank::Eighth, Color::Black => Rank::First }
}

/// A single chess move in standard notation (castling is king e1 to g1, never king-takes-rook).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoardMove {
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
    pub rook_move: Option<(Square, Square)>,
    pub promotion: Option<Piece>,
}

impl BoardMove {
    pub fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        Self { from, to, kind, rook_move: None, promotion: None }
    }

    pub fn castle(color: Color, side: CastleSide) -> Self {
        let rank = home_rank(color);
        Self {
            from: Square::new(File::E, rank),
            to: Square::new(side.king_target(), rank),
            kind: side.kind(),
            rook_move: Some((Square::new(side.rook_source(), rank), Square::new(side.rook_target(), rank))),
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, promotion: Option<Piece>) -> Self {
        self.promotion = promotion;
        self
    }
}

fn promotion_char(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    }
}

impl fmt::Display for BoardMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion {
            write!(f, "{}", promotion_char(p))?;
        }
        Ok(())
    }
}

/// Castling availability as a four-bit set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    fn bit(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::Kingside) => 0b0001,
            (Color::White, CastleSide::Queenside) => 0b0010,
            (Color::Black, CastleSide::Kingside) => 0b0100,
            (Color::Black, CastleSide::Queenside) => 0b1000,
        }
    }

    pub fn empty() -> Self { Self(0) }

    pub fn with(self, color: Color, side: CastleSide) -> Self { Self(self.0 | Self::bit(color, side)) }

    pub fn has(self, color: Color, side: CastleSide) -> bool { self.0 & Self::bit(color, side) != 0 }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoveRule,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Checkmate { winner: Color::White } => write!(f, "checkmate, White wins"),
            Outcome::Checkmate { winner: Color::Black } => write!(f, "checkmate, Black wins"),
            Outcome::Stalemate => write!(f, "stalemate"),
            Outcome::InsufficientMaterial => write!(f, "draw by insufficient material"),
            Outcome::SeventyFiveMoveRule => write!(f, "draw by the seventy-five-move rule"),
        }
    }
}

/// Authoritative position queries. Colors and piece types are always read from the position *before* the
/// move under inspection is played.
pub trait LegalityOracle {
    fn color_at(&self, square: Square) -> Option<Color>;
    fn piece_type_at(&self, square: Square) -> Option<Piece>;
    fn side_to_move(&self) -> Color;
    fn is_capture(&self, mv: &BoardMove) -> bool;
    fn is_kingside_castling(&self, mv: &BoardMove) -> bool;
    fn is_queenside_castling(&self, mv: &BoardMove) -> bool;
    fn castling_rights(&self) -> CastlingRights;
    fn is_legal(&self, mv: &BoardMove) -> bool;
    fn outcome(&self) -> Option<Outcome>;
    fn push(&mut self, mv: &BoardMove) -> Result<(), PositionError>;
    fn serialize(&self) -> String;
    fn deserialize(text: &str) -> Result<Self, PositionError>
    where
        Self: Sized;
    /// Parses long algebraic notation; castling may be written as e1g1 or as king-takes-rook e1h1.
    fn parse_uci(&self, text: &str) -> Result<BoardMove, PositionError>;

    fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// Builds a fully classified move for a from/to pair.
    fn describe(&self, from: Square, to: Square, promotion: Option<Piece>) -> BoardMove {
        let probe = BoardMove::new(from, to, MoveKind::Normal).with_promotion(promotion);
        let color = self.color_at(from).unwrap_or_else(|| self.side_to_move());
        if self.is_kingside_castling(&probe) {
            BoardMove::castle(color, CastleSide::Kingside)
        } else if self.is_queenside_castling(&probe) {
            BoardMove::castle(color, CastleSide::Queenside)
        } else if self.is_capture(&probe) {
            BoardMove { kind: MoveKind::Capture, ..probe }
        } else {
            probe
        }
    }
}

use cozy_chess::{Board as CozyBoard, Color, File, Move, Piece, Square};

use crate::error::PositionError;
use crate::oracle::{BoardMove, CastleSide, CastlingRights, LegalityOracle, Outcome};

/// Half-moves without a capture or pawn move after which the game is drawn automatically.
pub const SEVENTY_FIVE_MOVE_LIMIT: u16 = 150;

/// cozy-chess refuses clocks above this value and stops counting there.
const COZY_CLOCK_CAP: u16 = 100;

/// The game's authoritative position, backed by a cozy-chess board.
///
/// cozy-chess encodes castling as the king capturing its own rook; everything leaving this type uses the
/// standard king-two-squares form instead. The board's own halfmove clock saturates at 100, so the real count
/// is kept alongside it for the seventy-five-move rule.
#[derive(Clone, Debug)]
pub struct Position {
    board: CozyBoard,
    halfmove_clock: u16,
}

impl Default for Position {
    fn default() -> Self { Self::startpos() }
}

impl Position {
    pub fn startpos() -> Self {
        Self { board: CozyBoard::default(), halfmove_clock: 0 }
    }

    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let bad = |reason: String| PositionError::Fen { fen: fen.to_string(), reason };
        let mut fields: Vec<String> = fen.split_whitespace().map(str::to_string).collect();
        let halfmove_clock = match fields.get_mut(4) {
            Some(clock) => {
                let n = clock.parse::<u16>().map_err(|_| bad(format!("bad halfmove clock {clock:?}")))?;
                *clock = n.min(COZY_CLOCK_CAP).to_string();
                n
            }
            None => 0,
        };
        CozyBoard::from_fen(&fields.join(" "), false)
            .map(|board| Self { board, halfmove_clock })
            .map_err(|e| bad(format!("{e:?}")))
    }

    pub fn board(&self) -> &CozyBoard { &self.board }

    pub fn fen(&self) -> String {
        let clock = self.halfmove_clock.to_string();
        let text = self.board.to_string();
        let mut fields: Vec<&str> = text.split(' ').collect();
        if let Some(field) = fields.get_mut(4) {
            *field = &clock;
        }
        fields.join(" ")
    }

    /// Half-moves since the last capture or pawn move, uncapped.
    pub fn halfmove_clock(&self) -> u16 { self.halfmove_clock }

    /// No sequence of legal moves can mate: bare kings, a single minor piece, or only bishops that all stand on
    /// one square color.
    fn insufficient_material(&self) -> bool {
        let b = &self.board;
        let heavy = b.pieces(Piece::Pawn) | b.pieces(Piece::Rook) | b.pieces(Piece::Queen);
        if !heavy.is_empty() {
            return false;
        }
        let knights = b.pieces(Piece::Knight);
        let bishops = b.pieces(Piece::Bishop);
        if (knights | bishops).len() <= 1 {
            return true;
        }
        if !knights.is_empty() {
            return false;
        }
        let on_dark = |sq: Square| (sq.file() as usize + sq.rank() as usize) % 2 == 0;
        let dark = bishops.into_iter().filter(|&sq| on_dark(sq)).count();
        dark == 0 || dark == bishops.len() as usize
    }

    /// Castle side for a king move spanning two or more files on its rank, or onto its own rook.
    fn castle_side(&self, from: Square, to: Square) -> Option<CastleSide> {
        if self.board.piece_on(from) != Some(Piece::King) || from.rank() != to.rank() {
            return None;
        }
        let (f, t) = (from.file() as i32, to.file() as i32);
        let onto_own_rook = self.board.color_on(to).is_some() && self.board.color_on(to) == self.board.color_on(from);
        if (t - f).abs() < 2 && !onto_own_rook {
            return None;
        }
        Some(if t > f { CastleSide::Kingside } else { CastleSide::Queenside })
    }

    pub fn to_cozy(&self, mv: &BoardMove) -> Move {
        if let Some(side) = self.castle_side(mv.from, mv.to) {
            if let Some(color) = self.board.color_on(mv.from) {
                let rights = self.board.castle_rights(color);
                let rook_file = match side {
                    CastleSide::Kingside => rights.short.unwrap_or(File::H),
                    CastleSide::Queenside => rights.long.unwrap_or(File::A),
                };
                return Move { from: mv.from, to: Square::new(rook_file, mv.from.rank()), promotion: None };
            }
        }
        Move { from: mv.from, to: mv.to, promotion: mv.promotion }
    }

    pub fn from_cozy(&self, mv: Move) -> BoardMove {
        self.describe(mv.from, mv.to, mv.promotion)
    }
}

impl LegalityOracle for Position {
    fn color_at(&self, square: Square) -> Option<Color> { self.board.color_on(square) }

    fn piece_type_at(&self, square: Square) -> Option<Piece> { self.board.piece_on(square) }

    fn side_to_move(&self) -> Color { self.board.side_to_move() }

    fn is_capture(&self, mv: &BoardMove) -> bool {
        let Some(mover) = self.board.color_on(mv.from) else { return false };
        match self.board.color_on(mv.to) {
            Some(target) => target != mover,
            // en passant: a pawn moving diagonally onto an empty square
            None => self.board.piece_on(mv.from) == Some(Piece::Pawn) && mv.from.file() != mv.to.file(),
        }
    }

    fn is_kingside_castling(&self, mv: &BoardMove) -> bool {
        self.castle_side(mv.from, mv.to) == Some(CastleSide::Kingside)
    }

    fn is_queenside_castling(&self, mv: &BoardMove) -> bool {
        self.castle_side(mv.from, mv.to) == Some(CastleSide::Queenside)
    }

    fn castling_rights(&self) -> CastlingRights {
        let mut rights = CastlingRights::empty();
        for color in [Color::White, Color::Black] {
            let r = self.board.castle_rights(color);
            if r.short.is_some() { rights = rights.with(color, CastleSide::Kingside); }
            if r.long.is_some() { rights = rights.with(color, CastleSide::Queenside); }
        }
        rights
    }

    fn is_legal(&self, mv: &BoardMove) -> bool {
        let target = self.to_cozy(mv);
        let mut found = false;
        self.board.generate_moves(|moves| {
            found = moves.into_iter().any(|m| m == target);
            found
        });
        found
    }

    fn outcome(&self) -> Option<Outcome> {
        let mut has_move = false;
        self.board.generate_moves(|moves| {
            has_move = moves.into_iter().next().is_some();
            has_move
        });
        if !has_move {
            if self.board.checkers().is_empty() {
                return Some(Outcome::Stalemate);
            }
            return Some(Outcome::Checkmate { winner: !self.board.side_to_move() });
        }
        if self.insufficient_material() {
            return Some(Outcome::InsufficientMaterial);
        }
        if self.halfmove_clock >= SEVENTY_FIVE_MOVE_LIMIT {
            return Some(Outcome::SeventyFiveMoveRule);
        }
        None
    }

    fn push(&mut self, mv: &BoardMove) -> Result<(), PositionError> {
        if !self.is_legal(mv) {
            return Err(PositionError::Illegal(mv.to_string()));
        }
        let m = self.to_cozy(mv);
        self.board.play(m);
        self.halfmove_clock = match self.board.halfmove_clock() {
            0 => 0,
            _ => self.halfmove_clock.saturating_add(1),
        };
        Ok(())
    }

    fn serialize(&self) -> String { self.fen() }

    fn deserialize(text: &str) -> Result<Self, PositionError> { Self::from_fen(text) }

    fn parse_uci(&self, text: &str) -> Result<BoardMove, PositionError> {
        let raw = text.trim();
        let mv: Move = raw.parse().map_err(|_| PositionError::MoveText(raw.to_string()))?;
        Ok(self.from_cozy(mv))
    }
}

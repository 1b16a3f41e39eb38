use cozy_chess::{Board, Color, Piece, Square};

pub const MATE_SCORE: i32 = 30_000;
pub const DRAW_SCORE: i32 = 0;

pub fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight => 320,
        Piece::Bishop => 330,
        Piece::Rook => 500,
        Piece::Queen => 900,
        Piece::King => 0,
    }
}

// Pull minor pieces and the queen toward the centre, push pawns forward.
fn placement(piece: Piece, sq: Square, color: Color) -> i32 {
    let file = sq.file() as i32;
    let rank = sq.rank() as i32;
    let advance = if color == Color::White { rank } else { 7 - rank };
    let centre = 6 - ((2 * file - 7).abs() + (2 * rank - 7).abs()) / 2;
    match piece {
        Piece::Pawn => advance * 5,
        Piece::Knight | Piece::Bishop => centre * 4,
        Piece::Queen => centre * 2,
        Piece::Rook | Piece::King => 0,
    }
}

// Positive means White is better.
pub fn eval_white_cp(board: &Board) -> i32 {
    let mut score = 0;
    for sq in board.occupied() {
        let (Some(piece), Some(color)) = (board.piece_on(sq), board.color_on(sq)) else { continue };
        let v = piece_value(piece) + placement(piece, sq, color);
        score += if color == Color::White { v } else { -v };
    }
    score
}

// Side-to-move perspective (negamax-friendly)
pub fn eval_cp(board: &Board) -> i32 {
    let base = eval_white_cp(board);
    if board.side_to_move() == Color::White { base } else { -base }
}

//! Unicode board view for the operator console.

use cozy_chess::{Color, File, Piece, Rank, Square};

use crate::oracle::LegalityOracle;

const EMPTY: char = '⭘';

fn piece_char(color: Color, piece: Piece) -> char {
    match (color, piece) {
        (Color::White, Piece::Pawn) => '♙',
        (Color::White, Piece::Knight) => '♘',
        (Color::White, Piece::Bishop) => '♗',
        (Color::White, Piece::Rook) => '♖',
        (Color::White, Piece::Queen) => '♕',
        (Color::White, Piece::King) => '♔',
        (Color::Black, Piece::Pawn) => '♟',
        (Color::Black, Piece::Knight) => '♞',
        (Color::Black, Piece::Bishop) => '♝',
        (Color::Black, Piece::Rook) => '♜',
        (Color::Black, Piece::Queen) => '♛',
        (Color::Black, Piece::King) => '♚',
    }
}

/// Renders the position with White at the bottom, or Black at the bottom when `flipped`. With `borders` the
/// board gets a frame and file/rank labels.
pub fn board_text<O: LegalityOracle + ?Sized>(oracle: &O, flipped: bool, borders: bool) -> String {
    let ranks: Vec<usize> = if flipped { (0..8).collect() } else { (0..8).rev().collect() };
    let files: Vec<usize> = if flipped { (0..8).rev().collect() } else { (0..8).collect() };
    let file_labels: String = files.iter().map(|&f| format!(" {}", char::from(b'a' + f as u8))).collect();

    let mut out = String::new();
    if borders {
        out.push_str(&format!("   {}\n", file_labels));
        out.push_str(&format!("  ┌{}┐\n", "─".repeat(17)));
    }
    for &rank in &ranks {
        if borders {
            out.push_str(&format!("{} │", rank + 1));
        }
        for (i, &file) in files.iter().enumerate() {
            let sq = Square::new(File::index(file), Rank::index(rank));
            let ch = match (oracle.color_at(sq), oracle.piece_type_at(sq)) {
                (Some(color), Some(piece)) => piece_char(color, piece),
                _ => EMPTY,
            };
            if borders || i > 0 {
                out.push(' ');
            }
            out.push(ch);
        }
        if borders {
            out.push_str(&format!(" │ {}", rank + 1));
        }
        out.push('\n');
    }
    if borders {
        out.push_str(&format!("  └{}┘\n", "─".repeat(17)));
        out.push_str(&format!("   {}\n", file_labels));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;

    #[test]
    fn plain_board_puts_white_at_the_bottom() {
        let text = board_text(&Position::startpos(), false, false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "♜ ♞ ♝ ♛ ♚ ♝ ♞ ♜");
        assert_eq!(lines[4], "⭘ ⭘ ⭘ ⭘ ⭘ ⭘ ⭘ ⭘");
        assert_eq!(lines[7], "♖ ♘ ♗ ♕ ♔ ♗ ♘ ♖");
    }

    #[test]
    fn flipped_board_with_borders() {
        let text = board_text(&Position::startpos(), true, true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "    h g f e d c b a");
        assert_eq!(lines[2], "1 │ ♖ ♘ ♗ ♔ ♕ ♗ ♘ ♖ │ 1");
        assert_eq!(lines[9], "8 │ ♜ ♞ ♝ ♚ ♛ ♝ ♞ ♜ │ 8");
        assert_eq!(lines.len(), 12);
    }
}

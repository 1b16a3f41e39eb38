use std::fmt;
use std::str::FromStr;

use cozy_chess::{Color, File, Rank, Square};

use crate::error::GridError;
use crate::oracle::LegalityOracle;

pub const SIZE: usize = 8;

/// One sensed square. Only presence and color are observable, never the piece type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    Black,
    White,
}

impl Cell {
    /// Numeric code used for diffing: Empty = -1, Black = 0, White = 1.
    ///
    /// The diff classification depends on these exact values: |Empty - White| = 2 is the only way to get a 2,
    /// while |Empty - Black| and |Black - White| both give 1.
    pub const fn code(self) -> i8 {
        match self {
            Cell::Empty => -1,
            Cell::Black => 0,
            Cell::White => 1,
        }
    }

    pub fn from_code(code: i8) -> Result<Self, GridError> {
        match code {
            -1 => Ok(Cell::Empty),
            0 => Ok(Cell::Black),
            1 => Ok(Cell::White),
            other => Err(GridError::Code(other)),
        }
    }

    pub fn from_color(color: Option<Color>) -> Self {
        match color {
            None => Cell::Empty,
            Some(Color::Black) => Cell::Black,
            Some(Color::White) => Cell::White,
        }
    }

    fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Black => 'B',
            Cell::White => 'W',
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "." | "-" | "e" | "E" | "-1" => Some(Cell::Empty),
            "b" | "B" | "0" => Some(Cell::Black),
            "w" | "W" | "1" => Some(Cell::White),
            _ => None,
        }
    }
}

/// An 8x8 occupancy reading in sensor coordinates. Row 0 is whatever edge of the board the camera sees first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OccupancyGrid {
    cells: [[Cell; SIZE]; SIZE],
}

impl OccupancyGrid {
    pub fn from_codes(codes: [[i8; SIZE]; SIZE]) -> Result<Self, GridError> {
        let mut cells = [[Cell::Empty; SIZE]; SIZE];
        for (row, line) in codes.iter().enumerate() {
            for (col, &code) in line.iter().enumerate() {
                cells[row][col] = Cell::from_code(code)?;
            }
        }
        Ok(Self { cells })
    }

    /// Parses eight non-empty lines. A line is either eight symbols (`WB.`) or eight whitespace-separated tokens
    /// (`W B .` or the numeric codes `1 0 -1`).
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if lines.len() != SIZE {
            return Err(GridError::RowCount(lines.len()));
        }
        let mut cells = [[Cell::Empty; SIZE]; SIZE];
        for (row, line) in lines.iter().enumerate() {
            let tokens: Vec<String> = if line.contains(char::is_whitespace) {
                line.split_whitespace().map(str::to_string).collect()
            } else {
                line.chars().map(String::from).collect()
            };
            if tokens.len() != SIZE {
                return Err(GridError::ColumnCount { row, found: tokens.len() });
            }
            for (col, token) in tokens.iter().enumerate() {
                cells[row][col] = Cell::from_token(token)
                    .ok_or_else(|| GridError::Token { row, token: token.clone() })?;
            }
        }
        Ok(Self { cells })
    }

    pub fn cell(&self, row: usize, col: usize) -> Cell { self.cells[row][col] }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) { self.cells[row][col] = cell; }

    pub fn row_is(&self, row: usize, cell: Cell) -> bool {
        self.cells[row].iter().all(|&c| c == cell)
    }

    pub fn col_is(&self, col: usize, cell: Cell) -> bool {
        self.cells.iter().all(|line| line[col] == cell)
    }

    /// Builds a grid where `out[r][c] = self[src(r, c)]`.
    pub(crate) fn remap(&self, src: impl Fn(usize, usize) -> (usize, usize)) -> Self {
        let mut cells = [[Cell::Empty; SIZE]; SIZE];
        for (r, line) in cells.iter_mut().enumerate() {
            for (c, cell) in line.iter_mut().enumerate() {
                let (sr, sc) = src(r, c);
                *cell = self.cells[sr][sc];
            }
        }
        Self { cells }
    }
}

impl FromStr for OccupancyGrid {
    type Err = GridError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl fmt::Display for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in line {
                write!(f, "{}", cell.symbol())?;
            }
        }
        Ok(())
    }
}

/// A grid in canonical orientation: row 0 is rank 8, row 7 is rank 1, column 0 is file a.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalGrid(OccupancyGrid);

impl CanonicalGrid {
    pub(crate) fn from_normalized(grid: OccupancyGrid) -> Self { Self(grid) }

    /// Re-derives the grid from the authoritative position.
    pub fn from_oracle<O: LegalityOracle + ?Sized>(oracle: &O) -> Self {
        let mut grid = OccupancyGrid::default();
        for row in 0..SIZE {
            for col in 0..SIZE {
                grid.set(row, col, Cell::from_color(oracle.color_at(Self::square_at(row, col))));
            }
        }
        Self(grid)
    }

    pub fn square_at(row: usize, col: usize) -> Square {
        Square::new(File::index(col), Rank::index(SIZE - 1 - row))
    }

    pub fn cell_at(&self, square: Square) -> Cell {
        self.0.cell(SIZE - 1 - square.rank() as usize, square.file() as usize)
    }

    pub fn grid(&self) -> &OccupancyGrid { &self.0 }
}

impl fmt::Display for CanonicalGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::cozy::Position;

    #[test]
    fn parse_accepts_symbols_and_codes() {
        let symbols = "BBBBBBBB\nBBBBBBBB\n........\n........\n........\n........\nWWWWWWWW\nWWWWWWWW";
        let codes = "0 0 0 0 0 0 0 0\n0 0 0 0 0 0 0 0\n-1 -1 -1 -1 -1 -1 -1 -1\n-1 -1 -1 -1 -1 -1 -1 -1\n\
                     -1 -1 -1 -1 -1 -1 -1 -1\n-1 -1 -1 -1 -1 -1 -1 -1\n1 1 1 1 1 1 1 1\n1 1 1 1 1 1 1 1";
        let a = OccupancyGrid::parse(symbols).expect("symbols");
        let b = OccupancyGrid::parse(codes).expect("codes");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), symbols);
    }

    #[test]
    fn parse_rejects_short_rows() {
        let err = OccupancyGrid::parse("BBBBBBB\n".repeat(8).as_str()).unwrap_err();
        assert_eq!(err, GridError::ColumnCount { row: 0, found: 7 });
        assert_eq!(OccupancyGrid::from_codes([[2; 8]; 8]).unwrap_err(), GridError::Code(2));
    }

    #[test]
    fn oracle_grid_puts_white_on_the_bottom_rows() {
        let g = CanonicalGrid::from_oracle(&Position::startpos());
        assert!(g.grid().row_is(7, Cell::White));
        assert!(g.grid().row_is(0, Cell::Black));
        assert_eq!(g.cell_at(Square::E2), Cell::White);
        assert_eq!(g.cell_at(Square::E4), Cell::Empty);
        assert_eq!(CanonicalGrid::square_at(7, 0), Square::A1);
    }
}

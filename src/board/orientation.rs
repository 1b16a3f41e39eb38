use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::board::grid::{CanonicalGrid, Cell, OccupancyGrid, SIZE};
use crate::error::OrientationError;

const LAST: usize = SIZE - 1;

/// Where White's pieces sit in the raw camera frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    WhiteTop,
    WhiteBottom,
    WhiteLeft,
    WhiteRight,
}

impl Orientation {
    pub const ALL: [Orientation; 4] =
        [Orientation::WhiteTop, Orientation::WhiteBottom, Orientation::WhiteLeft, Orientation::WhiteRight];

    /// Learns the orientation from an untouched starting position. Exactly one of the four edge patterns must
    /// hold: row 0 all White, row 0 all Black, column 0 all White, column 0 all Black.
    pub fn learn(initial: &OccupancyGrid) -> Result<Self, OrientationError> {
        let matches: Vec<Orientation> = Self::ALL.into_iter().filter(|o| o.matches(initial)).collect();
        debug!("orientation candidates: {:?}", matches);
        match matches.as_slice() {
            [only] => Ok(*only),
            [] => Err(OrientationError::NoPattern),
            many => Err(OrientationError::Ambiguous(many.len())),
        }
    }

    fn matches(self, grid: &OccupancyGrid) -> bool {
        match self {
            Orientation::WhiteTop => grid.row_is(0, Cell::White),
            Orientation::WhiteBottom => grid.row_is(0, Cell::Black),
            Orientation::WhiteLeft => grid.col_is(0, Cell::White),
            Orientation::WhiteRight => grid.col_is(0, Cell::Black),
        }
    }

    /// Rotates a raw grid so that White's home ranks are the bottom rows.
    pub fn normalize(self, grid: &OccupancyGrid) -> CanonicalGrid {
        let out = match self {
            Orientation::WhiteBottom => *grid,
            Orientation::WhiteTop => grid.remap(|r, c| (LAST - r, LAST - c)),
            // quarter turn counter-clockwise
            Orientation::WhiteLeft => grid.remap(|r, c| (c, LAST - r)),
            // quarter turn clockwise
            Orientation::WhiteRight => grid.remap(|r, c| (LAST - c, r)),
        };
        CanonicalGrid::from_normalized(out)
    }

    pub fn tag(self) -> &'static str {
        match self {
            Orientation::WhiteTop => "WT",
            Orientation::WhiteBottom => "WB",
            Orientation::WhiteLeft => "WL",
            Orientation::WhiteRight => "WR",
        }
    }
}

/// Normalises with an orientation that may not have been learned yet.
pub fn normalize(grid: &OccupancyGrid, orientation: Option<Orientation>) -> Result<CanonicalGrid, OrientationError> {
    orientation.map(|o| o.normalize(grid)).ok_or(OrientationError::Unset)
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.tag()) }
}

impl FromStr for Orientation {
    type Err = OrientationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::ALL.into_iter().find(|o| o.tag() == tag).ok_or_else(|| OrientationError::UnknownTag(tag.to_string()))
    }
}

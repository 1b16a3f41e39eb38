pub mod cozy;
pub mod grid;
pub mod orientation;

pub use cozy::Position;
pub use grid::{CanonicalGrid, Cell, OccupancyGrid};
pub use orientation::Orientation;

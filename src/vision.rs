use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::board::OccupancyGrid;
use crate::error::VisionError;

/// Source of raw occupancy grids. The camera pipeline lives outside this crate.
pub trait VisionProvider {
    fn capture_grid(&mut self) -> Result<OccupancyGrid, VisionError>;
}

/// Reads the latest grid the vision process wrote to a file.
#[derive(Clone, Debug)]
pub struct GridFile {
    path: PathBuf,
}

impl GridFile {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }
}

impl VisionProvider for GridFile {
    fn capture_grid(&mut self) -> Result<OccupancyGrid, VisionError> {
        let text = fs::read_to_string(&self.path)
            .map_err(|source| VisionError::Io { path: self.path.clone(), source })?;
        let grid = OccupancyGrid::parse(&text)?;
        debug!("captured grid from {}:\n{}", self.path.display(), grid);
        Ok(grid)
    }
}

/// Replays a fixed sequence of frames.
#[derive(Clone, Debug, Default)]
pub struct ScriptedVision {
    frames: VecDeque<OccupancyGrid>,
}

impl ScriptedVision {
    pub fn new(frames: impl IntoIterator<Item = OccupancyGrid>) -> Self {
        Self { frames: frames.into_iter().collect() }
    }

    pub fn push(&mut self, frame: OccupancyGrid) { self.frames.push_back(frame); }

    pub fn remaining(&self) -> usize { self.frames.len() }
}

impl VisionProvider for ScriptedVision {
    fn capture_grid(&mut self) -> Result<OccupancyGrid, VisionError> {
        self.frames.pop_front().ok_or(VisionError::Exhausted)
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cozy_chess::Color;
use serde::{Deserialize, Serialize};

use crate::engine::{MoveProvider, SearchEngine, UciEngine};
use crate::error::{ConfigError, EngineError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn color(self) -> Color {
        match self { Side::White => Color::White, Side::Black => Color::Black }
    }
}

impl FromStr for Side {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "w" | "white" => Ok(Side::White),
            "b" | "black" => Ok(Side::Black),
            _ => Err(ConfigError::Side(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EngineConfig {
    Builtin {
        #[serde(default = "default_threads")]
        threads: usize,
    },
    Uci {
        path: PathBuf,
    },
}

fn default_threads() -> usize { 1 }

impl Default for EngineConfig {
    fn default() -> Self { EngineConfig::Builtin { threads: default_threads() } }
}

impl EngineConfig {
    pub fn build(&self) -> Result<Box<dyn MoveProvider>, EngineError> {
        Ok(match self {
            EngineConfig::Builtin { threads } => Box::new(SearchEngine::new(*threads)),
            EngineConfig::Uci { path } => Box::new(UciEngine::spawn(path)?),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub robot_side: Side,
    /// Engine search depth in plies.
    pub depth: u32,
    pub save_path: PathBuf,
    pub engine: EngineConfig,
    pub squares_path: PathBuf,
    pub actuator_port: Option<PathBuf>,
    pub grid_path: PathBuf,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            robot_side: Side::White,
            depth: 5,
            save_path: PathBuf::from("saves/last position.txt"),
            engine: EngineConfig::default(),
            squares_path: PathBuf::from("Squares.txt"),
            actuator_port: None,
            grid_path: PathBuf::from("grid.txt"),
        }
    }
}

impl RobotConfig {
    pub fn from_json(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Parse { path: origin.to_path_buf(), source })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_json(&text, path)
    }
}

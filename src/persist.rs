use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::board::Orientation;
use crate::error::PersistError;

/// The crash-recovery record: position FEN, whose turn it is and the learned board orientation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistedState {
    pub fen: String,
    pub robot_to_move: bool,
    pub orientation: Orientation,
}

impl PersistedState {
    /// Three lines: FEN, `True`/`False`, orientation tag.
    pub fn parse(text: &str) -> Result<Self, PersistError> {
        let mut lines = text.lines().map(str::trim);
        let fen = lines.next().filter(|l| !l.is_empty()).ok_or(PersistError::MissingLine(1))?.to_string();
        let robot_to_move = match lines.next().ok_or(PersistError::MissingLine(2))? {
            "True" => true,
            "False" => false,
            other => return Err(PersistError::TurnFlag(other.to_string())),
        };
        let orientation = lines.next().ok_or(PersistError::MissingLine(3))?.parse::<Orientation>()?;
        Ok(Self { fen, robot_to_move, orientation })
    }
}

impl fmt::Display for PersistedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = if self.robot_to_move { "True" } else { "False" };
        write!(f, "{}\n{}\n{}", self.fen, flag, self.orientation)
    }
}

/// Saved-state file. Writes go to a sibling temp file that is renamed over the target, so a failed write never
/// leaves a truncated record behind.
#[derive(Clone, Debug)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }

    pub fn exists(&self) -> bool { self.path.is_file() }

    fn io_err(&self, source: std::io::Error) -> PersistError {
        PersistError::Io { path: self.path.clone(), source }
    }

    pub fn save(&self, state: &PersistedState) -> Result<(), PersistError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;
        }
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);
        let written = File::create(&tmp).and_then(|mut f| {
            f.write_all(state.to_string().as_bytes())?;
            f.sync_all()
        });
        if let Err(e) = written.and_then(|()| fs::rename(&tmp, &self.path)) {
            // the temp file may or may not exist at this point
            let _ = fs::remove_file(&tmp);
            return Err(self.io_err(e));
        }
        debug!("saved game state to {}", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<PersistedState, PersistError> {
        let text = fs::read_to_string(&self.path).map_err(|e| self.io_err(e))?;
        PersistedState::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_three_lines() {
        let text = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1\nFalse\nWL";
        let s = PersistedState::parse(text).expect("valid record");
        assert!(!s.robot_to_move);
        assert_eq!(s.orientation, Orientation::WhiteLeft);
        assert_eq!(s.to_string(), text);
    }

    #[test]
    fn parse_rejects_bad_turn_flag() {
        let err = PersistedState::parse("8/8/8/8/8/8/8/K6k w - - 0 1\nyes\nWB").unwrap_err();
        assert!(matches!(err, PersistError::TurnFlag(ref f) if f == "yes"));
        assert!(matches!(PersistedState::parse("8/8/8/8/8/8/8/K6k w - - 0 1\nTrue"), Err(PersistError::MissingLine(3))));
    }

    #[test]
    fn failed_save_leaves_no_temp_file() {
        let dir = PathBuf::from("target").join("rookbot_persist_blocked");
        let _ = fs::remove_dir_all(&dir);
        // a non-empty directory where the record should go makes the rename fail
        let target = dir.join("last position.txt");
        fs::create_dir_all(target.join("occupied")).expect("scratch dir");

        let store = StateStore::new(&target);
        let state = PersistedState {
            fen: "8/8/8/8/8/8/8/K6k w - - 0 1".to_string(),
            robot_to_move: true,
            orientation: Orientation::WhiteBottom,
        };
        assert!(matches!(store.save(&state), Err(PersistError::Io { .. })));
        assert!(!dir.join("last position.txt.tmp").exists());
        assert!(target.is_dir());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn save_then_load_replaces_the_record() {
        let dir = PathBuf::from("target").join("rookbot_persist_replace");
        let _ = fs::remove_dir_all(&dir);
        let store = StateStore::new(dir.join("state.txt"));
        let mut state = PersistedState {
            fen: "8/8/8/8/8/8/8/K6k w - - 0 1".to_string(),
            robot_to_move: true,
            orientation: Orientation::WhiteTop,
        };
        store.save(&state).expect("first save");
        state.robot_to_move = false;
        store.save(&state).expect("second save");
        assert_eq!(store.load().expect("saved record"), state);
        assert!(!dir.join("state.txt.tmp").exists());
        let _ = fs::remove_dir_all(dir);
    }
}

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use log::{debug, info};

use crate::engine::MoveProvider;
use crate::error::EngineError;

/// Client for an external UCI engine process (e.g. Stockfish).
pub struct UciEngine {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    name: Option<String>,
}

impl UciEngine {
    /// Spawns the engine and completes the `uci`/`isready` handshake.
    pub fn spawn(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| EngineError::Unavailable(format!("{}: {e}", path.display())))?;
        let stdin = child.stdin.take().ok_or_else(|| EngineError::Unavailable("engine stdin not piped".into()))?;
        let stdout = child.stdout.take().ok_or_else(|| EngineError::Unavailable("engine stdout not piped".into()))?;
        let mut engine = Self { child, stdin, reader: BufReader::new(stdout), name: None };

        engine.send("uci")?;
        for line in engine.wait_for("uciok")? {
            if let Some(name) = line.strip_prefix("id name ") {
                engine.name = Some(name.to_string());
            }
        }
        engine.sync()?;
        info!("engine ready: {}", engine.name.as_deref().unwrap_or("(unnamed)"));
        Ok(engine)
    }

    pub fn name(&self) -> Option<&str> { self.name.as_deref() }

    fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!("uci > {}", cmd);
        writeln!(self.stdin, "{}", cmd)?;
        self.stdin.flush()?;
        Ok(())
    }

    fn sync(&mut self) -> Result<(), EngineError> {
        self.send("isready")?;
        self.wait_for("readyok").map(|_| ())
    }

    /// Reads lines up to and including the first one starting with `target`.
    fn wait_for(&mut self, target: &str) -> Result<Vec<String>, EngineError> {
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(EngineError::Unavailable(format!("engine exited while waiting for {target}")));
            }
            let line = line.trim().to_string();
            let done = line.starts_with(target);
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
    }
}

fn parse_bestmove(line: &str) -> Option<&str> {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some("bestmove"), Some(mv)) if mv != "(none)" && mv != "0000" => Some(mv),
        _ => None,
    }
}

impl MoveProvider for UciEngine {
    fn best_move(&mut self, fen: &str, depth: u32) -> Result<String, EngineError> {
        self.sync()?;
        self.send(&format!("position fen {}", fen))?;
        self.send(&format!("go depth {}", depth))?;
        let lines = self.wait_for("bestmove")?;
        let last = lines.last().map(String::as_str).unwrap_or_default();
        match parse_bestmove(last) {
            Some(mv) => Ok(mv.to_string()),
            None if last.starts_with("bestmove") => Err(EngineError::NoMove(fen.to_string())),
            None => Err(EngineError::Protocol(format!("unexpected reply {last:?}"))),
        }
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        let _ = writeln!(self.stdin, "quit");
        let _ = self.stdin.flush();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bestmove_line_parsing() {
        assert_eq!(parse_bestmove("bestmove e2e4 ponder e7e5"), Some("e2e4"));
        assert_eq!(parse_bestmove("bestmove (none)"), None);
        assert_eq!(parse_bestmove("info depth 3"), None);
    }
}

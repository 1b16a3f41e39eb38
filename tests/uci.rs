use rookbot::engine::{MoveProvider, UciEngine};
use rookbot::error::EngineError;

#[test]
fn missing_engine_binary_is_unavailable() {
    let err = UciEngine::spawn("/nonexistent/rookbot-engine").err().expect("spawn must fail");
    assert!(matches!(err, EngineError::Unavailable(_)), "unexpected error: {err}");
}

#[cfg(unix)]
#[test]
fn talks_uci_to_a_scripted_engine() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let dir = std::path::Path::new("target/rookbot_uci");
    fs::create_dir_all(dir).expect("scratch dir");
    let script = dir.join("fakefish.sh");
    fs::write(
        &script,
        "#!/bin/sh\n\
         while read line; do\n\
           case \"$line\" in\n\
             uci) echo 'id name FakeFish'; echo 'uciok';;\n\
             isready) echo 'readyok';;\n\
             go*) echo 'info depth 1 score cp 20'; echo 'bestmove e2e4 ponder e7e5';;\n\
             quit) exit 0;;\n\
           esac\n\
         done\n",
    )
    .expect("write script");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");

    let mut engine = UciEngine::spawn(&script).expect("handshake");
    assert_eq!(engine.name(), Some("FakeFish"));
    let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    assert_eq!(engine.best_move(fen, 4).expect("bestmove"), "e2e4");
    drop(engine);
    let _ = fs::remove_dir_all(dir);
}

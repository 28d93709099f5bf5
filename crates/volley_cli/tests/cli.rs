use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn volley(store: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_volley"))
        .arg("--store")
        .arg(store)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run volley")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_roster(dir: &Path, file: &str, first: u32) -> String {
    let players: Vec<serde_json::Value> = (first..first + 7)
        .map(|n| {
            serde_json::json!({
                "number": n.to_string(),
                "name": format!("Player {}", n),
                "isCaptain": n == first,
            })
        })
        .collect();
    let path = dir.join(file);
    std::fs::write(&path, serde_json::json!({ "players": players }).to_string()).unwrap();
    path.display().to_string()
}

#[test]
fn test_match_setup_and_point() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store");
    let roster_a = write_roster(dir.path(), "a.json", 1);
    let roster_b = write_roster(dir.path(), "b.json", 15);

    assert!(volley(&store, &["roster", "A", "--file", &roster_a]).status.success());
    let out = volley(&store, &["roster", "B", "--file", &roster_b]);
    assert!(stdout(&out).contains("volley serve"));

    assert!(volley(&store, &["serve", "B"]).status.success());

    // Scoring before lineups is refused.
    let out = volley(&store, &["point", "A"]);
    assert!(!out.status.success());

    assert!(volley(&store, &["lineup", "A", "1", "2", "3", "4", "5", "6"]).status.success());
    assert!(volley(&store, &["lineup", "B", "15", "16", "17", "18", "19", "20"]).status.success());

    let out = volley(&store, &["point", "A"]);
    assert!(stdout(&out).contains("--kind acierto"));

    let out = volley(
        &store,
        &["point", "A", "--kind", "acierto", "--action", "ataque", "--player", "4"],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout(&out).lines().any(|l| l.contains("Home Team") && l.contains("  1  ")));

    let out = volley(&store, &["stats", "A"]);
    assert!(stdout(&out).contains("#4 Player 4"));
}

#[test]
fn test_json_command_and_clear() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store");

    let out = volley(&store, &["json", r#"{"schema_version":1,"command":"swap_sides"}"#]);
    let response: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(response["success"], serde_json::json!(true));
    assert!(store.join("volley_match_state.json").exists());

    assert!(volley(&store, &["clear"]).status.success());
    assert!(!store.join("volley_match_state.json").exists());
}

#[test]
fn test_status_reports_saved_match() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store");

    let out = volley(&store, &["status"]);
    assert!(stdout(&out).contains("No saved match yet"));

    assert!(volley(&store, &["swap-sides"]).status.success());
    let out = volley(&store, &["status"]);
    assert!(stdout(&out).contains("Home Team 0 - 0 Away Team (in progress)"));
}

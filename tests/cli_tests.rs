use regex::Regex;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_skillmacro"))
        .args(args)
        .args(["--catalog", "data/catalog.json", "--preset", "data/preset.json"])
        .output()
        .expect("Failed to execute binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn table_row(text: &str, label: &str) -> String {
    text.lines()
        .find(|l| l.contains(label))
        .unwrap_or_default()
        .to_string()
}

/// `(key, skill id, slot)` per preview line, in order.
fn preview_entries(text: &str) -> Vec<(String, String, usize)> {
    let line = Regex::new(r"^\s*\d+\. \[(\S+)\] (\S+) \(slot (\d+)\)$").unwrap();
    text.lines()
        .filter_map(|l| line.captures(l))
        .map(|c| (c[1].to_string(), c[2].to_string(), c[3].parse().unwrap()))
        .collect()
}

#[test]
fn test_cli_preview_sample_preset() {
    let output = run(&["preview", "--count", "5"]);
    assert!(output.status.success());
    let entries = preview_entries(&stdout(&output));
    assert_eq!(entries.len(), 5, "{}", stdout(&output));
    // The automatic link [iron_will, meteor_strike] fires first.
    assert_eq!(entries[0], ("3".to_string(), "iron_will".to_string(), 2));
    assert_eq!(entries[1], ("4".to_string(), "meteor_strike".to_string(), 3));
    assert_eq!(entries[2].1, "crescent_slash");
    // spirit_spring is not used automatically.
    assert!(entries.iter().all(|(_, id, _)| id != "spirit_spring"));
}

#[test]
fn test_cli_simulate_is_reproducible_with_seed() {
    let first = run(&["simulate", "--seed", "42", "--trials", "50"]);
    let second = run(&["simulate", "--seed", "42", "--trials", "50"]);
    assert!(first.status.success());
    assert!(second.status.success());

    let (a, b) = (stdout(&first), stdout(&second));
    for label in ["Boss DPS", "Boss DPM", "Normal DPS", "Normal DPM"] {
        let row = table_row(&a, label);
        assert!(!row.is_empty(), "missing {} row:\n{}", label, a);
        assert_eq!(row, table_row(&b, label));
    }
}

#[test]
fn test_cli_deterministic_powers() {
    let output = run(&["simulate", "--deterministic"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Farming"));
}

#[test]
fn test_cli_required_rejects_unknown_stat() {
    let output = run(&["required", "--stat", "MANA", "--targets", "1000"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_missing_preset_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_skillmacro"))
        .args(["preview", "--preset", "data/does_not_exist.json"])
        .output()
        .expect("Failed to execute binary");
    assert!(!output.status.success());
}

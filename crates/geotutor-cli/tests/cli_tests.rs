//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `geotutor` command isolated from any config on the host.
fn geotutor(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("geotutor").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("GEOTUTOR_ALPHA")
        .env_remove("GEOTUTOR_BETA")
        .env_remove("RUST_LOG");
    cmd
}

fn read_store(dir: &TempDir) -> serde_json::Value {
    let content = std::fs::read_to_string(dir.path().join("students_data.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn generate_text_with_answers() {
    let dir = TempDir::new().unwrap();
    geotutor(&dir)
        .args(["generate", "--shape", "square", "--count", "3", "--seed", "1"])
        .arg("--show-answer")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Square (easy): side = "))
        .stdout(predicate::str::contains("3. Square (easy)"))
        .stdout(predicate::str::contains("Area = side × side = "));
}

#[test]
fn generate_is_reproducible_with_seed() {
    let dir = TempDir::new().unwrap();
    let run = || {
        geotutor(&dir)
            .args(["generate", "--shape", "triangle", "--difficulty", "hard"])
            .args(["--count", "5", "--seed", "99"])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn generate_json() {
    let dir = TempDir::new().unwrap();
    let output = geotutor(&dir)
        .args(["generate", "--shape", "rectangle", "--difficulty", "medium"])
        .args(["--count", "2", "--seed", "5", "--format", "json", "--show-answer"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let problems: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let problems = problems.as_array().unwrap();
    assert_eq!(problems.len(), 2);
    for p in problems {
        assert_eq!(p["dimensions"]["shape"], "rectangle");
        assert_eq!(p["difficulty"], "medium");
        let area = p["area"].as_f64().unwrap();
        let length = p["dimensions"]["length"].as_f64().unwrap();
        let width = p["dimensions"]["width"].as_f64().unwrap();
        assert!((area - length * width).abs() < 1e-9);
    }
}

#[test]
fn generate_unknown_shape() {
    let dir = TempDir::new().unwrap();
    geotutor(&dir)
        .args(["generate", "--shape", "hexagon", "--difficulty", "easy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported shape: hexagon"));
}

#[test]
fn example_shows_formula() {
    let dir = TempDir::new().unwrap();
    geotutor(&dir)
        .args(["example", "--shape", "triangle", "--seed", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Triangle example:"))
        .stdout(predicate::str::contains("Area = ½ × base × height = "));
}

#[test]
fn init_creates_valid_config() {
    let dir = TempDir::new().unwrap();

    geotutor(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created geotutor.toml"));
    assert!(dir.path().join("geotutor.toml").exists());

    geotutor(&dir)
        .args(["validate", "--config", "geotutor.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config valid."));

    geotutor(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_rejects_inverted_thresholds() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("bad.toml"),
        "[policy]\npromote_threshold = 0.4\ndemote_threshold = 0.6\n",
    )
    .unwrap();

    geotutor(&dir)
        .args(["validate", "--config", "bad.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("demote_threshold"));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();
    geotutor(&dir)
        .args(["validate", "--config", "missing.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn practice_records_answers_and_ignores_bad_input() {
    let dir = TempDir::new().unwrap();

    geotutor(&dir)
        .args(["practice", "--student", "202300123", "--seed", "7"])
        .write_stdin("twelve\n-1\nprogress\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome, 202300123!"))
        .stdout(predicate::str::contains("Mastery: 50% | Difficulty: easy"))
        .stdout(predicate::str::contains(
            "Error: invalid answer: 'twelve' is not a number",
        ))
        .stdout(predicate::str::contains("Incorrect."))
        .stdout(predicate::str::contains("0/1 correct"))
        .stdout(predicate::str::contains("Goodbye, 202300123!"));

    let store = read_store(&dir);
    let record = &store["202300123"];
    assert_eq!(record["attempts"], 1);
    assert_eq!(record["correct"], 0);
    assert_eq!(record["difficulty"], "easy");
    assert!(record["mastery"].as_f64().unwrap() < 0.5);
}

#[test]
fn practice_switches_shapes_and_shows_examples() {
    let dir = TempDir::new().unwrap();

    geotutor(&dir)
        .args(["practice", "--student", "ana", "--shape", "square"])
        .args(["--seed", "2"])
        .write_stdin("shapetriangle\nshape rectangle\nshape hexagon\nexample\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Square (easy)"))
        .stdout(predicate::str::contains(
            "Error: invalid answer: 'shapetriangle' is not a number",
        ))
        .stdout(predicate::str::contains("Switched to triangle.").not())
        .stdout(predicate::str::contains("Switched to rectangle."))
        .stdout(predicate::str::contains("Rectangle (easy)"))
        .stdout(predicate::str::contains("unsupported shape: hexagon"))
        .stdout(predicate::str::contains("Rectangle example:"));

    // Starting a session persists the new student even without answers.
    let store = read_store(&dir);
    assert_eq!(store["ana"]["attempts"], 0);
    assert_eq!(store["ana"]["mastery"], 0.5);
}

#[test]
fn practice_rejects_unknown_start_shape() {
    let dir = TempDir::new().unwrap();
    geotutor(&dir)
        .args(["practice", "--student", "ana", "--shape", "circle"])
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported shape: circle"));
}

#[test]
fn stats_lists_students() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("students_data.json"),
        r#"{
  "amy": {"mastery": 0.75, "difficulty": "hard", "attempts": 10, "correct": 9, "last_login": "2024-11-02T14:05:11"},
  "ben": {"mastery": 0.25, "difficulty": "easy", "attempts": 4, "correct": 1, "last_login": "2024-11-03T08:00:00"}
}"#,
    )
    .unwrap();

    geotutor(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("amy"))
        .stdout(predicate::str::contains("75%"))
        .stdout(predicate::str::contains("ben"))
        .stdout(predicate::str::contains("2 student(s)"))
        .stdout(predicate::str::contains("(10/14)"));

    let output = geotutor(&dir)
        .args(["stats", "--student", "ben", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["students"][0]["student_id"], "ben");
    assert_eq!(json["students"][0]["mastery_percent"], 25);
    assert_eq!(json["summary"]["total_attempts"], 4);
}

#[test]
fn stats_empty_store() {
    let dir = TempDir::new().unwrap();
    geotutor(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("No students found"));
}

#[test]
fn stats_unknown_student() {
    let dir = TempDir::new().unwrap();
    geotutor(&dir)
        .args(["stats", "--student", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no record for student 'ghost'"));
}

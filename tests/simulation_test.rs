use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn binary() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_traffic_schedule"));
    command.env("RUST_LOG", "warn,traffic_schedule=info");
    command
}

/// Scratch directory unique to one test
fn scratch_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "traffic_schedule_{}_{}",
        test,
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("Failed to create scratch directory");
    dir
}

fn generate_problem(dir: &Path) -> PathBuf {
    let path = dir.join("problem.txt");
    let output = binary()
        .args(["generate", "--seed", "4", "--cars", "25", "--output"])
        .arg(&path)
        .output()
        .expect("Failed to execute generator");
    assert!(
        output.status.success(),
        "Generator failed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    path
}

fn parse_score(output: &Output) -> u64 {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout
        .lines()
        .find(|line| line.starts_with("score:"))
        .unwrap_or_else(|| panic!("No score line in stdout: {}", stdout));
    line["score:".len()..]
        .trim()
        .parse()
        .unwrap_or_else(|_| panic!("Could not parse score from '{}'", line))
}

/// Test that scheduling with simulation runs to completion and reports
#[test]
fn test_schedule_and_simulate() {
    let dir = scratch_dir("simulate");
    let problem = generate_problem(&dir);

    let output = binary()
        .args(["schedule", "--strategy", "popularity", "--simulate"])
        .arg(&problem)
        .output()
        .expect("Failed to execute scheduler");

    assert!(
        output.status.success(),
        "Scheduler failed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("=== SIMULATION COMPLETE ==="),
        "Simulation did not complete properly. stderr: {}",
        stderr
    );
    for statistic in ["Total cars:", "Cars finished:", "Score:", "Success rate:"] {
        assert!(stderr.contains(statistic), "Missing '{}' statistic", statistic);
    }

    parse_score(&output);
}

/// Test that a written submission scores the same as the direct run
#[test]
fn test_written_submission_scores_identically() {
    let dir = scratch_dir("score");
    let problem = generate_problem(&dir);
    let submission = dir.join("submission.txt");

    let scheduled = binary()
        .args(["schedule", "--strategy", "inverse-duration", "--simulate", "--output"])
        .arg(&submission)
        .arg(&problem)
        .output()
        .expect("Failed to execute scheduler");
    assert!(scheduled.status.success(), "Scheduler failed");

    let text = fs::read_to_string(&submission).expect("Submission not written");
    assert!(!text.trim().is_empty(), "Submission is empty");

    let scored = binary()
        .arg("score")
        .arg(&problem)
        .arg(&submission)
        .output()
        .expect("Failed to execute scorer");
    assert!(
        scored.status.success(),
        "Scorer failed. stderr: {}",
        String::from_utf8_lossy(&scored.stderr)
    );

    assert_eq!(parse_score(&scheduled), parse_score(&scored));
}

/// Test that malformed input fails with a non-zero exit status
#[test]
fn test_bad_input_fails() {
    let dir = scratch_dir("bad_input");
    let problem = dir.join("broken.txt");
    fs::write(&problem, "5 2 1 1 10\n0 1 a 1\n2 a b\n").expect("Failed to write input");

    let output = binary()
        .arg("schedule")
        .arg(&problem)
        .output()
        .expect("Failed to execute scheduler");

    assert!(!output.status.success(), "Malformed input was accepted");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("unknown street 'b'"),
        "Error does not name the street. stderr: {}",
        stderr
    );
}

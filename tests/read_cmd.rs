use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cargo_bin() -> Command { Command::cargo_bin("rlebf").unwrap() }

fn script_file(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn test_script_file_runs() {
    let tf = script_file("++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .success()
        .stdout("Hello")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_script_file_reads_input_from_stdin() {
    let tf = script_file(",.");
    cargo_bin()
        .arg(tf.path())
        .write_stdin("A")
        .assert()
        .success()
        .stdout("A");
}

#[test]
fn test_echo_until_input_runs_out() {
    // `,[.,]` echoes every character, then fails once stdin is exhausted.
    let tf = script_file(",[.,]");
    cargo_bin()
        .arg(tf.path())
        .write_stdin("héllo")
        .assert()
        .code(1)
        .stdout("héllo")
        .stderr(predicate::str::contains("Execution failed: Input error."));
}

#[test]
fn test_tape_size_flag_wraps_pointer() {
    // With four cells, four moves right land back on the first cell.
    let tf = script_file("+++++>>>>.");
    cargo_bin()
        .args(["--tape-size", "4"])
        .arg(tf.path())
        .assert()
        .success()
        .stdout("\u{5}");
}

#[test]
fn test_tape_size_from_env() {
    let tf = script_file("+++++>>>>.");
    cargo_bin()
        .env("RLEBF_TAPE_SIZE", "4")
        .arg(tf.path())
        .assert()
        .success()
        .stdout("\u{5}");
}

#[test]
fn test_tape_size_from_config_file() {
    let home = tempfile::tempdir().expect("tempdir");
    let config_home = home.path().join(".config");
    std::fs::create_dir_all(&config_home).expect("config dir");
    std::fs::write(config_home.join("rlebf.toml"), "[limits]\ntape_size = 4\n").expect("write config");

    let tf = script_file("+++++>>>>.");
    cargo_bin()
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", &config_home)
        .env_remove("RLEBF_TAPE_SIZE")
        .arg(tf.path())
        .assert()
        .success()
        .stdout("\u{5}");
}

#[test]
fn test_oversized_tape_size_is_a_diagnostic() {
    let tf = script_file("+.");
    cargo_bin()
        .env("RLEBF_TAPE_SIZE", "1000000000000")
        .arg(tf.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "Configuration failed: RLEBF_TAPE_SIZE is 1000000000000, the maximum is 67108864.",
        ));
}

#[test]
fn test_oversized_capacity_flag_is_a_diagnostic() {
    cargo_bin()
        .args(["--capacity", "67108865"])
        .write_stdin("+.")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration failed: --capacity is 67108865"));
}

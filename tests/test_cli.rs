//! Integration tests for the cmdblock binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn cmdblock() -> Command {
    let mut cmd = Command::cargo_bin("cmdblock").unwrap();
    // Keep a user config out of the way
    cmd.env_remove("CMDBLOCK_CONFIG");
    cmd.env("HOME", "/nonexistent");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_command_expression() {
    let config = config_file("");
    cmdblock()
        .arg("--config")
        .arg(config.path())
        .args(["-c", "2+3*4"])
        .assert()
        .success()
        .stdout("14\n");
}

#[test]
fn test_command_joins_words() {
    let config = config_file("");
    cmdblock()
        .arg("--config")
        .arg(config.path())
        .args(["-c", "hello", "world"])
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn test_command_sequence() {
    let config = config_file("");
    cmdblock()
        .arg("--config")
        .arg(config.path())
        .args(["-c", "A..E"])
        .assert()
        .success()
        .stdout("[\"A\", \"B\", \"C\", \"D\", \"E\"]\n");
}

#[test]
fn test_calcul_error_exit_code() {
    let config = config_file("");
    cmdblock()
        .arg("--config")
        .arg(config.path())
        .args(["-c", "1/0"])
        .assert()
        .failure()
        .code(1)
        .stdout("Calcul error: division by zero\n");
}

#[test]
fn test_failed_sequence_is_not_an_error() {
    let config = config_file("");
    cmdblock()
        .arg("--config")
        .arg(config.path())
        .args(["-c", "1..5..0"])
        .assert()
        .success()
        .stdout("(no result)\n")
        .stderr(predicate::str::contains("Step cannot be zero"));
}

#[test]
fn test_empty_command_warns() {
    let config = config_file("");
    cmdblock()
        .arg("--config")
        .arg(config.path())
        .args(["-c", ""])
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("warning: No instruction to execute"));
}

#[test]
fn test_json_output() {
    let config = config_file("");
    cmdblock()
        .arg("--config")
        .arg(config.path())
        .args(["--json", "-c", "sqrt(16)"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"integer\":4"))
        .stdout(predicate::str::contains("\"double\":4.0"))
        .stdout(predicate::str::contains("\"branch\":\"expression\""));
}

#[test]
fn test_json_from_config() {
    let config = config_file("json = true\n");
    cmdblock()
        .arg("--config")
        .arg(config.path())
        .args(["-c", "3|1|2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"list\":[1,2,3]"));
}

#[test]
fn test_seed_repeats() {
    let run = || {
        cmdblock()
            .args(["--seed", "17", "-c", "rand(1,1000000,5)"])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn test_seed_from_config() {
    let config = config_file("seed = 17\n");
    let from_config = cmdblock()
        .arg("--config")
        .arg(config.path())
        .args(["-c", "rand(1,1000000,5)"])
        .output()
        .unwrap()
        .stdout;
    let from_flag = cmdblock()
        .args(["--seed", "17", "-c", "rand(1,1000000,5)"])
        .output()
        .unwrap()
        .stdout;
    assert_eq!(from_config, from_flag);
}

#[test]
fn test_malformed_config_falls_back() {
    let config = config_file("seed = \"oops\"\n");
    cmdblock()
        .arg("--config")
        .arg(config.path())
        .args(["-c", "1+1"])
        .assert()
        .success()
        .stdout("2\n")
        .stderr(predicate::str::contains("Config error"));
}

#[test]
fn test_script_file() {
    let config = config_file("");
    let script = config_file("# comment\n\n1+1\nA..C\n   \nhello\n");
    cmdblock()
        .arg("--config")
        .arg(config.path())
        .arg(script.path())
        .assert()
        .success()
        .stdout("2\n[\"A\", \"B\", \"C\"]\nhello\n");
}

#[test]
fn test_script_exit_code_follows_last_line() {
    let config = config_file("");
    let script = config_file("1/0\n2+2\n");
    cmdblock()
        .arg("--config")
        .arg(config.path())
        .arg(script.path())
        .assert()
        .success();

    let script = config_file("2+2\nrand(1,2,3)\n");
    cmdblock()
        .arg("--config")
        .arg(config.path())
        .arg(script.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Random error: Count too large for unique integers in range",
        ));
}

#[test]
fn test_deeply_nested_script_line() {
    let config = config_file("");
    let line = format!("{}1+1{}\n2+2\n", "(".repeat(50_000), ")".repeat(50_000));
    let script = config_file(&line);
    cmdblock()
        .arg("--config")
        .arg(config.path())
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Calcul error: Syntax error: expression too deeply nested"))
        .stdout(predicate::str::ends_with("4\n"));
}

#[test]
fn test_missing_script() {
    cmdblock()
        .arg("/nonexistent/script.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error reading"));
}

#[test]
fn test_bad_flag() {
    cmdblock()
        .arg("--nope")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown option"));
}

#[test]
fn test_help() {
    cmdblock()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("randf(min,max,count[,p])"));
}

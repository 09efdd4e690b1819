//! Testes de integração para a CLI do tagcache.

use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binário rodando num diretório vazio, sem `tagcache.toml`.
fn tagcache_bin(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tagcache").expect("binary not built");
    cmd.current_dir(dir.path());
    cmd
}

fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[test]
fn test_version_command() {
    let dir = temp_dir();
    tagcache_bin(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tagcache"));
}

#[test]
fn test_help_command() {
    let dir = temp_dir();
    let output = tagcache_bin(&dir)
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("init"));
    assert!(stdout.contains("config"));
    assert!(stdout.contains("show"));
    assert!(stdout.contains("render"));
    assert!(stdout.contains("simulate"));
}

#[test]
fn test_init_creates_config() {
    use std::fs;

    let dir = temp_dir();
    let target = dir.path().join("project");
    let config_path = target.join("tagcache.toml");

    tagcache_bin(&dir)
        .arg("init")
        .arg("--path")
        .arg(&target)
        .assert()
        .success();

    assert!(config_path.exists(), "Config file was not created");

    let content = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("[general]"));
    assert!(content.contains("[cache]"));
    assert!(content.contains("capacity = 100"));

    // Segunda execução não sobrescreve.
    tagcache_bin(&dir)
        .arg("init")
        .arg("--path")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_show_uses_config_file() {
    use std::fs;

    let dir = temp_dir();
    let config_path = dir.path().join("custom.toml");
    fs::write(&config_path, "[cache]\ncapacity = 7\nscheduler = \"inline\"\n")
        .expect("Failed to write config");

    tagcache_bin(&dir)
        .arg("--config")
        .arg(&config_path)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("capacity = 7"))
        .stdout(predicate::str::contains("scheduler = \"inline\""));
}

#[test]
fn test_show_defaults_without_file() {
    let dir = temp_dir();
    tagcache_bin(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("capacity = 100"))
        .stdout(predicate::str::contains("scheduler = \"tokio\""));
}

#[test]
fn test_render_class_tag() {
    let dir = temp_dir();
    tagcache_bin(&dir)
        .args(["render", "--classes", "btn,primary", "-t", "primary", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"<span class="primary">hello</span>"#));
}

#[test]
fn test_render_default_element() {
    let dir = temp_dir();
    tagcache_bin(&dir)
        .args(["render", "-t", "li", "item"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<li>item</li>"));
}

#[test]
fn test_render_unknown_tag_without_defaults() {
    let dir = temp_dir();
    tagcache_bin(&dir)
        .args(["render", "--classes", "btn", "--no-defaults", "-t", "li", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("li"));
}

#[test]
fn test_simulate_json() {
    let dir = temp_dir();
    let output = tagcache_bin(&dir)
        .args([
            "simulate",
            "--keys",
            "100",
            "--hot",
            "10",
            "--shrink-to",
            "20",
            "--json",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
    assert_eq!(report["size_after_load"], 100);
    assert_eq!(report["size_before_reduction"], 100);
    assert_eq!(report["size_after_reduction"], 10);
    assert_eq!(report["stats"][1]["label"], "classes");
}

#[test]
fn test_simulate_text() {
    let dir = temp_dir();
    tagcache_bin(&dir)
        .args(["-q", "simulate", "--keys", "50", "--hot", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("classes"));
}

#[test]
fn test_invalid_command() {
    let dir = temp_dir();
    tagcache_bin(&dir)
        .arg("invalid-command-that-does-not-exist")
        .assert()
        .failure();
}

#[test]
fn test_verbose_flag() {
    let dir = temp_dir();
    tagcache_bin(&dir).arg("-v").arg("version").assert().success();
}

#[test]
fn test_quiet_flag() {
    let dir = temp_dir();
    tagcache_bin(&dir).arg("-q").arg("version").assert().success();
}

#[test]
fn test_invalid_config_falls_back_to_defaults() {
    use std::fs;

    let dir = temp_dir();
    let config_path = dir.path().join("broken.toml");
    fs::write(&config_path, "[cache]\ncapacity = -1\n").expect("Failed to write config");

    tagcache_bin(&dir)
        .arg("--config")
        .arg(&config_path)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("capacity = 100"))
        .stderr(predicate::str::contains("Aviso"));
}

#[test]
fn test_invalid_log_format_falls_back_to_defaults() {
    use std::fs;

    let dir = temp_dir();
    let config_path = dir.path().join("tagcache.toml");
    fs::write(&config_path, "[general]\nlog_format = \"xml\"\n[cache]\ncapacity = 7\n")
        .expect("Failed to write config");

    tagcache_bin(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("capacity = 100"))
        .stderr(predicate::str::contains("xml"));
}

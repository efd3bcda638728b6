//! Integration tests for `hd config show` and `hd config set`.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_show_defaults() {
    let env = TestEnv::new();
    let value = env.json(&["config", "show"]);
    let values = &value["values"];

    assert_eq!(values["api_base"]["value"], "https://api.github.com");
    assert_eq!(values["api_base"]["source"], "default");
    assert_eq!(values["cache_name"]["value"], "hubdeck-v1");
    assert_eq!(values["default_priority"]["value"], "medium");
    assert_eq!(values["offline_fallback"]["value"], "/index.html");
    assert_eq!(values["manifest"]["value"].as_array().unwrap().len(), 7);
    assert_eq!(value["build"]["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_set_then_show_reports_file_source() {
    let env = TestEnv::new();

    let set = env.json(&["config", "set", "search-debounce-ms", "500"]);
    assert_eq!(set["key"], "search-debounce-ms");

    let value = env.json(&["config", "show"]);
    assert_eq!(value["values"]["search_debounce_ms"]["value"], 500);
    assert_eq!(value["values"]["search_debounce_ms"]["source"], "file");

    let written = std::fs::read_to_string(env.config_path().join("config.kdl")).unwrap();
    assert!(written.contains("search-debounce-ms 500"));
}

#[test]
fn test_set_unknown_key_fails() {
    let env = TestEnv::new();
    env.hd()
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown key colour"));
}

#[test]
fn test_set_invalid_value_fails() {
    let env = TestEnv::new();
    env.hd()
        .args(["config", "set", "default-priority", "urgent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_environment_overrides_file() {
    let env = TestEnv::new();
    env.write_config("api-base \"https://ghe.example.com/api/v3\"\n");

    let from_file = env.json(&["config", "show"]);
    assert_eq!(from_file["values"]["api_base"]["source"], "file");

    let output = env
        .hd()
        .args(["config", "show"])
        .env("HD_API_BASE", "http://127.0.0.1:9")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let from_env: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(from_env["values"]["api_base"]["value"], "http://127.0.0.1:9");
    assert_eq!(from_env["values"]["api_base"]["source"], "env:HD_API_BASE");
}

#[test]
fn test_cli_flag_overrides_environment() {
    let env = TestEnv::new();
    let output = env
        .hd()
        .args(["--api-base", "http://localhost:1", "config", "show"])
        .env("HD_API_BASE", "http://127.0.0.1:9")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["values"]["api_base"]["value"], "http://localhost:1");
    assert_eq!(value["values"]["api_base"]["source"], "cli");
}

#[test]
fn test_show_human() {
    let env = TestEnv::new();
    env.hd()
        .args(["-H", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cache-name"))
        .stdout(predicate::str::contains("hubdeck-v1 (default)"));
}

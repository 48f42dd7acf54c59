use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn run(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_agentflux"))
        .args(args)
        .env("HOME", home)
        .output()
        .expect("run binary")
}

fn stdout_of(home: &Path, args: &[&str]) -> String {
    let output = run(home, args);
    assert!(
        output.status.success(),
        "args: {args:?}\nstderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

#[test]
fn settings_show_lists_defaults_for_a_fresh_home() {
    let dir = tempdir().expect("tempdir");
    let shown = stdout_of(dir.path(), &["settings", "show"]);
    assert!(shown.lines().any(|l| l == "chat_model_provider=OPENAI"));
    assert!(shown.lines().any(|l| l == "util_model_rl_requests=60"));
    assert!(dir.path().join(".agentflux/logs").is_dir());
}

#[test]
fn settings_set_persists_and_reports_propagation() {
    let dir = tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join(".agentflux")).expect("state dir");
    fs::write(
        dir.path().join(".agentflux/config.yaml"),
        "contexts:\n  - id: main\n    subordinates: 1\n",
    )
    .expect("write config");

    let out = stdout_of(dir.path(), &["settings", "set", "chat_model_name", "gpt-4.1"]);
    assert_eq!(out, "revision=1\nworkers_updated=2");
    assert_eq!(
        stdout_of(dir.path(), &["settings", "get", "chat_model_name"]),
        "gpt-4.1"
    );

    let status = stdout_of(dir.path(), &["status"]);
    assert!(status.contains("context.main=main-agent0@0 -> main-agent1@0"), "{status}");
}

#[test]
fn credentials_go_to_the_vault_and_are_masked() {
    let dir = tempdir().expect("tempdir");
    stdout_of(dir.path(), &["settings", "set", "api_key_openai", "sk-cli"]);

    let vault = fs::read_to_string(dir.path().join(".agentflux/.env")).expect("vault");
    assert_eq!(vault, "API_KEY_OPENAI=sk-cli\n");
    let durable = fs::read_to_string(dir.path().join(".agentflux/settings.json")).expect("settings");
    assert!(!durable.contains("sk-cli"));
    assert_eq!(
        stdout_of(dir.path(), &["settings", "get", "api_keys"]),
        "openai:********"
    );
}

#[test]
fn apply_reads_an_edited_form_file() {
    let dir = tempdir().expect("tempdir");
    let form = stdout_of(dir.path(), &["settings", "form"]);
    let mut payload: serde_json::Value = serde_json::from_str(&form).expect("form json");
    for section in payload["sections"].as_array_mut().expect("sections") {
        for field in section["fields"].as_array_mut().expect("fields") {
            if field["id"] == "embed_model_kwargs" {
                field["value"] = serde_json::json!("dimensions=256");
            }
        }
    }
    let path = dir.path().join("form.json");
    fs::write(&path, payload.to_string()).expect("write form");

    stdout_of(dir.path(), &["settings", "apply", path.to_str().expect("utf-8 path")]);
    assert_eq!(
        stdout_of(dir.path(), &["settings", "get", "embed_model_kwargs"]),
        r#"{"dimensions":"256"}"#
    );
}

#[test]
fn vault_commands_and_bad_input_report_errors() {
    let dir = tempdir().expect("tempdir");
    stdout_of(dir.path(), &["vault", "set", "AUTH_LOGIN", "alice"]);
    assert_eq!(
        stdout_of(dir.path(), &["settings", "get", "auth_login"]),
        "alice"
    );
    stdout_of(dir.path(), &["vault", "unset", "AUTH_LOGIN"]);
    assert_eq!(
        fs::read_to_string(dir.path().join(".agentflux/.env")).expect("vault"),
        ""
    );

    let bad = run(dir.path(), &["settings", "set", "chat_model_temperature", "abc"]);
    assert!(!bad.status.success());
    assert!(String::from_utf8_lossy(&bad.stderr).contains("invalid float value"));

    let unknown = run(dir.path(), &["launch"]);
    assert!(!unknown.status.success());
    assert!(String::from_utf8_lossy(&unknown.stderr).contains("unknown command `launch`"));
}

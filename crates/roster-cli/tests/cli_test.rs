//! End-to-end tests for the `roster` binary.
//!
//! Each test runs the real executable against its own temporary data and
//! config directories. Generation uses `--offline`, so no network or API key
//! is needed.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn data_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("data")
    }

    fn run(&self, args: &[&str]) -> Output {
        self.run_with_env(args, &[])
    }

    fn run_with_env(&self, args: &[&str], vars: &[(&str, &str)]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_roster"))
            .arg("--data-dir")
            .arg(self.data_dir())
            .args(args)
            .current_dir(self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env_remove("ROSTER_API_KEY")
            .env_remove("GEMINI_API_KEY")
            .env_remove("ROSTER_DATA_DIR")
            .env_remove("ROSTER_GEMINI_URL")
            .env("RUST_LOG", "warn")
            .envs(vars.iter().copied())
            .output()
            .expect("failed to run roster binary")
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let out = self.run(args);
        assert!(
            out.status.success(),
            "roster {args:?} failed:\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr)
        );
        String::from_utf8_lossy(&out.stdout).into_owned()
    }

    fn generate(&self) -> String {
        self.run_ok(&["generate", "--offline", "--start-date", "2026-10-19"])
    }

    fn generate_expect_failure(&self) -> Output {
        let out = self.run(&["generate", "--offline"]);
        assert!(!out.status.success());
        out
    }
}

/// Serve exactly one HTTP request with a 200 reply carrying `body`, and
/// return the base URL to reach it.
fn serve_once(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (stream, _) = listener.accept().expect("no request arrived");
        let mut reader = BufReader::new(stream);
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                break;
            }
            let lower = line.to_ascii_lowercase();
            if let Some(value) = lower.strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
        let mut request_body = vec![0u8; content_length];
        let _ = reader.read_exact(&mut request_body);

        let mut stream = reader.into_inner();
        let reply = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(reply.as_bytes());
    });
    format!("http://{addr}/v1beta")
}

fn read_json(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&text).expect("record should be JSON")
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[test]
fn starter_add_list_remove_persists() {
    let env = Env::new();

    let out = env.run_ok(&["starter", "add", "Grace Hopper", "--role", "Analyst"]);
    assert!(out.contains("Added starter Grace Hopper (Analyst)"));

    let starters = read_json(&env.data_dir().join("starters.json"));
    assert_eq!(starters.as_array().unwrap().len(), 3);

    let list = env.run_ok(&["starter", "list"]);
    assert!(list.contains("John Doe"));
    assert!(list.contains("Grace Hopper"));

    env.run_ok(&["starter", "remove", "Grace Hopper"]);
    let list = env.run_ok(&["starter", "list"]);
    assert!(!list.contains("Grace Hopper"));
}

#[test]
fn mentor_expertise_is_split_and_trimmed() {
    let env = Env::new();
    env.run_ok(&["mentor", "add", "Ada", "--expertise", " Math , Engines,, "]);

    let mentors = read_json(&env.data_dir().join("mentors.json"));
    let ada = mentors
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["name"] == "Ada")
        .expect("Ada should be stored");
    assert_eq!(ada["expertise"], serde_json::json!(["Math", "Engines"]));
}

#[test]
fn generate_with_empty_collection_fails_before_calling_generator() {
    let env = Env::new();
    env.run_ok(&["module", "clear", "--yes"]);

    let out = env.generate_expect_failure();
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("module"), "stderr: {stderr}");
    assert!(!env.data_dir().join("schedule.json").exists());
}

#[test]
fn generate_without_api_key_reports_missing_key() {
    let env = Env::new();
    let out = env.run(&["generate"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("API key not found"), "stderr: {stderr}");
}

#[test]
fn generation_failures_look_the_same_to_the_user() {
    let env = Env::new();
    let generate = ["generate", "--api-key", "test-key", "--start-date", "2026-10-19"];

    let unreachable = env.run_with_env(
        &generate,
        &[("ROSTER_GEMINI_URL", "http://127.0.0.1:1/v1beta"), ("RUST_LOG", "off")],
    );
    let bad_reply_url =
        serve_once(r#"{"candidates":[{"content":{"parts":[{"text":"not json"}]}}]}"#);
    let bad_reply = env.run_with_env(
        &generate,
        &[("ROSTER_GEMINI_URL", bad_reply_url.as_str()), ("RUST_LOG", "off")],
    );

    assert!(!unreachable.status.success());
    assert!(!bad_reply.status.success());
    let unreachable_err = String::from_utf8_lossy(&unreachable.stderr);
    let bad_reply_err = String::from_utf8_lossy(&bad_reply.stderr);
    assert_eq!(unreachable_err, bad_reply_err);
    assert!(unreachable_err.contains("Failed to generate roster"), "stderr: {unreachable_err}");
    assert!(!unreachable_err.contains("Caused by"), "stderr: {unreachable_err}");
    assert!(!env.data_dir().join("schedule.json").exists());
}

#[test]
fn offline_generate_then_show_filter_and_export() {
    let env = Env::new();
    let out = env.generate();
    assert!(out.contains("Generated 8 session(s)"));
    assert!(out.contains("Generated Schedule (8 Sessions)"));

    let schedule = read_json(&env.data_dir().join("schedule.json"));
    let items = schedule.as_array().unwrap();
    assert_eq!(items.len(), 8);
    assert!(items.iter().all(|s| s["id"].as_str().unwrap().starts_with("sched-")));

    let shown = env.run_ok(&["show", "--starter", "John Doe"]);
    assert!(shown.contains("4 of 8 session(s) shown (trainee: John Doe)"));
    assert!(!shown.contains("Sarah Connor"));

    let missing = env.run_ok(&["show", "--mentor", "Nobody"]);
    assert!(missing.contains("No sessions for mentor: Nobody."));
    assert!(missing.contains("Known mentors:"));

    env.run_ok(&["export"]);
    let csv = std::fs::read_to_string(env.dir.path().join("training_roster.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Day,Time,Trainee,Mentor,Module,Location"));
    assert_eq!(lines.count(), 8);
}

#[test]
fn export_on_empty_schedule_writes_nothing() {
    let env = Env::new();
    let out = env.run_ok(&["export"]);
    assert!(out.contains("nothing to export"));
    assert!(!env.dir.path().join("training_roster.csv").exists());
}

#[test]
fn edit_and_delete_by_id_prefix() {
    let env = Env::new();
    env.generate();

    let schedule = read_json(&env.data_dir().join("schedule.json"));
    let first_id = schedule[0]["id"].as_str().unwrap().to_owned();
    let second_id = schedule[1]["id"].as_str().unwrap().to_owned();

    env.run_ok(&["edit", &first_id[..12], "--location", "Room 7", "--time", "08:00 - 09:00"]);
    let schedule = read_json(&env.data_dir().join("schedule.json"));
    assert_eq!(schedule[0]["location"], "Room 7");
    assert_eq!(schedule[0]["time"], "08:00 - 09:00");
    assert_eq!(schedule[0]["day"], "Monday");
    assert_eq!(schedule[0]["id"], first_id.as_str());

    env.run_ok(&["delete", &second_id, "--yes"]);
    let schedule = read_json(&env.data_dir().join("schedule.json"));
    let ids: Vec<&str> = schedule
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 7);
    assert!(!ids.contains(&second_id.as_str()));
}

#[test]
fn edit_unknown_session_is_not_found() {
    let env = Env::new();
    env.generate();
    let out = env.run(&["edit", "nope", "--day", "Friday"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("not found"));
}

#[test]
fn reset_restores_defaults_and_clears_schedule() {
    let env = Env::new();
    env.run_ok(&["starter", "clear", "--yes"]);
    env.generate_expect_failure();

    env.run_ok(&["starter", "add", "Solo"]);
    env.generate();
    env.run_ok(&["reset", "--yes"]);

    assert!(!env.data_dir().join("schedule.json").exists());
    let list = env.run_ok(&["starter", "list"]);
    assert!(list.contains("John Doe"));
    assert!(list.contains("Sarah Connor"));
    let shown = env.run_ok(&["show"]);
    assert!(shown.contains("No schedule generated"));
}

#[test]
fn reset_without_confirmation_is_aborted() {
    let env = Env::new();
    env.generate();
    // stdin is empty, which counts as "no".
    let out = env.run_ok(&["reset"]);
    assert!(out.contains("Aborted."));
    assert!(env.data_dir().join("schedule.json").exists());
}

#[test]
fn print_text_and_html() {
    let env = Env::new();
    env.generate();

    let text = env.run_ok(&["print", "--mentor", "Tech Lead Mike"]);
    assert!(text.contains("Showing mentor: Tech Lead Mike"));
    assert!(text.contains("MONDAY"));

    let html_path = env.dir.path().join("roster.html");
    env.run_ok(&["print", "--html", "--output", html_path.to_str().unwrap()]);
    let html = std::fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("8 Sessions"));
    assert!(!html.contains("<input"));
}

#[test]
fn init_writes_config_with_masked_output() {
    let env = Env::new();
    let out = env.run_ok(&["init", "--api-key", "AIzaSyTestKey1234", "--model", "gemini-2.5-pro"]);
    assert!(out.contains("AIza...1234"));
    assert!(!out.contains("AIzaSyTestKey1234"));

    let config_path = env.dir.path().join("config").join("roster").join("config.toml");
    let text = std::fs::read_to_string(&config_path).unwrap();
    assert!(text.contains("api_key = \"AIzaSyTestKey1234\""));
    assert!(text.contains("model = \"gemini-2.5-pro\""));

    let again = env.run(&["init", "--api-key", "x"]);
    assert!(!again.status.success());
    assert!(String::from_utf8_lossy(&again.stderr).contains("--force"));
}

use assert_cmd::cargo::CommandCargoExt;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command};
use std::thread;
use std::time::Duration;
use tempfile::{tempdir, TempDir};

struct TestDaemon {
    base_url: String,
    child: Child,
    _store_dir: TempDir,
}

impl TestDaemon {
    fn spawn() -> Self {
        // Bind an ephemeral port first so we know which port to pass
        // to the CLI `stringstore serve` subcommand.
        let listener =
            TcpListener::bind("127.0.0.1:0").expect("bind ephemeral TCP listener for daemon");
        let addr = listener
            .local_addr()
            .expect("local_addr for daemon listener");
        let port = addr.port();
        drop(listener);

        let addr_arg = format!("127.0.0.1:{port}");
        let base_url = format!("http://{addr_arg}");

        let store_dir = tempdir().expect("tempdir for daemon store");
        let store_path = store_dir.path().join("strings.json");

        // Capture daemon stdout/stderr to temp files for easier
        // debugging when tests fail.
        let log_dir = std::env::temp_dir();
        let stdout_path = log_dir.join(format!("stringstore_daemon_{port}_stdout.log"));
        let stderr_path = log_dir.join(format!("stringstore_daemon_{port}_stderr.log"));

        let stdout_file =
            std::fs::File::create(&stdout_path).expect("create daemon stdout log file");
        let stderr_file =
            std::fs::File::create(&stderr_path).expect("create daemon stderr log file");

        let mut cmd = Command::cargo_bin("stringstore").expect("locate stringstore binary");
        cmd.args([
            "serve",
            "--addr",
            &addr_arg,
            "--backend",
            "flat",
            "--store-path",
        ])
        .arg(&store_path)
        .stdout(stdout_file)
        .stderr(stderr_file);
        let child = cmd.spawn().expect("spawn stringstore serve daemon");

        wait_for_health(&base_url);

        Self {
            base_url,
            child,
            _store_dir: store_dir,
        }
    }
}

impl Drop for TestDaemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn wait_for_health(base_url: &str) {
    let client = Client::new();
    let url = format!("{}/v1/health", base_url);

    let mut last_err = None;
    for _ in 0..150 {
        match client.get(&url).send() {
            Ok(resp) if resp.status().is_success() => return,
            Err(e) => {
                last_err = Some(format!("HTTP error: {}", e));
                thread::sleep(Duration::from_millis(100));
            }
            Ok(resp) => {
                last_err = Some(format!("unexpected status: {}", resp.status()));
                thread::sleep(Duration::from_millis(100));
            }
        }
    }

    panic!(
        "stringstore HTTP daemon did not become healthy in time. Last error: {}",
        last_err.unwrap_or_else(|| "unknown".to_string())
    );
}

#[test]
fn daemon_serves_the_full_resource_lifecycle() {
    let daemon = TestDaemon::spawn();
    let client = Client::new();

    // Create.
    let response = client
        .post(format!("{}/v1/strings", daemon.base_url))
        .json(&json!({ "value": "racecar" }))
        .send()
        .expect("create request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let record: Value = response.json().expect("record payload");
    assert_eq!(record["value"], "racecar");
    assert_eq!(record["properties"]["is_palindrome"], true);
    assert_eq!(record["id"], record["properties"]["hash"]);

    // Duplicate create conflicts.
    let response = client
        .post(format!("{}/v1/strings", daemon.base_url))
        .json(&json!({ "value": "racecar" }))
        .send()
        .expect("duplicate create request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = response.json().expect("error payload");
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("already exists"));

    // Fetch by value.
    let response = client
        .get(format!("{}/v1/strings/racecar", daemon.base_url))
        .send()
        .expect("get request");
    assert_eq!(response.status(), StatusCode::OK);

    // Delete, then the record is gone.
    let response = client
        .delete(format!("{}/v1/strings/racecar", daemon.base_url))
        .send()
        .expect("delete request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/v1/strings/racecar", daemon.base_url))
        .send()
        .expect("get request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn daemon_lists_with_lenient_query_parameters() {
    let daemon = TestDaemon::spawn();
    let client = Client::new();

    for value in ["racecar", "hello world", "level"] {
        let response = client
            .post(format!("{}/v1/strings", daemon.base_url))
            .json(&json!({ "value": value }))
            .send()
            .expect("create request");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = client
        .get(format!(
            "{}/v1/strings?is_palindrome=true&min_length=6",
            daemon.base_url
        ))
        .send()
        .expect("list request");
    assert_eq!(response.status(), StatusCode::OK);

    let listed: Value = response.json().expect("list payload");
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["records"][0]["value"], "racecar");

    // Unparseable numeric constraints restrict nothing.
    let response = client
        .get(format!(
            "{}/v1/strings?word_count=abc&max_length=oops",
            daemon.base_url
        ))
        .send()
        .expect("list request");
    assert_eq!(response.status(), StatusCode::OK);

    let listed: Value = response.json().expect("list payload");
    assert_eq!(listed["count"], 3);
}

#[test]
fn daemon_searches_with_natural_language() {
    let daemon = TestDaemon::spawn();
    let client = Client::new();

    for value in ["racecar", "hello world", "banana"] {
        client
            .post(format!("{}/v1/strings", daemon.base_url))
            .json(&json!({ "value": value }))
            .send()
            .expect("create request");
    }

    let response = client
        .get(format!(
            "{}/v1/strings/search?q=all+single+word+palindromic+strings",
            daemon.base_url
        ))
        .send()
        .expect("search request");
    assert_eq!(response.status(), StatusCode::OK);

    let result: Value = response.json().expect("search payload");
    assert_eq!(result["filter"]["is_palindrome"], "true");
    assert_eq!(result["filter"]["word_count"], "1");
    assert_eq!(result["count"], 1);
    assert_eq!(result["records"][0]["value"], "racecar");

    // Text with no recognizable cue is an extraction failure.
    let response = client
        .get(format!("{}/v1/strings/search?q=banana", daemon.base_url))
        .send()
        .expect("search request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn cli_delegates_to_daemon_via_server_flag() {
    let daemon = TestDaemon::spawn();

    let mut cmd = Command::cargo_bin("stringstore").expect("locate stringstore binary");
    let output = cmd
        .args(["add", "racecar", "--server", &daemon.base_url])
        .output()
        .expect("run add via server");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let mut cmd = Command::cargo_bin("stringstore").expect("locate stringstore binary");
    let output = cmd
        .args([
            "list",
            "--server",
            &daemon.base_url,
            "--format",
            "json",
        ])
        .output()
        .expect("run list via server");
    assert!(output.status.success());

    let listed: Value = serde_json::from_slice(&output.stdout).expect("parse list JSON");
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["records"][0]["value"], "racecar");

    // Conflicts surface through the CLI as failures with the server's
    // error message.
    let mut cmd = Command::cargo_bin("stringstore").expect("locate stringstore binary");
    let output = cmd
        .args(["add", "racecar", "--server", &daemon.base_url])
        .output()
        .expect("run duplicate add via server");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));
}

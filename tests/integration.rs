//! End-to-end tests for the query runner binary
//!
//! These tests start mock pet services, write a config file and a command
//! file into a temporary directory, run `query-runner` there and compare
//! the transcript it writes.

mod common;

use common::{closed_url, MockResponse, MockService};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Test context with a working directory and config home
struct TestContext {
    dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("config/pet-query-runner"))
            .expect("Failed to create config dir");
        Self { dir }
    }

    fn work_dir(&self) -> &Path {
        self.dir.path()
    }

    fn config_home(&self) -> PathBuf {
        self.dir.path().join("config")
    }

    /// Create a config file pointing at the given services
    fn create_config(&self, store_1: &str, store_2: &str, orders: &str, seed: bool) {
        let config_content = format!(
            r#"
[services]
store_1_url = "{store_1}"
store_2_url = "{store_2}"
order_url = "{orders}"

[timeouts]
request_secs = 2
probe_secs = 1
seed_request_secs = 2

[readiness]
max_attempts = 3
interval_ms = 20
settle_ms = 0

[seed]
enabled = {seed}
settle_ms = 0
"#
        );
        fs::write(
            self.config_home().join("pet-query-runner/config.toml"),
            config_content,
        )
        .expect("Failed to write config");
    }

    fn write_commands(&self, content: &str) {
        fs::write(self.work_dir().join("query.txt"), content).expect("Failed to write query.txt");
    }

    fn transcript(&self) -> Option<String> {
        fs::read_to_string(self.work_dir().join("response.txt")).ok()
    }

    /// Run the binary and wait for it to exit
    async fn run(&self) -> RunnerOutput {
        let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_query-runner"))
            .current_dir(self.work_dir())
            .env("XDG_CONFIG_HOME", self.config_home())
            .env("RUST_LOG", "pet_query=debug")
            .output()
            .await
            .expect("Failed to run query-runner");

        RunnerOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            code: output.status.code(),
        }
    }
}

struct RunnerOutput {
    stdout: String,
    stderr: String,
    code: Option<i32>,
}

/// A pet store that is healthy, accepts population and answers one query
async fn pet_store() -> MockService {
    let next_id = Arc::new(AtomicUsize::new(1));
    MockService::start(move |request| match (request.method.as_str(), request.path()) {
        ("GET", "/") => MockResponse::text(200, "Initial connection"),
        ("POST", "/pet-types") => {
            let id = next_id.fetch_add(1, Ordering::SeqCst);
            MockResponse::json(201, json!({"id": id.to_string(), "type": request.json()["type"]}))
        }
        ("POST", _) => MockResponse::json(201, request.json()),
        ("GET", "/pet-types") if request.query() == Some("type=Golden+Retriever") => {
            MockResponse::json(
                200,
                json!([{"id": "1", "type": "Golden Retriever", "family": "Canidae", "pets": ["Lander", "Lanky"]}]),
            )
        }
        ("GET", "/pet-types") => MockResponse::json(200, json!([])),
        _ => MockResponse::json(404, json!({"error": "Not found"})),
    })
    .await
}

/// An order service that only has bulldogs
async fn order_service() -> MockService {
    MockService::start(|request| {
        let body = request.json();
        if body["pet-type"] == json!("bulldog") {
            MockResponse::json(
                201,
                json!({
                    "purchase-id": "p-1",
                    "purchaser": body["purchaser"],
                    "pet-type": "bulldog",
                    "pet-name": "Lazy",
                    "store": 2
                }),
            )
        } else {
            MockResponse::json(400, json!({"error": "No pet of this type is available"}))
        }
    })
    .await
}

#[tokio::test]
async fn test_full_run_writes_transcript_in_command_order() {
    let store_1 = pet_store().await;
    let store_2 = pet_store().await;
    let orders = order_service().await;

    let ctx = TestContext::new();
    ctx.create_config(&store_1.url(), &store_2.url(), &orders.url(), true);
    ctx.write_commands(
        r#"query: 1,type=Golden Retriever;
purchase: {"purchaser": "Ann", "pet-type": "bulldog"};
query: x,type=bulldog;
purchase: {"purchaser": "Bo", "pet-type": "unicorn"};
query: 2,type=bulldog;
"#,
    );

    let output = ctx.run().await;
    assert_eq!(
        output.code,
        Some(0),
        "stdout: {}\nstderr: {}",
        output.stdout,
        output.stderr
    );

    let expected = r#"200
[
  {
    "id": "1",
    "type": "Golden Retriever",
    "family": "Canidae",
    "pets": [
      "Lander",
      "Lanky"
    ]
  }
]
;

201
{
  "purchase-id": "p-1",
  "purchaser": "Ann",
  "pet-type": "bulldog",
  "pet-name": "Lazy",
  "store": 2
}
;

400
NONE
;

200
[]
;"#;
    assert_eq!(ctx.transcript().unwrap(), expected);

    // Population ran before any command
    assert_eq!(store_1.requests_to("POST", "/pet-types").len(), 3);
    assert_eq!(store_2.requests_to("POST", "/pet-types").len(), 3);
    let last_seed = store_1
        .requests()
        .iter()
        .rposition(|r| r.method == "POST")
        .unwrap();
    let first_query = store_1
        .requests()
        .iter()
        .position(|r| r.method == "GET" && r.path() == "/pet-types")
        .unwrap();
    assert!(last_seed < first_query);

    let purchasers: Vec<_> = orders
        .requests()
        .iter()
        .map(|r| r.json()["purchaser"].clone())
        .collect();
    assert_eq!(purchasers, [json!("Ann"), json!("Bo")]);

    assert!(output.stderr.contains("statement 3 (line 3)"));
}

#[tokio::test]
async fn test_unavailable_services_exit_non_zero() {
    let ctx = TestContext::new();
    ctx.create_config(&closed_url(), &closed_url(), &closed_url(), true);
    ctx.write_commands("query: 1,type=bulldog;");

    let output = ctx.run().await;

    assert_eq!(output.code, Some(1));
    assert!(output.stderr.contains("did not become ready"));
    assert!(ctx.transcript().is_none());
}

#[tokio::test]
async fn test_missing_command_file_writes_empty_transcript() {
    let store_1 = pet_store().await;
    let store_2 = pet_store().await;

    let ctx = TestContext::new();
    ctx.create_config(&store_1.url(), &store_2.url(), &closed_url(), false);

    let output = ctx.run().await;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert_eq!(ctx.transcript().unwrap(), "");
    assert!(store_1.requests_to("POST", "/pet-types").is_empty());
}

#[tokio::test]
async fn test_unreachable_order_service_does_not_stop_the_run() {
    let store_1 = pet_store().await;
    let store_2 = pet_store().await;

    let ctx = TestContext::new();
    ctx.create_config(&store_1.url(), &store_2.url(), &closed_url(), false);
    ctx.write_commands(
        "purchase: {\"purchaser\": \"Ann\", \"pet-type\": \"bulldog\"};\nquery: 3,type=bulldog;\nquery: 2,type=bulldog;",
    );

    let output = ctx.run().await;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert_eq!(
        ctx.transcript().unwrap(),
        "500\nNONE\n;\n\n500\nNONE\n;\n\n200\n[]\n;"
    );
    assert_eq!(store_2.requests_to("GET", "/pet-types").len(), 1);
}

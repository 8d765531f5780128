//! End-to-end tests for the memberboard command line

use camino::Utf8PathBuf;
use chrono::{TimeZone, Utc};
use memberboard_lib::Host;
use serde_json::{Value, json};
use std::io::Write;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test host that captures output to in-memory buffers
struct TestHost {
    output_buf: Vec<u8>,
    error_buf: Vec<u8>,
    exit_code: Option<i32>,
}

impl TestHost {
    const fn new() -> Self {
        Self {
            output_buf: Vec::new(),
            error_buf: Vec::new(),
            exit_code: None,
        }
    }

    fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).to_string()
    }

    fn error_str(&self) -> String {
        String::from_utf8_lossy(&self.error_buf).to_string()
    }
}

impl Host for TestHost {
    fn output(&mut self) -> impl Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl Write {
        &mut self.error_buf
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}

fn ts(year: i32, month: u32, day: u32) -> i64 {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap().timestamp()
}

fn plan() -> Value {
    json!({ "id": 100, "name": "Individual", "priceCents": 12000, "intervalUnit": "year", "intervalCount": 1 })
}

async fn memberful() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("members(first"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "members": {
                    "nodes": [
                        {
                            "id": 1,
                            "email": "ada@example.com",
                            "fullName": "Ada Lovelace",
                            "subscriptions": [
                                { "id": 11, "active": true, "autorenew": true, "createdAt": ts(2024, 1, 10), "plan": plan() }
                            ],
                            "orders": [
                                { "uuid": "o1", "totalCents": 12000, "createdAt": ts(2024, 1, 10), "status": "completed" }
                            ]
                        },
                        {
                            "id": 2,
                            "email": "linus@example.com",
                            "fullName": "Linus",
                            "subscriptions": [
                                { "id": 21, "active": false, "createdAt": ts(2023, 6, 1), "expiresAt": ts(2024, 6, 1), "plan": plan() }
                            ]
                        }
                    ],
                    "pageInfo": { "hasNextPage": false, "endCursor": null }
                }
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("activities(first"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "activities": {
                    "nodes": [
                        { "id": "a1", "type": "new_order", "createdAt": ts(2024, 1, 10), "member": { "id": 1, "fullName": "Ada Lovelace" }, "subscription": { "id": 11, "plan": plan() } },
                        { "id": "a2", "type": "subscription_deactivated", "createdAt": ts(2024, 6, 1), "member": { "id": 2, "fullName": "Linus" }, "subscription": { "id": 21, "plan": plan() } }
                    ],
                    "pageInfo": { "hasNextPage": false, "endCursor": null }
                }
            }
        })))
        .mount(&server)
        .await;

    server
}

struct Workspace {
    _dir: tempfile::TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        Self { _dir: dir, root }
    }

    fn path(&self, name: &str) -> String {
        self.root.join(name).to_string()
    }

    /// Write a default configuration and return its path
    async fn config(&self) -> String {
        let path = self.path("memberboard.toml");
        let mut host = TestHost::new();
        memberboard_lib::run(&mut host, ["memberboard", "init", path.as_str()]).await.unwrap();
        path
    }
}

fn data_args(server: &MockServer, ws: &Workspace, config: &str) -> Vec<String> {
    [
        "--organization",
        "made",
        "--api-key",
        "test-key",
        "--endpoint",
        server.uri().as_str(),
        "--config",
        config,
        "--cache-dir",
        ws.path("cache").as_str(),
        "--period",
        "all",
        "--color",
        "never",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn init_writes_config_and_refuses_to_overwrite() {
    let ws = Workspace::new();
    let path = ws.config().await;

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("page_size"));
    assert!(text.contains("[retry]"));

    let mut host = TestHost::new();
    let result = memberboard_lib::run(&mut host, ["memberboard", "init", path.as_str()]).await;
    assert!(result.is_err());

    let mut host = TestHost::new();
    memberboard_lib::run(&mut host, ["memberboard", "init", path.as_str(), "--force"]).await.unwrap();
    assert!(host.output_str().contains("Generated default configuration file"));
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn summary_prints_dashboard_to_console() {
    let server = memberful().await;
    let ws = Workspace::new();
    let config = ws.config().await;

    let mut args = vec!["memberboard".to_string(), "summary".to_string()];
    args.extend(data_args(&server, &ws, &config));

    let mut host = TestHost::new();
    memberboard_lib::run(&mut host, args).await.unwrap();

    let output = host.output_str();
    assert!(output.contains("made"), "output was: {output}");
    assert!(output.contains("Membership growth"));
    assert!(output.contains("MRR movement"));
    assert_eq!(host.exit_code, None);
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn summary_writes_json_file() {
    let server = memberful().await;
    let ws = Workspace::new();
    let config = ws.config().await;
    let json_path = ws.path("summary.json");

    let mut args = vec!["memberboard".to_string(), "summary".to_string()];
    args.extend(data_args(&server, &ws, &config));
    args.extend(["--json".to_string(), json_path.clone()]);

    let mut host = TestHost::new();
    memberboard_lib::run(&mut host, args).await.unwrap();

    assert!(host.output_buf.is_empty());
    assert!(host.error_str().contains("summary.json"));

    let summary: Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(summary["organization"], "made");
    assert_eq!(summary["headline"]["active_members"], 1);
    assert!((summary["headline"]["mrr"].as_f64().unwrap() - 10.0).abs() < 1e-9);
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn members_writes_csv_directory() {
    let server = memberful().await;
    let ws = Workspace::new();
    let config = ws.config().await;
    let csv_path = ws.path("members.csv");

    let mut args = vec!["memberboard".to_string(), "members".to_string()];
    args.extend(data_args(&server, &ws, &config));
    args.extend(["--csv".to_string(), csv_path.clone()]);

    let mut host = TestHost::new();
    memberboard_lib::run(&mut host, args).await.unwrap();

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("id,name,email,joined,plan,active,education,profile_url"));
    assert!(csv.contains("ada@example.com"));
    assert!(csv.contains("linus@example.com"));
    assert_eq!(csv.lines().count(), 3);
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn activities_writes_json_rows() {
    let server = memberful().await;
    let ws = Workspace::new();
    let config = ws.config().await;
    let json_path = ws.path("activities.json");

    let mut args = vec!["memberboard".to_string(), "activities".to_string()];
    args.extend(data_args(&server, &ws, &config));
    args.extend(["--json".to_string(), json_path.clone()]);

    let mut host = TestHost::new();
    memberboard_lib::run(&mut host, args).await.unwrap();

    let value: Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    let rows = value["activities"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn missing_organization_is_an_error() {
    let ws = Workspace::new();
    let config = ws.config().await;

    let mut host = TestHost::new();
    let result = memberboard_lib::run(&mut host, ["memberboard", "summary", "--api-key", "k", "--config", config.as_str()]).await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("organization"), "error was: {err}");
}

#[tokio::test]
async fn unknown_subcommand_exits_with_usage_error() {
    let mut host = TestHost::new();
    memberboard_lib::run(&mut host, ["memberboard", "frobnicate"]).await.unwrap();

    assert_eq!(host.exit_code, Some(2));
    assert!(host.error_str().contains("frobnicate"));
}

//! Integration tests for the `breachcheck` binary.
//!
//! These run the compiled binary against a loopback axum server standing in
//! for the breach API and the range service.

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// "password" hashes to 5BAA6 + this suffix.
const PASSWORD_SUFFIX: &str = "1E4C9B93F3F0682250B6CF8331B7EE68FD8";

async fn spawn_backend() -> String {
    let app = Router::new()
        .route(
            "/api/check-password",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "database unavailable"})),
                )
            }),
        )
        .route(
            "/range/:prefix",
            get(|| async { format!("{}:3861493\n", PASSWORD_SUFFIX) }),
        )
        .route(
            "/api/breach/:id",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"detail": "Breach not found"})),
                )
            }),
        );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Run the binary off the async runtime so the backend keeps serving.
async fn run_cli(args: Vec<String>, stdin: Option<&'static str>) -> Output {
    tokio::task::spawn_blocking(move || {
        let mut child = Command::new(env!("CARGO_BIN_EXE_breachcheck"))
            .args(&args)
            .env_remove("BREACHCHECK_API_URL")
            .env_remove("BREACHCHECK_RANGE_URL")
            .env_remove("BREACHCHECK_ORIGIN")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to start breachcheck");
        if let Some(input) = stdin {
            child
                .stdin
                .take()
                .unwrap()
                .write_all(input.as_bytes())
                .unwrap();
        } else {
            drop(child.stdin.take());
        }
        child.wait_with_output().unwrap()
    })
    .await
    .unwrap()
}

fn with_backend(base: &str, rest: &[&str]) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--api-url".into(),
        base.into(),
        "--range-url".into(),
        base.into(),
    ];
    args.extend(rest.iter().map(|s| s.to_string()));
    args
}

#[tokio::test(flavor = "multi_thread")]
async fn test_password_from_stdin_uses_fallback() {
    let base = spawn_backend().await;
    let output = run_cli(
        with_backend(&base, &["--json", "password", "--stdin"]),
        Some("password\n"),
    )
    .await;

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["pwned"], true);
    assert_eq!(result["occurrence_count"], 3_861_493);
    assert_eq!(result["source"], "range_fallback");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_error_exits_with_message() {
    let base = spawn_backend().await;
    let output = run_cli(with_backend(&base, &["breach", "Nope"]), None).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Breach not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_cache_status() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("offline.db");
    let output = run_cli(
        vec![
            "cache".into(),
            "status".into(),
            "--db".into(),
            db.display().to_string(),
        ],
        None,
    )
    .await;

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Offline cache is empty."
    );
}

use assert_cmd::prelude::*;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use predicates::prelude::*;
use serde_json::{json, Value};
use std::process::Command;

fn eduslide(base_url: &str, out: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("eduslide").expect("bin");
    cmd.env("RUST_LOG", "off")
        .env_remove("EDUSLIDE_API_BASE_URL")
        .env_remove("EDUSLIDE_API_CONTRACT")
        .env_remove("EDUSLIDE_OUTPUT_DIR")
        .args(["--base-url", base_url, "--out"])
        .arg(out);
    cmd
}

async fn two_slides() -> Json<Value> {
    Json(json!([
        {"title": "Tide basics", "content": ["moon"], "example": "harbour"},
        {"title": "Spring tides", "content": ["sun"], "example": "beach"},
    ]))
}

async fn export_fails() -> (StatusCode, Json<Value>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"detail": "renderer offline"})),
    )
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[test]
fn unreachable_backend_reports_on_stderr_and_fails() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let tmp = tempfile::tempdir().unwrap();

    eduslide(&format!("http://{}", addr), tmp.path())
        .args(["topic", "Tides"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Failed to generate slides"));
}

#[test]
fn blank_topic_is_reported_on_stderr() {
    let tmp = tempfile::tempdir().unwrap();

    eduslide("http://127.0.0.1:9", tmp.path())
        .args(["topic", "   "])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Please enter a topic"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slides_go_to_stdout() {
    let base = serve(Router::new().route("/api/generate/topic", post(two_slides))).await;
    let tmp = tempfile::tempdir().unwrap();

    let output = eduslide(&base, tmp.path())
        .args(["topic", "Tides", "--slides", "2"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Slide 1"));
    assert!(stdout.find("Tide basics").unwrap() < stdout.find("Spring tides").unwrap());
    assert!(output.stderr.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_export_keeps_cards_on_stdout_and_error_on_stderr() {
    let base = serve(
        Router::new()
            .route("/api/generate/topic", post(two_slides))
            .route("/api/export/pptx", post(export_fails)),
    )
    .await;
    let tmp = tempfile::tempdir().unwrap();

    let output = eduslide(&base, tmp.path())
        .args(["topic", "Tides", "--download"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("Tide basics"));
    assert!(!stdout.contains("renderer offline"));
    assert!(stderr.contains("Could not download the file"));
    assert!(stderr.contains("renderer offline"));
    assert!(!tmp.path().join("Tides.pptx").exists());
}

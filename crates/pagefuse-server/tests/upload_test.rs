//! Exercises the HTTP surface end to end against a real bound listener.
//! The pipeline's detector calls never fire in these tests since requests
//! only cover the upload/status endpoints, not an actually-processed page.

use pagefuse_server::{build, ServerArgs};

const TEST_SECRET: &str = "test-secret";

async fn spawn_test_server() -> String {
    let (_, app) = build(ServerArgs {
        bind: "127.0.0.1:0".to_string(),
        db_path: ":memory:".to_string(),
        config_path: None,
        workers: 1,
        session_secret: TEST_SECRET.to_string(),
    })
    .await
    .unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn cookie() -> String {
    format!("session={TEST_SECRET}")
}

#[tokio::test]
async fn healthz_needs_no_cookie() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let response = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn missing_cookie_is_unauthorized() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let response = client.get(format!("{base}/documents/1")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upload_then_status_reports_processing() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().part("file", reqwest::multipart::Part::bytes(b"%PDF-1.4".to_vec()).file_name("a.pdf"));
    let upload: serde_json::Value =
        client.post(format!("{base}/documents")).header("cookie", cookie()).multipart(form).send().await.unwrap().json().await.unwrap();
    let document_id = upload["document_id"].as_i64().unwrap();

    let status: serde_json::Value =
        client.get(format!("{base}/documents/{document_id}")).header("cookie", cookie()).send().await.unwrap().json().await.unwrap();
    assert_eq!(status["status"], "PROCESSING");
}

#[tokio::test]
async fn status_for_unknown_document_is_404() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let response = client.get(format!("{base}/documents/9999")).header("cookie", cookie()).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_without_file_field_is_bad_request() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let form = reqwest::multipart::Form::new().text("not_file", "oops");
    let response = client.post(format!("{base}/documents")).header("cookie", cookie()).multipart(form).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn retry_for_unknown_document_is_404() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let response = client.post(format!("{base}/documents/9999/retry")).header("cookie", cookie()).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn set_page_status_for_unknown_page_is_404() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let response = client
        .patch(format!("{base}/documents/1/pages/0/status"))
        .header("cookie", cookie())
        .json(&serde_json::json!({"status": "TRAINING"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

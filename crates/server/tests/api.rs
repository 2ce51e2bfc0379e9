use std::path::PathBuf;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use configs::AppConfig;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use server::{startup::build_app, state::AppState};

struct TestApp {
    router: Router,
    root: PathBuf,
    data_file: PathBuf,
}

impl TestApp {
    async fn new() -> anyhow::Result<Self> {
        let root = std::env::temp_dir().join(format!("kiosk_api_{}", Uuid::new_v4()));
        let data_file = root.join("data/data.json");
        let mut cfg = AppConfig::default();
        cfg.storage.data_file = data_file.to_string_lossy().into_owned();
        cfg.storage.uploads_dir = root.join("uploads").to_string_lossy().into_owned();
        cfg.storage.frontend_dir = root.join("frontend").to_string_lossy().into_owned();
        cfg.storage.themes_file = root.join("themes.toml").to_string_lossy().into_owned();
        cfg.uploads.max_bytes = 1024;
        let state = AppState::from_config(&cfg).await?;
        Ok(Self { router: build_app(state, &cfg), root, data_file })
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&v)?)
            }
            None => Body::empty(),
        };
        let res = self.router.clone().oneshot(req.body(body)?).await?;
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, value))
    }

    async fn cleanup(self) {
        let _ = tokio::fs::remove_dir_all(&self.root).await;
    }
}

fn ids(v: &Value) -> Vec<u64> {
    v.as_array().unwrap().iter().map(|s| s["id"].as_u64().unwrap()).collect()
}

#[tokio::test]
async fn health_and_seeded_document() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (status, body) = app.send("GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, doc) = app.send("GET", "/api/data", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["globalSettings"]["theme"], "default");
    assert_eq!(doc["slides"], json!([]));
    assert!(app.data_file.exists());
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn deleting_middle_slide_renumbers_the_rest() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    for text in ["first", "second", "third"] {
        let (status, created) = app.send("POST", "/api/slides", Some(json!({"text": text}))).await?;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["text"], text);
    }

    let (status, _) = app.send("DELETE", "/api/slides/2", None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, slides) = app.send("GET", "/api/slides", None).await?;
    assert_eq!(ids(&slides), [1, 2]);
    assert_eq!(slides[1]["text"], "third");

    let (status, body) = app.send("DELETE", "/api/slides/7", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn slide_time_below_minimum_is_rejected() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    app.send("POST", "/api/slides", Some(json!({"text": "menu", "time": 5000}))).await?;
    let before = tokio::fs::read(&app.data_file).await?;

    let (status, body) = app.send("PUT", "/api/slides/1", Some(json!({"time": 2000}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");
    assert_eq!(tokio::fs::read(&app.data_file).await?, before);

    let (status, slide) = app.send("PUT", "/api/slides/1", Some(json!({"time": null}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(slide["time"].is_null());
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn create_validates_content_and_color() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (status, _) = app.send("POST", "/api/slides", Some(json!({"description": "no text"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .send("POST", "/api/slides", Some(json!({"text": "x", "accentColor": "red"})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, slides) = app.send("GET", "/api/slides", None).await?;
    assert_eq!(slides, json!([]));
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn reorder_and_visible_listing() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    for text in ["a", "b", "c"] {
        app.send("POST", "/api/slides", Some(json!({"text": text}))).await?;
    }
    let (status, slides) = app.send("PUT", "/api/slides/reorder", Some(json!({"order": [3, 1, 2]}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&slides), [1, 2, 3]);
    assert_eq!(slides[0]["text"], "c");

    let (status, _) = app.send("PUT", "/api/slides/reorder", Some(json!({"order": [1, 1, 2]}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.send("PUT", "/api/slides/2", Some(json!({"visibility": false}))).await?;
    let (_, visible) = app.send("GET", "/api/slides/visible", None).await?;
    let texts: Vec<_> = visible.as_array().unwrap().iter().map(|s| s["text"].clone()).collect();
    assert_eq!(texts, [json!("c"), json!("b")]);

    let (status, slide) = app.send("GET", "/api/slides/3", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slide["text"], "b");
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn settings_follow_theme_registry() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (_, themes) = app.send("GET", "/api/themes", None).await?;
    assert!(themes.as_array().unwrap().iter().any(|t| t["id"] == "default"));

    let (status, settings) = app
        .send(
            "PUT",
            "/api/settings",
            Some(json!({"theme": "sunset", "descriptionFontSize": 30, "performance": {"reduceMotion": true}})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["theme"], "sunset");
    assert_eq!(settings["descriptionFontSize"], 30.0);
    assert_eq!(settings["performance"]["reduceMotion"], true);

    let (status, _) = app.send("PUT", "/api/settings", Some(json!({"theme": "nope"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, settings) = app.send("GET", "/api/settings", None).await?;
    assert_eq!(settings["theme"], "sunset");
    app.cleanup().await;
    Ok(())
}

fn multipart(field: &str, file_name: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "kiosk-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n").as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

async fn upload(app: &TestApp, file_name: &str, bytes: &[u8]) -> anyhow::Result<(StatusCode, Value)> {
    let (content_type, body) = multipart("image", file_name, bytes);
    let req = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))?;
    let res = app.router.clone().oneshot(req).await?;
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn uploaded_image_is_served_back() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (status, body) = upload(&app, "logo.png", b"not-really-a-png").await?;
    assert_eq!(status, StatusCode::CREATED);
    let path = body["path"].as_str().unwrap().to_string();
    assert!(path.starts_with("/uploads/"));

    let res = app
        .router
        .clone()
        .oneshot(Request::builder().uri(&path).body(Body::empty())?)
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let csp = res
        .headers()
        .get(header::CONTENT_SECURITY_POLICY)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(csp.contains("default-src 'none'"));
    let served = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    assert_eq!(&served[..], b"not-really-a-png");

    let (status, _) = upload(&app, "script.js", b"alert(1)").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = upload(&app, "big.png", &[7u8; 2048]).await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn corrupt_document_surfaces_as_server_error() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    tokio::fs::create_dir_all(app.data_file.parent().unwrap()).await?;
    tokio::fs::write(&app.data_file, b"{ definitely not json").await?;

    let (status, body) = app.send("GET", "/api/slides", None).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Corrupt Store");
    let (status, _) = app.send("POST", "/api/slides", Some(json!({"text": "x"}))).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(tokio::fs::read(&app.data_file).await?, b"{ definitely not json");
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn metrics_expose_store_counters() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    app.send("POST", "/api/slides", Some(json!({"text": "x"}))).await?;
    let res = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty())?)
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let text = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    assert!(String::from_utf8_lossy(&text).contains("kiosk_store_writes_total"));
    app.cleanup().await;
    Ok(())
}

async fn send_raw(app: &TestApp, req: Request<Body>) -> anyhow::Result<(StatusCode, String, Value)> {
    let res = app.router.clone().oneshot(req).await?;
    let status = res.status();
    let content_type = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    Ok((status, content_type, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn malformed_requests_get_json_errors() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let req = Request::builder()
        .method("POST")
        .uri("/api/slides")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"text":"a","time":"soon"}"#))?;
    let (status, content_type, body) = send_raw(&app, req).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(content_type.starts_with("application/json"));
    assert_eq!(body["error"], "Invalid Request Body");

    let req = Request::builder()
        .method("PUT")
        .uri("/api/settings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))?;
    let (status, content_type, body) = send_raw(&app, req).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(content_type.starts_with("application/json"));
    assert_eq!(body["error"], "Invalid Request Body");

    let req = Request::builder().uri("/api/slides/abc").body(Body::empty())?;
    let (status, content_type, body) = send_raw(&app, req).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(content_type.starts_with("application/json"));
    assert_eq!(body["error"], "Invalid Path");

    let req = Request::builder().method("POST").uri("/api/upload").body(Body::from("raw bytes"))?;
    let (status, _, body) = send_raw(&app, req).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid Upload");

    let (_, slides) = app.send("GET", "/api/slides", None).await?;
    assert_eq!(slides, json!([]));
    app.cleanup().await;
    Ok(())
}

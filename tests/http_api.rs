use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use qrshelf_lib::{codec::QrGenerator, db::Database, web, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47];

struct TestApp {
    router: Router,
    db: Database,
    _dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        let router = web::router(AppState::new(db.clone(), QrGenerator::default()));
        Self {
            router,
            db,
            _dir: dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn generate(&self, form_body: &str) -> Response {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri("/generate")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form_body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn request(&self, method: Method, uri: &str, body: Body) -> Response {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(body)
                .unwrap(),
        )
        .await
    }
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = TestApp::new();

    let response = app.request(Method::GET, "/health", Body::empty()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn index_renders_html() {
    let app = TestApp::new();
    app.db
        .create_qr_code("listed".into(), "Shown".into(), PNG_MAGIC.to_vec())
        .await
        .unwrap();

    let response = app.request(Method::GET, "/", Body::empty()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));

    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("listed"));
    assert!(html.contains("Shown"));
}

#[tokio::test]
async fn generate_then_fetch_image() {
    let app = TestApp::new();

    let response = app.generate("content=https%3A%2F%2Fexample.com").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let response = app.request(Method::GET, "/qr/1", Body::empty()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "inline; filename=\"qr-1.png\""
    );
    assert!(body_bytes(response).await.starts_with(PNG_MAGIC));

    let stored = app.db.get_qr_code(1).await.unwrap().unwrap();
    assert_eq!(stored.content, "https://example.com");
    assert_eq!(stored.label, "");
}

#[tokio::test]
async fn generate_trims_content() {
    let app = TestApp::new();

    let response = app.generate("content=++hello+world++").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let stored = app.db.list_qr_codes(10, 0).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].content, "hello world");
}

#[tokio::test]
async fn generate_rejects_empty_content() {
    let app = TestApp::new();

    for body in ["content=", "content=+++", ""] {
        let response = app.generate(body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body:?}");
    }

    assert_eq!(app.db.count_qr_codes().await.unwrap(), 0);
}

#[tokio::test]
async fn fetch_image_with_bad_or_unknown_id() {
    let app = TestApp::new();

    let response = app.request(Method::GET, "/qr/abc", Body::empty()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.request(Method::GET, "/qr/999", Body::empty()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_label_round_trip() {
    let app = TestApp::new();
    let created = app
        .db
        .create_qr_code("test".into(), String::new(), PNG_MAGIC.to_vec())
        .await
        .unwrap();

    let uri = format!("/qr/{}", created.id);
    let response = app
        .request(Method::PUT, &uri, Body::from(r#"{"label":"X"}"#))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({"status": "ok"}));

    let stored = app.db.get_qr_code(created.id).await.unwrap().unwrap();
    assert_eq!(stored.label, "X");
}

#[tokio::test]
async fn update_label_failures() {
    let app = TestApp::new();
    let created = app
        .db
        .create_qr_code("test".into(), "before".into(), PNG_MAGIC.to_vec())
        .await
        .unwrap();
    let uri = format!("/qr/{}", created.id);

    let response = app
        .request(Method::PUT, &uri, Body::from("{not json"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(Method::PUT, "/qr/nope", Body::from(r#"{"label":"X"}"#))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(Method::PUT, "/qr/999", Body::from(r#"{"label":"X"}"#))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let stored = app.db.get_qr_code(created.id).await.unwrap().unwrap();
    assert_eq!(stored.label, "before");
}

#[tokio::test]
async fn delete_existing_and_missing() {
    let app = TestApp::new();
    let created = app
        .db
        .create_qr_code("test".into(), String::new(), PNG_MAGIC.to_vec())
        .await
        .unwrap();
    let uri = format!("/qr/{}", created.id);

    let response = app.request(Method::DELETE, &uri, Body::empty()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");

    let response = app.request(Method::GET, &uri, Body::empty()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.request(Method::DELETE, "/qr/999", Body::empty()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.request(Method::DELETE, "/qr/x1", Body::empty()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn store_failure_is_an_opaque_server_error() {
    let app = TestApp::new();
    app.db.close();

    let response = app.request(Method::GET, "/", Body::empty()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(body, "Internal server error");
}

#[tokio::test]
async fn generate_reads_content_from_query_string() {
    let app = TestApp::new();

    let response = app
        .request(Method::POST, "/generate?content=hi", Body::empty())
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/generate?content=from-query")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("content=from-body"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let stored = app.db.list_qr_codes(10, 0).await.unwrap();
    let contents: Vec<_> = stored.iter().map(|qr| qr.content.as_str()).collect();
    assert_eq!(contents, ["from-body", "hi"]);
}

#[tokio::test]
async fn update_label_accepts_null_and_trailing_data() {
    let app = TestApp::new();
    let created = app
        .db
        .create_qr_code("test".into(), "before".into(), PNG_MAGIC.to_vec())
        .await
        .unwrap();
    let uri = format!("/qr/{}", created.id);

    let response = app
        .request(Method::PUT, &uri, Body::from(r#"{"label":"X"} {"label":"Y"}"#))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stored = app.db.get_qr_code(created.id).await.unwrap().unwrap();
    assert_eq!(stored.label, "X");

    let response = app.request(Method::PUT, &uri, Body::from("null")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stored = app.db.get_qr_code(created.id).await.unwrap().unwrap();
    assert_eq!(stored.label, "");

    let response = app.request(Method::PUT, &uri, Body::empty()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn encoding_failure_is_an_opaque_server_error() {
    let app = TestApp::new();

    let form_body = format!("content={}", "x".repeat(8000));
    let response = app.generate(&form_body).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(body, "Internal server error");

    assert_eq!(app.db.count_qr_codes().await.unwrap(), 0);
}

#[tokio::test]
async fn closed_store_fails_every_mutation() {
    let app = TestApp::new();
    let created = app
        .db
        .create_qr_code("test".into(), String::new(), PNG_MAGIC.to_vec())
        .await
        .unwrap();
    let uri = format!("/qr/{}", created.id);
    app.db.close();

    let response = app.generate("content=hello").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = app
        .request(Method::PUT, &uri, Body::from(r#"{"label":"X"}"#))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = app.request(Method::DELETE, &uri, Body::empty()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(body, "Internal server error");
}

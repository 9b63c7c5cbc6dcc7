pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};

use crate::auth::handlers::handle_login;
use crate::candidates::handlers as candidates;
use crate::job_config::{handle_get_config, handle_replace_config};
use crate::jobs::handlers as jobs;
use crate::state::AppState;
use crate::uploads::handlers::{handle_get_upload, handle_upload};

/// Headroom above the photo limit for multipart boundaries and part headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_body_limit = state
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD);
    let cors_enabled = state.config.cors_enabled;

    let mut router = Router::new()
        .route("/health", get(health::health_handler))
        .route("/login", post(handle_login))
        // Jobs
        .route(
            "/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/jobs/:id",
            get(jobs::handle_get_job)
                .put(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        .route(
            "/job-config",
            get(handle_get_config).put(handle_replace_config),
        )
        // Candidates
        .route(
            "/candidates",
            get(candidates::handle_list_candidates).post(candidates::handle_create_candidate),
        )
        .route(
            "/candidates/:id",
            get(candidates::handle_get_candidate)
                .put(candidates::handle_update_candidate)
                .delete(candidates::handle_delete_candidate),
        )
        // Uploads
        .route(
            "/upload",
            post(handle_upload).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route("/uploads/:filename", get(handle_get_upload))
        .with_state(state);

    if cors_enabled {
        router = router.layer(cors_layer());
    }

    router
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
}

/// Any origin, no credentials; preflight requests are answered by the layer.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::{Config, DEFAULT_MAX_UPLOAD_BYTES};
    use crate::store::ReadPolicy;
    use crate::uploads::storage::UploadBackend;

    const BOUNDARY: &str = "recruit-test-boundary";

    fn test_config(dir: &Path) -> Config {
        Config {
            port: 0,
            data_dir: dir.join("data"),
            read_policy: ReadPolicy::FailOpen,
            upload_storage: UploadBackend::Memory,
            upload_dir: dir.join("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_enabled: true,
            rust_log: "info".to_string(),
        }
    }

    fn app(config: Config) -> Router {
        build_router(AppState::new(config))
    }

    fn seed(dir: &Path, file: &str, value: Value) {
        let data_dir = dir.join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(data_dir.join(file), serde_json::to_vec(&value).unwrap()).unwrap();
    }

    async fn call(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = call(app, request).await;
        let status = response.status();
        (status, json_body(response).await)
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        }
    }

    fn multipart(parts: &[(&str, Option<(&str, &str)>, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (field, file, bytes) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file {
                Some((file_name, content_type)) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn photo(file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
        multipart(&[("photo", Some((file_name, content_type)), bytes)])
    }

    // ── Auth ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_login_scenario() {
        let dir = tempfile::tempdir().unwrap();
        seed(
            dir.path(),
            "users.json",
            json!({"users": [{"email": "a@x.com", "password": "p", "role": "admin", "name": "A"}]}),
        );
        let app = app(test_config(dir.path()));

        let (status, body) = send(
            &app,
            "POST",
            "/login",
            Some(json!({"email": "a@x.com", "password": "p", "role": "admin"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], json!("Login successful"));
        assert_eq!(body["user"], json!({"email": "a@x.com", "role": "admin", "name": "A"}));

        let (status, body) = send(
            &app,
            "POST",
            "/login",
            Some(json!({"email": "a@x.com", "password": "p", "role": "recruiter"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Invalid credentials or role"}));

        let (status, _) = send(
            &app,
            "POST",
            "/login",
            Some(json!({"email": "a@x.com", "password": "p"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_body_uses_error_shape() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(test_config(dir.path()));

        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"email\":"))
            .unwrap();
        let response = call(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    // ── Jobs ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_created_job_is_returned_with_config() {
        let dir = tempfile::tempdir().unwrap();
        let form = json!([{"key": "full_name", "required": true}]);
        seed(dir.path(), "job_config.json", json!({"application_form": form}));
        let app = app(test_config(dir.path()));

        let job = json!({"id": "j1", "title": "Backend Engineer", "salary": {"min": 10}});
        let (status, created) = send(&app, "POST", "/jobs", Some(job.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let mut expected = job.clone();
        expected["config"] = form.clone();
        assert_eq!(created, expected);

        let (status, fetched) = send(&app, "GET", "/jobs/j1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, expected);

        let (status, list) = send(&app, "GET", "/jobs", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list, json!({"data": [job], "config": form}));
    }

    #[tokio::test]
    async fn test_repeated_delete_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), "jobs.json", json!({"data": [{"id": "j1", "title": "QA"}]}));
        let app = app(test_config(dir.path()));

        let (status, deleted) = send(&app, "DELETE", "/jobs/j1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["title"], json!("QA"));
        assert_eq!(deleted["config"], json!([]));

        let (status, body) = send(&app, "DELETE", "/jobs/j1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Job not found"}));
    }

    #[tokio::test]
    async fn test_update_job_merges_and_unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        seed(
            dir.path(),
            "jobs.json",
            json!({"data": [{"id": "j1", "title": "QA", "status": "open"}]}),
        );
        let app = app(test_config(dir.path()));

        let (status, updated) =
            send(&app, "PUT", "/jobs/j1", Some(json!({"status": "closed"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], json!("QA"));
        assert_eq!(updated["status"], json!("closed"));

        let (status, _) = send(&app, "PUT", "/jobs/nope", Some(json!({"status": "x"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_job_without_string_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(test_config(dir.path()));

        let (status, body) = send(&app, "POST", "/jobs", Some(json!({"title": "No id"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_strict_policy_surfaces_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.read_policy = ReadPolicy::Strict;
        let app = app(config);

        let (status, body) = send(&app, "GET", "/jobs", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
    }

    // ── Job config ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_config_replace_is_total() {
        let dir = tempfile::tempdir().unwrap();
        seed(
            dir.path(),
            "job_config.json",
            json!({"application_form": [{"key": "phone"}], "version": 3}),
        );
        let app = app(test_config(dir.path()));

        let (status, echoed) =
            send(&app, "PUT", "/job-config", Some(json!({"application_form": []}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(echoed, json!({"application_form": []}));

        let (_, stored) = send(&app, "GET", "/job-config", None).await;
        assert_eq!(stored, json!({"application_form": []}));
    }

    // ── Candidates ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_candidate_update_is_shallow_merge() {
        let dir = tempfile::tempdir().unwrap();
        seed(
            dir.path(),
            "candidates.json",
            json!({"data": [{"id": "c1", "name": "Old", "email": "c1@x.com", "job_id": "j9"}]}),
        );
        let app = app(test_config(dir.path()));

        let (status, updated) =
            send(&app, "PUT", "/candidates/c1", Some(json!({"name": "X"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            updated,
            json!({"id": "c1", "name": "X", "email": "c1@x.com", "job_id": "j9"})
        );

        let (_, fetched) = send(&app, "GET", "/candidates/c1", None).await;
        assert_eq!(fetched, updated);
        assert!(fetched.get("config").is_none());
    }

    #[tokio::test]
    async fn test_candidate_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(test_config(dir.path()));

        let (status, created) =
            send(&app, "POST", "/candidates", Some(json!({"id": "c1", "name": "N"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created, json!({"id": "c1", "name": "N"}));

        let (_, list) = send(&app, "GET", "/candidates", None).await;
        assert_eq!(list, json!({"data": [{"id": "c1", "name": "N"}]}));

        let (status, _) = send(&app, "DELETE", "/candidates/c1", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, "GET", "/candidates/c1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Candidate not found"}));
    }

    // ── Uploads ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_memory_upload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(test_config(dir.path()));
        let bytes: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg-body";

        let response = call(&app, photo("photo.jpg", "image/jpeg", bytes)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], json!(true));
        let url = body["url"].as_str().unwrap().to_string();
        assert!(url.starts_with("/uploads/profile-"));
        assert!(url.ends_with(".jpg"));
        assert_eq!(url, format!("/uploads/{}", body["filename"].as_str().unwrap()));

        let response = call(&app, Request::get(url.as_str()).body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        let served = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&served[..], bytes);
    }

    #[tokio::test]
    async fn test_disk_upload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.upload_storage = UploadBackend::Disk;
        let app = app(config);

        let response = call(&app, photo("pic.png", "image/png", b"png-bytes")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let filename = body["filename"].as_str().unwrap();
        assert!(dir.path().join("uploads").join(filename).exists());
        assert_eq!(body["message"], json!("File uploaded successfully (disk storage)"));

        let response = call(
            &app,
            Request::get(format!("/uploads/{filename}")).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    }

    #[tokio::test]
    async fn test_upload_rejects_text_file_with_spoofed_type() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(test_config(dir.path()));

        let response = call(&app, photo("notes.txt", "image/png", b"hello")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Only image files are allowed!"})
        );
    }

    #[tokio::test]
    async fn test_upload_without_file_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(test_config(dir.path()));

        let response = call(&app, multipart(&[("note", None, &b"just text"[..])])).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "No file uploaded"}));

        let (status, body) = send(&app, "POST", "/upload", Some(json!({"photo": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No file uploaded"}));
    }

    #[tokio::test]
    async fn test_upload_rejects_unexpected_file_field() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(test_config(dir.path()));

        let request = multipart(&[("avatar", Some(("a.png", "image/png")), &b"x"[..])]);
        let response = call(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Unexpected field: avatar"})
        );
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.max_upload_bytes = 16;
        let app = app(config);

        let response = call(&app, photo("big.gif", "image/gif", &[0u8; 17])).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({"error": "File too large. Maximum size is 16 bytes"})
        );

        let response = call(&app, photo("ok.gif", "image/gif", &[0u8; 16])).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_past_default_body_limit_is_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(test_config(dir.path()));

        let big = vec![0u8; 6 * 1024 * 1024];
        let response = call(&app, photo("big.jpg", "image/jpeg", &big)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({
                "error": format!("File too large. Maximum size is {DEFAULT_MAX_UPLOAD_BYTES} bytes")
            })
        );
    }

    #[tokio::test]
    async fn test_unbounded_upload_limit_builds_router() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.max_upload_bytes = usize::MAX;
        let app = app(config);

        let response = call(&app, photo("ok.png", "image/png", b"png")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_rejects_second_photo() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(test_config(dir.path()));

        let request = multipart(&[
            ("photo", Some(("a.png", "image/png")), &b"a"[..]),
            ("photo", Some(("b.png", "image/png")), &b"b"[..]),
        ]);
        let response = call(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Unexpected field: photo"})
        );
    }

    #[tokio::test]
    async fn test_upload_ignores_text_parts_beside_photo() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(test_config(dir.path()));

        let request = multipart(&[
            ("candidate_id", None, &b"c1"[..]),
            ("photo", Some(("me.png", "image/png")), &b"\x89PNG"[..]),
            ("note", None, &b"hello"[..]),
        ]);
        let response = call(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], json!(true));

        let url = body["url"].as_str().unwrap().to_string();
        let response = call(&app, Request::get(url.as_str()).body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"\x89PNG");
    }

    #[tokio::test]
    async fn test_unknown_upload_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(test_config(dir.path()));

        let (status, body) = send(&app, "GET", "/uploads/profile-missing.jpg", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "File not found"}));
    }

    // ── Cross-cutting ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_cors_preflight_allows_any_origin() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(test_config(dir.path()));

        let request = Request::builder()
            .method("OPTIONS")
            .uri("/jobs")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
            .body(Body::empty())
            .unwrap();
        let response = call(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(response.headers()[header::X_XSS_PROTECTION], "1; mode=block");
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(test_config(dir.path()));

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("ok"));
    }
}

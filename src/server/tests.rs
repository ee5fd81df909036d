//! Router tests
//!
//! Each request goes through a fresh `router(state.clone())` with
//! `ServiceExt::oneshot`; the state is shared, so requests see each
//! other's effects the way a browser session would.

use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::*;
use crate::auth::DemoAuthProvider;
use crate::export::link::testing::RecordingClipboard;
use crate::store::MemoryCardStore;

struct Harness {
    state: AppState,
    clipboard: Arc<RecordingClipboard>,
    _dir: tempfile::TempDir,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.export.download_dir = dir.path().join("downloads");

    let notifications = Notifications::new();
    let provider = Arc::new(DemoAuthProvider::new("test@example.com", "password").unwrap());
    let session = Arc::new(Session::new(provider, notifications.clone(), None));
    let clipboard = Arc::new(RecordingClipboard::default());

    let state = AppState::new(
        config,
        notifications,
        session,
        Arc::new(MemoryCardStore::new()),
        clipboard.clone(),
    );

    Harness {
        state,
        clipboard,
        _dir: dir,
    }
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

async fn send(h: &Harness, request: Request<Body>) -> Reply {
    let response = router(h.state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    Reply {
        status,
        headers,
        body,
    }
}

async fn get(h: &Harness, uri: &str) -> Reply {
    send(h, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn call(h: &Harness, method: Method, uri: &str) -> Reply {
    send(
        h,
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

async fn post_json(h: &Harness, uri: &str, body: Value) -> Reply {
    send(
        h,
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn post_bytes(h: &Harness, uri: &str, mime: &str, bytes: Vec<u8>) -> Reply {
    send(
        h,
        Request::post(uri)
            .header(header::CONTENT_TYPE, mime)
            .body(Body::from(bytes))
            .unwrap(),
    )
    .await
}

async fn set_field(h: &Harness, field: &str, value: &str) -> Reply {
    post_json(h, "/api/editor/field", json!({ "field": field, "value": value })).await
}

fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 40, 40, 255]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

async fn login(h: &Harness) -> Reply {
    post_json(
        h,
        "/api/auth/login",
        json!({ "email": "test@example.com", "password": "password" }),
    )
    .await
}

fn last_title(h: &Harness) -> String {
    h.state.notifications.recent(1)[0].title.clone()
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let h = harness();
    let reply = get(&h, "/health").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["status"], "ok");
}

#[tokio::test]
async fn test_create_seeds_template_and_starts_fresh() {
    let h = harness();
    set_field(&h, "name", "Jane Doe").await;

    let reply = get(&h, "/create?template=modern").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.text().contains("Your Name"));

    let editor = get(&h, "/api/editor").await.json();
    assert_eq!(editor["template"], "modern");
    assert_eq!(editor["card"]["name"], "");

    get(&h, "/create?template=minimalist").await;
    assert_eq!(get(&h, "/api/editor").await.json()["template"], "default");

    get(&h, "/create").await;
    assert_eq!(get(&h, "/api/editor").await.json()["template"], "classic");
}

#[tokio::test]
async fn test_field_change_reaches_preview() {
    let h = harness();
    let reply = set_field(&h, "name", "<Jane>").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["card"]["name"], "<Jane>");

    let preview = get(&h, "/api/preview").await.text();
    assert!(preview.contains("&lt;Jane&gt;"));
    assert!(!preview.contains("<Jane>"));

    let academic = get(&h, "/api/preview?template=academic").await;
    assert_eq!(academic.status, StatusCode::OK);
    // Preview with a template query does not switch the editor
    assert_eq!(get(&h, "/api/editor").await.json()["template"], "classic");
}

#[tokio::test]
async fn test_unknown_field_is_bad_request() {
    let h = harness();
    let reply = set_field(&h, "favouriteColour", "blue").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.json()["error"]
        .as_str()
        .unwrap()
        .contains("unknown field"));
}

#[tokio::test]
async fn test_photo_upload_limits() {
    let h = harness();

    let oversize = vec![0u8; crate::form::photo::MAX_PHOTO_BYTES + 1];
    let reply = post_bytes(&h, "/api/editor/photo", "image/png", oversize).await;
    assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(last_title(&h), "File too large");

    let reply = post_bytes(&h, "/api/editor/photo", "image/png", b"hello world".to_vec()).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(last_title(&h), "Unsupported file");
    assert_eq!(h.state.workflow.card().photo_url, "");

    let reply = post_bytes(&h, "/api/editor/photo", "text/plain", b"hello".to_vec()).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(last_title(&h), "Unsupported file");

    let reply = post_bytes(&h, "/api/editor/photo", "image/png", tiny_png()).await;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["hasPhoto"], true);
    assert!(body["card"]["photoUrl"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_far_oversized_photo_still_notifies() {
    let h = harness();
    let before = h.state.notifications.recent(100).len();

    let huge = vec![0u8; crate::form::photo::MAX_PHOTO_BYTES * 2 + 1];
    let reply = post_bytes(&h, "/api/editor/photo", "image/png", huge).await;
    assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(h.state.notifications.recent(100).len(), before + 1);
    assert_eq!(last_title(&h), "File too large");
    assert!(!h.state.lock_form().has_photo());
}

#[tokio::test]
async fn test_submit_outcomes() {
    let h = harness();

    let reply = call(&h, Method::POST, "/api/editor/submit").await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    let body = reply.json();
    assert_eq!(body["errors"][0]["field"], "name");
    assert_eq!(
        body["errors"][0]["message"],
        "Name must be at least 2 characters"
    );

    set_field(&h, "name", "Jane Doe").await;
    set_field(&h, "email", "jane@example.com").await;
    let reply = call(&h, Method::POST, "/api/editor/submit").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(last_title(&h), "Photo required");

    post_bytes(&h, "/api/editor/photo", "image/png", tiny_png()).await;
    let reply = call(&h, Method::POST, "/api/editor/submit").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(last_title(&h), "Card updated");
}

#[tokio::test]
async fn test_submit_rejects_bad_links_in_default_form() {
    let h = harness();
    set_field(&h, "name", "Jane Doe").await;
    set_field(&h, "email", "jane@example.com").await;
    set_field(&h, "twitter", "not a url").await;
    set_field(&h, "website", "nope").await;
    post_bytes(&h, "/api/editor/photo", "image/png", tiny_png()).await;

    let reply = call(&h, Method::POST, "/api/editor/submit").await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    let body = reply.json();
    assert_eq!(body["errors"][0]["field"], "twitter");
    assert_eq!(body["errors"][1]["field"], "website");
    assert_eq!(body["errors"][1]["message"], "Please enter a valid URL");
    assert!(!h
        .state
        .notifications
        .titles()
        .iter()
        .any(|t| t == "Card updated"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Export
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_export_requires_photo() {
    let h = harness();
    set_field(&h, "name", "Jane Doe").await;

    let reply = get(&h, "/api/export?format=png").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(last_title(&h), "Photo required");
    assert!(h.state.notifications.recent(1)[0].is_destructive());
    assert!(!h.state.downloads.dir().join("social-card.png").exists());
}

#[tokio::test]
async fn test_export_png_download() {
    let h = harness();
    set_field(&h, "name", "Jane Doe").await;
    post_bytes(&h, "/api/editor/photo", "image/png", tiny_png()).await;

    let reply = get(&h, "/api/export?format=png").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        reply.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"social-card.png\""
    );
    assert_eq!(&reply.body[..4], b"\x89PNG");
    assert_eq!(last_title(&h), "Download started");

    let saved = h.state.downloads.dir().join("social-card.png");
    assert_eq!(std::fs::read(saved).unwrap(), reply.body);
}

#[tokio::test]
async fn test_export_jpg_and_bad_format() {
    let h = harness();
    post_bytes(&h, "/api/editor/photo", "image/png", tiny_png()).await;

    let reply = get(&h, "/api/export?format=jpeg&template=academic").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.headers[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(&reply.body[..2], &[0xFF, 0xD8]);

    let reply = get(&h, "/api/export?format=gif").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_quick_link_copies_to_clipboard() {
    let h = harness();
    let reply = call(&h, Method::POST, "/api/export/link").await;
    assert_eq!(reply.status, StatusCode::OK);

    let body = reply.json();
    let link = body["link"].as_str().unwrap().to_string();
    let pattern = regex::Regex::new(r"^https://socialcard\.app/s/[0-9a-z]{8}$").unwrap();
    assert!(pattern.is_match(&link), "{link}");
    assert_eq!(body["copied"], true);
    assert_eq!(h.clipboard.writes(), vec![link]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Session, saving and sharing
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_save_requires_login() {
    let h = harness();
    set_field(&h, "name", "Jane Doe").await;

    let reply = call(&h, Method::POST, "/api/cards").await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(last_title(&h), "Authentication required");

    let reply = get(&h, "/api/cards").await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_failure_shows_hint() {
    let h = harness();
    let reply = post_json(
        &h,
        "/api/auth/login",
        json!({ "email": "test@example.com", "password": "nope" }),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let notes = get(&h, "/api/notifications?limit=1").await.json();
    assert_eq!(notes.as_array().unwrap().len(), 1);
    assert_eq!(notes[0]["title"], "Login failed");
    assert_eq!(
        notes[0]["description"],
        "Please use test@example.com and password"
    );
}

#[tokio::test]
async fn test_save_share_and_delete_flow() {
    let h = harness();

    let reply = login(&h).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["authenticated"], true);
    assert_eq!(
        get(&h, "/api/editor").await.json()["card"]["email"],
        "demo@example.com"
    );

    set_field(&h, "name", "Jane Doe").await;

    // Photo is required to save
    let reply = call(&h, Method::POST, "/api/cards").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(last_title(&h), "Photo required");

    post_bytes(&h, "/api/editor/photo", "image/png", tiny_png()).await;
    let reply = call(&h, Method::POST, "/api/cards").await;
    assert_eq!(reply.status, StatusCode::OK);
    let saved = reply.json();
    assert_eq!(saved["redirect"], "/saved-cards");
    let record_id = saved["record"]["id"].as_str().unwrap().to_string();

    let list = get(&h, "/api/cards").await.json();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert!(get(&h, "/saved-cards").await.text().contains("Jane Doe"));

    let link = call(&h, Method::POST, "/api/share").await.json();
    assert_eq!(link["persisted"], true);
    let share_id = link["id"].as_str().unwrap();
    assert!(link["url"]
        .as_str()
        .unwrap()
        .ends_with(&format!("/share/{}", share_id)));

    let page = get(&h, &format!("/share/{}", share_id)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.text().contains("Jane Doe"));

    let reply = call(&h, Method::DELETE, &format!("/api/cards/{}", record_id)).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
    let reply = call(&h, Method::DELETE, &format!("/api/cards/{}", record_id)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(last_title(&h), "Failed to delete card");

    let reply = call(&h, Method::POST, "/api/auth/logout").await;
    assert_eq!(reply.json()["authenticated"], false);
    assert_eq!(get(&h, "/api/auth/whoami").await.json()["authenticated"], false);
}

#[tokio::test]
async fn test_unpersisted_share_link_does_not_resolve() {
    let h = harness();

    let reply = call(&h, Method::POST, "/api/share").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(last_title(&h), "Name is required");

    set_field(&h, "name", "Jane Doe").await;
    let link = call(&h, Method::POST, "/api/share").await.json();
    assert_eq!(link["persisted"], false);

    let titles = h.state.notifications.titles();
    assert!(titles.iter().any(|t| t == "Not logged in"));

    let page = get(&h, &format!("/share/{}", link["id"].as_str().unwrap())).await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
}

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use stub_server::{app, Inspection, Item};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- fixed routes ---

#[tokio::test]
async fn status_reports_ok() {
    let resp = app().oneshot(empty_request("GET", "/status")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = body_json(resp).await;
    assert_eq!(json, serde_json::json!({ "ok": true }));
}

#[tokio::test]
async fn text_number_and_empty_routes() {
    let resp = app().oneshot(empty_request("GET", "/text")).await.unwrap();
    assert_eq!(body_bytes(resp).await.as_ref(), b"hello world");

    let resp = app().oneshot(empty_request("GET", "/number")).await.unwrap();
    assert_eq!(body_bytes(resp).await.as_ref(), b"42");

    let resp = app().oneshot(empty_request("GET", "/empty")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn fail_returns_requested_status() {
    for method in ["GET", "POST", "PATCH", "DELETE"] {
        let resp = app()
            .oneshot(json_request(method, "/fail/503", r#"{"name":"a"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE, "{method}");
        let json: serde_json::Value = body_json(resp).await;
        assert_eq!(json["status"], 503);
    }
}

#[tokio::test]
async fn fail_prefix_covers_nested_paths() {
    let resp = app()
        .oneshot(json_request("POST", "/fail/500/items", r#"{"name":"a"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn echo_returns_body_verbatim() {
    let resp = app()
        .oneshot(json_request("PUT", "/echo", r#"{"name":"a"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await.as_ref(), br#"{"name":"a"}"#);
}

#[tokio::test]
async fn inspect_reports_request_details() {
    let resp = app()
        .oneshot(json_request("DELETE", "/inspect/items/7?force=true", r#"{"why":"x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let seen: Inspection = body_json(resp).await;
    assert_eq!(seen.method, "DELETE");
    assert_eq!(seen.path, "/inspect/items/7");
    assert_eq!(seen.query.as_deref(), Some("force=true"));
    assert_eq!(seen.headers["content-type"], "application/json");
    assert_eq!(seen.body, r#"{"why":"x"}"#);
    // oneshot has no connection, so no peer
    assert!(seen.peer.is_none());
}

// --- items ---

#[tokio::test]
async fn create_item_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/items", r#"{"name":"a"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let item: Item = body_json(resp).await;
    assert_eq!(item.name, "a");
    assert!(!item.done);
}

#[tokio::test]
async fn create_item_without_body_returns_415() {
    let resp = app().oneshot(empty_request("POST", "/items")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn create_item_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/items", r#"{"not_name":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_item_not_found() {
    let resp = app()
        .oneshot(empty_request("GET", "/items/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_item_bad_uuid_returns_400() {
    let resp = app()
        .oneshot(empty_request("GET", "/items/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_item_not_found() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/items/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full lifecycle ---

#[tokio::test]
async fn item_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/items", r#"{"name":"Walk dog"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Item = body_json(resp).await;
    let id = created.id;

    // patch: only done
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PATCH", &format!("/items/{id}"), r#"{"done":true}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let patched: Item = body_json(resp).await;
    assert_eq!(patched.name, "Walk dog");
    assert!(patched.done);

    // put: full replacement, done falls back to false
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", &format!("/items/{id}"), r#"{"name":"Walk cat"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let replaced: Item = body_json(resp).await;
    assert_eq!(replaced.name, "Walk cat");
    assert!(!replaced.done);

    // list
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/items"))
        .await
        .unwrap();
    let items: Vec<Item> = body_json(resp).await;
    assert_eq!(items, vec![replaced.clone()]);

    // delete returns the removed item
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/items/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let removed: Item = body_json(resp).await;
    assert_eq!(removed, replaced);

    // get after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/items/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

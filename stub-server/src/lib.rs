use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, Path, Request, State},
    http::StatusCode,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub done: bool,
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub name: String,
    #[serde(default)]
    pub done: bool,
}

/// Partial update; only fields present in the JSON are applied.
#[derive(Deserialize)]
pub struct PatchItem {
    pub name: Option<String>,
    pub done: Option<bool>,
}

/// What `/inspect` saw of a request.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Inspection {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Header names are lowercase.
    pub headers: HashMap<String, String>,
    pub body: String,
    /// Remote address of the connection, when the server was started with
    /// connect info.
    pub peer: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Item>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/status", get(status))
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item)
                .put(replace_item)
                .patch(patch_item)
                .delete(delete_item),
        )
        .route("/inspect", any(inspect))
        .route("/inspect/{*rest}", any(inspect))
        .route("/echo", any(echo))
        .route("/fail/{code}", any(fail))
        .route("/fail/{code}/{*rest}", any(fail_nested))
        .route("/text", get(|| async { "hello world" }))
        .route("/number", get(|| async { "42" }))
        .route("/empty", get(|| async { StatusCode::OK }))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "stub server listening");
    }
    axum::serve(
        listener,
        app().into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

async fn status() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

async fn list_items(State(db): State<Db>) -> Json<Vec<Item>> {
    let items = db.read().await;
    Json(items.values().cloned().collect())
}

async fn create_item(
    State(db): State<Db>,
    Json(input): Json<CreateItem>,
) -> (StatusCode, Json<Item>) {
    let item = Item {
        id: Uuid::new_v4(),
        name: input.name,
        done: input.done,
    };
    tracing::debug!(id = %item.id, "item created");
    db.write().await.insert(item.id, item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn get_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Item>, StatusCode> {
    let items = db.read().await;
    items.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn replace_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateItem>,
) -> Result<Json<Item>, StatusCode> {
    let mut items = db.write().await;
    let item = items.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    item.name = input.name;
    item.done = input.done;
    Ok(Json(item.clone()))
}

async fn patch_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<PatchItem>,
) -> Result<Json<Item>, StatusCode> {
    let mut items = db.write().await;
    let item = items.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        item.name = name;
    }
    if let Some(done) = input.done {
        item.done = done;
    }
    Ok(Json(item.clone()))
}

/// Removes the item and returns it, so deletes carry a body.
async fn delete_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Item>, StatusCode> {
    let mut items = db.write().await;
    items.remove(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn inspect(request: Request) -> Result<Json<Inspection>, StatusCode> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string());
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);
    let headers = request
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = read_body(request.into_body()).await?;

    Ok(Json(Inspection {
        method,
        path,
        query,
        headers,
        body,
        peer,
    }))
}

async fn echo(request: Request) -> Result<String, StatusCode> {
    read_body(request.into_body()).await
}

async fn fail(Path(code): Path<u16>) -> (StatusCode, Json<serde_json::Value>) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (
        status,
        Json(serde_json::json!({ "error": "stubbed failure", "status": status.as_u16() })),
    )
}

async fn fail_nested(
    Path((code, _rest)): Path<(u16, String)>,
) -> (StatusCode, Json<serde_json::Value>) {
    fail(Path(code)).await
}

async fn read_body(body: Body) -> Result<String, StatusCode> {
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| StatusCode::BAD_REQUEST)
}

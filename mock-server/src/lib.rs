use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_DOMAIN: &str = "rebrand.ly";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: String,
    pub full_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    pub title: Option<String>,
    pub slashtag: String,
    pub destination: String,
    pub domain: Domain,
    pub short_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub clicks: u64,
    pub favourite: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub links_count: u64,
}

#[derive(Deserialize)]
pub struct LinkInput {
    pub destination: Option<String>,
    pub slashtag: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub domain: Option<String>,
    pub tags: Option<Vec<String>>,
    pub favourite: Option<bool>,
}

#[derive(Deserialize)]
pub struct TagInput {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Links and tags in creation order, plus `(link_id, tag_id)` relations.
#[derive(Default)]
pub struct Store {
    links: Vec<Link>,
    tags: Vec<Tag>,
    relations: Vec<(String, String)>,
}

impl Store {
    fn link(&self, id: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.id == id)
    }

    fn tag(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == id)
    }

    fn link_mut(&mut self, id: &str) -> Option<&mut Link> {
        self.links.iter_mut().find(|link| link.id == id)
    }

    fn tag_mut(&mut self, id: &str) -> Option<&mut Tag> {
        self.tags.iter_mut().find(|tag| tag.id == id)
    }
}

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    store: Arc<RwLock<Store>>,
}

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

pub fn app(api_key: &str) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key),
        store: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/links", get(list_links).post(create_link))
        .route("/links/{id}", get(get_link).put(update_link).delete(delete_link))
        .route("/links/{id}/tags", get(list_link_tags))
        .route("/links/{id}/tags/{tag_id}", post(attach_tag).delete(detach_tag))
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/{id}", get(get_tag).put(update_tag).delete(delete_tag))
        .route("/tags/{id}/links", get(list_tag_links))
        .route("/account", get(get_account))
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "code": status.as_u16(), "message": message })))
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get("apikey")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|key| key == &*state.api_key);
    if authorized {
        next.run(request).await
    } else {
        error(StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
    }
}

/// Apply `limit`/`offset` from the query string.
fn page<T>(items: Vec<T>, query: &HashMap<String, String>) -> Vec<T> {
    let offset = query.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

async fn list_links(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<Link>> {
    let store = state.store.read().await;
    let favourite = query.get("favourite").and_then(|v| v.parse::<bool>().ok());
    let links: Vec<Link> = store
        .links
        .iter()
        .filter(|link| favourite.map_or(true, |f| link.favourite == f))
        .filter(|link| query.get("slashtag").map_or(true, |s| &link.slashtag == s))
        .cloned()
        .collect();
    Json(page(links, &query))
}

async fn create_link(State(state): State<AppState>, Json(input): Json<LinkInput>) -> ApiResult<Json<Link>> {
    let destination = input.destination.unwrap_or_default();
    if destination.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "code": 422,
                "message": "Validation failed",
                "errors": { "destination": "The destination field is required" }
            })),
        ));
    }

    let mut store = state.store.write().await;
    let slashtag = input.slashtag.unwrap_or_else(|| new_id()[..6].to_string());
    if store.links.iter().any(|link| link.slashtag == slashtag) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "code": 422,
                "message": "Validation failed",
                "errors": { "slashtag": "The slashtag has already been taken" }
            })),
        ));
    }

    let domain = input.domain.unwrap_or_else(|| DEFAULT_DOMAIN.to_string());
    let now = Utc::now();
    let link = Link {
        id: new_id(),
        title: input.title,
        short_url: format!("https://{domain}/{slashtag}"),
        slashtag,
        destination,
        domain: Domain {
            id: format!("domain-{domain}"),
            full_name: domain,
        },
        tags: input.tags,
        created_at: now,
        updated_at: now,
        clicks: 0,
        favourite: input.favourite.unwrap_or(false),
        description: input.description,
    };
    tracing::debug!(link_id = %link.id, slashtag = %link.slashtag, "link created");
    store.links.push(link.clone());
    Ok(Json(link))
}

async fn get_link(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Link>> {
    let store = state.store.read().await;
    store
        .link(&id)
        .map(|link| Json(link.clone()))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Link not found"))
}

async fn update_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<LinkInput>,
) -> ApiResult<Json<Link>> {
    let mut store = state.store.write().await;
    let link = store
        .link_mut(&id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Link not found"))?;
    if let Some(destination) = input.destination {
        link.destination = destination;
    }
    if let Some(slashtag) = input.slashtag {
        link.slashtag = slashtag;
    }
    if let Some(title) = input.title {
        link.title = Some(title);
    }
    if let Some(description) = input.description {
        link.description = Some(description);
    }
    if let Some(tags) = input.tags {
        link.tags = Some(tags);
    }
    if let Some(favourite) = input.favourite {
        link.favourite = favourite;
    }
    if let Some(domain) = input.domain {
        link.domain = Domain {
            id: format!("domain-{domain}"),
            full_name: domain,
        };
    }
    link.short_url = format!("https://{}/{}", link.domain.full_name, link.slashtag);
    link.updated_at = Utc::now();
    Ok(Json(link.clone()))
}

async fn delete_link(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let mut store = state.store.write().await;
    let before = store.links.len();
    store.links.retain(|link| link.id != id);
    if store.links.len() == before {
        return Err(error(StatusCode::NOT_FOUND, "Link not found"));
    }
    store.relations.retain(|(link_id, _)| *link_id != id);
    Ok(StatusCode::NO_CONTENT)
}

async fn list_link_tags(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Vec<Tag>>> {
    let store = state.store.read().await;
    if store.link(&id).is_none() {
        return Err(error(StatusCode::NOT_FOUND, "Link not found"));
    }
    let tags: Vec<Tag> = store
        .tags
        .iter()
        .filter(|tag| store.relations.iter().any(|(l, t)| *l == id && *t == tag.id))
        .cloned()
        .collect();
    Ok(Json(tags))
}

async fn attach_tag(
    State(state): State<AppState>,
    Path((id, tag_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let mut store = state.store.write().await;
    if store.link(&id).is_none() || store.tag(&tag_id).is_none() {
        return Err(error(StatusCode::NOT_FOUND, "Not found"));
    }
    let relation = (id, tag_id);
    if !store.relations.contains(&relation) {
        if let Some(tag) = store.tag_mut(&relation.1) {
            tag.links_count += 1;
        }
        store.relations.push(relation);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn detach_tag(
    State(state): State<AppState>,
    Path((id, tag_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let mut store = state.store.write().await;
    let relation = (id, tag_id);
    let Some(index) = store.relations.iter().position(|r| *r == relation) else {
        return Err(error(StatusCode::NOT_FOUND, "Not found"));
    };
    store.relations.remove(index);
    if let Some(tag) = store.tag_mut(&relation.1) {
        tag.links_count = tag.links_count.saturating_sub(1);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_tags(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<Tag>> {
    let store = state.store.read().await;
    Json(page(store.tags.clone(), &query))
}

async fn create_tag(State(state): State<AppState>, Json(input): Json<TagInput>) -> ApiResult<Json<Tag>> {
    let name = input.name.unwrap_or_default();
    if name.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "code": 422,
                "message": "Validation failed",
                "errors": { "name": "The name field is required" }
            })),
        ));
    }
    let now = Utc::now();
    let tag = Tag {
        id: new_id(),
        name,
        color: input.color,
        created_at: now,
        updated_at: now,
        links_count: 0,
    };
    tracing::debug!(tag_id = %tag.id, "tag created");
    state.store.write().await.tags.push(tag.clone());
    Ok(Json(tag))
}

async fn get_tag(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Tag>> {
    let store = state.store.read().await;
    store
        .tag(&id)
        .map(|tag| Json(tag.clone()))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Tag not found"))
}

async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<TagInput>,
) -> ApiResult<Json<Tag>> {
    let mut store = state.store.write().await;
    let tag = store
        .tag_mut(&id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Tag not found"))?;
    if let Some(name) = input.name {
        tag.name = name;
    }
    if let Some(color) = input.color {
        tag.color = Some(color);
    }
    tag.updated_at = Utc::now();
    Ok(Json(tag.clone()))
}

async fn delete_tag(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let mut store = state.store.write().await;
    let before = store.tags.len();
    store.tags.retain(|tag| tag.id != id);
    if store.tags.len() == before {
        return Err(error(StatusCode::NOT_FOUND, "Tag not found"));
    }
    store.relations.retain(|(_, tag_id)| *tag_id != id);
    Ok(StatusCode::NO_CONTENT)
}

async fn list_tag_links(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<Link>>> {
    let store = state.store.read().await;
    if store.tag(&id).is_none() {
        return Err(error(StatusCode::NOT_FOUND, "Tag not found"));
    }
    let links: Vec<Link> = store
        .links
        .iter()
        .filter(|link| store.relations.iter().any(|(l, t)| *l == link.id && *t == id))
        .cloned()
        .collect();
    Ok(Json(page(links, &query)))
}

async fn get_account(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.read().await;
    Json(json!({
        "id": "user123abc",
        "username": "testuser",
        "email": "test@example.com",
        "fullName": "Test User",
        "avatarUrl": "https://secure.gravatar.com/avatar/abc123",
        "createdAt": "2023-01-01T10:00:00Z",
        "subscription": { "plan": "free", "status": "active" },
        "limits": { "links": 1000, "tags": 50 },
        "usage": { "links": store.links.len(), "tags": store.tags.len() }
    }))
}

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_PER_PAGE: usize = 30;
pub const MAX_PER_PAGE: usize = 100;

/// Id of a seeded public gist that is starred.
pub const STARRED_GIST_ID: &str = "aa5a315d61ae9438b18d";
/// Id of a seeded public gist that is not starred.
pub const UNSTARRED_GIST_ID: &str = "bb7c1f0e3d2a4b5c6d7e";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
    pub avatar_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GistFile {
    pub filename: String,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    pub language: Option<String>,
    pub raw_url: Option<String>,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Gist {
    pub id: String,
    pub description: Option<String>,
    pub html_url: String,
    pub created_at: String,
    pub updated_at: String,
    pub owner: Owner,
    pub files: BTreeMap<String, GistFile>,
}

#[derive(Deserialize)]
pub struct CreateGist {
    pub description: Option<String>,
    #[serde(default)]
    pub public: bool,
    pub files: BTreeMap<String, CreateGistFile>,
}

#[derive(Deserialize)]
pub struct CreateGistFile {
    pub content: String,
}

#[derive(Deserialize)]
pub struct Pagination {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

struct StoredGist {
    gist: Gist,
    public: bool,
    starred: bool,
}

/// Gists, newest first.
type Db = Arc<RwLock<Vec<StoredGist>>>;

#[derive(Clone)]
struct AppState {
    origin: Arc<str>,
    db: Db,
}

/// Router serving a GitHub-Gists-shaped API. `origin` is the scheme and
/// authority the server is reachable at; it prefixes every `raw_url`.
pub fn app(origin: &str) -> Router {
    let origin = origin.trim_end_matches('/');
    let state = AppState {
        origin: Arc::from(origin),
        db: Arc::new(RwLock::new(seed(origin))),
    };

    Router::new()
        .route("/gists", post(create_gist))
        .route("/gists/public", get(list_public_gists))
        .route("/gists/{id}", get(get_gist))
        .route("/gists/{id}/star", get(check_star))
        .route("/raw/{id}/{filename}", get(raw_file))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let origin = format!("http://{}", listener.local_addr()?);
    axum::serve(listener, app(&origin)).await
}

fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            message: "Not Found".to_string(),
        }),
    )
}

fn language_for(filename: &str) -> Option<String> {
    let language = match filename.rsplit_once('.')?.1 {
        "rs" => "Rust",
        "rb" => "Ruby",
        "swift" => "Swift",
        "md" => "Markdown",
        "py" => "Python",
        _ => return None,
    };
    Some(language.to_string())
}

fn build_gist(
    origin: &str,
    id: &str,
    description: Option<String>,
    timestamp: &str,
    files: BTreeMap<String, String>,
) -> Gist {
    let files = files
        .into_iter()
        .map(|(filename, content)| {
            let file = GistFile {
                raw_url: Some(format!("{origin}/raw/{id}/{filename}")),
                language: language_for(&filename),
                mime_type: Some("text/plain".to_string()),
                size: content.len() as u64,
                content: Some(content),
                filename: filename.clone(),
            };
            (filename, file)
        })
        .collect();
    Gist {
        id: id.to_string(),
        description,
        html_url: format!("https://gist.github.com/{id}"),
        created_at: timestamp.to_string(),
        updated_at: timestamp.to_string(),
        owner: Owner {
            login: "octocat".to_string(),
            avatar_url: "https://avatars.githubusercontent.com/u/583231?v=4".to_string(),
        },
        files,
    }
}

fn seed(origin: &str) -> Vec<StoredGist> {
    let newer = build_gist(
        origin,
        STARRED_GIST_ID,
        Some("Hello world in Ruby".to_string()),
        "2025-10-30T12:00:00Z",
        BTreeMap::from([("hello_world.rb".to_string(), "puts 'Hello, World!'\n".to_string())]),
    );
    let older = build_gist(
        origin,
        UNSTARRED_GIST_ID,
        None,
        "2025-10-29T08:15:00Z",
        BTreeMap::from([("notes.md".to_string(), "# Notes\n".to_string())]),
    );
    vec![
        StoredGist {
            gist: newer,
            public: true,
            starred: true,
        },
        StoredGist {
            gist: older,
            public: true,
            starred: false,
        },
    ]
}

/// List views omit file contents, like the real API.
fn summary(gist: &Gist) -> Gist {
    let mut gist = gist.clone();
    for file in gist.files.values_mut() {
        file.content = None;
    }
    gist
}

async fn list_public_gists(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Json<Vec<Gist>> {
    let page = pagination.page.unwrap_or(1).max(1);
    let per_page = pagination
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);

    let gists = state.db.read().await;
    Json(
        gists
            .iter()
            .filter(|stored| stored.public)
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .map(|stored| summary(&stored.gist))
            .collect(),
    )
}

async fn get_gist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Gist>, (StatusCode, Json<ErrorBody>)> {
    let gists = state.db.read().await;
    gists
        .iter()
        .find(|stored| stored.gist.id == id)
        .map(|stored| Json(stored.gist.clone()))
        .ok_or_else(not_found)
}

async fn create_gist(
    State(state): State<AppState>,
    Json(input): Json<CreateGist>,
) -> Result<(StatusCode, Json<Gist>), (StatusCode, Json<ErrorBody>)> {
    if input.files.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorBody {
                message: "Validation Failed".to_string(),
            }),
        ));
    }

    let id = Uuid::new_v4().simple().to_string();
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let files = input
        .files
        .into_iter()
        .map(|(name, file)| (name, file.content))
        .collect();
    let gist = build_gist(&state.origin, &id, input.description, &timestamp, files);
    tracing::debug!(%id, public = input.public, "created gist");

    state.db.write().await.insert(
        0,
        StoredGist {
            gist: gist.clone(),
            public: input.public,
            starred: false,
        },
    );
    Ok((StatusCode::CREATED, Json(gist)))
}

async fn check_star(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    let gists = state.db.read().await;
    match gists.iter().find(|stored| stored.gist.id == id) {
        Some(stored) if stored.starred => Ok(StatusCode::NO_CONTENT),
        _ => Err(not_found()),
    }
}

async fn raw_file(
    State(state): State<AppState>,
    Path((id, filename)): Path<(String, String)>,
) -> Result<String, (StatusCode, Json<ErrorBody>)> {
    let gists = state.db.read().await;
    gists
        .iter()
        .find(|stored| stored.gist.id == id)
        .and_then(|stored| stored.gist.files.get(&filename))
        .and_then(|file| file.content.clone())
        .ok_or_else(not_found)
}

//! JSON HTTP API.
//!
//! Serves the loaded corpus to a browser or any other presentation layer.
//! The server holds exactly one corpus generation at a time; `POST /reload`
//! builds the next generation completely before swapping it in, so
//! in-flight requests keep reading the generation they started with.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version and generation) |
//! | `GET`  | `/posts` | Filtered post summaries |
//! | `GET`  | `/posts/{index}` | One post with its content blocks |
//! | `GET`  | `/tags` | Tag universe with display labels |
//! | `POST` | `/reload` | Re-acquire the corpus |
//!
//! `GET /posts` accepts `title`, `author`, and comma-separated `models`,
//! `topics` and `assignments` query parameters.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "post not found: index 9" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `load_failed` (502).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use postdeck_core::corpus::CorpusStore;
use postdeck_core::models::Document;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tower_http::cors::{Any, CorsLayer};

use crate::acquire;
use crate::config::Config;
use crate::list::{list_posts, FilterInput};
use crate::show::view_document;
use crate::view::{DocumentView, PostSummary, TagsView};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    /// Current corpus generation. Handlers clone the inner `Arc` and release
    /// the lock before doing any work.
    corpus: Arc<RwLock<Arc<CorpusStore>>>,
}

impl AppState {
    pub fn new(config: Config, store: CorpusStore) -> Self {
        Self {
            config: Arc::new(config),
            corpus: Arc::new(RwLock::new(Arc::new(store))),
        }
    }

    fn current(&self) -> Arc<CorpusStore> {
        match self.corpus.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Install `documents` as the generation after whichever one is current
    /// when the write lock is taken. Returns the installed store.
    fn advance(&self, documents: Vec<Document>) -> Arc<CorpusStore> {
        let mut guard = match self.corpus.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = Arc::new(guard.successor(documents));
        *guard = next.clone();
        next
    }
}

/// Starts the HTTP server.
///
/// Loads the corpus once before binding; a load failure aborts startup.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store = acquire::load_corpus(config).await?;
    let bind_addr = config.server.bind.clone();
    let app = router(AppState::new(config.clone(), store));

    tracing::info!("postdeck server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the route table over `state`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/posts", get(handle_list_posts))
        .route("/posts/{index}", get(handle_get_post))
        .route("/tags", get(handle_tags))
        .route("/reload", post(handle_reload))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn load_failed(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_GATEWAY,
        code: "load_failed".to_string(),
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    generation: u64,
    posts: usize,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.current();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        generation: store.generation(),
        posts: store.len(),
    })
}

// ============ GET /posts ============

/// Query string for `GET /posts`. Facet lists are comma-separated ids.
#[derive(Debug, Default, Deserialize)]
struct PostsQuery {
    title: Option<String>,
    author: Option<String>,
    models: Option<String>,
    topics: Option<String>,
    assignments: Option<String>,
}

impl PostsQuery {
    fn into_input(self) -> FilterInput {
        FilterInput {
            title: self.title,
            author: self.author,
            models: split_ids(self.models),
            topics: split_ids(self.topics),
            assignments: split_ids(self.assignments),
        }
    }
}

fn split_ids(raw: Option<String>) -> Vec<String> {
    raw.map(|s| s.split(',').map(str::to_string).collect())
        .unwrap_or_default()
}

#[derive(Serialize)]
struct PostsResponse {
    total: usize,
    posts: Vec<PostSummary>,
}

async fn handle_list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostsQuery>,
) -> Json<PostsResponse> {
    let store = state.current();
    let criteria = query.into_input().to_criteria();
    Json(PostsResponse {
        total: store.len(),
        posts: list_posts(&store, &criteria, &state.config.display.date_format),
    })
}

// ============ GET /posts/{index} ============

async fn handle_get_post(
    State(state): State<AppState>,
    Path(index): Path<String>,
) -> Result<Json<DocumentView>, AppError> {
    let index: usize = index
        .parse()
        .map_err(|_| bad_request(format!("invalid post index: {}", index)))?;
    let store = state.current();
    view_document(&store, index, &state.config.display.date_format)
        .map(Json)
        .map_err(|e| not_found(e.to_string()))
}

// ============ GET /tags ============

async fn handle_tags(State(state): State<AppState>) -> Json<TagsView> {
    let store = state.current();
    Json(TagsView::new(store.tag_universe()))
}

// ============ POST /reload ============

#[derive(Debug, Serialize)]
struct ReloadResponse {
    generation: u64,
    posts: usize,
}

/// Re-acquires the corpus. On failure the previous generation stays
/// installed and the failure is reported once.
async fn handle_reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, AppError> {
    let documents = acquire::fetch_documents(&state.config).await.map_err(|e| {
        let message = format!("{:#}", e);
        tracing::warn!(error = %message, "corpus reload failed; keeping previous generation");
        load_failed(message)
    })?;

    let next = state.advance(documents);
    let response = ReloadResponse {
        generation: next.generation(),
        posts: next.len(),
    };
    tracing::info!(generation = response.generation, posts = response.posts, "corpus reloaded");
    Ok(Json(response))
}

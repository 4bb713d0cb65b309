use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use parking_lot::RwLock;
use recommender_core::source::load_movies;
use recommender_core::{EngineConfig, GenreFilter, MovieRecord, Recommender};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct RecommendParams {
    pub title: String,
    #[serde(default = "default_k")]
    pub k: usize,
    /// Comma-separated genre tokens
    #[serde(default)]
    pub genres: Option<String>,
}

#[derive(Deserialize)]
pub struct GenreParams {
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_k() -> usize { 10 }

fn clamp_k(k: usize) -> usize { k.clamp(1, 100) }

#[derive(Serialize)]
pub struct RecommendResponse {
    pub query: String,
    pub found: bool,
    pub took_s: f64,
    pub results: Vec<MovieHit>,
}

#[derive(Serialize)]
pub struct MovieHit {
    pub row: usize,
    pub title: String,
    pub title_clean: String,
    pub year: Option<String>,
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    pub external_id: Option<String>,
    /// IMDb-style key ("tt" + 7 digits) for poster lookups downstream.
    pub imdb_ref: Option<String>,
}

impl MovieHit {
    fn new(row: usize, movie: &MovieRecord, score: Option<f32>) -> Self {
        Self {
            row,
            title: movie.title.clone(),
            title_clean: movie.title_clean.clone(),
            year: movie.year.clone(),
            genres: movie.genre_tokens().map(str::to_string).collect(),
            score,
            external_id: movie.external_id.clone(),
            imdb_ref: movie.external_id.as_deref().and_then(imdb_ref),
        }
    }
}

/// Ids often come through spreadsheets as "114709.0".
pub fn imdb_ref(external_id: &str) -> Option<String> {
    let n: f64 = external_id.trim().parse().ok()?;
    if !n.is_finite() || n < 0.0 {
        return None;
    }
    Some(format!("tt{:07}", n as u64))
}

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    /// Swapped whole on reload; queries clone the inner Arc and release the lock.
    pub engine: Arc<RwLock<Arc<Recommender>>>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn load(data_path: impl Into<PathBuf>, config: EngineConfig, admin_token: Option<String>) -> Result<Self> {
        let data_path = data_path.into();
        let engine = build_engine(&data_path, config)?;
        Ok(Self { data_path, engine: Arc::new(RwLock::new(Arc::new(engine))), admin_token })
    }

    fn current(&self) -> Arc<Recommender> { self.engine.read().clone() }
}

fn build_engine(data_path: &std::path::Path, config: EngineConfig) -> Result<Recommender> {
    let raw = load_movies(data_path)?;
    let engine = Recommender::build(raw, config)?;
    tracing::info!(data = %data_path.display(), movies = engine.corpus().len(), terms = engine.space().num_terms(), "engine built");
    Ok(engine)
}

pub fn build_app(data_path: String, config: EngineConfig) -> Result<Router> {
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let state = AppState::load(data_path, config, admin_token)?;

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Ok(router(state).layer(cors))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/recommend", get(recommend_handler))
        .route("/by-genres", get(by_genres_handler))
        .route("/genres", get(genres_handler))
        .route("/movie/:row", get(movie_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn parse_genres(raw: Option<&str>) -> GenreFilter {
    GenreFilter::new(raw.unwrap_or("").split(','))
}

pub async fn recommend_handler(State(state): State<AppState>, Query(params): Query<RecommendParams>) -> Json<RecommendResponse> {
    let start = std::time::Instant::now();
    let engine = state.current();
    let filter = parse_genres(params.genres.as_deref());
    let found = engine.corpus().find_title(&params.title).is_some();
    let results = engine
        .similar_to(&params.title, clamp_k(params.k), Some(&filter))
        .into_iter()
        .map(|r| MovieHit::new(r.row, r.movie, Some(r.score)))
        .collect();
    Json(RecommendResponse { query: params.title, found, took_s: start.elapsed().as_secs_f64(), results })
}

pub async fn by_genres_handler(State(state): State<AppState>, Query(params): Query<GenreParams>) -> Json<Vec<MovieHit>> {
    let engine = state.current();
    let filter = parse_genres(params.genres.as_deref());
    let hits = engine
        .by_genres(&filter, clamp_k(params.k))
        .into_iter()
        .map(|(row, m)| MovieHit::new(row, m, None))
        .collect();
    Json(hits)
}

pub async fn genres_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.current().corpus().genre_vocabulary())
}

pub async fn movie_handler(State(state): State<AppState>, Path(row): Path<usize>) -> Result<Json<MovieHit>, (StatusCode, String)> {
    let engine = state.current();
    match engine.corpus().get(row) {
        Some(movie) => Ok(Json(MovieHit::new(row, movie, None))),
        None => Err((StatusCode::NOT_FOUND, "not found".into())),
    }
}

async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let config = state.current().config().clone();
    let path = state.data_path.clone();
    let rebuilt = tokio::task::spawn_blocking(move || build_engine(&path, config))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            tracing::warn!(error = %e, "reload failed, keeping current engine");
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        })?;
    let body = serde_json::json!({ "movies": rebuilt.corpus().len(), "terms": rebuilt.space().num_terms() });
    *state.engine.write() = Arc::new(rebuilt);
    Ok(Json(body))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

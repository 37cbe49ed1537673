use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use mushaf_core::display::{revelation_label, HeaderInfo};
use mushaf_core::{
    Bookmark, DivisionIndexEntry, MushafError, PageLocation, PageRecord, PageView, ReaderConfig,
    ReaderState, SearchOutcome, BookmarkStore, MAX_SEARCH_RESULTS, TOTAL_PAGES,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

struct AppState {
    reader: ReaderState,
    config: ReaderConfig,
}

// === Request/Response types ===

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
    limit: Option<usize>,
    offset: Option<usize>,
}

#[derive(Deserialize)]
struct ResolveQuery {
    page: u32,
}

#[derive(Deserialize)]
struct PageBody {
    page: u32,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    loaded: bool,
    chapters: usize,
    verses: usize,
    skipped_verses: usize,
}

#[derive(Serialize)]
struct ChapterListing {
    id: u32,
    name: String,
    alt_name: String,
    revelation: &'static str,
    verse_count: usize,
    start_page: u32,
    end_page: u32,
}

#[derive(Serialize)]
struct ResolveResponse {
    #[serde(flatten)]
    location: PageLocation,
    header: HeaderInfo,
}

#[derive(Serialize)]
struct LastPageResponse {
    page: u32,
}

#[derive(Serialize)]
struct ReloadResponse {
    loaded: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(e: MushafError) -> ApiError {
    let status = match &e {
        MushafError::InvalidPage(_) => StatusCode::BAD_REQUEST,
        MushafError::NotFound(_) => StatusCode::NOT_FOUND,
        MushafError::CorpusNotReady(_) | MushafError::DataLoad(_) => StatusCode::SERVICE_UNAVAILABLE,
        MushafError::Database(_) | MushafError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let catalog = state.reader.catalog();
    Json(HealthResponse {
        status: "ok".to_string(),
        loaded: catalog.is_some(),
        chapters: catalog.as_ref().map(|c| c.corpus.chapters().len()).unwrap_or(0),
        verses: catalog.as_ref().map(|c| c.corpus.verse_count()).unwrap_or(0),
        skipped_verses: catalog.as_ref().map(|c| c.corpus.skipped_verses()).unwrap_or(0),
    })
}

async fn list_chapters(State(state): State<Arc<AppState>>) -> Json<Vec<ChapterListing>> {
    let chapters = state
        .reader
        .catalog()
        .map(|catalog| {
            catalog
                .indices
                .chapters()
                .iter()
                .map(|c| ChapterListing {
                    id: c.id,
                    name: c.name.clone(),
                    alt_name: c.alt_name.clone(),
                    revelation: revelation_label(c.revelation_place),
                    verse_count: c.verse_count,
                    start_page: c.start_page,
                    end_page: c.end_page,
                })
                .collect()
        })
        .unwrap_or_default();
    Json(chapters)
}

async fn list_divisions(State(state): State<Arc<AppState>>) -> Json<Vec<DivisionIndexEntry>> {
    let divisions = state
        .reader
        .catalog()
        .map(|catalog| catalog.indices.divisions().to_vec())
        .unwrap_or_default();
    Json(divisions)
}

async fn list_pages(State(state): State<Arc<AppState>>) -> Json<Vec<PageRecord>> {
    let pages = match state.reader.catalog() {
        Some(catalog) => catalog.indices.pages().to_vec(),
        // page numbers alone are enough to navigate before the corpus loads
        None => (1..=TOTAL_PAGES)
            .map(|page| PageRecord { page, chapters: Vec::new(), division: None })
            .collect(),
    };
    Json(pages)
}

async fn get_page(
    State(state): State<Arc<AppState>>,
    Path(page): Path<u32>,
) -> Result<Json<PageView>, ApiError> {
    state.reader.page_view(page).map(Json).map_err(api_error)
}

async fn resolve_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResolveQuery>,
) -> Json<ResolveResponse> {
    Json(ResolveResponse {
        location: state.reader.locate(params.page),
        header: state.reader.header(params.page),
    })
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchOutcome>, ApiError> {
    let limit = params.limit.unwrap_or(MAX_SEARCH_RESULTS).min(MAX_SEARCH_RESULTS);
    let offset = params.offset.unwrap_or(0);

    state.reader.search(&params.q, offset, limit).map(Json).map_err(api_error)
}

async fn list_bookmarks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Bookmark>>, ApiError> {
    state.reader.bookmarks.list_bookmarks().map(Json).map_err(api_error)
}

async fn add_bookmark(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PageBody>,
) -> Result<Json<Bookmark>, ApiError> {
    state.reader.bookmark_page(body.page).map(Json).map_err(api_error)
}

async fn remove_bookmark(
    State(state): State<Arc<AppState>>,
    Path(page): Path<u32>,
) -> Result<StatusCode, ApiError> {
    match state.reader.bookmarks.remove_bookmark(page) {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(api_error(MushafError::NotFound(format!("bookmark for page {}", page)))),
        Err(e) => Err(api_error(e)),
    }
}

async fn get_last_page(State(state): State<Arc<AppState>>) -> Result<Json<LastPageResponse>, ApiError> {
    state
        .reader
        .bookmarks
        .last_page()
        .map(|page| Json(LastPageResponse { page }))
        .map_err(api_error)
}

async fn set_last_page(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PageBody>,
) -> Result<Json<LastPageResponse>, ApiError> {
    state
        .reader
        .bookmarks
        .set_last_page(body.page)
        .map(|_| Json(LastPageResponse { page: body.page }))
        .map_err(api_error)
}

async fn reload(State(state): State<Arc<AppState>>) -> Result<Json<ReloadResponse>, ApiError> {
    state
        .reader
        .load(&state.config.corpus_source, state.config.corpus_sha256.as_deref())
        .await
        .map(|_| Json(ReloadResponse { loaded: true }))
        .map_err(|e| api_error(e.into()))
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/chapters", get(list_chapters))
        .route("/divisions", get(list_divisions))
        .route("/pages", get(list_pages))
        .route("/pages/:page", get(get_page))
        .route("/resolve", get(resolve_page))
        .route("/search", get(search))
        .route("/bookmarks", get(list_bookmarks).post(add_bookmark))
        .route("/bookmarks/:page", delete(remove_bookmark))
        .route("/last-page", get(get_last_page).put(set_last_page))
        .route("/reload", post(reload))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ReaderConfig::from_env()?;
    tracing::info!(data_dir = %config.data_dir.display(), source = %config.corpus_source, "starting reader");

    let bookmarks = BookmarkStore::open(config.settings_db_path.clone())?;
    let bind_addr = config.bind_addr;
    let state = Arc::new(AppState {
        reader: ReaderState::new(bookmarks),
        config,
    });

    // Serve immediately; requests before the corpus lands get bootstrap/degraded answers
    let loader = Arc::clone(&state);
    tokio::spawn(async move {
        let config = &loader.config;
        if loader.reader.load(&config.corpus_source, config.corpus_sha256.as_deref()).await.is_err() {
            tracing::warn!("serving without corpus; chapter names and search are unavailable");
        }
    });

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

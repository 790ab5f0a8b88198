//! # API REST
//!
//! REST API implementation for Zenpic.
//!
//! Handles:
//! - HTTP endpoints with axum for the photo and music libraries
//! - OpenAPI/Swagger documentation
//! - Prometheus request metrics on `/metrics`
//! - REST-specific concerns (JSON shapes, multipart parsing, CORS, request tracing)
//!
//! Core operations are synchronous filesystem work and run on tokio's blocking pool.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod metrics;

use std::sync::Arc;

use api_shared::{
    ConditionEntriesRes, EntryRes, EntryType, ErrorRes, HealthRes, HealthService,
    ListCollectionsRes, ListEntriesRes, UploadFailureRes, UploadRes, UploadSummaryRes,
};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::header,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;
use zenpic_core::{
    CoreConfig, CoreError, CoreResult, Entry, EntryKind, Library, LibraryService, UploadPayload,
    UploadSummary, UploadedFile,
};

pub use error::ApiError;
pub use metrics::HttpMetrics;

/// Application state for the REST API server
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<CoreConfig>,
    metrics: HttpMetrics,
}

impl AppState {
    pub fn new(cfg: Arc<CoreConfig>, metrics: HttpMetrics) -> Self {
        Self { cfg, metrics }
    }

    fn library(&self, library: Library) -> LibraryService {
        LibraryService::for_library(&self.cfg, library)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        metrics_exposition,
        list_collections,
        list_music_collections,
        list_weather_collection,
        list_entries,
        list_music_entries,
        fetch_file,
        fetch_music_file,
        upload_photos,
        upload_music,
    ),
    components(schemas(
        HealthRes,
        EntryRes,
        EntryType,
        ListCollectionsRes,
        ListEntriesRes,
        ConditionEntriesRes,
        UploadRes,
        UploadSummaryRes,
        UploadFailureRes,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConditionQuery {
    /// One of `sun`, `cloud`, `rain`, `snow`
    condition: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResizeQuery {
    /// Maximum width in pixels; requires `height`
    width: Option<String>,
    /// Maximum height in pixels; requires `width`
    height: Option<String>,
}

/// Builds the REST router.
///
/// # Arguments
/// * `cfg` - Resolved core configuration (storage roots)
/// * `max_upload_bytes` - Request body limit applied to every route
/// * `metrics` - Request metrics, recorded for every route and served on `/metrics`
pub fn router(cfg: Arc<CoreConfig>, max_upload_bytes: usize, metrics: HttpMetrics) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_exposition))
        .route("/collections", get(list_collections))
        .route("/collections-music", get(list_music_collections))
        .route("/weathercollections", get(list_weather_collection))
        .route("/collections/:collection_id", get(list_entries))
        .route("/collections-music/:collection_id", get(list_music_entries))
        .route("/collections/:collection_id/:file_id", get(fetch_file))
        .route("/collections-music/:collection_id/:file_id", get(fetch_music_file))
        .route("/upload-photos/:collection_id", post(upload_photos))
        .route("/upload-music/:collection_id", post(upload_music))
        .route_layer(middleware::from_fn_with_state(
            metrics.clone(),
            metrics::track_requests,
        ))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(cfg, metrics))
}

/// Runs a core operation on the blocking pool.
async fn run_blocking<T, F>(op: F) -> Result<T, ApiError>
where
    F: FnOnce() -> CoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| CoreError::Internal(format!("blocking task failed: {}", e)))?
        .map_err(ApiError::from)
}

fn entry_res(entry: Entry) -> EntryRes {
    EntryRes {
        name: entry.name,
        entry_type: match entry.kind {
            EntryKind::File => EntryType::File,
            EntryKind::Directory => EntryType::Directory,
        },
    }
}

pub(crate) fn summary_res(summary: UploadSummary) -> UploadSummaryRes {
    UploadSummaryRes {
        name: summary.name,
        mimetype: summary.mimetype,
        size: summary.size,
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Prometheus text exposition", body = String, content_type = "text/plain")
    )
)]
/// Request counters, latency histograms and process metrics
#[axum::debug_handler]
async fn metrics_exposition(State(state): State<AppState>) -> Result<Response, ApiError> {
    let (content_type, body) = state.metrics.render()?;
    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

async fn collections_in(
    state: AppState,
    library: Library,
) -> Result<Json<ListCollectionsRes>, ApiError> {
    let service = state.library(library);
    tracing::info!("collections query {}", service.storage_root().display());

    let entries = run_blocking(move || service.list_collections()).await?;
    Ok(Json(ListCollectionsRes {
        dirs: entries.into_iter().map(entry_res).collect(),
    }))
}

async fn entries_in(
    state: AppState,
    library: Library,
    collection_id: String,
) -> Result<Json<ListEntriesRes>, ApiError> {
    let service = state.library(library);
    tracing::info!(collection = %collection_id, ?library, "entries query");

    let entries = run_blocking(move || service.list_entries(&collection_id)).await?;
    Ok(Json(ListEntriesRes {
        result: entries.into_iter().map(entry_res).collect(),
    }))
}

async fn fetch_in(
    state: AppState,
    library: Library,
    collection_id: String,
    file_id: String,
    query: ResizeQuery,
) -> Result<Response, ApiError> {
    let service = state.library(library);
    tracing::debug!(
        collection = %collection_id,
        file = %file_id,
        width = ?query.width,
        height = ?query.height,
        "fetch"
    );

    let fetched = run_blocking(move || {
        service.fetch(
            &collection_id,
            &file_id,
            query.width.as_deref(),
            query.height.as_deref(),
        )
    })
    .await?;

    Ok(([(header::CONTENT_TYPE, fetched.media_type)], fetched.bytes).into_response())
}

/// Collects every file part of a multipart body.
///
/// One part becomes `UploadPayload::Single`, several `UploadPayload::Multiple`. Parts without
/// a filename are form fields and are skipped, as are parts with an empty filename (an
/// empty file input in a browser form).
async fn read_upload_payload(mut multipart: Multipart) -> Result<Option<UploadPayload>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
        else {
            continue;
        };
        let mimetype = field.content_type().unwrap_or_default().to_owned();
        let bytes = field.bytes().await?;
        files.push(UploadedFile::new(name, mimetype, bytes.to_vec()));
    }

    Ok(UploadPayload::from_files(files))
}

async fn upload_in(
    state: AppState,
    library: Library,
    collection_id: String,
    multipart: Multipart,
) -> Result<Json<UploadRes>, ApiError> {
    let payload = read_upload_payload(multipart).await?;
    let service = state.library(library);
    tracing::info!(
        collection = %collection_id,
        ?library,
        files = payload.as_ref().map_or(0, UploadPayload::len),
        "upload"
    );

    let summaries = run_blocking(move || service.upload(&collection_id, payload)).await?;
    Ok(Json(UploadRes {
        status: true,
        message: "Files are uploaded".into(),
        data: summaries.into_iter().map(summary_res).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/collections",
    responses(
        (status = 200, description = "Photo collections", body = ListCollectionsRes),
        (status = 404, description = "Storage root missing", body = ErrorRes)
    )
)]
/// List every photo collection
#[axum::debug_handler]
async fn list_collections(
    State(state): State<AppState>,
) -> Result<Json<ListCollectionsRes>, ApiError> {
    collections_in(state, Library::Photos).await
}

#[utoipa::path(
    get,
    path = "/collections-music",
    responses(
        (status = 200, description = "Music collections", body = ListCollectionsRes),
        (status = 404, description = "Storage root missing", body = ErrorRes)
    )
)]
/// List every music collection
#[axum::debug_handler]
async fn list_music_collections(
    State(state): State<AppState>,
) -> Result<Json<ListCollectionsRes>, ApiError> {
    collections_in(state, Library::Music).await
}

#[utoipa::path(
    get,
    path = "/weathercollections",
    params(ConditionQuery),
    responses(
        (status = 200, description = "Entries of the collection for a weather condition", body = ConditionEntriesRes),
        (status = 400, description = "Missing or unknown condition", body = ErrorRes),
        (status = 404, description = "Mapped collection missing", body = ErrorRes)
    )
)]
/// List the photo collection matching a weather condition
///
/// `sun`, `cloud`, `rain` and `snow` map to "Sunny Day", "Cloudy Day", "Rainy Day" and
/// "Snow Day".
#[axum::debug_handler]
async fn list_weather_collection(
    State(state): State<AppState>,
    Query(query): Query<ConditionQuery>,
) -> Result<Json<ConditionEntriesRes>, ApiError> {
    let service = state.library(Library::Photos);
    tracing::info!(condition = ?query.condition, "weather collection query");

    let listing = run_blocking(move || service.list_by_condition(query.condition.as_deref())).await?;
    Ok(Json(ConditionEntriesRes {
        result: listing.entries.into_iter().map(entry_res).collect(),
        collection: listing.collection.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/collections/{collection_id}",
    params(("collection_id" = String, Path, description = "Collection name")),
    responses(
        (status = 200, description = "Entries of a photo collection", body = ListEntriesRes),
        (status = 400, description = "Invalid collection name", body = ErrorRes),
        (status = 404, description = "Collection not found", body = ErrorRes)
    )
)]
/// List the entries of a photo collection
#[axum::debug_handler]
async fn list_entries(
    State(state): State<AppState>,
    Path(collection_id): Path<String>,
) -> Result<Json<ListEntriesRes>, ApiError> {
    entries_in(state, Library::Photos, collection_id).await
}

#[utoipa::path(
    get,
    path = "/collections-music/{collection_id}",
    params(("collection_id" = String, Path, description = "Collection name")),
    responses(
        (status = 200, description = "Entries of a music collection", body = ListEntriesRes),
        (status = 400, description = "Invalid collection name", body = ErrorRes),
        (status = 404, description = "Collection not found", body = ErrorRes)
    )
)]
/// List the entries of a music collection
#[axum::debug_handler]
async fn list_music_entries(
    State(state): State<AppState>,
    Path(collection_id): Path<String>,
) -> Result<Json<ListEntriesRes>, ApiError> {
    entries_in(state, Library::Music, collection_id).await
}

#[utoipa::path(
    get,
    path = "/collections/{collection_id}/{file_id}",
    params(
        ("collection_id" = String, Path, description = "Collection name"),
        ("file_id" = String, Path, description = "File name"),
        ResizeQuery
    ),
    responses(
        (status = 200, description = "Raw or resized file bytes"),
        (status = 400, description = "Invalid name or dimensions", body = ErrorRes),
        (status = 404, description = "File not found", body = ErrorRes),
        (status = 422, description = "File is not a decodable image", body = ErrorRes)
    )
)]
/// Fetch a photo, optionally resized to fit inside `width` x `height`
#[axum::debug_handler]
async fn fetch_file(
    State(state): State<AppState>,
    Path((collection_id, file_id)): Path<(String, String)>,
    Query(query): Query<ResizeQuery>,
) -> Result<Response, ApiError> {
    fetch_in(state, Library::Photos, collection_id, file_id, query).await
}

#[utoipa::path(
    get,
    path = "/collections-music/{collection_id}/{file_id}",
    params(
        ("collection_id" = String, Path, description = "Collection name"),
        ("file_id" = String, Path, description = "File name"),
        ResizeQuery
    ),
    responses(
        (status = 200, description = "Raw file bytes"),
        (status = 400, description = "Invalid name or dimensions", body = ErrorRes),
        (status = 404, description = "File not found", body = ErrorRes)
    )
)]
/// Fetch a file from the music library
#[axum::debug_handler]
async fn fetch_music_file(
    State(state): State<AppState>,
    Path((collection_id, file_id)): Path<(String, String)>,
    Query(query): Query<ResizeQuery>,
) -> Result<Response, ApiError> {
    fetch_in(state, Library::Music, collection_id, file_id, query).await
}

#[utoipa::path(
    post,
    path = "/upload-photos/{collection_id}",
    params(("collection_id" = String, Path, description = "Target collection, created if absent")),
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "One or more file parts, conventionally named `files`"),
    responses(
        (status = 200, description = "Files stored", body = UploadRes),
        (status = 400, description = "No files or invalid names", body = ErrorRes),
        (status = 500, description = "Some files could not be written", body = ErrorRes)
    )
)]
/// Upload one or more photos into a collection
///
/// Existing files with the same name are replaced.
#[axum::debug_handler]
async fn upload_photos(
    State(state): State<AppState>,
    Path(collection_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<UploadRes>, ApiError> {
    upload_in(state, Library::Photos, collection_id, multipart).await
}

#[utoipa::path(
    post,
    path = "/upload-music/{collection_id}",
    params(("collection_id" = String, Path, description = "Target collection, created if absent")),
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "One or more file parts, conventionally named `files`"),
    responses(
        (status = 200, description = "Files stored", body = UploadRes),
        (status = 400, description = "No files or invalid names", body = ErrorRes),
        (status = 500, description = "Some files could not be written", body = ErrorRes)
    )
)]
/// Upload one or more music files into a collection
#[axum::debug_handler]
async fn upload_music(
    State(state): State<AppState>,
    Path(collection_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<UploadRes>, ApiError> {
    upload_in(state, Library::Music, collection_id, multipart).await
}

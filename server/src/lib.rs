use anyhow::Result;
use axum::{extract::{rejection::QueryRejection, Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use catalog::{Catalog, CatalogSummary, Course, IndexOptions, QueryForm, RankedCourse, Recommendation};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

#[derive(Serialize)]
pub struct RecommendResponse {
    pub keyword: String,
    pub max_duration_hours: f64,
    pub took_s: f64,
    /// One of `needs_keyword`, `no_matches` or `results`.
    pub status: &'static str,
    pub message: Option<&'static str>,
    pub results: Vec<RankedCourse>,
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
}

/// Load the catalog at `path` and build the router over it.
pub fn build_app(path: &str, options: IndexOptions) -> Result<Router> {
    let catalog = Catalog::open(path, options)?;
    Ok(router(Arc::new(catalog)))
}

pub fn router(catalog: Arc<Catalog>) -> Router {
    let app_state = AppState { catalog };

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

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/recommend", get(recommend_handler))
        .route("/catalog", get(catalog_handler))
        .route("/course/:id", get(course_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn recommend_handler(
    State(state): State<AppState>,
    form: Result<Query<QueryForm>, QueryRejection>,
) -> Result<Json<RecommendResponse>, (StatusCode, Json<ErrorResponse>)> {
    let start = std::time::Instant::now();
    let Query(form) = form.map_err(|e| bad_request(e.body_text()))?;
    let keyword = form.keyword.clone();
    let max_duration_hours = form.max_duration_hours();

    let recommendation = state
        .catalog
        .recommend_form(form)
        .map_err(|e| bad_request(e.to_string()))?;
    let message = recommendation.message();
    let (status, results) = match recommendation {
        Recommendation::NeedsKeyword => ("needs_keyword", Vec::new()),
        Recommendation::NoMatches => ("no_matches", Vec::new()),
        Recommendation::Results(results) => ("results", results),
    };
    let elapsed = start.elapsed();
    tracing::info!(keyword = %keyword, status, hits = results.len(), took_s = elapsed.as_secs_f64(), "recommend");

    Ok(Json(RecommendResponse {
        keyword,
        max_duration_hours,
        took_s: elapsed.as_secs_f64(),
        status,
        message,
        results,
        warnings: state.catalog.schema().skipped_filters(),
    }))
}

fn bad_request(error: String) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

pub async fn catalog_handler(State(state): State<AppState>) -> Json<CatalogSummary> {
    Json(state.catalog.summary())
}

pub async fn course_handler(
    State(state): State<AppState>,
    Path(id): Path<usize>,
) -> Result<Json<Course>, (StatusCode, Json<ErrorResponse>)> {
    match state.catalog.course(id) {
        Some(course) => Ok(Json(course.clone())),
        None => Err((StatusCode::NOT_FOUND, Json(ErrorResponse { error: "not found".into() }))),
    }
}

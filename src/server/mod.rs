//! HTTP service: report uploads and comparison-table rendering.

use crate::config::Config;
use crate::ingest::ingest;
use crate::metrics;
use crate::report::ReportDocument;
use crate::store::{Store, StoreError, SystemInfo};
use crate::table::{ReportTable, RunTable, Table};
use axum::Json;
use axum::Router;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use chrono::NaiveDateTime;
use http::StatusCode;
use http::header;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::decompression::RequestDecompressionLayer;
use tracing::{debug, info};

pub struct AppState {
    pub store: Store,
    pub config: Config,
}

/// Build the API router.
pub fn app(state: Arc<AppState>) -> Router {
    let max_body = state.config.limits.max_report_bytes;

    Router::new()
        .route("/api/systems", get(list_systems).post(register_system))
        .route("/api/systems/{name}", put(update_system))
        .route(
            "/api/systems/{name}/reports",
            get(list_reports).post(upload_report),
        )
        .route("/api/systems/{name}/reports/{id}", get(report_document))
        .route("/api/systems/{name}/reports/{id}/runs", get(run_table))
        .route("/api/systems/{name}/table", get(report_table))
        .route("/api/overview", get(overview))
        .route("/metrics", get(metrics_exposition))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(RequestDecompressionLayer::new())
                .layer(CompressionLayer::new())
                .layer(DefaultBodyLimit::max(max_body)),
        )
}

/// Run the service until interrupted.
pub fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("perfhub-server")
        .build()?;

    ctrlc::set_handler(move || {
        std::process::exit(0);
    })?;

    let listen = config.server.listen;
    let state = Arc::new(AppState {
        store: Store::new(),
        config,
    });
    let app = app(state);

    rt.block_on(async move {
        let listener = TcpListener::bind(listen).await?;
        info!("perfhub listening on {}", listener.local_addr()?);
        axum::serve(listener, app).await
    })?;

    Ok(())
}

fn store_error(e: StoreError) -> Response {
    let status = match &e {
        StoreError::UnknownSystem(_) | StoreError::UnknownReport(..) => StatusCode::NOT_FOUND,
        StoreError::DuplicateSystem(_) => StatusCode::CONFLICT,
        StoreError::EmptyName => StatusCode::BAD_REQUEST,
    };
    (status, e.to_string()).into_response()
}

#[derive(Serialize)]
struct SystemSummary {
    #[serde(flatten)]
    info: SystemInfo,
    reports: usize,
}

async fn list_systems(State(state): State<Arc<AppState>>) -> Json<Vec<SystemSummary>> {
    let systems = state
        .store
        .list_systems()
        .into_iter()
        .map(|(info, reports)| SystemSummary { info, reports })
        .collect();
    Json(systems)
}

async fn register_system(
    State(state): State<Arc<AppState>>,
    Json(info): Json<SystemInfo>,
) -> Response {
    let name = info.name.clone();
    match state.store.register_system(info) {
        Ok(()) => {
            metrics::SYSTEMS_REGISTERED.increment();
            info!(system = %name, "system registered");
            StatusCode::CREATED.into_response()
        }
        Err(e) => store_error(e),
    }
}

async fn update_system(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(info): Json<SystemInfo>,
) -> Response {
    match state.store.update_system(&name, info) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => store_error(e),
    }
}

#[derive(Serialize)]
struct UploadResponse {
    id: u64,
    date: NaiveDateTime,
}

async fn upload_report(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: String,
) -> Response {
    let size = body.len();
    let ingested = match ingest(&body) {
        Ok(ingested) => ingested,
        Err(e) => {
            metrics::REPORTS_REJECTED.increment();
            debug!(system = %name, error = %e, "report rejected");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    match state.store.insert_report(&name, ingested) {
        Ok(report) => {
            metrics::REPORTS_RECEIVED.increment();
            let _ = metrics::REPORT_SIZE_BYTES.increment(size as u64);
            info!(system = %name, id = report.id, "report stored");
            (
                StatusCode::CREATED,
                Json(UploadResponse {
                    id: report.id,
                    date: report.date,
                }),
            )
                .into_response()
        }
        Err(e) => store_error(e),
    }
}

#[derive(Serialize)]
struct ReportSummary {
    id: u64,
    date: NaiveDateTime,
}

async fn list_reports(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    match state.store.list_reports(&name) {
        Ok(reports) => Json(
            reports
                .into_iter()
                .map(|(id, date)| ReportSummary { id, date })
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => store_error(e),
    }
}

async fn report_document(
    State(state): State<Arc<AppState>>,
    Path((name, id)): Path<(String, u64)>,
) -> Response {
    match state.store.get_report(&name, id) {
        Ok(report) => (
            [(header::CONTENT_TYPE, "application/json")],
            report.raw.clone(),
        )
            .into_response(),
        Err(e) => store_error(e),
    }
}

async fn run_table(
    State(state): State<Arc<AppState>>,
    Path((name, id)): Path<(String, u64)>,
) -> Response {
    let report = match state.store.get_report(&name, id) {
        Ok(report) => report,
        Err(e) => return store_error(e),
    };

    // The stored document was validated at ingest time
    let doc = match ReportDocument::parse(&report.raw) {
        Ok(doc) => doc,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("stored report {id} unreadable: {e}"),
            )
                .into_response();
        }
    };

    metrics::TABLES_RENDERED.increment();
    Json(RunTable::new(&doc).build()).into_response()
}

#[derive(Deserialize)]
struct TableQuery {
    limit: Option<usize>,
}

async fn report_table(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<TableQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(state.config.limits.table_reports);
    let reports = match state.store.recent_reports(&name, limit) {
        Ok(reports) => reports,
        Err(e) => return store_error(e),
    };

    let mut table = ReportTable::new();
    for report in reports {
        let column = report.date.format("%y-%m-%d").to_string();
        let link = format!("/api/systems/{name}/reports/{}", report.id);
        table.add_report(report, column, Some(link));
    }

    metrics::TABLES_RENDERED.increment();
    Json(table.build()).into_response()
}

async fn overview(State(state): State<Arc<AppState>>) -> Json<Table> {
    let latest = state
        .store
        .overview_reports(state.config.limits.overview_systems);

    let mut table = ReportTable::new();
    for (system, report) in latest {
        let link = format!("/api/systems/{system}/table");
        table.add_report(report, system, Some(link));
    }

    metrics::TABLES_RENDERED.increment();
    Json(table.build())
}

async fn metrics_exposition() -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::prometheus_exposition(),
    )
}

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use handlebars::{Handlebars, TemplateError};
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::config::AppConfig;
use crate::downloader::{ExportError, drill_down, export_filtered};
use crate::filter::{ALL_SENTINEL, Metrics, RegionSelection, Selection, filter_by_region, summary_metrics};
use crate::graph::{GraphOptions, render_bar_chart, render_pie_chart};
use crate::loader::DataStore;
use crate::login::{self, SessionState};
use crate::record::Role;
use crate::report::{CategoryCount, CentroidTable, MapReport, count_by_category, count_by_city, map_points};

/// Shared, read-only state behind every handler.
pub struct AppState {
    pub store: Arc<DataStore>,
    pub centroids: CentroidTable,
    pub templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(store: Arc<DataStore>) -> Result<Self, TemplateError> {
        Self::with_centroids(store, CentroidTable::default())
    }

    pub fn with_centroids(
        store: Arc<DataStore>,
        centroids: CentroidTable,
    ) -> Result<Self, TemplateError> {
        let mut templates = Handlebars::new();
        templates.register_template_string("login", include_str!("./static/login.hbs"))?;
        templates.register_template_string("dashboard", include_str!("./static/dashboard.hbs"))?;
        Ok(AppState {
            store,
            centroids,
            templates,
        })
    }
}

/// Select values carried in the dashboard query string.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    kab_kota: Option<String>,
    kecamatan: Option<String>,
    desa: Option<String>,
    jenis: Option<String>,
}

impl DashboardQuery {
    fn region(&self) -> RegionSelection {
        RegionSelection::new(
            Selection::parse(self.kab_kota.as_deref()),
            Selection::parse(self.kecamatan.as_deref()),
            Selection::parse(self.desa.as_deref()),
        )
    }

    fn category(&self) -> Selection {
        Selection::parse(self.jenis.as_deref())
    }

    /// Query string reproducing only the region filters, for chart and
    /// export links.
    fn region_query(&self) -> String {
        let region = self.region();
        [
            ("kab_kota", &region.kab_kota),
            ("kecamatan", &region.kecamatan),
            ("desa", &region.desa),
        ]
        .iter()
        .filter_map(|(key, sel)| {
            sel.value()
                .map(|v| format!("{}={}", key, urlencoding::encode(v)))
        })
        .collect::<Vec<_>>()
        .join("&")
    }
}

#[derive(Serialize)]
struct SummaryResponse {
    metrics: Metrics,
    categories: Vec<CategoryCount>,
    kab_kota_options: Vec<String>,
    kecamatan_options: Vec<String>,
    desa_options: Vec<String>,
}

/// Build the application router.
///
/// Everything except the login/logout routes and static assets sits behind
/// [`login::require_auth`].
pub fn router(state: Arc<AppState>, static_dir: impl AsRef<Path>) -> Router {
    let protected = Router::new()
        .route("/", get(dashboard))
        .route("/chart/bar.png", get(bar_chart))
        .route("/chart/pie.png", get(pie_chart))
        .route("/api/summary", get(api_summary))
        .route("/api/map", get(api_map))
        .route("/export", get(export))
        .route_layer(middleware::from_fn(login::require_auth));

    Router::new()
        .merge(protected)
        .route(
            "/login",
            get(login::serve_login_page).post(login::handle_login),
        )
        .route("/logout", post(login::handle_logout))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .with_state(state)
}

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = DataStore::cached(&config.data_path).map_err(|e| {
        error!("Cannot start dashboard: {}", e);
        e
    })?;
    let state = Arc::new(AppState::new(store)?);
    let app = router(state, &config.static_dir);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn select_options(values: &[String], selected: &Selection) -> Vec<serde_json::Value> {
    std::iter::once(json!({ "value": ALL_SENTINEL, "selected": *selected == Selection::All }))
        .chain(values.iter().map(|v| {
            json!({ "value": v, "selected": selected.value() == Some(v.as_str()) })
        }))
        .collect()
}

// Embedded into a <script> block, so "</" must not survive.
fn script_json(report: &MapReport) -> String {
    serde_json::to_string(&report.points)
        .unwrap_or_else(|_| "[]".to_string())
        .replace("</", "<\\/")
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionState>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let region = query.region();
    let category = query.category();
    let view = filter_by_region(state.store.records(), &region);

    let metrics = summary_metrics(&view.rows);
    let categories = count_by_category(&view.rows);
    let category_values: Vec<String> = categories
        .iter()
        .map(|c| c.jenis_disabilitas.clone())
        .collect();
    let detail = drill_down(&view.rows, &category);
    let map = map_points(&count_by_city(state.store.records()), &state.centroids);

    let role = session.role().map(Role::as_str).unwrap_or_default();
    let denied = session
        .role()
        .filter(|r| !r.can_export())
        .map(|r| ExportError::Denied(r).to_string());

    let context = json!({
        "username": session.username(),
        "role": role,
        "since": session.since().map(|t| t.format("%d-%m-%Y %H:%M").to_string()),
        "metrics": metrics,
        "kab_kota_options": select_options(&view.kab_kota_options, &region.kab_kota),
        "kecamatan_options": select_options(&view.kecamatan_options, &region.kecamatan),
        "desa_options": select_options(&view.desa_options, &region.desa),
        "jenis_options": select_options(&category_values, &category),
        "categories": categories,
        "region_query": query.region_query(),
        "detail": detail,
        "map_points": script_json(&map),
        "map_has_points": map.has_points(),
        "map_missing": map.missing,
        "can_export": session.can_export(),
        "export_denied": denied,
    });

    match state.templates.render("dashboard", &context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render dashboard: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

type ChartRenderer = fn(&[CategoryCount], &GraphOptions) -> crate::error::Result<Vec<u8>>;

fn chart_response(
    state: &AppState,
    query: &DashboardQuery,
    render: ChartRenderer,
    options: GraphOptions,
) -> Response {
    let view = filter_by_region(state.store.records(), &query.region());
    let counts = count_by_category(&view.rows);

    match render(&counts, &options) {
        Ok(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Err(e) => {
            error!("{}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn bar_chart(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    chart_response(&state, &query, render_bar_chart, GraphOptions::bar())
}

async fn pie_chart(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    chart_response(&state, &query, render_pie_chart, GraphOptions::pie())
}

async fn api_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Json<SummaryResponse> {
    let view = filter_by_region(state.store.records(), &query.region());
    Json(SummaryResponse {
        metrics: summary_metrics(&view.rows),
        categories: count_by_category(&view.rows),
        kab_kota_options: view.kab_kota_options,
        kecamatan_options: view.kecamatan_options,
        desa_options: view.desa_options,
    })
}

/// Province-wide map layer; region filters do not apply.
async fn api_map(State(state): State<Arc<AppState>>) -> Json<MapReport> {
    Json(map_points(
        &count_by_city(state.store.records()),
        &state.centroids,
    ))
}

/// Download the region-filtered rows.
///
/// The role check runs here on the server, whatever the page showed.
async fn export(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionState>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let Some(role) = session.role() else {
        return Redirect::to("/login").into_response();
    };
    let view = filter_by_region(state.store.records(), &query.region());

    match export_filtered(&view.rows, role) {
        Ok(file) => {
            info!(
                "User '{}' exported {} rows",
                session.username(),
                view.rows.len()
            );
            (
                [
                    (header::CONTENT_TYPE, file.content_type.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", file.file_name),
                    ),
                ],
                file.bytes,
            )
                .into_response()
        }
        Err(e @ ExportError::Denied(_)) => {
            info!("Export refused for '{}': {}", session.username(), e);
            (StatusCode::FORBIDDEN, e.to_string()).into_response()
        }
        Err(e) => {
            error!("Export failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Export gagal").into_response()
        }
    }
}

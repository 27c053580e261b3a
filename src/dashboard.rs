//! ==============================================================================
//! dashboard.rs - web dashboard (axum)
//! ==============================================================================
//!
//! purpose:
//! ```text
//!     serves the single-page dashboard and a small json api.
//! ```
//!
//! ```text
//!     - temperature / humidity / pressure pages are built from the sample
//!       file at request time: load_recent() is copied into a RollingBuffer
//!       owned by the render call, so nothing is cached between requests.
//!     - the distance page does a live fetch-one on the distance topic and
//!       keeps the history in the distance buffer held in AppState.
//! ```
//!
//! ```text
//!     the page reloads itself every `refresh_minutes`, independent of when
//!     the ingestion job last ran. stale or missing data in between is
//!     expected.
//! ```
//!
//! relationships:
//! ```text
//!     - used by: main.rs
//!     - uses: store.rs, broker.rs, parser.rs, chart.rs
//! ```
//!
//! ==============================================================================

use crate::broker::MessageSource;
use crate::chart::{self, html_escape};
use crate::config::DashboardConfig;
use crate::domain::{BmeSample, DistanceSample, SensorKind};
use crate::parser;
use crate::store::{JsonFileStore, RollingBuffer, SampleStore};

use axum::{
    extract::{Query, State},
    response::{Html, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

// ==============================================================================
// shared state
// ==============================================================================

#[derive(Clone)]
pub struct AppState {
    pub store: JsonFileStore,
    pub source: Arc<dyn MessageSource>,
    pub topic_distance: String,
    pub buffer_len: usize,
    pub refresh_minutes: u64,
    /// live distance readings, newest last
    pub distance: Arc<RwLock<RollingBuffer<DistanceSample>>>,
}

impl AppState {
    pub fn new(config: &DashboardConfig, source: Arc<dyn MessageSource>) -> Self {
        Self {
            store: JsonFileStore::new(&config.store.path, config.store.max_samples),
            source,
            topic_distance: config.mqtt.topic_distance.clone(),
            buffer_len: config.dashboard.buffer_len,
            refresh_minutes: config.dashboard.refresh_minutes,
            distance: Arc::new(RwLock::new(RollingBuffer::new(config.dashboard.buffer_len))),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(page_handler))
        .route("/api/samples", get(samples_handler))
        .route("/api/distance", get(distance_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ==============================================================================
// view model
// ==============================================================================

/// everything one page render needs, detached from the stores
#[derive(Debug, Clone, Default)]
pub struct SensorView {
    pub current: Option<f64>,
    pub values: Vec<f64>,
    pub timestamps: Vec<String>,
    /// non-fatal problem to show in the sidebar (fetch/parse failure)
    pub status: Option<String>,
}

impl SensorView {
    pub fn from_bme(kind: SensorKind, buffer: &RollingBuffer<BmeSample>) -> Self {
        Self {
            current: buffer.latest().and_then(|s| kind.pick(s)),
            values: buffer.values(|s| kind.pick(s)),
            timestamps: buffer.iter().map(|s| s.timestamp.clone()).collect(),
            status: None,
        }
    }

    pub fn from_distance(buffer: &RollingBuffer<DistanceSample>) -> Self {
        Self {
            current: buffer.latest().map(|s| s.value),
            values: buffer.values(|s| Some(s.value)),
            timestamps: buffer.iter().map(|s| s.timestamp.clone()).collect(),
            status: None,
        }
    }
}

#[derive(Deserialize)]
pub struct PageParams {
    sensor: Option<String>,
}

async fn page_handler(State(state): State<AppState>, Query(params): Query<PageParams>) -> Html<String> {
    let kind = params.sensor.as_deref().and_then(SensorKind::from_slug);

    let view = match kind {
        None => None,
        Some(SensorKind::Distance) => Some(distance_view(&state).await),
        Some(kind) => {
            let history: Vec<BmeSample> = state.store.load_recent();
            let buffer = RollingBuffer::from_samples(state.buffer_len, history);
            Some(SensorView::from_bme(kind, &buffer))
        }
    };

    Html(render_page(kind, view.as_ref(), state.refresh_minutes))
}

/// fetch one distance message and fold it into the live buffer
async fn distance_view(state: &AppState) -> SensorView {
    let source = state.source.clone();
    let topic = state.topic_distance.clone();

    // fetch_one blocks until the broker delivers, keep it off the async workers
    let fetched = tokio::task::spawn_blocking(move || source.fetch_one(&topic)).await;

    let status = match fetched {
        Ok(Ok(raw)) => match parser::decode_payload(&raw).and_then(|p| parser::parse_distance(&p)) {
            Some(sample) => {
                tracing::info!("[DISTANCE] {:.2} cm", sample.value);
                state.distance.write().await.push(sample);
                None
            }
            None => {
                tracing::warn!("[DISTANCE] unparsable payload: {}", String::from_utf8_lossy(&raw));
                Some("Distance fetch error: unparsable payload".to_string())
            }
        },
        Ok(Err(e)) => {
            tracing::warn!("[DISTANCE] fetch failed: {}", e);
            Some(format!("Distance fetch error: {}", e))
        }
        Err(e) => {
            tracing::warn!("[DISTANCE] fetch task failed: {}", e);
            Some(format!("Distance fetch error: {}", e))
        }
    };

    let buffer = state.distance.read().await;
    SensorView {
        status,
        ..SensorView::from_distance(&buffer)
    }
}

async fn samples_handler(State(state): State<AppState>) -> Json<Vec<BmeSample>> {
    Json(state.store.load_recent())
}

async fn distance_handler(State(state): State<AppState>) -> Json<Vec<DistanceSample>> {
    Json(state.distance.read().await.load_recent())
}

// ==============================================================================
// html
// ==============================================================================

/// render the full page for the selected sensor (or the chooser prompt)
pub fn render_page(kind: Option<SensorKind>, view: Option<&SensorView>, refresh_minutes: u64) -> String {
    let mut menu = String::new();
    for k in SensorKind::ALL {
        let active = if Some(k) == kind { " class=\"active\"" } else { "" };
        menu.push_str(&format!(
            r#"<a href="/?sensor={}"{}>{} {}</a>"#,
            k.slug(),
            active,
            k.icon(),
            k.title()
        ));
    }

    let status = view
        .and_then(|v| v.status.as_deref())
        .map(|s| format!(r#"<div class="warn">{}</div>"#, html_escape(s)))
        .unwrap_or_default();

    let main = match (kind, view) {
        (Some(kind), Some(view)) => render_sensor(kind, view),
        _ => r#"<div class="info">Choose a sensor from the menu on the left</div>"#.to_string(),
    };

    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="{refresh}">
<title>Sensor Dashboard</title>
<style>
body {{ margin: 0; display: flex; font-family: system-ui; background: #0e1117; color: #eee; }}
nav {{ width: 220px; min-height: 100vh; padding: 1rem; background: #262f40; }}
nav a {{ display: block; padding: .5rem; margin: .25rem 0; color: #eee; text-decoration: none; border-radius: 6px; }}
nav a.active, nav a:hover {{ background: #3a4560; }}
main {{ flex: 1; padding: 1rem 2rem; }}
.row {{ display: flex; gap: 2rem; align-items: flex-start; }}
.readout h1 {{ font-size: 3rem; margin: 0; }}
.caption {{ color: gray; }}
.chart {{ width: 480px; }}
.warn {{ margin-top: 1rem; padding: .5rem; background: #5c4813; border-radius: 6px; }}
.info {{ padding: .75rem; background: #1c3a5e; border-radius: 6px; }}
</style>
</head>
<body>
<nav><h2>Sensors</h2>{menu}{status}</nav>
<main>{main}</main>
</body>
</html>"#,
        refresh = refresh_minutes.saturating_mul(60),
    )
}

fn render_sensor(kind: SensorKind, view: &SensorView) -> String {
    let readout = view
        .current
        .map(|v| kind.format_readout(v))
        .unwrap_or_else(|| "No data".to_string());

    let chart = chart::render_svg(
        &format!("{} (last {} readings)", kind.title(), view.values.len()),
        kind,
        &view.values,
        &view.timestamps,
    )
    .unwrap_or_else(|| r#"<div class="warn">Waiting for the first sensor data...</div>"#.to_string());

    format!(
        r#"<h1>{icon} {title}</h1>
<div class="row">
<div class="readout"><h1>{readout}</h1><div class="caption">{label}</div></div>
<div>{chart}</div>
</div>"#,
        icon = kind.icon(),
        title = kind.title(),
        readout = html_escape(&readout),
        label = html_escape(&kind.label()),
    )
}

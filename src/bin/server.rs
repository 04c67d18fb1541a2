use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use posterkit::config::{self, PosterParams};
use posterkit::palette::{self, NAMES, PALETTE, PALETTE_TITLE};
use posterkit::render::{self, Raster};
use posterkit::session::Session;

#[derive(Clone, Default)]
struct AppState {
    session: Arc<Mutex<Session>>,
}

#[derive(Deserialize, Default)]
struct PosterRequest {
    seed: Option<u64>,
    layers: Option<usize>,
    wobble: Option<f64>,
    caption: Option<String>,
    /// 1-based palette indices; absent or empty means all colors.
    colors: Option<Vec<usize>>,
    scale: Option<f32>,
}

#[derive(Serialize)]
struct PosterResponse {
    seed: u64,
    caption: String,
    layers: usize,
    image: String,
    timings: Vec<TimingEntry>,
    width: u32,
    height: u32,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

#[derive(Serialize)]
struct PaletteEntry {
    index: usize,
    name: &'static str,
    hex: String,
}

#[derive(Serialize)]
struct PaletteResponse {
    title: &'static str,
    colors: Vec<PaletteEntry>,
    image: String,
}

type ApiError = (StatusCode, String);

fn internal<E: std::fmt::Display>(e: E) -> ApiError {
    tracing::error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn data_url(raster: &Raster) -> posterkit::error::PosterResult<String> {
    let png = raster.encode_png()?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&png);
    Ok(format!("data:image/png;base64,{}", b64))
}

fn entropy() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

async fn palette_handler() -> Result<Json<PaletteResponse>, ApiError> {
    let image = tokio::task::spawn_blocking(|| {
        let raster = render::render_palette(&PALETTE, PALETTE_TITLE).rasterize(1.0)?;
        data_url(&raster)
    })
    .await
    .map_err(internal)?
    .map_err(internal)?;

    let colors = PALETTE
        .iter()
        .zip(NAMES)
        .enumerate()
        .map(|(i, (c, name))| PaletteEntry {
            index: i + 1,
            name,
            hex: c.hex(),
        })
        .collect();

    Ok(Json(PaletteResponse {
        title: PALETTE_TITLE,
        colors,
        image,
    }))
}

async fn render_poster(req: PosterRequest, seed: u64) -> Result<Json<PosterResponse>, ApiError> {
    let defaults = PosterParams::default();
    let params = PosterParams {
        layers: req.layers.unwrap_or(defaults.layers),
        wobble: req.wobble.unwrap_or(defaults.wobble),
        seed,
        caption: req.caption.unwrap_or_default(),
        palette: palette::select(&req.colors.unwrap_or_default()),
    }
    .clamped();
    let scale = config::clamp_scale(req.scale.unwrap_or(1.0));

    let response = tokio::task::spawn_blocking(move || {
        let (generated, timings) = posterkit::generate(&params, scale)?;
        let image = data_url(&generated.raster)?;

        let timing_entries = timings
            .iter()
            .map(|t| TimingEntry {
                name: t.name.to_string(),
                ms: t.ms,
            })
            .collect();

        Ok::<_, posterkit::error::PosterError>(PosterResponse {
            seed: params.seed,
            caption: generated.poster.caption,
            layers: generated.poster.layers.len(),
            image,
            timings: timing_entries,
            width: generated.raster.width,
            height: generated.raster.height,
        })
    })
    .await
    .map_err(internal)?
    .map_err(internal)?;

    Ok(Json(response))
}

async fn poster_handler(
    State(state): State<AppState>,
    Json(req): Json<PosterRequest>,
) -> Result<Json<PosterResponse>, ApiError> {
    let seed = {
        let mut session = state.session.lock().map_err(internal)?;
        if let Some(seed) = req.seed {
            session.seed = seed;
        }
        session.seed
    };
    render_poster(req, seed).await
}

async fn new_pattern_handler(
    State(state): State<AppState>,
    req: Option<Json<PosterRequest>>,
) -> Result<Json<PosterResponse>, ApiError> {
    let seed = state.session.lock().map_err(internal)?.new_pattern(entropy());
    render_poster(req.map(|Json(r)| r).unwrap_or_default(), seed).await
}

async fn reset_handler(
    State(state): State<AppState>,
    req: Option<Json<PosterRequest>>,
) -> Result<Json<PosterResponse>, ApiError> {
    let seed = state.session.lock().map_err(internal)?.reset();
    render_poster(req.map(|Json(r)| r).unwrap_or_default(), seed).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let frontend = ServeDir::new("frontend");

    let app = Router::new()
        .route("/api/palette", get(palette_handler))
        .route("/api/poster", post(poster_handler))
        .route("/api/new-pattern", post(new_pattern_handler))
        .route("/api/reset", post(reset_handler))
        .fallback_service(frontend)
        .layer(CorsLayer::permissive())
        .with_state(AppState::default());

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("posterkit server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

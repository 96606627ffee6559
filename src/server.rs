//! HTTP module.
//! One route, `GET /fen/<fen>/<flipped>`: the FEN may contain `/`, so the last
//! path segment is the orientation flag and everything before it is the FEN.
//! Rendering is synchronous, so it runs on the blocking pool.

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;

use crate::cache::ImageCache;
use crate::config::Config;
use crate::fen;
use crate::render::{self, Assets, Orientation};

/// Shared, read-only server state built once at startup.
pub struct AppState {
    cache: ImageCache,
    assets: Assets,
    plain_fallback: bool,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            cache: ImageCache::open(&config.cache_dir)?,
            assets: Assets::new(&config.assets_dir),
            plain_fallback: config.plain_tiles_fallback,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/fen/{*path}", get(send_fen))
        .with_state(Arc::new(state))
}

pub async fn serve(config: &Config) -> Result<()> {
    let state = AppState::new(config)?;
    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.addr()))?;

    println!("Listening on http://{}", listener.local_addr()?);
    println!("Cache: {}  Assets: {}", state.cache.dir().display(), state.assets.dir().display());

    axum::serve(listener, router(state)).await.context("HTTP server failed")
}

async fn send_fen(State(state): State<Arc<AppState>>, Path(path): Path<String>) -> Response {
    let Some((fen, flag)) = path.rsplit_once('/').filter(|(_, flag)| !flag.is_empty()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let Some(orientation) = Orientation::from_flag(flag) else {
        return bad_request("Invalid request: 'flipped' must be 0 or 1".to_string());
    };

    if let Err(e) = fen::validate_fen(fen) {
        return bad_request(format!("Invalid FEN string: {}", e));
    }

    let fen = fen.to_string();
    let generated = tokio::task::spawn_blocking(move || {
        state.cache.get_or_render(&fen, orientation, || {
            render::render_fen(&fen, orientation, &state.assets, state.plain_fallback)
        })
    })
    .await
    .map_err(|e| anyhow::anyhow!("Render task failed: {}", e))
    .and_then(|result| result);

    match generated {
        Ok(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Err(e) => {
            eprintln!("Error generating image: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error generating the image").into_response()
        }
    }
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, message).into_response()
}

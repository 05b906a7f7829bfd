use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::catalog::{Catalog, Envelope, GenreList, MovieItem, MoviePage};
use crate::config::{self, TmdbConfig};
use crate::format::{Genre, Movie, MovieDetails};
use crate::storefront::{FeedKind, FeedOptions, Related, Storefront};
use crate::tmdb::{TmdbApi, TmdbClient};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Storefront>,
}

impl AppState {
    pub fn new(tmdb: Arc<dyn TmdbApi>, region: impl Into<String>) -> Self {
        let catalog = Catalog::new(tmdb).with_region(region);
        Self {
            store: Arc::new(Storefront::new(catalog)),
        }
    }
}

pub async fn run_server() -> Result<()> {
    let tmdb_config = TmdbConfig::from_env()?;
    info!(
        "Using TMDB at {} (language {}, region {})",
        tmdb_config.base_url, tmdb_config.language, tmdb_config.region
    );
    let region = tmdb_config.region.clone();
    let tmdb: Arc<dyn TmdbApi> = Arc::new(TmdbClient::new(tmdb_config)?);
    let app = build_router(AppState::new(tmdb, region));

    let addr = config::listen_addr()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/movies", get(list_movies))
        .route("/api/movies/:id", get(movie_details))
        .route("/api/movies/:id/recommendations", get(recommendations))
        .route("/api/movies/:id/similar", get(similar))
        .route("/api/genres", get(list_genres))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

// Numeric params stay strings here so a bad value still gets an envelope, not a 400.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoviesParams {
    #[serde(rename = "type")]
    kind: Option<String>,
    page: Option<String>,
    query: Option<String>,
    genre_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PageParams {
    page: Option<String>,
}

/// Missing, empty or non-numeric pages read as page 1.
fn lenient_page(raw: Option<&str>) -> u32 {
    raw.and_then(|p| p.trim().parse().ok()).unwrap_or(1)
}

/// Unparseable ids read as 0, which the catalog rejects as missing.
fn lenient_id(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(0)
}

async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<MoviesParams>,
) -> Json<Envelope<MoviePage<Movie>>> {
    let kind = params
        .kind
        .as_deref()
        .map(FeedKind::from_name)
        .unwrap_or_default();
    let options = FeedOptions {
        query: params.query,
        page: lenient_page(params.page.as_deref()),
        genre_id: params.genre_id.as_deref().map(lenient_id),
    };
    Json(state.store.formatted_movies(kind, &options).await)
}

async fn list_genres(State(state): State<AppState>) -> Json<Envelope<GenreList<Genre>>> {
    Json(state.store.formatted_genres().await)
}

async fn movie_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Envelope<MovieItem<MovieDetails>>> {
    Json(state.store.formatted_movie_details(lenient_id(&id)).await)
}

async fn recommendations(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PageParams>,
) -> Json<Envelope<MoviePage<Movie>>> {
    let id = lenient_id(&id);
    let page = lenient_page(params.page.as_deref());
    Json(
        state
            .store
            .formatted_related(id, Related::Recommendations, page)
            .await,
    )
}

async fn similar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PageParams>,
) -> Json<Envelope<MoviePage<Movie>>> {
    let id = lenient_id(&id);
    let page = lenient_page(params.page.as_deref());
    Json(
        state
            .store
            .formatted_related(id, Related::Similar, page)
            .await,
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_fall_back_to_first() {
        assert_eq!(lenient_page(None), 1);
        assert_eq!(lenient_page(Some("")), 1);
        assert_eq!(lenient_page(Some("abc")), 1);
        assert_eq!(lenient_page(Some("-2")), 1);
        assert_eq!(lenient_page(Some(" 4 ")), 4);
    }

    #[test]
    fn bad_ids_read_as_missing() {
        assert_eq!(lenient_id(""), 0);
        assert_eq!(lenient_id("abc"), 0);
        assert_eq!(lenient_id("27205"), 27205);
    }
}

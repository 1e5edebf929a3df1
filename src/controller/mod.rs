use std::sync::Arc;
use anyhow::Context;
use axum::http::HeaderValue;
use axum::Router;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use crate::config::Config;
use crate::helpers::handler_404::page_not_found_handler;
use crate::repositories::google_places_repo::GooglePlacesRepo;
use crate::repositories::nutrition_analysis_repo::NutritionAnalyzer;

pub mod analysis_controller;
pub mod health_check;
pub mod maps_controller;

/// Handles shared by every controller. Built once at startup, cloned into each router.
#[derive(Clone)]
pub struct AppState {
    pub environment: String,
    pub places_repo: Arc<GooglePlacesRepo>,
    pub nutrition_analyzer: Arc<dyn NutritionAnalyzer>,
}

impl AppState {
    pub fn new(
        environment: impl Into<String>,
        places_repo: GooglePlacesRepo,
        nutrition_analyzer: impl NutritionAnalyzer + 'static,
    ) -> Self {
        Self {
            environment: environment.into(),
            places_repo: Arc::new(places_repo),
            nutrition_analyzer: Arc::new(nutrition_analyzer),
        }
    }
}

pub async fn serve(
    app_state: AppState,
    config: &Config,
) -> anyhow::Result<()> {
    let application = application(app_state, &config.origin_urls)?;

    info!("API server listening on: {}", config.bind_address);
    axum::Server::bind(&config.bind_address)
        .serve(application.into_make_service())
        .await
        .context("Error spinning up the API server")
}

/// Every endpoint plus the 404 fallback, wrapped in tracing, compression and CORS.
pub fn application(app_state: AppState, origin_urls: &str) -> anyhow::Result<Router> {
    let origins = cors_origins(origin_urls)?;

    Ok(router_endpoints(app_state)
        .fallback(page_not_found_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::OPTIONS
                        ])
                        .allow_origin(origins)
                        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                )
        ))
}

pub fn router_endpoints(app_state: AppState) -> Router {
    Router::new()
        .merge(health_check::router(app_state.clone()))
        .nest("/maps", maps_controller::router(app_state.clone()))
        .nest("/analysis", analysis_controller::router(app_state))
}

// `*` cannot sit in an origin list, so it switches CORS to allow any origin.
fn cors_origins(origin_urls: &str) -> anyhow::Result<AllowOrigin> {
    let origins = parse_origins(origin_urls)?;
    if origins.iter().any(|origin| origin == "*") {
        return Ok(AllowOrigin::any());
    }
    Ok(AllowOrigin::list(origins))
}

fn parse_origins(origin_urls: &str) -> anyhow::Result<Vec<HeaderValue>> {
    origin_urls
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect()
}

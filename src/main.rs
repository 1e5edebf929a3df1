use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;
use crate::config::Config;
use crate::controller::AppState;
use crate::repositories::google_places_repo::GooglePlacesRepo;
use crate::repositories::nutrition_analysis_repo::PendingNutritionAnalyzer;

pub mod config;
pub mod controller;
pub mod error;
pub mod helpers;
pub mod models;
pub mod repositories;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    let places_repo = GooglePlacesRepo::from_config(&config)
        .context("Failed to set up the Google Places gateway")?;
    let app_state = AppState::new(
        config.environment.as_str(),
        places_repo,
        PendingNutritionAnalyzer,
    );

    info!("Starting fitmeal backend in {} mode", config.environment);
    controller::serve(app_state, &config).await
}

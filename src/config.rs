use std::net::SocketAddr;

use clap::Parser;

use crate::repositories::google_places_repo::GOOGLE_PLACES_BASE_URL;

/// Service settings, read from flags or the environment (a `.env` file is loaded first).
/// Parsing fails before anything is served when the api key is missing or blank.
#[derive(Parser, Clone)]
pub struct Config {
    #[clap(env, long, default_value = "development")]
    pub environment: String,

    #[clap(env, long, value_parser = parse_api_key, hide_env_values = true)]
    pub google_api_key: String,

    #[clap(env, long, default_value = GOOGLE_PLACES_BASE_URL)]
    pub google_places_base_url: String,

    /// Comma separated list of origins allowed by CORS.
    #[clap(env, long, default_value = "http://localhost:3000")]
    pub origin_urls: String,

    #[clap(env, long, default_value = "127.0.0.1:3000")]
    pub bind_address: SocketAddr,
}

fn parse_api_key(value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("GOOGLE_API_KEY must not be empty".to_string());
    }
    Ok(value.to_string())
}

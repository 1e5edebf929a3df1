use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};
use crate::controller::AppState;

#[derive(Clone)]
struct ServiceInfo {
    environment: String,
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(get_health_check))
        .route_layer(Extension(ServiceInfo {
            environment: app_state.environment,
        }))
}

/// Liveness probe. The service holds no connections of its own, so being up is enough.
async fn get_health_check(Extension(info): Extension<ServiceInfo>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "environment": info.environment,
    }))
}

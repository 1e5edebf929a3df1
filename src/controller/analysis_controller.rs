use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use crate::controller::AppState;
use crate::error::AppError;
use crate::models::analysis::{AnalysisInput, DishAnalysisRequest, DishNutrition, NutritionResult};
use crate::repositories::nutrition_analysis_repo::NutritionAnalyzer;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/restaurant", post(analyze_restaurant))
        .route("/dish", post(analyze_dish))
        .route_layer(Extension(app_state.nutrition_analyzer))
}

pub async fn analyze_restaurant(
    Extension(nutrition_analyzer): Extension<Arc<dyn NutritionAnalyzer>>,
    body: Result<Json<AnalysisInput>, JsonRejection>,
) -> Result<Json<NutritionResult>, AppError> {
    let Json(body) = body?;
    let nutrition = nutrition_analyzer
        .analyze_restaurant(&body)
        .await?;

    Ok(Json(nutrition))
}

pub async fn analyze_dish(
    Extension(nutrition_analyzer): Extension<Arc<dyn NutritionAnalyzer>>,
    body: Result<Json<DishAnalysisRequest>, JsonRejection>,
) -> Result<Json<DishNutrition>, AppError> {
    let Json(body) = body?;
    let nutrition = nutrition_analyzer
        .analyze_dish(
            &body.dish_name,
            body.dish_image.as_deref(),
        ).await?;

    Ok(Json(nutrition))
}

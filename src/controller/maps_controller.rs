use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::extract::{Path, Query};
use axum::extract::rejection::QueryRejection;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use crate::controller::AppState;
use crate::error::AppError;
use crate::helpers::analysis_input::prepare_analysis_input;
use crate::models::analysis::{AnalysisInput, NutritionResult};
use crate::models::restaurant::{Coordinate, RestaurantDetails, RestaurantSummary, SearchOptions};
use crate::repositories::google_places_repo::{GooglePlacesRepo, DEFAULT_PHOTO_MAX_WIDTH};
use crate::repositories::nutrition_analysis_repo::NutritionAnalyzer;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/restaurants/nearby", get(get_nearby_restaurants))
        .route("/restaurants/:place_id", get(get_restaurant_details))
        .route("/restaurants/:place_id/analysis-input", get(get_analysis_input))
        .route("/restaurants/:place_id/nutrition", get(analyze_restaurant_nutrition))
        .route("/photos/:photo_reference", get(get_place_photo))
        .route_layer(Extension(app_state.places_repo))
        .route_layer(Extension(app_state.nutrition_analyzer))
}

/// Raw query values, validated by hand so every bad value maps to `invalid_input`.
/// Empty values count as absent.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct NearbyRestaurantsParam {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
    pub r#type: Option<String>,
    pub keyword: Option<String>,
}

impl NearbyRestaurantsParam {
    fn into_search(self) -> Result<(Coordinate, SearchOptions), AppError> {
        let lat = present(self.lat).ok_or_else(|| AppError::InvalidInput("lat is required".to_string()))?;
        let lng = present(self.lng).ok_or_else(|| AppError::InvalidInput("lng is required".to_string()))?;
        let location = Coordinate::parse(&lat, &lng)?;

        let radius = present(self.radius)
            .map(|radius| {
                radius
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|meters| *meters > 0)
                    .ok_or_else(|| AppError::InvalidInput(format!("radius must be a positive integer, got '{}'", radius)))
            })
            .transpose()?;

        let options = SearchOptions {
            radius,
            r#type: present(self.r#type),
            keyword: present(self.keyword),
        };
        Ok((location, options))
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

pub async fn get_nearby_restaurants(
    Extension(places_repo): Extension<Arc<GooglePlacesRepo>>,
    query: Result<Query<NearbyRestaurantsParam>, QueryRejection>,
) -> Result<Json<Vec<RestaurantSummary>>, AppError> {
    let Query(query) = query?;
    let (location, options) = query.into_search()?;
    let restaurants = places_repo
        .nearby_search(location, &options)
        .await?;

    Ok(Json(restaurants))
}

pub async fn get_restaurant_details(
    Extension(places_repo): Extension<Arc<GooglePlacesRepo>>,
    Path(place_id): Path<String>,
) -> Result<Json<RestaurantDetails>, AppError> {
    let details = places_repo
        .get_details(&place_id)
        .await?;

    Ok(Json(details))
}

pub async fn get_analysis_input(
    Extension(places_repo): Extension<Arc<GooglePlacesRepo>>,
    Path(place_id): Path<String>,
) -> Result<Json<AnalysisInput>, AppError> {
    let details = places_repo
        .get_details(&place_id)
        .await?;

    Ok(Json(prepare_analysis_input(&details)))
}

pub async fn analyze_restaurant_nutrition(
    Extension(places_repo): Extension<Arc<GooglePlacesRepo>>,
    Extension(nutrition_analyzer): Extension<Arc<dyn NutritionAnalyzer>>,
    Path(place_id): Path<String>,
) -> Result<Json<NutritionResult>, AppError> {
    let details = places_repo
        .get_details(&place_id)
        .await?;
    let analysis_input = prepare_analysis_input(&details);
    let nutrition = nutrition_analyzer
        .analyze_restaurant(&analysis_input)
        .await?;

    Ok(Json(nutrition))
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PlacePhotoParam {
    pub maxwidth: Option<u32>,
}

pub async fn get_place_photo(
    Extension(places_repo): Extension<Arc<GooglePlacesRepo>>,
    Path(photo_reference): Path<String>,
    query: Result<Query<PlacePhotoParam>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let photo = places_repo
        .fetch_photo(
            &photo_reference,
            query.maxwidth.unwrap_or(DEFAULT_PHOTO_MAX_WIDTH),
        ).await?;

    Ok(([(header::CONTENT_TYPE, photo.content_type)], photo.bytes))
}

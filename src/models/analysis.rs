use serde::{Deserialize, Serialize};

/// Flattened view of a venue handed to the nutrition analyzer.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisInput {
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<String>,
    pub restaurant_info: RestaurantInfo,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantInfo {
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub address: String,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutritionSummary {
    pub total_calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DishNutrition {
    pub dish_name: String,
    pub nutrition: Nutrition,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Pending,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutritionResult {
    pub restaurant_name: String,
    pub analyzed_dishes: Vec<DishNutrition>,
    pub nutrition_summary: NutritionSummary,
    pub analysis_status: AnalysisStatus,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DishAnalysisRequest {
    pub dish_name: String,
    pub dish_image: Option<String>,
}

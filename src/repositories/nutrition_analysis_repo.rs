use async_trait::async_trait;
use tracing::debug;

use crate::error::AppError;
use crate::models::analysis::{
    AnalysisInput, AnalysisStatus, DishNutrition, Nutrition, NutritionResult, NutritionSummary,
};

/// Boundary to the nutrition inference backend.
#[async_trait]
pub trait NutritionAnalyzer: Send + Sync {
    async fn analyze_restaurant(&self, input: &AnalysisInput) -> Result<NutritionResult, AppError>;

    async fn analyze_dish(
        &self,
        dish_name: &str,
        dish_image: Option<&str>,
    ) -> Result<DishNutrition, AppError>;
}

/// Stand-in analyzer until an inference backend exists. Every analysis resolves
/// immediately with zeroed values and a pending status.
#[derive(Clone, Copy, Debug, Default)]
pub struct PendingNutritionAnalyzer;

#[async_trait]
impl NutritionAnalyzer for PendingNutritionAnalyzer {
    async fn analyze_restaurant(&self, input: &AnalysisInput) -> Result<NutritionResult, AppError> {
        debug!(
            "Queued nutrition analysis for {} with {} photos and {} reviews",
            input.restaurant_info.name,
            input.photos.len(),
            input.reviews.len()
        );

        Ok(NutritionResult {
            restaurant_name: input.restaurant_info.name.clone(),
            analyzed_dishes: Vec::new(),
            nutrition_summary: NutritionSummary::default(),
            analysis_status: AnalysisStatus::Pending,
        })
    }

    async fn analyze_dish(
        &self,
        dish_name: &str,
        _dish_image: Option<&str>,
    ) -> Result<DishNutrition, AppError> {
        Ok(DishNutrition {
            dish_name: dish_name.to_string(),
            nutrition: Nutrition::default(),
        })
    }
}

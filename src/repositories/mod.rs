pub mod google_places_repo;
pub mod nutrition_analysis_repo;

use crate::models::analysis::{AnalysisInput, RestaurantInfo};
use crate::models::restaurant::RestaurantDetails;

/// Flattens place details for the nutrition analyzer.
///
/// Venue photos come first in provider order, followed by the photos attached to each
/// review, review by review. Review texts keep provider order.
pub fn prepare_analysis_input(details: &RestaurantDetails) -> AnalysisInput {
    let venue_photos = details.photos.iter();
    let review_photos = details.reviews.iter().flat_map(|review| review.photos.iter());

    let photos = venue_photos
        .chain(review_photos)
        .map(|photo| photo.photo_reference.clone())
        .collect();

    let reviews = details
        .reviews
        .iter()
        .map(|review| review.text.clone())
        .collect();

    AnalysisInput {
        photos,
        reviews,
        restaurant_info: RestaurantInfo {
            name: details.name.clone(),
            types: details.types.clone(),
            rating: details.rating,
            address: details.formatted_address.clone(),
        },
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};
use time::OffsetDateTime;

use crate::error::AppError;

pub const DEFAULT_SEARCH_RADIUS_METERS: u32 = 1000;
pub const DEFAULT_PLACE_TYPE: &str = "restaurant";
pub const DEFAULT_SEARCH_KEYWORD: &str = "健身餐";

/// A WGS84 position, rendered as `lat,lng` for the provider's `location` parameter.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, AppError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::InvalidInput(format!(
                "lat must be a number between -90 and 90, got {}",
                lat
            )));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(AppError::InvalidInput(format!(
                "lng must be a number between -180 and 180, got {}",
                lng
            )));
        }

        Ok(Self { lat, lng })
    }

    /// Parses raw query values. Anything that is not a finite in-range number is rejected.
    pub fn parse(lat: &str, lng: &str) -> Result<Self, AppError> {
        let lat = parse_degrees("lat", lat)?;
        let lng = parse_degrees("lng", lng)?;
        Self::new(lat, lng)
    }
}

fn parse_degrees(name: &str, raw: &str) -> Result<f64, AppError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AppError::InvalidInput(format!("{} must be a number, got '{}'", name, raw)))
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Optional nearby search filters. Each absent field falls back to its own default.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct SearchOptions {
    pub radius: Option<u32>,
    pub r#type: Option<String>,
    pub keyword: Option<String>,
}

impl SearchOptions {
    pub fn radius(&self) -> u32 {
        self.radius.unwrap_or(DEFAULT_SEARCH_RADIUS_METERS)
    }

    pub fn place_type(&self) -> &str {
        self.r#type.as_deref().unwrap_or(DEFAULT_PLACE_TYPE)
    }

    pub fn keyword(&self) -> &str {
        self.keyword.as_deref().unwrap_or(DEFAULT_SEARCH_KEYWORD)
    }
}

/// One entry of the provider's nearby search `results` array.
#[derive(Clone, Deserialize, Debug)]
pub struct PlaceSearchResult {
    pub place_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vicinity: String,
    pub rating: Option<f64>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSummary {
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub place_id: String,
}

impl From<PlaceSearchResult> for RestaurantSummary {
    fn from(place: PlaceSearchResult) -> Self {
        Self {
            name: place.name,
            address: place.vicinity,
            rating: place.rating,
            place_id: place.place_id,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct PlacePhoto {
    pub photo_reference: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub html_attributions: Vec<String>,
}

#[serde_as]
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct PlaceReview {
    #[serde(default)]
    pub author_name: String,
    pub rating: Option<f64>,
    #[serde(default)]
    pub text: String,
    #[serde(default, with = "time::serde::timestamp::option")]
    pub time: Option<OffsetDateTime>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub photos: Vec<PlacePhoto>,
}

#[serde_as]
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct OpeningHours {
    pub open_now: Option<bool>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

/// The provider's place details `result`, limited to the requested field set.
/// Nested collections are tolerant: absent or null degrades to empty.
#[serde_as]
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct RestaurantDetails {
    pub name: String,
    #[serde(default)]
    pub formatted_address: String,
    pub rating: Option<f64>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub reviews: Vec<PlaceReview>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub photos: Vec<PlacePhoto>,
    pub opening_hours: Option<OpeningHours>,
    pub price_level: Option<u8>,
    #[serde(rename(serialize = "totalRatings"))]
    pub user_ratings_total: Option<u32>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub types: Vec<String>,
}

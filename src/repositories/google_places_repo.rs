use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::models::restaurant::{
    Coordinate, PlaceSearchResult, RestaurantDetails, RestaurantSummary, SearchOptions,
};

pub const GOOGLE_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";
pub const DETAILS_FIELDS: &str =
    "name,formatted_address,rating,reviews,photos,opening_hours,price_level,user_ratings_total,types";
pub const DEFAULT_PHOTO_MAX_WIDTH: u32 = 400;
pub const MAX_PHOTO_WIDTH: u32 = 1600;

#[derive(Serialize, Debug)]
struct NearbySearchParams<'a> {
    location: String,
    radius: u32,
    r#type: &'a str,
    keyword: &'a str,
    key: &'a str,
}

impl<'a> NearbySearchParams<'a> {
    fn new(location: Coordinate, options: &'a SearchOptions, key: &'a str) -> Self {
        Self {
            location: location.to_string(),
            radius: options.radius(),
            r#type: options.place_type(),
            keyword: options.keyword(),
            key,
        }
    }
}

#[derive(Serialize, Debug)]
struct PlaceDetailsParams<'a> {
    place_id: &'a str,
    fields: &'static str,
    key: &'a str,
}

#[derive(Serialize, Debug)]
struct PlacePhotoParams<'a> {
    photo_reference: &'a str,
    maxwidth: u32,
    key: &'a str,
}

#[derive(Deserialize, Debug)]
struct NearbySearchResponse {
    status: Option<String>,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<PlaceSearchResult>,
}

#[derive(Deserialize, Debug)]
struct PlaceDetailsResponse {
    status: Option<String>,
    error_message: Option<String>,
    result: Option<RestaurantDetails>,
}

/// Outcome of the `status` field every Places json response carries.
#[derive(Debug, PartialEq)]
enum ProviderStatus {
    Ok,
    NoMatch,
}

fn check_provider_status(
    status: Option<&str>,
    error_message: Option<&str>,
) -> Result<ProviderStatus, AppError> {
    match status {
        None | Some("OK") => Ok(ProviderStatus::Ok),
        Some("ZERO_RESULTS") | Some("NOT_FOUND") => Ok(ProviderStatus::NoMatch),
        Some(other) => Err(AppError::UpstreamProvider {
            status: other.to_string(),
            message: error_message.unwrap_or_default().to_string(),
        }),
    }
}

/// Raw image bytes proxied from the provider's photo endpoint.
#[derive(Debug)]
pub struct PlacePhotoContent {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub struct GooglePlacesRepo {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GooglePlacesRepo {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, AppError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(AppError::Configuration(
                "GOOGLE_API_KEY is required to talk to the places provider".to_string(),
            ));
        }

        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(AppError::Configuration(
                "GOOGLE_PLACES_BASE_URL must not be empty".to_string(),
            ));
        }

        Ok(Self {
            http_client: reqwest::Client::new(),
            base_url,
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(config.google_api_key.as_str(), config.google_places_base_url.as_str())
    }

    pub async fn nearby_search(
        &self,
        location: Coordinate,
        options: &SearchOptions,
    ) -> Result<Vec<RestaurantSummary>, AppError> {
        let params = NearbySearchParams::new(location, options, &self.api_key);
        debug!(
            "Searching nearby places around {} within {}m, type: {}, keyword: {}",
            params.location, params.radius, params.r#type, params.keyword
        );

        let response: NearbySearchResponse = self.get_json("nearbysearch/json", &params).await?;
        check_provider_status(response.status.as_deref(), response.error_message.as_deref())?;

        let restaurants: Vec<RestaurantSummary> = response
            .results
            .into_iter()
            .map(RestaurantSummary::from)
            .collect();

        info!("Found {} nearby restaurants around {}", restaurants.len(), location);
        Ok(restaurants)
    }

    pub async fn get_details(&self, place_id: &str) -> Result<RestaurantDetails, AppError> {
        let params = PlaceDetailsParams {
            place_id,
            fields: DETAILS_FIELDS,
            key: &self.api_key,
        };

        let response: PlaceDetailsResponse = self.get_json("details/json", &params).await?;
        let status =
            check_provider_status(response.status.as_deref(), response.error_message.as_deref())
                .map_err(|e| match e {
                    // Malformed ids come back as INVALID_REQUEST rather than NOT_FOUND.
                    AppError::UpstreamProvider { status, .. } if status == "INVALID_REQUEST" => {
                        AppError::PlaceNotFound(place_id.to_string())
                    }
                    other => other,
                })?;
        if status == ProviderStatus::NoMatch {
            return Err(AppError::PlaceNotFound(place_id.to_string()));
        }

        response.result.ok_or_else(|| {
            AppError::UpstreamData(format!("place details for {} carried no result", place_id))
        })
    }

    pub async fn fetch_photo(
        &self,
        photo_reference: &str,
        max_width: u32,
    ) -> Result<PlacePhotoContent, AppError> {
        if !(1..=MAX_PHOTO_WIDTH).contains(&max_width) {
            return Err(AppError::InvalidInput(format!(
                "maxwidth must be between 1 and {}, got {}",
                MAX_PHOTO_WIDTH, max_width
            )));
        }

        let params = PlacePhotoParams {
            photo_reference,
            maxwidth: max_width,
            key: &self.api_key,
        };
        let response = self.send("photo", &params).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        Ok(PlacePhotoContent { content_type, bytes })
    }

    async fn get_json<Q, T>(&self, endpoint: &str, query: &Q) -> Result<T, AppError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(endpoint, query).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send<Q>(&self, endpoint: &str, query: &Q) -> Result<reqwest::Response, AppError>
    where
        Q: Serialize + ?Sized,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self.http_client.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Places provider answered {} on {}", status, endpoint);
            return Err(AppError::UpstreamStatus(status.as_u16()));
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repo(server: &MockServer) -> GooglePlacesRepo {
        GooglePlacesRepo::new("test-key", server.uri()).unwrap()
    }

    fn taipei() -> Coordinate {
        Coordinate::new(25.03, 121.56).unwrap()
    }

    #[test]
    fn blank_api_key_fails_at_construction() {
        assert!(matches!(
            GooglePlacesRepo::new("", GOOGLE_PLACES_BASE_URL),
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            GooglePlacesRepo::new("   ", GOOGLE_PLACES_BASE_URL),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn provider_status_classification() {
        assert_eq!(check_provider_status(None, None).unwrap(), ProviderStatus::Ok);
        assert_eq!(check_provider_status(Some("OK"), None).unwrap(), ProviderStatus::Ok);
        assert_eq!(
            check_provider_status(Some("ZERO_RESULTS"), None).unwrap(),
            ProviderStatus::NoMatch
        );
        match check_provider_status(Some("REQUEST_DENIED"), Some("The provided API key is invalid.")) {
            Err(AppError::UpstreamProvider { status, message }) => {
                assert_eq!(status, "REQUEST_DENIED");
                assert_eq!(message, "The provided API key is invalid.");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn nearby_search_applies_default_options() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .and(query_param("location", "25.03,121.56"))
            .and(query_param("radius", "1000"))
            .and(query_param("type", "restaurant"))
            .and(query_param("keyword", "健身餐"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ZERO_RESULTS",
                "results": [],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let restaurants = repo(&server)
            .nearby_search(taipei(), &SearchOptions::default())
            .await
            .unwrap();
        assert!(restaurants.is_empty());
    }

    #[tokio::test]
    async fn nearby_search_overrides_only_given_options() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .and(query_param("radius", "250"))
            .and(query_param("type", "restaurant"))
            .and(query_param("keyword", "健身餐"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "results": [],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let options = SearchOptions {
            radius: Some(250),
            ..Default::default()
        };
        repo(&server).nearby_search(taipei(), &options).await.unwrap();
    }

    #[tokio::test]
    async fn nearby_search_maps_provider_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "results": [
                    {
                        "place_id": "place-1",
                        "name": "Green Bowl",
                        "vicinity": "No. 7, Xinyi Rd",
                        "rating": 4.4,
                        "geometry": { "location": { "lat": 25.031, "lng": 121.561 } },
                    },
                    {
                        "place_id": "place-2",
                        "name": "Lean Kitchen",
                        "vicinity": "No. 12, Songren Rd",
                        "rating": 4.0,
                    },
                ],
            })))
            .mount(&server)
            .await;

        let restaurants = repo(&server)
            .nearby_search(taipei(), &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(
            restaurants,
            vec![
                RestaurantSummary {
                    name: "Green Bowl".to_string(),
                    address: "No. 7, Xinyi Rd".to_string(),
                    rating: Some(4.4),
                    place_id: "place-1".to_string(),
                },
                RestaurantSummary {
                    name: "Lean Kitchen".to_string(),
                    address: "No. 12, Songren Rd".to_string(),
                    rating: Some(4.0),
                    place_id: "place-2".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn nearby_search_surfaces_provider_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid.",
                "results": [],
            })))
            .mount(&server)
            .await;

        let result = repo(&server).nearby_search(taipei(), &SearchOptions::default()).await;
        assert!(matches!(result, Err(AppError::UpstreamProvider { .. })));
    }

    #[tokio::test]
    async fn nearby_search_fails_on_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = repo(&server).nearby_search(taipei(), &SearchOptions::default()).await;
        assert!(matches!(result, Err(AppError::UpstreamStatus(503))));
    }

    #[tokio::test]
    async fn nearby_search_fails_on_malformed_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let result = repo(&server).nearby_search(taipei(), &SearchOptions::default()).await;
        assert!(matches!(result, Err(AppError::UpstreamData(_))));
    }

    #[tokio::test]
    async fn nearby_search_fails_when_provider_is_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let repo = GooglePlacesRepo::new("test-key", format!("http://{}", address)).unwrap();
        let result = repo.nearby_search(taipei(), &SearchOptions::default()).await;
        match result {
            Err(AppError::UpstreamTransport(message)) => assert!(!message.contains("test-key")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn get_details_requests_fixed_field_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/details/json"))
            .and(query_param("place_id", "ABC123"))
            .and(query_param("fields", DETAILS_FIELDS))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "result": {
                    "name": "Protein House",
                    "formatted_address": "110, Taipei",
                    "rating": 4.6,
                    "photos": [{ "photo_reference": "top-1", "height": 800, "width": 1200 }],
                    "reviews": [{
                        "text": "Chicken breast bowl with brown rice",
                        "photos": [{ "photo_reference": "review-1" }, { "photo_reference": "review-2" }],
                    }],
                    "types": ["restaurant", "food"],
                },
            })))
            .expect(1)
            .mount(&server)
            .await;

        let details = repo(&server).get_details("ABC123").await.unwrap();
        assert_eq!(details.name, "Protein House");
        assert_eq!(details.photos.len(), 1);
        assert_eq!(details.reviews.len(), 1);
        assert_eq!(details.reviews[0].photos.len(), 2);
    }

    #[tokio::test]
    async fn get_details_unknown_place_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/details/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "NOT_FOUND",
                "html_attributions": [],
            })))
            .mount(&server)
            .await;

        let result = repo(&server).get_details("missing").await;
        assert!(matches!(result, Err(AppError::PlaceNotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn get_details_without_result_is_bad_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/details/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "OK" })))
            .mount(&server)
            .await;

        let result = repo(&server).get_details("ABC123").await;
        assert!(matches!(result, Err(AppError::UpstreamData(_))));
    }

    #[tokio::test]
    async fn fetch_photo_proxies_bytes_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photo"))
            .and(query_param("photo_reference", "top-1"))
            .and(query_param("maxwidth", "400"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(vec![0xFF_u8, 0xD8, 0xFF], "image/jpeg"),
            )
            .mount(&server)
            .await;

        let photo = repo(&server)
            .fetch_photo("top-1", DEFAULT_PHOTO_MAX_WIDTH)
            .await
            .unwrap();
        assert_eq!(photo.content_type, "image/jpeg");
        assert_eq!(photo.bytes, vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn fetch_photo_rejects_out_of_range_width() {
        let server = MockServer::start().await;
        let result = repo(&server).fetch_photo("top-1", 0).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        let result = repo(&server).fetch_photo("top-1", MAX_PHOTO_WIDTH + 1).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}

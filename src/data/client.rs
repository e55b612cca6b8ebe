//! RentSure API client
//!
//! Page-level loaders built on [`ResilientClient`]. Read endpoints whose
//! results are worth showing offline (cities, listings, rental details,
//! trust metrics) store every successful body with
//! [`cache_response`] under the exact request URL, so a later call for the
//! same URL can be served from cache when the network is down.

use futures::join;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::{
    fallback_cities, AgreementRequest, AgreementResponse, City, CityList, ExpenseSplit,
    ExpenseSplitRequest, Neighborhood, OwnerDetails, OwnerProperty, OwnerPropertyList, OwnerTrust,
    PaymentConfirmRequest, PaymentConfirmation, PaymentInitiated, PaymentRequest, PropertyForm,
    Proximity, RecommendationsResponse, Rental, RentalDetails, SearchResponse, TiffinOption,
    TiffinOptions, TrustMetrics,
};
use crate::cache::cache_response;
use crate::fetch::{FetchError, FetchResponse, Method, RequestOptions, ResilientClient};
use crate::listings::RankBy;

/// Number of results requested from `/search`
const SEARCH_TOP_N: u32 = 10;

/// Number of results requested from `/recommendations`
const RECOMMENDATIONS_TOP_N: u32 = 5;

/// Errors returned by [`RentSureClient`]
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure with no cached fallback, or an undecodable body
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The API answered with a failing status
    #[error("Request failed with status {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The requested resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// The request body could not be encoded
    #[error("Failed to encode request body: {0}")]
    Encode(serde_json::Error),
}

/// Data returned by a loader, with whether it came from the offline path
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub data: T,
    /// True when served from cache or replaced by built-in defaults
    pub offline: bool,
}

/// Which endpoint produced a listing page
#[derive(Debug, Clone, PartialEq)]
pub enum ListingsMode {
    /// `/recommendations`, ordered by suitability
    Recommendations,
    /// `/search` for a free-text query
    Search { query: String, rank_by: RankBy },
}

/// Listings for one city
#[derive(Debug, Clone, PartialEq)]
pub struct Listings {
    /// City name as reported by the API, or the requested id in upper case
    pub city: String,
    pub mode: ListingsMode,
    pub rentals: Vec<Rental>,
}

impl Listings {
    pub fn title(&self) -> String {
        format!("Rentals in {}", self.city)
    }

    pub fn subtitle(&self) -> String {
        match &self.mode {
            ListingsMode::Recommendations => {
                format!("{} properties • Sorted by suitability", self.rentals.len())
            }
            ListingsMode::Search { rank_by, .. } => {
                format!("{} results • Ranked by {}", self.rentals.len(), rank_by)
            }
        }
    }
}

/// Secondary information shown on a rental page
///
/// Each part is loaded independently; a failure leaves only that part empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RentalExtras {
    pub proximity: Option<Proximity>,
    pub neighborhood: Option<Neighborhood>,
    pub tiffin: Vec<TiffinOption>,
    pub owner_trust: Option<OwnerTrust>,
    pub owner: Option<OwnerDetails>,
}

/// Bytes escaped by JavaScript's `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes a query parameter value
///
/// Leaves the same characters unescaped as JavaScript's `encodeURIComponent`
/// so cache keys match URLs produced by other RentSure clients.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Extracts a human-readable message from a failing response
///
/// Prefers the API's `detail` field, then the raw body.
fn status_error(response: &FetchResponse) -> ApiError {
    let detail = response
        .json::<Value>()
        .ok()
        .and_then(|body| match body.get("detail") {
            Some(Value::String(detail)) => Some(detail.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        })
        .unwrap_or_else(|| {
            let text = response.text().trim();
            if text.is_empty() {
                "Request failed".to_string()
            } else {
                text.to_string()
            }
        });

    ApiError::Status {
        status: response.status(),
        detail,
    }
}

/// Typed access to the RentSure API
#[derive(Clone)]
pub struct RentSureClient {
    base_url: String,
    http: ResilientClient,
}

impl RentSureClient {
    /// Creates a client for the API at `base_url` (e.g. `http://localhost:8000`)
    pub fn new(base_url: impl Into<String>, http: ResilientClient) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &ResilientClient {
        &self.http
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GETs `url`, caches a successful live body and decodes it
    async fn load<T: DeserializeOwned>(&self, url: &str) -> Result<Loaded<T>, ApiError> {
        let response = self.http.fetch(url).await?;
        if !response.ok() {
            return Err(status_error(&response));
        }

        let body: Value = response.json()?;
        if !response.is_from_cache() {
            cache_response(self.http.store(), url, &body);
        }

        let data = serde_json::from_value(body).map_err(FetchError::from)?;
        Ok(Loaded {
            data,
            offline: response.is_from_cache(),
        })
    }

    /// GETs `url` without caching; any failure yields `None`
    async fn load_optional<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        let result = async {
            let response = self.http.fetch(url).await?;
            if !response.ok() {
                return Err(status_error(&response));
            }
            Ok::<T, ApiError>(response.json::<T>()?)
        }
        .await;

        match result {
            Ok(data) => Some(data),
            Err(e) => {
                debug!(url, error = %e, "Optional data unavailable");
                None
            }
        }
    }

    /// Sends a JSON body with the default retry policy and decodes the reply
    async fn send_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = RequestOptions::post_json(body).map_err(ApiError::Encode)?;
        let response = self
            .http
            .fetch_with_retry(&self.url(path), &options, None)
            .await?;
        if !response.ok() {
            return Err(status_error(&response));
        }
        Ok(response.json()?)
    }

    /// Sends an owner request: one attempt, bearer token, no cache fallback
    async fn owner_request(&self, url: &str, options: RequestOptions, token: &str) -> Result<FetchResponse, ApiError> {
        let options = options.bearer(token);
        let response = self.http.fetch_with_retry(url, &options, Some(0)).await?;
        if !response.ok() {
            return Err(status_error(&response));
        }
        Ok(response)
    }

    /// Cities for the city picker
    ///
    /// Never fails: without network or cache, returns the built-in list
    /// flagged as offline.
    pub async fn cities(&self) -> Loaded<Vec<City>> {
        match self.load::<CityList>(&self.url("/cities")).await {
            Ok(loaded) => Loaded {
                data: loaded.data.cities,
                offline: loaded.offline,
            },
            Err(e) => {
                warn!(error = %e, "Could not load cities, using built-in list");
                Loaded {
                    data: fallback_cities(),
                    offline: true,
                }
            }
        }
    }

    /// URL for a listing page: search when `query` has text, else recommendations
    pub fn listings_url(&self, city: &str, query: &str, rank_by: RankBy) -> String {
        let query = query.trim();
        if query.is_empty() {
            self.url(&format!(
                "/recommendations?city={}&top_n={}",
                city, RECOMMENDATIONS_TOP_N
            ))
        } else {
            self.url(&format!(
                "/search?city={}&query={}&rank_by={}&top_n={}",
                city,
                encode_component(query),
                rank_by,
                SEARCH_TOP_N
            ))
        }
    }

    /// Listings for a city
    ///
    /// Never fails: when nothing can be loaded, returns an empty page
    /// flagged as offline.
    pub async fn listings(&self, city: &str, query: &str, rank_by: RankBy) -> Loaded<Listings> {
        let url = self.listings_url(city, query, rank_by);
        let query = query.trim();

        let result = if query.is_empty() {
            self.load::<RecommendationsResponse>(&url)
                .await
                .map(|loaded| (loaded.data.city, loaded.data.recommendations, loaded.offline))
        } else {
            self.load::<SearchResponse>(&url)
                .await
                .map(|loaded| (loaded.data.city, loaded.data.results, loaded.offline))
        };

        let mode = if query.is_empty() {
            ListingsMode::Recommendations
        } else {
            ListingsMode::Search {
                query: query.to_string(),
                rank_by,
            }
        };

        match result {
            Ok((api_city, rentals, offline)) => Loaded {
                data: Listings {
                    city: api_city.unwrap_or_else(|| city.to_uppercase()),
                    mode,
                    rentals,
                },
                offline,
            },
            Err(e) => {
                warn!(city, error = %e, "Could not load listings");
                Loaded {
                    data: Listings {
                        city: city.to_uppercase(),
                        mode,
                        rentals: Vec::new(),
                    },
                    offline: true,
                }
            }
        }
    }

    /// Full details for one rental
    pub async fn rental(&self, id: &str) -> Result<Loaded<RentalDetails>, ApiError> {
        let url = self.url(&format!("/rental/{}", id));
        self.load(&url).await.map_err(|e| match e {
            ApiError::Status { .. } => ApiError::NotFound(format!("Rental {} not found", id)),
            other => other,
        })
    }

    /// Factors that make up the trust and safety scores
    pub async fn trust_metrics(&self) -> Result<Loaded<TrustMetrics>, ApiError> {
        self.load(&self.url("/trust-metrics")).await
    }

    /// Loads proximity, neighborhood, tiffin and owner information concurrently
    pub async fn rental_extras(&self, details: &RentalDetails) -> RentalExtras {
        let property_id = &details.property.property_id;
        let owner_id = details.property.owner_id.as_ref();

        let proximity_url = self.url(&format!("/proximity/{}", property_id));
        let neighborhood_url = self.url(&format!("/neighborhood/{}", property_id));
        let tiffin_url = self.url(&format!("/tiffin/{}", property_id));

        let owner_trust = async {
            match owner_id {
                Some(owner) => self.load_optional::<OwnerTrust>(&self.url(&format!("/owner/{}/trust", owner))).await,
                None => None,
            }
        };
        let owner = async {
            match owner_id {
                Some(owner) => self.load_optional::<OwnerDetails>(&self.url(&format!("/owner/{}", owner))).await,
                None => None,
            }
        };

        let (proximity, neighborhood, tiffin, owner_trust, owner) = join!(
            self.load_optional::<Proximity>(&proximity_url),
            self.load_optional::<Neighborhood>(&neighborhood_url),
            self.load_optional::<TiffinOptions>(&tiffin_url),
            owner_trust,
            owner,
        );

        RentalExtras {
            proximity,
            neighborhood,
            tiffin: tiffin.map(|t| t.options).unwrap_or_default(),
            owner_trust,
            owner,
        }
    }

    /// Generates a rental agreement and returns its text
    pub async fn generate_agreement(&self, request: &AgreementRequest) -> Result<String, ApiError> {
        let response: AgreementResponse = self.send_json("/agreement", request).await?;
        Ok(response.agreement_text)
    }

    pub async fn initiate_payment(&self, request: &PaymentRequest) -> Result<PaymentInitiated, ApiError> {
        self.send_json("/payment/initiate", request).await
    }

    pub async fn confirm_payment(&self, transaction_id: &str) -> Result<PaymentConfirmation, ApiError> {
        let request = PaymentConfirmRequest {
            transaction_id: transaction_id.to_string(),
        };
        self.send_json("/payment/confirm", &request).await
    }

    /// Initiates and then confirms a payment
    ///
    /// The returned confirmation always carries the transaction id.
    pub async fn pay(&self, request: &PaymentRequest) -> Result<PaymentConfirmation, ApiError> {
        let initiated = self.initiate_payment(request).await?;
        let mut confirmation = self.confirm_payment(&initiated.transaction_id).await?;
        confirmation
            .transaction_id
            .get_or_insert(initiated.transaction_id);
        Ok(confirmation)
    }

    /// Splits rent and utilities between roommates
    pub async fn split_expenses(&self, request: &ExpenseSplitRequest) -> Result<ExpenseSplit, ApiError> {
        self.send_json("/expenses/split", request).await
    }

    /// Properties owned by the authenticated owner
    pub async fn owner_properties(&self, token: &str) -> Result<Vec<OwnerProperty>, ApiError> {
        let response = self
            .owner_request(&self.url("/owner/properties"), RequestOptions::default(), token)
            .await?;
        let list: OwnerPropertyList = response.json()?;
        Ok(list.properties)
    }

    pub async fn create_property(&self, token: &str, form: &PropertyForm) -> Result<(), ApiError> {
        let options = RequestOptions::json(Method::Post, form).map_err(ApiError::Encode)?;
        self.owner_request(&self.url("/owner/properties"), options, token)
            .await
            .map(drop)
    }

    pub async fn update_property(&self, token: &str, property_id: i64, form: &PropertyForm) -> Result<(), ApiError> {
        let options = RequestOptions::json(Method::Put, form).map_err(ApiError::Encode)?;
        self.owner_request(&self.url(&format!("/owner/properties/{}", property_id)), options, token)
            .await
            .map(drop)
    }

    pub async fn delete_property(&self, token: &str, property_id: i64) -> Result<(), ApiError> {
        self.owner_request(
            &self.url(&format!("/owner/properties/{}", property_id)),
            RequestOptions::method(Method::Delete),
            token,
        )
        .await
        .map(drop)
    }

    /// Marks a property as available or unavailable
    pub async fn set_availability(&self, token: &str, property_id: i64, available: bool) -> Result<(), ApiError> {
        let url = self.url(&format!(
            "/owner/properties/{}/availability?availability={}",
            property_id, available
        ));
        self.owner_request(&url, RequestOptions::method(Method::Patch), token)
            .await
            .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{cache_key, MemoryStore, ResponseStore};
    use crate::fetch::{Transport, TransportError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const BASE: &str = "http://api.test";

    /// Transport serving canned responses by URL; unknown URLs fail to connect
    #[derive(Default)]
    struct FakeApi {
        routes: Mutex<HashMap<String, (u16, String)>>,
        requests: Mutex<Vec<(String, RequestOptions)>>,
    }

    impl FakeApi {
        fn route(&self, path: &str, status: u16, body: Value) {
            self.routes
                .lock()
                .unwrap()
                .insert(format!("{}{}", BASE, path), (status, body.to_string()));
        }

        fn requests_to(&self, path: &str) -> Vec<RequestOptions> {
            let url = format!("{}{}", BASE, path);
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|(u, _)| *u == url)
                .map(|(_, o)| o.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Transport for FakeApi {
        async fn send(&self, url: &str, options: &RequestOptions) -> Result<FetchResponse, TransportError> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), options.clone()));
            match self.routes.lock().unwrap().get(url) {
                Some((status, body)) => Ok(FetchResponse::new(*status, body.clone())),
                None => Err(TransportError::Connection("offline".to_string())),
            }
        }
    }

    fn client() -> (RentSureClient, Arc<FakeApi>, Arc<MemoryStore>) {
        let api = Arc::new(FakeApi::default());
        let store = Arc::new(MemoryStore::new());
        let http = ResilientClient::new(api.clone(), store.clone());
        (RentSureClient::new(format!("{}/", BASE), http), api, store)
    }

    fn rental_json(id: &str, rent: u32) -> Value {
        json!({"property_id": id, "rent": rent, "distance_km": 2.0, "trust_score": 90, "safety_score": 80})
    }

    #[test]
    fn test_encode_component_matches_encode_uri_component() {
        assert_eq!(encode_component("near COEP"), "near%20COEP");
        assert_eq!(encode_component("1bhk&pg=yes"), "1bhk%26pg%3Dyes");
        assert_eq!(encode_component("it's (ok)!*~._-"), "it's%20(ok)!*~._-");
        assert_eq!(encode_component("₹"), "%E2%82%B9");
        assert_eq!(encode_component("a/b?c#d"), "a%2Fb%3Fc%23d");
        assert_eq!(encode_component(""), "");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let (client, _, _) = client();
        assert_eq!(client.base_url(), BASE);
        assert_eq!(client.url("/cities"), "http://api.test/cities");
    }

    #[test]
    fn test_listings_url_selection() {
        let (client, _, _) = client();
        assert_eq!(
            client.listings_url("pune", "   ", RankBy::Match),
            "http://api.test/recommendations?city=pune&top_n=5"
        );
        assert_eq!(
            client.listings_url("pune", "  girls pg ", RankBy::Safety),
            "http://api.test/search?city=pune&query=girls%20pg&rank_by=safety&top_n=10"
        );
    }

    #[tokio::test]
    async fn test_cities_success_is_cached() {
        let (client, api, store) = client();
        api.route("/cities", 200, json!({"cities": [{"id": "pune", "name": "Pune"}]}));

        let loaded = client.cities().await;

        assert!(!loaded.offline);
        assert_eq!(loaded.data.len(), 1);
        assert_eq!(loaded.data[0].name, "Pune");
        assert!(store.get(&cache_key("http://api.test/cities")).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cities_served_from_cache_when_offline() {
        let (client, _api, store) = client();
        store
            .set(
                &cache_key("http://api.test/cities"),
                &json!({"cities": [{"id": "bengaluru", "name": "Bengaluru"}]}).to_string(),
            )
            .unwrap();

        let loaded = client.cities().await;

        assert!(loaded.offline);
        assert_eq!(loaded.data[0].id, "bengaluru");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cities_fall_back_to_built_in_list() {
        let (client, _api, store) = client();

        let loaded = client.cities().await;

        assert!(loaded.offline);
        assert_eq!(loaded.data, fallback_cities());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cities_failing_status_is_not_cached() {
        let (client, api, store) = client();
        api.route("/cities", 500, json!({"detail": "down"}));

        let loaded = client.cities().await;

        assert!(loaded.offline);
        assert_eq!(loaded.data, fallback_cities());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_recommendations_page() {
        let (client, api, store) = client();
        api.route(
            "/recommendations?city=nagpur&top_n=5",
            200,
            json!({"city": "Nagpur", "recommendations": [rental_json("NAG-1", 6000), rental_json("NAG-2", 7000)]}),
        );

        let loaded = client.listings("nagpur", "", RankBy::Match).await;

        assert!(!loaded.offline);
        assert_eq!(loaded.data.title(), "Rentals in Nagpur");
        assert_eq!(loaded.data.subtitle(), "2 properties • Sorted by suitability");
        assert_eq!(loaded.data.mode, ListingsMode::Recommendations);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_search_page_uses_upper_case_city_when_missing() {
        let (client, api, _store) = client();
        api.route(
            "/search?city=pune&query=hostel&rank_by=safety&top_n=10",
            200,
            json!({"results": [rental_json("PUN-3", 8000)]}),
        );

        let loaded = client.listings("pune", "hostel", RankBy::Safety).await;

        assert_eq!(loaded.data.title(), "Rentals in PUNE");
        assert_eq!(loaded.data.subtitle(), "1 results • Ranked by safety");
        assert_eq!(loaded.data.rentals[0].property_id, "PUN-3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_listings_offline_without_cache_is_empty() {
        let (client, _api, _store) = client();

        let loaded = client.listings("pune", "", RankBy::Match).await;

        assert!(loaded.offline);
        assert!(loaded.data.rentals.is_empty());
        assert_eq!(loaded.data.city, "PUNE");
    }

    #[tokio::test(start_paused = true)]
    async fn test_listings_recover_from_cache_after_earlier_success() {
        let api = Arc::new(FakeApi::default());
        let store = Arc::new(MemoryStore::new());
        api.route(
            "/recommendations?city=pune&top_n=5",
            200,
            json!({"city": "Pune", "recommendations": [rental_json("PUN-1", 9000)]}),
        );
        let online = RentSureClient::new(BASE, ResilientClient::new(api, store.clone()));
        online.listings("pune", "", RankBy::Match).await;

        let offline_api = Arc::new(FakeApi::default());
        let offline = RentSureClient::new(BASE, ResilientClient::new(offline_api.clone(), store));
        let loaded = offline.listings("pune", "", RankBy::Match).await;

        assert!(loaded.offline);
        assert_eq!(loaded.data.city, "Pune");
        assert_eq!(loaded.data.rentals.len(), 1);
        assert_eq!(offline_api.requests_to("/recommendations?city=pune&top_n=5").len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rental_failing_status_is_not_found() {
        let (client, api, _store) = client();
        api.route("/rental/PUN-404", 404, json!({"detail": "Rental not found"}));

        let err = client.rental("PUN-404").await.unwrap_err();

        assert!(matches!(err, ApiError::NotFound(ref m) if m.contains("PUN-404")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rental_network_error_without_cache() {
        let (client, _api, _store) = client();

        let err = client.rental("PUN-1").await.unwrap_err();

        assert!(matches!(err, ApiError::Fetch(FetchError::Transport(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rental_and_extras() {
        let (client, api, store) = client();
        api.route(
            "/rental/PUN-7",
            200,
            json!({
                "city": "Pune",
                "overall_score": 81.0,
                "property": {"property_id": "PUN-7", "rent": 9000, "owner_id": "OWN-3"}
            }),
        );
        api.route("/proximity/PUN-7", 200, json!({"nearby_college": "COEP", "commute_minutes": 12, "best_for": "college"}));
        api.route("/tiffin/PUN-7", 200, json!({"options": [{"provider": "Annapurna", "price_per_meal": 60, "veg_only": true, "rating": 4.5}]}));
        api.route("/owner/OWN-3/trust", 200, json!({"owner": {"owner_id": "OWN-3", "name": "Asha", "average_rating": 4.7}, "trust_score": 92, "trust_label": "Highly trusted"}));
        api.route("/owner/OWN-3", 200, json!({"name": "Asha", "phone": "98xxxxxx10", "email": "asha@example.com", "city": "Pune"}));
        api.route("/neighborhood/PUN-7", 500, json!({"detail": "unavailable"}));

        let details = client.rental("PUN-7").await.unwrap();
        assert!(!details.offline);
        assert_eq!(details.data.overall_score, Some(81.0));
        assert!(store.get(&cache_key("http://api.test/rental/PUN-7")).is_some());

        let extras = client.rental_extras(&details.data).await;
        assert_eq!(extras.proximity.unwrap().commute_minutes, Some(12));
        assert!(extras.neighborhood.is_none());
        assert_eq!(extras.tiffin.len(), 1);
        assert_eq!(extras.owner_trust.unwrap().trust_label.as_deref(), Some("Highly trusted"));
        assert_eq!(extras.owner.unwrap().city.as_deref(), Some("Pune"));

        // Extras are not cached
        assert!(store.get(&cache_key("http://api.test/proximity/PUN-7")).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_extras_skip_owner_without_owner_id() {
        let (client, api, _store) = client();
        let details: RentalDetails = serde_json::from_value(json!({
            "property": {"property_id": "NAG-9", "rent": 5000}
        }))
        .unwrap();

        let extras = client.rental_extras(&details).await;

        assert_eq!(extras, RentalExtras::default());
        let owner_calls = api
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| u.contains("/owner/"))
            .count();
        assert_eq!(owner_calls, 0);
    }

    #[tokio::test]
    async fn test_trust_metrics() {
        let (client, api, _store) = client();
        api.route("/trust-metrics", 200, json!({"trust_score": ["Verified ID"], "safety_score": ["CCTV", "Lighting"]}));

        let metrics = client.trust_metrics().await.unwrap();

        assert_eq!(metrics.data.trust_score, ["Verified ID"]);
        assert_eq!(metrics.data.safety_score.len(), 2);
    }

    #[tokio::test]
    async fn test_split_expenses_posts_json() {
        let (client, api, store) = client();
        api.route("/expenses/split", 200, json!({"total": 15000.0, "roommates": 3, "per_person": 5000.0}));

        let split = client
            .split_expenses(&ExpenseSplitRequest {
                total_rent: 14000.0,
                utilities: 1000.0,
                roommates: 3,
            })
            .await
            .unwrap();

        assert_eq!(split.per_person, 5000.0);
        let sent = api.requests_to("/expenses/split");
        assert_eq!(sent[0].method, Method::Post);
        let body: Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"total_rent": 14000.0, "utilities": 1000.0, "roommates": 3}));
        assert!(store.is_empty(), "Actions are never cached");
    }

    #[tokio::test]
    async fn test_generate_agreement_returns_text() {
        let (client, api, _store) = client();
        api.route("/agreement", 200, json!({"agreement_text": "RENTAL AGREEMENT..."}));

        let text = client
            .generate_agreement(&AgreementRequest {
                property_id: "PUN-7".to_string(),
                tenant_name: "Student Tenant".to_string(),
                start_date: "2026-07-01".to_string(),
                duration_months: 11,
                deposit_amount: 20000,
            })
            .await
            .unwrap();

        assert_eq!(text, "RENTAL AGREEMENT...");
    }

    #[tokio::test]
    async fn test_pay_initiates_then_confirms() {
        let (client, api, _store) = client();
        api.route("/payment/initiate", 200, json!({"transaction_id": "TXN-42"}));
        api.route("/payment/confirm", 200, json!({"status": "success"}));

        let confirmation = client
            .pay(&PaymentRequest {
                property_id: "PUN-7".to_string(),
                amount: 9000,
                method: "UPI".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(confirmation.status, "success");
        assert_eq!(confirmation.transaction_id.as_deref(), Some("TXN-42"));
        let confirm_body = api.requests_to("/payment/confirm")[0].body.clone().unwrap();
        assert_eq!(serde_json::from_str::<Value>(&confirm_body).unwrap(), json!({"transaction_id": "TXN-42"}));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pay_stops_when_initiate_fails() {
        let (client, api, _store) = client();
        api.route("/payment/initiate", 400, json!({"detail": "Invalid amount"}));

        let err = client
            .pay(&PaymentRequest {
                property_id: "PUN-7".to_string(),
                amount: 0,
                method: "UPI".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Status { status: 400, ref detail } if detail == "Invalid amount"));
        assert!(api.requests_to("/payment/confirm").is_empty());
    }

    #[tokio::test]
    async fn test_owner_properties_sends_bearer_token_once() {
        let (client, api, _store) = client();
        api.route(
            "/owner/properties",
            200,
            json!({"properties": [{
                "id": 1, "title": "Sunrise PG", "description": "Girls PG near COEP",
                "city": "pune", "rent": 8000, "availability": true, "safety_score": 4.5,
                "created_at": "2026-03-01T09:15:00"
            }]}),
        );

        let properties = client.owner_properties("tok").await.unwrap();

        assert_eq!(properties[0].title, "Sunrise PG");
        assert!(properties[0].owner_id.is_none());
        assert_eq!(properties[0].created_at.as_deref(), Some("2026-03-01T09:15:00"));
        let sent = api.requests_to("/owner/properties");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].headers, vec![("Authorization".to_string(), "Bearer tok".to_string())]);
    }

    #[tokio::test]
    async fn test_owner_request_is_not_retried() {
        let (client, api, _store) = client();
        api.route("/owner/properties/3", 403, json!({"detail": "Not your property"}));

        let err = client.delete_property("tok", 3).await.unwrap_err();

        assert_eq!(err.to_string(), "Request failed with status 403: Not your property");
        let sent = api.requests_to("/owner/properties/3");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Delete);
    }

    #[tokio::test]
    async fn test_create_update_and_availability() {
        let (client, api, _store) = client();
        api.route("/owner/properties", 200, json!({"id": 9}));
        api.route("/owner/properties/9", 200, json!({"id": 9}));
        api.route("/owner/properties/9/availability?availability=false", 200, json!({}));

        let mut form = PropertyForm::new("nagpur");
        form.title = "VNIT Hostel".to_string();
        form.rent = 5500;

        client.create_property("tok", &form).await.unwrap();
        form.rent = 6000;
        client.update_property("tok", 9, &form).await.unwrap();
        client.set_availability("tok", 9, false).await.unwrap();

        let created = &api.requests_to("/owner/properties")[0];
        assert_eq!(created.method, Method::Post);
        let updated = &api.requests_to("/owner/properties/9")[0];
        assert_eq!(updated.method, Method::Put);
        let body: Value = serde_json::from_str(updated.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["rent"], 6000);
        let patched = &api.requests_to("/owner/properties/9/availability?availability=false")[0];
        assert_eq!(patched.method, Method::Patch);
    }

    #[test]
    fn test_status_error_detail_fallbacks() {
        let with_list = status_error(&FetchResponse::new(422, r#"{"detail":[{"msg":"bad"}]}"#));
        assert!(matches!(with_list, ApiError::Status { status: 422, ref detail } if detail.contains("bad")));

        let plain = status_error(&FetchResponse::new(502, "Bad Gateway"));
        assert!(matches!(plain, ApiError::Status { ref detail, .. } if detail == "Bad Gateway"));

        let empty = status_error(&FetchResponse::new(500, ""));
        assert!(matches!(empty, ApiError::Status { ref detail, .. } if detail == "Request failed"));
    }
}

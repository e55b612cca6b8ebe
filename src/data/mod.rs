//! Data models for the RentSure API
//!
//! These types mirror the JSON returned by the remote API. Most fields are
//! optional because the API omits them for older listings.

pub mod cities;
pub mod client;

pub use cities::{city_meta, fallback_cities, CityMeta};
pub use client::{ApiError, Listings, ListingsMode, Loaded, RentSureClient, RentalExtras};

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A city the marketplace operates in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// Lowercase identifier used in URLs (e.g. "pune")
    pub id: String,
    /// Display name
    pub name: String,
}

/// Response of `GET /cities`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityList {
    #[serde(default)]
    pub cities: Vec<City>,
}

/// Identifier that the API sends either as a number or a string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(i64),
    Text(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Number(n) => write!(f, "{}", n),
            Id::Text(s) => f.write_str(s),
        }
    }
}

/// A rental listing as returned by recommendations, search and detail endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rental {
    pub property_id: String,
    /// Monthly rent in rupees
    pub rent: u32,
    /// Distance from the reference college or office
    #[serde(default)]
    pub distance_km: f64,
    /// Safety score (0-100)
    #[serde(default)]
    pub safety_score: f64,
    /// Owner trust score (0-100)
    #[serde(default)]
    pub trust_score: f64,
    #[serde(default)]
    pub description: String,
    pub overall_score: Option<f64>,
    /// Campus proximity fit (0-10)
    pub campus_fit_score: Option<f64>,
    pub police_distance_km: Option<f64>,
    pub cctv_coverage: Option<f64>,
    pub street_lighting: Option<f64>,
    pub transit_access: Option<f64>,
    /// "Fair", "Low" or "High"
    pub price_fairness: Option<String>,
    pub response_time_minutes: Option<u32>,
    pub complaints_count: Option<u32>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_direct_owner: bool,
    /// "available", "limited" or "occupied"
    pub availability_status: Option<String>,
    pub payment_methods: Option<Vec<String>>,
    /// "male", "female" or "any"
    pub gender_preference: Option<String>,
    pub owner_id: Option<Id>,
    pub owner_name: Option<String>,
    pub nearby_college: Option<String>,
    pub college_distance_km: Option<f64>,
    pub nearby_office_hub: Option<String>,
    pub office_distance_km: Option<f64>,
}

/// Response of `GET /recommendations`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub city: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<Rental>,
}

/// Response of `GET /search`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub city: Option<String>,
    #[serde(default)]
    pub results: Vec<Rental>,
}

/// How the overall score of a listing was assembled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Out of 30
    pub budget_fit: f64,
    /// Out of 30
    pub distance_fit: f64,
    /// Out of 20
    pub safety_contribution: f64,
    /// Out of 20
    pub trust_contribution: f64,
}

/// Response of `GET /rental/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalDetails {
    pub property: Rental,
    #[serde(default)]
    pub city: String,
    pub overall_score: Option<f64>,
    pub score_breakdown: Option<ScoreBreakdown>,
}

/// Response of `GET /trust-metrics`: the factors behind each score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrustMetrics {
    #[serde(default)]
    pub trust_score: Vec<String>,
    #[serde(default)]
    pub safety_score: Vec<String>,
}

/// Response of `GET /proximity/{property_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proximity {
    pub nearby_college: Option<String>,
    pub college_distance_km: Option<f64>,
    pub nearby_office_hub: Option<String>,
    pub office_distance_km: Option<f64>,
    pub commute_minutes: Option<u32>,
    /// Out of 100
    pub proximity_score: Option<f64>,
    /// "college" or "office"
    pub best_for: Option<String>,
}

/// Response of `GET /neighborhood/{property_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighborhood {
    pub neighborhood: Option<String>,
    pub city_zone: Option<String>,
    pub women_safety_index: Option<f64>,
    pub crime_index: Option<f64>,
    pub night_transit_score: Option<f64>,
}

/// A meal subscription near a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiffinOption {
    pub provider: String,
    pub price_per_meal: Option<f64>,
    #[serde(default)]
    pub veg_only: bool,
    pub rating: Option<f64>,
}

/// Response of `GET /tiffin/{property_id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TiffinOptions {
    #[serde(default)]
    pub options: Vec<TiffinOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub owner_id: Option<Id>,
    pub name: Option<String>,
    pub average_rating: Option<f64>,
}

/// Response of `GET /owner/{owner_id}/trust`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerTrust {
    pub owner: OwnerSummary,
    pub trust_score: f64,
    pub trust_label: Option<String>,
}

/// Response of `GET /owner/{owner_id}`: contact details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerDetails {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

/// Body of `POST /agreement`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgreementRequest {
    pub property_id: String,
    pub tenant_name: String,
    /// ISO date (YYYY-MM-DD)
    pub start_date: String,
    pub duration_months: u32,
    pub deposit_amount: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgreementResponse {
    #[serde(default)]
    pub agreement_text: String,
}

/// Body of `POST /payment/initiate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub property_id: String,
    pub amount: u32,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInitiated {
    pub transaction_id: String,
}

/// Body of `POST /payment/confirm`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmRequest {
    pub transaction_id: String,
}

/// Final state of a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub status: String,
    pub transaction_id: Option<String>,
}

/// Body of `POST /expenses/split`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSplitRequest {
    pub total_rent: f64,
    pub utilities: f64,
    pub roommates: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    pub total: f64,
    pub roommates: u32,
    pub per_person: f64,
}

/// A property as managed from the owner dashboard
///
/// The listing endpoint sends only a subset of the columns, any of which
/// may be null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerProperty {
    pub id: i64,
    pub owner_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rent: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub availability: bool,
    pub safety_score: Option<f64>,
    pub trust_score: Option<f64>,
    pub nearby_college: Option<String>,
    pub college_distance_km: Option<f64>,
    pub nearby_office_hub: Option<String>,
    pub office_distance_km: Option<f64>,
    /// ISO timestamp of when the property was listed
    pub created_at: Option<String>,
}

/// Reads a JSON `null` as the type's default value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response of `GET /owner/properties`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerPropertyList {
    #[serde(default)]
    pub properties: Vec<OwnerProperty>,
}

/// Body for creating or updating a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyForm {
    pub title: String,
    pub description: String,
    pub city: String,
    pub rent: u32,
    pub availability: bool,
    pub safety_score: f64,
    pub nearby_college: Option<String>,
    pub college_distance_km: Option<f64>,
    pub nearby_office_hub: Option<String>,
    pub office_distance_km: Option<f64>,
}

impl PropertyForm {
    /// Empty form for `city`; availability on, safety 4.0
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            city: city.into(),
            rent: 0,
            availability: true,
            safety_score: 4.0,
            nearby_college: None,
            college_distance_km: None,
            nearby_office_hub: None,
            office_distance_km: None,
        }
    }
}

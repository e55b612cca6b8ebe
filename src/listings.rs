//! Client-side refinement of listing results
//!
//! The API returns a short ranked list per city; narrowing it down by budget,
//! trust, gender preference or a chosen college/office happens here, along
//! with the badges shown next to each listing.

use std::cmp::Ordering;
use std::fmt;

use crate::data::Rental;

/// Trust score at which an owner counts as verified
pub const VERIFIED_TRUST_SCORE: f64 = 85.0;

/// Default upper bound for the monthly rent filter
pub const DEFAULT_BUDGET_MAX: u32 = 30_000;

/// Ranking requested from `/search`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankBy {
    /// Best overall match
    #[default]
    Match,
    /// Closest to a college
    College,
    /// Closest to an office hub
    Office,
    /// Highest safety score
    Safety,
}

impl RankBy {
    /// All rankings in display order
    pub fn all() -> &'static [RankBy] {
        &[RankBy::Match, RankBy::College, RankBy::Office, RankBy::Safety]
    }

    /// Parses a ranking name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "match" | "best" => Some(RankBy::Match),
            "college" => Some(RankBy::College),
            "office" => Some(RankBy::Office),
            "safety" => Some(RankBy::Safety),
            _ => None,
        }
    }

    /// Value sent as the `rank_by` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            RankBy::Match => "match",
            RankBy::College => "college",
            RankBy::Office => "office",
            RankBy::Safety => "safety",
        }
    }
}

impl fmt::Display for RankBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tenant gender filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenderFilter {
    #[default]
    Any,
    Male,
    Female,
}

impl GenderFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "any" => Some(GenderFilter::Any),
            "male" => Some(GenderFilter::Male),
            "female" => Some(GenderFilter::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GenderFilter::Any => "any",
            GenderFilter::Male => "male",
            GenderFilter::Female => "female",
        }
    }

    /// Whether a listing's preference admits this tenant
    ///
    /// Listings with no preference (missing or empty), or "any", admit everyone.
    fn admits(&self, preference: Option<&str>) -> bool {
        match (self, preference) {
            (GenderFilter::Any, _) | (_, None) | (_, Some("")) | (_, Some("any")) => true,
            (filter, Some(pref)) => pref == filter.as_str(),
        }
    }
}

/// Filters applied to a listing page
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFilter {
    /// Keep only owners with trust score of at least 85
    pub verified_only: bool,
    pub budget_max: u32,
    pub gender: GenderFilter,
    /// Keep only listings near this college and sort by distance to it
    pub college: Option<String>,
    /// Keep only listings near this office hub and sort by distance to it
    pub office: Option<String>,
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            verified_only: false,
            budget_max: DEFAULT_BUDGET_MAX,
            gender: GenderFilter::Any,
            college: None,
            office: None,
        }
    }
}

/// Distance used for sorting, with the general distance as fallback
fn distance_or_fallback(specific: Option<f64>, rental: &Rental) -> f64 {
    specific
        .filter(|d| *d != 0.0)
        .unwrap_or(rental.distance_km)
}

impl ListingFilter {
    fn admits(&self, rental: &Rental) -> bool {
        if self.verified_only && rental.trust_score < VERIFIED_TRUST_SCORE {
            return false;
        }
        if rental.rent > self.budget_max {
            return false;
        }
        if !self.gender.admits(rental.gender_preference.as_deref()) {
            return false;
        }
        if let Some(college) = &self.college {
            if rental.nearby_college.as_deref() != Some(college.as_str()) {
                return false;
            }
        }
        if let Some(office) = &self.office {
            if rental.nearby_office_hub.as_deref() != Some(office.as_str()) {
                return false;
            }
        }
        true
    }

    /// Distance from `rental` to the selected college or office, if any is selected
    pub fn target_distance(&self, rental: &Rental) -> Option<f64> {
        if self.college.is_some() {
            Some(distance_or_fallback(rental.college_distance_km, rental))
        } else if self.office.is_some() {
            Some(distance_or_fallback(rental.office_distance_km, rental))
        } else {
            None
        }
    }

    /// Returns the matching rentals
    ///
    /// With a college or office selected the result is ordered by distance to
    /// it (stable for ties); otherwise the API's order is kept.
    pub fn apply(&self, rentals: &[Rental]) -> Vec<Rental> {
        let mut matching: Vec<Rental> = rentals.iter().filter(|r| self.admits(r)).cloned().collect();

        if self.college.is_some() || self.office.is_some() {
            matching.sort_by(|a, b| {
                let da = self.target_distance(a).unwrap_or(0.0);
                let db = self.target_distance(b).unwrap_or(0.0);
                da.partial_cmp(&db).unwrap_or(Ordering::Equal)
            });
        }

        matching
    }

    /// Note such as "1.2km to COEP" for the selected college or office
    pub fn distance_note(&self, rental: &Rental) -> Option<String> {
        let place = self.college.as_deref().or(self.office.as_deref())?;
        let distance = self.target_distance(rental)?;
        Some(format!("{:.1}km to {}", distance, place))
    }
}

/// A badge shown on a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub text: &'static str,
    /// Rendered with the "verified" highlight
    pub verified: bool,
}

impl Tag {
    const fn plain(text: &'static str) -> Self {
        Self { text, verified: false }
    }
}

/// Badges derived from a listing's description and scores
pub fn tags(rental: &Rental) -> Vec<Tag> {
    let text = rental.description.to_lowercase();
    let mut tags = Vec::new();

    if text.contains("pg") {
        tags.push(Tag::plain("PG"));
    }
    if text.contains("hostel") {
        tags.push(Tag::plain("Hostel"));
    }
    if text.contains("1bhk") {
        tags.push(Tag::plain("1BHK"));
    }
    if rental.trust_score >= VERIFIED_TRUST_SCORE {
        tags.push(Tag {
            text: "Verified",
            verified: true,
        });
    }
    if rental.distance_km <= 3.0 {
        tags.push(Tag::plain("Nearby"));
    }
    if text.contains("metro") {
        tags.push(Tag::plain("Metro access"));
    }

    if rental.safety_score >= 90.0 {
        tags.push(Tag::plain("Women-safe zone"));
    }
    if rental.cctv_coverage.is_some_and(|v| v >= 90.0) {
        tags.push(Tag::plain("CCTV strong"));
    }
    if rental.street_lighting.is_some_and(|v| v >= 85.0) {
        tags.push(Tag::plain("Well-lit"));
    }
    if rental.transit_access.is_some_and(|v| v >= 85.0) {
        tags.push(Tag::plain("Late-night transit"));
    }
    if rental.police_distance_km.is_some_and(|d| d <= 1.0) {
        tags.push(Tag::plain("Police nearby"));
    }

    tags
}

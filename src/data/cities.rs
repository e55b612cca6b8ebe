//! Built-in city data
//!
//! Used when the city list cannot be loaded and to offer the colleges and
//! office hubs that listings can be filtered by.

use super::City;

/// Colleges and office hubs known for a city
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityMeta {
    pub colleges: &'static [&'static str],
    pub offices: &'static [&'static str],
}

const EMPTY: CityMeta = CityMeta {
    colleges: &[],
    offices: &[],
};

/// Cities shown when `/cities` is unreachable and nothing is cached
pub fn fallback_cities() -> Vec<City> {
    [("nagpur", "Nagpur"), ("pune", "Pune"), ("bengaluru", "Bengaluru")]
        .into_iter()
        .map(|(id, name)| City {
            id: id.to_string(),
            name: name.to_string(),
        })
        .collect()
}

/// Returns the colleges and office hubs for a city id (case-insensitive)
///
/// Unknown cities have no colleges or offices.
pub fn city_meta(city: &str) -> CityMeta {
    match city.to_ascii_lowercase().as_str() {
        "pune" => CityMeta {
            colleges: &["COEP", "Symbiosis", "MIT-WPU", "Fergusson College", "PICT"],
            offices: &[
                "Hinjewadi IT Park",
                "Magarpatta",
                "Kharadi EON",
                "Baner Business Bay",
                "Viman Nagar Hub",
            ],
        },
        "bengaluru" => CityMeta {
            colleges: &["Christ University", "St. Joseph's", "PES", "IIM-B", "RVCE"],
            offices: &[
                "Manyata Tech Park",
                "Koramangala Startup Hub",
                "Sarjapur ORR",
                "HSR Sector 2",
                "Whitefield ITPL",
            ],
        },
        "nagpur" => CityMeta {
            colleges: &["VNIT", "RTMNU", "YCCE", "RCOEM", "LIT", "SB JAIN"],
            offices: &["MIHAN", "Civil Lines", "Sitabuldi", "Sadar Market", "Dharampeth Hub"],
        },
        _ => EMPTY,
    }
}

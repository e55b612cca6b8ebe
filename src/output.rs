//! Plain-text rendering of API data for the terminal

use crate::data::{
    City, ExpenseSplit, Listings, OwnerProperty, PaymentConfirmation, Rental, RentalDetails,
    RentalExtras, TrustMetrics,
};
use crate::listings::{tags, ListingFilter};

/// Printed to stderr when data came from the cache or a built-in fallback
pub const OFFLINE_NOTICE: &str = "Network unavailable - showing cached data if available";

fn score(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.0}", v))
}

pub fn format_cities(cities: &[City]) -> String {
    cities
        .iter()
        .map(|c| format!("{:<12} {}", c.id, c.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One summary line for a rental, followed by its badges
pub fn format_rental_line(rental: &Rental) -> String {
    let mut line = format!(
        "{:<10} ₹{}/mo  {:.1}km  safety {:.0}  trust {:.0}",
        rental.property_id, rental.rent, rental.distance_km, rental.safety_score, rental.trust_score
    );
    let badges: Vec<String> = tags(rental)
        .iter()
        .map(|t| if t.verified { format!("✓ {}", t.text) } else { t.text.to_string() })
        .collect();
    if !badges.is_empty() {
        line.push_str("  [");
        line.push_str(&badges.join(", "));
        line.push(']');
    }
    line
}

/// Listing page: title, subtitle and the filtered rentals
pub fn format_listings(listings: &Listings, filter: &ListingFilter) -> String {
    let visible = filter.apply(&listings.rentals);
    let mut lines = vec![listings.title(), listings.subtitle(), String::new()];

    if visible.is_empty() {
        lines.push("No properties match these filters.".to_string());
    }
    for rental in &visible {
        lines.push(format_rental_line(rental));
        if let Some(note) = filter.distance_note(rental) {
            lines.push(format!("           {}", note));
        }
        if !rental.description.is_empty() {
            lines.push(format!("           {}", rental.description));
        }
    }
    lines.join("\n")
}

pub fn format_rental(details: &RentalDetails, extras: Option<&RentalExtras>) -> String {
    let rental = &details.property;
    let mut lines = vec![
        format!("{} ({})", rental.property_id, details.city),
        format!("Rent: ₹{}/month", rental.rent),
        format!(
            "Overall {}  Safety {:.0}  Trust {:.0}",
            score(details.overall_score.or(rental.overall_score)),
            rental.safety_score,
            rental.trust_score
        ),
    ];
    if !rental.description.is_empty() {
        lines.push(rental.description.clone());
    }
    if let Some(fairness) = &rental.price_fairness {
        lines.push(format!("Price fairness: {}", fairness));
    }
    if let Some(status) = &rental.availability_status {
        lines.push(format!("Availability: {}", status));
    }
    if let Some(breakdown) = &details.score_breakdown {
        lines.push(format!(
            "Breakdown: budget {:.1}/30  distance {:.1}/30  safety {:.1}/20  trust {:.1}/20",
            breakdown.budget_fit, breakdown.distance_fit, breakdown.safety_contribution, breakdown.trust_contribution
        ));
    }

    let Some(extras) = extras else {
        return lines.join("\n");
    };

    if let Some(p) = &extras.proximity {
        lines.push(String::new());
        lines.push("Proximity".to_string());
        if let (Some(college), Some(d)) = (&p.nearby_college, p.college_distance_km) {
            lines.push(format!("  {:.1}km to {}", d, college));
        }
        if let (Some(office), Some(d)) = (&p.nearby_office_hub, p.office_distance_km) {
            lines.push(format!("  {:.1}km to {}", d, office));
        }
        if let Some(minutes) = p.commute_minutes {
            lines.push(format!("  Commute: {} min", minutes));
        }
    }
    if let Some(n) = &extras.neighborhood {
        lines.push(String::new());
        lines.push(format!(
            "Neighborhood: {}",
            n.neighborhood.as_deref().unwrap_or("unknown")
        ));
        lines.push(format!(
            "  Women safety {}  Crime {}  Night transit {}",
            score(n.women_safety_index),
            score(n.crime_index),
            score(n.night_transit_score)
        ));
    }
    if !extras.tiffin.is_empty() {
        lines.push(String::new());
        lines.push("Tiffin".to_string());
        for option in &extras.tiffin {
            let price = option
                .price_per_meal
                .map_or_else(String::new, |p| format!(" ₹{:.0}/meal", p));
            let veg = if option.veg_only { " (veg)" } else { "" };
            lines.push(format!("  {}{}{}", option.provider, price, veg));
        }
    }
    if let Some(trust) = &extras.owner_trust {
        lines.push(String::new());
        lines.push(format!(
            "Owner trust: {:.0} {}",
            trust.trust_score,
            trust.trust_label.as_deref().unwrap_or("")
        ).trim_end().to_string());
    }
    if let Some(owner) = &extras.owner {
        let contact: Vec<&str> = [owner.name.as_deref(), owner.phone.as_deref(), owner.email.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !contact.is_empty() {
            lines.push(format!("Owner: {}", contact.join(" · ")));
        }
    }
    lines.join("\n")
}

pub fn format_trust_metrics(metrics: &TrustMetrics) -> String {
    let mut lines = vec!["Trust score".to_string()];
    lines.extend(metrics.trust_score.iter().map(|f| format!("  - {}", f)));
    lines.push("Safety score".to_string());
    lines.extend(metrics.safety_score.iter().map(|f| format!("  - {}", f)));
    lines.join("\n")
}

pub fn format_split(split: &ExpenseSplit) -> String {
    format!(
        "Total ₹{:.2} split {} ways: ₹{:.2} each",
        split.total, split.roommates, split.per_person
    )
}

pub fn format_payment(confirmation: &PaymentConfirmation) -> String {
    match &confirmation.transaction_id {
        Some(id) => format!("Payment {} ({})", confirmation.status, id),
        None => format!("Payment {}", confirmation.status),
    }
}

pub fn format_owner_properties(properties: &[OwnerProperty]) -> String {
    if properties.is_empty() {
        return "No properties yet.".to_string();
    }
    properties
        .iter()
        .map(|p| {
            let status = if p.availability { "available" } else { "unavailable" };
            format!("{:>4}  {:<30} {:<10} ₹{}/mo  {}", p.id, p.title, p.city, p.rent, status)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ListingsMode, OwnerTrust, OwnerSummary, TiffinOption};
    use serde_json::json;

    fn rental(id: &str, rent: u32, description: &str) -> Rental {
        serde_json::from_value(json!({
            "property_id": id,
            "rent": rent,
            "distance_km": 1.5,
            "safety_score": 90,
            "trust_score": 88,
            "description": description,
        }))
        .unwrap()
    }

    #[test]
    fn test_format_cities() {
        let cities = crate::data::fallback_cities();
        let text = format_cities(&cities);
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().next().unwrap().starts_with("nagpur"));
        assert!(text.contains("Bengaluru"));
    }

    #[test]
    fn test_format_rental_line_includes_tags() {
        let line = format_rental_line(&rental("PUN-1", 9000, "Quiet PG"));
        assert!(line.starts_with("PUN-1"));
        assert!(line.contains("₹9000/mo"));
        assert!(line.contains("PG"));
        assert!(line.contains("✓ Verified"));
    }

    #[test]
    fn test_format_listings_applies_filter() {
        let listings = Listings {
            city: "PUNE".to_string(),
            mode: ListingsMode::Recommendations,
            rentals: vec![rental("PUN-1", 9000, "PG"), rental("PUN-2", 40000, "Villa")],
        };
        let filter = ListingFilter::default();
        let text = format_listings(&listings, &filter);

        assert!(text.starts_with("Rentals in PUNE\n2 properties"));
        assert!(text.contains("PUN-1"));
        assert!(!text.contains("PUN-2"));
    }

    #[test]
    fn test_format_listings_empty() {
        let listings = Listings {
            city: "PUNE".to_string(),
            mode: ListingsMode::Recommendations,
            rentals: Vec::new(),
        };
        let text = format_listings(&listings, &ListingFilter::default());
        assert!(text.contains("No properties match"));
    }

    #[test]
    fn test_format_rental_with_extras() {
        let details = RentalDetails {
            property: rental("NAG-3", 7000, "Hostel near VNIT"),
            city: "nagpur".to_string(),
            overall_score: Some(82.4),
            score_breakdown: None,
        };
        let extras = RentalExtras {
            tiffin: vec![TiffinOption {
                provider: "Annapurna".to_string(),
                price_per_meal: Some(60.0),
                veg_only: true,
                rating: None,
            }],
            owner_trust: Some(OwnerTrust {
                owner: OwnerSummary {
                    owner_id: None,
                    name: None,
                    average_rating: None,
                },
                trust_score: 91.0,
                trust_label: Some("Trusted".to_string()),
            }),
            ..RentalExtras::default()
        };

        let text = format_rental(&details, Some(&extras));
        assert!(text.starts_with("NAG-3 (nagpur)"));
        assert!(text.contains("Overall 82"));
        assert!(text.contains("Annapurna ₹60/meal (veg)"));
        assert!(text.contains("Owner trust: 91 Trusted"));
        assert!(!text.contains("Proximity"));
    }

    #[test]
    fn test_format_trust_metrics() {
        let metrics = TrustMetrics {
            trust_score: vec!["Response time".to_string()],
            safety_score: vec!["CCTV".to_string(), "Lighting".to_string()],
        };
        let text = format_trust_metrics(&metrics);
        assert_eq!(
            text,
            "Trust score\n  - Response time\nSafety score\n  - CCTV\n  - Lighting"
        );
    }

    #[test]
    fn test_format_split_and_payment() {
        let split = ExpenseSplit {
            total: 12000.0,
            roommates: 3,
            per_person: 4000.0,
        };
        assert_eq!(format_split(&split), "Total ₹12000.00 split 3 ways: ₹4000.00 each");

        let confirmation = PaymentConfirmation {
            status: "success".to_string(),
            transaction_id: Some("TXN-9".to_string()),
        };
        assert_eq!(format_payment(&confirmation), "Payment success (TXN-9)");
    }

    #[test]
    fn test_format_owner_properties_empty() {
        assert_eq!(format_owner_properties(&[]), "No properties yet.");
    }
}

use serde::Deserialize;

use crate::features::RequestAttributes;

#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    pub rating: f64,
}

/// A stored rental listing, as sent by the listings front end.
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub location: String,
    pub price: f64,
    #[serde(default, alias = "propertyType")]
    pub property_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

const AMENITY_POINTS: [(&[&str], f64); 6] = [
    (&["wifi", "internet"], 10.0),
    (&["ac", "air conditioning"], 15.0),
    (&["parking"], 10.0),
    (&["gym", "fitness"], 15.0),
    (&["pool"], 20.0),
    (&["restaurant", "dining"], 10.0),
];

pub fn property_type_code(property_type: Option<&str>) -> u8 {
    match property_type {
        Some("Hotel") => 1,
        Some("Apartment") => 2,
        Some("Room Rental") => 3,
        Some("PG") => 4,
        Some("Land for Sale") => 5,
        Some("Business Rental") => 6,
        _ => 1,
    }
}

/// Keyword score over the description: 50 base, capped at 100.
pub fn amenities_score(description: Option<&str>) -> f64 {
    let description = description.unwrap_or_default().to_lowercase();

    let score: f64 = 50.0
        + AMENITY_POINTS
            .iter()
            .filter(|(keywords, _)| keywords.iter().any(|k| description.contains(k)))
            .map(|(_, points)| points)
            .sum::<f64>();

    score.min(100.0)
}

pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 4.0;
    }
    reviews.iter().map(|r| r.rating).sum::<f64>() / reviews.len() as f64
}

/// Request attributes describing a listing.
pub fn listing_attributes(listing: &Listing) -> RequestAttributes {
    RequestAttributes::new()
        .with("location", listing.location.as_str())
        .with("base_price", listing.price)
        .with("property_type", property_type_code(listing.property_type.as_deref()))
        .with("amenities_score", amenities_score(listing.description.as_deref()))
        .with("review_rating", average_rating(&listing.reviews))
        .with("booking_lead_time", 7)
        .with("competitor_price", listing.price * 1.1)
}

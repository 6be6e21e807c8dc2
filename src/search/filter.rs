//! Property filter engine
//!
//! A property passes when it satisfies every active predicate. Range, exact
//! and location predicates treat a missing attribute as a failure: a listing
//! without a price is hidden as soon as any price bound is set.

use crate::domain::properties::PropertyRecord;

use super::criteria::FilterCriteria;

fn contains_lowercase(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

/// Case-insensitive substring predicate where an absent attribute fails
fn text_matches(value: Option<&str>, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => contains_lowercase(value, &needle.to_lowercase()),
    }
}

/// Bound predicate where an absent attribute fails any active bound
fn within<T: PartialOrd>(value: Option<T>, min: Option<T>, max: Option<T>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

/// Free-text search over title, description, city, province and features
pub fn matches_search(property: &PropertyRecord, criteria: &FilterCriteria) -> bool {
    let Some(needle) = criteria.search.as_deref() else {
        return true;
    };
    let needle = needle.to_lowercase();
    [
        Some(property.title.as_str()),
        property.description.as_deref(),
        property.city.as_deref(),
        property.province.as_deref(),
        property.features.as_deref(),
    ]
    .into_iter()
    .any(|field| contains_lowercase(field, &needle))
}

pub fn matches_listing_type(property: &PropertyRecord, criteria: &FilterCriteria) -> bool {
    criteria
        .listing_type
        .map_or(true, |t| property.listing_type == t)
}

/// Exact and case-sensitive
pub fn matches_property_type(property: &PropertyRecord, criteria: &FilterCriteria) -> bool {
    criteria
        .property_type
        .as_deref()
        .map_or(true, |t| property.property_type.as_deref() == Some(t))
}

pub fn matches_city(property: &PropertyRecord, criteria: &FilterCriteria) -> bool {
    text_matches(property.city.as_deref(), criteria.city.as_deref())
}

pub fn matches_province(property: &PropertyRecord, criteria: &FilterCriteria) -> bool {
    text_matches(property.province.as_deref(), criteria.province.as_deref())
}

pub fn matches_price(property: &PropertyRecord, criteria: &FilterCriteria) -> bool {
    within(property.price, criteria.min_price, criteria.max_price)
}

pub fn matches_rooms(property: &PropertyRecord, criteria: &FilterCriteria) -> bool {
    within(property.rooms, criteria.min_rooms, criteria.max_rooms)
}

pub fn matches_bathrooms(property: &PropertyRecord, criteria: &FilterCriteria) -> bool {
    within(property.bathrooms, criteria.min_bathrooms, criteria.max_bathrooms)
}

pub fn matches_square_meters(property: &PropertyRecord, criteria: &FilterCriteria) -> bool {
    within(
        property.square_meters,
        criteria.min_square_meters,
        criteria.max_square_meters,
    )
}

pub fn matches_energy_class(property: &PropertyRecord, criteria: &FilterCriteria) -> bool {
    criteria
        .energy_class
        .map_or(true, |class| property.energy_class == Some(class))
}

pub fn matches_featured(property: &PropertyRecord, criteria: &FilterCriteria) -> bool {
    !criteria.featured_only || property.is_featured
}

pub fn matches_features(property: &PropertyRecord, criteria: &FilterCriteria) -> bool {
    text_matches(property.features.as_deref(), criteria.features.as_deref())
}

type Predicate = fn(&PropertyRecord, &FilterCriteria) -> bool;

const PREDICATES: [Predicate; 12] = [
    matches_search,
    matches_listing_type,
    matches_property_type,
    matches_city,
    matches_province,
    matches_price,
    matches_rooms,
    matches_bathrooms,
    matches_square_meters,
    matches_energy_class,
    matches_featured,
    matches_features,
];

impl PropertyRecord {
    /// Whether this listing passes every active predicate of `criteria`
    pub fn matches(&self, criteria: &FilterCriteria) -> bool {
        PREDICATES.iter().all(|predicate| predicate(self, criteria))
    }
}

/// Returns the listings that pass `criteria`, in input order
pub fn filter_properties<'a>(
    properties: &'a [PropertyRecord],
    criteria: &FilterCriteria,
) -> Vec<&'a PropertyRecord> {
    properties.iter().filter(|p| p.matches(criteria)).collect()
}

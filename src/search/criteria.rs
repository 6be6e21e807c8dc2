//! Filter criteria and the boundary forms that produce them
//!
//! Inside the engine every `Some` is an active predicate. The UI still speaks
//! the old convention where `""` and `0` mean "no filter", so both boundary
//! forms ([`CriteriaQuery`] and [`QuickSearch`]) normalize those to `None`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::properties::{EnergyClass, ListingType};

/// The user-chosen filter values for the listings page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    /// Free text matched against title, description, city, province and features
    pub search: Option<String>,
    pub listing_type: Option<ListingType>,
    pub property_type: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rooms: Option<i32>,
    pub max_rooms: Option<i32>,
    pub min_bathrooms: Option<i32>,
    pub max_bathrooms: Option<i32>,
    pub min_square_meters: Option<i32>,
    pub max_square_meters: Option<i32>,
    pub energy_class: Option<EnergyClass>,
    pub featured_only: bool,
    pub features: Option<String>,
}

fn text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Integer bounds are active only when strictly positive
fn bound(value: Option<i32>) -> Option<i32> {
    value.filter(|v| *v > 0)
}

fn price_bound(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

impl FilterCriteria {
    /// True when no predicate is active
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Maps the legacy "unset" sentinels (blank text, zero or negative bounds) to `None`
    pub fn normalized(self) -> Self {
        Self {
            search: text(self.search),
            listing_type: self.listing_type,
            property_type: text(self.property_type),
            city: text(self.city),
            province: text(self.province),
            min_price: price_bound(self.min_price),
            max_price: price_bound(self.max_price),
            min_rooms: bound(self.min_rooms),
            max_rooms: bound(self.max_rooms),
            min_bathrooms: bound(self.min_bathrooms),
            max_bathrooms: bound(self.max_bathrooms),
            min_square_meters: bound(self.min_square_meters),
            max_square_meters: bound(self.max_square_meters),
            energy_class: self.energy_class,
            featured_only: self.featured_only,
            features: text(self.features),
        }
    }

    /// Overlays every active field of `other` onto `self`
    pub fn merged_with(mut self, other: FilterCriteria) -> Self {
        macro_rules! overlay {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        overlay!(
            search,
            listing_type,
            property_type,
            city,
            province,
            min_price,
            max_price,
            min_rooms,
            max_rooms,
            min_bathrooms,
            max_bathrooms,
            min_square_meters,
            max_square_meters,
            energy_class,
            features
        );
        self.featured_only |= other.featured_only;
        self
    }
}

/// Criteria as they arrive in a query string.
///
/// Everything is read as text first so that blank values from untouched
/// form controls mean "no filter" instead of failing the whole request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CriteriaQuery {
    pub search: Option<String>,
    pub listing_type: Option<String>,
    pub property_type: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_rooms: Option<String>,
    pub max_rooms: Option<String>,
    pub min_bathrooms: Option<String>,
    pub max_bathrooms: Option<String>,
    pub min_square_meters: Option<String>,
    pub max_square_meters: Option<String>,
    pub energy_class: Option<String>,
    pub featured_only: Option<String>,
    pub features: Option<String>,
}

fn parse_field<T: std::str::FromStr>(value: Option<String>, field: &str) -> Result<Option<T>, String> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| format!("invalid value '{}' for {}", raw, field)),
    }
}

fn parse_flag(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim),
        Some("true") | Some("1") | Some("on") | Some("yes")
    )
}

impl CriteriaQuery {
    /// Parses and normalizes; malformed numbers or enum values are an error
    pub fn into_criteria(self) -> Result<FilterCriteria, String> {
        let criteria = FilterCriteria {
            search: self.search,
            listing_type: parse_field(self.listing_type, "listingType")?,
            property_type: self.property_type,
            city: self.city,
            province: self.province,
            min_price: parse_field(self.min_price, "minPrice")?,
            max_price: parse_field(self.max_price, "maxPrice")?,
            min_rooms: parse_field(self.min_rooms, "minRooms")?,
            max_rooms: parse_field(self.max_rooms, "maxRooms")?,
            min_bathrooms: parse_field(self.min_bathrooms, "minBathrooms")?,
            max_bathrooms: parse_field(self.max_bathrooms, "maxBathrooms")?,
            min_square_meters: parse_field(self.min_square_meters, "minSquareMeters")?,
            max_square_meters: parse_field(self.max_square_meters, "maxSquareMeters")?,
            energy_class: parse_field(self.energy_class, "energyClass")?,
            featured_only: parse_flag(self.featured_only),
            features: self.features,
        };
        Ok(criteria.normalized())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// The home page quick search, carried to the listings page through the
/// hand-off slot. Only the fields the user touched are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<String>,
    /// Applied to both the free-text search and the city filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
}

impl QuickSearch {
    /// Merges onto fresh all-unset criteria; unknown listing types are ignored
    pub fn into_criteria(self) -> FilterCriteria {
        let location = self.location.map(|l| l.trim().to_string());
        FilterCriteria {
            listing_type: self.listing_type.and_then(|t| t.parse().ok()),
            search: location.clone(),
            city: location,
            property_type: self.property_type,
            min_price: self.min_price,
            max_price: self.max_price,
            ..FilterCriteria::default()
        }
        .normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_maps_sentinels_to_none() {
        let criteria = FilterCriteria {
            search: Some("  ".to_string()),
            city: Some(String::new()),
            min_price: Some(0.0),
            max_rooms: Some(0),
            features: Some("giardino".to_string()),
            min_bathrooms: Some(2),
            ..FilterCriteria::default()
        }
        .normalized();

        assert_eq!(criteria.search, None);
        assert_eq!(criteria.city, None);
        assert_eq!(criteria.min_price, None);
        assert_eq!(criteria.max_rooms, None);
        assert_eq!(criteria.features.as_deref(), Some("giardino"));
        assert_eq!(criteria.min_bathrooms, Some(2));
    }

    #[test]
    fn negative_bounds_are_unset() {
        let query = CriteriaQuery {
            min_rooms: Some("-1".to_string()),
            max_bathrooms: Some("-2".to_string()),
            min_square_meters: Some("-50".to_string()),
            min_price: Some("-1".to_string()),
            ..CriteriaQuery::default()
        };
        let criteria = query.into_criteria().unwrap();

        assert_eq!(criteria.min_rooms, None);
        assert_eq!(criteria.max_bathrooms, None);
        assert_eq!(criteria.min_square_meters, None);
        assert_eq!(criteria.min_price, None);
        assert!(criteria.is_empty());
    }

    #[test]
    fn query_with_blank_and_zero_values_is_empty() {
        let query = CriteriaQuery {
            search: Some(String::new()),
            listing_type: Some(String::new()),
            min_price: Some("0".to_string()),
            max_rooms: Some(" ".to_string()),
            featured_only: Some("false".to_string()),
            ..CriteriaQuery::default()
        };
        assert!(query.into_criteria().unwrap().is_empty());
    }

    #[test]
    fn query_parses_typed_fields() {
        let query = CriteriaQuery {
            listing_type: Some("affitto".to_string()),
            min_price: Some("120000.5".to_string()),
            min_rooms: Some("3".to_string()),
            energy_class: Some("A+".to_string()),
            featured_only: Some("1".to_string()),
            ..CriteriaQuery::default()
        };
        let criteria = query.into_criteria().unwrap();

        assert_eq!(criteria.listing_type, Some(ListingType::Rent));
        assert_eq!(criteria.min_price, Some(120000.5));
        assert_eq!(criteria.min_rooms, Some(3));
        assert_eq!(criteria.energy_class, Some(EnergyClass::APlus));
        assert!(criteria.featured_only);
    }

    #[test]
    fn query_rejects_malformed_numbers() {
        let query = CriteriaQuery {
            max_price: Some("cheap".to_string()),
            ..CriteriaQuery::default()
        };
        let err = query.into_criteria().unwrap_err();
        assert!(err.contains("maxPrice"));
    }

    #[test]
    fn quick_search_location_feeds_search_and_city() {
        let payload: QuickSearch =
            serde_json::from_str(r#"{"listingType":"rent","location":"Rome"}"#).unwrap();
        let criteria = payload.into_criteria();

        assert_eq!(criteria.listing_type, Some(ListingType::Rent));
        assert_eq!(criteria.search.as_deref(), Some("Rome"));
        assert_eq!(criteria.city.as_deref(), Some("Rome"));
        assert_eq!(
            FilterCriteria {
                listing_type: None,
                search: None,
                city: None,
                ..criteria
            },
            FilterCriteria::default()
        );
    }

    #[test]
    fn quick_search_accepts_prices_as_text() {
        let payload: QuickSearch = serde_json::from_str(
            r#"{"listingType":"","minPrice":"100000","maxPrice":0,"propertyType":""}"#,
        )
        .unwrap();
        let criteria = payload.into_criteria();

        assert_eq!(criteria.listing_type, None);
        assert_eq!(criteria.min_price, Some(100000.0));
        assert_eq!(criteria.max_price, None);
        assert_eq!(criteria.property_type, None);
    }

    #[test]
    fn merge_keeps_base_where_overlay_is_unset() {
        let base = FilterCriteria {
            city: Some("Roma".to_string()),
            min_price: Some(1000.0),
            ..FilterCriteria::default()
        };
        let overlay = FilterCriteria {
            min_price: Some(2000.0),
            featured_only: true,
            ..FilterCriteria::default()
        };
        let merged = base.merged_with(overlay);

        assert_eq!(merged.city.as_deref(), Some("Roma"));
        assert_eq!(merged.min_price, Some(2000.0));
        assert!(merged.featured_only);
    }
}

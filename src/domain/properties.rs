//! Property listing domain types
//!
//! A listing as the site shows it, plus the admin write payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Shown wherever a listing has no price
pub const PRICE_ON_REQUEST: &str = "Prezzo su richiesta";

/// Whether a listing is offered for sale or for rent.
///
/// Stored as the Italian labels used by the site ("vendita" / "affitto");
/// the English names are accepted on input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ListingType {
    #[default]
    #[serde(rename = "vendita", alias = "sale")]
    Sale,
    #[serde(rename = "affitto", alias = "rent")]
    Rent,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "vendita",
            Self::Rent => "affitto",
        }
    }

    /// Stored value to listing type; absent or unknown values read as a sale
    pub fn from_stored(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for ListingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vendita" | "sale" => Ok(Self::Sale),
            "affitto" | "rent" => Ok(Self::Rent),
            other => Err(format!("unknown listing type '{}'", other)),
        }
    }
}

impl std::fmt::Display for ListingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of property the agency lists
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Appartamento,
    Villa,
    Ufficio,
    Terreno,
    Magazzino,
    Altro,
}

impl PropertyType {
    pub const ALL: [PropertyType; 6] = [
        Self::Appartamento,
        Self::Villa,
        Self::Ufficio,
        Self::Terreno,
        Self::Magazzino,
        Self::Altro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Appartamento => "appartamento",
            Self::Villa => "villa",
            Self::Ufficio => "ufficio",
            Self::Terreno => "terreno",
            Self::Magazzino => "magazzino",
            Self::Altro => "altro",
        }
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown property type '{}'", s))
    }
}

/// Energy performance certificate class
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EnergyClass {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl EnergyClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::G => "G",
        }
    }
}

impl FromStr for EnergyClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A+" => Ok(Self::APlus),
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            "E" => Ok(Self::E),
            "F" => Ok(Self::F),
            "G" => Ok(Self::G),
            other => Err(format!("unknown energy class '{}'", other)),
        }
    }
}

/// A property listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyRecord {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// `None` means "price on request"
    pub price: Option<f64>,
    #[serde(default)]
    pub listing_type: ListingType,
    pub city: Option<String>,
    pub province: Option<String>,
    pub property_type: Option<String>,
    pub rooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub square_meters: Option<i32>,
    pub energy_class: Option<EnergyClass>,
    /// Comma-separated tags
    pub features: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    /// First image is the cover
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PropertyRecord {
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn price_label(&self) -> String {
        match self.price {
            Some(price) => format!("€ {:.0}", price),
            None => PRICE_ON_REQUEST.to_string(),
        }
    }

    pub fn feature_tags(&self) -> Vec<&str> {
        self.features
            .as_deref()
            .map(|f| f.split(',').map(str::trim).filter(|t| !t.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Listing as shown on cards and the detail page
#[derive(Debug, Clone, Serialize)]
pub struct PropertyView {
    #[serde(flatten)]
    pub property: PropertyRecord,
    pub price_label: String,
    pub cover_image: Option<String>,
    pub feature_tags: Vec<String>,
}

impl From<&PropertyRecord> for PropertyView {
    fn from(property: &PropertyRecord) -> Self {
        Self {
            price_label: property.price_label(),
            cover_image: property.cover_image().map(str::to_string),
            feature_tags: property.feature_tags().into_iter().map(str::to_string).collect(),
            property: property.clone(),
        }
    }
}

/// Request DTO for creating or replacing a listing
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub listing_type: ListingType,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub rooms: Option<i32>,
    #[serde(default)]
    pub bathrooms: Option<i32>,
    #[serde(default)]
    pub square_meters: Option<i32>,
    #[serde(default)]
    pub energy_class: Option<EnergyClass>,
    #[serde(default)]
    pub features: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub images: Vec<String>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl PropertyInput {
    /// Trims text fields and checks the listing invariants
    pub fn validated(mut self) -> Result<Self, String> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err("title is required".to_string());
        }

        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err("price must be a non-negative number".to_string());
            }
        }

        for (name, value) in [
            ("rooms", self.rooms),
            ("bathrooms", self.bathrooms),
            ("square_meters", self.square_meters),
        ] {
            if value.is_some_and(|v| v < 0) {
                return Err(format!("{} must not be negative", name));
            }
        }

        self.description = blank_to_none(self.description);
        self.city = blank_to_none(self.city);
        self.province = blank_to_none(self.province);
        self.features = blank_to_none(self.features);
        self.property_type = blank_to_none(self.property_type);
        if let Some(kind) = &self.property_type {
            kind.parse::<PropertyType>()?;
        }

        self.images = self
            .images
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str) -> PropertyInput {
        serde_json::from_value(serde_json::json!({ "title": title })).unwrap()
    }

    #[test]
    fn listing_type_uses_stored_labels() {
        assert_eq!(
            serde_json::to_string(&ListingType::Rent).unwrap(),
            "\"affitto\""
        );
        let parsed: ListingType = serde_json::from_str("\"rent\"").unwrap();
        assert_eq!(parsed, ListingType::Rent);
        assert_eq!(ListingType::from_stored(None), ListingType::Sale);
        assert_eq!(ListingType::from_stored(Some("boh")), ListingType::Sale);
        assert_eq!(ListingType::from_stored(Some("affitto")), ListingType::Rent);
    }

    #[test]
    fn energy_class_round_trips_a_plus() {
        assert_eq!("A+".parse::<EnergyClass>().unwrap(), EnergyClass::APlus);
        assert_eq!(
            serde_json::to_string(&EnergyClass::APlus).unwrap(),
            "\"A+\""
        );
        assert!("H".parse::<EnergyClass>().is_err());
    }

    #[test]
    fn display_fallbacks() {
        let record = PropertyRecord {
            id: Uuid::new_v4(),
            title: "Bilocale".to_string(),
            description: None,
            price: None,
            listing_type: ListingType::Sale,
            city: None,
            province: None,
            property_type: None,
            rooms: None,
            bathrooms: None,
            square_meters: None,
            energy_class: None,
            features: Some("balcone, , box auto ,".to_string()),
            is_featured: false,
            images: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(record.price_label(), PRICE_ON_REQUEST);
        assert_eq!(record.cover_image(), None);
        assert_eq!(record.feature_tags(), vec!["balcone", "box auto"]);
    }

    #[test]
    fn input_validation_trims_and_rejects() {
        assert!(input("   ").validated().is_err());

        let mut bad_price = input("Villa");
        bad_price.price = Some(-1.0);
        assert!(bad_price.validated().is_err());

        let mut bad_type = input("Villa");
        bad_type.property_type = Some("castello".to_string());
        assert!(bad_type.validated().is_err());

        let mut ok = input("  Villa al mare ");
        ok.city = Some("  ".to_string());
        ok.property_type = Some("villa".to_string());
        ok.images = vec![" https://cdn/a.jpg ".to_string(), "".to_string()];
        let ok = ok.validated().unwrap();
        assert_eq!(ok.title, "Villa al mare");
        assert_eq!(ok.city, None);
        assert_eq!(ok.images, vec!["https://cdn/a.jpg".to_string()]);
    }
}

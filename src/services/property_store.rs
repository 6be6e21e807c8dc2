//! Property data access.
//!
//! Handlers and the listings controller depend on the [`PropertyStore`]
//! trait object held in application state, never on a concrete client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::properties::{EnergyClass, ListingType, PropertyInput, PropertyRecord};
use crate::services::cache::{keys, RedisCache};

#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Every listing, newest first
    async fn list_all(&self) -> Result<Vec<PropertyRecord>>;

    async fn get(&self, id: Uuid) -> Result<Option<PropertyRecord>>;

    async fn insert(&self, input: &PropertyInput) -> Result<PropertyRecord>;

    /// `None` when no listing has this id
    async fn update(&self, id: Uuid, input: &PropertyInput) -> Result<Option<PropertyRecord>>;

    /// `false` when no listing has this id
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

// ============================================================================
// Postgres
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct PropertyRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    price: Option<Decimal>,
    listing_type: Option<String>,
    city: Option<String>,
    province: Option<String>,
    property_type: Option<String>,
    rooms: Option<i32>,
    bathrooms: Option<i32>,
    square_meters: Option<i32>,
    energy_class: Option<String>,
    features: Option<String>,
    is_featured: Option<bool>,
    images: Option<Vec<String>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PropertyRow> for PropertyRecord {
    fn from(row: PropertyRow) -> Self {
        let energy_class = row.energy_class.as_deref().and_then(|raw| {
            raw.parse::<EnergyClass>()
                .map_err(|e| tracing::debug!(property_id = %row.id, error = %e, "Ignoring energy class"))
                .ok()
        });

        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price.and_then(|p| p.to_f64()),
            listing_type: ListingType::from_stored(row.listing_type.as_deref()),
            city: row.city,
            province: row.province,
            property_type: row.property_type,
            rooms: row.rooms,
            bathrooms: row.bathrooms,
            square_meters: row.square_meters,
            energy_class,
            features: row.features,
            is_featured: row.is_featured.unwrap_or(false),
            images: row.images.unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PROPERTY_COLUMNS: &str = "id, title, description, price, listing_type, city, province, \
     property_type, rooms, bathrooms, square_meters, energy_class, features, is_featured, \
     images, created_at, updated_at";

fn price_to_decimal(price: Option<f64>) -> Option<Decimal> {
    price.and_then(|p| Decimal::from_f64(p).map(|d| d.round_dp(2)))
}

/// Listings stored in the `properties` table
#[derive(Clone)]
pub struct PgPropertyStore {
    db: PgPool,
}

impl PgPropertyStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PropertyStore for PgPropertyStore {
    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<PropertyRecord>> {
        let rows = sqlx::query_as::<_, PropertyRow>(&format!(
            "SELECT {} FROM properties ORDER BY created_at DESC",
            PROPERTY_COLUMNS
        ))
        .fetch_all(&self.db)
        .await
        .context("Failed to list properties")?;

        Ok(rows.into_iter().map(PropertyRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Option<PropertyRecord>> {
        let row = sqlx::query_as::<_, PropertyRow>(&format!(
            "SELECT {} FROM properties WHERE id = $1",
            PROPERTY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("Failed to fetch property")?;

        Ok(row.map(PropertyRecord::from))
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    async fn insert(&self, input: &PropertyInput) -> Result<PropertyRecord> {
        let row = sqlx::query_as::<_, PropertyRow>(&format!(
            r#"
            INSERT INTO properties (title, description, price, listing_type, city, province,
                property_type, rooms, bathrooms, square_meters, energy_class, features,
                is_featured, images)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            PROPERTY_COLUMNS
        ))
        .bind(&input.title)
        .bind(&input.description)
        .bind(price_to_decimal(input.price))
        .bind(input.listing_type.as_str())
        .bind(&input.city)
        .bind(&input.province)
        .bind(&input.property_type)
        .bind(input.rooms)
        .bind(input.bathrooms)
        .bind(input.square_meters)
        .bind(input.energy_class.map(|c| c.as_str()))
        .bind(&input.features)
        .bind(input.is_featured)
        .bind(&input.images)
        .fetch_one(&self.db)
        .await
        .context("Failed to insert property")?;

        tracing::info!(property_id = %row.id, "Property created");
        Ok(row.into())
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: &PropertyInput) -> Result<Option<PropertyRecord>> {
        let row = sqlx::query_as::<_, PropertyRow>(&format!(
            r#"
            UPDATE properties SET
                title = $2, description = $3, price = $4, listing_type = $5, city = $6,
                province = $7, property_type = $8, rooms = $9, bathrooms = $10,
                square_meters = $11, energy_class = $12, features = $13, is_featured = $14,
                images = $15, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROPERTY_COLUMNS
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(price_to_decimal(input.price))
        .bind(input.listing_type.as_str())
        .bind(&input.city)
        .bind(&input.province)
        .bind(&input.property_type)
        .bind(input.rooms)
        .bind(input.bathrooms)
        .bind(input.square_meters)
        .bind(input.energy_class.map(|c| c.as_str()))
        .bind(&input.features)
        .bind(input.is_featured)
        .bind(&input.images)
        .fetch_optional(&self.db)
        .await
        .context("Failed to update property")?;

        Ok(row.map(PropertyRecord::from))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("Failed to delete property")?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Redis read-through cache
// ============================================================================

/// Caches reads of an inner store; writes invalidate the affected keys
pub struct CachedPropertyStore<S> {
    inner: S,
    cache: RedisCache,
}

impl<S: PropertyStore> CachedPropertyStore<S> {
    pub fn new(inner: S, cache: RedisCache) -> Self {
        Self { inner, cache }
    }

    async fn invalidate(&self, id: Option<Uuid>) {
        let mut stale = vec![keys::property_list()];
        stale.extend(id.map(keys::property));
        for key in stale {
            if let Err(e) = self.cache.delete(&key).await {
                tracing::warn!(key = %key, error = %e, "Failed to invalidate property cache");
            }
        }
    }
}

#[async_trait]
impl<S: PropertyStore> PropertyStore for CachedPropertyStore<S> {
    async fn list_all(&self) -> Result<Vec<PropertyRecord>> {
        let key = keys::property_list();
        if let Some(cached) = self.cache.get::<Vec<PropertyRecord>>(&key).await {
            return Ok(cached);
        }

        let properties = self.inner.list_all().await?;
        if let Err(e) = self.cache.set(&key, &properties).await {
            tracing::warn!(error = %e, "Failed to cache property list");
        }
        Ok(properties)
    }

    async fn get(&self, id: Uuid) -> Result<Option<PropertyRecord>> {
        let key = keys::property(id);
        if let Some(cached) = self.cache.get::<PropertyRecord>(&key).await {
            return Ok(Some(cached));
        }

        let property = self.inner.get(id).await?;
        if let Some(property) = &property {
            if let Err(e) = self.cache.set(&key, property).await {
                tracing::warn!(error = %e, "Failed to cache property");
            }
        }
        Ok(property)
    }

    async fn insert(&self, input: &PropertyInput) -> Result<PropertyRecord> {
        let created = self.inner.insert(input).await?;
        self.invalidate(None).await;
        Ok(created)
    }

    async fn update(&self, id: Uuid, input: &PropertyInput) -> Result<Option<PropertyRecord>> {
        let updated = self.inner.update(id, input).await?;
        self.invalidate(Some(id)).await;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let deleted = self.inner.delete(id).await?;
        self.invalidate(Some(id)).await;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(listing_type: Option<&str>, energy_class: Option<&str>) -> PropertyRow {
        PropertyRow {
            id: Uuid::new_v4(),
            title: "Trilocale".to_string(),
            description: None,
            price: Some(Decimal::new(19_950_000, 2)),
            listing_type: listing_type.map(str::to_string),
            city: Some("Bologna".to_string()),
            province: None,
            property_type: None,
            rooms: Some(3),
            bathrooms: None,
            square_meters: None,
            energy_class: energy_class.map(str::to_string),
            features: None,
            is_featured: None,
            images: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_decoding_is_lenient() {
        let record = PropertyRecord::from(row(None, Some("Z")));
        assert_eq!(record.listing_type, ListingType::Sale);
        assert_eq!(record.energy_class, None);
        assert_eq!(record.price, Some(199_500.0));
        assert!(!record.is_featured);
        assert!(record.images.is_empty());

        let rent = PropertyRecord::from(row(Some("affitto"), Some("A+")));
        assert_eq!(rent.listing_type, ListingType::Rent);
        assert_eq!(rent.energy_class.map(|c| c.as_str()), Some("A+"));
    }

    #[test]
    fn prices_are_stored_with_cents() {
        assert_eq!(price_to_decimal(Some(1234.567)), Some(Decimal::new(123457, 2)));
        assert_eq!(price_to_decimal(None), None);
    }
}

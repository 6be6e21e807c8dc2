//! Contact and sell-your-property forms
//!
//! Submissions are not stored; each one becomes an email to the agency inbox.

use axum::{extract::State, Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::MessageResponse;
use crate::app::AppState;
use crate::domain::contact::{ContactRequest, OutgoingEmail, SellRequest};
use crate::error::{ApiError, ApiResult};
use crate::services::PropertyStore;

/// POST /contact
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ContactRequest>,
) -> ApiResult<MessageResponse> {
    let email = contact_email(state.properties.as_ref(), request)
        .await
        .map_err(ApiError::bad_request)?;

    state.email.send_to_agency(&email).await?;

    Ok(MessageResponse::new("Messaggio inviato"))
}

/// Validates the form, then names the listing it is about. Invalid forms
/// never reach the store.
async fn contact_email(
    store: &dyn PropertyStore,
    request: ContactRequest,
) -> Result<OutgoingEmail, String> {
    let message = request.validated()?;

    let property_title = match message.property_id {
        Some(id) => property_title(store, id).await,
        None => None,
    };

    Ok(message.into_email(property_title.as_deref()))
}

/// A stale or unknown listing id must not block the message
async fn property_title(store: &dyn PropertyStore, id: Uuid) -> Option<String> {
    match store.get(id).await {
        Ok(property) => property.map(|p| p.title),
        Err(e) => {
            tracing::warn!(property_id = %id, error = %e, "Failed to look up contacted property");
            None
        }
    }
}

/// POST /sell-requests
pub async fn submit_sell_request(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SellRequest>,
) -> ApiResult<MessageResponse> {
    let email = request.into_email().map_err(ApiError::bad_request)?;

    state.email.send_to_agency(&email).await?;

    Ok(MessageResponse::new("Richiesta di valutazione inviata"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::properties::{ListingType, PropertyInput, PropertyRecord};
    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex;

    /// One listing, counting lookups; `down` makes every read fail
    struct OneListing {
        listing: PropertyRecord,
        down: bool,
        lookups: Mutex<usize>,
    }

    impl OneListing {
        fn new(down: bool) -> Self {
            Self {
                listing: PropertyRecord {
                    id: Uuid::new_v4(),
                    title: "Trilocale Centro".to_string(),
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
                    features: None,
                    is_featured: false,
                    images: vec![],
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                },
                down,
                lookups: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl PropertyStore for OneListing {
        async fn list_all(&self) -> anyhow::Result<Vec<PropertyRecord>> {
            Ok(vec![self.listing.clone()])
        }

        async fn get(&self, id: Uuid) -> anyhow::Result<Option<PropertyRecord>> {
            *self.lookups.lock() += 1;
            if self.down {
                anyhow::bail!("connection reset");
            }
            Ok((id == self.listing.id).then(|| self.listing.clone()))
        }

        async fn insert(&self, _: &PropertyInput) -> anyhow::Result<PropertyRecord> {
            anyhow::bail!("read-only")
        }

        async fn update(&self, _: Uuid, _: &PropertyInput) -> anyhow::Result<Option<PropertyRecord>> {
            anyhow::bail!("read-only")
        }

        async fn delete(&self, _: Uuid) -> anyhow::Result<bool> {
            anyhow::bail!("read-only")
        }
    }

    fn request(email: &str, property_id: Option<Uuid>) -> ContactRequest {
        ContactRequest {
            name: "Mario".to_string(),
            email: email.to_string(),
            phone: None,
            message: "Vorrei visitarlo".to_string(),
            property_id,
        }
    }

    #[tokio::test]
    async fn invalid_form_skips_the_lookup() {
        let store = OneListing::new(false);
        let id = store.listing.id;

        let err = contact_email(&store, request("not-an-email", Some(id)))
            .await
            .unwrap_err();

        assert_eq!(err, "email is not valid");
        assert_eq!(*store.lookups.lock(), 0);
    }

    #[tokio::test]
    async fn known_listing_titles_the_email() {
        let store = OneListing::new(false);
        let id = store.listing.id;

        let email = contact_email(&store, request("mario@example.it", Some(id)))
            .await
            .unwrap();

        assert_eq!(email.subject, "Richiesta informazioni: Trilocale Centro");
        assert_eq!(*store.lookups.lock(), 1);
    }

    #[tokio::test]
    async fn failed_lookup_still_sends() {
        let store = OneListing::new(true);

        let email = contact_email(&store, request("mario@example.it", Some(Uuid::new_v4())))
            .await
            .unwrap();

        assert_eq!(email.subject, "Nuovo messaggio da Mario");
    }
}

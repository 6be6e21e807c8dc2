//! Service layer modules for external integrations.
//!
//! Contains the Redis cache, the property store and the email delivery client.

pub mod cache;
pub mod email;
pub mod property_store;

pub use cache::RedisCache;
pub use email::EmailClient;
pub use property_store::{CachedPropertyStore, PgPropertyStore, PropertyStore};

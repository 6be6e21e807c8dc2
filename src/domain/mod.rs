//! Domain types and DTOs
//!
//! Listings, editorial content, forms and analytics. Types here know nothing
//! about HTTP or storage clients.

pub mod analytics;
pub mod blog;
pub mod contact;
pub mod faqs;
pub mod properties;

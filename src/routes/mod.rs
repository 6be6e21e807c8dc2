pub mod admin;
pub mod agency;
pub mod analytics;
pub mod blog;
pub mod contact;
pub mod faqs;
pub mod health;
pub mod listings;
pub mod properties;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        .route("/agency", get(agency::get_agency))
        // Catalogue
        .route("/properties", get(properties::list_properties))
        .route("/properties/featured", get(properties::list_featured))
        .route("/properties/:id", get(properties::get_property))
        // Quick search hand-off and listings page
        .route("/search/quick", post(listings::quick_search))
        .route("/listings", get(listings::get_listings))
        // Content
        .route("/blog", get(blog::list_posts))
        .route("/blog/:slug", get(blog::get_post))
        .route("/faqs", get(faqs::list_faqs))
        // Forms
        .route("/contact", post(contact::submit_contact))
        .route("/sell-requests", post(contact::submit_sell_request))
        .route("/analytics/page-views", post(analytics::record_page_view))
        // Admin console
        .route("/admin/login", post(admin::login))
        .route(
            "/admin/properties",
            get(properties::admin_list_properties).post(properties::create_property),
        )
        .route(
            "/admin/properties/:id",
            get(properties::admin_get_property)
                .put(properties::update_property)
                .delete(properties::delete_property),
        )
        .route(
            "/admin/blog",
            get(blog::admin_list_posts).post(blog::create_post),
        )
        .route(
            "/admin/blog/:id",
            put(blog::update_post).delete(blog::delete_post),
        )
        .route(
            "/admin/faqs",
            get(faqs::admin_list_faqs).post(faqs::create_faq),
        )
        .route(
            "/admin/faqs/:id",
            put(faqs::update_faq).delete(faqs::delete_faq),
        )
        .route("/admin/analytics", get(analytics::get_summary))
}

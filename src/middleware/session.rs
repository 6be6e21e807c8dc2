//! Browsing session cookie.
//!
//! The quick-search hand-off slot is keyed by an anonymous session id kept
//! in a cookie. Visitors without one get a fresh UUID v4.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session_id";

/// Returns the session id and the jar to send back, extended with a new
/// session cookie when the request carried none.
pub fn ensure_session(jar: CookieJar) -> (CookieJar, String) {
    if let Some(existing) = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().trim())
        .filter(|v| !v.is_empty())
    {
        let session_id = existing.to_string();
        return (jar, session_id);
    }

    let session_id = Uuid::new_v4().to_string();
    let cookie = Cookie::build((SESSION_COOKIE, session_id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    tracing::debug!(session_id = %session_id, "New browsing session");

    (jar.add(cookie), session_id)
}

//! Admin console authentication.
//!
//! A single shared password unlocks the console; a successful login is
//! exchanged for a short-lived HS256 token sent back as a Bearer header.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::AdminClaims;

const ADMIN_SUBJECT: &str = "admin";

#[derive(Clone)]
pub struct AdminAuth {
    password: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_seconds: i64,
}

impl AdminAuth {
    pub fn new(password: &str, jwt_secret: &str, token_ttl_seconds: u64) -> Self {
        Self {
            password: password.to_string(),
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_ttl_seconds: i64::try_from(token_ttl_seconds).unwrap_or(i64::MAX),
        }
    }

    /// Compares without short-circuiting on the first differing byte
    pub fn check_password(&self, candidate: &str) -> bool {
        let expected = self.password.as_bytes();
        let candidate = candidate.as_bytes();
        if expected.is_empty() || expected.len() != candidate.len() {
            return false;
        }
        expected
            .iter()
            .zip(candidate)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
    }

    pub fn issue_token(&self) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = AdminClaims {
            sub: ADMIN_SUBJECT.to_string(),
            iat: now,
            exp: now.saturating_add(self.token_ttl_seconds),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to sign admin token")
    }

    pub fn verify_token(&self, token: &str) -> Result<AdminClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.sub = Some(ADMIN_SUBJECT.to_string());
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<AdminClaims>(token, &self.decoding_key, &validation)
            .context("Admin token validation failed")?;
        Ok(data.claims)
    }
}

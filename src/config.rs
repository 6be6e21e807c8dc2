use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

/// Public details of the agency, served as-is by `GET /agency`
#[derive(Debug, Clone, serde::Serialize)]
pub struct AgencyInfo {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub vat_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_run_migrations: bool,

    // Redis
    pub redis_url: String,
    pub redis_cache_ttl_seconds: u64,
    pub handoff_ttl_seconds: u64,
    /// Keep hand-off slots in process memory instead of Redis (single instance only)
    pub handoff_in_memory: bool,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Admin console
    pub admin_password: String,
    pub admin_jwt_secret: String,
    pub admin_token_ttl_seconds: u64,

    // Email delivery
    pub email_api_url: String,
    pub email_api_key: String,
    pub email_from: String,
    pub agency_inbox: String,
    pub email_timeout_seconds: u64,

    // Agency
    pub agency: AgencyInfo,
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // Database
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_connections = parsed_var("DATABASE_MAX_CONNECTIONS", 10);
        let database_run_migrations = parsed_var("DATABASE_RUN_MIGRATIONS", false);

        // Redis
        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://redis:6379/0".to_string());
        let redis_cache_ttl_seconds = parsed_var("REDIS_CACHE_TTL_SECONDS", 300);
        let handoff_ttl_seconds = parsed_var("HANDOFF_TTL_SECONDS", 1800); // 30 minutes
        let handoff_in_memory = parsed_var("HANDOFF_IN_MEMORY", false);

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Admin console
        let admin_password = env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD must be set")?;
        let admin_jwt_secret =
            env::var("ADMIN_JWT_SECRET").context("ADMIN_JWT_SECRET must be set")?;
        let admin_token_ttl_seconds = parsed_var("ADMIN_TOKEN_TTL_SECONDS", 8 * 3600);

        // Email delivery
        let email_api_url =
            env::var("EMAIL_API_URL").unwrap_or_else(|_| "https://api.resend.com".to_string());
        let email_api_key = env::var("EMAIL_API_KEY").context("EMAIL_API_KEY must be set")?;
        let email_from = env::var("EMAIL_FROM").context("EMAIL_FROM must be set")?;
        let agency_inbox = env::var("AGENCY_INBOX").context("AGENCY_INBOX must be set")?;
        let email_timeout_seconds = parsed_var("EMAIL_TIMEOUT_SECONDS", 15);

        // Agency
        let agency = AgencyInfo {
            name: env::var("AGENCY_NAME").unwrap_or_else(|_| "Agenzia Immobiliare".to_string()),
            address: optional_var("AGENCY_ADDRESS"),
            phone: optional_var("AGENCY_PHONE"),
            email: optional_var("AGENCY_EMAIL").or_else(|| Some(agency_inbox.clone())),
            vat_number: optional_var("AGENCY_VAT_NUMBER"),
        };

        Ok(Settings {
            env,
            server_addr,
            database_url,
            database_max_connections,
            database_run_migrations,
            redis_url,
            redis_cache_ttl_seconds,
            handoff_ttl_seconds,
            handoff_in_memory,
            cors_allow_origins,
            admin_password,
            admin_jwt_secret,
            admin_token_ttl_seconds,
            email_api_url,
            email_api_key,
            email_from,
            agency_inbox,
            email_timeout_seconds,
            agency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parsing_defaults_to_dev() {
        assert_eq!(Environment::from_str("PRODUCTION"), Environment::Prod);
        assert_eq!(Environment::from_str("staging"), Environment::Staging);
        assert_eq!(Environment::from_str("anything"), Environment::Dev);
        assert!(Environment::Dev.is_dev());
        assert!(Environment::Prod.is_prod());
    }
}

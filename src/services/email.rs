//! Client for the transactional email delivery API.
//!
//! Form submissions are forwarded to the agency inbox as plain-text emails.
//! Network errors, rate limiting and 5xx answers are retried with exponential
//! backoff; other rejections fail immediately.

use anyhow::{Context, Result};
use backoff::ExponentialBackoffBuilder;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

use crate::domain::contact::OutgoingEmail;

/// Total time spent retrying a single delivery
const MAX_RETRY_ELAPSED: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct EmailClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    from: String,
    inbox: String,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

impl EmailClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        from: &str,
        inbox: &str,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        let endpoint = Url::parse(&format!("{}/emails", base_url.trim_end_matches('/')))
            .context("Invalid EMAIL_API_URL")?;

        tracing::info!(endpoint = %endpoint, "Email client initialized");

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_string(),
            from: from.to_string(),
            inbox: inbox.to_string(),
        })
    }

    /// Deliver `email` to the agency inbox.
    #[instrument(skip(self, email), fields(subject = %email.subject))]
    pub async fn send_to_agency(&self, email: &OutgoingEmail) -> Result<()> {
        let body = SendEmailRequest {
            from: &self.from,
            to: [&self.inbox],
            subject: &email.subject,
            text: &email.text,
            reply_to: email.reply_to.as_deref(),
        };

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(500))
            .with_max_elapsed_time(Some(MAX_RETRY_ELAPSED))
            .build();

        backoff::future::retry(policy, || async {
            let response = match self
                .client
                .post(self.endpoint.clone())
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    debug!(error = %e, "Email API request failed, retrying");
                    return Err(backoff::Error::transient(anyhow::anyhow!(
                        "Email API unavailable: {}",
                        e
                    )));
                }
            };

            let status = response.status();
            if status.is_success() {
                return Ok(());
            }

            let detail = response.text().await.unwrap_or_default();
            let err = anyhow::anyhow!("Email API answered {}: {}", status, detail);
            if is_retryable(status) {
                debug!(status = %status, "Email API busy, retrying");
                Err(backoff::Error::transient(err))
            } else {
                error!(status = %status, "Email API rejected the message");
                Err(backoff::Error::permanent(err))
            }
        })
        .await?;

        tracing::info!("Email delivered to agency inbox");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_built_from_base_url() {
        let client =
            EmailClient::new("https://mail.example.com/", "key", "site@a.it", "info@a.it", 5).unwrap();
        assert_eq!(client.endpoint.as_str(), "https://mail.example.com/emails");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(EmailClient::new("not a url", "key", "a@a.it", "b@b.it", 5).is_err());
    }

    #[test]
    fn only_throttling_and_server_errors_are_retried() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::UNPROCESSABLE_ENTITY));
        assert!(!is_retryable(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn request_body_shape() {
        let body = SendEmailRequest {
            from: "site@a.it",
            to: ["info@a.it"],
            subject: "Ciao",
            text: "Testo",
            reply_to: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["to"][0], "info@a.it");
        assert!(json.get("reply_to").is_none());
    }
}

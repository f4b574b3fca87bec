use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

/// Thin client for the transactional email provider's REST API.
///
/// # Connection pooling
/// `reqwest::Client` keeps a pool of open connections: building one per request would pay a TCP
/// and TLS handshake every time. The client is built once at start-up, with the configured
/// timeout, and shared by every request through `web::Data`.
///
/// Nothing about a specific request is stored here. The API key is passed in on every call
/// because the contact handler only learns whether it is configured when a request comes in.
pub struct EmailClient {
    http_client: Client,
    base_url: String,
}

/// The payload accepted by the provider's `POST /emails` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
}

/// What the provider hands back for an accepted email.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct SentEmail {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum EmailError {
    #[error("The email provider rejected the request with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("Failed to reach the email provider")]
    Transport(#[from] reqwest::Error),
}

impl EmailClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    #[tracing::instrument(
        name = "Sending an email through the provider",
        skip(self, authorization_token, email),
        fields(reply_to = %email.reply_to)
    )]
    pub async fn send_email(
        &self,
        authorization_token: &Secret<String>,
        email: &OutboundEmail,
    ) -> Result<SentEmail, EmailError> {
        let url = format!("{}/emails", self.base_url.trim_end_matches('/'));
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(authorization_token.expose_secret())
            .json(email)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(EmailError::Rejected { status, body });
        }

        // The provider accepted the email; an unexpected body only costs us the message id.
        let sent = serde_json::from_str::<SentEmail>(&body).unwrap_or_else(|e| {
            tracing::warn!(error.message = %e, "Could not decode the provider response");
            SentEmail::default()
        });
        Ok(sent)
    }
}

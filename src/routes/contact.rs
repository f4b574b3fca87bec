use crate::configuration::{ContactSettings, MissingConfiguration};
use crate::domain::{normalize_payload, ContactSubmission, FieldViolations, SubmissionError};
use crate::email_client::{EmailClient, EmailError};
use crate::utils::error_chain_fmt;
use actix_web::http::header::ALLOW;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;

#[derive(serde::Serialize)]
struct ContactAccepted {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

impl ContactAccepted {
    fn new(id: Option<String>) -> Self {
        Self { ok: true, id }
    }
}

/// # Error reporting
/// Errors serve two audiences. The caller needs a status code and a short JSON body it can show
/// to a visitor; operators need the full picture to debug a failure.
///
/// `Display` (via `thiserror`) is the caller-facing message and ends up in the `error` field.
/// `Debug` walks the whole `source` chain with `error_chain_fmt`: `TracingLogger` records it on
/// the request span when a handler returns an error, so a provider rejection is logged with its
/// status and body while the caller only reads "Failed to send email".
#[derive(thiserror::Error)]
pub enum ContactError {
    #[error(transparent)]
    NotConfigured(#[from] MissingConfiguration),
    #[error("Invalid email format")]
    InvalidEmail {
        field: &'static str,
        details: String,
    },
    #[error("Invalid payload")]
    InvalidPayload(FieldViolations),
    #[error("Failed to send email")]
    SendFailed(#[source] EmailError),
    #[error("Unexpected server error")]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for ContactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<SubmissionError> for ContactError {
    fn from(e: SubmissionError) -> Self {
        match e {
            SubmissionError::InvalidField { field, message } => ContactError::InvalidEmail {
                field,
                details: message,
            },
            SubmissionError::Schema(violations) => ContactError::InvalidPayload(violations),
        }
    }
}

/// Every failure is rendered as a JSON body with an `error` string. Only validation failures carry
/// details back to the caller: provider and internal errors are logged, never exposed.
impl ResponseError for ContactError {
    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::InvalidEmail { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ContactError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ContactError::NotConfigured(_)
            | ContactError::SendFailed(_)
            | ContactError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ContactError::InvalidEmail { field, details } => json!({
                "error": self.to_string(),
                "code": "invalid_email",
                "field": field,
                "details": details,
            }),
            ContactError::InvalidPayload(violations) => json!({
                "error": self.to_string(),
                "details": violations,
            }),
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Relay a contact-form submission to the site owner.
///
/// The order of the checks matters: configuration is verified before the body is looked at, an
/// email problem wins over any other validation problem, and a filled honeypot short-circuits with
/// the very same response a real send would produce.
#[tracing::instrument(
    name = "Relaying a contact submission",
    skip(body, settings, email_client),
    fields(submitter_email = tracing::field::Empty, submitter_name = tracing::field::Empty)
)]
pub async fn contact(
    body: Result<web::Bytes, actix_web::Error>,
    settings: web::Data<ContactSettings>,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, ContactError> {
    let settings = settings.require()?;
    let body = body.map_err(|e| anyhow::anyhow!("Failed to read the request body: {e}"))?;

    let submission = ContactSubmission::parse(&normalize_payload(&body))?;

    if submission.honeypot.is_filled() {
        tracing::debug!("Honeypot field is filled, skipping dispatch");
        return Ok(HttpResponse::Ok().json(ContactAccepted::new(None)));
    }

    let span = tracing::Span::current();
    span.record(
        "submitter_email",
        &tracing::field::display(&submission.email),
    );
    span.record(
        "submitter_name",
        &tracing::field::display(submission.name.as_ref()),
    );

    let email = submission.to_email(&settings.from_email, &settings.to_email);
    let sent = email_client
        .send_email(&settings.api_key, &email)
        .await
        .map_err(|e| {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "The email provider did not accept the contact message"
            );
            ContactError::SendFailed(e)
        })?;

    Ok(HttpResponse::Ok().json(ContactAccepted::new(sent.id)))
}

pub async fn contact_method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .insert_header((ALLOW, "POST"))
        .json(json!({ "error": "Method not allowed" }))
}

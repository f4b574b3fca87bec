//! Client side of the contact flow: the state behind the form a visitor fills in, and the HTTP
//! call that hands the submission to `POST /api/contact`.
//!
//! Validation here is a fast-fail convenience. The server re-validates everything.

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields";
pub const SENT_MESSAGE: &str = "Thanks! Your message has been sent";
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";

/// The single-line status shown under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Ok(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
    Success,
    Error,
}

/// Serialized into the request body. `company` is the honeypot.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SubmissionPayload {
    pub name: String,
    pub email: String,
    pub message: String,
    pub company: String,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("{}", MISSING_FIELDS_MESSAGE)]
    MissingFields,
    /// The submit control is disabled while a request is outstanding.
    #[error("A submission is already in flight")]
    InFlight,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct ContactReceipt {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ContactApiError {
    /// The server answered with an error and told us why.
    #[error("{0}")]
    Rejected(String),
    /// The server answered with an error but no usable message.
    #[error("Request failed with status {0}")]
    Failed(reqwest::StatusCode),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ContactApiError {
    /// What the visitor gets to read. Never a raw payload.
    pub fn user_message(&self) -> &str {
        match self {
            ContactApiError::Rejected(message) if !message.trim().is_empty() => message,
            _ => FALLBACK_ERROR_MESSAGE,
        }
    }
}

#[derive(Debug, Default)]
pub struct ContactForm {
    name: String,
    email: String,
    message: String,
    company: String,
    loading: bool,
    status: Option<FormStatus>,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.name = value.into();
        self.edited();
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        self.email = value.into();
        self.edited();
    }

    pub fn set_message(&mut self, value: impl Into<String>) {
        self.message = value.into();
        self.edited();
    }

    pub fn set_company(&mut self, value: impl Into<String>) {
        self.company = value.into();
        self.edited();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn status(&self) -> Option<&FormStatus> {
        self.status.as_ref()
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        !self.loading
    }

    pub fn state(&self) -> FormState {
        match (&self.status, self.loading) {
            (_, true) => FormState::Submitting,
            (None, false) => FormState::Idle,
            (Some(FormStatus::Ok(_)), false) => FormState::Success,
            (Some(FormStatus::Error(_)), false) => FormState::Error,
        }
    }

    /// Editing a field settles a previous outcome back to idle.
    fn edited(&mut self) {
        if !self.loading {
            self.status = None;
        }
    }

    /// First half of a submission: validate locally and, if that passes, enter the submitting
    /// state and hand back the payload to send.
    pub fn begin_submit(&mut self) -> Result<SubmissionPayload, SubmitRejected> {
        if self.loading {
            return Err(SubmitRejected::InFlight);
        }
        self.status = None;

        if [&self.name, &self.email, &self.message]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            self.status = Some(FormStatus::Error(MISSING_FIELDS_MESSAGE.into()));
            return Err(SubmitRejected::MissingFields);
        }

        self.loading = true;
        Ok(SubmissionPayload {
            name: self.name.clone(),
            email: self.email.clone(),
            message: self.message.clone(),
            company: self.company.clone(),
        })
    }

    /// Second half of a submission: reflect the outcome and leave the submitting state.
    pub fn finish_submit(&mut self, outcome: Result<ContactReceipt, ContactApiError>) {
        self.loading = false;
        match outcome {
            Ok(_) => {
                self.status = Some(FormStatus::Ok(SENT_MESSAGE.into()));
                self.name.clear();
                self.email.clear();
                self.message.clear();
                self.company.clear();
            }
            Err(e) => {
                tracing::warn!(error.message = %e, "Contact submission failed");
                self.status = Some(FormStatus::Error(e.user_message().to_owned()));
            }
        }
    }

    /// Validate, post and record the outcome. Failed sends are not retried; the visitor can submit
    /// again.
    pub async fn submit(&mut self, api: &ContactApi) -> Result<(), SubmitRejected> {
        let payload = self.begin_submit()?;
        let outcome = api.post(&payload).await;
        self.finish_submit(outcome);
        Ok(())
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct ContactApi {
    http_client: reqwest::Client,
    endpoint: String,
}

impl ContactApi {
    /// `base_url` is the site origin, e.g. `https://example.com`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint: format!("{}/api/contact", base_url.trim_end_matches('/')),
        }
    }

    #[tracing::instrument(name = "Posting a contact submission", skip(self, payload))]
    pub async fn post(&self, payload: &SubmissionPayload) -> Result<ContactReceipt, ContactApiError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<ContactReceipt>().await?);
        }

        let error = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error);
        Err(match error {
            Some(message) => ContactApiError::Rejected(message),
            None => ContactApiError::Failed(status),
        })
    }
}

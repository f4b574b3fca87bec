use crate::domain::{ContactEmail, ContactMessage, ContactName, Honeypot};
use crate::email_client::OutboundEmail;
use crate::utils::escape_html;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A contact request that passed validation. It lives for the duration of a single request and is
/// consumed to build at most one outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: ContactName,
    pub email: ContactEmail,
    pub message: ContactMessage,
    pub honeypot: Honeypot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// A single field is wrong in a way the form can point at. Only `email` is reported this way,
    /// and it takes precedence over any other violation.
    InvalidField {
        field: &'static str,
        message: String,
    },
    Schema(FieldViolations),
}

/// Violations grouped the way the form expects them: problems with the payload as a whole, and
/// problems per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldViolations {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<&'static str, Vec<String>>,
}

impl FieldViolations {
    fn add(&mut self, field: &'static str, message: String) {
        self.field_errors.entry(field).or_default().push(message);
    }

    fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }
}

/// Turn a raw request body into a JSON document. Bodies that arrive as a JSON string holding the
/// actual document are decoded one more level. Anything unparseable becomes an empty object, which
/// then fails validation like any other incomplete payload.
pub fn normalize_payload(raw: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::String(inner)) => serde_json::from_str(&inner).unwrap_or_else(|_| empty_object()),
        Ok(Value::Null) | Err(_) => empty_object(),
        Ok(value) => value,
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl ContactSubmission {
    /// # Parse, don't validate
    /// `parse` is the only way to obtain a `ContactSubmission`. Every field in the returned value
    /// has already gone through its own `parse`, so code further down the line never has to
    /// re-check lengths or address grammar.
    ///
    /// The error is tagged rather than a flat list:
    /// * `InvalidField` when the `email` field is wrong in any way. The form can point at that
    ///   single input, so it wins over every other violation;
    /// * `Schema` with every other violation, grouped per field, plus payload-level problems such
    ///   as a body that is not a JSON object.
    ///
    /// `company` (the honeypot) is validated for shape only. Whether it is filled is the
    /// handler's business.
    pub fn parse(payload: &Value) -> Result<ContactSubmission, SubmissionError> {
        let Some(fields) = payload.as_object() else {
            return Err(SubmissionError::Schema(FieldViolations {
                form_errors: vec![format!("Expected object, received {}", json_type(payload))],
                ..Default::default()
            }));
        };

        let email = required_text(fields, "email")
            .and_then(ContactEmail::parse)
            .map_err(|message| SubmissionError::InvalidField {
                field: "email",
                message,
            })?;
        let name = required_text(fields, "name").and_then(ContactName::parse);
        let message = required_text(fields, "message").and_then(ContactMessage::parse);
        let company = optional_text(fields, "company");

        let mut violations = FieldViolations::default();
        let name = name.map_err(|e| violations.add("name", e)).ok();
        let message = message.map_err(|e| violations.add("message", e)).ok();
        let company = company.map_err(|e| violations.add("company", e)).ok();

        match (name, message, company) {
            (Some(name), Some(message), Some(company)) if violations.is_empty() => {
                Ok(ContactSubmission {
                    name,
                    email,
                    message,
                    honeypot: Honeypot::new(company),
                })
            }
            _ => Err(SubmissionError::Schema(violations)),
        }
    }

    /// Build the notification for the site owner. Replies go straight back to the submitter.
    pub fn to_email(&self, from: &str, to: &str) -> OutboundEmail {
        OutboundEmail {
            from: from.to_owned(),
            to: vec![to.to_owned()],
            reply_to: self.email.as_ref().to_owned(),
            subject: format!("contact: {}", self.name.as_ref()),
            html: self.html_body(),
        }
    }

    fn html_body(&self) -> String {
        format!(
            r#"<div style="font-family:system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif;line-height:1.5">
  <h2 style="margin:0 0 12px">New message from the portfolio contact form</h2>
  <p><strong>Name:</strong> {name}</p>
  <p><strong>Email:</strong> {email}</p>
  <p><strong>Message:</strong></p>
  <pre style="white-space:pre-wrap;background:#f6f6f6;padding:12px;border-radius:8px">{message}</pre>
</div>"#,
            name = escape_html(self.name.as_ref()),
            email = escape_html(self.email.as_ref()),
            message = escape_html(self.message.as_ref()),
        )
    }
}

fn required_text(fields: &Map<String, Value>, key: &str) -> Result<String, String> {
    match fields.get(key) {
        None => Err("Required".into()),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(format!("Expected string, received {}", json_type(other))),
    }
}

fn optional_text(fields: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match fields.get(key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(format!("Expected string, received {}", json_type(other))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

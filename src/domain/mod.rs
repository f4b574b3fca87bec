mod contact_email;
mod contact_message;
mod contact_name;
mod contact_submission;
mod honeypot;

pub use contact_email::ContactEmail;
pub use contact_message::ContactMessage;
pub use contact_name::ContactName;
pub use contact_submission::{normalize_payload, ContactSubmission, FieldViolations, SubmissionError};
pub use honeypot::Honeypot;

const MAX_MESSAGE_LENGTH: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage(String);

impl ContactMessage {
    /// Same rules as `ContactName`: non-empty, bounded in UTF-16 code units.
    pub fn parse(s: String) -> Result<ContactMessage, String> {
        if s.is_empty() {
            return Err("Message is required".into());
        }
        if s.encode_utf16().count() > MAX_MESSAGE_LENGTH {
            return Err(format!(
                "Message must contain at most {MAX_MESSAGE_LENGTH} character(s)"
            ));
        }
        Ok(Self(s))
    }
}

impl AsRef<str> for ContactMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

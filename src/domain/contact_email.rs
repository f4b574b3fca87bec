use validator::validate_email;

const MAX_EMAIL_LENGTH: usize = 320;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEmail(String);

impl ContactEmail {
    pub fn parse(s: String) -> Result<ContactEmail, String> {
        if s.encode_utf16().count() > MAX_EMAIL_LENGTH {
            return Err(format!(
                "Email must contain at most {MAX_EMAIL_LENGTH} character(s)"
            ));
        }
        if validate_email(&s) {
            Ok(Self(s))
        } else {
            Err("Invalid email".into())
        }
    }
}

impl AsRef<str> for ContactEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContactEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

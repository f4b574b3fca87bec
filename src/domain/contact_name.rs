const MAX_NAME_LENGTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactName(String);

impl ContactName {
    /// Returns an instance of `ContactName` if the input satisfies our constraints on names, the
    /// description of the violated constraint otherwise.
    ///
    /// # Measuring length
    /// The bound is expressed in UTF-16 code units, the unit browsers use for `maxlength` and
    /// `String.length`. Every code point adds at least one unit, so a run of combining marks on a
    /// single grapheme is counted in full.
    ///
    /// Whitespace-only names are accepted: only the empty string is refused here.
    pub fn parse(s: String) -> Result<ContactName, String> {
        if s.is_empty() {
            return Err("Name is required".into());
        }

        if s.encode_utf16().count() > MAX_NAME_LENGTH {
            return Err(format!(
                "Name must contain at most {MAX_NAME_LENGTH} character(s)"
            ));
        }

        Ok(Self(s))
    }
}

/// The caller gets a shared reference to the inner string: read-only access, no way to break the
/// invariants checked by `parse`.
impl AsRef<str> for ContactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The hidden `company` field. People never see it, so they leave it blank; bots fill in every
/// input they find.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Honeypot(Option<String>);

impl Honeypot {
    pub fn new(value: Option<String>) -> Self {
        Self(value)
    }

    /// `true` when the field holds at least one non-whitespace character.
    pub fn is_filled(&self) -> bool {
        matches!(&self.0, Some(value) if !value.trim().is_empty())
    }
}

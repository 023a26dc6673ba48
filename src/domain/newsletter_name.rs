#[derive(Debug, Clone)]
pub struct NewsletterName(String);

impl NewsletterName {
    pub fn parse(s: String) -> Result<Self, String> {
        if s.trim().is_empty() {
            return Err("name is required.".to_string());
        }
        Ok(Self(s))
    }
}

impl AsRef<str> for NewsletterName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

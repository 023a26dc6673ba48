#[derive(Debug, Clone)]
pub struct NewsletterPrompt(String);

impl NewsletterPrompt {
    pub fn parse(s: String) -> Result<Self, String> {
        if s.trim().is_empty() {
            return Err("prompt is required.".to_string());
        }
        Ok(Self(s))
    }
}

impl AsRef<str> for NewsletterPrompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

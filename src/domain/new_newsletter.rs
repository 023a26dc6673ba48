use super::{NewsletterName, NewsletterPrompt};

#[derive(Debug)]
pub struct NewNewsletter {
    pub name: NewsletterName,
    pub prompt: NewsletterPrompt,
}

impl NewNewsletter {
    /// Absent fields are reported the same way as empty ones.
    pub fn parse(name: Option<String>, prompt: Option<String>) -> Result<Self, String> {
        let name = NewsletterName::parse(name.unwrap_or_default())?;
        let prompt = NewsletterPrompt::parse(prompt.unwrap_or_default())?;
        Ok(Self { name, prompt })
    }
}

mod issue;
mod new_newsletter;
mod newsletter;
mod newsletter_name;
mod newsletter_prompt;
mod subscriber;
mod subscriber_email;

pub use issue::{Issue, next_issue_send_time};
pub use new_newsletter::NewNewsletter;
pub use newsletter::{Newsletter, NewsletterSummary};
pub use newsletter_name::NewsletterName;
pub use newsletter_prompt::NewsletterPrompt;
pub use subscriber::Subscriber;
pub use subscriber_email::SubscriberEmail;

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct Newsletter {
    pub id: Uuid,
    pub name: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct NewsletterSummary {
    pub id: Uuid,
    pub name: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
    pub subscriber_count: i64,
}

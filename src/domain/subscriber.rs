use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Subscriber {
    pub id: Uuid,
    pub newsletter_id: Uuid,
    pub email: String,
    pub signed_up_at: DateTime<Utc>,
}

use chrono::{DateTime, Days, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Issue {
    pub id: Uuid,
    pub newsletter_id: Uuid,
    pub content: String,
    pub scheduled_send_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

/// 09:00:00 UTC on the day after `now`.
pub fn next_issue_send_time(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = now.date_naive() + Days::new(1);
    tomorrow
        .and_hms_opt(9, 0, 0)
        .expect("09:00:00 is a valid time of day")
        .and_utc()
}

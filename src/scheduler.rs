use chrono::{DateTime, Days, FixedOffset, TimeZone, Utc};

use crate::{daily_issue_job::run_daily_issue_job, startup::ApplicationContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    hour: u32,
    minute: u32,
    offset: FixedOffset,
}

impl DailySchedule {
    pub fn new(hour: u32, minute: u32, offset: FixedOffset) -> Result<Self, String> {
        if hour > 23 || minute > 59 {
            return Err(format!("{hour:02}:{minute:02} is not a valid time of day."));
        }
        Ok(Self {
            hour,
            minute,
            offset,
        })
    }

    /// First instant strictly after `now` at which the local clock reads `hour:minute:00`.
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_today = now.with_timezone(&self.offset).date_naive();
        let mut candidate = self.at(local_today);
        if candidate <= now {
            candidate = self.at(local_today + Days::new(1));
        }
        candidate
    }

    /// Never earlier than the day after `last_run`, even if the wall clock went backwards.
    pub fn next_run_since(
        &self,
        now: DateTime<Utc>,
        last_run: Option<DateTime<Utc>>,
    ) -> DateTime<Utc> {
        let reference = last_run.map_or(now, |last_run| now.max(last_run));
        self.next_run_after(reference)
    }

    fn at(&self, date: chrono::NaiveDate) -> DateTime<Utc> {
        let local = date
            .and_hms_opt(self.hour, self.minute, 0)
            .expect("hour and minute are validated on construction");
        // A fixed offset has no gaps or folds.
        self.offset
            .from_local_datetime(&local)
            .single()
            .expect("fixed offsets map local times unambiguously")
            .with_timezone(&Utc)
    }
}

/// Missed runs are not caught up; runs from this loop never overlap each other.
pub async fn run_scheduler_until_stopped(
    context: ApplicationContext,
    schedule: DailySchedule,
) -> Result<(), anyhow::Error> {
    let mut last_run = None;
    loop {
        let now = Utc::now();
        let next_run = schedule.next_run_since(now, last_run);
        last_run = Some(next_run);
        tracing::info!(next_run = %next_run, "Daily issue job scheduled");

        let wait = (next_run - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        match run_daily_issue_job(&context).await {
            Ok(report) => tracing::info!(
                issues_generated = report.issues_generated,
                generation_failures = report.generation_failures,
                issues_sent = report.issues_sent,
                "Daily issue job finished"
            ),
            Err(e) => tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Daily issue job failed"
            ),
        }
    }
}

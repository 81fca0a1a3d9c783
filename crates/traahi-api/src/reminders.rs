use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use traahi_db::Database;
use traahi_providers::sms::SmsSender;

/// Outcome of one reminder batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderReport {
    pub matched: usize,
    pub sent: usize,
    pub failed: usize,
    /// Registrants without a phone number.
    pub skipped: usize,
}

pub fn reminder_message(full_name: &str, campaign_title: &str) -> String {
    format!(
        "Hi {full_name}, this is a reminder for the event \"{campaign_title}\" happening tomorrow. \
         We look forward to seeing you! - Traahi"
    )
}

/// Text every registrant of a campaign held on `event_date`.
///
/// Dispatch is sequential. A failed send is logged and counted; it never
/// stops the rest of the batch.
pub async fn send_reminders(
    db: &Arc<Database>,
    sms: &dyn SmsSender,
    event_date: NaiveDate,
) -> anyhow::Result<ReminderReport> {
    let db = db.clone();
    let rows = tokio::task::spawn_blocking(move || db.registrations_on(event_date)).await??;

    let mut report = ReminderReport {
        matched: rows.len(),
        ..Default::default()
    };
    if rows.is_empty() {
        info!("No reminders to send for {}", event_date);
        return Ok(report);
    }

    info!("Sending {} reminders for events on {}", rows.len(), event_date);
    for row in rows {
        let Some(phone) = row.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
            report.skipped += 1;
            continue;
        };

        let body = reminder_message(&row.full_name, &row.campaign_title);
        match sms.send(phone, &body).await {
            Ok(()) => {
                info!("Reminder sent to {}", phone);
                report.sent += 1;
            }
            Err(e) => {
                warn!("Failed to send reminder to {}: {}", phone, e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Time to wait from `now` until the next `at` on the local clock.
/// A firing time equal to `now` is treated as already passed.
pub fn until_next_firing(now: NaiveDateTime, at: NaiveTime) -> Duration {
    let today = now.date().and_time(at);
    let next = if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    };
    (next - now).to_std().unwrap_or_default()
}

/// Remembers the last local date a batch ran, so a wake-up that lands on the
/// same date again (wall clock stepped back, early timer) is skipped.
#[derive(Debug, Default)]
struct DailyGuard {
    last_run: Option<NaiveDate>,
}

impl DailyGuard {
    /// True when no batch has run on `today` yet; records `today` as run.
    fn claim(&mut self, today: NaiveDate) -> bool {
        if self.last_run == Some(today) {
            return false;
        }
        self.last_run = Some(today);
        true
    }
}

/// Fire once a day at `at` (server local time) and remind everyone whose
/// event is tomorrow. Missed days are not backfilled. Returns when `cancel`
/// is triggered.
pub async fn run_reminder_loop(
    db: Arc<Database>,
    sms: Arc<dyn SmsSender>,
    at: NaiveTime,
    cancel: CancellationToken,
) {
    let mut guard = DailyGuard::default();
    loop {
        let wait = until_next_firing(Local::now().naive_local(), at);
        info!("Next reminder run in {}s", wait.as_secs());

        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Reminder scheduler stopped");
                return;
            }
            _ = tokio::time::sleep(wait) => {}
        }

        let today = Local::now().date_naive();
        if !guard.claim(today) {
            warn!("Reminders for {} already ran; skipping duplicate wake-up", today);
            continue;
        }
        let Some(tomorrow) = today.succ_opt() else {
            warn!("Calendar overflow computing tomorrow; skipping run");
            continue;
        };

        match send_reminders(&db, sms.as_ref(), tomorrow).await {
            Ok(report) => info!(
                "Reminder run for {}: {} matched, {} sent, {} failed, {} without phone",
                tomorrow, report.matched, report.sent, report.failed, report.skipped
            ),
            Err(e) => error!("Reminder run for {} failed: {:#}", tomorrow, e),
        }
    }
}

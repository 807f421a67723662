//! Fixed daily trigger.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, NaiveTime, TimeZone};
use tracing::info;

use crate::executor::TradingEngine;

/// Runs one guarded cycle per day at a fixed local time of day.
///
/// Cycles run back to back on the caller's task, so they never overlap. A
/// cycle that overruns the next trigger time pushes that trigger to the
/// following day.
#[derive(Debug, Clone, Copy)]
pub struct DailyScheduler {
    at: NaiveTime,
}

impl DailyScheduler {
    pub fn new(at: NaiveTime) -> Self {
        Self { at }
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.at
    }

    /// The first trigger strictly after `now`.
    pub fn next_trigger<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let today = now.date_naive().and_time(self.at);
        let candidate = resolve(&tz, today);

        if candidate > *now {
            candidate
        } else {
            resolve(&tz, today + Duration::days(1))
        }
    }

    /// Sleep until each trigger and run the cycle. Never returns.
    pub async fn run(&self, engine: &mut TradingEngine) {
        loop {
            let now = Local::now();
            let next = self.next_trigger(&now);
            let wait = (next - now).to_std().unwrap_or_default();
            info!(next = %next, wait_secs = wait.as_secs(), "Waiting for next trigger");

            tokio::time::sleep(wait).await;
            engine.run_guarded().await;
        }
    }
}

fn resolve<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(at) => at,
        LocalResult::Ambiguous(earliest, _) => earliest,
        // Skipped by a forward clock change.
        LocalResult::None => resolve(tz, local + Duration::minutes(30)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn half_past_three() -> DailyScheduler {
        DailyScheduler::new(NaiveTime::from_hms_opt(15, 30, 0).unwrap())
    }

    #[test]
    fn test_trigger_later_today() {
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        let next = half_past_three().next_trigger(&now);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 4, 15, 30, 0).unwrap());
    }

    #[test]
    fn test_trigger_rolls_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 16, 0, 0).unwrap();
        let next = half_past_three().next_trigger(&now);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 5, 15, 30, 0).unwrap());
    }

    #[test]
    fn test_exact_trigger_time_waits_a_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 15, 30, 0).unwrap();
        let next = half_past_three().next_trigger(&now);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 5, 15, 30, 0).unwrap());
    }

    #[test]
    fn test_trigger_in_local_offset() {
        let eastern = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = eastern.with_ymd_and_hms(2024, 12, 31, 20, 0, 0).unwrap();
        let next = half_past_three().next_trigger(&now);

        assert_eq!(next, eastern.with_ymd_and_hms(2025, 1, 1, 15, 30, 0).unwrap());
        assert_eq!(next.with_timezone(&Utc).to_rfc3339(), "2025-01-01T20:30:00+00:00");
    }
}

//! Seconds studied today.
//!
//! The counter itself belongs to the study timer that drives the app. This
//! module is its read side: the timer publishes through an [`ActivityFeed`],
//! and the reward evaluator and the persister read the latest value through
//! an [`ActivityReader`]. No aggregation happens here.

use chrono::NaiveDate;
use tokio::sync::watch;

use crate::calendar::trailing_days;
use crate::error::Result;
use crate::storage::keys::DailyActivityKey;
use crate::storage::LocalCache;

/// Write side, owned by the study timer.
#[derive(Debug)]
pub struct ActivityFeed {
    tx: watch::Sender<u64>,
}

/// Read side handed to the session.
#[derive(Debug, Clone)]
pub struct ActivityReader {
    rx: watch::Receiver<u64>,
}

/// Create a linked feed/reader pair starting at `initial_secs`.
pub fn activity_channel(initial_secs: u64) -> (ActivityFeed, ActivityReader) {
    let (tx, rx) = watch::channel(initial_secs);
    (ActivityFeed { tx }, ActivityReader { rx })
}

impl ActivityFeed {
    /// Publish the timer's current value. Readers see only the latest.
    pub fn publish(&self, seconds_today: u64) {
        self.tx.send_if_modified(|current| {
            if *current == seconds_today {
                false
            } else {
                *current = seconds_today;
                true
            }
        });
    }

    pub fn reader(&self) -> ActivityReader {
        ActivityReader {
            rx: self.tx.subscribe(),
        }
    }
}

impl ActivityReader {
    pub fn seconds_today(&self) -> u64 {
        *self.rx.borrow()
    }

    /// Wait for the next published value. `None` once the feed is dropped.
    pub async fn changed(&mut self) -> Option<u64> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

/// Record a day snapshot of seconds studied.
pub async fn record_day(cache: &LocalCache, user_id: &str, day: NaiveDate, seconds: u64) -> Result<()> {
    cache.save(&DailyActivityKey { user_id, day }, &seconds).await
}

/// Seconds recorded for one day, zero when nothing was recorded.
pub async fn seconds_on(cache: &LocalCache, user_id: &str, day: NaiveDate) -> Result<u64> {
    Ok(cache
        .load(&DailyActivityKey { user_id, day })
        .await?
        .unwrap_or(0))
}

/// Sum of the last seven day snapshots, today included.
pub async fn weekly_seconds(cache: &LocalCache, user_id: &str, today: NaiveDate) -> Result<u64> {
    let mut total = 0u64;
    for day in trailing_days(today, 7) {
        total = total.saturating_add(seconds_on(cache, user_id, day).await?);
    }
    Ok(total)
}

/// Goal completion in percent, capped at 100.
pub fn progress_pct(seconds: u64, goal_secs: u64) -> f64 {
    let goal = goal_secs.max(1) as f64;
    (seconds as f64 / goal * 100.0).min(100.0)
}

pub fn time_left(seconds: u64, goal_secs: u64) -> u64 {
    goal_secs.saturating_sub(seconds)
}

/// `"2h 5m"` style rendering.
pub fn format_hm(seconds: u64) -> String {
    format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn reader_sees_latest_value() {
        let (feed, mut reader) = activity_channel(0);
        feed.publish(30);
        feed.publish(90);
        assert_eq!(reader.changed().await, Some(90));
        assert_eq!(reader.seconds_today(), 90);
    }

    #[tokio::test]
    async fn changed_ends_when_feed_dropped() {
        let (feed, mut reader) = activity_channel(5);
        drop(feed);
        assert_eq!(reader.changed().await, None);
        assert_eq!(reader.seconds_today(), 5);
    }

    #[tokio::test]
    async fn weekly_sum_covers_seven_days() {
        let cache = LocalCache::new(Arc::new(MemoryStore::new()));
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        for (back, secs) in [(0u64, 100u64), (3, 200), (6, 300), (7, 10_000)] {
            let day = today - chrono::Days::new(back);
            record_day(&cache, "u1", day, secs).await.unwrap();
        }
        assert_eq!(weekly_seconds(&cache, "u1", today).await.unwrap(), 600);
        assert_eq!(weekly_seconds(&cache, "u2", today).await.unwrap(), 0);
    }

    #[test]
    fn progress_is_capped() {
        assert_eq!(progress_pct(1800, 3600), 50.0);
        assert_eq!(progress_pct(7200, 3600), 100.0);
        assert_eq!(progress_pct(10, 0), 100.0);
        assert_eq!(time_left(4000, 3600), 0);
    }

    #[test]
    fn formats_hours_and_minutes() {
        assert_eq!(format_hm(3600 * 2 + 5 * 60 + 59), "2h 5m");
        assert_eq!(format_hm(0), "0h 0m");
    }
}

//! Weekly completion counter.
//!
//! Weeks are 7-day buckets counted from January 1st of the local year
//! (`bucket = day_of_year0 / 7`), not ISO calendar weeks. Each bucket is
//! stored under its own key, so a new bucket naturally starts at zero.

use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use tokio::sync::Mutex;

use crate::storage::KvStore;

const KEY_PREFIX: &str = "little_thing_week";

/// Source of "today" for week bucketing.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Identifies one 7-day bucket of one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekKey {
    pub year: i32,
    pub bucket: u32,
}

impl WeekKey {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            bucket: date.ordinal0() / 7,
        }
    }
}

/// Key of the bucket containing `date`.
pub fn week_key(date: NaiveDate) -> WeekKey {
    WeekKey::for_date(date)
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", KEY_PREFIX, self.year, self.bucket)
    }
}

/// Persistent per-week completion count.
///
/// Storage failures never propagate: unreadable values count as zero and a
/// failed write still reports the incremented value. The last value handed
/// out is remembered per bucket, so the count keeps rising for the session
/// even when nothing reaches the store.
#[derive(Clone)]
pub struct WeeklyCounter {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    last: Arc<Mutex<Option<(WeekKey, u32)>>>,
}

impl WeeklyCounter {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            last: Arc::new(Mutex::new(None)),
        }
    }

    pub fn current_key(&self) -> WeekKey {
        week_key(self.clock.today())
    }

    /// Count for the current week, 0 if nothing was stored yet.
    pub async fn get(&self) -> u32 {
        let key = self.current_key();
        let last = self.last.lock().await;
        let stored = self.read(&key).await;
        match *last {
            Some((cached_key, cached)) if cached_key == key => stored.max(cached),
            _ => stored,
        }
    }

    /// Add one completion to the current week and return the new count.
    pub async fn increment(&self) -> u32 {
        let key = self.current_key();
        let mut last = self.last.lock().await;
        let stored = self.read(&key).await;
        let base = match *last {
            Some((cached_key, cached)) if cached_key == key => stored.max(cached),
            _ => stored,
        };
        let count = base.saturating_add(1);
        *last = Some((key, count));
        if let Err(e) = self.store.set(&key.to_string(), &count.to_string()).await {
            tracing::warn!("Failed to persist weekly count {} for {}: {}", count, key, e);
        }
        count
    }

    async fn read(&self, key: &WeekKey) -> u32 {
        match self.store.get(&key.to_string()).await {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|e| {
                tracing::warn!("Ignoring unparsable weekly count {:?} for {}: {}", raw, key, e);
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                tracing::warn!("Failed to read weekly count for {}: {}", key, e);
                0
            }
        }
    }
}

//! Backfill policy and store synchronization
//!
//! Decides how many trailing days to fetch for a run and merges the
//! fetched days into the in-memory store.

use chrono::{Days, NaiveDate};
use tracing::{info, warn};

use super::summaries::SummarySource;
use crate::types::{CodetallyError, FetchedDay, IgnoreSet, Result, Store};

/// Stores with fewer distinct dates than this get bootstrapped
pub const AUTO_BACKFILL_THRESHOLD: usize = 3;

/// Trailing days fetched by the bootstrap backfill
pub const AUTO_BACKFILL_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackfillReason {
    /// A backfill count was configured
    Explicit,
    /// The store is nearly empty
    Bootstrap,
}

/// What a run will request from the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    Range {
        start: NaiveDate,
        end: NaiveDate,
        reason: BackfillReason,
    },
    SingleDay(NaiveDate),
}

impl FetchPlan {
    /// Explicit backfill wins, then bootstrap below the threshold,
    /// otherwise a single-day update. A count of zero means unset.
    pub fn choose(
        stored_days: usize,
        backfill_days: Option<u32>,
        summary_date: NaiveDate,
    ) -> Result<Self> {
        match backfill_days.filter(|&n| n > 0) {
            Some(days) => Self::trailing(days, summary_date, BackfillReason::Explicit),
            None if stored_days < AUTO_BACKFILL_THRESHOLD => {
                Self::trailing(AUTO_BACKFILL_DAYS, summary_date, BackfillReason::Bootstrap)
            }
            None => Ok(FetchPlan::SingleDay(summary_date)),
        }
    }

    fn trailing(days: u32, end: NaiveDate, reason: BackfillReason) -> Result<Self> {
        let start = end
            .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
            .ok_or_else(|| {
                CodetallyError::Config(format!(
                    "backfill of {} days before {} is out of range",
                    days, end
                ))
            })?;
        Ok(FetchPlan::Range { start, end, reason })
    }
}

/// Outcome of one synchronization
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub plan: FetchPlan,
    /// Dates whose records were (re)written, ascending
    pub merged: Vec<NaiveDate>,
}

pub struct SyncService<S> {
    source: S,
    ignore: IgnoreSet,
    backfill_days: Option<u32>,
}

impl<S: SummarySource> SyncService<S> {
    pub fn new(source: S, ignore: IgnoreSet, backfill_days: Option<u32>) -> Self {
        Self {
            source,
            ignore,
            backfill_days,
        }
    }

    /// Fetch according to the backfill policy and merge into `store`.
    ///
    /// Nothing is merged unless the fetch succeeded, so an error leaves
    /// `store` exactly as it was.
    pub fn run(&self, store: &mut Store, summary_date: NaiveDate) -> Result<SyncReport> {
        let plan = FetchPlan::choose(store.len(), self.backfill_days, summary_date)?;

        let fetched: Vec<FetchedDay> = match plan {
            FetchPlan::Range { start, end, reason } => {
                info!(%start, %end, ?reason, stored_days = store.len(), "fetching range");
                let days = self.source.fetch_range(start, end)?;
                if days.is_empty() {
                    warn!(%start, %end, "range returned no usable days; nothing to merge");
                }
                days.into_values().collect()
            }
            FetchPlan::SingleDay(date) => {
                info!(%date, stored_days = store.len(), "fetching single day");
                vec![self.source.fetch_single_day(date)?]
            }
        };

        let mut merged = Vec::with_capacity(fetched.len());
        for day in fetched {
            merged.push(day.date);
            store.merge_day(day, &self.ignore);
        }
        merged.sort();
        merged.dedup();

        info!(merged = merged.len(), stored_days = store.len(), "store updated");
        Ok(SyncReport { plan, merged })
    }
}

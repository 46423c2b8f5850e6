use crate::coach::CoachClient;
use crate::models::AppData;
use crate::storage::Store;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex as SyncMutex, PoisonError};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub data: Arc<Mutex<AppData>>,
    pub sidebar_open: Arc<Mutex<bool>>,
    pub coach: CoachClient,
    pub coaching: CoachingDates,
}

impl AppState {
    pub fn new(store: Store, data: AppData, sidebar_open: bool, coach: CoachClient) -> Self {
        Self {
            store,
            data: Arc::new(Mutex::new(data)),
            sidebar_open: Arc::new(Mutex::new(sidebar_open)),
            coach,
            coaching: CoachingDates::default(),
        }
    }
}

/// Dates with a coach request in flight, at most one request per date.
#[derive(Clone, Default)]
pub struct CoachingDates {
    dates: Arc<SyncMutex<BTreeSet<NaiveDate>>>,
}

impl CoachingDates {
    /// Marks `date` as in flight. `None` when it already is.
    pub fn try_begin(&self, date: NaiveDate) -> Option<CoachingGuard> {
        let inserted = self
            .dates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(date);
        inserted.then(|| CoachingGuard {
            dates: Arc::clone(&self.dates),
            date,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&date)
    }

    pub fn snapshot(&self) -> Vec<NaiveDate> {
        self.dates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }
}

/// Clears its date from [`CoachingDates`] when dropped.
pub struct CoachingGuard {
    dates: Arc<SyncMutex<BTreeSet<NaiveDate>>>,
    date: NaiveDate,
}

impl Drop for CoachingGuard {
    fn drop(&mut self) {
        self.dates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.date);
    }
}

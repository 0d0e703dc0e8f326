// Test utilities available to both unit and integration tests
// Only compiled when testing

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::column_validator::EQUIVALENCE_TABLE_COLUMNS;
use crate::error::LoadError;
use crate::loader::{Fetcher, PUBLIC_EXCEL_URL_KEY, UploadLoader, UploadedFile, XlsxUploadLoader};
use crate::orchestrator::Feedback;
use crate::table::{SheetCollection, Table};
use crate::utils::Clock;

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        ManualClock {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        ManualClock::at(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared view of how many times a test double was called
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn increment(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

enum FetchResponse {
    Body(Vec<u8>),
    Failure(String),
}

/// Fetcher that serves a fixed response and counts requests
pub struct CountingFetcher {
    response: FetchResponse,
    calls: CallCounter,
    urls: Arc<Mutex<Vec<String>>>,
}

impl CountingFetcher {
    pub fn serving(body: Vec<u8>) -> Self {
        CountingFetcher {
            response: FetchResponse::Body(body),
            calls: CallCounter::default(),
            urls: Arc::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        CountingFetcher {
            response: FetchResponse::Failure(message.to_string()),
            calls: CallCounter::default(),
            urls: Arc::default(),
        }
    }

    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }

    /// URLs requested so far, shared with the fetcher
    pub fn urls(&self) -> Arc<Mutex<Vec<String>>> {
        self.urls.clone()
    }
}

impl Fetcher for CountingFetcher {
    fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        self.calls.increment();
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());

        match &self.response {
            FetchResponse::Body(body) => Ok(body.clone()),
            FetchResponse::Failure(message) => Err(anyhow::anyhow!("{}", message)),
        }
    }
}

/// Upload loader that counts calls and delegates to the xlsx loader
#[derive(Default)]
pub struct CountingUploadLoader {
    calls: CallCounter,
}

impl CountingUploadLoader {
    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

impl UploadLoader for CountingUploadLoader {
    fn load_from_handle(&self, file: &UploadedFile) -> Result<SheetCollection, LoadError> {
        self.calls.increment();
        XlsxUploadLoader.load_from_handle(file)
    }
}

/// Feedback sink that records what would have been shown
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    pub successes: Vec<String>,
    pub errors: Vec<String>,
}

impl Feedback for RecordingFeedback {
    fn success(&mut self, message: &str) {
        self.successes.push(message.to_string());
    }

    fn error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

/// Configuration map holding only the public workbook URL
pub fn config_with_url(url: &str) -> HashMap<String, String> {
    let mut config = HashMap::new();
    config.insert(PUBLIC_EXCEL_URL_KEY.to_string(), url.to_string());
    config
}

/// Header-only table with every required column plus `extra`
pub fn equivalence_table(extra: &[&str]) -> Table {
    Table::from_headers(
        EQUIVALENCE_TABLE_COLUMNS
            .iter()
            .chain(extra.iter())
            .copied(),
    )
}

/// Header-only table with every required column except `dropped`
pub fn equivalence_table_without(dropped: &str) -> Table {
    Table::from_headers(
        EQUIVALENCE_TABLE_COLUMNS
            .iter()
            .copied()
            .filter(|column| *column != dropped),
    )
}

/// Collect named tables into a workbook
pub fn sheets(tables: Vec<(&str, Table)>) -> SheetCollection {
    tables.into_iter().collect()
}

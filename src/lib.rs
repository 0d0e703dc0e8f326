//! Gatekeeper for equivalence-table workbooks.
//!
//! A workbook is accepted when at least one of its sheets carries every column of the
//! required-column contract. Workbooks arrive either as an uploaded file or from a
//! public URL read from configuration; see [`AcquisitionOrchestrator`].

mod cache;
mod column_validator;
mod config;
mod error;
pub mod loader;
mod orchestrator;
mod table;
pub mod utils;

// Test utilities - only compiled when testing or with test feature
// #[cfg(test)] alone doesn't work for integration tests (they're external crates)
// The feature flag makes it available to integration tests via dev-dependencies
#[cfg(any(test, feature = "test"))]
pub mod test_utils;

pub use cache::TtlCache;
pub use column_validator::{
    ColumnContractValidator, EQUIVALENCE_TABLE_COLUMNS, RequiredColumnSet, ValidationMessages,
    ValidationOutcome, ValidationResult,
};
pub use config::{ConfigProvider, EnvConfig};
pub use error::{ContractError, LoadError};
pub use loader::{
    Fetcher, HttpFetcher, PUBLIC_EXCEL_URL_KEY, RemoteLoader, RemoteLoaderBuilder, UploadLoader,
    UploadedFile, XlsxUploadLoader, decode_workbook,
};
pub use orchestrator::{AcquisitionOrchestrator, AcquisitionOutcome, Feedback};
pub use table::{ParsedRow, SheetCollection, Table, cell_to_json};

//! Loaders turn a raw source into a [`SheetCollection`](crate::SheetCollection).
//!
//! The upload path decodes a transient file handle on every call. The remote path
//! resolves a URL from configuration, fetches it, and caches successful decodes.

mod remote;
mod upload;
mod workbook;

pub use remote::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_FETCH_TIMEOUT_SECS, Fetcher, HttpFetcher, PUBLIC_EXCEL_URL_KEY,
    RemoteLoader, RemoteLoaderBuilder,
};
pub use upload::{UploadLoader, UploadedFile, XlsxUploadLoader};
pub use workbook::decode_workbook;

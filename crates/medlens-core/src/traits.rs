//! Core trait definitions for the MedLens client.
//!
//! These four traits are the seams between the client logic and its host:
//!
//! - `SessionStorage` : key/value persistence for the session triple
//! - `Clock`          : wall-clock time, injectable for expiry tests
//! - `Navigator`      : page location and redirects
//! - `Transport`      : sends one HTTP request, returns status and body
//!
//! Nothing above these traits touches the network, the file system or a
//! browser location directly.

use std::future::Future;

use chrono::{DateTime, Utc};

use medlens_contracts::{
    error::MedlensResult,
    http::{ApiRequest, ApiResponse},
};

/// String key/value persistence, shaped like browser local storage.
pub trait SessionStorage: Send + Sync {
    /// Read `key`. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> MedlensResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> MedlensResult<()>;

    /// Delete `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> MedlensResult<()>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The page location of the hosting shell.
pub trait Navigator: Send + Sync {
    /// Path of the page currently shown, e.g. `/frontend/auth/login.html`.
    fn current_path(&self) -> String;

    /// Navigate to `path`.
    fn redirect(&self, path: &str);
}

/// Sends requests built by the API client.
///
/// Implementations report only transport failures as errors. Any HTTP status,
/// including 4xx and 5xx, is a successful `ApiResponse`.
pub trait Transport: Send + Sync {
    fn send(&self, request: ApiRequest) -> impl Future<Output = MedlensResult<ApiResponse>> + Send;
}

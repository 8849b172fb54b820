//! # medlens-core
//!
//! Seams of the MedLens client.
//!
//! This crate provides:
//! - The four host traits (`SessionStorage`, `Clock`, `Navigator`, `Transport`)
//! - `Routes`, the page table the auth flows redirect through
//! - `SystemClock`, `FixedClock` and `RecordingNavigator`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medlens_core::{traits::{Clock, Navigator}, SystemClock, RecordingNavigator};
//! ```

pub mod routes;
pub mod system;
pub mod traits;

pub use routes::Routes;
pub use system::{FixedClock, RecordingNavigator, SystemClock};

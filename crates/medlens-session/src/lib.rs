//! # medlens-session
//!
//! Client-held authentication state for MedLens.
//!
//! `SessionStore` keeps the `{token, user, login time}` triple in a
//! `SessionStorage` backend and enforces the validity window. Two backends
//! ship here:
//!
//! - `InMemoryStorage`: process lifetime, for tests and embedding
//! - `FileStorage`: one JSON file, used by the `medlens` binary
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medlens_core::SystemClock;
//! use medlens_session::{FileStorage, SessionStore};
//!
//! let store = SessionStore::new(
//!     Box::new(FileStorage::new("~/.medlens/session.json")),
//!     Box::new(SystemClock),
//! );
//! if store.init()? {
//!     let session = store.current()?;
//! }
//! ```

pub mod file;
pub mod memory;
pub mod store;

pub use file::FileStorage;
pub use memory::InMemoryStorage;
pub use store::{SessionStore, DEFAULT_TTL_HOURS};

// ── Tests ─────────────────────────────────────────────────────────────────────

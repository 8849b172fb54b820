//! # medlens-config
//!
//! TOML configuration for the MedLens client: where the API lives, where the
//! frontend pages are, how long sessions last, and the pauses the auth flows
//! take before redirecting.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medlens_config::ClientConfig;
//!
//! let config = ClientConfig::from_file(Path::new("medlens.toml"))?;
//! ```

pub mod config;

pub use config::ClientConfig;

// ── Tests ─────────────────────────────────────────────────────────────────────

//! # medlens-client
//!
//! Talks to the MedLens analysis API.
//!
//! - `ApiClient`: JSON and multipart requests with bearer injection and
//!   uniform status handling
//! - analysis endpoints (`analyze_text`, `analyze_pdf`, `analyze_pdfs`)
//!   returning normalized documents
//! - `AuthFlow`: login, registration with automatic login, logout, and
//!   role guards for pages
//! - `ReqwestTransport`: the production `Transport`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use medlens_client::{AnalysisOptions, ApiClient, AuthDelays, AuthFlow, ReqwestTransport};
//!
//! let client = ApiClient::from_config(ReqwestTransport::new()?, &config, session, navigator);
//! AuthFlow::new(&client, AuthDelays::from_config(&config))
//!     .login("drsmith", "secret")
//!     .await?;
//! let analysis = client
//!     .analyze_text("Patient has diabetes.", &AnalysisOptions::from_config(&config))
//!     .await?;
//! ```

pub mod analysis;
pub mod api;
pub mod auth;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use analysis::{Analysis, AnalysisOptions, AnalysisOutcome, PdfUpload};
pub use api::ApiClient;
pub use auth::{AuthDelays, AuthFlow, FieldError, RegisterOutcome, RegistrationForm};
pub use transport::ReqwestTransport;

//! # medlens-annotate
//!
//! Turns analysis responses into something a reader can look at: one
//! canonical document, character spans for every entity that can be placed,
//! highlighted text, and entity tables.
//!
//! ## Overview
//!
//! ```text
//! raw JSON ── normalize ──▶ NormalizedDocument
//!                              │
//!                              ├── highlight   (resolve ▶ merge ▶ segments)
//!                              └── build_tables
//! ```
//!
//! Every function in this crate is pure and infallible. Missing fields
//! become empty values and unplaceable entities are left out of the
//! highlighting while staying in the tables.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medlens_annotate::{build_tables, highlight, normalize};
//!
//! let doc = normalize(&response_json);
//! let text_html = highlight(&doc.source_text, &doc.diseases, &doc.labs).to_html();
//! let tables_html = build_tables(&doc.diseases, &doc.labs).to_html();
//! ```

pub mod highlight;
pub mod normalize;
pub mod resolve;
pub mod table;
mod text;

pub use highlight::{highlight, merge_spans, Highlighted, MergeGroup, Segment, NO_SOURCE_TEXT};
pub use normalize::{is_multi_document, normalize, parse_disease, parse_lab, parse_multi_document};
pub use resolve::{annotate, resolve_disease_span, resolve_lab_span};
pub use table::{build_tables, DiseaseRow, EntityTables, LabRow};

// ── Tests ─────────────────────────────────────────────────────────────────────

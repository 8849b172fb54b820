//! # medlens-web
//!
//! The document-processing view: turns an analysis response into HTML
//! panels and wraps them into a page.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medlens_web::{render_page, render_response, ViewOptions};
//!
//! let view = render_response(&analysis.raw, &ViewOptions::default());
//! std::fs::write("report.html", render_page("Analysis", &view))?;
//! ```

pub mod mock_data;
pub mod page;
pub mod view;

pub use page::render_page;
pub use view::{render_multi, render_response, render_single, RenderedView, ViewOptions};

// ── Tests ─────────────────────────────────────────────────────────────────────

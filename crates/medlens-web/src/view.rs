//! The document-processing view.
//!
//! A result is rendered into five panels. Single documents fill all of
//! them. Multi-document results put everything in the summary panel as one
//! collapsible section per document and leave highlighting out.

use std::fmt::Write;

use html_escape::encode_text;
use serde_json::Value;
use tracing::debug;

use medlens_annotate::{build_tables, highlight, is_multi_document, normalize, parse_multi_document};
use medlens_contracts::document::{MultiDocumentResponse, NormalizedDocument};

pub const NO_METADATA: &str = r#"<span class="small">No metadata</span>"#;
pub const NO_SUMMARY: &str = r#"<span class="small">No summary available</span>"#;
pub const MULTI_DOCUMENT_NOTICE: &str =
    r#"<p class="small">Multiple documents uploaded. View individual document summaries above.</p>"#;

/// Render settings for one result.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewOptions<'a> {
    /// What the user submitted. Shown when the server echoes no text.
    pub input_text: Option<&'a str>,
    /// Append the raw response under the entity tables.
    pub show_json: bool,
}

/// HTML fragments for each panel of the view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedView {
    pub metadata: String,
    pub extracted_text: String,
    pub entities: String,
    pub highlighted: String,
    pub summary: String,
    pub multi_document: bool,
}

impl RenderedView {
    /// Panels in display order, titled.
    pub fn panels(&self) -> [(&'static str, &str); 5] {
        [
            ("Metadata", &self.metadata),
            ("Extracted Text", &self.extracted_text),
            ("Entities & Lab Results", &self.entities),
            ("Highlighted Text", &self.highlighted),
            ("Summary", &self.summary),
        ]
    }
}

/// Render a server response of either shape.
pub fn render_response(raw: &Value, options: &ViewOptions<'_>) -> RenderedView {
    if is_multi_document(raw) {
        if let Some(multi) = parse_multi_document(raw) {
            return render_multi(&multi);
        }
    }
    render_single(&normalize(raw), raw, options)
}

/// Render one document. `raw` is only used for the optional JSON block.
pub fn render_single(doc: &NormalizedDocument, raw: &Value, options: &ViewOptions<'_>) -> RenderedView {
    let text = if doc.source_text.is_empty() {
        options.input_text.unwrap_or_default()
    } else {
        doc.source_text.as_str()
    };

    let mut entities = build_tables(&doc.diseases, &doc.labs).to_html();
    if options.show_json {
        let pretty = serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string());
        let _ = write!(entities, "<hr><pre>{}</pre>", encode_text(&pretty));
    }

    let highlighted = highlight(text, &doc.diseases, &doc.labs);
    debug!(
        diseases = doc.diseases.len(),
        labs = doc.labs.len(),
        marked = highlighted.groups().count(),
        "rendered single document"
    );

    RenderedView {
        metadata: metadata_rows(doc),
        extracted_text: encode_text(text).into_owned(),
        entities,
        highlighted: highlighted.to_html(),
        summary: summary_or_placeholder(&doc.summary),
        multi_document: false,
    }
}

/// Render a multi-document result.
pub fn render_multi(multi: &MultiDocumentResponse) -> RenderedView {
    let meta = &multi.metadata;
    let mut metadata = String::new();
    for (key, value) in [
        ("Total Documents", meta.total_documents.to_string()),
        ("Files", meta.filenames.join(", ")),
        ("Total Diseases Found", meta.total_diseases_found.to_string()),
        ("Total Labs Found", meta.total_labs_found.to_string()),
    ] {
        push_row(&mut metadata, key, &value);
    }

    let summary = if multi.consolidated_summary.is_empty() {
        NO_SUMMARY.to_string()
    } else {
        let mut out = format!(
            "<h3>Consolidated Summary (All Documents)</h3>\
             <div class=\"summary-content\">{}</div>\
             <hr><h4>Individual Document Results:</h4>",
            encode_text(&multi.consolidated_summary)
        );
        for (index, doc) in multi.documents.iter().enumerate() {
            out.push_str(&document_section(index, doc));
        }
        out
    };

    debug!(documents = multi.documents.len(), "rendered multi-document result");

    RenderedView {
        metadata,
        extracted_text: MULTI_DOCUMENT_NOTICE.to_string(),
        entities: String::new(),
        highlighted: String::new(),
        summary,
        multi_document: true,
    }
}

/// One collapsible section of the multi-document summary.
fn document_section(index: usize, doc: &NormalizedDocument) -> String {
    let title = doc
        .original_filename()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Document {}", index + 1));
    format!(
        "<details><summary>{} ({} diseases, {} labs)</summary>\
         <div class=\"document-result\">\
         <h5>Document Summary:</h5><div class=\"summary-content\">{}</div>\
         <h5>Extracted Entities:</h5>{}</div></details>",
        encode_text(&title),
        doc.diseases.len(),
        doc.labs.len(),
        summary_or_placeholder(&doc.summary),
        build_tables(&doc.diseases, &doc.labs).to_html()
    )
}

fn metadata_rows(doc: &NormalizedDocument) -> String {
    if doc.metadata.is_empty() {
        return NO_METADATA.to_string();
    }
    let mut out = String::new();
    for (key, value) in &doc.metadata {
        push_row(&mut out, key, value);
    }
    out
}

fn push_row(out: &mut String, key: &str, value: &str) {
    let _ = write!(
        out,
        r#"<div><strong>{}:</strong> <span class="small">{}</span></div>"#,
        encode_text(key),
        encode_text(value)
    );
}

fn summary_or_placeholder(summary: &str) -> String {
    if summary.is_empty() {
        NO_SUMMARY.to_string()
    } else {
        encode_text(summary).into_owned()
    }
}

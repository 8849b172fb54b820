//! Response normalization.
//!
//! The analysis endpoints return the same logical fields under several keys
//! depending on endpoint and server version. Every logical field is resolved
//! through one priority list below, first usable key wins. Nothing here
//! fails: a missing or mistyped field becomes an empty value.
//!
//! | Logical field       | Keys, in priority order                          |
//! |---------------------|--------------------------------------------------|
//! | source text         | `extracted_text`, `text`, `sourceText`           |
//! | disease list        | `disease_ner.entities`, `diseases`               |
//! | lab list            | `lab_rag.matches`, `lab_results`, `labs`         |
//! | summary             | `summary_block.clinical_summary`, `summary`, `text` |
//! | disease text        | `entity`, `text`                                 |
//! | disease label       | `label`, `entity_type`                           |
//! | lab test name       | `test_name`, `text`, `test`                      |
//! | lab value           | `value_extracted`, `value`                       |
//! | lab reference range | `reference_range`, `normal_range`                |
//! | lab confidence      | `confidence`, `conf`                             |

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use medlens_contracts::{
    document::{MultiDocumentMetadata, MultiDocumentResponse, NormalizedDocument},
    entity::{DiseaseEntity, LabMatch},
};

const SOURCE_TEXT_KEYS: &[&str] = &["extracted_text", "text", "sourceText"];
const DISEASE_LIST_PATHS: &[&str] = &["disease_ner.entities", "diseases"];
const LAB_LIST_PATHS: &[&str] = &["lab_rag.matches", "lab_results", "labs"];

const DISEASE_TEXT_KEYS: &[&str] = &["entity", "text"];
const DISEASE_LABEL_KEYS: &[&str] = &["label", "entity_type"];
const DISEASE_CONFIDENCE_KEYS: &[&str] = &["confidence"];

const LAB_NAME_KEYS: &[&str] = &["test_name", "text", "test"];
const LAB_VALUE_KEYS: &[&str] = &["value_extracted", "value"];
const LAB_UNIT_KEYS: &[&str] = &["unit"];
const LAB_RANGE_KEYS: &[&str] = &["reference_range", "normal_range"];
const LAB_CONFIDENCE_KEYS: &[&str] = &["confidence", "conf"];

/// Map any analysis response to one `NormalizedDocument`.
///
/// A response with a non-empty `documents` array is a multi-document
/// response; its first document is normalized for single-document display.
/// Everything else is read as a single document.
pub fn normalize(raw: &Value) -> NormalizedDocument {
    if let Some(first) = documents(raw).and_then(|docs| docs.first()) {
        debug!("multi-document response, normalizing first document");
        return normalize_entry(first, SummaryFallback::None);
    }
    normalize_entry(raw, SummaryFallback::SourceText)
}

/// True iff `raw.documents` is a non-empty array and `raw.consolidated_summary`
/// is present.
pub fn is_multi_document(raw: &Value) -> bool {
    let has_documents = documents(raw).is_some_and(|docs| !docs.is_empty());
    let has_summary = match raw.get("consolidated_summary") {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    };
    has_documents && has_summary
}

/// Parse a multi-document response. `None` unless `is_multi_document(raw)`.
///
/// Aggregate counters missing from the server metadata are recomputed from
/// the documents.
pub fn parse_multi_document(raw: &Value) -> Option<MultiDocumentResponse> {
    if !is_multi_document(raw) {
        return None;
    }

    let documents: Vec<NormalizedDocument> = documents(raw)
        .map(|docs| {
            docs.iter()
                .map(|d| normalize_entry(d, SummaryFallback::None))
                .collect()
        })
        .unwrap_or_default();

    let meta = raw.get("metadata");
    let count = |key: &str| {
        meta.and_then(|m| m.get(key))
            .and_then(Value::as_u64)
            .map(|n| n as usize)
    };
    let filenames = meta
        .and_then(|m| m.get("filenames"))
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(scalar_text).collect())
        .unwrap_or_else(|| {
            documents
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    d.original_filename()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("doc_{}", i + 1))
                })
                .collect()
        });

    let metadata = MultiDocumentMetadata {
        total_documents: count("total_documents").unwrap_or(documents.len()),
        filenames,
        total_diseases_found: count("total_diseases_found")
            .unwrap_or_else(|| documents.iter().map(|d| d.diseases.len()).sum()),
        total_labs_found: count("total_labs_found")
            .unwrap_or_else(|| documents.iter().map(|d| d.labs.len()).sum()),
    };

    let consolidated_summary = raw
        .get("consolidated_summary")
        .and_then(summary_text)
        .unwrap_or_default();

    Some(MultiDocumentResponse {
        metadata,
        documents,
        consolidated_summary,
    })
}

/// Read one disease entity. `None` only when `raw` is not an object.
pub fn parse_disease(raw: &Value) -> Option<DiseaseEntity> {
    if !raw.is_object() {
        return None;
    }
    Some(DiseaseEntity {
        text: first_text(raw, DISEASE_TEXT_KEYS).unwrap_or_default(),
        label: first_text(raw, DISEASE_LABEL_KEYS),
        start: offset(raw, "start"),
        end: offset(raw, "end"),
        confidence: first_number(raw, DISEASE_CONFIDENCE_KEYS),
    })
}

/// Read one lab match. `None` only when `raw` is not an object.
pub fn parse_lab(raw: &Value) -> Option<LabMatch> {
    if !raw.is_object() {
        return None;
    }
    Some(LabMatch {
        test_name: first_text(raw, LAB_NAME_KEYS).unwrap_or_default(),
        value: first_text(raw, LAB_VALUE_KEYS),
        unit: first_text(raw, LAB_UNIT_KEYS),
        reference_range: first_text(raw, LAB_RANGE_KEYS),
        confidence: first_number(raw, LAB_CONFIDENCE_KEYS),
        start: offset(raw, "start"),
        end: offset(raw, "end"),
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SummaryFallback {
    /// Single-document responses fall back to the flat `text` field.
    SourceText,
    /// Entries of a multi-document response have no fallback.
    None,
}

fn normalize_entry(raw: &Value, fallback: SummaryFallback) -> NormalizedDocument {
    let metadata = raw
        .get("metadata")
        .and_then(Value::as_object)
        .map(|m| {
            m.iter()
                .map(|(k, v)| (k.clone(), display_value(v)))
                .collect::<BTreeMap<_, _>>()
        })
        .unwrap_or_default();

    let source_text = first_text(raw, SOURCE_TEXT_KEYS).unwrap_or_default();

    let diseases: Vec<DiseaseEntity> = first_array(raw, DISEASE_LIST_PATHS)
        .map(|items| items.iter().filter_map(parse_disease).collect())
        .unwrap_or_default();

    let labs: Vec<LabMatch> = first_array(raw, LAB_LIST_PATHS)
        .map(|items| items.iter().filter_map(parse_lab).collect())
        .unwrap_or_default();

    let summary = resolve_path(raw, "summary_block.clinical_summary")
        .and_then(non_empty_str)
        .or_else(|| raw.get("summary").and_then(summary_text))
        .or_else(|| match fallback {
            SummaryFallback::SourceText => first_text(raw, &["text"]),
            SummaryFallback::None => None,
        })
        .unwrap_or_default();

    debug!(
        source_chars = source_text.chars().count(),
        diseases = diseases.len(),
        labs = labs.len(),
        has_summary = !summary.is_empty(),
        "normalized document"
    );

    NormalizedDocument {
        metadata,
        source_text,
        diseases,
        labs,
        summary,
    }
}

fn documents(raw: &Value) -> Option<&Vec<Value>> {
    raw.get("documents").and_then(Value::as_array)
}

/// Resolve a dot-notation path (e.g. `"lab_rag.matches"`). `None` when any
/// segment is missing or the value is JSON `null`.
fn resolve_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = value;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(v) if !v.is_null() => current = v,
            _ => return None,
        }
    }
    Some(current)
}

/// The first path holding an array. An empty array still wins.
fn first_array<'v>(raw: &'v Value, paths: &[&str]) -> Option<&'v Vec<Value>> {
    paths
        .iter()
        .find_map(|p| resolve_path(raw, p).and_then(Value::as_array))
}

/// The first key holding a non-empty string or a number.
fn first_text(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| raw.get(*k).and_then(scalar_text))
}

fn first_number(raw: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| raw.get(*k).and_then(Value::as_f64))
}

/// A non-negative integral offset. Floats such as `16.0` are accepted.
fn offset(raw: &Value, key: &str) -> Option<usize> {
    let v = raw.get(key)?;
    if let Some(n) = v.as_u64() {
        return Some(n as usize);
    }
    v.as_f64()
        .filter(|f| *f >= 0.0 && f.fract() == 0.0)
        .map(|f| f as usize)
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty_str(v: &Value) -> Option<String> {
    v.as_str().filter(|s| !s.is_empty()).map(str::to_string)
}

/// A summary given either as a plain string or as `{clinical_summary: ...}`.
fn summary_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(_) => v.get("clinical_summary").and_then(non_empty_str),
        _ => None,
    }
}

fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn single_document_prefers_nested_containers() {
        let raw = json!({
            "extracted_text": "from extracted",
            "text": "from text",
            "disease_ner": { "entities": [{ "entity": "asthma" }] },
            "diseases": [{ "text": "flat" }, { "text": "flat2" }],
            "lab_rag": { "matches": [{ "test": "CRP", "value": "12" }] },
            "lab_results": [],
            "summary_block": { "clinical_summary": "nested summary" },
            "summary": "flat summary"
        });
        let doc = normalize(&raw);
        assert_eq!(doc.source_text, "from extracted");
        assert_eq!(doc.diseases.len(), 1);
        assert_eq!(doc.diseases[0].text, "asthma");
        assert_eq!(doc.labs[0].test_name, "CRP");
        assert_eq!(doc.labs[0].value.as_deref(), Some("12"));
        assert_eq!(doc.summary, "nested summary");
    }

    #[test]
    fn single_document_flat_fallbacks() {
        let raw = json!({
            "text": "Patient text",
            "diseases": [{ "text": "fever", "entity_type": "DISEASE", "start": 0, "end": 5 }],
            "lab_results": [{ "text": "Hb", "value": "10.2 g/dL", "normal_range": "12-16" }],
            "summary": { "clinical_summary": "object summary" }
        });
        let doc = normalize(&raw);
        assert_eq!(doc.source_text, "Patient text");
        assert_eq!(doc.diseases[0].label.as_deref(), Some("DISEASE"));
        assert_eq!(doc.diseases[0].start, Some(0));
        assert_eq!(doc.labs[0].reference_range.as_deref(), Some("12-16"));
        assert_eq!(doc.summary, "object summary");
    }

    #[test]
    fn summary_falls_back_to_text() {
        let doc = normalize(&json!({ "text": "only text" }));
        assert_eq!(doc.summary, "only text");
    }

    #[test]
    fn missing_fields_normalize_to_empty() {
        let doc = normalize(&json!({}));
        assert_eq!(doc, NormalizedDocument::default());

        // Mistyped fields are ignored rather than rejected.
        let doc = normalize(&json!({
            "metadata": "not an object",
            "diseases": "not a list",
            "lab_results": [1, "x", null],
            "summary": 42
        }));
        assert!(doc.metadata.is_empty());
        assert!(doc.diseases.is_empty());
        assert!(doc.labs.is_empty());
        assert_eq!(doc.summary, "");
    }

    #[test]
    fn metadata_values_become_display_strings() {
        let doc = normalize(&json!({
            "metadata": { "input_source": "text", "processing_time_ms": 412 }
        }));
        assert_eq!(doc.metadata["input_source"], "text");
        assert_eq!(doc.metadata["processing_time_ms"], "412");
    }

    #[test]
    fn multi_document_uses_first_document() {
        let raw = json!({
            "metadata": { "total_documents": 2 },
            "documents": [
                {
                    "metadata": { "original_filename": "a.pdf" },
                    "text": "doc a",
                    "diseases": [{ "text": "gout" }],
                    "lab_results": [{ "text": "Urate", "value": "9" }],
                    "summary": { "clinical_summary": "summary a" }
                },
                { "text": "doc b", "diseases": [], "lab_results": [] }
            ],
            "consolidated_summary": "both"
        });
        let doc = normalize(&raw);
        assert_eq!(doc.source_text, "doc a");
        assert_eq!(doc.original_filename(), Some("a.pdf"));
        assert_eq!(doc.diseases[0].text, "gout");
        assert_eq!(doc.summary, "summary a");
    }

    #[test]
    fn multi_document_entry_has_no_text_summary_fallback() {
        let raw = json!({ "documents": [{ "text": "doc a" }] });
        assert_eq!(normalize(&raw).summary, "");
    }

    #[test]
    fn renormalizing_canonical_document_is_lossless() {
        let raw = json!({
            "metadata": { "input_source": "pdf" },
            "extracted_text": "Glucose 140 mg/dL, diabetes",
            "disease_ner": { "entities": [
                { "entity": "diabetes", "label": "DISEASE", "start": 19, "end": 27, "confidence": 0.91 }
            ]},
            "lab_rag": { "matches": [
                { "test_name": "Glucose", "value_extracted": "140 mg/dL", "unit": "mg/dL", "conf": 0.8 }
            ]},
            "summary_block": { "clinical_summary": "Hyperglycaemia." }
        });
        let first = normalize(&raw);
        let second = normalize(&serde_json::to_value(&first).unwrap());
        assert_eq!(first, second);
        assert_eq!(second.labs[0].confidence, Some(0.8));
    }

    #[test]
    fn offsets_must_be_non_negative_integers() {
        let d = parse_disease(&json!({ "text": "x", "start": -1, "end": 4.5 })).unwrap();
        assert_eq!(d.start, None);
        assert_eq!(d.end, None);
        let d = parse_disease(&json!({ "text": "x", "start": 2.0, "end": 4 })).unwrap();
        assert_eq!((d.start, d.end), (Some(2), Some(4)));
    }

    #[test]
    fn numeric_lab_value_is_stringified() {
        let lab = parse_lab(&json!({ "test_name": "Na", "value": 138 })).unwrap();
        assert_eq!(lab.value.as_deref(), Some("138"));
    }

    #[test]
    fn multi_document_detection() {
        assert!(is_multi_document(&json!({
            "documents": [{ "text": "a" }],
            "consolidated_summary": "x"
        })));
        assert!(!is_multi_document(&json!({ "documents": [] })));
        assert!(!is_multi_document(&json!({
            "documents": [],
            "consolidated_summary": "x"
        })));
        assert!(!is_multi_document(&json!({ "diseases": [{ "text": "a" }] })));
        assert!(!is_multi_document(&json!({
            "documents": [{ "text": "a" }],
            "consolidated_summary": ""
        })));
    }

    #[test]
    fn multi_document_counters_are_recomputed_when_absent() {
        let raw = json!({
            "documents": [
                { "metadata": { "original_filename": "a.pdf" }, "diseases": [{ "text": "x" }], "lab_results": [] },
                { "diseases": [{ "text": "y" }], "lab_results": [{ "text": "Hb" }] }
            ],
            "consolidated_summary": { "clinical_summary": "combined" }
        });
        let multi = parse_multi_document(&raw).unwrap();
        assert_eq!(multi.metadata.total_documents, 2);
        assert_eq!(multi.metadata.filenames, vec!["a.pdf", "doc_2"]);
        assert_eq!(multi.metadata.total_diseases_found, 2);
        assert_eq!(multi.metadata.total_labs_found, 1);
        assert_eq!(multi.consolidated_summary, "combined");
    }

    #[test]
    fn parse_multi_document_rejects_single_document() {
        assert!(parse_multi_document(&json!({ "text": "a" })).is_none());
    }
}

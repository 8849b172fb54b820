//! Canonical document records consumed by the view layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{DiseaseEntity, LabMatch};

/// One analyzed document in canonical form.
///
/// Serializes with camelCase keys (`sourceText`), which the normalizer also
/// accepts, so feeding a serialized document back through it is lossless.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedDocument {
    /// Server metadata rendered to display strings, sorted by key.
    pub metadata: BTreeMap<String, String>,
    pub source_text: String,
    pub diseases: Vec<DiseaseEntity>,
    pub labs: Vec<LabMatch>,
    pub summary: String,
}

impl NormalizedDocument {
    /// The upload file name recorded by the server, if any.
    pub fn original_filename(&self) -> Option<&str> {
        self.metadata
            .get("original_filename")
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Aggregate counters of a multi-document analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MultiDocumentMetadata {
    pub total_documents: usize,
    pub filenames: Vec<String>,
    pub total_diseases_found: usize,
    pub total_labs_found: usize,
}

/// The response of the multi-file endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MultiDocumentResponse {
    pub metadata: MultiDocumentMetadata,
    pub documents: Vec<NormalizedDocument>,
    pub consolidated_summary: String,
}

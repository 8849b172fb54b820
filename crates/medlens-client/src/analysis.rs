//! Analysis endpoints.
//!
//! | Call            | Endpoint                              | Body                       |
//! |-----------------|---------------------------------------|----------------------------|
//! | `analyze_text`  | `POST /predict`                       | JSON                       |
//! | `analyze_pdf`   | `POST /predict_pdf`                   | multipart, one `file`      |
//! | `analyze_pdfs`  | `POST /predict_multiple_pdfs_summary` | multipart, repeated `files`|
//!
//! `analyze_pdfs` with a single file goes to `/predict_pdf`.

use std::path::Path;

use serde_json::{json, Value};
use tracing::info;

use medlens_annotate::{is_multi_document, normalize, parse_multi_document};
use medlens_config::ClientConfig;
use medlens_contracts::{
    document::{MultiDocumentResponse, NormalizedDocument},
    error::{MedlensError, MedlensResult},
    http::FormPart,
};
use medlens_core::traits::Transport;

use crate::ApiClient;

pub const PREDICT_PATH: &str = "/predict";
pub const PREDICT_PDF_PATH: &str = "/predict_pdf";
pub const PREDICT_PDFS_PATH: &str = "/predict_multiple_pdfs_summary";

/// Request flags sent along with every analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub icd_map: bool,
    /// Persist the result server-side.
    pub store: bool,
    /// Patient the stored record belongs to.
    pub patient_id: Option<String>,
}

impl AnalysisOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            icd_map: config.icd_map,
            store: config.store_records,
            patient_id: None,
        }
    }

    pub fn with_patient(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = Some(patient_id.into());
        self
    }

    fn form_fields(&self) -> Vec<FormPart> {
        let mut parts = vec![
            FormPart::text("icd_map", self.icd_map),
            FormPart::text("store", self.store),
        ];
        if let Some(patient_id) = self.patient_id.as_deref().filter(|p| !p.is_empty()) {
            parts.push(FormPart::text("patient_id", patient_id));
        }
        parts
    }
}

/// A document to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl PdfUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> MedlensResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| MedlensError::Validation {
            field: "file".to_string(),
            reason: format!("cannot read '{}': {}", path.display(), e),
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Ok(Self::new(filename, bytes))
    }
}

/// What an analysis produced.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Single(NormalizedDocument),
    Multi(MultiDocumentResponse),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub outcome: AnalysisOutcome,
    /// The response exactly as the server sent it.
    pub raw: Value,
}

impl Analysis {
    /// Classify a response body.
    pub fn from_response(raw: Value) -> Self {
        let outcome = match is_multi_document(&raw)
            .then(|| parse_multi_document(&raw))
            .flatten()
        {
            Some(multi) => AnalysisOutcome::Multi(multi),
            None => AnalysisOutcome::Single(normalize(&raw)),
        };
        Self { outcome, raw }
    }
}

impl<T: Transport> ApiClient<T> {
    /// Analyze free text. Blank text is rejected without a request.
    pub async fn analyze_text(&self, text: &str, options: &AnalysisOptions) -> MedlensResult<Analysis> {
        if text.trim().is_empty() {
            return Err(MedlensError::Validation {
                field: "text".to_string(),
                reason: "enter text or upload PDF(s)".to_string(),
            });
        }
        let body = json!({
            "text": text,
            "icd_map": options.icd_map,
            "store": options.store,
            "patient_id": options.patient_id,
        });
        info!(chars = text.chars().count(), "analyzing text");
        let raw = self.post(PREDICT_PATH, &body).await?;
        Ok(Analysis::from_response(expect_body(raw, PREDICT_PATH)?))
    }

    pub async fn analyze_pdf(&self, file: PdfUpload, options: &AnalysisOptions) -> MedlensResult<Analysis> {
        info!(filename = %file.filename, bytes = file.bytes.len(), "analyzing PDF");
        let mut parts = vec![FormPart::file("file", file.filename, file.bytes)];
        parts.extend(options.form_fields());
        let raw = self.post_multipart(PREDICT_PDF_PATH, parts).await?;
        Ok(Analysis::from_response(expect_body(raw, PREDICT_PDF_PATH)?))
    }

    /// Analyze one or more PDFs. Several files are summarized together and
    /// may come back as a multi-document response.
    pub async fn analyze_pdfs(
        &self,
        mut files: Vec<PdfUpload>,
        options: &AnalysisOptions,
    ) -> MedlensResult<Analysis> {
        if files.is_empty() {
            return Err(MedlensError::Validation {
                field: "files".to_string(),
                reason: "no file selected".to_string(),
            });
        }
        if files.len() == 1 {
            let file = files.remove(0);
            return self.analyze_pdf(file, options).await;
        }

        info!(count = files.len(), "analyzing PDFs together");
        let mut parts: Vec<FormPart> = files
            .into_iter()
            .map(|f| FormPart::file("files", f.filename, f.bytes))
            .collect();
        parts.extend(options.form_fields());
        let raw = self.post_multipart(PREDICT_PDFS_PATH, parts).await?;
        Ok(Analysis::from_response(expect_body(raw, PREDICT_PDFS_PATH)?))
    }
}

fn expect_body(raw: Option<Value>, path: &str) -> MedlensResult<Value> {
    raw.ok_or_else(|| MedlensError::ResponseParse {
        reason: format!("{} returned an empty body", path),
    })
}

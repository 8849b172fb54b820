//! Sample analysis responses.
//!
//! All data in this module is hardcoded and fictional. The three payloads
//! cover the response shapes the server has produced over time.

use serde_json::{json, Value};

/// Names accepted by `sample`.
pub const SAMPLE_NAMES: [&str; 3] = ["nested", "flat", "multi"];

/// Look up a sample payload by name.
pub fn sample(name: &str) -> Option<Value> {
    match name {
        "nested" => Some(nested_response()),
        "flat" => Some(flat_response()),
        "multi" => Some(multi_document_response()),
        _ => None,
    }
}

// ── Single document, current shape ───────────────────────────────────────────

/// `/predict` as the current server answers it: entities nested under
/// `disease_ner` and `lab_rag`, summary under `summary_block`.
pub fn nested_response() -> Value {
    json!({
        "metadata": {
            "original_filename": "discharge_note.pdf",
            "pages": 2,
            "model": "bc5cdr-ner"
        },
        "extracted_text": "58-year-old with type 2 diabetes and hypertension. Glucose: 182 mg/dL (high). Creatinine 1.4 mg/dL.",
        "disease_ner": {
            "entities": [
                { "entity": "type 2 diabetes", "label": "DISEASE", "start": 17, "end": 32, "confidence": 0.97 },
                { "entity": "hypertension", "label": "DISEASE", "confidence": 0.93 }
            ]
        },
        "lab_rag": {
            "matches": [
                { "test_name": "Glucose", "value_extracted": "182 mg/dL", "reference_range": "70-99 mg/dL", "confidence": 0.91 },
                { "test_name": "Creatinine", "value_extracted": "1.4 mg/dL", "unit": "mg/dL", "reference_range": "0.7-1.3", "confidence": 0.84 },
                { "test_name": "HbA1c", "value_extracted": "9.2 %", "confidence": 0.55 }
            ]
        },
        "summary_block": {
            "clinical_summary": "Type 2 diabetes with hyperglycemia and mildly raised creatinine; hypertension noted."
        }
    })
}

// ── Single document, older flat shape ────────────────────────────────────────

/// The flat shape older server builds return: `diseases` and `lab_results`
/// at the top level, `text` instead of `extracted_text`.
pub fn flat_response() -> Value {
    json!({
        "text": "Fever and productive cough for 3 days. WBC 14.2 x10^9/L. Suspected pneumonia.",
        "diseases": [
            { "text": "Fever", "entity_type": "SYMPTOM", "start": 0, "end": 5, "confidence": 0.88 },
            { "text": "pneumonia", "entity_type": "DISEASE", "confidence": 0.95 }
        ],
        "lab_results": [
            { "test": "WBC", "value": "14.2 x10^9/L", "normal_range": "4.0-11.0", "conf": 0.79 }
        ],
        "summary": { "clinical_summary": "Likely community-acquired pneumonia with leukocytosis." }
    })
}

// ── Multi document ───────────────────────────────────────────────────────────

/// `/predict_multiple_pdfs_summary` for two uploads.
pub fn multi_document_response() -> Value {
    json!({
        "metadata": {
            "total_documents": 2,
            "filenames": ["labs_march.pdf", "cardiology_letter.pdf"],
            "total_diseases_found": 2,
            "total_labs_found": 2
        },
        "documents": [
            {
                "metadata": { "original_filename": "labs_march.pdf" },
                "text": "Hemoglobin 10.1 g/dL. Ferritin 12 ng/mL. Iron deficiency anemia.",
                "diseases": [{ "entity": "iron deficiency anemia", "confidence": 0.92 }],
                "lab_results": [
                    { "test_name": "Hemoglobin", "value_extracted": "10.1 g/dL", "confidence": 0.9 },
                    { "test_name": "Ferritin", "value_extracted": "12 ng/mL", "confidence": 0.86 }
                ],
                "summary": { "clinical_summary": "Microcytic picture consistent with iron deficiency." }
            },
            {
                "metadata": {},
                "text": "Follow-up for atrial fibrillation, rate controlled.",
                "diseases": [{ "entity": "atrial fibrillation", "confidence": 0.96 }],
                "lab_results": []
            }
        ],
        "consolidated_summary": "Iron deficiency anemia and rate-controlled atrial fibrillation."
    })
}

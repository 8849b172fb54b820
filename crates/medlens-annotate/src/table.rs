//! Entity tables: the tabular view of every extracted entity, including the
//! ones that could not be placed in the text.

use std::fmt::Write as _;

use html_escape::encode_text;

use medlens_contracts::entity::{DiseaseEntity, LabMatch};

/// Rendered for any cell without a value.
pub const MISSING: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiseaseRow {
    pub entity: String,
    pub label: String,
    pub confidence: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabRow {
    pub test: String,
    pub value: String,
    pub unit: String,
    pub reference: String,
    pub confidence: String,
}

/// Both entity tables, cells already formatted and unescaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityTables {
    pub diseases: Vec<DiseaseRow>,
    pub labs: Vec<LabRow>,
}

pub fn build_tables(diseases: &[DiseaseEntity], labs: &[LabMatch]) -> EntityTables {
    EntityTables {
        diseases: diseases.iter().map(disease_row).collect(),
        labs: labs.iter().map(lab_row).collect(),
    }
}

fn disease_row(disease: &DiseaseEntity) -> DiseaseRow {
    DiseaseRow {
        entity: disease.text.clone(),
        label: disease.display_label().to_string(),
        confidence: confidence_cell(disease.confidence),
    }
}

fn lab_row(lab: &LabMatch) -> LabRow {
    let value = lab.value();
    let unit = lab
        .unit
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .or_else(|| value.and_then(unit_from_value));
    LabRow {
        test: lab.test_name.clone(),
        value: value.unwrap_or(MISSING).to_string(),
        unit: unit.unwrap_or(MISSING).to_string(),
        reference: lab
            .reference_range
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(MISSING)
            .to_string(),
        confidence: confidence_cell(lab.confidence),
    }
}

/// `"140 mg/dL"` carries its unit as the last token. A bare number has none.
fn unit_from_value(value: &str) -> Option<&str> {
    value
        .trim()
        .rsplit_once(char::is_whitespace)
        .map(|(_, unit)| unit)
}

fn confidence_cell(confidence: Option<f64>) -> String {
    confidence.map_or_else(|| MISSING.to_string(), |c| format!("{c:.3}"))
}

impl EntityTables {
    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty() && self.labs.is_empty()
    }

    /// Render both tables, each preceded by its heading. An empty table is
    /// replaced by a short notice.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<h3>Diseases</h3>\n");
        if self.diseases.is_empty() {
            out.push_str("<p class=\"small\">No disease entities found.</p>\n");
        } else {
            out.push_str(
                "<table class=\"entity-table\"><thead><tr><th>Entity</th><th>Label</th>\
                 <th>Confidence</th></tr></thead><tbody>",
            );
            for row in &self.diseases {
                let _ = write!(
                    out,
                    "<tr><td>{}</td><td>{}</td><td style=\"text-align:right\">{}</td></tr>",
                    encode_text(&row.entity),
                    encode_text(&row.label),
                    encode_text(&row.confidence),
                );
            }
            out.push_str("</tbody></table>\n");
        }

        out.push_str("<h3>Lab Results</h3>\n");
        if self.labs.is_empty() {
            out.push_str("<p class=\"small\">No lab results found.</p>\n");
        } else {
            out.push_str(
                "<table class=\"entity-table\"><thead><tr><th>Test</th><th>Value</th>\
                 <th>Unit</th><th>Reference</th><th>Confidence</th></tr></thead><tbody>",
            );
            for row in &self.labs {
                let _ = write!(
                    out,
                    "<tr><td>{}</td><td style=\"text-align:center\">{}</td>\
                     <td style=\"text-align:center\">{}</td>\
                     <td style=\"text-align:center\">{}</td>\
                     <td style=\"text-align:right\">{}</td></tr>",
                    encode_text(&row.test),
                    encode_text(&row.value),
                    encode_text(&row.unit),
                    encode_text(&row.reference),
                    encode_text(&row.confidence),
                );
            }
            out.push_str("</tbody></table>\n");
        }
        out
    }
}

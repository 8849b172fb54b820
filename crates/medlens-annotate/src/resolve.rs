//! Span resolution: turning entities into character ranges.
//!
//! Extraction payloads carry explicit offsets only some of the time, lab
//! matches almost never. Missing offsets are recovered by case-insensitive
//! search in the source text. An entity that cannot be located resolves to
//! `SpanRange::UNRESOLVED` (labs) or `None` (diseases) and is left out of
//! highlighting; it still appears in the entity tables.

use tracing::debug;

use medlens_contracts::entity::{AnnotationSpan, Category, DiseaseEntity, LabMatch, SpanRange};

use crate::text::CharIndex;

/// Locate a lab match in `source`.
///
/// Priority, first match wins:
/// 1. explicit `start`/`end` with `start < end`, returned verbatim
/// 2. the trimmed test name, when both a name and a value are present
/// 3. the test name as given
/// 4. the extracted value
///
/// Otherwise the unresolved sentinel `{0, 0}`.
pub fn resolve_lab_span(source: &str, lab: &LabMatch) -> SpanRange {
    if let (Some(start), Some(end)) = (lab.start, lab.end) {
        if start < end {
            return SpanRange::new(start, end);
        }
    }
    locate_lab(&CharIndex::new(source), lab).unwrap_or(SpanRange::UNRESOLVED)
}

/// Locate a disease mention in `source`.
///
/// Explicit offsets with `end > start` are trusted unless the text they
/// cover differs from the entity text while that text occurs elsewhere in
/// the source; then the occurrence wins. Without offsets the entity text is
/// searched for.
pub fn resolve_disease_span(source: &str, disease: &DiseaseEntity) -> Option<SpanRange> {
    locate_disease(&CharIndex::new(source), disease)
}

/// Resolve every entity to an `AnnotationSpan`, dropping the ones that
/// cannot be placed. Spans reaching past the end of `source` are clamped
/// to it.
///
/// Diseases come first, then labs, each in input order.
pub fn annotate<'a>(
    source: &str,
    diseases: &[DiseaseEntity],
    labs: &'a [LabMatch],
) -> Vec<AnnotationSpan<'a>> {
    let index = CharIndex::new(source);
    let mut spans = Vec::with_capacity(diseases.len() + labs.len());

    for disease in diseases {
        let Some(range) = locate_disease(&index, disease).and_then(|r| index.clamp(r)) else {
            debug!(entity = %disease.text, "disease entity not found in source, not highlighted");
            continue;
        };
        spans.push(AnnotationSpan {
            start: range.start,
            end: range.end,
            label: disease.display_label().to_string(),
            category: Category::Disease,
            confidence: disease.confidence.unwrap_or(1.0),
            meta: None,
        });
    }

    for lab in labs {
        let explicit = match (lab.start, lab.end) {
            (Some(start), Some(end)) if start < end => Some(SpanRange::new(start, end)),
            _ => None,
        };
        let range = explicit
            .or_else(|| locate_lab(&index, lab))
            .and_then(|r| index.clamp(r));
        let Some(range) = range else {
            debug!(test = %lab.test_name, "lab match not found in source, not highlighted");
            continue;
        };
        spans.push(AnnotationSpan {
            start: range.start,
            end: range.end,
            label: lab.display_label().to_string(),
            category: Category::Lab,
            confidence: lab.confidence.unwrap_or(1.0),
            meta: Some(lab),
        });
    }

    spans
}

fn locate_disease(index: &CharIndex<'_>, disease: &DiseaseEntity) -> Option<SpanRange> {
    let explicit = match (disease.start, disease.end) {
        (Some(start), Some(end)) if end > start => SpanRange::new(start, end),
        _ => return index.find_ignore_case(&disease.text),
    };
    if disease.text.trim().is_empty() || index.matches_ignore_case(explicit, &disease.text) {
        return Some(explicit);
    }
    match index.find_ignore_case(disease.text.trim()) {
        Some(found) => {
            debug!(
                entity = %disease.text,
                given_start = explicit.start,
                found_start = found.start,
                "disease offsets do not cover entity text, using text match"
            );
            Some(found)
        }
        None => Some(explicit),
    }
}

fn locate_lab(index: &CharIndex<'_>, lab: &LabMatch) -> Option<SpanRange> {
    let name = lab.test_name.as_str();
    let value = lab.value().unwrap_or("");

    if !name.is_empty() && !value.is_empty() {
        if let Some(range) = index.find_ignore_case(name.trim()) {
            return Some(range);
        }
    }
    if let Some(range) = index.find_ignore_case(name) {
        return Some(range);
    }
    index.find_ignore_case(value)
}

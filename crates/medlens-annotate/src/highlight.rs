//! The highlight merger.
//!
//! Disease and lab spans come from two independent extractors and overlap
//! freely. The merger sorts them by `(start, end)` and folds every span that
//! starts at or before the end of the running group into that group. The
//! group keeps one label. An incoming span takes it over when it is a
//! disease and the group is not, or when its confidence is strictly higher.
//! With equal confidence the earlier span keeps the label.
//!
//! The result is plain data (`Highlighted`); `to_html` renders it with every
//! piece of text escaped.

use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::debug;

use medlens_contracts::entity::{AnnotationSpan, Category, DiseaseEntity, LabMatch};

use crate::{resolve::annotate, text::CharIndex};

/// Placeholder shown when there is no source text at all.
pub const NO_SOURCE_TEXT: &str = "No source text available.";

/// A maximal run of overlapping or touching spans, collapsed to one region.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeGroup {
    pub start: usize,
    pub end: usize,
    pub label: String,
    pub category: Category,
    pub confidence: f64,
    /// Extracted value of the lab match that owns the label, for the tooltip.
    pub value: Option<String>,
}

impl MergeGroup {
    fn from_span(span: &AnnotationSpan<'_>) -> Self {
        Self {
            start: span.start,
            end: span.end,
            label: span.label.clone(),
            category: span.category,
            confidence: span.confidence,
            value: span.meta.and_then(LabMatch::value).map(str::to_string),
        }
    }

    /// Whether `incoming` takes over the label of this group.
    fn yields_to(&self, incoming: &AnnotationSpan<'_>) -> bool {
        (incoming.category == Category::Disease && self.category != Category::Disease)
            || incoming.confidence > self.confidence
    }

    /// `"<label> [• <value>] • conf:<confidence>"`.
    pub fn tooltip(&self) -> String {
        let mut tip = self.label.clone();
        if let Some(value) = &self.value {
            let _ = write!(tip, " • {value}");
        }
        let _ = write!(tip, " • conf:{:.3}", self.confidence);
        tip
    }
}

/// Merge resolved spans into non-overlapping groups, ordered by position.
pub fn merge_spans(mut spans: Vec<AnnotationSpan<'_>>) -> Vec<MergeGroup> {
    spans.sort_by_key(|s| (s.start, s.end));

    let mut groups: Vec<MergeGroup> = Vec::new();
    for span in &spans {
        match groups.last_mut() {
            Some(current) if span.start <= current.end => {
                current.end = current.end.max(span.end);
                if current.yields_to(span) {
                    current.label = span.label.clone();
                    current.category = span.category;
                    current.confidence = span.confidence;
                    current.value = span.meta.and_then(LabMatch::value).map(str::to_string);
                }
            }
            _ => groups.push(MergeGroup::from_span(span)),
        }
    }
    groups
}

/// One piece of highlighted output.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Plain(String),
    Marked { text: String, group: MergeGroup },
}

/// Highlighted source text.
#[derive(Debug, Clone, PartialEq)]
pub enum Highlighted {
    /// The source text was empty or whitespace.
    NoSourceText,
    /// No entity could be placed; the text is shown as is.
    Unannotated(String),
    Annotated(Vec<Segment>),
}

impl Highlighted {
    /// The merge groups in output order. Empty unless annotated.
    pub fn groups(&self) -> impl Iterator<Item = &MergeGroup> {
        let segments: &[Segment] = match self {
            Self::Annotated(segments) => segments,
            _ => &[],
        };
        segments.iter().filter_map(|s| match s {
            Segment::Marked { group, .. } => Some(group),
            Segment::Plain(_) => None,
        })
    }

    /// Render as an HTML fragment.
    pub fn to_html(&self) -> String {
        match self {
            Self::NoSourceText => format!(r#"<pre class="plain-text">{NO_SOURCE_TEXT}</pre>"#),
            Self::Unannotated(text) => {
                format!(r#"<pre class="plain-text">{}</pre>"#, encode_text(text))
            }
            Self::Annotated(segments) => {
                let mut out = String::new();
                for segment in segments {
                    match segment {
                        Segment::Plain(text) => {
                            let _ = write!(
                                out,
                                r#"<span class="plain-text">{}</span>"#,
                                encode_text(text)
                            );
                        }
                        Segment::Marked { text, group } => {
                            let _ = write!(
                                out,
                                r#"<span class="{}" title="{}">{}</span>"#,
                                group.category.css_class(),
                                encode_double_quoted_attribute(&group.tooltip()),
                                encode_text(text)
                            );
                        }
                    }
                }
                out
            }
        }
    }
}

/// Highlight disease and lab entities in `source`.
pub fn highlight(source: &str, diseases: &[DiseaseEntity], labs: &[LabMatch]) -> Highlighted {
    if source.trim().is_empty() {
        return Highlighted::NoSourceText;
    }

    let spans = annotate(source, diseases, labs);
    if spans.is_empty() {
        debug!(
            diseases = diseases.len(),
            labs = labs.len(),
            "no entity could be placed, rendering unannotated text"
        );
        return Highlighted::Unannotated(source.to_string());
    }

    let resolved = spans.len();
    let groups = merge_spans(spans);
    debug!(
        resolved,
        dropped = diseases.len() + labs.len() - resolved,
        groups = groups.len(),
        "merged annotation spans"
    );

    let index = CharIndex::new(source);
    let mut segments = Vec::with_capacity(groups.len() * 2 + 1);
    let mut cursor = 0;
    for group in groups {
        if group.start > cursor {
            segments.push(Segment::Plain(index.slice(cursor, group.start).to_string()));
        }
        cursor = group.end;
        segments.push(Segment::Marked {
            text: index.slice(group.start, group.end).to_string(),
            group,
        });
    }
    if cursor < index.len() {
        segments.push(Segment::Plain(index.slice(cursor, index.len()).to_string()));
    }

    Highlighted::Annotated(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, category: Category, confidence: f64) -> AnnotationSpan<'static> {
        AnnotationSpan {
            start,
            end,
            label: format!("{}-{start}", category.as_str()),
            category,
            confidence,
            meta: None,
        }
    }

    // ── merge_spans ──────────────────────────────────────────────────────────

    #[test]
    fn disease_takes_precedence_over_overlapping_lab() {
        let groups = merge_spans(vec![
            span(5, 15, Category::Lab, 0.8),
            span(0, 10, Category::Disease, 0.8),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!((groups[0].start, groups[0].end), (0, 15));
        assert_eq!(groups[0].category, Category::Disease);
        assert_eq!(groups[0].label, "disease-0");
    }

    #[test]
    fn later_disease_takes_over_lab_group() {
        let groups = merge_spans(vec![
            span(0, 10, Category::Lab, 0.99),
            span(4, 8, Category::Disease, 0.2),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!((groups[0].start, groups[0].end), (0, 10));
        assert_eq!(groups[0].category, Category::Disease);
        assert_eq!(groups[0].confidence, 0.2);
    }

    #[test]
    fn more_confident_lab_takes_over_disease_group() {
        let groups = merge_spans(vec![
            span(0, 10, Category::Disease, 0.5),
            span(5, 15, Category::Lab, 0.9),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!((groups[0].start, groups[0].end), (0, 15));
        assert_eq!(groups[0].category, Category::Lab);
        assert_eq!(groups[0].label, "lab-5");
        assert_eq!(groups[0].confidence, 0.9);
    }

    #[test]
    fn less_confident_lab_leaves_disease_group() {
        let groups = merge_spans(vec![
            span(0, 10, Category::Disease, 0.9),
            span(5, 15, Category::Lab, 0.5),
        ]);
        assert_eq!(groups[0].category, Category::Disease);
        assert_eq!(groups[0].label, "disease-0");
    }

    #[test]
    fn higher_confidence_wins_between_labs() {
        let groups = merge_spans(vec![
            span(0, 6, Category::Lab, 0.4),
            span(3, 9, Category::Lab, 0.9),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].confidence, 0.9);
        assert_eq!(groups[0].label, "lab-3");
    }

    #[test]
    fn equal_confidence_keeps_first_label() {
        let groups = merge_spans(vec![
            span(0, 6, Category::Lab, 0.7),
            span(2, 9, Category::Lab, 0.7),
        ]);
        assert_eq!(groups[0].label, "lab-0");
        assert_eq!(groups[0].end, 9);
    }

    #[test]
    fn touching_spans_merge_and_gaps_split() {
        let groups = merge_spans(vec![
            span(0, 5, Category::Disease, 1.0),
            span(5, 8, Category::Disease, 1.0),
            span(10, 12, Category::Lab, 1.0),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!((groups[0].start, groups[0].end), (0, 8));
        assert_eq!((groups[1].start, groups[1].end), (10, 12));
    }

    #[test]
    fn contained_span_does_not_shrink_group() {
        let groups = merge_spans(vec![
            span(0, 20, Category::Disease, 1.0),
            span(2, 4, Category::Disease, 1.0),
        ]);
        assert_eq!(groups[0].end, 20);
    }

    // ── tooltip ──────────────────────────────────────────────────────────────

    #[test]
    fn tooltip_includes_lab_value_when_present() {
        let mut group = MergeGroup::from_span(&span(0, 1, Category::Lab, 0.87654));
        group.label = "Glucose".to_string();
        assert_eq!(group.tooltip(), "Glucose • conf:0.877");
        group.value = Some("140 mg/dL".to_string());
        assert_eq!(group.tooltip(), "Glucose • 140 mg/dL • conf:0.877");
    }

    // ── highlight ────────────────────────────────────────────────────────────

    #[test]
    fn wraps_exact_disease_text() {
        let source = "Patient has diabetes and fever.";
        let diseases = vec![DiseaseEntity::new("diabetes").with_span(16, 24).with_confidence(0.95)];
        let html = highlight(source, &diseases, &[]).to_html();
        assert!(
            html.contains(r#"<span class="highlight-disease" title="DISEASE • conf:0.950">diabetes</span>"#),
            "unexpected output: {html}"
        );
        assert!(html.starts_with(r#"<span class="plain-text">Patient has </span>"#));
        assert!(html.ends_with(r#"<span class="plain-text"> and fever.</span>"#));
    }

    #[test]
    fn explicit_disease_spans_are_reproduced_verbatim() {
        let source = "Long history of chronic kidney disease stage 3.";
        let diseases = vec![DiseaseEntity::new("CKD").with_span(16, 38)];
        let result = highlight(source, &diseases, &[]);
        let Highlighted::Annotated(segments) = &result else {
            panic!("expected annotated output, got {result:?}");
        };
        let marked: Vec<&str> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Marked { text, .. } => Some(text.as_str()),
                Segment::Plain(_) => None,
            })
            .collect();
        assert_eq!(marked, vec!["chronic kidney disease"]);
    }

    #[test]
    fn no_entities_returns_escaped_text_unstyled() {
        let source = "BP <140/90> & stable";
        let result = highlight(source, &[], &[]);
        assert_eq!(result, Highlighted::Unannotated(source.to_string()));
        assert_eq!(
            result.to_html(),
            r#"<pre class="plain-text">BP &lt;140/90&gt; &amp; stable</pre>"#
        );
    }

    #[test]
    fn unresolvable_entities_render_unannotated() {
        let source = "Nothing relevant";
        let labs = vec![LabMatch::new("Ferritin")];
        let result = highlight(source, &[DiseaseEntity::new("asthma")], &labs);
        assert!(matches!(result, Highlighted::Unannotated(_)));
    }

    #[test]
    fn blank_source_renders_placeholder() {
        assert_eq!(highlight("   \n", &[], &[]), Highlighted::NoSourceText);
        assert_eq!(
            highlight("", &[DiseaseEntity::new("x")], &[]).to_html(),
            r#"<pre class="plain-text">No source text available.</pre>"#
        );
    }

    #[test]
    fn lab_tooltip_and_style() {
        let source = "Glucose: 140 mg/dL (high)";
        let labs = vec![LabMatch::new("Glucose").with_value("140 mg/dL").with_confidence(0.9)];
        let html = highlight(source, &[], &labs).to_html();
        assert!(html.starts_with(
            r#"<span class="highlight-lab" title="Glucose • 140 mg/dL • conf:0.900">Glucose</span>"#
        ));
    }

    #[test]
    fn overlapping_sources_produce_one_disease_region() {
        let source = "0123456789abcdefghij";
        let diseases = vec![DiseaseEntity::new("dz").with_span(0, 10)];
        let labs = vec![LabMatch::new("lab").with_value("v").with_span(5, 15)];
        let result = highlight(source, &diseases, &labs);
        let groups: Vec<&MergeGroup> = result.groups().collect();
        assert_eq!(groups.len(), 1);
        assert_eq!((groups[0].start, groups[0].end), (0, 15));
        assert_eq!(groups[0].category, Category::Disease);
        assert_eq!(groups[0].value, None);
    }

    #[test]
    fn markup_in_entities_and_text_is_escaped() {
        let source = "<b>sepsis</b> suspected";
        let diseases = vec![DiseaseEntity::new("sepsis").with_label("\"><script>")];
        let html = highlight(source, &diseases, &[]).to_html();
        assert!(!html.contains("<b>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
    }

    #[test]
    fn out_of_range_spans_are_clamped() {
        let source = "fever";
        let labs = vec![LabMatch::new("x").with_span(2, 40)];
        let result = highlight(source, &[], &labs);
        let groups: Vec<&MergeGroup> = result.groups().collect();
        assert_eq!((groups[0].start, groups[0].end), (2, 5));
        assert!(result.to_html().ends_with(">ver</span>"));
    }
}

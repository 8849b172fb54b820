//! Extracted clinical entities and the spans the highlighter works on.
//!
//! `DiseaseEntity` and `LabMatch` are the canonical forms produced by the
//! normalizer. Their serialized field names are the first entries of the
//! normalizer's key priority lists, so a serialized entity reads back
//! unchanged.

use serde::{Deserialize, Serialize};

/// Which extraction source a span came from.
///
/// Determines the render style and the conflict priority on overlap:
/// a disease span takes over an overlapping lab region, and otherwise the more
/// confident span does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Disease,
    Lab,
}

impl Category {
    /// CSS class used for highlighted regions of this category.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Disease => "highlight-disease",
            Self::Lab => "highlight-lab",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disease => "disease",
            Self::Lab => "lab",
        }
    }
}

/// A disease mention from the NER source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiseaseEntity {
    /// Surface text of the mention; also the fallback search key.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl DiseaseEntity {
    pub const DEFAULT_LABEL: &'static str = "DISEASE";

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Attach explicit character offsets.
    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label to display, `DISEASE` when the source gave none.
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(Self::DEFAULT_LABEL)
    }
}

/// A lab result match from the retrieval source.
///
/// Offsets are usually absent; the resolver recovers them by searching for
/// the test name, then the value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LabMatch {
    pub test_name: String,
    #[serde(rename = "value_extracted", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

impl LabMatch {
    pub const DEFAULT_LABEL: &'static str = "LAB";

    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// The label to display, `LAB` when the test name is empty.
    pub fn display_label(&self) -> &str {
        if self.test_name.is_empty() {
            Self::DEFAULT_LABEL
        } else {
            &self.test_name
        }
    }

    /// The extracted value, if non-empty.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }
}

/// A half-open `[start, end)` character range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanRange {
    pub start: usize,
    pub end: usize,
}

impl SpanRange {
    /// The sentinel returned when no offsets could be recovered.
    pub const UNRESOLVED: SpanRange = SpanRange { start: 0, end: 0 };

    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True for any non-empty range. The unresolved sentinel is empty.
    pub fn is_resolved(&self) -> bool {
        self.start < self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A resolved annotation ready for merging.
///
/// `meta` points back at the lab match that produced the span so the tooltip
/// can show the extracted value. Disease spans carry no `meta`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationSpan<'a> {
    pub start: usize,
    pub end: usize,
    pub label: String,
    pub category: Category,
    pub confidence: f64,
    pub meta: Option<&'a LabMatch>,
}

impl AnnotationSpan<'_> {
    pub fn range(&self) -> SpanRange {
        SpanRange::new(self.start, self.end)
    }
}

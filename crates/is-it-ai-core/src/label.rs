use core::fmt;

use serde::{Deserialize, Serialize};

/// Label vocabulary of the detector model.
///
/// `Real` is human-authored text and `Fake` is AI-generated text. This is the
/// model's published contract and is never derived from the output itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationLabel {
    Real,
    Fake,
}

impl ClassificationLabel {
    /// Both labels the verdict needs, in lookup order.
    pub const ALL: [Self; 2] = [Self::Fake, Self::Real];

    /// The exact label string the classifier emits.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Real => "Real",
            Self::Fake => "Fake",
        }
    }

    /// Maps a classifier label string onto the vocabulary. Matching is exact.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Real" => Some(Self::Real),
            "Fake" => Some(Self::Fake),
            _ => None,
        }
    }

    /// Returns true if this label marks AI-generated text
    #[must_use]
    pub const fn is_ai(self) -> bool {
        matches!(self, Self::Fake)
    }
}

impl fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(label, score)` pair as returned by the classifier.
///
/// The label keeps the classifier's own string so the raw payload can be shown
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLabel {
    pub label: String,
    pub score: f64,
}

impl ScoredLabel {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }

    #[must_use]
    pub fn classification_label(&self) -> Option<ClassificationLabel> {
        ClassificationLabel::from_label(&self.label)
    }
}

impl From<(ClassificationLabel, f64)> for ScoredLabel {
    fn from((label, score): (ClassificationLabel, f64)) -> Self {
        Self::new(label.as_str(), score)
    }
}

//! Verdict pipeline error types.

use crate::classifier::ClassifierError;

/// Errors returned by [`VerdictEngine::classify_and_score`](crate::VerdictEngine::classify_and_score).
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    /// Blank or whitespace-only text; the classifier was not invoked.
    #[error("No input text to analyze")]
    EmptyInput,

    /// The classifier could not be initialized or invoked. Fatal until re-initialized.
    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(#[from] ClassifierError),
}

impl DetectorError {
    #[must_use]
    pub const fn is_classifier_unavailable(&self) -> bool {
        matches!(self, Self::ClassifierUnavailable(_))
    }
}

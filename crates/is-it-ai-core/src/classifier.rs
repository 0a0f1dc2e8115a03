//! The classifier capability the verdict pipeline depends on.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::label::ScoredLabel;

/// Errors raised by a classifier capability.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// Model could not be loaded (missing files, runtime setup, bad tokenizer).
    #[error("Classifier initialization failed: {0}")]
    InitFailed(String),

    /// A single classification call failed.
    #[error("Classifier invocation failed: {0}")]
    InferenceFailed(String),

    /// The classifier failed earlier in this process and has not been re-initialized.
    #[error("Classifier disabled after an earlier failure; restart to re-initialize it")]
    Disabled,
}

/// Per-call knobs passed to [`TextClassifier::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationOptions {
    /// Score every label the model knows instead of only the best one.
    pub return_all_labels: bool,
    /// Truncate over-long input instead of failing.
    pub truncate: bool,
    /// Token ceiling applied when `truncate` is set.
    pub max_length: usize,
}

/// Raw output of one classification call.
///
/// Depending on the backend the per-label list arrives either as is or wrapped
/// in a one-element outer list. Both shapes serialize back exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassifierOutput {
    Flat(Vec<ScoredLabel>),
    Nested(Vec<Vec<ScoredLabel>>),
}

impl ClassifierOutput {
    /// The per-label list, with a singleton outer sequence unwrapped.
    #[must_use]
    pub fn label_scores(&self) -> &[ScoredLabel] {
        match self {
            Self::Flat(scores) => scores,
            Self::Nested(outer) => match outer.as_slice() {
                [] => &[],
                [inner] => inner,
                [first, ..] => {
                    warn!(
                        num_sequences = outer.len(),
                        "Classifier returned several label lists for one text, using the first"
                    );
                    first
                }
            },
        }
    }
}

impl From<Vec<ScoredLabel>> for ClassifierOutput {
    fn from(scores: Vec<ScoredLabel>) -> Self {
        Self::Flat(scores)
    }
}

/// A loaded text classifier.
///
/// Implementations are built once per process and then only read from.
pub trait TextClassifier {
    /// Native maximum input length of the model, in tokens.
    fn max_sequence_length(&self) -> usize;

    /// Classify `text` and return label/score pairs.
    ///
    /// # Errors
    ///
    /// Returns a [`ClassifierError`] when the model is unavailable or the call fails.
    fn classify(
        &self,
        text: &str,
        options: &InvocationOptions,
    ) -> Result<ClassifierOutput, ClassifierError>;
}

impl<C: TextClassifier + ?Sized> TextClassifier for &C {
    fn max_sequence_length(&self) -> usize {
        (**self).max_sequence_length()
    }

    fn classify(
        &self,
        text: &str,
        options: &InvocationOptions,
    ) -> Result<ClassifierOutput, ClassifierError> {
        (**self).classify(text, options)
    }
}

impl<C: TextClassifier + ?Sized> TextClassifier for Box<C> {
    fn max_sequence_length(&self) -> usize {
        (**self).max_sequence_length()
    }

    fn classify(
        &self,
        text: &str,
        options: &InvocationOptions,
    ) -> Result<ClassifierOutput, ClassifierError> {
        (**self).classify(text, options)
    }
}

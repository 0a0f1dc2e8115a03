//! # is-it-ai-core
//!
//! Decision pipeline for telling AI-generated English text from human-written
//! text with a pretrained binary classifier.
//!
//! Raw text goes through an [`InputNormalizer`], is classified by any
//! [`TextClassifier`], and the [`VerdictEngine`] turns the classifier's
//! `Real`/`Fake` scores into a [`VerdictResult`]: P(AI), P(Human), a
//! [`VerdictTier`] and the raw output for inspection.
//!
//! ```rust
//! use is_it_ai_core::{
//!     ClassifierError, ClassifierOutput, InvocationOptions, ScoredLabel, TextClassifier,
//!     VerdictEngine, VerdictTier,
//! };
//!
//! struct Fixed;
//!
//! impl TextClassifier for Fixed {
//!     fn max_sequence_length(&self) -> usize {
//!         512
//!     }
//!
//!     fn classify(
//!         &self,
//!         _text: &str,
//!         _options: &InvocationOptions,
//!     ) -> Result<ClassifierOutput, ClassifierError> {
//!         Ok(vec![ScoredLabel::new("Fake", 0.93), ScoredLabel::new("Real", 0.07)].into())
//!     }
//! }
//!
//! let verdict = VerdictEngine::new().classify_and_score("Some text to analyze", &Fixed)?;
//! assert_eq!(verdict.tier, VerdictTier::StrongAI);
//! # Ok::<(), is_it_ai_core::DetectorError>(())
//! ```

mod classifier;
mod error;
mod label;
mod normalizer;
mod verdict;

pub use classifier::{ClassifierError, ClassifierOutput, InvocationOptions, TextClassifier};
pub use error::DetectorError;
pub use label::{ClassificationLabel, ScoredLabel};
pub use normalizer::{BoundedText, InputNormalizer, TruncationDirective};
pub use verdict::{
    MIXED_THRESHOLD, ProbabilityPair, STRONG_AI_THRESHOLD, VerdictEngine, VerdictResult,
    VerdictTier,
};

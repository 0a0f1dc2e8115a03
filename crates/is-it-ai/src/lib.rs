//! # is-it-ai
//!
//! Tells AI-generated English text from human-written text with an ONNX export
//! of `roberta-base-openai-detector`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use is_it_ai::{Detector, DetectorConfig};
//!
//! let config = DetectorConfig::load()?;
//! let detector = Detector::load(&config.model)?;
//!
//! let verdict = detector.analyze("Some text to analyze")?;
//! println!(
//!     "AI probability: {:.2}%  ({})",
//!     verdict.ai_probability * 100.0,
//!     verdict.tier.message()
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Model files
//!
//! The model directory (`model.dir`) must contain `model.onnx`, the Hugging
//! Face `tokenizer.json` and, optionally, the model's `config.json` for its
//! label order. See [`DetectorConfig`] for how the directory is configured.

#[cfg(feature = "cli")]
pub mod cli;

mod config;
mod model;
mod pipeline;

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::error;

pub use config::{ConfigError, DetectorConfig, ModelConfig};
pub use is_it_ai_core::{
    ClassificationLabel, ClassifierError, ClassifierOutput, DetectorError, InputNormalizer,
    InvocationOptions, MIXED_THRESHOLD, ProbabilityPair, STRONG_AI_THRESHOLD, ScoredLabel,
    TextClassifier, VerdictEngine, VerdictResult, VerdictTier,
};
pub use model::{LabelMap, OnnxClassifier};

/// A loaded classifier together with the verdict engine.
///
/// The classifier is built once and reused for every call. If it ever fails,
/// the detector stops using it: every later call returns
/// [`DetectorError::ClassifierUnavailable`] until a new detector is loaded.
///
/// # Examples
///
/// ```rust,no_run
/// use is_it_ai::{Detector, ModelConfig, VerdictTier};
///
/// let detector = Detector::load(&ModelConfig::default())?;
/// let verdict = detector.analyze("some text")?;
/// if verdict.tier == VerdictTier::StrongAI {
///     println!("{}", verdict.tier.message());
/// }
/// # Ok::<(), is_it_ai::DetectorError>(())
/// ```
#[derive(Debug)]
pub struct Detector<C = OnnxClassifier> {
    classifier: C,
    engine: VerdictEngine,
    disabled: AtomicBool,
}

impl Detector<OnnxClassifier> {
    /// Load the ONNX classifier described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::ClassifierUnavailable`] if the model cannot be loaded.
    pub fn load(config: &ModelConfig) -> Result<Self, DetectorError> {
        OnnxClassifier::load(config)
            .map(Self::with_classifier)
            .map_err(|e| {
                error!(error = %e, "Classifier failed to load");
                DetectorError::ClassifierUnavailable(e)
            })
    }
}

impl<C: TextClassifier> Detector<C> {
    /// Wrap an already initialized classifier.
    pub const fn with_classifier(classifier: C) -> Self {
        Self {
            classifier,
            engine: VerdictEngine::new(),
            disabled: AtomicBool::new(false),
        }
    }

    /// Classify one text and derive its verdict.
    ///
    /// # Errors
    ///
    /// - [`DetectorError::EmptyInput`] for blank text.
    /// - [`DetectorError::ClassifierUnavailable`] if the classifier fails now
    ///   or has failed before.
    pub fn analyze<T: AsRef<str>>(&self, text: T) -> Result<VerdictResult, DetectorError> {
        let text = text.as_ref();
        if InputNormalizer::is_blank(text) {
            return Err(DetectorError::EmptyInput);
        }
        if !self.is_available() {
            return Err(DetectorError::ClassifierUnavailable(ClassifierError::Disabled));
        }

        self.engine
            .classify_and_score(text, &self.classifier)
            .inspect_err(|e| {
                if e.is_classifier_unavailable() {
                    error!(error = %e, "Classifier failed, disabling further classification");
                    self.disabled.store(true, Ordering::Release);
                }
            })
    }

    /// False once the classifier has failed.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !self.disabled.load(Ordering::Acquire)
    }

    #[must_use]
    pub const fn classifier(&self) -> &C {
        &self.classifier
    }
}

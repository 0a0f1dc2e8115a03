use core::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    classifier::{ClassifierOutput, TextClassifier},
    error::DetectorError,
    label::{ClassificationLabel, ScoredLabel},
    normalizer::InputNormalizer,
};

/// P(AI) above this is a strong AI verdict.
pub const STRONG_AI_THRESHOLD: f64 = 0.8;

/// P(AI) above this (and up to [`STRONG_AI_THRESHOLD`]) is a mixed verdict.
pub const MIXED_THRESHOLD: f64 = 0.5;

/// Tiered outcome derived from P(AI) alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VerdictTier {
    #[serde(rename = "strong_ai")]
    StrongAI,
    #[serde(rename = "mixed_or_uncertain")]
    MixedOrUncertain,
    #[serde(rename = "likely_human")]
    LikelyHuman,
}

impl VerdictTier {
    /// `> 0.8` strong AI, `(0.5, 0.8]` mixed, `<= 0.5` likely human.
    #[inline]
    #[must_use]
    pub fn from_ai_probability(ai_probability: f64) -> Self {
        if ai_probability > STRONG_AI_THRESHOLD {
            Self::StrongAI
        } else if ai_probability > MIXED_THRESHOLD {
            Self::MixedOrUncertain
        } else {
            Self::LikelyHuman
        }
    }

    /// Stable identifier, same as the serialized form.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::StrongAI => "strong_ai",
            Self::MixedOrUncertain => "mixed_or_uncertain",
            Self::LikelyHuman => "likely_human",
        }
    }

    /// Qualitative message for display.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::StrongAI => "This text is very likely AI-generated (e.g. by ChatGPT).",
            Self::MixedOrUncertain => {
                "This text shows traits of AI generation; it may be of mixed authorship."
            }
            Self::LikelyHuman => "This text looks human-written.",
        }
    }
}

impl fmt::Display for VerdictTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// P(AI) and P(Human) exactly as scored by the classifier.
///
/// An absent label scores `0.0`. The pair is not renormalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbabilityPair {
    pub ai_probability: f64,
    pub human_probability: f64,
}

impl ProbabilityPair {
    /// Look up `Fake` and `Real` in `scores`. Later duplicates win.
    #[must_use]
    pub fn from_scores(scores: &[ScoredLabel]) -> Self {
        let (ai, human) = lookup(scores);
        Self {
            ai_probability: ai.unwrap_or(0.0),
            human_probability: human.unwrap_or(0.0),
        }
    }

    #[must_use]
    pub fn tier(&self) -> VerdictTier {
        VerdictTier::from_ai_probability(self.ai_probability)
    }
}

/// Usable `(Fake, Real)` scores. A label that is absent or unusable stays `None`.
fn lookup(scores: &[ScoredLabel]) -> (Option<f64>, Option<f64>) {
    let mut ai = None;
    let mut human = None;
    for scored in scores {
        let slot = match scored.classification_label() {
            Some(ClassificationLabel::Fake) => &mut ai,
            Some(ClassificationLabel::Real) => &mut human,
            None => {
                debug!(label = %scored.label, "Ignoring label outside the Real/Fake vocabulary");
                continue;
            }
        };
        *slot = bounded_score(scored);
    }
    (ai, human)
}

/// Scores outside `[0, 1]` break the classifier contract: NaN counts as
/// absent, anything else is clamped.
fn bounded_score(scored: &ScoredLabel) -> Option<f64> {
    if scored.score.is_nan() {
        warn!(label = %scored.label, "Classifier returned a NaN score, treating label as absent");
        return None;
    }
    if !(0.0..=1.0).contains(&scored.score) {
        warn!(label = %scored.label, score = scored.score, "Classifier score outside [0, 1], clamping");
    }
    Some(scored.score.clamp(0.0, 1.0))
}

/// Decision-ready summary of one classification call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictResult {
    pub ai_probability: f64,
    pub human_probability: f64,
    pub tier: VerdictTier,
    /// Expected labels without a usable score; they scored `0.0`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_labels: Vec<ClassificationLabel>,
    /// Classifier output exactly as received.
    pub raw_payload: ClassifierOutput,
}

impl VerdictResult {
    /// Build a verdict from raw classifier output.
    #[must_use]
    pub fn from_output(raw_payload: ClassifierOutput) -> Self {
        let scores = raw_payload.label_scores();
        let (ai, human) = lookup(scores);
        let probabilities = ProbabilityPair {
            ai_probability: ai.unwrap_or(0.0),
            human_probability: human.unwrap_or(0.0),
        };
        let missing_labels: Vec<_> = [
            (ClassificationLabel::Fake, ai),
            (ClassificationLabel::Real, human),
        ]
        .into_iter()
        .filter_map(|(label, score)| score.is_none().then_some(label))
        .collect();
        if !missing_labels.is_empty() {
            warn!(
                missing = ?missing_labels,
                returned = scores.len(),
                "Classifier output has no usable score for expected labels, scoring them as 0.0"
            );
        }

        Self {
            ai_probability: probabilities.ai_probability,
            human_probability: probabilities.human_probability,
            tier: probabilities.tier(),
            missing_labels,
            raw_payload,
        }
    }

    #[must_use]
    pub const fn probabilities(&self) -> ProbabilityPair {
        ProbabilityPair {
            ai_probability: self.ai_probability,
            human_probability: self.human_probability,
        }
    }
}

/// Runs one classification and turns it into a [`VerdictResult`].
///
/// Holds no per-text state; every call reclassifies from scratch.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerdictEngine {
    normalizer: InputNormalizer,
}

impl VerdictEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            normalizer: InputNormalizer::new(),
        }
    }

    /// Classify `text` with `classifier` and score the result.
    ///
    /// # Errors
    ///
    /// - [`DetectorError::EmptyInput`] if `text` is blank; the classifier is not called.
    /// - [`DetectorError::ClassifierUnavailable`] if the classifier call fails.
    pub fn classify_and_score<C>(
        &self,
        text: &str,
        classifier: &C,
    ) -> Result<VerdictResult, DetectorError>
    where
        C: TextClassifier + ?Sized,
    {
        if InputNormalizer::is_blank(text) {
            return Err(DetectorError::EmptyInput);
        }

        let bounded = self.normalizer.normalize(text);
        let options = bounded.invocation_options(classifier.max_sequence_length());
        debug!(
            text_len = bounded.as_str().len(),
            max_length = options.max_length,
            truncate = options.truncate,
            "Invoking classifier"
        );

        let raw_payload = classifier.classify(bounded.as_str(), &options)?;
        let result = VerdictResult::from_output(raw_payload);
        debug!(
            ai_probability = result.ai_probability,
            human_probability = result.human_probability,
            tier = %result.tier,
            "Classification scored"
        );
        Ok(result)
    }
}

use std::{collections::BTreeMap, fs, path::Path};

use is_it_ai_core::{ClassificationLabel, ClassifierError};
use serde::Deserialize;
use tracing::{debug, warn};

/// Subset of a Hugging Face `config.json` needed to name the logits.
#[derive(Debug, Deserialize)]
struct ModelLabelConfig {
    id2label: BTreeMap<String, String>,
}

/// Label string for each logit index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap(Vec<String>);

impl LabelMap {
    /// Index order published with `roberta-base-openai-detector`.
    #[must_use]
    pub fn detector_default() -> Self {
        Self(vec![
            ClassificationLabel::Fake.as_str().to_owned(),
            ClassificationLabel::Real.as_str().to_owned(),
        ])
    }

    /// Read `id2label` from a model config, falling back to
    /// [`Self::detector_default`] when the file does not exist.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but is unreadable, is not valid JSON, or its
    /// indices are not exactly `0..n`.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        if !path.exists() {
            warn!(
                path = %path.display(),
                "Model config not found, using the detector's default label order"
            );
            return Ok(Self::detector_default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            ClassifierError::InitFailed(format!("reading {}: {e}", path.display()))
        })?;
        let labels = Self::from_json(&contents)?;
        debug!(path = %path.display(), labels = ?labels.0, "Loaded label map");
        Ok(labels)
    }

    /// Parse the `id2label` table of a model config.
    ///
    /// # Errors
    ///
    /// Fails on invalid JSON, a missing table, or non-contiguous indices.
    pub fn from_json(contents: &str) -> Result<Self, ClassifierError> {
        let config: ModelLabelConfig = serde_json::from_str(contents)
            .map_err(|e| ClassifierError::InitFailed(format!("parsing id2label: {e}")))?;

        let mut indexed = config
            .id2label
            .into_iter()
            .map(|(id, label)| {
                id.parse::<usize>()
                    .map(|idx| (idx, label))
                    .map_err(|_| ClassifierError::InitFailed(format!("non-numeric label id {id:?}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        indexed.sort_unstable_by_key(|(idx, _)| *idx);

        if indexed.is_empty() || indexed.iter().enumerate().any(|(pos, (idx, _))| pos != *idx) {
            return Err(ClassifierError::InitFailed(
                "id2label indices must be contiguous from 0".to_owned(),
            ));
        }
        Ok(Self(indexed.into_iter().map(|(_, label)| label).collect()))
    }

    /// Check that both `Real` and `Fake` name a logit.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::InitFailed`] listing the labels the map lacks.
    pub fn require_detector_vocabulary(&self) -> Result<(), ClassifierError> {
        let missing: Vec<&str> = ClassificationLabel::ALL
            .into_iter()
            .map(ClassificationLabel::as_str)
            .filter(|expected| !self.0.iter().any(|label| label == expected))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ClassifierError::InitFailed(format!(
                "model labels {:?} lack {missing:?}",
                self.0
            )))
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.0.get(idx).map(String::as_str)
    }
}

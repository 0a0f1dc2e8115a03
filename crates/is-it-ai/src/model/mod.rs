use std::{fmt, path::Path, sync::Mutex};

use is_it_ai_core::{ClassifierError, ClassifierOutput, InvocationOptions, TextClassifier};
use ort::session::{Session, builder::GraphOptimizationLevel};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::{config::ModelConfig, pipeline};

mod labels;
pub use labels::LabelMap;

/// ONNX input names of a sequence-classification export.
pub(crate) const INPUT_IDS: &str = "input_ids";
pub(crate) const ATTENTION_MASK: &str = "attention_mask";

/// Session and tokenizer, locked together for one inference at a time.
pub(crate) struct Inference {
    pub(crate) session: Session,
    pub(crate) tokenizer: Tokenizer,
}

/// `roberta-base-openai-detector` (or any `Real`/`Fake` sequence classifier)
/// running on ONNX runtime.
///
/// Build it once with [`OnnxClassifier::load`] and reuse it for the life of the
/// process. Calls are serialized on an internal lock because running the
/// session needs exclusive access.
pub struct OnnxClassifier {
    inference: Mutex<Inference>,
    labels: LabelMap,
    max_sequence_length: usize,
}

fn init_failed(err: impl fmt::Display) -> ClassifierError {
    ClassifierError::InitFailed(err.to_string())
}

fn require_file(path: &Path) -> Result<(), ClassifierError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ClassifierError::InitFailed(format!(
            "model file not found: {}",
            path.display()
        )))
    }
}

impl OnnxClassifier {
    /// Load the model, tokenizer and label map described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::InitFailed`] if a file is missing or the ONNX
    /// runtime, tokenizer or label map cannot be initialized.
    pub fn load(config: &ModelConfig) -> Result<Self, ClassifierError> {
        let onnx_path = config.onnx_path();
        let tokenizer_path = config.tokenizer_path();
        require_file(&onnx_path)?;
        require_file(&tokenizer_path)?;

        info!(model = %onnx_path.display(), "Loading classifier");
        let session = Session::builder()
            .map_err(init_failed)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(init_failed)?
            .with_intra_threads(config.intra_threads)
            .map_err(init_failed)?
            .commit_from_file(&onnx_path)
            .map_err(init_failed)?;

        let input_names: Vec<&str> = session.inputs.iter().map(|i| i.name.as_str()).collect();
        debug!(inputs = ?input_names, "Session inputs");
        for required in [INPUT_IDS, ATTENTION_MASK] {
            if !input_names.contains(&required) {
                return Err(ClassifierError::InitFailed(format!(
                    "model has no `{required}` input (found {input_names:?})"
                )));
            }
        }

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(init_failed)?;
        // A single sequence is never padded
        tokenizer.with_padding(None);

        let labels = LabelMap::load(&config.label_config_path())?;
        labels.require_detector_vocabulary()?;
        info!(
            num_labels = labels.len(),
            max_sequence_length = config.max_sequence_length,
            "Classifier ready"
        );

        Ok(Self {
            inference: Mutex::new(Inference { session, tokenizer }),
            labels,
            max_sequence_length: config.max_sequence_length,
        })
    }

    #[must_use]
    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }
}

impl fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("labels", &self.labels)
            .field("max_sequence_length", &self.max_sequence_length)
            .finish_non_exhaustive()
    }
}

impl TextClassifier for OnnxClassifier {
    fn max_sequence_length(&self) -> usize {
        self.max_sequence_length
    }

    fn classify(
        &self,
        text: &str,
        options: &InvocationOptions,
    ) -> Result<ClassifierOutput, ClassifierError> {
        let logits = pipeline::predict_logits(
            &self.inference,
            text,
            options,
            self.max_sequence_length,
        )?;
        let scores = pipeline::scored_labels(&logits, &self.labels, options.return_all_labels)?;
        Ok(ClassifierOutput::Flat(scores))
    }
}

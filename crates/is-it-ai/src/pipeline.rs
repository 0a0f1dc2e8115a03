use std::{fmt, sync::Mutex};

use is_it_ai_core::{ClassifierError, InvocationOptions, ScoredLabel};
use ort::{session::Session, value::Tensor};
use tokenizers::{Encoding, Tokenizer, TruncationParams};
use tracing::debug;

use crate::model::{ATTENTION_MASK, INPUT_IDS, Inference, LabelMap};

fn inference_failed(err: impl fmt::Display) -> ClassifierError {
    ClassifierError::InferenceFailed(err.to_string())
}

/// Tokenize `text`, truncating to `options.max_length` (never beyond the
/// model's native limit) when truncation is requested.
fn encode(
    tokenizer: &mut Tokenizer,
    text: &str,
    options: &InvocationOptions,
    native_max_length: usize,
) -> Result<Encoding, ClassifierError> {
    let truncation = options.truncate.then(|| TruncationParams {
        max_length: options.max_length.min(native_max_length),
        ..TruncationParams::default()
    });
    tokenizer
        .with_truncation(truncation)
        .map_err(inference_failed)?;

    let encoding = tokenizer.encode(text, true).map_err(inference_failed)?;
    if encoding.len() > native_max_length {
        return Err(ClassifierError::InferenceFailed(format!(
            "input is {} tokens, the model accepts at most {native_max_length}",
            encoding.len()
        )));
    }
    if !encoding.get_overflowing().is_empty() {
        debug!(
            kept_tokens = encoding.len(),
            "Input truncated to the model's maximum sequence length"
        );
    }
    Ok(encoding)
}

fn to_input_tensor(values: &[u32]) -> ort::Result<Tensor<i64>> {
    let data: Vec<i64> = values.iter().map(|&v| i64::from(v)).collect();
    Tensor::from_array((vec![1, values.len()], data.into_boxed_slice()))
}

/// Logits of the single row in the model's output.
fn run_model_inference(
    session: &mut Session,
    encoding: &Encoding,
) -> Result<Vec<f32>, ClassifierError> {
    let input_ids = to_input_tensor(encoding.get_ids()).map_err(inference_failed)?;
    let attention_mask = to_input_tensor(encoding.get_attention_mask()).map_err(inference_failed)?;

    let outputs = session
        .run(ort::inputs![INPUT_IDS => input_ids, ATTENTION_MASK => attention_mask])
        .map_err(inference_failed)?;

    // First output: logits, shape [batch, num_labels]
    let logits = outputs[0]
        .try_extract_array::<f32>()
        .map_err(inference_failed)?
        .into_dimensionality::<ndarray::Ix2>()
        .map_err(inference_failed)?;

    logits
        .outer_iter()
        .next()
        .map(|row| row.to_vec())
        .ok_or_else(|| ClassifierError::InferenceFailed("model returned no logits".to_owned()))
}

/// Tokenize and run one text, returning its raw logits.
pub(crate) fn predict_logits(
    inference: &Mutex<Inference>,
    text: &str,
    options: &InvocationOptions,
    native_max_length: usize,
) -> Result<Vec<f32>, ClassifierError> {
    let mut inference = inference
        .lock()
        .map_err(|_| ClassifierError::InferenceFailed("classifier lock poisoned".to_owned()))?;
    let Inference { session, tokenizer } = &mut *inference;

    let encoding = encode(tokenizer, text, options, native_max_length)?;
    debug!(num_tokens = encoding.len(), "Running model inference");
    run_model_inference(session, &encoding)
}

pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Name softmaxed logits, highest score first. Only the best label is kept
/// unless `return_all_labels` is set.
pub(crate) fn scored_labels(
    logits: &[f32],
    labels: &LabelMap,
    return_all_labels: bool,
) -> Result<Vec<ScoredLabel>, ClassifierError> {
    if logits.len() != labels.len() {
        return Err(ClassifierError::InferenceFailed(format!(
            "model returned {} logits for {} labels",
            logits.len(),
            labels.len()
        )));
    }

    let mut scores: Vec<ScoredLabel> = softmax(logits)
        .into_iter()
        .enumerate()
        .filter_map(|(idx, score)| {
            labels
                .get(idx)
                .map(|label| ScoredLabel::new(label, f64::from(score)))
        })
        .collect();
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    if !return_all_labels {
        scores.truncate(1);
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;

    const BOS: u32 = 0;
    const EOS: u32 = 1;

    /// Whitespace word-level tokenizer that wraps every sequence in `<s> ... </s>`.
    fn word_tokenizer() -> Tokenizer {
        let json = r#"{
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": null,
            "pre_tokenizer": {"type": "WhitespaceSplit"},
            "post_processor": {
                "type": "TemplateProcessing",
                "single": [
                    {"SpecialToken": {"id": "<s>", "type_id": 0}},
                    {"Sequence": {"id": "A", "type_id": 0}},
                    {"SpecialToken": {"id": "</s>", "type_id": 0}}
                ],
                "pair": [
                    {"SpecialToken": {"id": "<s>", "type_id": 0}},
                    {"Sequence": {"id": "A", "type_id": 0}},
                    {"SpecialToken": {"id": "</s>", "type_id": 0}},
                    {"Sequence": {"id": "B", "type_id": 0}},
                    {"SpecialToken": {"id": "</s>", "type_id": 0}}
                ],
                "special_tokens": {
                    "<s>": {"id": "<s>", "ids": [0], "tokens": ["<s>"]},
                    "</s>": {"id": "</s>", "ids": [1], "tokens": ["</s>"]}
                }
            },
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": {"<s>": 0, "</s>": 1, "<unk>": 2, "the": 3, "essay": 4, "was": 5, "long": 6},
                "unk_token": "<unk>"
            }
        }"#;
        Tokenizer::from_str(json).expect("valid tokenizer json")
    }

    fn options(truncate: bool, max_length: usize) -> InvocationOptions {
        InvocationOptions {
            return_all_labels: true,
            truncate,
            max_length,
        }
    }

    #[test]
    fn test_encode_wraps_short_input_in_special_tokens() {
        let mut tokenizer = word_tokenizer();
        let encoding =
            encode(&mut tokenizer, "the essay", &options(true, 16), 16).expect("fits");
        assert_eq!(encoding.get_ids(), &[BOS, 3, 4, EOS]);
        assert!(encoding.get_overflowing().is_empty());
    }

    #[test]
    fn test_encode_truncates_to_max_length_with_special_tokens() {
        let mut tokenizer = word_tokenizer();
        let text = "the essay was long ".repeat(10);
        let encoding = encode(&mut tokenizer, &text, &options(true, 6), 16).expect("truncated");

        let ids = encoding.get_ids();
        assert_eq!(ids.len(), 6);
        assert_eq!(ids.first(), Some(&BOS));
        assert_eq!(ids.last(), Some(&EOS));
        assert_eq!(encoding.get_attention_mask(), &[1; 6]);
    }

    #[test]
    fn test_encode_caps_max_length_at_native_limit() {
        let mut tokenizer = word_tokenizer();
        let text = "the essay was long ".repeat(10);
        let encoding = encode(&mut tokenizer, &text, &options(true, 100), 8).expect("truncated");
        assert_eq!(encoding.len(), 8);
        assert_eq!(encoding.get_ids().last(), Some(&EOS));
    }

    #[test]
    fn test_encode_without_truncation_rejects_overlong_input() {
        let mut tokenizer = word_tokenizer();
        let text = "the essay was long ".repeat(10);
        let result = encode(&mut tokenizer, &text, &options(false, 8), 8);
        assert!(matches!(result, Err(ClassifierError::InferenceFailed(_))));
    }

    #[test]
    fn test_encode_resets_truncation_between_calls() {
        let mut tokenizer = word_tokenizer();
        let text = "the essay was long ".repeat(3);
        let short = encode(&mut tokenizer, &text, &options(true, 5), 32).expect("truncated");
        assert_eq!(short.len(), 5);

        let full = encode(&mut tokenizer, &text, &options(true, 32), 32).expect("fits");
        assert_eq!(full.len(), 14);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[2.0, -1.0]);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn test_softmax_is_stable_for_large_logits() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!(probs.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_scored_labels_sorted_by_score() {
        let scores = scored_labels(&[-3.0, 3.0], &LabelMap::detector_default(), true)
            .expect("matching label count");
        let labels: Vec<&str> = scores.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Real", "Fake"]);
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(&s.score)));
    }

    #[test]
    fn test_scored_labels_top_only() {
        let scores = scored_labels(&[3.0, -3.0], &LabelMap::detector_default(), false)
            .expect("matching label count");
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].label, "Fake");
    }

    #[test]
    fn test_scored_labels_rejects_shape_mismatch() {
        let result = scored_labels(&[0.1, 0.2, 0.3], &LabelMap::detector_default(), true);
        assert!(matches!(result, Err(ClassifierError::InferenceFailed(_))));
    }
}

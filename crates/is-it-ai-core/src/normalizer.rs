//! Adapts raw user text to the classifier's input limits.
//!
//! No character budget is applied here. Character counts are a poor proxy for
//! the model's token limit, so the full text is forwarded together with a
//! directive to truncate at the classifier's native maximum sequence length
//! when it is invoked.

use crate::classifier::InvocationOptions;

/// How over-long input is handled once the true token limit is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationDirective {
    /// Cut the token sequence at the classifier's native maximum length.
    TruncateToModelMax,
}

/// Text ready to be handed to a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedText<'a> {
    text: &'a str,
    directive: TruncationDirective,
}

impl<'a> BoundedText<'a> {
    #[must_use]
    pub const fn as_str(&self) -> &'a str {
        self.text
    }

    #[must_use]
    pub const fn directive(&self) -> TruncationDirective {
        self.directive
    }

    /// Resolve the directive against the classifier's native token limit.
    #[must_use]
    pub const fn invocation_options(&self, native_max_length: usize) -> InvocationOptions {
        match self.directive {
            TruncationDirective::TruncateToModelMax => InvocationOptions {
                return_all_labels: true,
                truncate: true,
                max_length: native_max_length,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputNormalizer;

impl InputNormalizer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Forward `text` untouched with a truncation directive. Never fails.
    #[must_use]
    pub const fn normalize<'a>(&self, text: &'a str) -> BoundedText<'a> {
        BoundedText {
            text,
            directive: TruncationDirective::TruncateToModelMax,
        }
    }

    /// True when nothing but whitespace is left to classify.
    #[must_use]
    pub fn is_blank(text: &str) -> bool {
        text.trim().is_empty()
    }
}

use crate::alignment::tokenization::{tokenize, NormalizeOptions};
use crate::pipeline::traits::Tokenizer;

/// Lowercasing, optionally normalizing tokenizer matching the classic tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct TercomTokenizer {
    options: NormalizeOptions,
}

impl TercomTokenizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }
}

impl Tokenizer for TercomTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize(text, &self.options)
    }
}

/// Splits on whitespace and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }
}

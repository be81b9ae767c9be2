use rayon::prelude::*;

use crate::alignment::cost::CostModel;
use crate::alignment::search::{ScoringContext, SearchParams};
use crate::config::TerConfig;
use crate::corpus::SegmentPair;
use crate::error::TerError;
use crate::pipeline::traits::Tokenizer;
use crate::types::{AlignmentResult, SearchStats, SpanConstraint};

/// Text-level TER scorer: tokenizes both sides, then runs the shift search.
pub struct TerScorer {
    config: TerConfig,
    params: SearchParams,
    tokenizer: Box<dyn Tokenizer>,
    cost_model: Box<dyn CostModel<String>>,
}

pub(crate) struct TerScorerParts {
    pub config: TerConfig,
    pub params: SearchParams,
    pub tokenizer: Box<dyn Tokenizer>,
    pub cost_model: Box<dyn CostModel<String>>,
}

#[derive(Debug, Clone)]
pub struct ScoredSegment {
    pub id: String,
    pub result: AlignmentResult<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CorpusScores {
    /// In input order.
    pub segments: Vec<ScoredSegment>,
    pub stats: SearchStats,
}

impl CorpusScores {
    pub fn total_edits(&self) -> f64 {
        self.segments.iter().map(|s| s.result.num_edits).sum()
    }

    pub fn total_words(&self) -> f64 {
        self.segments.iter().map(|s| s.result.num_words).sum()
    }

    pub fn ter(&self) -> f64 {
        let words = self.total_words();
        let edits = self.total_edits();
        if words <= 0.0 {
            return if edits > 0.0 { 1.0 } else { 0.0 };
        }
        edits / words
    }
}

impl TerScorer {
    pub(crate) fn from_parts(parts: TerScorerParts) -> Self {
        Self {
            config: parts.config,
            params: parts.params,
            tokenizer: parts.tokenizer,
            cost_model: parts.cost_model,
        }
    }

    pub fn config(&self) -> &TerConfig {
        &self.config
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.tokenizer.tokenize(text)
    }

    fn score_tokens(
        &self,
        ctx: &mut ScoringContext,
        hyp: &[String],
        reference: &[String],
        spans: Option<&SpanConstraint>,
        params: &SearchParams,
    ) -> Result<AlignmentResult<String>, TerError> {
        if let Some(spans) = spans {
            spans.check_lengths(reference.len(), hyp.len())?;
        }
        Ok(ctx.score(hyp, reference, self.cost_model.as_ref(), params, spans))
    }

    pub fn score_text(&self, hyp: &str, reference: &str) -> AlignmentResult<String> {
        let hyp = self.tokenize(hyp);
        let reference = self.tokenize(reference);
        ScoringContext::new().score(
            &hyp,
            &reference,
            self.cost_model.as_ref(),
            &self.params,
            None,
        )
    }

    pub fn score_corpus(&self, pairs: &[SegmentPair]) -> Result<CorpusScores, TerError> {
        self.score_corpus_with(pairs, |_| {})
    }

    /// Scores every pair in parallel, one [`ScoringContext`] per worker.
    /// `on_segment` runs once per finished segment, from any worker thread.
    pub fn score_corpus_with<F>(
        &self,
        pairs: &[SegmentPair],
        on_segment: F,
    ) -> Result<CorpusScores, TerError>
    where
        F: Fn(&ScoredSegment) + Sync,
    {
        let segments = pairs
            .par_iter()
            .map_init(ScoringContext::new, |ctx, pair| {
                let scored = self.score_pair(ctx, pair)?;
                on_segment(&scored);
                Ok(scored)
            })
            .collect::<Result<Vec<_>, TerError>>()?;

        let mut stats = SearchStats::default();
        for segment in &segments {
            stats.merge(&segment.result.stats);
        }
        tracing::debug!(
            segments = stats.segments_scored,
            aligner_calls = stats.aligner_calls,
            shifts_considered = stats.shifts_considered,
            "corpus scored"
        );
        Ok(CorpusScores { segments, stats })
    }

    fn score_pair(
        &self,
        ctx: &mut ScoringContext,
        pair: &SegmentPair,
    ) -> Result<ScoredSegment, TerError> {
        let hyp = self.tokenize(&pair.hypothesis);
        let reference = self.tokenize(&pair.reference);
        let params = match pair.ref_len {
            Some(ref_len) => SearchParams {
                ref_len: Some(ref_len),
                ..self.params
            },
            None => self.params,
        };
        let result = self
            .score_tokens(ctx, &hyp, &reference, pair.spans.as_ref(), &params)
            .map_err(|e| TerError::invalid_input(format!("segment {:?}: {e}", pair.id)))?;
        Ok(ScoredSegment {
            id: pair.id.clone(),
            result,
        })
    }
}

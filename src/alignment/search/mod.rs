use std::hash::Hash;

use crate::alignment::beam::{self, AlignScratch, Alignment, SpanView, DEFAULT_BEAM_WIDTH};
use crate::alignment::cost::CostModel;
use crate::alignment::match_index::MatchIndex;
use crate::alignment::shift::{perform_shift, perform_shift_with};
use crate::types::{AlignmentResult, AppliedShift, SearchStats, Shift, Span, SpanConstraint};

mod candidates;

use candidates::{gather_candidates, ErrorPattern, ShiftLimits};

pub const DEFAULT_MAX_SHIFT_SIZE: usize = 10;
pub const DEFAULT_MAX_SHIFT_DIST: usize = 50;

/// Engine knobs for one scoring call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    pub beam_width: usize,
    /// Longest block a shift may move; `0` disables shifting.
    pub max_shift_size: usize,
    /// Farthest a block may travel; `0` disables shifting.
    pub max_shift_dist: usize,
    /// Replaces the reference length as the score denominator when `>= 0`.
    pub ref_len: Option<f64>,
    /// Upper bound on shifted sequences evaluated per scoring call.
    pub candidate_budget: Option<usize>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            beam_width: DEFAULT_BEAM_WIDTH,
            max_shift_size: DEFAULT_MAX_SHIFT_SIZE,
            max_shift_dist: DEFAULT_MAX_SHIFT_DIST,
            ref_len: None,
            candidate_budget: None,
        }
    }
}

impl SearchParams {
    fn shifts_enabled(&self) -> bool {
        self.max_shift_size > 0 && self.max_shift_dist > 0
    }
}

/// State reached by evaluating one shift.
struct Evaluated<T> {
    shift: Shift<T>,
    alignment: Alignment,
    working: Vec<T>,
    hyp_spans: Option<Vec<Span>>,
}

/// Per-worker scoring state: the aligner scratch plus running counters.
///
/// One context must not be used by two scoring calls at once; parallel
/// callers keep one context per worker.
#[derive(Debug, Default)]
pub struct ScoringContext {
    scratch: AlignScratch,
    stats: SearchStats,
}

impl ScoringContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters accumulated over every call made through this context.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SearchStats::default();
    }

    /// Scores `hyp` against `reference`, shifting blocks of the hypothesis
    /// greedily while that lowers the total edit cost.
    ///
    /// # Panics
    ///
    /// Panics if `spans` does not hold exactly one span per token; use
    /// [`SpanConstraint::check_lengths`] to validate untrusted input first.
    pub fn score<T, C>(
        &mut self,
        hyp: &[T],
        reference: &[T],
        cost_model: &C,
        params: &SearchParams,
        spans: Option<&SpanConstraint>,
    ) -> AlignmentResult<T>
    where
        T: Eq + Hash + Clone,
        C: CostModel<T> + ?Sized,
    {
        if let Some(spans) = spans {
            assert!(
                spans.reference.len() == reference.len() && spans.hypothesis.len() == hyp.len(),
                "span constraint must hold one span per token"
            );
        }

        let mut stats = SearchStats {
            segments_scored: 1,
            ..SearchStats::default()
        };
        let ref_spans = spans.map(|s| s.reference.as_slice());
        let index = MatchIndex::build(hyp, reference, params.max_shift_size);
        tracing::trace!(blocks = index.len(), "built reference match index");

        let mut working = hyp.to_vec();
        let mut hyp_spans = spans.map(|s| s.hypothesis.clone());
        let mut current = self.align(
            &working,
            reference,
            cost_model,
            params,
            ref_spans,
            hyp_spans.as_deref(),
            &mut stats,
        );

        let mut budget = params.candidate_budget;
        let mut applied: Vec<AppliedShift<T>> = Vec::new();
        let mut shift_cost_total = 0.0;

        while let Some(best) = self.best_shift(
            &working,
            reference,
            &index,
            &current,
            cost_model,
            params,
            ref_spans,
            hyp_spans.as_deref(),
            &mut budget,
            &mut stats,
        ) {
            stats.rounds += 1;
            shift_cost_total += best.shift.cost;
            tracing::debug!(
                start = best.shift.start,
                end = best.shift.end,
                moveto = best.shift.moveto,
                newloc = best.shift.newloc,
                cost = best.shift.cost,
                alignment_cost = best.alignment.cost,
                "accepted shift"
            );

            applied.push(AppliedShift {
                shift: best.shift,
                path: best.alignment.path.clone(),
                after_shift: best.working.clone(),
            });
            working = best.working;
            hyp_spans = best.hyp_spans;
            current = best.alignment;
        }

        let num_words = match params.ref_len {
            Some(len) if len >= 0.0 => len,
            _ => reference.len() as f64,
        };
        self.stats.merge(&stats);

        AlignmentResult {
            reference: reference.to_vec(),
            hypothesis: hyp.to_vec(),
            working,
            path: current.path,
            shifts: applied,
            num_edits: current.cost + shift_cost_total,
            num_words,
            stats,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn align<T, C>(
        &mut self,
        working: &[T],
        reference: &[T],
        cost_model: &C,
        params: &SearchParams,
        ref_spans: Option<&[Span]>,
        hyp_spans: Option<&[Span]>,
        stats: &mut SearchStats,
    ) -> Alignment
    where
        T: Eq,
        C: CostModel<T> + ?Sized,
    {
        stats.aligner_calls += 1;
        let spans = match (ref_spans, hyp_spans) {
            (Some(reference), Some(hypothesis)) => Some(SpanView {
                reference,
                hypothesis,
            }),
            _ => None,
        };
        beam::align(
            &mut self.scratch,
            working,
            reference,
            cost_model,
            params.beam_width as f64,
            spans,
        )
    }

    /// Runs one greedy round and returns the shift to apply, if any.
    ///
    /// Classes are visited from the longest block down. A shifted block of
    /// `k + 1` tokens can remove at most `2 * (k + 1)` edits, so once the
    /// best result so far is within that bound of the round's starting cost
    /// no smaller block can beat it. Both this bound and the preference for
    /// a free shift over none are heuristics kept as-is.
    #[allow(clippy::too_many_arguments)]
    fn best_shift<T, C>(
        &mut self,
        working: &[T],
        reference: &[T],
        index: &MatchIndex<'_, T>,
        current: &Alignment,
        cost_model: &C,
        params: &SearchParams,
        ref_spans: Option<&[Span]>,
        hyp_spans: Option<&[Span]>,
        budget: &mut Option<usize>,
        stats: &mut SearchStats,
    ) -> Option<Evaluated<T>>
    where
        T: Eq + Hash + Clone,
        C: CostModel<T> + ?Sized,
    {
        if !params.shifts_enabled() {
            return None;
        }

        let errors = ErrorPattern::from_path(&current.path, working.len(), reference.len());
        let classes = gather_candidates(
            working,
            index,
            &errors,
            cost_model,
            ShiftLimits {
                max_size: params.max_shift_size,
                max_dist: params.max_shift_dist,
            },
        );
        tracing::trace!(
            candidates = classes.iter().map(Vec::len).sum::<usize>(),
            alignment_cost = current.cost,
            "gathered shift candidates"
        );

        let round_start_cost = current.cost;
        let mut best: Option<Evaluated<T>> = None;
        let mut best_shift_cost = 0.0;
        let mut best_edits = current.cost;

        'classes: for (k, class) in classes.into_iter().enumerate().rev() {
            let max_fix = (2 * (k + 1)) as f64;
            for shift in class {
                let fixed = round_start_cost - (best_shift_cost + best_edits);
                if fixed > max_fix || (best_shift_cost != 0.0 && fixed == max_fix) {
                    break 'classes;
                }
                if let Some(remaining) = budget.as_mut() {
                    if *remaining == 0 {
                        tracing::debug!("shift candidate budget exhausted");
                        break 'classes;
                    }
                    *remaining -= 1;
                }

                stats.shifts_considered += 1;
                let (shifted, shifted_spans) = match hyp_spans {
                    Some(spans) => {
                        let (seq, spans) =
                            perform_shift_with(working, spans, shift.start, shift.end, shift.newloc);
                        (seq, Some(spans))
                    }
                    None => (
                        perform_shift(working, shift.start, shift.end, shift.newloc),
                        None,
                    ),
                };
                let alignment = self.align(
                    &shifted,
                    reference,
                    cost_model,
                    params,
                    ref_spans,
                    shifted_spans.as_deref(),
                    stats,
                );

                let gain = (best_edits + best_shift_cost) - (alignment.cost + shift.cost);
                if gain > 0.0 || (best_shift_cost == 0.0 && gain == 0.0) {
                    best_shift_cost = shift.cost;
                    best_edits = alignment.cost;
                    best = Some(Evaluated {
                        shift,
                        alignment,
                        working: shifted,
                        hyp_spans: shifted_spans,
                    });
                }
            }
        }

        best
    }
}

/// Scores one pair with a fresh context.
pub fn score<T, C>(
    hyp: &[T],
    reference: &[T],
    cost_model: &C,
    params: &SearchParams,
) -> AlignmentResult<T>
where
    T: Eq + Hash + Clone,
    C: CostModel<T> + ?Sized,
{
    ScoringContext::new().score(hyp, reference, cost_model, params, None)
}

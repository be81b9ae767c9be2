use crate::alignment::cost::CostModel;
use crate::types::{AlignmentOp, Span};

pub const DEFAULT_BEAM_WIDTH: usize = 20;

/// Backpointer stored per DP cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Unset,
    Origin,
    Match,
    Substitute,
    Insert,
    Delete,
}

/// Reusable DP matrices.
///
/// Grown on demand and never shrunk, so one scratch can serve every aligner
/// call of a scoring session. Not shareable between concurrent calls: give
/// each worker its own.
#[derive(Debug, Default)]
pub struct AlignScratch {
    costs: Vec<f64>,
    steps: Vec<Step>,
    rows: usize,
    cols: usize,
}

impl AlignScratch {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn with_capacity(ref_len: usize, hyp_len: usize) -> Self {
        let mut scratch = Self::default();
        scratch.grow(ref_len + 1, hyp_len + 1);
        scratch
    }

    /// `(rows, cols)` currently allocated.
    #[cfg(test)]
    pub(crate) fn capacity(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn grow(&mut self, rows: usize, cols: usize) {
        if rows <= self.rows && cols <= self.cols {
            return;
        }
        self.rows = self.rows.max(rows);
        self.cols = self.cols.max(cols);
        let cells = self.rows * self.cols;
        self.costs = vec![0.0; cells];
        self.steps = vec![Step::Unset; cells];
    }

    fn prepare(&mut self, rows: usize, cols: usize) {
        self.grow(rows, cols);
        for i in 0..rows {
            let base = i * self.cols;
            self.steps[base..base + cols].fill(Step::Unset);
        }
    }

    #[inline(always)]
    fn index(&self, i: usize, j: usize) -> usize {
        i * self.cols + j
    }

    #[inline(always)]
    fn get(&self, i: usize, j: usize) -> Option<f64> {
        let idx = self.index(i, j);
        (self.steps[idx] != Step::Unset).then(|| self.costs[idx])
    }

    #[inline(always)]
    fn step(&self, i: usize, j: usize) -> Step {
        self.steps[self.index(i, j)]
    }

    /// Writes `cost` into an empty cell or one holding a strictly higher cost.
    #[inline(always)]
    fn offer(&mut self, i: usize, j: usize, cost: f64, step: Step) -> bool {
        let idx = self.index(i, j);
        if self.steps[idx] == Step::Unset || cost < self.costs[idx] {
            self.costs[idx] = cost;
            self.steps[idx] = step;
            return true;
        }
        false
    }
}

/// Reference and working-hypothesis spans, one per token.
#[derive(Debug, Clone, Copy)]
pub struct SpanView<'a> {
    pub reference: &'a [Span],
    pub hypothesis: &'a [Span],
}

impl SpanView<'_> {
    #[inline(always)]
    fn allows(&self, i: usize, j: usize) -> bool {
        self.reference[i].overlaps(&self.hypothesis[j])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub path: Vec<AlignmentOp>,
    pub cost: f64,
}

/// Bounded-beam edit distance between `working` and `reference`.
///
/// The grid is filled column by column (one column per working token). A
/// filled cell is not expanded when its cost exceeds the best diagonal entry
/// into its column by more than `beam_width`; the last column is never
/// pruned. Only the contiguous band of rows that were live in the previous
/// column is visited.
///
/// # Panics
///
/// Panics if the traceback meets a cell without a backpointer, and if
/// `spans` does not hold one span per token.
pub fn align<T, C>(
    scratch: &mut AlignScratch,
    working: &[T],
    reference: &[T],
    cost_model: &C,
    beam_width: f64,
    spans: Option<SpanView<'_>>,
) -> Alignment
where
    T: Eq,
    C: CostModel<T> + ?Sized,
{
    if working.is_empty() || reference.is_empty() {
        return trivial_alignment(working, reference, cost_model);
    }

    let n_ref = reference.len();
    let n_hyp = working.len();
    scratch.prepare(n_ref + 1, n_hyp + 1);
    scratch.offer(0, 0, 0.0, Step::Origin);

    let mut current_best = f64::INFINITY;
    let mut next_first: Option<usize> = Some(0);
    let mut next_last: Option<usize> = Some(0);

    for j in 0..=n_hyp {
        let last_best = current_best;
        current_best = f64::INFINITY;

        let (Some(first), Some(mut last)) = (next_first.take(), next_last.take()) else {
            break;
        };

        let mut i = first;
        while i <= n_ref && i <= last {
            let Some(score) = scratch.get(i, j) else {
                i += 1;
                continue;
            };
            if j < n_hyp && score > last_best + beam_width {
                i += 1;
                continue;
            }
            next_first.get_or_insert(i);

            if i < n_ref && j < n_hyp && spans.map_or(true, |s| s.allows(i, j)) {
                if reference[i] == working[j] {
                    let cost = score + cost_model.match_cost(&working[j], &reference[i]);
                    scratch.offer(i + 1, j + 1, cost, Step::Match);
                    current_best = current_best.min(cost);
                } else {
                    let cost = score + cost_model.substitute_cost(&working[j], &reference[i]);
                    if scratch.offer(i + 1, j + 1, cost, Step::Substitute) {
                        current_best = current_best.min(cost);
                    }
                }
            }

            next_last = Some(i + 1);

            if j < n_hyp {
                let cost = score + cost_model.insert_cost(&working[j]);
                scratch.offer(i, j + 1, cost, Step::Insert);
            }

            if i < n_ref {
                let cost = score + cost_model.delete_cost(&reference[i]);
                if scratch.offer(i + 1, j, cost, Step::Delete) && i >= last {
                    last = i + 1;
                }
            }
            i += 1;
        }
    }

    let path = traceback(scratch, n_ref, n_hyp);
    let cost = scratch
        .get(n_ref, n_hyp)
        .unwrap_or_else(|| panic!("alignment grid corner ({n_ref}, {n_hyp}) was never reached"));
    Alignment { path, cost }
}

fn traceback(scratch: &AlignScratch, n_ref: usize, n_hyp: usize) -> Vec<AlignmentOp> {
    let mut path = Vec::with_capacity(n_ref + n_hyp);
    let (mut i, mut j) = (n_ref, n_hyp);
    while i > 0 || j > 0 {
        let op = match scratch.step(i, j) {
            Step::Match => AlignmentOp::Match,
            Step::Substitute => AlignmentOp::Substitute,
            Step::Insert => AlignmentOp::Insert,
            Step::Delete => AlignmentOp::Delete,
            step @ (Step::Unset | Step::Origin) => {
                panic!("invalid alignment traceback: {step:?} at ({i}, {j})")
            }
        };
        if op.advances_ref() {
            i -= 1;
        }
        if op.advances_hyp() {
            j -= 1;
        }
        path.push(op);
    }
    path.reverse();
    path
}

fn trivial_alignment<T, C>(working: &[T], reference: &[T], cost_model: &C) -> Alignment
where
    C: CostModel<T> + ?Sized,
{
    if working.is_empty() {
        Alignment {
            path: vec![AlignmentOp::Delete; reference.len()],
            cost: reference.iter().map(|t| cost_model.delete_cost(t)).sum(),
        }
    } else {
        Alignment {
            path: vec![AlignmentOp::Insert; working.len()],
            cost: working.iter().map(|t| cost_model.insert_cost(t)).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::cost::UniformCost;
    use AlignmentOp::{Delete as D, Insert as I, Match as M, Substitute as S};

    fn words(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    fn run(hyp: &str, reference: &str) -> Alignment {
        let mut scratch = AlignScratch::new();
        align(
            &mut scratch,
            &words(hyp),
            &words(reference),
            &UniformCost::default(),
            DEFAULT_BEAM_WIDTH as f64,
            None,
        )
    }

    /// Plain Levenshtein distance without pruning.
    fn levenshtein(a: &[&str], b: &[&str]) -> f64 {
        let mut prev: Vec<usize> = (0..=b.len()).collect();
        for i in 1..=a.len() {
            let mut cur = vec![i; b.len() + 1];
            for j in 1..=b.len() {
                let sub = prev[j - 1] + usize::from(a[i - 1] != b[j - 1]);
                cur[j] = sub.min(prev[j] + 1).min(cur[j - 1] + 1);
            }
            prev = cur;
        }
        prev[b.len()] as f64
    }

    fn assert_path_consistent(path: &[AlignmentOp], ref_len: usize, hyp_len: usize) {
        assert_eq!(path.iter().filter(|op| op.advances_ref()).count(), ref_len);
        assert_eq!(path.iter().filter(|op| op.advances_hyp()).count(), hyp_len);
    }

    #[test]
    fn identical_sequences_align_with_matches() {
        let out = run("the cat sat", "the cat sat");
        assert_eq!(out.path, vec![M, M, M]);
        assert_eq!(out.cost, 0.0);
    }

    #[test]
    fn appended_reference_token_is_a_delete() {
        let out = run("a b", "a b c");
        assert_eq!(out.path, vec![M, M, D]);
        assert_eq!(out.cost, 1.0);
    }

    #[test]
    fn extra_hypothesis_token_is_an_insert() {
        let out = run("a x b", "a b");
        assert_eq!(out.path, vec![M, I, M]);
        assert_eq!(out.cost, 1.0);
    }

    #[test]
    fn swapped_pair_prefers_substitutions() {
        let out = run("b a", "a b");
        assert_eq!(out.path, vec![S, S]);
        assert_eq!(out.cost, 2.0);
    }

    #[test]
    fn empty_inputs_are_trivial() {
        let out = run("", "x y");
        assert_eq!(out.path, vec![D, D]);
        assert_eq!(out.cost, 2.0);

        let out = run("x y", "");
        assert_eq!(out.path, vec![I, I]);
        assert_eq!(out.cost, 2.0);

        let out = run("", "");
        assert!(out.path.is_empty());
        assert_eq!(out.cost, 0.0);
    }

    #[test]
    fn matches_unpruned_edit_distance() {
        let cases = [
            ("a b c d e f", "a c d x f g"),
            ("the quick brown fox", "quick the fox brown jumps"),
            ("x x x x", "y y"),
            ("one two three four five six", "six five four three two one"),
        ];
        for (hyp, reference) in cases {
            let out = run(hyp, reference);
            let expected = levenshtein(&words(reference), &words(hyp));
            assert_eq!(out.cost, expected, "{hyp:?} vs {reference:?}");
            assert_path_consistent(&out.path, words(reference).len(), words(hyp).len());
        }
    }

    #[test]
    fn span_constraint_blocks_distant_matches() {
        let hyp = words("a b");
        let reference = words("a b");
        let ref_spans = [Span::new(0, 0), Span::new(1, 1)];
        let hyp_spans = [Span::new(5, 5), Span::new(1, 1)];
        let mut scratch = AlignScratch::new();
        let out = align(
            &mut scratch,
            &hyp,
            &reference,
            &UniformCost::default(),
            20.0,
            Some(SpanView {
                reference: &ref_spans,
                hypothesis: &hyp_spans,
            }),
        );
        // "a" may not pair with "a", so it costs an insert and a delete.
        assert_eq!(out.cost, 2.0);
        assert_path_consistent(&out.path, 2, 2);
        assert_eq!(out.path.iter().filter(|op| **op == M).count(), 1);
    }

    #[test]
    fn scratch_grows_and_is_reused() {
        let mut scratch = AlignScratch::with_capacity(2, 2);
        assert_eq!(scratch.capacity(), (3, 3));
        let cost = UniformCost::default();

        let long_hyp = words("a b c d e");
        let long_ref = words("a b c d");
        let first = align(&mut scratch, &long_hyp, &long_ref, &cost, 20.0, None);
        assert_eq!(first.cost, 1.0);
        assert_eq!(scratch.capacity(), (5, 6));

        let short = align(&mut scratch, &words("b a"), &words("a b"), &cost, 20.0, None);
        assert_eq!(short.cost, 2.0);
        assert_eq!(scratch.capacity(), (5, 6));
    }

    #[test]
    fn custom_costs_drive_the_path() {
        let cheap_sub = UniformCost {
            substitute_cost: 0.1,
            ..UniformCost::default()
        };
        let mut scratch = AlignScratch::new();
        let out = align(
            &mut scratch,
            &words("a x"),
            &words("a y"),
            &cheap_sub,
            20.0,
            None,
        );
        assert_eq!(out.path, vec![M, S]);
        assert!((out.cost - 0.1).abs() < 1e-12);
    }

    #[test]
    fn narrow_beam_prunes_the_cheaper_path() {
        let mut scratch = AlignScratch::new();
        let cost = UniformCost::default();
        let hyp = words("b b");
        let reference = words("b e e b");

        let wide = align(&mut scratch, &hyp, &reference, &cost, 20.0, None);
        assert_eq!(wide.path, vec![M, D, D, M]);
        assert_eq!(wide.cost, 2.0);

        let narrow = align(&mut scratch, &hyp, &reference, &cost, 1.0, None);
        assert_path_consistent(&narrow.path, 4, 2);
        assert_eq!(narrow.cost, 3.0);
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TerError;

/// One step of an alignment path between a reference and a working hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentOp {
    Match,
    Substitute,
    /// Hypothesis token with no reference counterpart.
    Insert,
    /// Reference token with no hypothesis counterpart.
    Delete,
}

impl AlignmentOp {
    pub fn advances_ref(self) -> bool {
        !matches!(self, Self::Insert)
    }

    pub fn advances_hyp(self) -> bool {
        !matches!(self, Self::Delete)
    }

    pub fn is_error(self) -> bool {
        !matches!(self, Self::Match)
    }

    /// Single-character code used by the classic `pra` alignment strings.
    pub fn code(self) -> char {
        match self {
            Self::Match => ' ',
            Self::Substitute => 'S',
            Self::Insert => 'I',
            Self::Delete => 'D',
        }
    }
}

impl fmt::Display for AlignmentOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

pub fn path_codes(path: &[AlignmentOp]) -> String {
    path.iter().map(|op| op.code()).collect()
}

/// Inclusive positional interval attached to a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: i64,
    pub end: i64,
}

impl Span {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.end >= other.start && self.start <= other.end
    }
}

/// Per-token intervals restricting which reference/hypothesis pairs may be
/// matched or substituted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanConstraint {
    pub reference: Vec<Span>,
    pub hypothesis: Vec<Span>,
}

impl SpanConstraint {
    pub fn new(reference: Vec<Span>, hypothesis: Vec<Span>) -> Self {
        Self {
            reference,
            hypothesis,
        }
    }

    /// Checks that there is exactly one span per token on both sides.
    pub fn check_lengths(&self, ref_len: usize, hyp_len: usize) -> Result<(), TerError> {
        if self.reference.len() != ref_len {
            return Err(TerError::invalid_input(format!(
                "reference has {ref_len} tokens but {} spans",
                self.reference.len()
            )));
        }
        if self.hypothesis.len() != hyp_len {
            return Err(TerError::invalid_input(format!(
                "hypothesis has {hyp_len} tokens but {} spans",
                self.hypothesis.len()
            )));
        }
        Ok(())
    }
}

/// Relocation of a contiguous block of the working hypothesis.
///
/// `start..=end` indexes the working sequence before the shift. `moveto` is the
/// reference position the block was matched against (`-1` for the very front);
/// `newloc` is the working-sequence position the block is reinserted after,
/// which is what [`crate::alignment::shift::perform_shift`] consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shift<T> {
    pub start: usize,
    pub end: usize,
    pub moveto: isize,
    pub newloc: isize,
    pub moved: Vec<T>,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftDirection {
    Left,
    Right,
}

impl<T> Shift<T> {
    pub fn size(&self) -> usize {
        self.end - self.start + 1
    }

    /// Distance between the block and its destination in reference positions.
    pub fn distance(&self) -> usize {
        let start = self.start as isize;
        let end = self.end as isize;
        let d = if self.moveto < start {
            start - self.moveto
        } else if self.moveto > end {
            self.moveto - end
        } else {
            self.moveto - start
        };
        d.unsigned_abs()
    }

    /// Direction and number of words jumped over, as shown in shift reports.
    pub fn displacement(&self) -> (ShiftDirection, usize) {
        let start = self.start as isize;
        let end = self.end as isize;
        if self.newloc >= end {
            (ShiftDirection::Right, (self.newloc - end).unsigned_abs())
        } else {
            (
                ShiftDirection::Left,
                (start - self.newloc - 1).unsigned_abs(),
            )
        }
    }
}

/// An accepted shift together with the state it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedShift<T> {
    pub shift: Shift<T>,
    pub path: Vec<AlignmentOp>,
    pub after_shift: Vec<T>,
}

/// Instrumentation counters for one or more scoring calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SearchStats {
    pub aligner_calls: u64,
    pub shifts_considered: u64,
    pub rounds: u64,
    pub segments_scored: u64,
}

impl SearchStats {
    pub fn merge(&mut self, other: &SearchStats) {
        self.aligner_calls += other.aligner_calls;
        self.shifts_considered += other.shifts_considered;
        self.rounds += other.rounds;
        self.segments_scored += other.segments_scored;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EditCounts {
    pub insertions: u32,
    pub deletions: u32,
    pub substitutions: u32,
    pub shifts: u32,
    pub shifted_words: u32,
}

/// Outcome of scoring one hypothesis against one reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentResult<T> {
    pub reference: Vec<T>,
    pub hypothesis: Vec<T>,
    /// Hypothesis after all accepted shifts.
    pub working: Vec<T>,
    /// Alignment of `working` against `reference`.
    pub path: Vec<AlignmentOp>,
    pub shifts: Vec<AppliedShift<T>>,
    /// Final alignment cost plus the cost of every applied shift.
    pub num_edits: f64,
    pub num_words: f64,
    pub stats: SearchStats,
}

impl<T> AlignmentResult<T> {
    pub fn score(&self) -> f64 {
        if self.num_words <= 0.0 {
            return if self.num_edits > 0.0 { 1.0 } else { 0.0 };
        }
        self.num_edits / self.num_words
    }

    pub fn edit_counts(&self) -> EditCounts {
        let mut counts = EditCounts {
            shifts: self.shifts.len() as u32,
            shifted_words: self.shifts.iter().map(|s| s.shift.size() as u32).sum(),
            ..EditCounts::default()
        };
        for op in &self.path {
            match op {
                AlignmentOp::Match => {}
                AlignmentOp::Substitute => counts.substitutions += 1,
                AlignmentOp::Insert => counts.insertions += 1,
                AlignmentOp::Delete => counts.deletions += 1,
            }
        }
        counts
    }

    pub fn insertions(&self) -> u32 {
        self.edit_counts().insertions
    }

    pub fn deletions(&self) -> u32 {
        self.edit_counts().deletions
    }

    pub fn substitutions(&self) -> u32 {
        self.edit_counts().substitutions
    }

    pub fn num_shifts(&self) -> usize {
        self.shifts.len()
    }

    pub fn shifted_words(&self) -> usize {
        self.shifts.iter().map(|s| s.shift.size()).sum()
    }
}

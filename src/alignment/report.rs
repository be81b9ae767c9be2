use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::config::TerConfig;
use crate::error::TerError;
use crate::types::{path_codes, AlignmentResult, SearchStats, ShiftDirection};

pub const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    pub segments: Vec<SegmentReport>,
    pub totals: CorpusTotals,
    pub stats: SearchStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub hypothesis_file: String,
    pub reference_file: String,
    pub segment_count: usize,
    pub config: TerConfig,
}

/// Edit breakdown for one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub id: String,
    pub insertions: u32,
    pub deletions: u32,
    pub substitutions: u32,
    pub shifts: u32,
    pub shifted_words: u32,
    pub num_edits: f64,
    pub num_words: f64,
    pub ter: f64,
}

impl SegmentSummary {
    pub fn from_result<T>(id: &str, result: &AlignmentResult<T>) -> Self {
        let counts = result.edit_counts();
        Self {
            id: id.to_string(),
            insertions: counts.insertions,
            deletions: counts.deletions,
            substitutions: counts.substitutions,
            shifts: counts.shifts,
            shifted_words: counts.shifted_words,
            num_edits: result.num_edits,
            num_words: result.num_words,
            ter: result.score(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShiftReport {
    pub start: usize,
    pub end: usize,
    pub moveto: isize,
    pub newloc: isize,
    pub words: Vec<String>,
    pub direction: ShiftDirection,
    /// Words jumped over in the hypothesis.
    pub distance: usize,
    /// Distance to the destination in reference positions.
    pub reference_distance: usize,
    pub cost: f64,
    pub after_shift: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentReport {
    pub summary: SegmentSummary,
    pub reference: String,
    pub hypothesis: String,
    pub after_shift: String,
    /// One code per alignment step: ' ' match, S, I, D.
    pub alignment: String,
    pub shifts: Vec<ShiftReport>,
}

impl SegmentReport {
    pub fn from_result<T: fmt::Display>(id: &str, result: &AlignmentResult<T>) -> Self {
        let shifts = result
            .shifts
            .iter()
            .map(|applied| {
                let (direction, distance) = applied.shift.displacement();
                ShiftReport {
                    start: applied.shift.start,
                    end: applied.shift.end,
                    moveto: applied.shift.moveto,
                    newloc: applied.shift.newloc,
                    words: applied.shift.moved.iter().map(ToString::to_string).collect(),
                    direction,
                    distance,
                    reference_distance: applied.shift.distance(),
                    cost: applied.shift.cost,
                    after_shift: join(&applied.after_shift),
                }
            })
            .collect();
        Self {
            summary: SegmentSummary::from_result(id, result),
            reference: join(&result.reference),
            hypothesis: join(&result.hypothesis),
            after_shift: join(&result.working),
            alignment: path_codes(&result.path),
            shifts,
        }
    }
}

/// Running corpus totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorpusTotals {
    pub segments: u32,
    pub insertions: u32,
    pub deletions: u32,
    pub substitutions: u32,
    pub shifts: u32,
    pub shifted_words: u32,
    pub num_edits: f64,
    pub num_words: f64,
}

impl CorpusTotals {
    pub fn add(&mut self, summary: &SegmentSummary) {
        self.segments += 1;
        self.insertions += summary.insertions;
        self.deletions += summary.deletions;
        self.substitutions += summary.substitutions;
        self.shifts += summary.shifts;
        self.shifted_words += summary.shifted_words;
        self.num_edits += summary.num_edits;
        self.num_words += summary.num_words;
    }

    /// Corpus-level rate: total edits over total words.
    pub fn ter(&self) -> f64 {
        if self.num_words <= 0.0 {
            return if self.num_edits > 0.0 { 1.0 } else { 0.0 };
        }
        self.num_edits / self.num_words
    }
}

impl<'a> FromIterator<&'a SegmentSummary> for CorpusTotals {
    fn from_iter<I: IntoIterator<Item = &'a SegmentSummary>>(iter: I) -> Self {
        let mut totals = Self::default();
        for summary in iter {
            totals.add(summary);
        }
        totals
    }
}

pub fn build_report(meta: Meta, segments: Vec<SegmentReport>, stats: SearchStats) -> Report {
    let totals = segments.iter().map(|s| &s.summary).collect();
    Report {
        schema_version: REPORT_SCHEMA_VERSION,
        meta,
        segments,
        totals,
        stats,
    }
}

impl Report {
    /// Fixed-width rendering: one row per segment plus a total row, TER in
    /// percent.
    pub fn summary_table(&self) -> SummaryTable<'_> {
        SummaryTable(self)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), TerError> {
        create_parent_dir(path)?;
        let file = File::create(path).map_err(|e| TerError::io("create report file", e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| TerError::json("serialize report", e))?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|e| TerError::io("finalize report file", e))
    }

    pub fn write_summary(&self, path: &Path) -> Result<(), TerError> {
        create_parent_dir(path)?;
        fs::write(path, self.summary_table().to_string())
            .map_err(|e| TerError::io("write summary file", e))
    }
}

fn create_parent_dir(path: &Path) -> Result<(), TerError> {
    match path.parent() {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|e| TerError::io("create output directory", e))
        }
        None => Ok(()),
    }
}

const RULE: &str =
    "-------------------------------------------------------------------------------------";

pub struct SummaryTable<'a>(&'a Report);

impl fmt::Display for SummaryTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_summary(f, self.0)
    }
}

fn write_summary(out: &mut impl fmt::Write, report: &Report) -> fmt::Result {
    writeln!(out, "Hypothesis File: {}", report.meta.hypothesis_file)?;
    writeln!(out, "Reference File: {}", report.meta.reference_file)?;
    writeln!(
        out,
        "{:<19} | {:<4} | {:<4} | {:<4} | {:<4} | {:<4} | {:<6} | {:<8} | {:<8}",
        "Sent Id", "Ins", "Del", "Sub", "Shft", "WdSh", "NumEr", "NumWd", "TER"
    )?;
    writeln!(out, "{RULE}")?;
    for segment in &report.segments {
        let s = &segment.summary;
        writeln!(
            out,
            "{:<19} | {:>4} | {:>4} | {:>4} | {:>4} | {:>4} | {:>6.1} | {:>8.3} | {:>8.3}",
            s.id,
            s.insertions,
            s.deletions,
            s.substitutions,
            s.shifts,
            s.shifted_words,
            s.num_edits,
            s.num_words,
            s.ter * 100.0
        )?;
    }
    let t = &report.totals;
    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "{:<19} | {:<4} | {:<4} | {:<4} | {:<4} | {:<4} | {:<6.1} | {:<8.3} | {:<8.3}",
        "TOTAL",
        t.insertions,
        t.deletions,
        t.substitutions,
        t.shifts,
        t.shifted_words,
        t.num_edits,
        t.num_words,
        t.ter() * 100.0
    )
}

fn join<T: fmt::Display>(tokens: &[T]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

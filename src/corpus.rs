//! Line-oriented "trans" corpus files: each non-blank line is `text (id)`.

use std::collections::HashMap;
use std::path::Path;

use crate::error::TerError;
use crate::pipeline::traits::Tokenizer;
use crate::types::{Span, SpanConstraint};

/// All lines sharing one segment id, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub id: String,
    pub texts: Vec<String>,
}

/// Segments in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransCorpus {
    segments: Vec<Segment>,
    by_id: HashMap<String, usize>,
}

impl TransCorpus {
    pub fn parse(text: &str) -> Self {
        let mut corpus = Self::default();
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match split_trans_line(line) {
                Some((text, id)) => corpus.push(id, text),
                None => tracing::warn!(line = line_no + 1, content = line, "invalid trans line"),
            }
        }
        corpus
    }

    pub fn load(path: &Path) -> Result<Self, TerError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| TerError::io("read trans corpus", e))?;
        Ok(Self::parse(&text))
    }

    fn push(&mut self, id: &str, text: &str) {
        match self.by_id.get(id) {
            Some(&idx) => self.segments[idx].texts.push(text.to_string()),
            None => {
                self.by_id.insert(id.to_string(), self.segments.len());
                self.segments.push(Segment {
                    id: id.to_string(),
                    texts: vec![text.to_string()],
                });
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Segment> {
        self.by_id.get(id).map(|&idx| &self.segments[idx])
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Splits `text (id)` into its text and id, both trimmed.
fn split_trans_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end();
    let body = line.strip_suffix(')')?;
    let open = body.rfind('(')?;
    let id = &body[open + 1..];
    if id.is_empty() || id.contains(')') {
        return None;
    }
    Some((body[..open].trim(), id))
}

/// Splits a hypothesis id of the form `base:rank` (n-best lists).
pub fn split_rank(id: &str) -> (&str, Option<&str>) {
    match id.rsplit_once(':') {
        Some((base, rank)) if !rank.contains(' ') => (base.trim_start(), Some(rank)),
        _ => (id, None),
    }
}

/// Parses whitespace-separated `start:end` pairs.
pub fn parse_spans(text: &str, line: usize) -> Result<Vec<Span>, TerError> {
    text.split_whitespace()
        .map(|pair| {
            let (start, end) = pair
                .split_once(':')
                .ok_or_else(|| TerError::parse("span file", line, format!("bad span {pair:?}")))?;
            let parse = |v: &str| {
                v.parse::<i64>().map_err(|e| {
                    TerError::parse("span file", line, format!("bad span bound {v:?}: {e}"))
                })
            };
            Ok(Span::new(parse(start)?, parse(end)?))
        })
        .collect()
}

/// Loads one span list per segment id from a trans-format file.
pub fn parse_span_file(text: &str) -> Result<HashMap<String, Vec<Span>>, TerError> {
    let mut spans = HashMap::new();
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((body, id)) = split_trans_line(line) else {
            tracing::warn!(line = line_no + 1, content = line, "invalid span line");
            continue;
        };
        let parsed = parse_spans(body, line_no + 1)?;
        if spans.insert(id.to_string(), parsed).is_some() {
            return Err(TerError::parse(
                "span file",
                line_no + 1,
                format!("duplicate spans for segment {id:?}; spans need a single reference"),
            ));
        }
    }
    Ok(spans)
}

pub fn load_span_file(path: &Path) -> Result<HashMap<String, Vec<Span>>, TerError> {
    let text = std::fs::read_to_string(path).map_err(|e| TerError::io("read span file", e))?;
    parse_span_file(&text)
}

/// One hypothesis and the reference it is scored against.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPair {
    /// Hypothesis id, rank suffix included.
    pub id: String,
    pub hypothesis: String,
    pub reference: String,
    pub spans: Option<SpanConstraint>,
    /// Score denominator for this segment in place of the reference length.
    pub ref_len: Option<f64>,
}

/// Pairs every hypothesis segment with its reference.
///
/// References are looked up by the hypothesis id with any `:rank` suffix
/// removed. Only the first reference of a segment is used. A hypothesis
/// without a reference is an error.
pub fn pair_segments(
    hypotheses: &TransCorpus,
    references: &TransCorpus,
) -> Result<Vec<SegmentPair>, TerError> {
    let mut pairs = Vec::with_capacity(hypotheses.len());
    for segment in hypotheses.segments() {
        let (base, _) = split_rank(&segment.id);
        let reference = references
            .get(base)
            .or_else(|| references.get(&segment.id))
            .ok_or_else(|| {
                TerError::invalid_input(format!("no reference for segment {:?}", segment.id))
            })?;
        if segment.texts.len() > 1 {
            tracing::warn!(
                id = %segment.id,
                count = segment.texts.len(),
                "repeated hypothesis id; scoring the first line"
            );
        }
        if reference.texts.len() > 1 {
            tracing::warn!(
                id = %reference.id,
                count = reference.texts.len(),
                "multiple references; scoring against the first"
            );
        }
        pairs.push(SegmentPair {
            id: segment.id.clone(),
            hypothesis: segment.texts[0].clone(),
            reference: reference.texts[0].clone(),
            spans: None,
            ref_len: None,
        });
    }
    Ok(pairs)
}

/// Mean token count over the lines of each segment in a reference-length
/// corpus.
pub fn mean_ref_lengths(corpus: &TransCorpus, tokenizer: &dyn Tokenizer) -> HashMap<String, f64> {
    corpus
        .segments()
        .iter()
        .map(|segment| {
            let total: usize = segment
                .texts
                .iter()
                .map(|text| tokenizer.tokenize(text).len())
                .sum();
            (segment.id.clone(), total as f64 / segment.texts.len() as f64)
        })
        .collect()
}

/// Sets each pair's denominator from `lengths`, keyed by segment id without
/// rank. Segments missing from `lengths` keep their reference length.
pub fn attach_ref_lengths(pairs: &mut [SegmentPair], lengths: &HashMap<String, f64>) {
    for pair in pairs {
        let (base, _) = split_rank(&pair.id);
        pair.ref_len = lengths
            .get(base)
            .or_else(|| lengths.get(&pair.id))
            .copied();
        if pair.ref_len.is_none() {
            tracing::warn!(id = %pair.id, "no reference length for segment; using the reference");
        }
    }
}

/// Attaches span constraints to each pair. Reference spans are keyed by the
/// segment id without rank, hypothesis spans by the full id.
pub fn attach_spans(
    pairs: &mut [SegmentPair],
    reference: &HashMap<String, Vec<Span>>,
    hypothesis: &HashMap<String, Vec<Span>>,
) -> Result<(), TerError> {
    for pair in pairs {
        let (base, _) = split_rank(&pair.id);
        let ref_spans = reference
            .get(base)
            .or_else(|| reference.get(&pair.id))
            .ok_or_else(|| {
                TerError::invalid_input(format!("no reference spans for segment {:?}", pair.id))
            })?;
        let hyp_spans = hypothesis.get(&pair.id).ok_or_else(|| {
            TerError::invalid_input(format!("no hypothesis spans for segment {:?}", pair.id))
        })?;
        pair.spans = Some(SpanConstraint::new(ref_spans.clone(), hyp_spans.clone()));
    }
    Ok(())
}

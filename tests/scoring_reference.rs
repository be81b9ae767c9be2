use std::path::PathBuf;

use tercom_rs::alignment::report::{build_report, Meta, SegmentReport};
use tercom_rs::corpus::{
    attach_ref_lengths, attach_spans, mean_ref_lengths, pair_segments, parse_span_file,
    TransCorpus,
};
use tercom_rs::{AlignmentOp, TerConfig, TerScorer, TerScorerBuilder};

struct Case {
    hyp: &'static str,
    reference: &'static str,
    edits: f64,
    shifts: usize,
    after_shift: &'static str,
}

const CASES: &[Case] = &[
    Case {
        hyp: "c d e a b",
        reference: "a b c d e",
        edits: 1.0,
        shifts: 1,
        after_shift: "a b c d e",
    },
    Case {
        hyp: "saw the man the dog",
        reference: "the dog saw the man",
        edits: 1.0,
        shifts: 1,
        after_shift: "the dog saw the man",
    },
    Case {
        hyp: "this is a test",
        reference: "this is test a",
        edits: 1.0,
        shifts: 1,
        after_shift: "this is test a",
    },
    Case {
        hyp: "a b c",
        reference: "x y z",
        edits: 3.0,
        shifts: 0,
        after_shift: "a b c",
    },
    Case {
        hyp: "the quick brown fox jumps",
        reference: "the brown quick fox jumped",
        edits: 2.0,
        shifts: 1,
        after_shift: "the brown quick fox jumps",
    },
];

fn default_scorer() -> TerScorer {
    TerScorerBuilder::new(TerConfig::default())
        .build()
        .expect("build should succeed")
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    std::fs::write(&path, contents).expect("write temp file");
    path
}

#[test]
fn reference_cases_match_expected_edits() {
    let scorer = default_scorer();
    for case in CASES {
        let result = scorer.score_text(case.hyp, case.reference);
        assert_eq!(result.num_edits, case.edits, "hyp {:?}", case.hyp);
        assert_eq!(result.num_shifts(), case.shifts, "hyp {:?}", case.hyp);
        assert_eq!(result.working.join(" "), case.after_shift, "hyp {:?}", case.hyp);
        let words = case.reference.split_whitespace().count() as f64;
        assert!((result.score() - case.edits / words).abs() < 1e-12);
    }
}

#[test]
fn substitution_after_shift_is_reported_in_path() {
    let result = default_scorer().score_text("the quick brown fox jumps", "the brown quick fox jumped");
    assert_eq!(
        result.path,
        vec![
            AlignmentOp::Match,
            AlignmentOp::Match,
            AlignmentOp::Match,
            AlignmentOp::Match,
            AlignmentOp::Substitute,
        ]
    );
    assert_eq!(result.substitutions(), 1);
}

#[test]
fn normalization_makes_punctuation_spacing_irrelevant() {
    let config = TerConfig {
        normalize: true,
        ..TerConfig::default()
    };
    let scorer = TerScorerBuilder::new(config)
        .build()
        .expect("build should succeed");
    let result = scorer.score_text("Hello , World!", "hello, world !");
    assert_eq!(result.num_edits, 0.0);

    let result = default_scorer().score_text("Hello , World!", "hello, world !");
    assert!(result.num_edits > 0.0);
}

#[test]
fn trans_files_score_end_to_end() {
    let hyp_path = temp_file(
        "tercom_rs_it_hyp.trans",
        "c d e a b (doc1-1)\nthe cat sat (doc1-2)\n\nthis is a test (doc1-3)\n",
    );
    let ref_path = temp_file(
        "tercom_rs_it_ref.trans",
        "a b c d e (doc1-1)\nthe cat sat on the mat (doc1-2)\nthis is test a (doc1-3)\n",
    );
    let hyps = TransCorpus::load(&hyp_path).expect("load hyp");
    let refs = TransCorpus::load(&ref_path).expect("load ref");
    let pairs = pair_segments(&hyps, &refs).expect("pair segments");
    assert_eq!(pairs.len(), 3);

    let scorer = default_scorer();
    let scores = scorer.score_corpus(&pairs).expect("score corpus");
    assert_eq!(scores.total_edits(), 5.0);
    assert_eq!(scores.total_words(), 15.0);
    assert!((scores.ter() - 1.0 / 3.0).abs() < 1e-12);

    let segments: Vec<SegmentReport> = scores
        .segments
        .iter()
        .map(|s| SegmentReport::from_result(&s.id, &s.result))
        .collect();
    let report = build_report(
        Meta {
            generated_at: "2026-01-01T00:00:00+00:00".to_string(),
            hypothesis_file: hyp_path.to_string_lossy().into_owned(),
            reference_file: ref_path.to_string_lossy().into_owned(),
            segment_count: segments.len(),
            config: scorer.config().clone(),
        },
        segments,
        scores.stats,
    );
    assert_eq!(report.totals.shifts, 2);
    assert_eq!(report.totals.deletions, 3);
    assert_eq!(report.stats.segments_scored, 3);

    let json = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(json["segments"][1]["summary"]["id"], "doc1-2");
    assert_eq!(json["segments"][1]["alignment"], "   DDD");
    assert_eq!(json["segments"][0]["shifts"][0]["words"][0], "a");

    let table = report.summary_table().to_string();
    assert!(table.contains("doc1-3"));
    assert!(table.lines().last().expect("total row").starts_with("TOTAL"));

    let _ = std::fs::remove_file(&hyp_path);
    let _ = std::fs::remove_file(&ref_path);
}

#[test]
fn span_files_constrain_corpus_scoring() {
    let hyps = TransCorpus::parse("b a (s1)\n");
    let refs = TransCorpus::parse("a b (s1)\n");
    let mut pairs = pair_segments(&hyps, &refs).expect("pair segments");

    // Tokens may only pair within their own interval, so "a" and "b" stay
    // unmatched until the hypothesis is reordered.
    let ref_spans = parse_span_file("0:0 1:1 (s1)\n").expect("ref spans");
    let hyp_spans = parse_span_file("1:1 0:0 (s1)\n").expect("hyp spans");
    attach_spans(&mut pairs, &ref_spans, &hyp_spans).expect("attach spans");

    let scores = default_scorer().score_corpus(&pairs).expect("score corpus");
    let result = &scores.segments[0].result;
    assert_eq!(result.num_edits, 1.0);
    assert_eq!(result.working, vec!["a", "b"]);
}

#[test]
fn ref_length_file_sets_each_denominator() {
    let hyps = TransCorpus::parse("a b (s1)\nx y (s2)\n");
    let refs = TransCorpus::parse("a b c (s1)\nx y (s2)\n");
    let lengths_corpus = TransCorpus::parse("a b c d (s1)\nA, b c (s1)\n");
    let scorer = default_scorer();

    let mut pairs = pair_segments(&hyps, &refs).expect("pair segments");
    let lengths = mean_ref_lengths(&lengths_corpus, scorer.tokenizer());
    attach_ref_lengths(&mut pairs, &lengths);
    assert_eq!(pairs[0].ref_len, Some(3.5));
    assert_eq!(pairs[1].ref_len, None);

    let scores = scorer.score_corpus(&pairs).expect("score corpus");
    assert_eq!(scores.segments[0].result.num_words, 3.5);
    assert_eq!(scores.segments[1].result.num_words, 2.0);
    assert!((scores.ter() - 1.0 / 5.5).abs() < 1e-12);
}

#[test]
fn missing_reference_is_an_error() {
    let hyps = TransCorpus::parse("a b (s1)\nc d (s2)\n");
    let refs = TransCorpus::parse("a b (s1)\n");
    let err = pair_segments(&hyps, &refs).unwrap_err();
    assert!(err.to_string().contains("s2"));
}

#[test]
fn empty_segments_are_scored() {
    let scorer = default_scorer();
    let result = scorer.score_text("", "one two");
    assert_eq!(result.deletions(), 2);
    assert_eq!(result.score(), 1.0);

    let result = scorer.score_text("one two", "");
    assert_eq!(result.insertions(), 2);
    assert_eq!(result.score(), 1.0);

    let config = TerConfig {
        ref_len: Some(4.0),
        ..TerConfig::default()
    };
    let scorer = TerScorerBuilder::new(config)
        .build()
        .expect("build should succeed");
    let result = scorer.score_text("one two", "");
    assert!((result.score() - 0.5).abs() < 1e-12);
}

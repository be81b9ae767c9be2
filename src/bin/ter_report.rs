use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tercom_rs::alignment::report::{build_report, Meta, SegmentReport};
use tercom_rs::corpus::{
    attach_ref_lengths, attach_spans, load_span_file, mean_ref_lengths, pair_segments,
    TransCorpus,
};
use tercom_rs::{TerConfig, TerScorerBuilder};

#[derive(Debug, Parser)]
#[command(name = "ter_report")]
#[command(about = "Score hypothesis translations against references with TER")]
struct Args {
    /// Hypothesis file, one `text (id)` line per segment.
    #[arg(long, env = "TER_REPORT_HYP")]
    hyp: PathBuf,
    /// Reference file in the same format.
    #[arg(long = "ref", env = "TER_REPORT_REF")]
    reference: PathBuf,
    /// Write the full JSON report here.
    #[arg(long, env = "TER_REPORT_OUT")]
    out: Option<PathBuf>,
    /// Write the summary table here; printed to stdout when neither output is set.
    #[arg(long, env = "TER_REPORT_SUMMARY")]
    summary: Option<PathBuf>,
    /// JSON scoring config; flags below override its fields.
    #[arg(long, env = "TER_REPORT_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "TER_REPORT_BEAM_WIDTH")]
    beam_width: Option<usize>,
    #[arg(long, env = "TER_REPORT_MAX_SHIFT_SIZE")]
    max_shift_size: Option<usize>,
    #[arg(long, env = "TER_REPORT_MAX_SHIFT_DIST")]
    max_shift_dist: Option<usize>,
    #[arg(long, env = "TER_REPORT_MATCH_COST")]
    match_cost: Option<f64>,
    #[arg(long, env = "TER_REPORT_SUBSTITUTE_COST")]
    substitute_cost: Option<f64>,
    #[arg(long, env = "TER_REPORT_INSERT_COST")]
    insert_cost: Option<f64>,
    #[arg(long, env = "TER_REPORT_DELETE_COST")]
    delete_cost: Option<f64>,
    #[arg(long, env = "TER_REPORT_SHIFT_COST")]
    shift_cost: Option<f64>,
    /// Fixed denominator used instead of each reference length.
    #[arg(long, env = "TER_REPORT_REF_LEN")]
    ref_len: Option<f64>,
    /// Per-segment reference lengths: each segment's denominator is the mean
    /// token count of the lines sharing its id in this file.
    #[arg(long, env = "TER_REPORT_REF_LEN_FILE", conflicts_with = "ref_len")]
    ref_len_file: Option<PathBuf>,
    /// Stop evaluating shift candidates after this many per segment.
    #[arg(long, env = "TER_REPORT_CANDIDATE_BUDGET")]
    candidate_budget: Option<usize>,
    #[arg(long, env = "TER_REPORT_CASE_SENSITIVE", default_value_t = false)]
    case_sensitive: bool,
    #[arg(long, env = "TER_REPORT_NORMALIZE", default_value_t = false)]
    normalize: bool,
    #[arg(long, env = "TER_REPORT_NO_PUNCTUATION", default_value_t = false)]
    no_punctuation: bool,
    /// Reference span file; requires --hyp-spans.
    #[arg(long, env = "TER_REPORT_REF_SPANS", requires = "hyp_spans")]
    ref_spans: Option<PathBuf>,
    /// Hypothesis span file; requires --ref-spans.
    #[arg(long, env = "TER_REPORT_HYP_SPANS", requires = "ref_spans")]
    hyp_spans: Option<PathBuf>,
}

impl Args {
    fn scoring_config(&self) -> Result<TerConfig, String> {
        let mut config = match &self.config {
            Some(path) => TerConfig::load(path).map_err(|e| e.to_string())?,
            None => TerConfig::default(),
        };
        if let Some(v) = self.beam_width {
            config.beam_width = v;
        }
        if let Some(v) = self.max_shift_size {
            config.max_shift_size = v;
        }
        if let Some(v) = self.max_shift_dist {
            config.max_shift_dist = v;
        }
        if let Some(v) = self.match_cost {
            config.match_cost = v;
        }
        if let Some(v) = self.substitute_cost {
            config.substitute_cost = v;
        }
        if let Some(v) = self.insert_cost {
            config.insert_cost = v;
        }
        if let Some(v) = self.delete_cost {
            config.delete_cost = v;
        }
        if let Some(v) = self.shift_cost {
            config.shift_cost = v;
        }
        if self.ref_len.is_some() {
            config.ref_len = self.ref_len;
        }
        if self.candidate_budget.is_some() {
            config.candidate_budget = self.candidate_budget;
        }
        config.case_sensitive |= self.case_sensitive;
        config.normalize |= self.normalize;
        config.strip_punctuation |= self.no_punctuation;
        Ok(config)
    }
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let config = args.scoring_config()?;
    let scorer = TerScorerBuilder::new(config)
        .build()
        .map_err(|e| e.to_string())?;

    let hypotheses = TransCorpus::load(&args.hyp).map_err(|e| e.to_string())?;
    let references = TransCorpus::load(&args.reference).map_err(|e| e.to_string())?;
    let mut pairs = pair_segments(&hypotheses, &references).map_err(|e| e.to_string())?;
    if pairs.is_empty() {
        return Err("No hypothesis segments to score.".to_string());
    }
    if let Some(path) = &args.ref_len_file {
        let lengths_corpus = TransCorpus::load(path).map_err(|e| e.to_string())?;
        let lengths = mean_ref_lengths(&lengths_corpus, scorer.tokenizer());
        attach_ref_lengths(&mut pairs, &lengths);
    }
    if let (Some(ref_path), Some(hyp_path)) = (&args.ref_spans, &args.hyp_spans) {
        let ref_spans = load_span_file(ref_path).map_err(|e| e.to_string())?;
        let hyp_spans = load_span_file(hyp_path).map_err(|e| e.to_string())?;
        attach_spans(&mut pairs, &ref_spans, &hyp_spans).map_err(|e| e.to_string())?;
    }
    tracing::info!(
        segments = pairs.len(),
        hypotheses = hypotheses.len(),
        references = references.len(),
        "scoring corpus"
    );

    let progress = ProgressBar::new(pairs.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("scoring...");
    let scores = scorer
        .score_corpus_with(&pairs, |_| progress.inc(1))
        .map_err(|e| e.to_string())?;
    progress.finish_with_message("scoring complete");

    let segments = scores
        .segments
        .iter()
        .map(|s| SegmentReport::from_result(&s.id, &s.result))
        .collect::<Vec<_>>();
    let report = build_report(
        Meta {
            generated_at: Utc::now().to_rfc3339(),
            hypothesis_file: args.hyp.to_string_lossy().into_owned(),
            reference_file: args.reference.to_string_lossy().into_owned(),
            segment_count: segments.len(),
            config: scorer.config().clone(),
        },
        segments,
        scores.stats,
    );

    if let Some(out_path) = &args.out {
        report.write_json(out_path).map_err(|e| e.to_string())?;
        println!("{}", out_path.display());
    }
    match &args.summary {
        Some(summary_path) => {
            report.write_summary(summary_path).map_err(|e| e.to_string())?;
            println!("{}", summary_path.display());
        }
        None if args.out.is_none() => print!("{}", report.summary_table()),
        None => {}
    }

    println!(
        "Total TER: {:.4} ({:.2}/{:.2})",
        report.totals.ter(),
        report.totals.num_edits,
        report.totals.num_words
    );
    println!(
        "search: aligner_calls={} shifts_considered={} rounds={}",
        report.stats.aligner_calls, report.stats.shifts_considered, report.stats.rounds
    );
    Ok(())
}

pub mod alignment;
pub mod config;
pub mod corpus;
pub mod error;
pub mod pipeline;
pub mod types;

pub use alignment::cost::{CostModel, UniformCost};
pub use alignment::search::{score, ScoringContext, SearchParams};
pub use config::TerConfig;
pub use error::TerError;
pub use pipeline::builder::TerScorerBuilder;
pub use pipeline::runtime::{CorpusScores, ScoredSegment, TerScorer};
pub use pipeline::traits::Tokenizer;
pub use types::{AlignmentOp, AlignmentResult, Shift, Span, SpanConstraint};

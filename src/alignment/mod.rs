pub mod beam;
pub mod cost;
pub mod match_index;
pub mod report;
pub mod search;
pub mod shift;
pub mod tokenization;

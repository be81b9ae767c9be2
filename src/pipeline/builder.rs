use crate::alignment::cost::CostModel;
use crate::config::TerConfig;
use crate::error::TerError;
use crate::pipeline::defaults::TercomTokenizer;
use crate::pipeline::runtime::{TerScorer, TerScorerParts};
use crate::pipeline::traits::Tokenizer;

pub struct TerScorerBuilder {
    config: TerConfig,
    tokenizer: Option<Box<dyn Tokenizer>>,
    cost_model: Option<Box<dyn CostModel<String>>>,
}

impl TerScorerBuilder {
    pub fn new(config: TerConfig) -> Self {
        Self {
            config,
            tokenizer: None,
            cost_model: None,
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// Replaces the uniform costs from the config.
    pub fn with_cost_model(mut self, cost_model: Box<dyn CostModel<String>>) -> Self {
        self.cost_model = Some(cost_model);
        self
    }

    pub fn build(self) -> Result<TerScorer, TerError> {
        self.config.validate()?;
        if self.config.beam_width == 0 {
            tracing::warn!("beam width 0 restricts alignment to the diagonal band edges");
        }
        let params = self.config.search_params();
        let normalize = self.config.normalize_options();
        let default_costs = self.config.cost_model();

        Ok(TerScorer::from_parts(TerScorerParts {
            config: self.config,
            params,
            tokenizer: self
                .tokenizer
                .unwrap_or_else(|| Box::new(TercomTokenizer::new(normalize))),
            cost_model: self
                .cost_model
                .unwrap_or_else(|| Box::new(default_costs)),
        }))
    }
}

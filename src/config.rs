use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alignment::beam::DEFAULT_BEAM_WIDTH;
use crate::alignment::cost::UniformCost;
use crate::alignment::search::{SearchParams, DEFAULT_MAX_SHIFT_DIST, DEFAULT_MAX_SHIFT_SIZE};
use crate::alignment::tokenization::NormalizeOptions;
use crate::error::TerError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerConfig {
    pub beam_width: usize,
    pub max_shift_size: usize,
    pub max_shift_dist: usize,
    pub match_cost: f64,
    pub substitute_cost: f64,
    pub insert_cost: f64,
    pub delete_cost: f64,
    pub shift_cost: f64,
    /// Fixed score denominator, used instead of the reference length.
    pub ref_len: Option<f64>,
    pub candidate_budget: Option<usize>,
    pub case_sensitive: bool,
    pub normalize: bool,
    pub strip_punctuation: bool,
}

impl Default for TerConfig {
    fn default() -> Self {
        let costs = UniformCost::default();
        Self {
            beam_width: DEFAULT_BEAM_WIDTH,
            max_shift_size: DEFAULT_MAX_SHIFT_SIZE,
            max_shift_dist: DEFAULT_MAX_SHIFT_DIST,
            match_cost: costs.match_cost,
            substitute_cost: costs.substitute_cost,
            insert_cost: costs.insert_cost,
            delete_cost: costs.delete_cost,
            shift_cost: costs.shift_cost,
            ref_len: None,
            candidate_budget: None,
            case_sensitive: false,
            normalize: false,
            strip_punctuation: false,
        }
    }
}

impl TerConfig {
    pub fn load(path: &Path) -> Result<Self, TerError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| TerError::io("read scoring config", e))?;
        serde_json::from_str(&data).map_err(|e| TerError::json("parse scoring config", e))
    }

    /// Rejects costs that are not finite numbers.
    ///
    /// Costs outside `[0, 1]` are accepted with a warning: the engine stays
    /// well-defined, but its pruning bounds no longer guarantee the best
    /// alignment.
    pub fn validate(&self) -> Result<(), TerError> {
        for (name, value) in self.named_costs() {
            if !value.is_finite() {
                return Err(TerError::invalid_config(format!(
                    "{name} must be a finite number, got {value}"
                )));
            }
            if !(0.0..=1.0).contains(&value) {
                tracing::warn!(
                    cost = name,
                    value,
                    "edit cost outside [0, 1]; search pruning may miss better alignments"
                );
            }
        }
        if let Some(len) = self.ref_len {
            if !len.is_finite() {
                return Err(TerError::invalid_config(format!(
                    "ref_len must be a finite number, got {len}"
                )));
            }
        }
        Ok(())
    }

    fn named_costs(&self) -> [(&'static str, f64); 5] {
        [
            ("match_cost", self.match_cost),
            ("substitute_cost", self.substitute_cost),
            ("insert_cost", self.insert_cost),
            ("delete_cost", self.delete_cost),
            ("shift_cost", self.shift_cost),
        ]
    }

    pub fn cost_model(&self) -> UniformCost {
        UniformCost {
            match_cost: self.match_cost,
            substitute_cost: self.substitute_cost,
            insert_cost: self.insert_cost,
            delete_cost: self.delete_cost,
            shift_cost: self.shift_cost,
        }
    }

    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            beam_width: self.beam_width,
            max_shift_size: self.max_shift_size,
            max_shift_dist: self.max_shift_dist,
            ref_len: self.ref_len,
            candidate_budget: self.candidate_budget,
        }
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            case_sensitive: self.case_sensitive,
            normalize: self.normalize,
            strip_punctuation: self.strip_punctuation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ter_config_default() {
        let config = TerConfig::default();
        assert_eq!(config.beam_width, 20);
        assert_eq!(config.max_shift_size, 10);
        assert_eq!(config.max_shift_dist, 50);
        assert_eq!(config.match_cost, 0.0);
        assert_eq!(config.shift_cost, 1.0);
        assert!(config.ref_len.is_none());
        assert!(!config.case_sensitive);
        assert!(config.validate().is_ok());
        assert_eq!(config.search_params(), SearchParams::default());
        assert_eq!(config.cost_model(), UniformCost::default());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{ "beam_width": 5, "shift_cost": 0.5, "normalize": true }"#;
        let config: TerConfig = serde_json::from_str(json).expect("valid config json");
        assert_eq!(config.beam_width, 5);
        assert_eq!(config.shift_cost, 0.5);
        assert!(config.normalize);
        assert_eq!(config.max_shift_dist, 50);
        assert_eq!(config.insert_cost, 1.0);
    }

    #[test]
    fn non_finite_cost_is_rejected() {
        let config = TerConfig {
            delete_cost: f64::NAN,
            ..TerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("delete_cost"));
    }

    #[test]
    fn out_of_range_cost_is_only_a_warning() {
        let config = TerConfig {
            substitute_cost: 2.0,
            ..TerConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_reads_json_file() {
        let path = std::env::temp_dir().join("tercom_rs_config_load.json");
        std::fs::write(&path, r#"{ "max_shift_size": 3, "case_sensitive": true }"#)
            .expect("write config");
        let config = TerConfig::load(&path).expect("load config");
        assert_eq!(config.max_shift_size, 3);
        assert!(config.case_sensitive);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_missing_file_fails() {
        let result = TerConfig::load(Path::new("/nonexistent/tercom.json"));
        assert!(matches!(result, Err(TerError::Io { .. })));
    }
}

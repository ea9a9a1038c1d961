use serde::Deserialize;

use crate::ai::eval::{EvalWeights, Evaluator};
use crate::error::GameError;

pub const DEFAULT_ADVANCED_DEPTH: u8 = 4;
pub const MAX_SEARCH_DEPTH: u8 = 8;
pub const DEFAULT_WEAKEST_POOL: usize = 3;
pub const DEFAULT_AI_DELAY_MS: u32 = 1000;
/// Largest magnitude allowed for any evaluation weight. With at most 64
/// stones, 4 corners, 64 stable stones and 64 moves per side the weighted
/// sum stays far inside `i32`.
pub const MAX_EVAL_WEIGHT: u32 = 1_000_000;

/// Which static evaluation the search tier scores leaves with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorKind {
    StoneDifferential,
    #[default]
    Positional,
}

/// Engine tuning handed in by the page. Every field falls back to its default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: EvalWeights,
    /// Plies searched by the advanced tier.
    pub advanced_depth: u8,
    pub advanced_evaluator: EvaluatorKind,
    /// How many of the least-flipping moves the beginner tier picks from.
    pub weakest_pool: usize,
    /// Pause the host waits before asking for a computer move.
    pub ai_delay_ms: u32,
    /// Fixed RNG seed; the clock seeds the generator when absent.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: EvalWeights::default(),
            advanced_depth: DEFAULT_ADVANCED_DEPTH,
            advanced_evaluator: EvaluatorKind::default(),
            weakest_pool: DEFAULT_WEAKEST_POOL,
            ai_delay_ms: DEFAULT_AI_DELAY_MS,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.advanced_depth == 0 {
            return Err(GameError::InvalidConfig(
                "advanced_depth must be at least 1".to_string(),
            ));
        }
        if self.advanced_depth > MAX_SEARCH_DEPTH {
            return Err(GameError::InvalidConfig(format!(
                "advanced_depth must be at most {MAX_SEARCH_DEPTH}, got {}",
                self.advanced_depth
            )));
        }
        let weights = [
            ("stone", self.weights.stone),
            ("corner", self.weights.corner),
            ("stable", self.weights.stable),
            ("mobility", self.weights.mobility),
        ];
        if let Some((name, weight)) = weights
            .into_iter()
            .find(|&(_, weight)| weight.unsigned_abs() > MAX_EVAL_WEIGHT)
        {
            return Err(GameError::InvalidConfig(format!(
                "{name} weight must be within ±{MAX_EVAL_WEIGHT}, got {weight}"
            )));
        }
        if self.weakest_pool == 0 {
            return Err(GameError::InvalidConfig(
                "weakest_pool must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The evaluator the advanced tier searches with.
    pub fn advanced_evaluator(&self) -> Evaluator {
        match self.advanced_evaluator {
            EvaluatorKind::StoneDifferential => Evaluator::StoneDifferential,
            EvaluatorKind::Positional => Evaluator::Positional(self.weights),
        }
    }
}

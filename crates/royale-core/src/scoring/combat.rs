use super::{Scorer, ScoringContext};
use crate::model::CardCandidate;
use crate::model::role;
use crate::providers::CombatStatsProvider;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Default 0.4.
    pub dps_weight: Option<f64>,
    /// Default 0.4.
    pub hp_weight: Option<f64>,
    /// Default 0.2.
    pub role_weight: Option<f64>,
    /// DPS per elixir that counts as fully efficient. Default 50.
    pub dps_threshold: Option<f64>,
    /// HP per elixir that counts as fully efficient. Default 400.
    pub hp_threshold: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatWeights {
    pub dps: f64,
    pub hp: f64,
    pub role: f64,
}

impl Default for CombatWeights {
    fn default() -> Self {
        Self {
            dps: 0.4,
            hp: 0.4,
            role: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatThresholds {
    pub dps: f64,
    pub hp: f64,
}

impl Default for CombatThresholds {
    fn default() -> Self {
        Self {
            dps: 50.0,
            hp: 400.0,
        }
    }
}

struct CombatState {
    provider: Option<Arc<dyn CombatStatsProvider>>,
    weights: CombatWeights,
    thresholds: CombatThresholds,
}

/// Scores cards on per-elixir combat efficiency and role fit. Output in `[0, 1]`.
pub struct CombatStatsScorer {
    state: RwLock<CombatState>,
}

impl Default for CombatStatsScorer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CombatStatsScorer {
    pub fn new(provider: Option<Arc<dyn CombatStatsProvider>>) -> Self {
        Self::with_config(provider, &CombatConfig::default())
    }

    pub fn with_config(
        provider: Option<Arc<dyn CombatStatsProvider>>,
        config: &CombatConfig,
    ) -> Self {
        let w = CombatWeights::default();
        let t = CombatThresholds::default();
        Self {
            state: RwLock::new(CombatState {
                provider,
                weights: CombatWeights {
                    dps: config.dps_weight.unwrap_or(w.dps),
                    hp: config.hp_weight.unwrap_or(w.hp),
                    role: config.role_weight.unwrap_or(w.role),
                },
                thresholds: CombatThresholds {
                    dps: config.dps_threshold.unwrap_or(t.dps),
                    hp: config.hp_threshold.unwrap_or(t.hp),
                },
            }),
        }
    }

    pub fn set_provider(&self, provider: Option<Arc<dyn CombatStatsProvider>>) {
        self.state.write().provider = provider;
    }

    pub fn provider(&self) -> Option<Arc<dyn CombatStatsProvider>> {
        self.state.read().provider.clone()
    }

    pub fn set_weights(&self, weights: CombatWeights) {
        self.state.write().weights = weights;
    }

    pub fn weights(&self) -> CombatWeights {
        self.state.read().weights
    }

    pub fn set_thresholds(&self, thresholds: CombatThresholds) {
        self.state.write().thresholds = thresholds;
    }

    pub fn thresholds(&self) -> CombatThresholds {
        self.state.read().thresholds
    }
}

impl Scorer for CombatStatsScorer {
    fn score(&self, candidate: &CardCandidate, ctx: &ScoringContext<'_>) -> f64 {
        let (default_provider, weights, thresholds) = {
            let state = self.state.read();
            (state.provider.clone(), state.weights, state.thresholds)
        };
        let Some(provider) = ctx.combat_stats.or(default_provider.as_deref()) else {
            return 0.0;
        };
        let Some(stats) = provider.stats(&candidate.name) else {
            return 0.0;
        };

        let dps = normalize(stats.dps_per_elixir(candidate.elixir), thresholds.dps);
        let hp = normalize(stats.hp_per_elixir(candidate.elixir), thresholds.hp);
        let role_fit = stats.role_effectiveness(role::stats_key(candidate.role));

        (dps * weights.dps + hp * weights.hp + role_fit * weights.role).clamp(0.0, 1.0)
    }
}

fn normalize(value: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 {
        return 0.0;
    }
    (value / threshold).min(1.0)
}

use super::{Scorer, ScoringContext};
use crate::model::CardCandidate;
use crate::providers::SynergyProvider;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_SYNERGY_WEIGHT: f64 = 0.15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynergyConfig {
    /// Multiplier applied to the mean positive synergy. Default 0.15.
    pub weight: Option<f64>,
}

struct SynergyState {
    provider: Option<Arc<dyn SynergyProvider>>,
    weight: f64,
}

/// Rewards candidates that pair well with cards already in the deck.
pub struct SynergyScorer {
    state: RwLock<SynergyState>,
}

impl Default for SynergyScorer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SynergyScorer {
    pub fn new(provider: Option<Arc<dyn SynergyProvider>>) -> Self {
        Self::with_config(provider, &SynergyConfig::default())
    }

    pub fn with_config(provider: Option<Arc<dyn SynergyProvider>>, config: &SynergyConfig) -> Self {
        Self {
            state: RwLock::new(SynergyState {
                provider,
                weight: config.weight.unwrap_or(DEFAULT_SYNERGY_WEIGHT),
            }),
        }
    }

    pub fn set_provider(&self, provider: Option<Arc<dyn SynergyProvider>>) {
        self.state.write().provider = provider;
    }

    pub fn provider(&self) -> Option<Arc<dyn SynergyProvider>> {
        self.state.read().provider.clone()
    }

    pub fn set_weight(&self, weight: f64) {
        self.state.write().weight = weight;
    }

    pub fn weight(&self) -> f64 {
        self.state.read().weight
    }

    /// Synergy of `name` with `deck` using this scorer's own provider.
    pub fn synergy_with_deck(&self, name: &str, deck: &[CardCandidate]) -> f64 {
        let (provider, weight) = {
            let state = self.state.read();
            (state.provider.clone(), state.weight)
        };
        match provider {
            Some(provider) => weighted_mean(provider.as_ref(), name, deck, weight),
            None => 0.0,
        }
    }
}

impl Scorer for SynergyScorer {
    fn score(&self, candidate: &CardCandidate, ctx: &ScoringContext<'_>) -> f64 {
        if ctx.current_deck.is_empty() {
            return 0.0;
        }
        let (default_provider, weight) = {
            let state = self.state.read();
            (state.provider.clone(), state.weight)
        };
        match ctx.synergy.or(default_provider.as_deref()) {
            Some(provider) => weighted_mean(provider, &candidate.name, ctx.current_deck, weight),
            None => 0.0,
        }
    }
}

fn weighted_mean(
    provider: &dyn SynergyProvider,
    name: &str,
    deck: &[CardCandidate],
    weight: f64,
) -> f64 {
    let (sum, count) = deck
        .iter()
        .map(|card| provider.synergy(name, &card.name))
        .filter(|&s| s > 0.0)
        .fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));
    if count == 0 {
        return 0.0;
    }
    sum / count as f64 * weight
}

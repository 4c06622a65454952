use super::{Scorer, ScoringContext};
use crate::model::CardCandidate;
use parking_lot::RwLock;
use std::sync::Arc;

/// A scorer paired with its non-negative weight.
#[derive(Clone)]
pub struct WeightedScorer {
    pub scorer: Option<Arc<dyn Scorer>>,
    pub weight: f64,
}

impl WeightedScorer {
    pub fn new(scorer: Arc<dyn Scorer>, weight: f64) -> Self {
        Self {
            scorer: Some(scorer),
            weight: sanitize_weight(weight),
        }
    }
}

impl std::fmt::Debug for WeightedScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedScorer")
            .field("scorer", &self.scorer.is_some())
            .field("weight", &self.weight)
            .finish()
    }
}

fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight >= 0.0 {
        weight
    } else {
        tracing::warn!(weight, "invalid scorer weight clamped to 0");
        0.0
    }
}

/// Weighted sum of child scorers. Negative child scores are clamped to zero.
pub struct CompositeScorer {
    scorers: RwLock<Vec<WeightedScorer>>,
    normalize: bool,
}

impl Default for CompositeScorer {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl CompositeScorer {
    /// Composite with weight normalization enabled.
    pub fn new(scorers: Vec<WeightedScorer>) -> Self {
        Self::with_normalization(scorers, true)
    }

    pub fn with_normalization(scorers: Vec<WeightedScorer>, normalize: bool) -> Self {
        let scorers = scorers
            .into_iter()
            .map(|ws| WeightedScorer {
                weight: sanitize_weight(ws.weight),
                ..ws
            })
            .collect();
        Self {
            scorers: RwLock::new(scorers),
            normalize,
        }
    }

    pub fn is_normalized(&self) -> bool {
        self.normalize
    }

    pub fn len(&self) -> usize {
        self.scorers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scorers.read().is_empty()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.scorers.read().iter().map(|ws| ws.weight).collect()
    }

    pub fn add_scorer(&self, scorer: Arc<dyn Scorer>, weight: f64) -> &Self {
        self.scorers.write().push(WeightedScorer::new(scorer, weight));
        self
    }

    /// Out-of-range indices are ignored.
    pub fn remove_scorer(&self, index: usize) -> &Self {
        let mut scorers = self.scorers.write();
        if index < scorers.len() {
            scorers.remove(index);
        }
        drop(scorers);
        self
    }

    /// Out-of-range indices are ignored.
    pub fn set_weight(&self, index: usize, weight: f64) -> &Self {
        let weight = sanitize_weight(weight);
        if let Some(ws) = self.scorers.write().get_mut(index) {
            ws.weight = weight;
        }
        self
    }
}

impl Scorer for CompositeScorer {
    fn score(&self, candidate: &CardCandidate, ctx: &ScoringContext<'_>) -> f64 {
        let scorers = self.scorers.read().clone();
        if scorers.is_empty() {
            return 0.0;
        }
        let total_weight: f64 = scorers.iter().map(|ws| ws.weight).sum();
        let normalize = self.normalize && total_weight > 0.0;

        scorers
            .iter()
            .filter_map(|ws| ws.scorer.as_ref().map(|scorer| (scorer, ws.weight)))
            .map(|(scorer, weight)| {
                let weight = if normalize {
                    weight / total_weight
                } else {
                    weight
                };
                scorer.score(candidate, ctx).max(0.0) * weight
            })
            .sum()
    }
}

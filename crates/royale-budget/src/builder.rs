use royale_core::model::{
    CardCandidate, CardDetail, CardLevels, CardRole, DECK_SIZE, DeckRecommendation,
};
use royale_core::providers::{CombatStatsProvider, LevelCurve, SynergyProvider};
use royale_core::scoring::{Scorer, ScoringContext};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{Level, event};

/// Assembles a scored deck from a player's collection.
pub trait DeckBuilder: Send + Sync {
    fn build_deck(&self, levels: &CardLevels) -> Result<DeckRecommendation, BuildError>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("need at least {required} cards to build a deck, found {available}")]
    InsufficientCards { available: usize, required: usize },
}

const DEFAULT_EVOLUTION_SLOTS: usize = 2;
/// Score lost per elixir outside the strategy window.
const ELIXIR_WINDOW_PENALTY: f64 = 0.15;

/// Picks the highest scoring card one slot at a time, re-scoring the pool
/// against the partial deck so synergy can steer later picks.
pub struct GreedyDeckBuilder {
    scorer: Arc<dyn Scorer>,
    level_curve: Option<Arc<dyn LevelCurve>>,
    combat_stats: Option<Arc<dyn CombatStatsProvider>>,
    synergy: Option<Arc<dyn SynergyProvider>>,
    unlocked_evolutions: HashSet<String>,
    role_multipliers: HashMap<CardRole, f64>,
    target_elixir: Option<(f64, f64)>,
    evolution_slot_limit: usize,
}

impl GreedyDeckBuilder {
    pub fn new(scorer: Arc<dyn Scorer>) -> Self {
        Self {
            scorer,
            level_curve: None,
            combat_stats: None,
            synergy: None,
            unlocked_evolutions: HashSet::new(),
            role_multipliers: HashMap::new(),
            target_elixir: None,
            evolution_slot_limit: DEFAULT_EVOLUTION_SLOTS,
        }
    }

    pub fn with_level_curve(mut self, curve: Arc<dyn LevelCurve>) -> Self {
        self.level_curve = Some(curve);
        self
    }

    pub fn with_combat_stats(mut self, stats: Arc<dyn CombatStatsProvider>) -> Self {
        self.combat_stats = Some(stats);
        self
    }

    pub fn with_synergy(mut self, synergy: Arc<dyn SynergyProvider>) -> Self {
        self.synergy = Some(synergy);
        self
    }

    pub fn with_unlocked_evolutions(mut self, unlocked: HashSet<String>) -> Self {
        self.unlocked_evolutions = unlocked;
        self
    }

    pub fn with_role_multipliers(mut self, multipliers: HashMap<CardRole, f64>) -> Self {
        self.role_multipliers = multipliers;
        self
    }

    pub fn with_target_elixir(mut self, min: f64, max: f64) -> Self {
        self.target_elixir = Some((min, max));
        self
    }

    pub fn with_evolution_slot_limit(mut self, limit: usize) -> Self {
        self.evolution_slot_limit = limit;
        self
    }

    fn context<'a>(&'a self, current: &'a [CardCandidate]) -> ScoringContext<'a> {
        let mut ctx = ScoringContext::new()
            .with_current_deck(current)
            .with_unlocked_evolutions(&self.unlocked_evolutions);
        if let Some(curve) = self.level_curve.as_deref() {
            ctx = ctx.with_level_curve(curve);
        }
        if let Some(stats) = self.combat_stats.as_deref() {
            ctx = ctx.with_combat_stats(stats);
        }
        if let Some(synergy) = self.synergy.as_deref() {
            ctx = ctx.with_synergy(synergy);
        }
        if !self.role_multipliers.is_empty() {
            ctx = ctx.with_role_multipliers(&self.role_multipliers);
        }
        if let Some((min, max)) = self.target_elixir {
            ctx = ctx.with_target_elixir(min, max);
        }
        ctx
    }

    /// Composite score scaled by the strategy's role multiplier and penalized
    /// outside the elixir window. Never negative.
    fn strategy_score(&self, candidate: &CardCandidate, ctx: &ScoringContext<'_>) -> f64 {
        let base = self.scorer.score(candidate, ctx) * ctx.role_multiplier(candidate.role);
        let penalty = match ctx.target_elixir {
            Some((min, max)) => {
                let elixir = f64::from(candidate.elixir);
                let distance = if elixir < min {
                    min - elixir
                } else if elixir > max {
                    elixir - max
                } else {
                    0.0
                };
                distance * ELIXIR_WINDOW_PENALTY
            }
            None => 0.0,
        };
        (base - penalty).max(0.0)
    }

    fn evolution_slots(&self, cards: &[CardDetail]) -> Vec<String> {
        let mut evolved: Vec<&CardDetail> = cards
            .iter()
            .filter(|card| {
                card.evolution_level > 0 && self.unlocked_evolutions.contains(&card.name)
            })
            .collect();
        evolved.sort_by(|a, b| b.score.total_cmp(&a.score));
        evolved
            .into_iter()
            .take(self.evolution_slot_limit)
            .map(|card| card.name.clone())
            .collect()
    }
}

impl DeckBuilder for GreedyDeckBuilder {
    fn build_deck(&self, levels: &CardLevels) -> Result<DeckRecommendation, BuildError> {
        if levels.len() < DECK_SIZE {
            return Err(BuildError::InsufficientCards {
                available: levels.len(),
                required: DECK_SIZE,
            });
        }

        let mut pool: Vec<CardCandidate> = levels
            .iter()
            .map(|(name, data)| data.to_candidate(name))
            .collect();
        let mut chosen: Vec<CardCandidate> = Vec::with_capacity(DECK_SIZE);
        let mut scores: Vec<f64> = Vec::with_capacity(DECK_SIZE);

        while chosen.len() < DECK_SIZE {
            let ctx = self.context(&chosen);
            let mut best: Option<(usize, f64)> = None;
            for (idx, candidate) in pool.iter().enumerate() {
                let score = self.strategy_score(candidate, &ctx);
                if best.is_none_or(|(_, top)| score > top) {
                    best = Some((idx, score));
                }
            }
            let Some((idx, score)) = best else {
                break;
            };
            chosen.push(pool.remove(idx));
            scores.push(round_to_three(score));
        }

        let cards: Vec<CardDetail> = chosen
            .into_iter()
            .zip(scores)
            .map(|(card, score)| CardDetail {
                name: card.name,
                level: card.level,
                max_level: card.max_level,
                rarity: card.rarity,
                elixir: card.elixir,
                role: card.role,
                score,
                evolution_level: card.evolution_level,
                max_evolution_level: card.max_evolution_level,
            })
            .collect();

        let mut deck = DeckRecommendation::new(cards);
        deck.evolution_slots = self.evolution_slots(&deck.cards);
        if !deck.evolution_slots.is_empty() {
            let note = format!("Evolution slots: {}", deck.evolution_slots.join(", "));
            deck.add_note(note);
        }

        if tracing::enabled!(Level::DEBUG) {
            let names: Vec<&str> = deck.card_names().collect();
            event!(
                target: "royale_budget::deck_build",
                Level::DEBUG,
                pool = levels.len(),
                cards = ?names,
                average_elixir = deck.average_elixir,
                total_score = deck.total_score(),
                "deck built"
            );
        }
        Ok(deck)
    }
}

fn round_to_three(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

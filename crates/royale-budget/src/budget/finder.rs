use super::types::{
    BudgetCategory, BudgetError, BudgetFinderOptions, BudgetFinderResult, BudgetSummary,
    CardUpgradeDetail, DeckBudgetAnalysis, Roi, SortCriteria,
};
use crate::builder::DeckBuilder;
use royale_core::model::{
    CardLevelData, CardLevels, DECK_SIZE, DeckRecommendation, Rarity, average_level,
};
use royale_core::upgrade::{cards_needed_between, gold_needed_between};
use std::sync::Arc;
use tracing::{Level, event};

/// Target level assumed for cards whose max level is unknown.
const DEFAULT_TARGET_LEVEL: u32 = 14;
/// Decks below this many outstanding cards count as ready.
const READY_MAX_CARDS: u32 = 100;
const MEDIUM_MAX_CARDS: u32 = 5000;
const MEDIUM_MAX_UPGRADES: usize = 5;
const BEST_ROI_LIMIT: usize = 5;

const HIGH_LEVEL_MIN: u32 = 12;
const NEAR_MAX_MIN: u32 = 13;

/// Ranks decks by how much upgrade investment they need to become viable.
pub struct BudgetFinder {
    builder: Arc<dyn DeckBuilder>,
    options: BudgetFinderOptions,
}

impl BudgetFinder {
    pub fn new(builder: Arc<dyn DeckBuilder>, options: BudgetFinderOptions) -> Self {
        Self { builder, options }
    }

    pub fn options(&self) -> &BudgetFinderOptions {
        &self.options
    }

    /// Prices every under-levelled card in `deck`. Returns `None` for a missing
    /// or empty deck. Rarity falls back to the collection entry when the deck
    /// card does not carry one; cards with no cost data cost nothing.
    pub fn analyze_deck(
        &self,
        deck: Option<&DeckRecommendation>,
        card_levels: &CardLevels,
    ) -> Option<DeckBudgetAnalysis> {
        let deck = deck.filter(|deck| !deck.is_empty())?;

        let mut total_cards = 0u32;
        let mut total_gold = 0u64;
        let mut total_level = 0u64;
        let mut card_upgrades = Vec::new();

        for card in &deck.cards {
            let current = card.level;
            let target = if card.max_level == 0 {
                DEFAULT_TARGET_LEVEL
            } else {
                card.max_level
            };
            total_level += u64::from(current);
            if current >= target {
                continue;
            }

            let rarity = card
                .rarity
                .or_else(|| card_levels.get(&card.name).and_then(|data| data.rarity));
            let cards_needed = cards_needed_between(current, target, rarity);
            if cards_needed == 0 {
                continue;
            }
            let gold_needed = gold_needed_between(current, target, rarity);
            total_cards += cards_needed;
            total_gold += gold_needed;

            let role_bonus = card.role.map_or(0.0, |role| role.upgrade_priority_bonus());
            card_upgrades.push(CardUpgradeDetail {
                card_name: card.name.clone(),
                current_level: current,
                target_level: target,
                cards_needed,
                gold_needed,
                priority: upgrade_priority(cards_needed, card.level_ratio(), role_bonus),
            });
        }
        card_upgrades.sort_by(|a, b| b.priority.total_cmp(&a.priority));

        let count = deck.len() as f64;
        let current_score = deck
            .cards
            .iter()
            .map(|card| card.score * card.level_ratio())
            .sum::<f64>()
            / count;
        let projected_score = deck.total_score() / count;
        let average = total_level as f64 / count;

        let roi = if total_cards > 0 {
            Roi::Value((projected_score - current_score) / f64::from(total_cards) * 1000.0)
        } else if current_score > 0.0 {
            Roi::AlreadyOptimal
        } else {
            Roi::Value(0.0)
        };
        let cost_efficiency = if total_cards > 0 {
            current_score / (1.0 + f64::from(total_cards).log10())
        } else {
            current_score
        };

        let upgrades_needed = card_upgrades.len();
        let is_quick_win = self.is_quick_win(upgrades_needed, total_cards, average);
        let budget_category = self.categorize(upgrades_needed, total_cards, average);

        Some(DeckBudgetAnalysis {
            deck: deck.clone(),
            current_score,
            projected_score,
            total_cards_needed: total_cards,
            total_gold_needed: total_gold,
            roi,
            cost_efficiency,
            upgrades_needed,
            card_upgrades,
            is_quick_win,
            viability_gap: (self.options.target_average_level - average).max(0.0),
            budget_category,
        })
    }

    /// Builds the primary deck (plus variations when enabled), analyses each
    /// one and partitions, sorts and summarises the results.
    pub fn find_optimal_decks(
        &self,
        card_levels: &CardLevels,
    ) -> Result<BudgetFinderResult, BudgetError> {
        if card_levels.is_empty() {
            return Err(BudgetError::NoCardData);
        }

        let primary = self
            .builder
            .build_deck(card_levels)
            .map_err(BudgetError::PrimaryBuild)?;

        let mut result = BudgetFinderResult::default();
        result
            .all_decks
            .extend(self.analyze_deck(Some(&primary), card_levels));
        if self.options.include_variations {
            for variation in self.variations(card_levels) {
                result
                    .all_decks
                    .extend(self.analyze_deck(Some(&variation), card_levels));
            }
        }

        self.partition(&mut result);
        self.sort(&mut result.all_decks);
        if self.options.top_n > 0 {
            result.all_decks.truncate(self.options.top_n);
        }
        result.summary = summarize(&result, card_levels);

        if tracing::enabled!(Level::INFO) {
            event!(
                target: "royale_budget::budget_finder",
                Level::INFO,
                decks = result.summary.total_decks_analyzed,
                ready = result.summary.ready_deck_count,
                quick_wins = result.summary.quick_win_count,
                within_budget = result.within_budget.len(),
                best_roi = %result.summary.best_roi,
                sort_by = %self.options.sort_by,
                "budget analysis complete"
            );
        }
        Ok(result)
    }

    fn is_quick_win(&self, upgrades: usize, cards: u32, average: f64) -> bool {
        upgrades <= self.options.quick_win_max_upgrades
            && cards <= self.options.quick_win_max_cards
            && average >= self.options.target_average_level - 1.0
    }

    fn categorize(&self, upgrades: usize, cards: u32, average: f64) -> BudgetCategory {
        if average >= self.options.target_average_level && cards < READY_MAX_CARDS {
            BudgetCategory::Ready
        } else if self.is_quick_win(upgrades, cards, average) {
            BudgetCategory::QuickWin
        } else if cards <= MEDIUM_MAX_CARDS && upgrades <= MEDIUM_MAX_UPGRADES {
            BudgetCategory::MediumInvestment
        } else {
            BudgetCategory::LongTerm
        }
    }

    fn variations(&self, card_levels: &CardLevels) -> Vec<DeckRecommendation> {
        let strategies: [(&str, fn(&CardLevels) -> CardLevels); 3] = [
            ("High-level card priority variation", |levels| {
                filter_levels(levels, |data| data.level >= HIGH_LEVEL_MIN)
            }),
            ("Budget-friendly (Common/Rare focus)", |levels| {
                filter_levels(levels, |data| {
                    matches!(data.rarity, Some(Rarity::Common | Rarity::Rare))
                })
            }),
            ("Near-max cards only", |levels| {
                filter_levels(levels, |data| data.level >= NEAR_MAX_MIN)
            }),
        ];

        let mut variations = Vec::new();
        for (note, filter) in strategies {
            if variations.len() >= self.options.max_variations {
                break;
            }
            let filtered = filter(card_levels);
            if filtered.len() < DECK_SIZE {
                continue;
            }
            match self.builder.build_deck(&filtered) {
                Ok(mut deck) => {
                    deck.add_note(note);
                    variations.push(deck);
                }
                Err(err) => {
                    tracing::debug!(
                        target: "royale_budget::budget_finder",
                        variation = note,
                        error = %err,
                        "variation skipped"
                    );
                }
            }
        }
        variations
    }

    fn partition(&self, result: &mut BudgetFinderResult) {
        for analysis in &result.all_decks {
            let over_cards = self.options.max_cards_needed > 0
                && analysis.total_cards_needed > self.options.max_cards_needed;
            let over_gold = self.options.max_gold_needed > 0
                && analysis.total_gold_needed > self.options.max_gold_needed;
            if !over_cards && !over_gold {
                result.within_budget.push(analysis.clone());
            }

            match analysis.budget_category {
                BudgetCategory::Ready => result.ready_decks.push(analysis.clone()),
                BudgetCategory::QuickWin => result.quick_wins.push(analysis.clone()),
                BudgetCategory::MediumInvestment | BudgetCategory::LongTerm => {}
            }

            if analysis.roi.is_positive() {
                result.best_roi_decks.push(analysis.clone());
            }
        }
        result.best_roi_decks.sort_by(|a, b| b.roi.total_cmp(&a.roi));
        result.best_roi_decks.truncate(BEST_ROI_LIMIT);
    }

    fn sort(&self, decks: &mut [DeckBudgetAnalysis]) {
        match self.options.sort_by {
            SortCriteria::Roi => decks.sort_by(|a, b| b.roi.total_cmp(&a.roi)),
            SortCriteria::CostEfficiency => {
                decks.sort_by(|a, b| b.cost_efficiency.total_cmp(&a.cost_efficiency))
            }
            SortCriteria::TotalCards => decks.sort_by_key(|a| a.total_cards_needed),
            SortCriteria::TotalGold => decks.sort_by_key(|a| a.total_gold_needed),
            SortCriteria::CurrentScore => {
                decks.sort_by(|a, b| b.current_score.total_cmp(&a.current_score))
            }
            SortCriteria::ProjectedScore => {
                decks.sort_by(|a, b| b.projected_score.total_cmp(&a.projected_score))
            }
        }
    }
}

/// `closeness×0.5 + levelFactor×0.3 + roleBonus`, where closeness shrinks
/// logarithmically with the number of cards still needed.
fn upgrade_priority(cards_needed: u32, level_factor: f64, role_bonus: f64) -> f64 {
    let closeness = 1.0 / (1.0 + (f64::from(cards_needed) + 1.0).log10());
    closeness * 0.5 + level_factor * 0.3 + role_bonus
}

fn filter_levels(
    levels: &CardLevels,
    keep: impl Fn(&CardLevelData) -> bool,
) -> CardLevels {
    levels
        .iter()
        .filter(|(_, data)| keep(data))
        .map(|(name, data)| (name.clone(), data.clone()))
        .collect()
}

fn summarize(result: &BudgetFinderResult, card_levels: &CardLevels) -> BudgetSummary {
    let decks = &result.all_decks;
    let mut summary = BudgetSummary {
        total_decks_analyzed: decks.len(),
        ready_deck_count: result.ready_decks.len(),
        quick_win_count: result.quick_wins.len(),
        player_average_level: average_level(card_levels),
        ..BudgetSummary::default()
    };
    if decks.is_empty() {
        return summary;
    }

    let total_cards: u64 = decks.iter().map(|d| u64::from(d.total_cards_needed)).sum();
    let total_gold: u64 = decks.iter().map(|d| d.total_gold_needed).sum();
    let count = decks.len() as u64;
    summary.average_cards_needed = u32::try_from(total_cards / count).unwrap_or(u32::MAX);
    summary.average_gold_needed = total_gold / count;
    summary.lowest_cards_needed = decks
        .iter()
        .map(|d| d.total_cards_needed)
        .min()
        .unwrap_or(0);

    for analysis in decks {
        if analysis.roi.total_cmp(&summary.best_roi).is_gt() {
            summary.best_roi = analysis.roi;
        }
        if analysis.cost_efficiency > summary.best_cost_efficiency {
            summary.best_cost_efficiency = analysis.cost_efficiency;
        }
    }
    summary
}

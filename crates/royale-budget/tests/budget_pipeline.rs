use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use royale_budget::budget::{BudgetCategory, BudgetFinder, BudgetFinderOptions};
use royale_budget::{DeckBuilder, GreedyDeckBuilder, WhatIfAnalyzer, parse_card_upgrade};
use royale_core::model::{CardLevelData, CardLevels, CardRole, Rarity};
use royale_core::scoring::LevelRarityScorer;
use std::sync::Arc;

const CARDS: [(&str, u32, Rarity, u32, CardRole); 9] = [
    ("Giant", 12, Rarity::Rare, 5, CardRole::WinCondition),
    ("Witch", 11, Rarity::Epic, 5, CardRole::Support),
    ("Musketeer", 12, Rarity::Rare, 4, CardRole::Support),
    ("Knight", 14, Rarity::Common, 3, CardRole::Cycle),
    ("Fireball", 13, Rarity::Rare, 4, CardRole::SpellBig),
    ("Zap", 13, Rarity::Common, 2, CardRole::SpellSmall),
    ("Cannon", 13, Rarity::Common, 3, CardRole::Building),
    ("Skeletons", 14, Rarity::Common, 1, CardRole::Cycle),
    ("Archers", 10, Rarity::Common, 3, CardRole::Support),
];

fn collection_in(order: &[usize]) -> CardLevels {
    order
        .iter()
        .map(|&i| {
            let (name, level, rarity, elixir, role) = CARDS[i];
            (
                name.to_string(),
                CardLevelData::new(level, 14, rarity, elixir).with_role(role),
            )
        })
        .collect()
}

fn collection() -> CardLevels {
    collection_in(&(0..CARDS.len()).collect::<Vec<_>>())
}

fn builder() -> Arc<dyn DeckBuilder> {
    Arc::new(GreedyDeckBuilder::new(Arc::new(LevelRarityScorer::default())))
}

#[test]
fn primary_deck_is_priced_and_categorised() {
    let finder = BudgetFinder::new(builder(), BudgetFinderOptions::default());
    let result = finder.find_optimal_decks(&collection()).unwrap();
    assert_eq!(result.all_decks.len(), 1);

    let primary = &result.all_decks[0];
    assert!(!primary.deck.contains("Archers"));
    // Giant/Musketeer 950 each, Fireball 550, Zap/Cannon 2500 each, Witch 140.
    assert_eq!(primary.total_cards_needed, 7590);
    assert_eq!(primary.upgrades_needed, 6);
    assert_eq!(primary.budget_category, BudgetCategory::LongTerm);
    assert!(primary.roi.is_positive());
    assert_eq!(result.summary.lowest_cards_needed, 7590);
    assert!(result.ready_decks.is_empty());
}

#[test]
fn only_variations_with_a_full_pool_are_built() {
    let options = BudgetFinderOptions {
        include_variations: true,
        ..BudgetFinderOptions::default()
    };
    let finder = BudgetFinder::new(builder(), options);
    let result = finder.find_optimal_decks(&collection()).unwrap();

    // Level 12+ and level 13+ pools are too small; Common/Rare has exactly 8.
    assert_eq!(result.all_decks.len(), 2);
    let budget = result
        .all_decks
        .iter()
        .find(|a| a.deck.notes.iter().any(|n| n == "Budget-friendly (Common/Rare focus)"))
        .unwrap();
    assert!(budget.deck.contains("Archers"));
    assert!(!budget.deck.contains("Witch"));
    assert_eq!(budget.total_cards_needed, 15950);
}

#[test]
fn analysis_ignores_collection_insertion_order() {
    let finder = BudgetFinder::new(
        builder(),
        BudgetFinderOptions {
            include_variations: true,
            ..BudgetFinderOptions::default()
        },
    );
    let baseline = serde_json::to_string(&finder.find_optimal_decks(&collection()).unwrap())
        .unwrap();

    let mut rng = StdRng::seed_from_u64(20251017);
    let mut order: Vec<usize> = (0..CARDS.len()).collect();
    for _ in 0..4 {
        order.shuffle(&mut rng);
        let shuffled = finder.find_optimal_decks(&collection_in(&order)).unwrap();
        assert_eq!(serde_json::to_string(&shuffled).unwrap(), baseline);
    }
}

#[test]
fn levelling_a_bench_card_swaps_it_into_the_deck() {
    let analyzer = WhatIfAnalyzer::new(builder());
    let upgrade = parse_card_upgrade("Archers:14").unwrap();
    let scenario = analyzer
        .analyze_upgrade_path(&collection(), &[upgrade])
        .unwrap();

    assert_eq!(scenario.name, "Upgrade Archers to Lv14");
    assert_eq!(scenario.total_gold, 270_000);
    assert_eq!(scenario.impact.new_cards_in_deck, vec!["Archers".to_string()]);
    assert_eq!(scenario.impact.removed_cards, vec!["Witch".to_string()]);
    assert!(scenario.impact.deck_score_delta > 0.0);
    assert!(
        scenario
            .impact
            .recommendation
            .starts_with("Minor improvement. These upgrades (270000 gold)")
    );
}

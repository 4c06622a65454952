use royale_core::model::{CardCandidate, CardLevelData, CardLevels, CardRole, Rarity};
use royale_core::providers::{
    CardStatsRegistry, CombatStats, ExponentialLevelCurve, SynergyDatabase, SynergyProvider,
};
use royale_core::scoring::{
    CombatStatsScorer, CompositeScorer, EvolutionScorer, LevelRarityScorer, Scorer,
    ScoringContext, SynergyScorer, WeightedScorer,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::Arc;

fn collection() -> CardLevels {
    let mut levels = CardLevels::new();
    levels.insert(
        "Giant".into(),
        CardLevelData::new(12, 14, Rarity::Rare, 5).with_role(CardRole::WinCondition),
    );
    levels.insert(
        "Witch".into(),
        CardLevelData::new(11, 14, Rarity::Epic, 5).with_role(CardRole::Support),
    );
    levels.insert(
        "Knight".into(),
        CardLevelData::new(14, 14, Rarity::Common, 3)
            .with_role(CardRole::Cycle)
            .with_evolution(1, 1),
    );
    levels.insert(
        "Fireball".into(),
        CardLevelData::new(13, 14, Rarity::Rare, 4).with_role(CardRole::SpellBig),
    );
    levels
}

fn stats() -> CardStatsRegistry {
    let mut registry = CardStatsRegistry::new();
    registry.insert(
        "Giant",
        CombatStats {
            hitpoints: 4_091,
            damage: 254,
            damage_per_second: 169,
            speed: "Slow".into(),
            targets: "Buildings".into(),
            ..CombatStats::default()
        },
    );
    registry.insert(
        "Knight",
        CombatStats {
            hitpoints: 1_766,
            damage: 202,
            damage_per_second: 168,
            speed: "Medium".into(),
            targets: "Ground".into(),
            ..CombatStats::default()
        },
    );
    registry
}

fn composite() -> CompositeScorer {
    let unlocked: HashSet<String> = ["Knight".to_string()].into_iter().collect();
    CompositeScorer::new(vec![
        WeightedScorer::new(
            Arc::new(LevelRarityScorer::new(Some(Arc::new(
                ExponentialLevelCurve::default(),
            )))),
            0.6,
        ),
        WeightedScorer::new(Arc::new(CombatStatsScorer::new(Some(Arc::new(stats())))), 0.2),
        WeightedScorer::new(Arc::new(EvolutionScorer::new(unlocked)), 0.1),
        WeightedScorer::new(
            Arc::new(SynergyScorer::new(Some(Arc::new(SynergyDatabase::with_defaults())))),
            0.1,
        ),
    ])
}

#[test]
fn every_signal_is_finite_and_non_negative() {
    let scorer = composite();
    let levels = collection();
    let deck: Vec<CardCandidate> = levels
        .iter()
        .map(|(name, data)| data.to_candidate(name))
        .collect();
    let ctx = ScoringContext::new().with_current_deck(&deck);
    for card in &deck {
        let score = scorer.score(card, &ctx);
        assert!(score.is_finite() && score >= 0.0, "{}: {score}", card.name);
    }

    let degenerate = CardCandidate::new("", 0, 0).with_evolution(3, 0);
    assert!(scorer.score(&degenerate, &ctx).is_finite());
}

#[test]
fn synergy_partner_in_deck_raises_score() {
    let scorer = composite();
    let giant = collection()["Giant"].to_candidate("Giant");
    let witch = vec![collection()["Witch"].to_candidate("Witch")];
    let alone = scorer.score(&giant, &ScoringContext::new());
    let paired = scorer.score(&giant, &ScoringContext::new().with_current_deck(&witch));
    assert!(paired > alone);
}

#[test]
fn scores_do_not_depend_on_evaluation_order() {
    let scorer = composite();
    let levels = collection();
    let mut names: Vec<&String> = levels.keys().collect();
    let baseline: Vec<(String, u64)> = names
        .iter()
        .map(|name| {
            let card = levels[*name].to_candidate(name);
            (name.to_string(), scorer.score(&card, &ScoringContext::new()).to_bits())
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(20251017);
    for _ in 0..8 {
        names.shuffle(&mut rng);
        for name in &names {
            let card = levels[*name].to_candidate(name);
            let bits = scorer.score(&card, &ScoringContext::new()).to_bits();
            let expected = baseline
                .iter()
                .find(|(n, _)| n == *name)
                .map(|(_, b)| *b);
            assert_eq!(Some(bits), expected);
        }
    }
}

#[test]
fn synergy_database_agrees_with_scorer_pairs() {
    let db = SynergyDatabase::with_defaults();
    let analysis = db.analyze_deck(&["Giant", "Witch", "Knight", "Fireball"]);
    assert_eq!(analysis.top_synergies.len(), 1);
    assert!(analysis.missing_synergies.contains(&"Knight".to_string()));
}

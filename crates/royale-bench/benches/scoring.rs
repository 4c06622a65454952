use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use royale_bench::config::ScoringConfig;
use royale_bench::runner::build_deck_builder;
use royale_budget::budget::{BudgetFinder, BudgetFinderOptions};
use royale_budget::builder::DeckBuilder;
use royale_core::model::{CardLevelData, CardLevels, CardRole, Rarity};

const ROLES: [CardRole; 6] = [
    CardRole::WinCondition,
    CardRole::Building,
    CardRole::SpellBig,
    CardRole::SpellSmall,
    CardRole::Support,
    CardRole::Cycle,
];

const RARITIES: [Rarity; 5] = [
    Rarity::Common,
    Rarity::Rare,
    Rarity::Epic,
    Rarity::Legendary,
    Rarity::Champion,
];

fn random_collection(seed: u64, size: usize) -> CardLevels {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size)
        .map(|idx| {
            let level = rng.gen_range(6..=14);
            let data = CardLevelData::new(
                level,
                14,
                RARITIES[rng.gen_range(0..RARITIES.len())],
                rng.gen_range(1..=7),
            )
            .with_role(ROLES[idx % ROLES.len()]);
            (format!("Card {idx:03}"), data)
        })
        .collect()
}

fn scoring_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");
    let builder = Arc::new(
        build_deck_builder(&ScoringConfig::default()).expect("default scoring config builds"),
    );

    for (seed, size) in [(7u64, 40usize), (1129u64, 110usize)] {
        let levels = random_collection(seed, size);
        group.bench_function(format!("build_deck_{size}"), |b| {
            b.iter(|| black_box(builder.build_deck(black_box(&levels))))
        });

        let finder = BudgetFinder::new(
            Arc::clone(&builder) as Arc<dyn DeckBuilder>,
            BudgetFinderOptions {
                include_variations: true,
                ..BudgetFinderOptions::default()
            },
        );
        group.bench_function(format!("find_optimal_decks_{size}"), |b| {
            b.iter(|| black_box(finder.find_optimal_decks(black_box(&levels))))
        });
    }
    group.finish();
}

criterion_group!(benches, scoring_bench);
criterion_main!(benches);

//! Card and gold requirements for levelling cards.
//!
//! Tables are indexed by the level being upgraded *from*; index 0 is unused.
//! A zero entry means no data for that level (below the rarity's unlock level,
//! at max level, or beyond the published gold table).

use crate::model::rarity::{MAX_CARD_LEVEL, Rarity};

const LEVEL_SLOTS: usize = MAX_CARD_LEVEL as usize;

const COMMON_CARDS: [u32; LEVEL_SLOTS] = [
    0, 2, 4, 10, 20, 50, 100, 200, 400, 800, 1000, 2000, 3000, 2500, 3500, 5500,
];
const RARE_CARDS: [u32; LEVEL_SLOTS] = [
    0, 2, 2, 2, 4, 10, 20, 50, 100, 200, 300, 400, 400, 550, 750, 1000,
];
const EPIC_CARDS: [u32; LEVEL_SLOTS] = [
    0, 2, 2, 2, 2, 2, 2, 4, 10, 20, 50, 30, 40, 70, 100, 140,
];
const LEGENDARY_CARDS: [u32; LEVEL_SLOTS] = [0, 2, 2, 2, 2, 2, 2, 2, 2, 2, 4, 10, 20, 10, 12, 15];
/// Champions unlock at level 11; levels 2-10 stay at zero rather than a
/// placeholder cost.
const CHAMPION_CARDS: [u32; LEVEL_SLOTS] = [0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 4, 8, 10, 12];

const COMMON_GOLD: [u64; LEVEL_SLOTS] = [
    0, 5, 20, 50, 150, 400, 1_000, 2_000, 4_000, 8_000, 20_000, 50_000, 100_000, 100_000, 0, 0,
];
const RARE_GOLD: [u64; LEVEL_SLOTS] = [
    0, 0, 0, 50, 150, 400, 1_000, 2_000, 4_000, 8_000, 20_000, 50_000, 100_000, 100_000, 0, 0,
];
const EPIC_GOLD: [u64; LEVEL_SLOTS] = [
    0, 0, 0, 0, 0, 0, 400, 2_000, 4_000, 8_000, 20_000, 50_000, 100_000, 100_000, 0, 0,
];
const LEGENDARY_GOLD: [u64; LEVEL_SLOTS] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 5_000, 20_000, 50_000, 100_000, 100_000, 0, 0,
];
const CHAMPION_GOLD: [u64; LEVEL_SLOTS] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 50_000, 100_000, 100_000, 0, 0,
];

const fn card_table(rarity: Rarity) -> &'static [u32; LEVEL_SLOTS] {
    match rarity {
        Rarity::Common => &COMMON_CARDS,
        Rarity::Rare => &RARE_CARDS,
        Rarity::Epic => &EPIC_CARDS,
        Rarity::Legendary => &LEGENDARY_CARDS,
        Rarity::Champion => &CHAMPION_CARDS,
    }
}

const fn gold_table(rarity: Rarity) -> &'static [u64; LEVEL_SLOTS] {
    match rarity {
        Rarity::Common => &COMMON_GOLD,
        Rarity::Rare => &RARE_GOLD,
        Rarity::Epic => &EPIC_GOLD,
        Rarity::Legendary => &LEGENDARY_GOLD,
        Rarity::Champion => &CHAMPION_GOLD,
    }
}

/// Cards required to go from `level` to `level + 1`.
pub fn cards_needed_at_level(level: u32, rarity: Option<Rarity>) -> u32 {
    let Some(rarity) = rarity else {
        return 0;
    };
    card_table(rarity)
        .get(level as usize)
        .copied()
        .unwrap_or(0)
}

/// Gold required to go from `level` to `level + 1`.
pub fn gold_needed_at_level(level: u32, rarity: Option<Rarity>) -> u64 {
    let Some(rarity) = rarity else {
        return 0;
    };
    gold_table(rarity)
        .get(level as usize)
        .copied()
        .unwrap_or(0)
}

/// Cards required to go from `from` up to (but not past) `to`.
pub fn cards_needed_between(from: u32, to: u32, rarity: Option<Rarity>) -> u32 {
    (from..to)
        .map(|level| cards_needed_at_level(level, rarity))
        .sum()
}

/// Gold required to go from `from` up to `to`.
pub fn gold_needed_between(from: u32, to: u32, rarity: Option<Rarity>) -> u64 {
    (from..to)
        .map(|level| gold_needed_at_level(level, rarity))
        .sum()
}

/// Cards required to reach max level; 0 for invalid or maxed levels.
pub fn total_cards_to_max(level: u32, rarity: Option<Rarity>) -> u32 {
    if level < 1 || level >= MAX_CARD_LEVEL {
        return 0;
    }
    cards_needed_between(level, MAX_CARD_LEVEL, rarity)
}

/// Gold required to reach max level.
pub fn total_gold_to_max(level: u32, rarity: Option<Rarity>) -> u64 {
    if level < 1 || level >= MAX_CARD_LEVEL {
        return 0;
    }
    gold_needed_between(level, MAX_CARD_LEVEL, rarity)
}

use super::candidate::CardCandidate;
use super::rarity::{self, Rarity};
use super::role::CardRole;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A player's collection keyed by card name. Ordered so that every traversal,
/// and therefore every derived score, is deterministic.
pub type CardLevels = BTreeMap<String, CardLevelData>;

/// Per-card progression data for one player.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CardLevelData {
    pub level: u32,
    #[serde(default)]
    pub max_level: u32,
    #[serde(default, deserialize_with = "rarity::deserialize_lenient")]
    pub rarity: Option<Rarity>,
    #[serde(default)]
    pub elixir: u32,
    #[serde(default)]
    pub role: Option<CardRole>,
    #[serde(default)]
    pub evolution_level: u32,
    #[serde(default)]
    pub max_evolution_level: u32,
}

impl CardLevelData {
    pub fn new(level: u32, max_level: u32, rarity: Rarity, elixir: u32) -> Self {
        Self {
            level,
            max_level,
            rarity: Some(rarity),
            elixir,
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: CardRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_evolution(mut self, level: u32, max_level: u32) -> Self {
        self.evolution_level = level;
        self.max_evolution_level = max_level;
        self
    }

    pub fn to_candidate(&self, name: &str) -> CardCandidate {
        CardCandidate {
            name: name.to_string(),
            level: self.level,
            max_level: self.max_level,
            rarity: self.rarity,
            elixir: self.elixir,
            role: self.role,
            evolution_level: self.evolution_level,
            max_evolution_level: self.max_evolution_level,
        }
    }
}

/// Load a collection from a JSON object of `name -> CardLevelData`.
pub fn load_card_levels(path: impl AsRef<Path>) -> Result<CardLevels, CoreError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| CoreError::Read {
        what: "card collection",
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CoreError::Parse {
        what: "card collection",
        path: path.to_path_buf(),
        source,
    })
}

/// Mean card level across the collection, or 0.0 when it is empty.
pub fn average_level(levels: &CardLevels) -> f64 {
    if levels.is_empty() {
        return 0.0;
    }
    let total: u64 = levels.values().map(|card| u64::from(card.level)).sum();
    total as f64 / levels.len() as f64
}

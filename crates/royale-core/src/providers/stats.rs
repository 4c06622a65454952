use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Looks up pre-loaded combat statistics by card name.
pub trait CombatStatsProvider: Send + Sync {
    fn stats(&self, card: &str) -> Option<&CombatStats>;
}

/// Combat statistics for one card at tournament level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatStats {
    pub hitpoints: u32,
    pub damage: u32,
    pub damage_per_second: u32,
    /// Seconds between attacks.
    pub hit_speed: f64,
    /// "Slow", "Medium", "Fast", "Very Fast".
    pub speed: String,
    /// "Ground", "Air", "Air & Ground", "Buildings".
    pub targets: String,
    /// Tiles.
    pub range: f64,
    /// Splash radius in tiles; zero for single target.
    pub radius: f64,
    /// Seconds, for buildings.
    pub lifetime: u32,
    pub spawn_count: u32,
    pub death_damage: u32,
    pub dash_damage: u32,
}

impl CombatStats {
    pub fn dps_per_elixir(&self, elixir: u32) -> f64 {
        if elixir == 0 {
            return 0.0;
        }
        f64::from(self.damage_per_second) / f64::from(elixir)
    }

    pub fn hp_per_elixir(&self, elixir: u32) -> f64 {
        if elixir == 0 {
            return 0.0;
        }
        f64::from(self.hitpoints) / f64::from(elixir)
    }

    /// Range normalized against 7 tiles.
    pub fn range_effectiveness(&self) -> f64 {
        (self.range / 7.0).min(1.0)
    }

    pub fn target_coverage(&self) -> f64 {
        match self.targets.as_str() {
            "Air & Ground" => 1.0,
            "Ground" => 0.7,
            "Air" => 0.6,
            "Buildings" => 0.4,
            _ => 0.5,
        }
    }

    pub fn speed_effectiveness(&self) -> f64 {
        match self.speed.as_str() {
            "Very Fast" => 1.0,
            "Fast" => 0.8,
            "Medium" => 0.6,
            "Slow" => 0.4,
            _ => 0.5,
        }
    }

    /// How well the stats fit the given role key, clamped to `[0, 1]`. The
    /// empty key is neutral.
    pub fn role_effectiveness(&self, role_key: &str) -> f64 {
        let hp = f64::from(self.hitpoints);
        let damage = f64::from(self.damage);
        let raw = match role_key {
            "" => return 0.5,
            "wincondition" => (hp / 3000.0) * 0.6 + (damage / 500.0) * 0.4,
            "building" => (hp / 2000.0) * 0.7 + (f64::from(self.lifetime) / 60.0) * 0.3,
            "support" => self.range_effectiveness() * 0.6 + self.target_coverage() * 0.4,
            "spell" => (damage / 600.0) * 0.7 + (self.radius / 5.0) * 0.3,
            "cycle" => (damage * self.speed_effectiveness()) / 300.0,
            _ => 0.5,
        };
        raw.clamp(0.0, 1.0)
    }
}

/// On-disk shape: `{"cards": {"Knight": {...}}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardStatsFile {
    #[serde(default)]
    pub cards: HashMap<String, CombatStats>,
}

/// In-memory combat stats keyed by card name.
#[derive(Debug, Clone, Default)]
pub struct CardStatsRegistry {
    cards: HashMap<String, CombatStats>,
}

impl CardStatsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CoreError::Read {
            what: "combat stats",
            path: path.to_path_buf(),
            source,
        })?;
        let file: CardStatsFile =
            serde_json::from_str(&contents).map_err(|source| CoreError::Parse {
                what: "combat stats",
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(cards = file.cards.len(), path = %path.display(), "loaded combat stats");
        Ok(Self { cards: file.cards })
    }

    pub fn insert(&mut self, card: impl Into<String>, stats: CombatStats) {
        self.cards.insert(card.into(), stats);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl CombatStatsProvider for CardStatsRegistry {
    fn stats(&self, card: &str) -> Option<&CombatStats> {
        self.cards.get(card)
    }
}

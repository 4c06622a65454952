use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Highest level any card can reach.
pub const MAX_CARD_LEVEL: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Champion,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Champion,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Case-insensitive parse that tolerates surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "common" => Some(Rarity::Common),
            "rare" => Some(Rarity::Rare),
            "epic" => Some(Rarity::Epic),
            "legendary" => Some(Rarity::Legendary),
            "champion" => Some(Rarity::Champion),
            _ => None,
        }
    }

    /// Default scoring multiplier; rarer cards are harder to level.
    pub const fn default_boost(self) -> f64 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Rare => 1.05,
            Rarity::Epic => 1.1,
            Rarity::Legendary => 1.15,
            Rarity::Champion => 1.2,
        }
    }

    /// Level at which a freshly unlocked card of this rarity starts.
    pub const fn starting_level(self) -> u32 {
        match self {
            Rarity::Common => 1,
            Rarity::Rare => 3,
            Rarity::Epic => 6,
            Rarity::Legendary => 9,
            Rarity::Champion => 11,
        }
    }

    pub const fn max_level(self) -> u32 {
        MAX_CARD_LEVEL
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Champion => "Champion",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown rarity '{0}'")]
pub struct UnknownRarity(pub String);

impl FromStr for Rarity {
    type Err = UnknownRarity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rarity::parse(s).ok_or_else(|| UnknownRarity(s.to_string()))
    }
}

/// Serde helper: unrecognised rarity strings become `None` instead of failing
/// the whole document.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Rarity>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Rarity::parse))
}

/// Per-rarity multiplier table used by the level/rarity scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarityWeights {
    weights: [f64; 5],
}

impl RarityWeights {
    pub const fn new(weights: [f64; 5]) -> Self {
        Self { weights }
    }

    pub fn get(&self, rarity: Rarity) -> f64 {
        self.weights[rarity.index()]
    }

    pub fn set(&mut self, rarity: Rarity, weight: f64) {
        self.weights[rarity.index()] = weight;
    }

    /// Boost for an optional rarity; unknown rarities are neutral.
    pub fn boost(&self, rarity: Option<Rarity>) -> f64 {
        rarity.map_or(1.0, |r| self.get(r))
    }
}

impl Default for RarityWeights {
    fn default() -> Self {
        Self {
            weights: Rarity::ALL.map(Rarity::default_boost),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Rarity::parse("  LEGENDARY "), Some(Rarity::Legendary));
        assert_eq!(Rarity::parse("champion"), Some(Rarity::Champion));
        assert_eq!(Rarity::parse("mythic"), None);
        assert!("Mythic".parse::<Rarity>().is_err());
    }

    #[test]
    fn unknown_rarity_names_the_input() {
        let err = "Mythic".parse::<Rarity>().unwrap_err();
        assert_eq!(err, UnknownRarity("Mythic".to_string()));
        assert_eq!(err.to_string(), "unknown rarity 'Mythic'");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn default_boost_is_monotonic_with_tier() {
        let boosts: Vec<f64> = Rarity::ALL.iter().map(|r| r.default_boost()).collect();
        assert!(boosts.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(boosts[0], 1.0);
        assert_eq!(boosts[4], 1.2);
    }

    #[test]
    fn unknown_rarity_boost_is_neutral() {
        let weights = RarityWeights::default();
        assert_eq!(weights.boost(None), 1.0);
        assert_eq!(weights.boost(Some(Rarity::Epic)), 1.1);
    }

    #[test]
    fn lenient_deserialize_drops_unknown_values() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "deserialize_lenient")]
            rarity: Option<Rarity>,
        }
        let known: Row = serde_json::from_str(r#"{"rarity":"epic"}"#).unwrap();
        let unknown: Row = serde_json::from_str(r#"{"rarity":"Mythic"}"#).unwrap();
        let missing: Row = serde_json::from_str("{}").unwrap();
        assert_eq!(known.rarity, Some(Rarity::Epic));
        assert_eq!(unknown.rarity, None);
        assert_eq!(missing.rarity, None);
    }
}

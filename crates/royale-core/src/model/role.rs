use core::fmt;
use serde::{Deserialize, Serialize};

/// Strategic role of a card inside a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardRole {
    #[serde(rename = "win_conditions")]
    WinCondition,
    #[serde(rename = "buildings")]
    Building,
    #[serde(rename = "spells_big")]
    SpellBig,
    #[serde(rename = "spells_small")]
    SpellSmall,
    #[serde(rename = "support")]
    Support,
    #[serde(rename = "cycle")]
    Cycle,
}

impl CardRole {
    pub const ALL: [CardRole; 6] = [
        CardRole::WinCondition,
        CardRole::Building,
        CardRole::SpellBig,
        CardRole::SpellSmall,
        CardRole::Support,
        CardRole::Cycle,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CardRole::WinCondition => "win_conditions",
            CardRole::Building => "buildings",
            CardRole::SpellBig => "spells_big",
            CardRole::SpellSmall => "spells_small",
            CardRole::Support => "support",
            CardRole::Cycle => "cycle",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        CardRole::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
    }

    /// Key understood by combat stats providers. Both spell sizes share one key.
    pub const fn stats_key(self) -> &'static str {
        match self {
            CardRole::WinCondition => "wincondition",
            CardRole::Building => "building",
            CardRole::Support => "support",
            CardRole::SpellBig | CardRole::SpellSmall => "spell",
            CardRole::Cycle => "cycle",
        }
    }

    /// Flat bonus applied when ranking which card to upgrade first.
    pub const fn upgrade_priority_bonus(self) -> f64 {
        match self {
            CardRole::WinCondition => 0.3,
            CardRole::SpellBig => 0.2,
            CardRole::Building => 0.15,
            CardRole::Support => 0.1,
            CardRole::SpellSmall | CardRole::Cycle => 0.0,
        }
    }
}

impl fmt::Display for CardRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stats key for an optional role; the empty key is left to the provider.
pub fn stats_key(role: Option<CardRole>) -> &'static str {
    role.map_or("", CardRole::stats_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spell_roles_share_stats_key() {
        assert_eq!(CardRole::SpellBig.stats_key(), "spell");
        assert_eq!(CardRole::SpellSmall.stats_key(), "spell");
        assert_eq!(stats_key(None), "");
        assert_eq!(stats_key(Some(CardRole::WinCondition)), "wincondition");
    }

    #[test]
    fn upgrade_bonus_orders_roles() {
        let wc = CardRole::WinCondition.upgrade_priority_bonus();
        let big = CardRole::SpellBig.upgrade_priority_bonus();
        let building = CardRole::Building.upgrade_priority_bonus();
        let support = CardRole::Support.upgrade_priority_bonus();
        assert!(wc > big && big > building && building > support && support > 0.0);
        assert_eq!(CardRole::Cycle.upgrade_priority_bonus(), 0.0);
    }

    #[test]
    fn parse_round_trips_wire_names() {
        for role in CardRole::ALL {
            assert_eq!(CardRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(CardRole::parse("tank"), None);
    }
}

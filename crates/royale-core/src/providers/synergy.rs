use crate::error::CoreError;
use crate::model::{CardCandidate, DECK_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use SynergyCategory::*;

/// Pairwise synergy lookup. Implementations must be symmetric.
pub trait SynergyProvider: Send + Sync {
    /// Synergy between two cards in `[0, 1]`; 0 when unknown.
    fn synergy(&self, a: &str, b: &str) -> f64;

    fn analyze_deck(&self, deck: &[&str]) -> DeckSynergyAnalysis;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynergyCategory {
    TankSupport,
    Bait,
    SpellCombo,
    WinCondition,
    Defensive,
    Cycle,
    BridgeSpam,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyPair {
    pub card1: String,
    pub card2: String,
    pub synergy_type: SynergyCategory,
    pub score: f64,
    #[serde(default)]
    pub description: String,
}

impl SynergyPair {
    fn matches(&self, a: &str, b: &str) -> bool {
        (self.card1 == a && self.card2 == b) || (self.card1 == b && self.card2 == a)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeckSynergyAnalysis {
    /// Sum of pair scores scaled so that 28 perfect pairs (a full deck) is 100.
    pub total_score: f64,
    pub average_score: f64,
    pub top_synergies: Vec<SynergyPair>,
    /// Cards without a single known synergy in the deck.
    pub missing_synergies: Vec<String>,
    pub category_scores: BTreeMap<SynergyCategory, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyRecommendation {
    pub card_name: String,
    pub synergy_score: f64,
    pub synergies: Vec<SynergyPair>,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
struct SynergyFile {
    #[serde(default)]
    pairs: Vec<SynergyPair>,
}

const TOP_SYNERGIES: usize = 5;
const MAX_SUGGESTIONS: usize = 10;

/// Known card pairings with categories.
#[derive(Debug, Clone, Default)]
pub struct SynergyDatabase {
    pairs: Vec<SynergyPair>,
}

impl SynergyDatabase {
    pub fn new(pairs: Vec<SynergyPair>) -> Self {
        Self { pairs }
    }

    /// Database seeded with the built-in archetype pairings.
    pub fn with_defaults() -> Self {
        let pairs = DEFAULT_PAIRS
            .iter()
            .map(|&(card1, card2, synergy_type, score, description)| SynergyPair {
                card1: card1.to_string(),
                card2: card2.to_string(),
                synergy_type,
                score,
                description: description.to_string(),
            })
            .collect();
        Self { pairs }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CoreError::Read {
            what: "synergy pairs",
            path: path.to_path_buf(),
            source,
        })?;
        let file: SynergyFile =
            serde_json::from_str(&contents).map_err(|source| CoreError::Parse {
                what: "synergy pairs",
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(file.pairs))
    }

    pub fn pairs(&self) -> &[SynergyPair] {
        &self.pairs
    }

    /// First pair matching the two cards in either order.
    pub fn pair(&self, a: &str, b: &str) -> Option<&SynergyPair> {
        self.pairs.iter().find(|pair| pair.matches(a, b))
    }

    pub fn by_category(&self, category: SynergyCategory) -> impl Iterator<Item = &SynergyPair> {
        self.pairs
            .iter()
            .filter(move |pair| pair.synergy_type == category)
    }

    /// Cards from `available` that pair with the current deck, best first.
    pub fn suggest_cards(
        &self,
        deck: &[&str],
        available: &[CardCandidate],
    ) -> Vec<SynergyRecommendation> {
        if deck.is_empty() || available.is_empty() {
            return Vec::new();
        }
        let in_deck: HashSet<&str> = deck.iter().copied().collect();
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for candidate in available {
            let name = candidate.name.as_str();
            if in_deck.contains(name) || !seen.insert(name) {
                continue;
            }
            let synergies: Vec<SynergyPair> = deck
                .iter()
                .filter_map(|card| self.pair(name, card).cloned())
                .collect();
            if synergies.is_empty() {
                continue;
            }
            let avg = synergies.iter().map(|pair| pair.score).sum::<f64>() / synergies.len() as f64;
            let reason = format!("Synergizes with {} cards in your deck", synergies.len());
            out.push(SynergyRecommendation {
                card_name: name.to_string(),
                synergy_score: avg,
                synergies,
                reason,
            });
        }

        out.sort_by(|a, b| b.synergy_score.total_cmp(&a.synergy_score));
        out.truncate(MAX_SUGGESTIONS);
        out
    }
}

impl SynergyProvider for SynergyDatabase {
    fn synergy(&self, a: &str, b: &str) -> f64 {
        self.pair(a, b).map_or(0.0, |pair| pair.score)
    }

    fn analyze_deck(&self, deck: &[&str]) -> DeckSynergyAnalysis {
        if deck.is_empty() {
            return DeckSynergyAnalysis::default();
        }

        let mut found = Vec::new();
        let mut category_scores = BTreeMap::new();
        let mut per_card: HashMap<&str, usize> = HashMap::new();

        for (i, &a) in deck.iter().enumerate() {
            for &b in &deck[i + 1..] {
                if let Some(pair) = self.pair(a, b) {
                    found.push(pair.clone());
                    *category_scores.entry(pair.synergy_type).or_insert(0) += 1;
                    *per_card.entry(a).or_insert(0) += 1;
                    *per_card.entry(b).or_insert(0) += 1;
                }
            }
        }

        let total: f64 = found.iter().map(|pair| pair.score).sum();
        let average_score = if found.is_empty() {
            0.0
        } else {
            total / found.len() as f64
        };
        let full_deck_pairs = (DECK_SIZE * (DECK_SIZE - 1) / 2) as f64;

        found.sort_by(|a, b| b.score.total_cmp(&a.score));
        found.truncate(TOP_SYNERGIES);

        let missing_synergies = deck
            .iter()
            .filter(|card| !per_card.contains_key(*card))
            .map(|card| card.to_string())
            .collect();

        DeckSynergyAnalysis {
            total_score: total / full_deck_pairs * 100.0,
            average_score,
            top_synergies: found,
            missing_synergies,
            category_scores,
        }
    }
}

type PairSeed = (&'static str, &'static str, SynergyCategory, f64, &'static str);

const DEFAULT_PAIRS: &[PairSeed] = &[
    ("Giant", "Witch", TankSupport, 0.9, "Witch supports Giant with splash damage and spawns"),
    ("Giant", "Sparky", TankSupport, 0.85, "Giant tanks while Sparky deals massive damage"),
    ("Giant", "Musketeer", TankSupport, 0.8, "Musketeer provides ranged support behind Giant"),
    ("Giant", "Dark Prince", TankSupport, 0.8, "Dark Prince adds splash and charge damage"),
    ("Golem", "Night Witch", TankSupport, 0.95, "Classic Golem beatdown"),
    ("Golem", "Baby Dragon", TankSupport, 0.85, "Baby Dragon provides splash support"),
    ("Golem", "Lumberjack", TankSupport, 0.9, "Lumberjack rage and fast clearing"),
    ("Lava Hound", "Balloon", WinCondition, 0.95, "Overwhelming air pressure"),
    ("Lava Hound", "Miner", WinCondition, 0.8, "Miner supports Lava Hound pups"),
    ("Lava Hound", "Mega Minion", TankSupport, 0.85, "Strong air support"),
    ("Mega Knight", "Bats", TankSupport, 0.75, "Fast swarm defense"),
    ("Mega Knight", "Inferno Dragon", TankSupport, 0.8, "Inferno Dragon handles tanks"),
    ("Mega Knight", "Electro Wizard", TankSupport, 0.85, "Reset and ranged support"),
    ("P.E.K.K.A", "Electro Wizard", TankSupport, 0.85, "Reset and support for P.E.K.K.A"),
    ("P.E.K.K.A", "Magic Archer", TankSupport, 0.8, "Ranged piercing support"),
    ("Goblin Barrel", "Princess", Bait, 0.95, "Princess baits the log for Goblin Barrel"),
    ("Goblin Barrel", "Goblin Gang", Bait, 0.9, "Multiple goblin threats overwhelm spells"),
    ("Goblin Barrel", "Dart Goblin", Bait, 0.85, "Dart Goblin baits small spells"),
    ("Goblin Barrel", "Skeleton Army", Bait, 0.85, "Swarm bait forces spell usage"),
    ("Goblin Barrel", "Inferno Tower", Bait, 0.75, "Building bait punishes spell usage"),
    ("Princess", "Goblin Gang", Bait, 0.85, "Log bait pressure"),
    ("Graveyard", "Tombstone", Bait, 0.8, "Continuous skeleton pressure"),
    ("X-Bow", "Tesla", Bait, 0.9, "Double building bait and defense"),
    ("Hog Rider", "Fireball", SpellCombo, 0.8, "Fireball clears defenders for Hog"),
    ("Hog Rider", "Earthquake", SpellCombo, 0.85, "Earthquake destroys buildings for Hog"),
    ("Hog Rider", "Freeze", SpellCombo, 0.8, "Freeze guarantees Hog tower damage"),
    ("Tornado", "Fireball", SpellCombo, 0.85, "Tornado groups troops for Fireball"),
    ("Tornado", "Executioner", SpellCombo, 0.9, "Tornado pulls troops into the axe"),
    ("Graveyard", "Freeze", SpellCombo, 0.9, "Freeze lets skeletons connect"),
    ("Graveyard", "Poison", SpellCombo, 0.85, "Poison clears small troops"),
    ("Poison", "Miner", SpellCombo, 0.85, "Chip damage combo"),
    ("Freeze", "Balloon", SpellCombo, 0.9, "Freeze guarantees Balloon connection"),
    ("Rage", "Balloon", SpellCombo, 0.85, "Rage accelerates Balloon to tower"),
    ("P.E.K.K.A", "Battle Ram", BridgeSpam, 0.85, "Bridge spam pressure"),
    ("P.E.K.K.A", "Bandit", BridgeSpam, 0.8, "Bandit supports counterpush"),
    ("Battle Ram", "Bandit", BridgeSpam, 0.8, "Fast dual-lane pressure"),
    ("Battle Ram", "Dark Prince", BridgeSpam, 0.85, "Dual charge pressure"),
    ("Lumberjack", "Balloon", BridgeSpam, 0.95, "Rage boost for Balloon"),
    ("Cannon", "Ice Spirit", Defensive, 0.8, "Cheap defensive combo"),
    ("Cannon", "Knight", Defensive, 0.8, "Cheap defense"),
    ("Tesla", "Tornado", Defensive, 0.85, "Tornado pulls troops to Tesla"),
    ("Inferno Tower", "Zap", Defensive, 0.85, "Zap resets for Inferno Tower"),
    ("Inferno Tower", "Tornado", Defensive, 0.9, "Tornado pulls tanks to Inferno"),
    ("Bomb Tower", "Valkyrie", Defensive, 0.75, "Dual splash defense"),
    ("Musketeer", "Ice Spirit", Defensive, 0.75, "Air defense with freeze"),
    ("Ice Spirit", "Skeletons", Cycle, 0.85, "Ultra-cheap cycle"),
    ("Ice Spirit", "Fire Spirit", Cycle, 0.8, "Cheap spirit cycle"),
    ("Ice Spirit", "Log", Cycle, 0.8, "Cheap cycle and control"),
    ("Skeletons", "Ice Golem", Cycle, 0.8, "Cheap cycle tank"),
    ("Skeletons", "Log", Cycle, 0.75, "Cycle and clear"),
    ("Hog Rider", "Valkyrie", WinCondition, 0.8, "Valkyrie tanks and clears for Hog"),
    ("Hog Rider", "Ice Golem", WinCondition, 0.8, "Ice Golem kites and tanks for Hog"),
    ("Hog Rider", "Musketeer", WinCondition, 0.75, "Musketeer supports the push"),
    ("Royal Giant", "Fisherman", WinCondition, 0.85, "Fisherman activates the King Tower"),
    ("Royal Giant", "Lightning", WinCondition, 0.9, "Lightning clears defensive buildings"),
    ("Mortar", "Cannon", WinCondition, 0.85, "Siege with a defensive building"),
    ("Mortar", "Knight", WinCondition, 0.8, "Knight tanks and defends"),
    ("Miner", "Balloon", WinCondition, 0.9, "Miner tanks for Balloon"),
    ("Miner", "Wall Breakers", WinCondition, 0.8, "Dual tower pressure"),
    ("Sparky", "Goblin Giant", WinCondition, 0.9, "Goblin Giant tanks with spear support"),
    ("Three Musketeers", "Battle Ram", WinCondition, 0.9, "Split push with Battle Ram"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_symmetric() {
        let db = SynergyDatabase::with_defaults();
        assert_eq!(db.synergy("Giant", "Witch"), 0.9);
        assert_eq!(db.synergy("Witch", "Giant"), 0.9);
        assert_eq!(db.synergy("Giant", "Log"), 0.0);
        for pair in db.pairs() {
            assert_eq!(
                db.synergy(&pair.card1, &pair.card2),
                db.synergy(&pair.card2, &pair.card1)
            );
        }
    }

    #[test]
    fn analyze_deck_reports_top_pairs_and_orphans() {
        let db = SynergyDatabase::with_defaults();
        let deck = ["Golem", "Night Witch", "Baby Dragon", "Lumberjack", "Knight"];
        let analysis = db.analyze_deck(&deck);

        assert_eq!(analysis.top_synergies.len(), 3);
        assert_eq!(analysis.top_synergies[0].score, 0.95);
        assert_eq!(analysis.missing_synergies, vec!["Knight".to_string()]);
        assert_eq!(analysis.category_scores.get(&TankSupport), Some(&3));
        let expected_total = (0.95 + 0.85 + 0.9) / 28.0 * 100.0;
        assert!((analysis.total_score - expected_total).abs() < 1e-9);
        assert!((analysis.average_score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn empty_deck_analysis_is_default() {
        let db = SynergyDatabase::with_defaults();
        assert_eq!(db.analyze_deck(&[]), DeckSynergyAnalysis::default());
    }

    #[test]
    fn suggestions_skip_cards_already_in_deck() {
        let db = SynergyDatabase::with_defaults();
        let available = vec![
            CardCandidate::new("Witch", 11, 14),
            CardCandidate::new("Giant", 11, 14),
            CardCandidate::new("Knight", 11, 14),
        ];
        let suggestions = db.suggest_cards(&["Giant"], &available);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].card_name, "Witch");
    }

    #[test]
    fn pairs_deserialize_with_snake_case_categories() {
        let json = r#"{"pairs": [{"card1": "A", "card2": "B", "synergy_type": "bridge_spam", "score": 0.5}]}"#;
        let file: SynergyFile = serde_json::from_str(json).unwrap();
        let db = SynergyDatabase::new(file.pairs);
        assert_eq!(db.synergy("B", "A"), 0.5);
        assert_eq!(db.by_category(BridgeSpam).count(), 1);
    }
}

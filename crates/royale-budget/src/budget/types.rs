use crate::builder::BuildError;
use royale_core::model::DeckRecommendation;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How `find_optimal_decks` orders its full result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortCriteria {
    /// Return on investment, highest first.
    #[default]
    Roi,
    /// Cost efficiency, highest first.
    CostEfficiency,
    /// Total cards needed, lowest first.
    TotalCards,
    /// Total gold needed, lowest first.
    TotalGold,
    CurrentScore,
    ProjectedScore,
}

impl SortCriteria {
    pub const ALL: [SortCriteria; 6] = [
        SortCriteria::Roi,
        SortCriteria::CostEfficiency,
        SortCriteria::TotalCards,
        SortCriteria::TotalGold,
        SortCriteria::CurrentScore,
        SortCriteria::ProjectedScore,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            SortCriteria::Roi => "roi",
            SortCriteria::CostEfficiency => "cost_efficiency",
            SortCriteria::TotalCards => "total_cards",
            SortCriteria::TotalGold => "total_gold",
            SortCriteria::CurrentScore => "current_score",
            SortCriteria::ProjectedScore => "projected_score",
        }
    }
}

impl fmt::Display for SortCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort criteria '{0}'")]
pub struct UnknownSortCriteria(pub String);

impl FromStr for SortCriteria {
    type Err = UnknownSortCriteria;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        SortCriteria::ALL
            .into_iter()
            .find(|criteria| criteria.as_str() == normalized)
            .ok_or_else(|| UnknownSortCriteria(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetCategory {
    /// Already at the target average level with almost nothing left to buy.
    Ready,
    /// A couple of cheap upgrades away from viable.
    QuickWin,
    MediumInvestment,
    LongTerm,
}

impl BudgetCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            BudgetCategory::Ready => "ready",
            BudgetCategory::QuickWin => "quick_win",
            BudgetCategory::MediumInvestment => "medium_investment",
            BudgetCategory::LongTerm => "long_term",
        }
    }
}

impl fmt::Display for BudgetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score gained per thousand cards invested.
///
/// A deck that needs no cards but already scores above zero cannot be
/// improved further and is reported as [`Roi::AlreadyOptimal`], which ranks
/// above every finite value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Roi {
    AlreadyOptimal,
    Value(f64),
}

impl Roi {
    pub fn is_positive(self) -> bool {
        match self {
            Roi::AlreadyOptimal => true,
            Roi::Value(value) => value > 0.0,
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Roi::AlreadyOptimal => None,
            Roi::Value(value) => Some(value),
        }
    }

    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Roi::AlreadyOptimal, Roi::AlreadyOptimal) => Ordering::Equal,
            (Roi::AlreadyOptimal, Roi::Value(_)) => Ordering::Greater,
            (Roi::Value(_), Roi::AlreadyOptimal) => Ordering::Less,
            (Roi::Value(a), Roi::Value(b)) => a.total_cmp(b),
        }
    }
}

impl Default for Roi {
    fn default() -> Self {
        Roi::Value(0.0)
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Roi::AlreadyOptimal => f.write_str("already optimal"),
            Roi::Value(value) => write!(f, "{value:.2}"),
        }
    }
}

const ALREADY_OPTIMAL: &str = "already_optimal";

impl Serialize for Roi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Roi::AlreadyOptimal => serializer.serialize_str(ALREADY_OPTIMAL),
            Roi::Value(value) => serializer.serialize_f64(*value),
        }
    }
}

impl<'de> Deserialize<'de> for Roi {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Label(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Roi::Value(value)),
            Raw::Label(label) if label == ALREADY_OPTIMAL => Ok(Roi::AlreadyOptimal),
            Raw::Label(label) => Err(serde::de::Error::custom(format!(
                "expected a number or '{ALREADY_OPTIMAL}', found '{label}'"
            ))),
        }
    }
}

/// Tuning for [`BudgetFinder`](super::BudgetFinder). Zero limits mean
/// unlimited; `top_n = 0` keeps every analysed deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetFinderOptions {
    pub max_cards_needed: u32,
    pub max_gold_needed: u64,
    pub target_average_level: f64,
    pub quick_win_max_upgrades: usize,
    pub quick_win_max_cards: u32,
    pub sort_by: SortCriteria,
    pub top_n: usize,
    pub include_variations: bool,
    pub max_variations: usize,
}

impl Default for BudgetFinderOptions {
    fn default() -> Self {
        Self {
            max_cards_needed: 0,
            max_gold_needed: 0,
            target_average_level: 12.0,
            quick_win_max_upgrades: 2,
            quick_win_max_cards: 1000,
            sort_by: SortCriteria::Roi,
            top_n: 10,
            include_variations: false,
            max_variations: 5,
        }
    }
}

/// Cost of taking one deck card to its target level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardUpgradeDetail {
    pub card_name: String,
    pub current_level: u32,
    pub target_level: u32,
    pub cards_needed: u32,
    pub gold_needed: u64,
    /// Higher means upgrade sooner.
    pub priority: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckBudgetAnalysis {
    pub deck: DeckRecommendation,
    pub current_score: f64,
    pub projected_score: f64,
    pub total_cards_needed: u32,
    pub total_gold_needed: u64,
    pub roi: Roi,
    pub cost_efficiency: f64,
    pub upgrades_needed: usize,
    /// Sorted by priority, highest first.
    pub card_upgrades: Vec<CardUpgradeDetail>,
    pub is_quick_win: bool,
    pub viability_gap: f64,
    pub budget_category: BudgetCategory,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub total_decks_analyzed: usize,
    pub ready_deck_count: usize,
    pub quick_win_count: usize,
    pub average_cards_needed: u32,
    pub average_gold_needed: u64,
    pub best_roi: Roi,
    pub best_cost_efficiency: f64,
    pub lowest_cards_needed: u32,
    pub player_average_level: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BudgetFinderResult {
    /// Every analysed deck, sorted by the configured criteria and truncated
    /// to `top_n`.
    pub all_decks: Vec<DeckBudgetAnalysis>,
    /// Positive-ROI decks, best first, at most five.
    pub best_roi_decks: Vec<DeckBudgetAnalysis>,
    pub quick_wins: Vec<DeckBudgetAnalysis>,
    pub ready_decks: Vec<DeckBudgetAnalysis>,
    pub within_budget: Vec<DeckBudgetAnalysis>,
    pub summary: BudgetSummary,
}

#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("no card data available for analysis")]
    NoCardData,
    #[error("failed to build primary deck")]
    PrimaryBuild(#[source] BuildError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_optimal_outranks_every_value() {
        let mut rois = vec![Roi::Value(3.5), Roi::AlreadyOptimal, Roi::Value(-1.0)];
        rois.sort_by(|a, b| b.total_cmp(a));
        assert_eq!(rois[0], Roi::AlreadyOptimal);
        assert_eq!(rois[1], Roi::Value(3.5));
        assert!(Roi::AlreadyOptimal.is_positive());
        assert!(!Roi::Value(0.0).is_positive());
    }

    #[test]
    fn roi_serializes_as_number_or_label() {
        assert_eq!(
            serde_json::to_string(&Roi::AlreadyOptimal).unwrap(),
            "\"already_optimal\""
        );
        assert_eq!(serde_json::to_string(&Roi::Value(1.5)).unwrap(), "1.5");
        let back: Roi = serde_json::from_str("\"already_optimal\"").unwrap();
        assert_eq!(back, Roi::AlreadyOptimal);
        assert!(serde_json::from_str::<Roi>("\"infinite\"").is_err());
    }

    #[test]
    fn sort_criteria_parse_accepts_dashes() {
        assert_eq!(
            "cost-efficiency".parse::<SortCriteria>().unwrap(),
            SortCriteria::CostEfficiency
        );
        assert_eq!("ROI".parse::<SortCriteria>().unwrap(), SortCriteria::Roi);
        assert!("cheapest".parse::<SortCriteria>().is_err());
    }

    #[test]
    fn options_fill_missing_fields_with_defaults() {
        let options: BudgetFinderOptions =
            serde_json::from_str(r#"{"top_n": 3, "sort_by": "total_gold"}"#).unwrap();
        assert_eq!(options.top_n, 3);
        assert_eq!(options.sort_by, SortCriteria::TotalGold);
        assert_eq!(options.target_average_level, 12.0);
        assert_eq!(options.quick_win_max_cards, 1000);
    }
}

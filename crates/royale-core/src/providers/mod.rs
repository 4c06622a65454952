//! Read-only data sources consulted by the scorers.

pub mod curve;
pub mod stats;
pub mod synergy;

pub use curve::{CurveParams, ExponentialLevelCurve, LevelCurve, LevelCurvesFile};
pub use stats::{CardStatsFile, CardStatsRegistry, CombatStats, CombatStatsProvider};
pub use synergy::{
    DeckSynergyAnalysis, SynergyCategory, SynergyDatabase, SynergyPair, SynergyProvider,
    SynergyRecommendation,
};

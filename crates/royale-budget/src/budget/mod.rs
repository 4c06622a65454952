//! Budget/ROI ranking of candidate decks.

mod finder;
mod types;

pub use finder::BudgetFinder;
pub use types::{
    BudgetCategory, BudgetError, BudgetFinderOptions, BudgetFinderResult, BudgetSummary,
    CardUpgradeDetail, DeckBudgetAnalysis, Roi, SortCriteria, UnknownSortCriteria,
};

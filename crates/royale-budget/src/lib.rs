#![deny(warnings)]
pub mod budget;
pub mod builder;
pub mod whatif;

pub use budget::{BudgetFinder, BudgetFinderOptions, BudgetFinderResult, Roi, SortCriteria};
pub use builder::{BuildError, DeckBuilder, GreedyDeckBuilder};
pub use whatif::{CardUpgrade, WhatIfAnalyzer, WhatIfScenario, parse_card_upgrade};

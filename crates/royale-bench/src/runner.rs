use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use royale_budget::budget::{BudgetError, BudgetFinder, BudgetFinderResult};
use royale_budget::builder::{DeckBuilder, GreedyDeckBuilder};
use royale_budget::whatif::{CardUpgrade, WhatIfAnalyzer, WhatIfError, WhatIfScenario};
use royale_core::CoreError;
use royale_core::model::{CardLevels, load_card_levels};
use royale_core::providers::{
    CardStatsRegistry, CombatStatsProvider, ExponentialLevelCurve, LevelCurve, SynergyDatabase,
    SynergyProvider,
};
use royale_core::scoring::{
    CombatStatsScorer, CompositeScorer, EvolutionScorer, LevelRarityScorer, SynergyScorer,
    WeightedScorer,
};
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{AdvisorConfig, ResolvedOutputs, ScoringConfig, ValidationError};
use crate::report::{self, ReportError};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Data(#[from] CoreError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),
    #[error("budget analysis failed: {0}")]
    Budget(#[from] BudgetError),
    #[error("what-if simulation failed: {0}")]
    WhatIf(#[from] WhatIfError),
    #[error("report output failed: {0}")]
    Report(#[from] ReportError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub decks_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub result: BudgetFinderResult,
    pub scenario: Option<WhatIfScenario>,
}

/// Loads the collection and data files once, then produces the budget report
/// and optional what-if scenario.
pub struct AdvisorRunner {
    config: AdvisorConfig,
    outputs: ResolvedOutputs,
    levels: CardLevels,
    upgrades: Vec<CardUpgrade>,
    builder: Arc<dyn DeckBuilder>,
}

impl AdvisorRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: AdvisorConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let levels = load_card_levels(&config.collection.path)?;
        let upgrades = config.upgrades()?;
        let mut builder = build_deck_builder(&config.scoring)?;
        if let Some(limit) = config.collection.evolution_slot_limit {
            builder = builder.with_evolution_slot_limit(limit);
        }

        event!(
            target: "royale_bench::runner",
            Level::INFO,
            run_id = %config.run_id,
            cards = levels.len(),
            upgrades = upgrades.len(),
            "advisor runner ready"
        );

        Ok(Self {
            config,
            outputs,
            levels,
            upgrades,
            builder: Arc::new(builder),
        })
    }

    pub fn card_levels(&self) -> &CardLevels {
        &self.levels
    }

    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let finder = BudgetFinder::new(Arc::clone(&self.builder), self.config.budget.clone());
        let result = finder.find_optimal_decks(&self.levels)?;

        let scenario = if self.upgrades.is_empty() {
            None
        } else {
            let analyzer = WhatIfAnalyzer::new(Arc::clone(&self.builder));
            Some(analyzer.analyze_upgrade_path(&self.levels, &self.upgrades)?)
        };

        let decks_written = report::write_jsonl(&self.outputs.jsonl, &self.config.run_id, &result)?;
        report::write_markdown(
            &self.outputs.summary_md,
            &self.config.run_id,
            &result,
            scenario.as_ref(),
        )?;

        Ok(RunSummary {
            decks_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            result,
            scenario,
        })
    }
}

/// Wires the configured scorers and providers into a greedy deck builder.
pub fn build_deck_builder(scoring: &ScoringConfig) -> Result<GreedyDeckBuilder, RunnerError> {
    let curve: Option<Arc<dyn LevelCurve>> = match scoring.data.level_curves.as_deref() {
        Some(path) => Some(Arc::new(ExponentialLevelCurve::from_path(path)?)),
        None => None,
    };
    let stats: Option<Arc<dyn CombatStatsProvider>> = match scoring.data.card_stats.as_deref() {
        Some(path) => Some(Arc::new(CardStatsRegistry::from_path(path)?)),
        None => None,
    };
    let synergy: Arc<dyn SynergyProvider> = match scoring.data.synergy_pairs.as_deref() {
        Some(path) => Arc::new(SynergyDatabase::from_path(path)?),
        None => Arc::new(SynergyDatabase::with_defaults()),
    };

    let weights = scoring.weights;
    let composite = CompositeScorer::with_normalization(
        vec![
            WeightedScorer::new(
                Arc::new(LevelRarityScorer::with_config(
                    curve.clone(),
                    &scoring.level_rarity,
                )),
                weights.level_rarity,
            ),
            WeightedScorer::new(
                Arc::new(CombatStatsScorer::with_config(stats.clone(), &scoring.combat)),
                weights.combat,
            ),
            WeightedScorer::new(
                Arc::new(EvolutionScorer::with_config(scoring.evolution.clone())),
                weights.evolution,
            ),
            WeightedScorer::new(
                Arc::new(SynergyScorer::with_config(
                    Some(Arc::clone(&synergy)),
                    &scoring.synergy,
                )),
                weights.synergy,
            ),
        ],
        scoring.normalize,
    );

    let mut builder = GreedyDeckBuilder::new(Arc::new(composite))
        .with_synergy(synergy)
        .with_unlocked_evolutions(scoring.evolution.unlocked.clone())
        .with_role_multipliers(scoring.role_multipliers.clone());
    if let Some(curve) = curve {
        builder = builder.with_level_curve(curve);
    }
    if let Some(stats) = stats {
        builder = builder.with_combat_stats(stats);
    }
    if let Some([min, max]) = scoring.target_elixir {
        builder = builder.with_target_elixir(min, max);
    }
    Ok(builder)
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

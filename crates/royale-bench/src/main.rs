use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use royale_bench::config::{AdvisorConfig, ResolvedOutputs};
use royale_bench::logging::init_logging;
use royale_bench::runner::AdvisorRunner;
use royale_budget::budget::SortCriteria;
use royale_core::AppInfo;

/// Budget-aware deck advisor for a player's card collection.
#[derive(Debug, Parser)]
#[command(
    name = "royale-advisor",
    author,
    version,
    about = "Rank decks by upgrade cost and simulate what-if upgrades"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "advisor.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override how ranked decks are sorted.
    #[arg(long, value_name = "CRITERIA")]
    sort_by: Option<SortCriteria>,

    /// Override how many decks are kept (0 keeps all).
    #[arg(long, value_name = "N")]
    top_n: Option<usize>,

    /// Also analyse high-level, Common/Rare and near-max deck variations.
    #[arg(long)]
    variations: bool,

    /// Simulate an upgrade (`Name:To` or `Name:From:To`); repeatable.
    /// Replaces any upgrades listed in the configuration.
    #[arg(long = "upgrade", value_name = "SPEC")]
    upgrades: Vec<String>,

    /// Exit after validating the configuration and loading data files.
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AdvisorConfig::from_path(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(sort_by) = cli.sort_by {
        config.budget.sort_by = sort_by;
    }

    if let Some(top_n) = cli.top_n {
        config.budget.top_n = top_n;
    }

    if cli.variations {
        config.budget.include_variations = true;
    }

    if !cli.upgrades.is_empty() {
        config.what_if = cli.upgrades;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let upgrade_count = config.what_if.len();
    println!(
        "Loaded configuration '{run_id}' (sort by {}, top {}, {upgrade_count} what-if upgrade{})",
        config.budget.sort_by,
        config.budget.top_n,
        if upgrade_count == 1 { "" } else { "s" }
    );

    let logging_guard = init_logging(&config.run_id, &config.logging, &outputs)?;
    tracing::info!(
        engine = AppInfo::codename(),
        version = AppInfo::version(),
        run_id = %run_id,
        "{} starting",
        AppInfo::name()
    );
    let collection_path = config.collection.path.clone();
    let runner = AdvisorRunner::new(config, outputs)
        .with_context(|| format!("preparing advisor for collection {collection_path}"))?;
    println!(
        "Collection: {} cards from {collection_path}",
        runner.card_levels().len()
    );

    if cli.validate_only {
        println!("Validation-only mode: analysis skipped.");
        return Ok(());
    }

    let summary = runner.run().context("running budget analysis")?;
    println!(
        "Budget analysis complete for '{run_id}': {} deck{} → {}",
        summary.decks_written,
        if summary.decks_written == 1 { "" } else { "s" },
        summary.jsonl_path.display()
    );
    println!("Summary report: {}", summary.summary_path.display());
    if let Some(best) = summary.result.all_decks.first() {
        println!(
            "  Top deck ({}): {}",
            best.budget_category,
            best.deck.card_names().collect::<Vec<_>>().join(", ")
        );
        println!(
            "  {} cards / {} gold needed, ROI {}",
            best.total_cards_needed, best.total_gold_needed, best.roi
        );
    }
    if let Some(scenario) = summary.scenario.as_ref() {
        println!("What-if: {}", scenario.name);
        println!("  {}", scenario.impact.recommendation);
    }
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}

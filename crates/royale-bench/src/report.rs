use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use royale_budget::budget::{
    BudgetCategory, BudgetFinderResult, CardUpgradeDetail, DeckBudgetAnalysis, Roi,
};
use royale_budget::whatif::WhatIfScenario;
use serde::Serialize;
use statrs::statistics::Statistics;
use thiserror::Error;

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize report row: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn io_error(context: &'static str) -> impl FnOnce(std::io::Error) -> ReportError {
    move |source| ReportError::Io { context, source }
}

/// One JSONL line per ranked deck.
#[derive(Debug, Serialize)]
pub struct DeckRow<'a> {
    pub run_id: &'a str,
    pub rank: usize,
    pub cards: Vec<&'a str>,
    pub notes: &'a [String],
    pub average_elixir: f64,
    pub category: BudgetCategory,
    pub current_score: f64,
    pub projected_score: f64,
    pub roi: Roi,
    pub cost_efficiency: f64,
    pub total_cards_needed: u32,
    pub total_gold_needed: u64,
    pub upgrades_needed: usize,
    pub is_quick_win: bool,
    pub viability_gap: f64,
    pub card_score_ci95: (f64, f64),
    pub upgrades: &'a [CardUpgradeDetail],
}

impl<'a> DeckRow<'a> {
    pub fn new(run_id: &'a str, rank: usize, analysis: &'a DeckBudgetAnalysis) -> Self {
        let scores: Vec<f64> = analysis.deck.cards.iter().map(|c| c.score).collect();
        Self {
            run_id,
            rank,
            cards: analysis.deck.card_names().collect(),
            notes: &analysis.deck.notes,
            average_elixir: analysis.deck.average_elixir,
            category: analysis.budget_category,
            current_score: analysis.current_score,
            projected_score: analysis.projected_score,
            roi: analysis.roi,
            cost_efficiency: analysis.cost_efficiency,
            total_cards_needed: analysis.total_cards_needed,
            total_gold_needed: analysis.total_gold_needed,
            upgrades_needed: analysis.upgrades_needed,
            is_quick_win: analysis.is_quick_win,
            viability_gap: analysis.viability_gap,
            card_score_ci95: confidence_interval(&scores),
            upgrades: &analysis.card_upgrades,
        }
    }
}

/// Normal-approximation interval around the mean card score.
pub fn confidence_interval(points: &[f64]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = points.iter().mean();
    if points.len() == 1 {
        return (mean, mean);
    }
    let std_error = points.iter().std_dev() / (points.len() as f64).sqrt();
    let margin = CONFIDENCE_Z * std_error;
    (mean - margin, mean + margin)
}

/// Streams every ranked deck to `path`, returning the row count.
pub fn write_jsonl(
    path: impl AsRef<Path>,
    run_id: &str,
    result: &BudgetFinderResult,
) -> Result<usize, ReportError> {
    let file = File::create(path.as_ref()).map_err(io_error("creating deck jsonl"))?;
    let mut writer = BufWriter::new(file);
    for (idx, analysis) in result.all_decks.iter().enumerate() {
        serde_json::to_writer(&mut writer, &DeckRow::new(run_id, idx + 1, analysis))?;
        writer
            .write_all(b"\n")
            .map_err(io_error("writing deck jsonl"))?;
    }
    writer.flush().map_err(io_error("flushing deck jsonl"))?;
    Ok(result.all_decks.len())
}

pub fn write_markdown(
    path: impl AsRef<Path>,
    run_id: &str,
    result: &BudgetFinderResult,
    scenario: Option<&WhatIfScenario>,
) -> Result<(), ReportError> {
    fs::write(path.as_ref(), render_markdown(run_id, result, scenario))
        .map_err(io_error("writing summary markdown"))
}

pub fn render_markdown(
    run_id: &str,
    result: &BudgetFinderResult,
    scenario: Option<&WhatIfScenario>,
) -> String {
    let summary = &result.summary;
    let mut out = String::new();
    let _ = writeln!(out, "# Budget Report: {run_id}\n");
    let _ = writeln!(
        out,
        "Player average level: {:.2} | Decks analysed: {} | Ready: {} | Quick wins: {} | Within budget: {}\n",
        summary.player_average_level,
        summary.total_decks_analyzed,
        summary.ready_deck_count,
        summary.quick_win_count,
        result.within_budget.len(),
    );
    let _ = writeln!(
        out,
        "Best ROI: {} | Best cost efficiency: {:.3} | Lowest cards needed: {} | Average gold needed: {}\n",
        summary.best_roi,
        summary.best_cost_efficiency,
        summary.lowest_cards_needed,
        summary.average_gold_needed,
    );

    out.push_str("| Rank | Deck | Category | Current | Projected | ROI | Cost Eff. | Cards | Gold | Upgrades | Score 95% CI |\n");
    out.push_str("|------|------|----------|---------|-----------|-----|-----------|-------|------|----------|--------------|\n");
    for (idx, analysis) in result.all_decks.iter().enumerate() {
        let names: Vec<&str> = analysis.deck.card_names().collect();
        let scores: Vec<f64> = analysis.deck.cards.iter().map(|c| c.score).collect();
        let (ci_low, ci_high) = confidence_interval(&scores);
        let _ = writeln!(
            out,
            "| {rank} | {deck} | {category} | {current:.3} | {projected:.3} | {roi} | {eff:.3} | {cards} | {gold} | {upgrades} | [{ci_low:.3}, {ci_high:.3}] |",
            rank = idx + 1,
            deck = names.join(", "),
            category = analysis.budget_category,
            current = analysis.current_score,
            projected = analysis.projected_score,
            roi = analysis.roi,
            eff = analysis.cost_efficiency,
            cards = analysis.total_cards_needed,
            gold = analysis.total_gold_needed,
            upgrades = analysis.upgrades_needed,
        );
    }

    if let Some(top) = result.all_decks.first()
        && !top.card_upgrades.is_empty()
    {
        out.push_str("\n## Upgrade priorities (top deck)\n\n");
        out.push_str("| Card | Level | Target | Cards | Gold | Priority |\n");
        out.push_str("|------|-------|--------|-------|------|----------|\n");
        for upgrade in &top.card_upgrades {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} | {:.3} |",
                upgrade.card_name,
                upgrade.current_level,
                upgrade.target_level,
                upgrade.cards_needed,
                upgrade.gold_needed,
                upgrade.priority,
            );
        }
    }

    if let Some(scenario) = scenario {
        let impact = &scenario.impact;
        let _ = writeln!(out, "\n## What-if: {}\n", scenario.name);
        let _ = writeln!(out, "- Total gold: {}", scenario.total_gold);
        let _ = writeln!(
            out,
            "- Score delta: {:+.3} ({:+.1}%)",
            impact.deck_score_delta, impact.viability_improvement
        );
        let _ = writeln!(out, "- New cards: {}", list_or_none(&impact.new_cards_in_deck));
        let _ = writeln!(out, "- Removed cards: {}", list_or_none(&impact.removed_cards));
        let _ = writeln!(out, "\n{}", impact.recommendation);
    }
    out
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use royale_bench::config::AdvisorConfig;
use royale_bench::runner::AdvisorRunner;
use sha2::{Digest, Sha256};
use tempfile::tempdir;

const COLLECTION: &str = r#"{
  "Giant": {"level": 12, "max_level": 14, "rarity": "Rare", "elixir": 5, "role": "win_conditions"},
  "Witch": {"level": 11, "max_level": 14, "rarity": "Epic", "elixir": 5, "role": "support"},
  "Musketeer": {"level": 12, "max_level": 14, "rarity": "Rare", "elixir": 4, "role": "support"},
  "Knight": {"level": 14, "max_level": 14, "rarity": "Common", "elixir": 3, "role": "cycle"},
  "Fireball": {"level": 13, "max_level": 14, "rarity": "Rare", "elixir": 4, "role": "spells_big"},
  "Zap": {"level": 13, "max_level": 14, "rarity": "Common", "elixir": 2, "role": "spells_small"},
  "Cannon": {"level": 13, "max_level": 14, "rarity": "Common", "elixir": 3, "role": "buildings"},
  "Skeletons": {"level": 14, "max_level": 14, "rarity": "Common", "elixir": 1, "role": "cycle"},
  "Archers": {"level": 10, "max_level": 14, "rarity": "Common", "elixir": 3, "role": "support",
              "evolution_level": 1, "max_evolution_level": 1},
  "Hog Rider": {"level": 13, "max_level": 14, "rarity": "Rare", "elixir": 4, "role": "win_conditions"},
  "Valkyrie": {"level": 12, "max_level": 14, "rarity": "Rare", "elixir": 4},
  "The Log": {"level": 9, "max_level": 14, "rarity": "legendary", "elixir": 2, "role": "spells_small"}
}"#;

fn load_config(data_dir: &Path, output_dir: &Path) -> AdvisorConfig {
    let collection = data_dir.join("collection.json");
    fs::write(&collection, COLLECTION).expect("write collection");

    let yaml = format!(
        r#"
run_id: "test_smoke"
collection:
  path: "{collection}"
scoring:
  evolution:
    unlocked: ["Archers"]
  target_elixir: [2.6, 4.2]
budget:
  sort_by: "roi"
  include_variations: true
  top_n: 0
what_if:
  - "Archers:14"
  - "The Log:9:12"
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
logging:
  enable_structured: false
"#,
        collection = collection.display(),
        jsonl = output_dir.join("{run_id}").join("decks.jsonl").display(),
        summary = output_dir.join("{run_id}").join("summary.md").display(),
    );

    let mut cfg: AdvisorConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

fn run_once(data_dir: &Path, output_dir: &Path) -> (String, PathBuf, usize) {
    let config = load_config(data_dir, output_dir);
    let outputs = config.resolved_outputs();
    let runner = AdvisorRunner::new(config, outputs).expect("runner created");
    assert_eq!(runner.card_levels().len(), 12);

    let summary = runner.run().expect("analysis completes");
    assert!(summary.decks_written >= 1);
    assert_eq!(summary.result.all_decks.len(), summary.decks_written);
    let scenario = summary.scenario.as_ref().expect("what-if scenario");
    assert_eq!(scenario.upgrades.len(), 2);
    assert!(scenario.total_gold > 0);

    let jsonl = fs::read_to_string(&summary.jsonl_path).expect("jsonl readable");
    assert_eq!(jsonl.lines().count(), summary.decks_written);
    for line in jsonl.lines() {
        let row: serde_json::Value = serde_json::from_str(line).expect("row decodes to JSON");
        assert_eq!(row["run_id"], "test_smoke");
        assert_eq!(row["cards"].as_array().map(Vec::len), Some(8));
    }

    let mut hasher = Sha256::new();
    hasher.update(jsonl.as_bytes());
    (
        hex::encode(hasher.finalize()),
        summary.summary_path,
        summary.decks_written,
    )
}

#[test]
fn advisor_smoke_test_is_reproducible() {
    let data = tempdir().expect("data dir");
    let first_out = tempdir().expect("first output dir");
    let second_out = tempdir().expect("second output dir");

    let (first_hash, summary_path, decks) = run_once(data.path(), first_out.path());
    let (second_hash, _, second_decks) = run_once(data.path(), second_out.path());

    assert_eq!(decks, second_decks);
    assert_eq!(
        first_hash, second_hash,
        "JSONL output differs between identical runs"
    );

    assert!(summary_path.ends_with("test_smoke/summary.md"));
    let markdown = fs::read_to_string(&summary_path).expect("summary markdown readable");
    assert!(markdown.starts_with("# Budget Report: test_smoke"));
    assert!(markdown.contains("## What-if: Upgrade 2 cards: Archers, The Log"));
}

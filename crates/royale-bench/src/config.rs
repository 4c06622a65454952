use royale_budget::budget::BudgetFinderOptions;
use royale_budget::whatif::{CardUpgrade, parse_card_upgrade};
use royale_core::model::CardRole;
use royale_core::scoring::{CombatConfig, EvolutionConfig, LevelRarityConfig, SynergyConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root advisor configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AdvisorConfig {
    pub run_id: String,
    pub collection: CollectionConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub budget: BudgetFinderOptions,
    /// Upgrade specs (`Name:To` or `Name:From:To`) simulated after the budget
    /// report, all together as one scenario.
    #[serde(default)]
    pub what_if: Vec<String>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AdvisorConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: AdvisorConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.collection.validate()?;
        self.scoring.validate()?;
        validate_budget(&self.budget)?;
        self.upgrades()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Parsed what-if upgrades, in configuration order.
    pub fn upgrades(&self) -> Result<Vec<CardUpgrade>, ValidationError> {
        self.what_if
            .iter()
            .enumerate()
            .map(|(idx, spec)| {
                parse_card_upgrade(spec).map_err(|err| ValidationError::InvalidField {
                    field: format!("what_if[{idx}]"),
                    message: err.to_string(),
                })
            })
            .collect()
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

/// Where the player's card collection lives and how evolutions are slotted.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CollectionConfig {
    pub path: String,
    #[serde(default)]
    pub evolution_slot_limit: Option<usize>,
}

impl CollectionConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.path.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "collection.path".to_string(),
                message: "path must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Optional data files backing the scorers. Missing entries leave the
/// corresponding provider unset (or, for synergy, the built-in pairs).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataFiles {
    pub level_curves: Option<String>,
    pub card_stats: Option<String>,
    pub synergy_pairs: Option<String>,
}

/// Composite weights for the four built-in scorers.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScorerWeights {
    pub level_rarity: f64,
    pub combat: f64,
    pub evolution: f64,
    pub synergy: f64,
}

impl Default for ScorerWeights {
    fn default() -> Self {
        Self {
            level_rarity: 0.6,
            combat: 0.2,
            evolution: 0.1,
            synergy: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScorerWeights,
    pub normalize: bool,
    pub level_rarity: LevelRarityConfig,
    pub combat: CombatConfig,
    pub evolution: EvolutionConfig,
    pub synergy: SynergyConfig,
    pub data: DataFiles,
    /// Strategy elixir window `[min, max]`.
    pub target_elixir: Option<[f64; 2]>,
    pub role_multipliers: HashMap<CardRole, f64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScorerWeights::default(),
            normalize: true,
            level_rarity: LevelRarityConfig::default(),
            combat: CombatConfig::default(),
            evolution: EvolutionConfig::default(),
            synergy: SynergyConfig::default(),
            data: DataFiles::default(),
            target_elixir: None,
            role_multipliers: HashMap::new(),
        }
    }
}

impl ScoringConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        let w = &self.weights;
        for (label, value) in [
            ("scoring.weights.level_rarity", w.level_rarity),
            ("scoring.weights.combat", w.combat),
            ("scoring.weights.evolution", w.evolution),
            ("scoring.weights.synergy", w.synergy),
        ] {
            ensure_non_negative(label, value)?;
        }

        if let Some([min, max]) = self.target_elixir {
            ensure_non_negative("scoring.target_elixir", min)?;
            ensure_non_negative("scoring.target_elixir", max)?;
            if min > max {
                return Err(ValidationError::InvalidField {
                    field: "scoring.target_elixir".to_string(),
                    message: format!("minimum {min} exceeds maximum {max}"),
                });
            }
        }

        let mut roles: Vec<_> = self.role_multipliers.iter().collect();
        roles.sort_by_key(|(role, _)| role.as_str());
        for (role, value) in roles {
            ensure_non_negative(&format!("scoring.role_multipliers.{role}"), *value)?;
        }

        for (label, value) in [
            ("scoring.data.level_curves", &self.data.level_curves),
            ("scoring.data.card_stats", &self.data.card_stats),
            ("scoring.data.synergy_pairs", &self.data.synergy_pairs),
        ] {
            if value.as_deref().is_some_and(|path| path.trim().is_empty()) {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty when set".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn ensure_non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }
    Err(ValidationError::InvalidField {
        field: field.to_string(),
        message: format!("value must be a non-negative number, found {value}"),
    })
}

fn validate_budget(budget: &BudgetFinderOptions) -> Result<(), ValidationError> {
    if !budget.target_average_level.is_finite() || budget.target_average_level <= 0.0 {
        return Err(ValidationError::InvalidField {
            field: "budget.target_average_level".to_string(),
            message: "target average level must be greater than zero".to_string(),
        });
    }
    Ok(())
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use royale_budget::budget::SortCriteria;
    use std::io::Write;

    const BASIC_YAML: &str = r#"
run_id: "ladder_push"
collection:
  path: "data/collection.json"
scoring:
  weights:
    level_rarity: 0.7
    synergy: 0.3
  level_rarity:
    elixir_optimal: 3.5
  evolution:
    unlocked: ["Knight", "Archers"]
  target_elixir: [2.8, 4.0]
  role_multipliers:
    win_conditions: 1.2
budget:
  sort_by: "cost_efficiency"
  include_variations: true
what_if:
  - "Hog Rider:14"
  - "Zap:12:13"
outputs:
  jsonl: "advisor/out/{run_id}/decks.jsonl"
  summary_md: "advisor/out/{run_id}/summary.md"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    fn parse(yaml: &str) -> AdvisorConfig {
        serde_yaml::from_str(yaml).expect("parse yaml")
    }

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg = parse(BASIC_YAML);
        cfg.validate().expect("validate");

        assert_eq!(cfg.scoring.weights.level_rarity, 0.7);
        assert_eq!(cfg.scoring.weights.combat, ScorerWeights::default().combat);
        assert!(cfg.scoring.normalize);
        assert_eq!(cfg.scoring.level_rarity.elixir_optimal, Some(3.5));
        assert_eq!(cfg.scoring.level_rarity.elixir_max_diff, None);
        assert!(cfg.scoring.evolution.unlocked.contains("Archers"));
        assert_eq!(
            cfg.scoring.role_multipliers.get(&CardRole::WinCondition),
            Some(&1.2)
        );
        assert_eq!(cfg.budget.sort_by, SortCriteria::CostEfficiency);
        assert_eq!(cfg.budget.top_n, 10);
        assert!(cfg.logging.enable_structured);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));

        let upgrades = cfg.upgrades().expect("upgrades parse");
        assert_eq!(upgrades.len(), 2);
        assert_eq!(upgrades[1].from_level, Some(12));

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.jsonl,
            PathBuf::from("advisor/out/ladder_push/decks.jsonl")
        );
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let yaml = r#"
run_id: "min"
collection:
  path: "c.json"
outputs:
  jsonl: "out.jsonl"
  summary_md: "out.md"
"#;
        let mut cfg = parse(yaml);
        cfg.validate().expect("validate");
        assert_eq!(cfg.scoring, ScoringConfig::default());
        assert_eq!(cfg.budget, BudgetFinderOptions::default());
        assert!(cfg.what_if.is_empty());
        assert!(!cfg.logging.enable_structured);
    }

    #[test]
    fn rejects_negative_weight() {
        let yaml = BASIC_YAML.replace("synergy: 0.3", "synergy: -0.3");
        let err = parse(&yaml).validate().expect_err("negative weight");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "scoring.weights.synergy"
        ));
    }

    #[test]
    fn rejects_inverted_elixir_window() {
        let yaml = BASIC_YAML.replace("[2.8, 4.0]", "[4.5, 3.0]");
        let err = parse(&yaml).validate().expect_err("inverted window");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "scoring.target_elixir"
        ));
    }

    #[test]
    fn rejects_malformed_what_if_spec() {
        let yaml = BASIC_YAML.replace("\"Zap:12:13\"", "\"Zap:13:12\"");
        let err = parse(&yaml).validate().expect_err("bad spec");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "what_if[1]"
        ));
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("ladder_push", "ladder push");
        let err = parse(&yaml).validate().expect_err("invalid run id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "run_id"
        ));
    }

    #[test]
    fn blank_tracing_level_falls_back_to_info() {
        let yaml = BASIC_YAML.replace("tracing_level: \"debug\"", "tracing_level: \"  \"");
        let mut cfg = parse(&yaml);
        cfg.validate().expect("valid");
        assert_eq!(cfg.logging.level(), Some(Level::INFO));
    }

    #[test]
    fn from_path_reports_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(BASIC_YAML.replace("data/collection.json", " ").as_bytes())
            .expect("write yaml");
        let err = AdvisorConfig::from_path(file.path()).expect_err("blank collection path");
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert_eq!(err.path(), file.path());
    }
}

use crate::error::CoreError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Converts a card level into a non-linear progression ratio in `[0, 1]`.
pub trait LevelCurve: Send + Sync {
    fn relative_level_ratio(&self, card: &str, level: u32, max_level: u32) -> f64;
}

const DEFAULT_KEY: &str = "_default";

/// Curve parameters for one card. Scales are percentages (100 = 1.0x).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveParams {
    pub base_scale: f64,
    pub growth_rate: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub rarity_bonus: f64,
    /// Exact multipliers (in percent) for specific levels.
    pub level_overrides: HashMap<u32, f64>,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            base_scale: 100.0,
            growth_rate: 0.10,
            min_scale: 0.0,
            max_scale: 400.0,
            rarity_bonus: 0.0,
            level_overrides: HashMap::new(),
        }
    }
}

impl CurveParams {
    fn fill_missing(mut self) -> Self {
        let defaults = CurveParams::default();
        if self.base_scale == 0.0 {
            self.base_scale = defaults.base_scale;
        }
        if self.growth_rate == 0.0 {
            self.growth_rate = defaults.growth_rate;
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelCurvesFile {
    #[serde(default)]
    pub curves: HashMap<String, CurveParams>,
}

/// Per-card exponential growth curve (roughly +10% stats per level).
#[derive(Debug, Default)]
pub struct ExponentialLevelCurve {
    curves: HashMap<String, CurveParams>,
    cache: RwLock<HashMap<String, CurveParams>>,
}

impl ExponentialLevelCurve {
    pub fn new(curves: HashMap<String, CurveParams>) -> Self {
        Self {
            curves,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Load curves from JSON. A missing file yields the default curve for
    /// every card.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "level curve file missing; using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(CoreError::Read {
                    what: "level curves",
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let file: LevelCurvesFile =
            serde_json::from_str(&contents).map_err(|source| CoreError::Parse {
                what: "level curves",
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(file.curves))
    }

    /// Resolved params for `card`. Cards without their own entry share the
    /// `_default` slot, so the cache never holds more than one entry per
    /// configured curve plus the default.
    fn params(&self, card: &str) -> CurveParams {
        let key = if self.curves.contains_key(card) {
            card
        } else {
            DEFAULT_KEY
        };
        if let Some(params) = self.cache.read().get(key) {
            return params.clone();
        }
        let resolved = self
            .curves
            .get(key)
            .cloned()
            .unwrap_or_default()
            .fill_missing();
        self.cache.write().insert(key.to_string(), resolved.clone());
        resolved
    }

    /// Stat multiplier relative to level 1 stats.
    pub fn level_multiplier(&self, card: &str, level: u32) -> f64 {
        if level == 0 {
            return 0.0;
        }
        let params = self.params(card);
        if let Some(percent) = params.level_overrides.get(&level) {
            return percent / 100.0;
        }

        let exponent = f64::from(level - 1);
        let mut scaled = params.base_scale
            * (1.0 + params.growth_rate).powf(exponent)
            * (1.0 + params.rarity_bonus);
        if params.min_scale > 0.0 && scaled < params.min_scale {
            scaled = params.min_scale;
        }
        if params.max_scale > 0.0 && scaled > params.max_scale {
            scaled = params.max_scale;
        }
        scaled / 100.0
    }
}

impl LevelCurve for ExponentialLevelCurve {
    fn relative_level_ratio(&self, card: &str, level: u32, max_level: u32) -> f64 {
        if max_level == 0 {
            return 0.0;
        }
        let current = self.level_multiplier(card, level);
        let max = self.level_multiplier(card, max_level);
        if max <= 0.0 {
            return 0.0;
        }
        current / max
    }
}

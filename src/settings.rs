//! run settings: canvas geometry, population shape, operator weights and
//! persistence paths. shared read-only by every canvas through the environment.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EvolveError, Result};
use crate::fitness::FitnessStrategy;
use crate::mutation_config::MutateConfig;

/// how offspring are produced each epoch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reproduction {
    /// mutate a clone of every individual
    Mutation,
    /// roulette-paired single-point crossover, offspring then mutated
    CrossoverAndMutation,
}

/// convexity handling for freshly generated polygons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvexityPolicy {
    /// accept whatever the uniform draw produced
    Any,
    /// redraw until convex, accepting the last draw once the budget is spent
    RetryConvex { max_attempts: u32 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// population size kept after each epoch
    pub canvas_count: usize,
    pub polygon_count: usize,
    /// coordinates per polygon, i.e. 3 => triangle
    pub polygon_edge_count: usize,

    pub mutation: MutateConfig,
    pub reproduction: Reproduction,
    /// share of the population paired into crossover couples
    pub crossover_factor: f64,
    pub convexity: ConvexityPolicy,
    pub fitness: FitnessStrategy,

    /// fixed seed for the run's random source (None = from OS entropy)
    pub rng_seed: Option<u64>,

    /// append-only `epoch,elapsed,fitness` log
    pub statistics_path: Option<PathBuf>,
    /// `*.canvas` file holding the fittest canvas for suspend/resume
    pub suspend_path: Option<PathBuf>,
    /// write the fittest canvas to `suspend_path` every N epochs
    pub checkpoint_interval: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_width: 100,
            canvas_height: 100,
            canvas_count: 10,
            polygon_count: 50,
            polygon_edge_count: 3,

            mutation: MutateConfig::default(),
            reproduction: Reproduction::Mutation,
            crossover_factor: 0.5,
            convexity: ConvexityPolicy::Any,
            fitness: FitnessStrategy::MeanSquaredSimilarity,

            rng_seed: None,

            statistics_path: None,
            suspend_path: None,
            checkpoint_interval: None,
        }
    }
}

impl Settings {
    /// bytes of one encoded polygon: RGBA + 8 per coordinate
    #[inline]
    pub fn polygon_bytes(&self) -> usize {
        4 + 8 * self.polygon_edge_count
    }

    /// bytes of one encoded canvas
    #[inline]
    pub fn canvas_bytes(&self) -> usize {
        self.polygon_bytes() * self.polygon_count
    }

    /// number of couples formed per crossover epoch
    #[inline]
    pub fn couple_count(&self) -> usize {
        (self.canvas_count as f64 * self.crossover_factor).floor() as usize
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(EvolveError::InvalidSettings(msg.to_owned()));

        if self.canvas_width == 0 || self.canvas_height == 0 {
            return invalid("canvas dimensions must be non-zero");
        }
        if i32::try_from(self.canvas_width).is_err() || i32::try_from(self.canvas_height).is_err() {
            return invalid("canvas dimensions must fit in a signed 32-bit coordinate");
        }
        if self.canvas_count == 0 {
            return invalid("canvas_count must be at least 1");
        }
        if self.polygon_count == 0 {
            return invalid("polygon_count must be at least 1");
        }
        if self.polygon_edge_count == 0 {
            return invalid("polygon_edge_count must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.crossover_factor) {
            return invalid("crossover_factor must be within [0, 1]");
        }
        if self.reproduction == Reproduction::CrossoverAndMutation && self.canvas_count < 2 {
            return invalid("crossover needs at least two canvases");
        }
        if let ConvexityPolicy::RetryConvex { max_attempts: 0 } = self.convexity {
            return invalid("convexity retry budget must be at least 1");
        }
        if self.checkpoint_interval == Some(0) {
            return invalid("checkpoint_interval must be at least 1");
        }
        self.mutation.validate().map_err(EvolveError::InvalidSettings)
    }

    /// save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// load settings, or return defaults if the file is missing or unreadable
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => settings,
            Err(EvolveError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!("failed to load {}: {}. using defaults.", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation_config::{Scope, ZOrder};

    #[test]
    fn defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn encoded_sizes() {
        let s = Settings { polygon_count: 2, polygon_edge_count: 3, ..Settings::default() };
        assert_eq!(s.polygon_bytes(), 28);
        assert_eq!(s.canvas_bytes(), 56);
    }

    #[test]
    fn couple_count_floors() {
        let s = Settings { canvas_count: 7, crossover_factor: 0.5, ..Settings::default() };
        assert_eq!(s.couple_count(), 3);
    }

    #[test]
    fn validate_rejects() {
        let cases = [
            Settings { canvas_width: 0, ..Settings::default() },
            Settings { polygon_count: 0, ..Settings::default() },
            Settings { polygon_edge_count: 0, ..Settings::default() },
            Settings { crossover_factor: 1.5, ..Settings::default() },
            Settings {
                canvas_count: 1,
                reproduction: Reproduction::CrossoverAndMutation,
                ..Settings::default()
            },
            Settings { convexity: ConvexityPolicy::RetryConvex { max_attempts: 0 }, ..Settings::default() },
            Settings { checkpoint_interval: Some(0), ..Settings::default() },
        ];
        for case in cases {
            assert!(
                matches!(case.validate(), Err(EvolveError::InvalidSettings(_))),
                "accepted {case:?}"
            );
        }
    }

    #[test]
    fn json_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            canvas_width: 64,
            polygon_edge_count: 5,
            reproduction: Reproduction::CrossoverAndMutation,
            convexity: ConvexityPolicy::RetryConvex { max_attempts: 10 },
            fitness: FitnessStrategy::ExactMatch,
            mutation: MutateConfig {
                color_scope: Scope::All,
                z_order: ZOrder::Shuffle,
                ..MutateConfig::default()
            },
            rng_seed: Some(7),
            suspend_path: Some(PathBuf::from("saves/Suspended.canvas")),
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "polygon_count": 7 }"#).unwrap();
        assert_eq!(settings.polygon_count, 7);
        assert_eq!(settings.canvas_width, Settings::default().canvas_width);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_or_default(dir.path().join("nope.json"));
        assert_eq!(settings, Settings::default());
    }
}

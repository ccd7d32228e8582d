//! Application configuration.

use crate::agent::QLearningConfig;
use crate::error::Result;
use crate::gridworld::{Cell, GridLayout};
use crate::hopfield::HopfieldConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Hopfield recall settings
    pub hopfield: HopfieldConfig,
    /// Share of units flipped when corrupting a demo pattern
    #[serde(default = "default_noise_level")]
    pub noise_level: f64,
    /// Grid layout
    pub grid: GridConfig,
    /// Q-learning hyper-parameters
    pub learner: QLearningConfig,
    /// Training loop settings
    pub training: TrainingConfig,
}

fn default_noise_level() -> f64 {
    0.1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hopfield: HopfieldConfig::default(),
            noise_level: default_noise_level(),
            grid: GridConfig::default(),
            learner: QLearningConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

/// Grid layout as written in a config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    pub start: Cell,
    pub goal: Cell,
    #[serde(default)]
    pub obstacles: Vec<Cell>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 10,
            start: (0, 0),
            goal: (9, 9),
            obstacles: vec![(2, 2), (3, 5), (5, 3), (6, 7), (7, 1)],
        }
    }
}

impl GridConfig {
    /// Build and validate the layout
    pub fn to_layout(&self) -> Result<GridLayout> {
        GridLayout::new(
            self.rows,
            self.cols,
            self.start,
            self.goal,
            self.obstacles.iter().copied(),
        )
    }
}

/// Training loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of training episodes
    pub episodes: usize,
    /// Maximum steps per episode
    pub max_steps_per_episode: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 1000,
            max_steps_per_episode: 500,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Defaults overridden from environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Override fields from environment variables
    ///
    /// Recognised: `HOPFIELD_MODE`, `HOPFIELD_MAX_ITERATIONS`,
    /// `HOPFIELD_NOISE`, `QLEARNING_ALPHA`, `QLEARNING_GAMMA`,
    /// `QLEARNING_SEED`, `QLEARNING_EPISODES`, `QLEARNING_MAX_STEPS`.
    /// Unparseable values are logged and ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Override fields from any key-value source using the environment keys
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = parse_override(&lookup, "HOPFIELD_MODE") {
            self.hopfield.mode = mode;
        }
        if let Some(iterations) = parse_override(&lookup, "HOPFIELD_MAX_ITERATIONS") {
            self.hopfield.max_iterations = iterations;
        }
        if let Some(noise) = parse_override(&lookup, "HOPFIELD_NOISE") {
            self.noise_level = noise;
        }
        if let Some(alpha) = parse_override(&lookup, "QLEARNING_ALPHA") {
            self.learner.alpha = alpha;
        }
        if let Some(gamma) = parse_override(&lookup, "QLEARNING_GAMMA") {
            self.learner.gamma = gamma;
        }
        if let Some(seed) = parse_override(&lookup, "QLEARNING_SEED") {
            self.learner.seed = Some(seed);
        }
        if let Some(episodes) = parse_override(&lookup, "QLEARNING_EPISODES") {
            self.training.episodes = episodes;
        }
        if let Some(max_steps) = parse_override(&lookup, "QLEARNING_MAX_STEPS") {
            self.training.max_steps_per_episode = max_steps;
        }
        self
    }
}

fn parse_override<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable override");
            None
        }
    }
}

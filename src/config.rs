use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::energy::EnergyParams;

pub const DEFAULT_CONFIG_FILE: &str = "snake.config";

pub const DEFAULT_ALPHA: f64 = 0.1;
pub const DEFAULT_BETA: f64 = 0.1;
pub const DEFAULT_GAMMA: f64 = 1.0;

// Loads a configuration value from a `key = value` file for a given key.
pub fn load_config_value<P: AsRef<Path>>(config_path: P, key_to_find: &str) -> Option<String> {
    let config_path = config_path.as_ref();
    if !config_path.exists() {
        return None;
    }

    let file = File::open(config_path).ok()?;
    let reader = BufReader::new(file);

    for line in reader.lines() {
        let line = line.ok()?;
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            if key.trim() == key_to_find {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}

/// Energy weights read from a config file, with built-in fallbacks for
/// missing or unparsable keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyDefaults {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Default for EnergyDefaults {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
            gamma: DEFAULT_GAMMA,
        }
    }
}

impl EnergyDefaults {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Self {
        let config_path = config_path.as_ref();
        let read = |key: &str, fallback: f64| {
            load_config_value(config_path, key)
                .and_then(|value| value.parse::<f64>().ok())
                .unwrap_or(fallback)
        };

        Self {
            alpha: read("alpha", DEFAULT_ALPHA),
            beta: read("beta", DEFAULT_BETA),
            gamma: read("gamma", DEFAULT_GAMMA),
        }
    }

    /// Combines the defaults with explicit overrides, which take precedence.
    pub fn resolve(&self, alpha: Option<f64>, beta: Option<f64>, gamma: Option<f64>) -> EnergyParams {
        EnergyParams::new(
            alpha.unwrap_or(self.alpha),
            beta.unwrap_or(self.beta),
            gamma.unwrap_or(self.gamma),
        )
    }
}

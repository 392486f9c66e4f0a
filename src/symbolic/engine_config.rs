//! Engine settings shared by the differentiator, the simplifier, Taylor expansions and parallel
//! evaluation. Settings can be set in code with the `with_*` methods or read from a TOML
//! document:
//! ```toml
//! [engine]
//! epsilon = 1e-6
//! simplify_derivatives = true
//! max_simplify_passes = 8
//! parallel_threshold = 64
//! loglevel = "info"
//! ```
use crate::symbolic::errors::{FunctionError, FunctionResult};
use log::warn;
use simplelog::LevelFilter;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// step of the central-difference fallback
    pub epsilon: f64,
    /// simplify every derivative the engine produces
    pub simplify_derivatives: bool,
    /// bound on the passes of the simplifier's fixpoint loop
    pub max_simplify_passes: usize,
    /// aggregates with at least this many operands are evaluated on the rayon pool
    pub parallel_threshold: Option<usize>,
    pub loglevel: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> EngineConfig {
        EngineConfig {
            epsilon: 1e-6,
            simplify_derivatives: true,
            max_simplify_passes: 8,
            parallel_threshold: None,
            loglevel: Some("info".to_string()),
        }
    }
}

impl EngineConfig {
    pub fn new() -> EngineConfig {
        EngineConfig::default()
    }

    /// Step of the numerical derivative. Values outside of (0, 1) are kept, with a warning.
    pub fn with_epsilon(mut self, epsilon: f64) -> EngineConfig {
        check_epsilon(epsilon);
        self.epsilon = epsilon;
        self
    }

    pub fn with_simplify_derivatives(mut self, simplify: bool) -> EngineConfig {
        self.simplify_derivatives = simplify;
        self
    }

    pub fn with_max_simplify_passes(mut self, passes: usize) -> EngineConfig {
        self.max_simplify_passes = passes.max(1);
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: Option<usize>) -> EngineConfig {
        self.parallel_threshold = threshold;
        self
    }

    pub fn with_loglevel(mut self, loglevel: Option<String>) -> EngineConfig {
        self.loglevel = loglevel;
        self
    }

    /// "debug"/"info"/"warn"/"error"/"off"; `None` means logging stays off.
    pub fn log_level_filter(&self) -> FunctionResult<LevelFilter> {
        match self.loglevel.as_deref() {
            None => Ok(LevelFilter::Off),
            Some(level) => match level.to_lowercase().as_str() {
                "debug" => Ok(LevelFilter::Debug),
                "info" => Ok(LevelFilter::Info),
                "warn" => Ok(LevelFilter::Warn),
                "error" => Ok(LevelFilter::Error),
                "off" => Ok(LevelFilter::Off),
                other => Err(FunctionError::Argument(format!(
                    "loglevel must be debug, info, warn, error or off, got {}",
                    other
                ))),
            },
        }
    }

    /// Reads the `[engine]` table (or the top level, if there is no such table). Missing keys
    /// keep their defaults.
    pub fn from_toml_str(document: &str) -> FunctionResult<EngineConfig> {
        let root = document
            .parse::<toml::Table>()
            .map_err(|e| FunctionError::Argument(format!("invalid engine configuration: {}", e)))?;
        let table = match root.get("engine") {
            Some(toml::Value::Table(engine)) => engine.clone(),
            Some(_) => {
                return Err(FunctionError::Argument(
                    "[engine] must be a table".to_string(),
                ));
            }
            None => root,
        };
        let wrong_type = |key: &str, expected: &str| {
            FunctionError::Argument(format!("engine key {} must be {}", key, expected))
        };
        let mut config = EngineConfig::default();
        for (key, value) in table.iter() {
            match key.as_str() {
                "epsilon" => {
                    let eps = match value {
                        toml::Value::Float(x) => *x,
                        toml::Value::Integer(n) => *n as f64,
                        _ => return Err(wrong_type(key, "a number")),
                    };
                    config = config.with_epsilon(eps);
                }
                "simplify_derivatives" => {
                    let flag = value.as_bool().ok_or_else(|| wrong_type(key, "a boolean"))?;
                    config = config.with_simplify_derivatives(flag);
                }
                "max_simplify_passes" => {
                    let passes = value
                        .as_integer()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| wrong_type(key, "a positive integer"))?;
                    config = config.with_max_simplify_passes(passes as usize);
                }
                "parallel_threshold" => {
                    let threshold = value
                        .as_integer()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| wrong_type(key, "a positive integer"))?;
                    config = config.with_parallel_threshold(Some(threshold as usize));
                }
                "loglevel" => {
                    let level = value.as_str().ok_or_else(|| wrong_type(key, "a string"))?;
                    config = config.with_loglevel(Some(level.to_string()));
                    config.log_level_filter()?;
                }
                other => warn!("unknown engine configuration key {} ignored", other),
            }
        }
        Ok(config)
    }
}

/// Warns about a finite-difference step outside of (0, 1); the step is used anyway.
pub(crate) fn check_epsilon(epsilon: f64) {
    if !(epsilon > 0.0 && epsilon < 1.0) {
        warn!(
            "finite difference step {} is outside of (0, 1), numerical derivatives may be \
             meaningless",
            epsilon
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::new();
        assert_eq!(config.epsilon, 1e-6);
        assert!(config.simplify_derivatives);
        assert_eq!(config.log_level_filter().unwrap(), LevelFilter::Info);
        assert_eq!(
            EngineConfig::default().with_max_simplify_passes(0).max_simplify_passes,
            1
        );
    }

    #[test]
    fn test_from_toml() {
        let doc = r#"
            [engine]
            epsilon = 1e-4
            simplify_derivatives = false
            max_simplify_passes = 3
            parallel_threshold = 16
            loglevel = "warn"
        "#;
        let config = EngineConfig::from_toml_str(doc).unwrap();
        assert_eq!(config.epsilon, 1e-4);
        assert!(!config.simplify_derivatives);
        assert_eq!(config.max_simplify_passes, 3);
        assert_eq!(config.parallel_threshold, Some(16));
        assert_eq!(config.log_level_filter().unwrap(), LevelFilter::Warn);
        // top-level keys work too, missing keys keep their defaults
        let config = EngineConfig::from_toml_str("epsilon = 1\nunknown = 5").unwrap();
        assert_eq!(config.epsilon, 1.0);
        assert_eq!(config.max_simplify_passes, 8);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(EngineConfig::from_toml_str("epsilon = \"small\"").is_err());
        assert!(EngineConfig::from_toml_str("max_simplify_passes = -2").is_err());
        assert!(EngineConfig::from_toml_str("loglevel = \"loud\"").is_err());
        assert!(EngineConfig::from_toml_str("engine = 3").is_err());
        assert!(EngineConfig::from_toml_str("[engine").is_err());
    }

    #[test]
    fn test_epsilon_out_of_range_is_kept() {
        let config = EngineConfig::default().with_epsilon(2.0);
        assert_eq!(config.epsilon, 2.0);
        assert_eq!(config.with_loglevel(None).log_level_filter().unwrap(), LevelFilter::Off);
    }
}

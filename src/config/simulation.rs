use crate::error::{BlottoError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub population_size: u64,
    pub num_locations: usize,
    pub num_forces: u32,
    pub mutability: f64,
    /// Checkpoint every this many steps; a value <= 0 means only at the end
    /// of a `run` call.
    pub steps_between_checkpoints: i64,
    /// Steps per `run` call; 0 means one checkpoint interval per call, with
    /// the external driver deciding whether to call again.
    pub step_limit: u64,
    /// Seed the population with random strategies instead of the uniformly
    /// weak one.
    pub random_population: bool,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            population_size: 10_000,
            num_locations: 5,
            num_forces: 5,
            mutability: 0.01,
            steps_between_checkpoints: 1_000,
            step_limit: 10_000,
            random_population: false,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(BlottoError::InvalidConfiguration(
                "Population size must be at least 1".to_string(),
            ));
        }
        if self.num_locations < 1 {
            return Err(BlottoError::InvalidConfiguration(
                "There must be at least one location".to_string(),
            ));
        }
        if self.mutability < 0.0 || self.mutability > 1.0 {
            return Err(BlottoError::InvalidConfiguration(
                "Mutability must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BlottoError::InvalidConfiguration(format!("Failed to read config: {}", e)))?;

        let config: SimulationConfig = toml::from_str(&contents)
            .map_err(|e| BlottoError::InvalidConfiguration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| BlottoError::InvalidConfiguration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| BlottoError::InvalidConfiguration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// The artifact name shared by the checkpoint pair for this configuration.
    pub fn save_name(&self) -> String {
        format!(
            "l{}f{}s{}",
            self.num_locations, self.num_forces, self.population_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_population() {
        let config = SimulationConfig {
            population_size: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BlottoError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_rejects_zero_locations() {
        let config = SimulationConfig {
            num_locations: 0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_mutability() {
        let config = SimulationConfig {
            mutability: 1.5,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_forces_is_legal() {
        let config = SimulationConfig {
            num_forces: 0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_name() {
        let config = SimulationConfig::default();
        assert_eq!(config.save_name(), "l5f5s10000");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SimulationConfig {
            seed: Some(7),
            ..SimulationConfig::default()
        };
        let path = std::env::temp_dir().join(format!("blotto-config-{}.toml", std::process::id()));
        config.save_to_file(&path).unwrap();
        let loaded = SimulationConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.population_size, config.population_size);
        assert_eq!(loaded.seed, Some(7));
        assert_eq!(loaded.mutability, config.mutability);
    }
}

use std::path::Path;

use tracing::warn;

use crate::ai::{MctsConfig, QLearningConfig, RandomConfig};
use crate::checkpoint::CheckpointManagerConfig;
use crate::error::ConfigError;
use crate::training::trainer::TrainerConfig;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub random: RandomConfig,
    pub mcts: MctsConfig,
    pub qlearning: QLearningConfig,
    pub training: TrainerConfig,
    pub checkpoint: CheckpointManagerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mcts.simulations == 0 {
            return Err(ConfigError::Validation(
                "mcts.simulations must be >= 1".into(),
            ));
        }
        if !(self.mcts.exploration_weight > 0.0) {
            return Err(ConfigError::Validation(
                "mcts.exploration_weight must be > 0".into(),
            ));
        }

        let q = &self.qlearning;
        if !(q.learning_rate > 0.0 && q.learning_rate <= 1.0) {
            return Err(ConfigError::Validation(
                "qlearning.learning_rate must be in (0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&q.discount_factor) {
            return Err(ConfigError::Validation(
                "qlearning.discount_factor must be in [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&q.epsilon) {
            return Err(ConfigError::Validation(
                "qlearning.epsilon must be in [0, 1]".into(),
            ));
        }
        if q.eval_games == 0 {
            return Err(ConfigError::Validation(
                "qlearning.eval_games must be >= 1".into(),
            ));
        }

        let t = &self.training;
        for (name, value) in [
            ("num_episodes", t.num_episodes),
            ("log_interval", t.log_interval),
            ("eval_interval", t.eval_interval),
            ("checkpoint_interval", t.checkpoint_interval),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation(format!(
                    "training.{name} must be >= 1"
                )));
            }
        }

        if self.checkpoint.keep_last_n == 0 {
            return Err(ConfigError::Validation(
                "checkpoint.keep_last_n must be >= 1".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::PolicyKind;
    use crate::game::Player;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
    }

    #[test]
    fn test_defaults_match_reference_hyperparameters() {
        let config = AppConfig::default();
        assert_eq!(config.mcts.simulations, 1000);
        assert!((config.mcts.exploration_weight - 1.4).abs() < 1e-12);
        assert_eq!(config.mcts.policy, PolicyKind::Uniform);
        assert!((config.qlearning.learning_rate - 0.1).abs() < 1e-12);
        assert!((config.qlearning.discount_factor - 0.95).abs() < 1e-12);
        assert!((config.qlearning.epsilon - 0.1).abs() < 1e-12);
        assert_eq!(config.training.num_episodes, 1000);
        assert_eq!(config.training.player, Player::Red);
        assert_eq!(config.checkpoint.keep_last_n, 5);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[mcts]
simulations = 200
policy = "heuristic"
seed = 7
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.mcts.simulations, 200);
        assert_eq!(config.mcts.policy, PolicyKind::Heuristic);
        assert_eq!(config.mcts.seed, Some(7));
        // Other fields should be defaults
        assert!((config.mcts.exploration_weight - 1.4).abs() < 1e-12);
        assert_eq!(config.qlearning.eval_games, 20);
        assert_eq!(config.training.num_episodes, 1000);
    }

    #[test]
    fn test_random_seed_has_its_own_section() {
        let config: AppConfig = toml::from_str("[random]\nseed = 9\n").unwrap();
        assert_eq!(config.random.seed, Some(9));
        assert!(config.mcts.seed.is_none());
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        let default = AppConfig::default();
        assert_eq!(config.mcts.simulations, default.mcts.simulations);
        assert_eq!(config.training.num_episodes, default.training.num_episodes);
        assert!(config.qlearning.seed.is_none());
        assert!(config.random.seed.is_none());
    }

    #[test]
    fn test_unknown_policy_is_a_parse_error() {
        let err = toml::from_str::<AppConfig>("[mcts]\npolicy = \"neural\"\n").unwrap_err();
        assert!(err.to_string().contains("neural"));
    }

    #[test]
    fn test_validation_rejects_zero_simulations() {
        let mut config = AppConfig::default();
        config.mcts.simulations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_non_positive_exploration() {
        let mut config = AppConfig::default();
        config.mcts.exploration_weight = 0.0;
        assert!(config.validate().is_err());
        config.mcts.exploration_weight = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_learning_rate_out_of_range() {
        let mut config = AppConfig::default();
        config.qlearning.learning_rate = 0.0;
        assert!(config.validate().is_err());
        config.qlearning.learning_rate = 1.5;
        assert!(config.validate().is_err());
        config.qlearning.learning_rate = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_invalid_discount() {
        let mut config = AppConfig::default();
        config.qlearning.discount_factor = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_epsilon_out_of_range() {
        let mut config = AppConfig::default();
        config.qlearning.epsilon = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_eval_games() {
        let mut config = AppConfig::default();
        config.qlearning.eval_games = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_intervals() {
        let mut config = AppConfig::default();
        config.training.log_interval = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "config validation error: training.log_interval must be >= 1"
        );

        let mut config = AppConfig::default();
        config.training.num_episodes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_keep_last() {
        let mut config = AppConfig::default();
        config.checkpoint.keep_last_n = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config.training.num_episodes, 1000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[training]
num_episodes = 500
player = "Yellow"

[qlearning]
epsilon = 0.25
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.training.num_episodes, 500);
        assert_eq!(config.training.player, Player::Yellow);
        assert!((config.qlearning.epsilon - 0.25).abs() < 1e-12);
        // Others are defaults
        assert!((config.qlearning.learning_rate - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[qlearning]\ndiscount_factor = 2.0\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml().unwrap();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        config.validate().expect("roundtripped config should be valid");
    }
}

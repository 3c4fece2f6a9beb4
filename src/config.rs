use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};

/// Which pending redex the reducer picks next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum Schedule {
    /// The most recently formed redex, depth first.
    #[default]
    Lifo,
    /// A uniformly random pending redex, reproducible from `seed`.
    Random { seed: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Agents per arena block.
    pub agent_block_size: usize,
    /// Redexes per arena block.
    pub redex_block_size: usize,
    pub max_agent_blocks: Option<usize>,
    pub max_redex_blocks: Option<usize>,
    pub schedule: Schedule,
    pub max_steps: Option<u64>,
    /// Check the wiring of both endpoints before every interaction.
    pub check_redexes: bool,
    /// Validate the whole net after every interaction. Quadratic; for tests.
    pub verify_each_step: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            agent_block_size: 4096,
            redex_block_size: 128,
            max_agent_blocks: None,
            max_redex_blocks: None,
            schedule: Schedule::Lifo,
            max_steps: None,
            check_redexes: true,
            verify_each_step: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.agent_block_size == 0 || self.redex_block_size == 0 {
            return Err(RuntimeError::InvalidConfig(
                "block sizes must be at least 1".to_owned(),
            ));
        }
        if self.max_agent_blocks == Some(0) || self.max_redex_blocks == Some(0) {
            return Err(RuntimeError::InvalidConfig(
                "block limits must allow at least one block".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn from_json(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)
            .map_err(|err| RuntimeError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            Config::from_json(r#"{ "agent_block_size": 8, "schedule": { "kind": "random", "seed": 3 } }"#)
                .unwrap();
        assert_eq!(config.agent_block_size, 8);
        assert_eq!(config.redex_block_size, 128);
        assert_eq!(config.schedule, Schedule::Random { seed: 3 });
        assert!(config.check_redexes);
    }

    #[test]
    fn test_zero_block_size_is_rejected() {
        let err = Config::from_json(r#"{ "redex_block_size": 0 }"#).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidConfig(_)));
    }
}

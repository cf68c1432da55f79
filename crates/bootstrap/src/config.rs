//! Trigger configuration for automatic cluster formation.

use std::collections::HashMap;

use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Settings key for the number of formation-eligible peers which, if discovered, can be used to
/// form the cluster. Unsafe if more nodes are started than expected.
pub const INITIAL_NODE_COUNT_SETTING: &str = "cluster.unsafe_initial_master_node_count";

/// Settings key for the list of peers (by name or ID) required to form the cluster.
pub const INITIAL_NODES_SETTING: &str = "cluster.initial_master_nodes";

/// Decides whether, and under what peer visibility, this node should try to form a cluster.
#[derive(Args, Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Number of formation-eligible peers to wait for before forming the cluster (0 disables)
    #[arg(
        long = "initial-node-count",
        env = "PROVEN_INITIAL_NODE_COUNT",
        default_value_t = 0
    )]
    pub expected_count: u32,

    /// Peers (by name or ID) which must be discovered before forming the cluster
    #[arg(long = "initial-nodes", env = "PROVEN_INITIAL_NODES", value_delimiter = ',')]
    pub required_peers: Vec<String>,
}

impl TriggerConfig {
    /// Trigger on discovering `expected_count` formation-eligible peers.
    #[must_use]
    pub const fn with_expected_count(expected_count: u32) -> Self {
        Self {
            expected_count,
            required_peers: Vec::new(),
        }
    }

    /// Trigger on discovering every one of `required_peers`.
    pub fn with_required_peers<I, S>(required_peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expected_count: 0,
            required_peers: required_peers.into_iter().map(Into::into).collect(),
        }
    }

    /// Read the trigger from flat node settings.
    ///
    /// Missing keys fall back to their defaults (a count of `0` and no required peers).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSetting`] if the count is not a non-negative integer, or if the
    /// peer list contains a blank entry.
    pub fn from_settings(settings: &HashMap<String, String>) -> Result<Self> {
        let expected_count = match settings.get(INITIAL_NODE_COUNT_SETTING) {
            Some(value) => parse_count(INITIAL_NODE_COUNT_SETTING, value)?,
            None => 0,
        };

        let required_peers = match settings.get(INITIAL_NODES_SETTING) {
            Some(value) => parse_list(INITIAL_NODES_SETTING, value)?,
            None => Vec::new(),
        };

        Ok(Self {
            expected_count,
            required_peers,
        })
    }

    /// Whether either trigger condition is configured.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.expected_count > 0 || !self.required_peers.is_empty()
    }

    /// Check the configuration for entries that can never be satisfied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a required peer is blank or listed twice.
    pub fn validate(&self) -> Result<()> {
        for (index, peer) in self.required_peers.iter().enumerate() {
            if peer.trim().is_empty() {
                return Err(Error::Configuration(format!(
                    "required peer at position {index} is blank"
                )));
            }

            if self.required_peers[..index].contains(peer) {
                return Err(Error::Configuration(format!(
                    "required peer [{peer}] is listed more than once"
                )));
            }
        }

        Ok(())
    }
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Error {
    Error::InvalidSetting {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_count(key: &str, value: &str) -> Result<u32> {
    let count = value
        .trim()
        .parse::<i64>()
        .map_err(|e| invalid(key, value, e.to_string()))?;

    if count < 0 {
        return Err(invalid(key, value, "must be >= 0"));
    }

    u32::try_from(count).map_err(|_| invalid(key, value, format!("must be <= {}", u32::MAX)))
}

fn parse_list(key: &str, value: &str) -> Result<Vec<String>> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }

    value
        .split(',')
        .map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                Err(invalid(key, value, "list contains a blank entry"))
            } else {
                Ok(entry.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestArgs {
        #[command(flatten)]
        trigger: TriggerConfig,
    }

    fn settings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_default_is_inactive() {
        let config = TriggerConfig::default();

        assert_eq!(config.expected_count, 0);
        assert!(config.required_peers.is_empty());
        assert!(!config.is_active());
    }

    #[test]
    fn test_active_by_count_or_list() {
        assert!(TriggerConfig::with_expected_count(3).is_active());
        assert!(TriggerConfig::with_required_peers(["nodeA"]).is_active());
    }

    #[test]
    fn test_from_empty_settings() {
        let config = TriggerConfig::from_settings(&HashMap::new()).unwrap();

        assert_eq!(config, TriggerConfig::default());
    }

    #[test]
    fn test_from_settings() {
        let config = TriggerConfig::from_settings(&settings(&[
            (INITIAL_NODE_COUNT_SETTING, "3"),
            (INITIAL_NODES_SETTING, "nodeA, nodeB,nodeC"),
        ]))
        .unwrap();

        assert_eq!(config.expected_count, 3);
        assert_eq!(config.required_peers, vec!["nodeA", "nodeB", "nodeC"]);
    }

    #[test]
    fn test_negative_count_rejected() {
        let result = TriggerConfig::from_settings(&settings(&[(INITIAL_NODE_COUNT_SETTING, "-1")]));

        assert_matches!(result, Err(Error::InvalidSetting { key, reason, .. }) => {
            assert_eq!(key, INITIAL_NODE_COUNT_SETTING);
            assert_eq!(reason, "must be >= 0");
        });
    }

    #[test]
    fn test_non_integer_count_rejected() {
        let result =
            TriggerConfig::from_settings(&settings(&[(INITIAL_NODE_COUNT_SETTING, "three")]));

        assert_matches!(result, Err(Error::InvalidSetting { .. }));
    }

    #[test]
    fn test_blank_list_entry_rejected() {
        let result = TriggerConfig::from_settings(&settings(&[(INITIAL_NODES_SETTING, "nodeA,,")]));

        assert_matches!(result, Err(Error::InvalidSetting { .. }));
    }

    #[test]
    fn test_empty_list_setting() {
        let config = TriggerConfig::from_settings(&settings(&[(INITIAL_NODES_SETTING, "")])).unwrap();

        assert!(config.required_peers.is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(TriggerConfig::with_required_peers(["nodeA", "nodeB"]).validate().is_ok());

        assert_matches!(
            TriggerConfig::with_required_peers(["nodeA", "nodeA"]).validate(),
            Err(Error::Configuration(_))
        );
        assert_matches!(
            TriggerConfig::with_required_peers(["nodeA", " "]).validate(),
            Err(Error::Configuration(_))
        );
    }

    #[test]
    fn test_parse_from_args() {
        let args = TestArgs::try_parse_from([
            "node",
            "--initial-node-count",
            "2",
            "--initial-nodes",
            "nodeA,nodeB",
        ])
        .unwrap();

        assert_eq!(args.trigger.expected_count, 2);
        assert_eq!(args.trigger.required_peers, vec!["nodeA", "nodeB"]);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: TriggerConfig = serde_json::from_str(r#"{"expected_count": 5}"#).unwrap();

        assert_eq!(config, TriggerConfig::with_expected_count(5));
    }
}

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use kontor_core::canonical::stable_bucket;
use kontor_core::ContractId;

/// Rollout configuration for the override system, passed by value.
/// Nothing here reads the environment; deterministic tests construct
/// the exact config they need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureConfig {
    pub enabled: bool,
    pub whitelist: BTreeSet<ContractId>,
    pub rollout_percent: u8,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            whitelist: BTreeSet::new(),
            rollout_percent: 0,
            cache_ttl: Duration::from_secs(60),
            cache_max_entries: 1024,
        }
    }
}

pub struct FeatureGate {
    config: FeatureConfig,
}

impl FeatureGate {
    #[must_use]
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    #[must_use]
    pub fn is_system_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Global switch first, whitelist second (pilot contracts stay
    /// enabled at rollout 0), deterministic percentage bucket last.
    /// The same contract id gets the same answer on every run.
    #[must_use]
    pub fn is_enabled_for_contract(&self, contract_id: &ContractId) -> bool {
        if !self.config.enabled {
            return false;
        }
        if self.config.whitelist.contains(contract_id) {
            return true;
        }
        let percent = u64::from(self.config.rollout_percent.min(100));
        stable_bucket(contract_id.as_str(), 100) < percent
    }
}

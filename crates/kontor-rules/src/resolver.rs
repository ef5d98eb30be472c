use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use kontor_core::ContractId;
use kontor_model::{
    BaseRule, EffectiveRule, PricingStepPayload, RateAdjustmentPayload, RuleOverride,
    ValidationPayload,
};

use crate::cache::{RuleSetCache, RuleSetKey};
use crate::engine::merge_category;
use crate::gate::FeatureGate;
use crate::ports::{BaseRuleSource, ContractDirectory, OverrideSource, StoreError};

/// Raw store rows a resolution was computed from, kept alongside the
/// result for inspection tooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolutionInputs {
    pub validation_base: Vec<BaseRule<ValidationPayload>>,
    pub validation_overrides: Vec<RuleOverride<ValidationPayload>>,
    pub rate_adjustment_base: Vec<BaseRule<RateAdjustmentPayload>>,
    pub rate_adjustment_overrides: Vec<RuleOverride<RateAdjustmentPayload>>,
    pub pricing_step_base: Vec<BaseRule<PricingStepPayload>>,
    pub pricing_step_overrides: Vec<RuleOverride<PricingStepPayload>>,
}

/// Effective rule set for one contract on one date: the combined
/// output of the three category merges, each sorted ascending by
/// priority. This is what downstream pricing and validation consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolvedRuleSet {
    pub contract_id: ContractId,
    pub on: NaiveDate,
    pub overrides_applied: bool,
    pub validation_rules: Vec<EffectiveRule<ValidationPayload>>,
    pub rate_adjustments: Vec<EffectiveRule<RateAdjustmentPayload>>,
    pub pricing_steps: Vec<EffectiveRule<PricingStepPayload>>,
    pub inputs: ResolutionInputs,
}

/// Cache eviction hook handed to the administrative service so a
/// mutation can evict without owning the resolver.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate_contract(&self, contract_id: &ContractId);
}

pub struct RuleResolver {
    gate: FeatureGate,
    contracts: Arc<dyn ContractDirectory>,
    base_rules: Arc<dyn BaseRuleSource>,
    overrides: Arc<dyn OverrideSource>,
    cache: Mutex<RuleSetCache>,
}

impl RuleResolver {
    #[must_use]
    pub fn new(
        gate: FeatureGate,
        contracts: Arc<dyn ContractDirectory>,
        base_rules: Arc<dyn BaseRuleSource>,
        overrides: Arc<dyn OverrideSource>,
    ) -> Self {
        let cache = RuleSetCache::new(gate.config().cache_ttl, gate.config().cache_max_entries);
        Self {
            gate,
            contracts,
            base_rules,
            overrides,
            cache: Mutex::new(cache),
        }
    }

    /// Compute (or serve from cache) the effective rule set for a
    /// contract on a date. Never fails for merge-time reasons: an
    /// unknown contract, a blank type code, or a dangling override
    /// degrade to diagnostics, because downstream pricing always needs
    /// an answer. Store failures propagate.
    pub fn resolve(
        &self,
        contract_id: &ContractId,
        on: NaiveDate,
    ) -> Result<ResolvedRuleSet, StoreError> {
        let key = RuleSetKey {
            contract_id: contract_id.clone(),
            on,
        };
        if let Some(hit) = self.cache_get(&key) {
            tracing::debug!(contract_id = %contract_id, %on, "rule set served from cache");
            return Ok(hit);
        }

        // One gate decision covers all three categories, so a single
        // resolution is never half-enabled.
        let overrides_applied = self.gate.is_enabled_for_contract(contract_id);

        let type_code = match self.contracts.find_contract(contract_id)? {
            Some(record) => record.contract_type_code,
            None => {
                tracing::warn!(contract_id = %contract_id, "contract not found in directory");
                None
            }
        };
        if type_code.is_none() {
            tracing::debug!(contract_id = %contract_id, "no contract type code, resolving without base rules");
        }

        let (validation_base, rate_adjustment_base, pricing_step_base) = match &type_code {
            Some(code) => (
                self.base_rules.validation_rules(code)?,
                self.base_rules.rate_adjustments(code)?,
                self.base_rules.pricing_steps(code)?,
            ),
            None => (Vec::new(), Vec::new(), Vec::new()),
        };

        let (validation_overrides, rate_adjustment_overrides, pricing_step_overrides) =
            if overrides_applied {
                (
                    self.overrides.validation_overrides(contract_id)?,
                    self.overrides.rate_adjustment_overrides(contract_id)?,
                    self.overrides.pricing_step_overrides(contract_id)?,
                )
            } else {
                (Vec::new(), Vec::new(), Vec::new())
            };

        let resolved = ResolvedRuleSet {
            contract_id: contract_id.clone(),
            on,
            overrides_applied,
            validation_rules: merge_category(
                &validation_base,
                &validation_overrides,
                on,
                overrides_applied,
            ),
            rate_adjustments: merge_category(
                &rate_adjustment_base,
                &rate_adjustment_overrides,
                on,
                overrides_applied,
            ),
            pricing_steps: merge_category(
                &pricing_step_base,
                &pricing_step_overrides,
                on,
                overrides_applied,
            ),
            inputs: ResolutionInputs {
                validation_base,
                validation_overrides,
                rate_adjustment_base,
                rate_adjustment_overrides,
                pricing_step_base,
                pricing_step_overrides,
            },
        };

        self.cache_put(key, resolved.clone());
        Ok(resolved)
    }

    /// Evict every cached date for the contract; returns the count.
    pub fn invalidate_contract(&self, contract_id: &ContractId) -> usize {
        match self.cache.lock() {
            Ok(mut cache) => {
                let evicted = cache.invalidate_contract(contract_id);
                if evicted > 0 {
                    tracing::debug!(contract_id = %contract_id, evicted, "evicted cached rule sets");
                }
                evicted
            }
            Err(_) => 0,
        }
    }

    #[must_use]
    pub fn gate(&self) -> &FeatureGate {
        &self.gate
    }

    // Cache trouble is never a resolution failure: a poisoned lock
    // reads as a miss and writes are dropped.
    fn cache_get(&self, key: &RuleSetKey) -> Option<ResolvedRuleSet> {
        self.cache.lock().ok()?.get(key)
    }

    fn cache_put(&self, key: RuleSetKey, value: ResolvedRuleSet) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, value);
        }
    }
}

impl CacheInvalidator for RuleResolver {
    fn invalidate_contract(&self, contract_id: &ContractId) {
        let _ = RuleResolver::invalidate_contract(self, contract_id);
    }
}

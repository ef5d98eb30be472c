use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use kontor_core::{ContractId, ContractTypeCode, RuleId};
use kontor_model::{
    BaseRule, PricingStepPayload, RateAdjustmentPayload, RuleCategory, RuleOverride,
    ValidationPayload,
};

use crate::ports::{
    BaseRuleRepository, BaseRuleSource, ContractDirectory, ContractRecord, OverrideRepository,
    OverrideSource, StoreError,
};

/// In-process store implementing every port. Used as the fixture
/// behind resolver and admin tests, and usable as a seed store by
/// embedding services. Soft-deleted overrides stay in place with a
/// flag, mirroring how the relational adapters behave.
#[derive(Default)]
pub struct MemoryRuleStore {
    inner: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    contracts: BTreeMap<ContractId, Option<ContractTypeCode>>,
    contract_types: BTreeSet<ContractTypeCode>,
    validation_bases: BTreeMap<ContractTypeCode, Vec<BaseRule<ValidationPayload>>>,
    rate_adjustment_bases: BTreeMap<ContractTypeCode, Vec<BaseRule<RateAdjustmentPayload>>>,
    pricing_step_bases: BTreeMap<ContractTypeCode, Vec<BaseRule<PricingStepPayload>>>,
    validation_overrides: BTreeMap<ContractId, Vec<Stored<ValidationPayload>>>,
    rate_adjustment_overrides: BTreeMap<ContractId, Vec<Stored<RateAdjustmentPayload>>>,
    pricing_step_overrides: BTreeMap<ContractId, Vec<Stored<PricingStepPayload>>>,
}

struct Stored<P> {
    record: RuleOverride<P>,
    deleted: bool,
}

impl MemoryRuleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_contract_type(&self, code: ContractTypeCode) {
        if let Ok(mut state) = self.inner.lock() {
            state.contract_types.insert(code);
        }
    }

    pub fn register_contract(&self, contract_id: ContractId, code: Option<ContractTypeCode>) {
        if let Ok(mut state) = self.inner.lock() {
            if let Some(code) = &code {
                state.contract_types.insert(code.clone());
            }
            state.contracts.insert(contract_id, code);
        }
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T, StoreError> {
        match self.inner.lock() {
            Ok(state) => Ok(f(&state)),
            Err(_) => Err(poisoned()),
        }
    }

    fn write<T>(&self, f: impl FnOnce(&mut StoreState) -> T) -> Result<T, StoreError> {
        match self.inner.lock() {
            Ok(mut state) => Ok(f(&mut state)),
            Err(_) => Err(poisoned()),
        }
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable {
        detail: "memory store lock poisoned".to_string(),
    }
}

fn live_overrides<P: Clone>(
    map: &BTreeMap<ContractId, Vec<Stored<P>>>,
    contract_id: &ContractId,
) -> Vec<RuleOverride<P>> {
    map.get(contract_id)
        .map(|entries| {
            entries
                .iter()
                .filter(|stored| !stored.deleted)
                .map(|stored| stored.record.clone())
                .collect()
        })
        .unwrap_or_default()
}

fn upsert_base<P>(
    map: &mut BTreeMap<ContractTypeCode, Vec<BaseRule<P>>>,
    code: &ContractTypeCode,
    rule: BaseRule<P>,
) {
    let rules = map.entry(code.clone()).or_default();
    match rules.iter().position(|r| r.rule_id == rule.rule_id) {
        Some(pos) => rules[pos] = rule,
        None => rules.push(rule),
    }
}

fn upsert_override<P>(
    map: &mut BTreeMap<ContractId, Vec<Stored<P>>>,
    contract_id: &ContractId,
    ov: RuleOverride<P>,
) {
    let entries = map.entry(contract_id.clone()).or_default();
    let existing = entries
        .iter()
        .position(|stored| !stored.deleted && stored.record.rule_id == ov.rule_id);
    let stored = Stored {
        record: ov,
        deleted: false,
    };
    match existing {
        Some(pos) => entries[pos] = stored,
        None => entries.push(stored),
    }
}

fn soft_delete<P>(
    map: &mut BTreeMap<ContractId, Vec<Stored<P>>>,
    contract_id: &ContractId,
    rule_id: &RuleId,
) -> bool {
    let Some(entries) = map.get_mut(contract_id) else {
        return false;
    };
    match entries
        .iter_mut()
        .find(|stored| !stored.deleted && &stored.record.rule_id == rule_id)
    {
        Some(stored) => {
            stored.deleted = true;
            true
        }
        None => false,
    }
}

impl ContractDirectory for MemoryRuleStore {
    fn find_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Option<ContractRecord>, StoreError> {
        self.read(|state| {
            state
                .contracts
                .get(contract_id)
                .map(|code| ContractRecord {
                    contract_id: contract_id.clone(),
                    contract_type_code: code.clone(),
                })
        })
    }

    fn contract_type_exists(&self, code: &ContractTypeCode) -> Result<bool, StoreError> {
        self.read(|state| state.contract_types.contains(code))
    }
}

impl BaseRuleSource for MemoryRuleStore {
    fn validation_rules(
        &self,
        code: &ContractTypeCode,
    ) -> Result<Vec<BaseRule<ValidationPayload>>, StoreError> {
        self.read(|state| state.validation_bases.get(code).cloned().unwrap_or_default())
    }

    fn rate_adjustments(
        &self,
        code: &ContractTypeCode,
    ) -> Result<Vec<BaseRule<RateAdjustmentPayload>>, StoreError> {
        self.read(|state| {
            state
                .rate_adjustment_bases
                .get(code)
                .cloned()
                .unwrap_or_default()
        })
    }

    fn pricing_steps(
        &self,
        code: &ContractTypeCode,
    ) -> Result<Vec<BaseRule<PricingStepPayload>>, StoreError> {
        self.read(|state| {
            state
                .pricing_step_bases
                .get(code)
                .cloned()
                .unwrap_or_default()
        })
    }
}

impl BaseRuleRepository for MemoryRuleStore {
    fn put_validation_rule(
        &self,
        code: &ContractTypeCode,
        rule: BaseRule<ValidationPayload>,
    ) -> Result<(), StoreError> {
        self.write(|state| upsert_base(&mut state.validation_bases, code, rule))
    }

    fn put_rate_adjustment_rule(
        &self,
        code: &ContractTypeCode,
        rule: BaseRule<RateAdjustmentPayload>,
    ) -> Result<(), StoreError> {
        self.write(|state| upsert_base(&mut state.rate_adjustment_bases, code, rule))
    }

    fn put_pricing_step_rule(
        &self,
        code: &ContractTypeCode,
        rule: BaseRule<PricingStepPayload>,
    ) -> Result<(), StoreError> {
        self.write(|state| upsert_base(&mut state.pricing_step_bases, code, rule))
    }
}

impl OverrideSource for MemoryRuleStore {
    fn validation_overrides(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<RuleOverride<ValidationPayload>>, StoreError> {
        self.read(|state| live_overrides(&state.validation_overrides, contract_id))
    }

    fn rate_adjustment_overrides(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<RuleOverride<RateAdjustmentPayload>>, StoreError> {
        self.read(|state| live_overrides(&state.rate_adjustment_overrides, contract_id))
    }

    fn pricing_step_overrides(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<RuleOverride<PricingStepPayload>>, StoreError> {
        self.read(|state| live_overrides(&state.pricing_step_overrides, contract_id))
    }
}

impl OverrideRepository for MemoryRuleStore {
    fn put_validation_override(
        &self,
        contract_id: &ContractId,
        ov: RuleOverride<ValidationPayload>,
    ) -> Result<(), StoreError> {
        self.write(|state| upsert_override(&mut state.validation_overrides, contract_id, ov))
    }

    fn put_rate_adjustment_override(
        &self,
        contract_id: &ContractId,
        ov: RuleOverride<RateAdjustmentPayload>,
    ) -> Result<(), StoreError> {
        self.write(|state| upsert_override(&mut state.rate_adjustment_overrides, contract_id, ov))
    }

    fn put_pricing_step_override(
        &self,
        contract_id: &ContractId,
        ov: RuleOverride<PricingStepPayload>,
    ) -> Result<(), StoreError> {
        self.write(|state| upsert_override(&mut state.pricing_step_overrides, contract_id, ov))
    }

    fn soft_delete_override(
        &self,
        contract_id: &ContractId,
        category: RuleCategory,
        rule_id: &RuleId,
    ) -> Result<bool, StoreError> {
        self.write(|state| match category {
            RuleCategory::Validation => {
                soft_delete(&mut state.validation_overrides, contract_id, rule_id)
            }
            RuleCategory::RateAdjustment => {
                soft_delete(&mut state.rate_adjustment_overrides, contract_id, rule_id)
            }
            RuleCategory::PricingStep => {
                soft_delete(&mut state.pricing_step_overrides, contract_id, rule_id)
            }
        })
    }
}

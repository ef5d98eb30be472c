use std::fmt;

use serde::{Deserialize, Serialize};

use kontor_core::{ContractId, ContractTypeCode, RuleId};
use kontor_model::{
    BaseRule, PricingStepPayload, RateAdjustmentPayload, RuleCategory, RuleOverride,
    ValidationPayload,
};

/// What the resolver needs to know about a contract: its type code,
/// which may be absent for contracts defined entirely by overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractRecord {
    pub contract_id: ContractId,
    #[serde(default)]
    pub contract_type_code: Option<ContractTypeCode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    Unavailable { detail: String },
    Corrupt { detail: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { detail } => write!(f, "store unavailable: {detail}"),
            Self::Corrupt { detail } => write!(f, "store data corrupt: {detail}"),
        }
    }
}

impl std::error::Error for StoreError {}

pub trait ContractDirectory: Send + Sync {
    fn find_contract(&self, contract_id: &ContractId)
        -> Result<Option<ContractRecord>, StoreError>;

    fn contract_type_exists(&self, code: &ContractTypeCode) -> Result<bool, StoreError>;
}

/// Base rules per contract-type code. Sources return every rule they
/// hold for the code; activity and date filtering happen in the merge.
pub trait BaseRuleSource: Send + Sync {
    fn validation_rules(
        &self,
        code: &ContractTypeCode,
    ) -> Result<Vec<BaseRule<ValidationPayload>>, StoreError>;

    fn rate_adjustments(
        &self,
        code: &ContractTypeCode,
    ) -> Result<Vec<BaseRule<RateAdjustmentPayload>>, StoreError>;

    fn pricing_steps(
        &self,
        code: &ContractTypeCode,
    ) -> Result<Vec<BaseRule<PricingStepPayload>>, StoreError>;
}

/// Non-deleted overrides per contract, in store order.
pub trait OverrideSource: Send + Sync {
    fn validation_overrides(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<RuleOverride<ValidationPayload>>, StoreError>;

    fn rate_adjustment_overrides(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<RuleOverride<RateAdjustmentPayload>>, StoreError>;

    fn pricing_step_overrides(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<RuleOverride<PricingStepPayload>>, StoreError>;
}

/// Write side of the base-rule store. `put` upserts by rule id within
/// the (type code, category) scope; uniqueness checks live in the
/// administrative service.
pub trait BaseRuleRepository: BaseRuleSource {
    fn put_validation_rule(
        &self,
        code: &ContractTypeCode,
        rule: BaseRule<ValidationPayload>,
    ) -> Result<(), StoreError>;

    fn put_rate_adjustment_rule(
        &self,
        code: &ContractTypeCode,
        rule: BaseRule<RateAdjustmentPayload>,
    ) -> Result<(), StoreError>;

    fn put_pricing_step_rule(
        &self,
        code: &ContractTypeCode,
        rule: BaseRule<PricingStepPayload>,
    ) -> Result<(), StoreError>;
}

/// Write side of the override store. Writes serialize behind the
/// store's own transactional boundary; this subsystem never spans a
/// transaction across store and cache.
pub trait OverrideRepository: OverrideSource {
    fn put_validation_override(
        &self,
        contract_id: &ContractId,
        ov: RuleOverride<ValidationPayload>,
    ) -> Result<(), StoreError>;

    fn put_rate_adjustment_override(
        &self,
        contract_id: &ContractId,
        ov: RuleOverride<RateAdjustmentPayload>,
    ) -> Result<(), StoreError>;

    fn put_pricing_step_override(
        &self,
        contract_id: &ContractId,
        ov: RuleOverride<PricingStepPayload>,
    ) -> Result<(), StoreError>;

    /// Returns whether a non-deleted override existed.
    fn soft_delete_override(
        &self,
        contract_id: &ContractId,
        category: RuleCategory,
        rule_id: &RuleId,
    ) -> Result<bool, StoreError>;
}

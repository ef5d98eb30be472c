use std::fmt;
use std::sync::Arc;

use kontor_core::{ContractId, ContractTypeCode, RuleId};
use kontor_model::{
    BaseRule, OverrideAction, PayloadMode, PricingStepPayload, RateAdjustmentPayload, RuleCategory,
    RuleOverride, RuleValidationError, ValidatePayload, ValidationPayload,
};

use crate::ports::{BaseRuleRepository, ContractDirectory, OverrideRepository, StoreError};
use crate::resolver::CacheInvalidator;

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AdminError {
    ContractNotFound {
        contract_id: ContractId,
    },
    ContractTypeNotFound {
        code: ContractTypeCode,
    },
    OverrideNotFound {
        contract_id: ContractId,
        category: RuleCategory,
        rule_id: RuleId,
    },
    BaseRuleNotFound {
        code: ContractTypeCode,
        category: RuleCategory,
        rule_id: RuleId,
    },
    DuplicateOverride {
        contract_id: ContractId,
        category: RuleCategory,
        rule_id: RuleId,
    },
    DuplicateBaseRule {
        code: ContractTypeCode,
        category: RuleCategory,
        rule_id: RuleId,
    },
    Invalid(RuleValidationError),
    Store(StoreError),
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContractNotFound { contract_id } => {
                write!(f, "contract `{contract_id}` not found")
            }
            Self::ContractTypeNotFound { code } => {
                write!(f, "contract type `{code}` not found")
            }
            Self::OverrideNotFound {
                contract_id,
                category,
                rule_id,
            } => write!(
                f,
                "no {} override `{rule_id}` for contract `{contract_id}`",
                category.as_str()
            ),
            Self::BaseRuleNotFound {
                code,
                category,
                rule_id,
            } => write!(
                f,
                "no {} base rule `{rule_id}` for contract type `{code}`",
                category.as_str()
            ),
            Self::DuplicateOverride {
                contract_id,
                category,
                rule_id,
            } => write!(
                f,
                "{} override `{rule_id}` already exists for contract `{contract_id}`",
                category.as_str()
            ),
            Self::DuplicateBaseRule {
                code,
                category,
                rule_id,
            } => write!(
                f,
                "{} base rule `{rule_id}` already exists for contract type `{code}`",
                category.as_str()
            ),
            Self::Invalid(err) => write!(f, "invalid rule: {err}"),
            Self::Store(err) => write!(f, "store failure: {err}"),
        }
    }
}

impl std::error::Error for AdminError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RuleValidationError> for AdminError {
    fn from(value: RuleValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl From<StoreError> for AdminError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Administrative create/update/delete path for base rules and
/// overrides. All payload and window validation happens here, before
/// anything reaches a store; the merge engine assumes stored rules are
/// well-formed. Every successful override mutation evicts the
/// contract's cached rule sets after the store write commits. No
/// transaction spans store and cache: a reader racing between commit
/// and eviction can still see the previous rule set.
pub struct RuleAdmin {
    contracts: Arc<dyn ContractDirectory>,
    base_rules: Arc<dyn BaseRuleRepository>,
    overrides: Arc<dyn OverrideRepository>,
    invalidator: Arc<dyn CacheInvalidator>,
}

impl RuleAdmin {
    #[must_use]
    pub fn new(
        contracts: Arc<dyn ContractDirectory>,
        base_rules: Arc<dyn BaseRuleRepository>,
        overrides: Arc<dyn OverrideRepository>,
        invalidator: Arc<dyn CacheInvalidator>,
    ) -> Self {
        Self {
            contracts,
            base_rules,
            overrides,
            invalidator,
        }
    }

    pub fn create_validation_override(
        &self,
        contract_id: &ContractId,
        ov: RuleOverride<ValidationPayload>,
    ) -> Result<(), AdminError> {
        self.ensure_contract(contract_id)?;
        validate_override(&ov)?;
        let existing = self.overrides.validation_overrides(contract_id)?;
        ensure_override_new(contract_id, RuleCategory::Validation, &ov.rule_id, &existing)?;
        self.overrides.put_validation_override(contract_id, ov)?;
        self.invalidator.invalidate_contract(contract_id);
        Ok(())
    }

    pub fn update_validation_override(
        &self,
        contract_id: &ContractId,
        ov: RuleOverride<ValidationPayload>,
    ) -> Result<(), AdminError> {
        self.ensure_contract(contract_id)?;
        validate_override(&ov)?;
        let existing = self.overrides.validation_overrides(contract_id)?;
        ensure_override_exists(contract_id, RuleCategory::Validation, &ov.rule_id, &existing)?;
        self.overrides.put_validation_override(contract_id, ov)?;
        self.invalidator.invalidate_contract(contract_id);
        Ok(())
    }

    pub fn create_rate_adjustment_override(
        &self,
        contract_id: &ContractId,
        ov: RuleOverride<RateAdjustmentPayload>,
    ) -> Result<(), AdminError> {
        self.ensure_contract(contract_id)?;
        validate_override(&ov)?;
        let existing = self.overrides.rate_adjustment_overrides(contract_id)?;
        ensure_override_new(
            contract_id,
            RuleCategory::RateAdjustment,
            &ov.rule_id,
            &existing,
        )?;
        self.overrides.put_rate_adjustment_override(contract_id, ov)?;
        self.invalidator.invalidate_contract(contract_id);
        Ok(())
    }

    pub fn update_rate_adjustment_override(
        &self,
        contract_id: &ContractId,
        ov: RuleOverride<RateAdjustmentPayload>,
    ) -> Result<(), AdminError> {
        self.ensure_contract(contract_id)?;
        validate_override(&ov)?;
        let existing = self.overrides.rate_adjustment_overrides(contract_id)?;
        ensure_override_exists(
            contract_id,
            RuleCategory::RateAdjustment,
            &ov.rule_id,
            &existing,
        )?;
        self.overrides.put_rate_adjustment_override(contract_id, ov)?;
        self.invalidator.invalidate_contract(contract_id);
        Ok(())
    }

    pub fn create_pricing_step_override(
        &self,
        contract_id: &ContractId,
        ov: RuleOverride<PricingStepPayload>,
    ) -> Result<(), AdminError> {
        self.ensure_contract(contract_id)?;
        validate_override(&ov)?;
        let existing = self.overrides.pricing_step_overrides(contract_id)?;
        ensure_override_new(
            contract_id,
            RuleCategory::PricingStep,
            &ov.rule_id,
            &existing,
        )?;
        self.overrides.put_pricing_step_override(contract_id, ov)?;
        self.invalidator.invalidate_contract(contract_id);
        Ok(())
    }

    pub fn update_pricing_step_override(
        &self,
        contract_id: &ContractId,
        ov: RuleOverride<PricingStepPayload>,
    ) -> Result<(), AdminError> {
        self.ensure_contract(contract_id)?;
        validate_override(&ov)?;
        let existing = self.overrides.pricing_step_overrides(contract_id)?;
        ensure_override_exists(
            contract_id,
            RuleCategory::PricingStep,
            &ov.rule_id,
            &existing,
        )?;
        self.overrides.put_pricing_step_override(contract_id, ov)?;
        self.invalidator.invalidate_contract(contract_id);
        Ok(())
    }

    /// Soft-delete an override in any category.
    pub fn delete_override(
        &self,
        contract_id: &ContractId,
        category: RuleCategory,
        rule_id: &RuleId,
    ) -> Result<(), AdminError> {
        self.ensure_contract(contract_id)?;
        if self
            .overrides
            .soft_delete_override(contract_id, category, rule_id)?
        {
            self.invalidator.invalidate_contract(contract_id);
            Ok(())
        } else {
            Err(AdminError::OverrideNotFound {
                contract_id: contract_id.clone(),
                category,
                rule_id: rule_id.clone(),
            })
        }
    }

    pub fn create_validation_rule(
        &self,
        code: &ContractTypeCode,
        rule: BaseRule<ValidationPayload>,
    ) -> Result<(), AdminError> {
        self.ensure_contract_type(code)?;
        validate_base(&rule)?;
        let existing = self.base_rules.validation_rules(code)?;
        ensure_base_new(code, RuleCategory::Validation, &rule.rule_id, &existing)?;
        self.base_rules.put_validation_rule(code, rule)?;
        Ok(())
    }

    pub fn update_validation_rule(
        &self,
        code: &ContractTypeCode,
        rule: BaseRule<ValidationPayload>,
    ) -> Result<(), AdminError> {
        self.ensure_contract_type(code)?;
        validate_base(&rule)?;
        let existing = self.base_rules.validation_rules(code)?;
        ensure_base_exists(code, RuleCategory::Validation, &rule.rule_id, &existing)?;
        self.base_rules.put_validation_rule(code, rule)?;
        Ok(())
    }

    pub fn create_rate_adjustment_rule(
        &self,
        code: &ContractTypeCode,
        rule: BaseRule<RateAdjustmentPayload>,
    ) -> Result<(), AdminError> {
        self.ensure_contract_type(code)?;
        validate_base(&rule)?;
        let existing = self.base_rules.rate_adjustments(code)?;
        ensure_base_new(code, RuleCategory::RateAdjustment, &rule.rule_id, &existing)?;
        self.base_rules.put_rate_adjustment_rule(code, rule)?;
        Ok(())
    }

    pub fn update_rate_adjustment_rule(
        &self,
        code: &ContractTypeCode,
        rule: BaseRule<RateAdjustmentPayload>,
    ) -> Result<(), AdminError> {
        self.ensure_contract_type(code)?;
        validate_base(&rule)?;
        let existing = self.base_rules.rate_adjustments(code)?;
        ensure_base_exists(code, RuleCategory::RateAdjustment, &rule.rule_id, &existing)?;
        self.base_rules.put_rate_adjustment_rule(code, rule)?;
        Ok(())
    }

    pub fn create_pricing_step_rule(
        &self,
        code: &ContractTypeCode,
        rule: BaseRule<PricingStepPayload>,
    ) -> Result<(), AdminError> {
        self.ensure_contract_type(code)?;
        validate_base(&rule)?;
        let existing = self.base_rules.pricing_steps(code)?;
        ensure_base_new(code, RuleCategory::PricingStep, &rule.rule_id, &existing)?;
        self.base_rules.put_pricing_step_rule(code, rule)?;
        Ok(())
    }

    pub fn update_pricing_step_rule(
        &self,
        code: &ContractTypeCode,
        rule: BaseRule<PricingStepPayload>,
    ) -> Result<(), AdminError> {
        self.ensure_contract_type(code)?;
        validate_base(&rule)?;
        let existing = self.base_rules.pricing_steps(code)?;
        ensure_base_exists(code, RuleCategory::PricingStep, &rule.rule_id, &existing)?;
        self.base_rules.put_pricing_step_rule(code, rule)?;
        Ok(())
    }

    fn ensure_contract(&self, contract_id: &ContractId) -> Result<(), AdminError> {
        match self.contracts.find_contract(contract_id)? {
            Some(_) => Ok(()),
            None => Err(AdminError::ContractNotFound {
                contract_id: contract_id.clone(),
            }),
        }
    }

    fn ensure_contract_type(&self, code: &ContractTypeCode) -> Result<(), AdminError> {
        if self.contracts.contract_type_exists(code)? {
            Ok(())
        } else {
            Err(AdminError::ContractTypeNotFound { code: code.clone() })
        }
    }
}

fn validate_base<P: ValidatePayload>(rule: &BaseRule<P>) -> Result<(), AdminError> {
    rule.window.validate()?;
    rule.payload.validate(PayloadMode::Full)?;
    Ok(())
}

/// REPLACE payloads must stand on their own; MODIFY and DISABLE
/// payloads are patches and only checked for well-formedness.
fn validate_override<P: ValidatePayload>(ov: &RuleOverride<P>) -> Result<(), AdminError> {
    ov.window.validate()?;
    let mode = match ov.action {
        OverrideAction::Replace => PayloadMode::Full,
        OverrideAction::Disable | OverrideAction::Modify => PayloadMode::Partial,
    };
    ov.payload.validate(mode)?;
    Ok(())
}

fn ensure_override_new<P>(
    contract_id: &ContractId,
    category: RuleCategory,
    rule_id: &RuleId,
    existing: &[RuleOverride<P>],
) -> Result<(), AdminError> {
    if existing.iter().any(|e| &e.rule_id == rule_id) {
        return Err(AdminError::DuplicateOverride {
            contract_id: contract_id.clone(),
            category,
            rule_id: rule_id.clone(),
        });
    }
    Ok(())
}

fn ensure_override_exists<P>(
    contract_id: &ContractId,
    category: RuleCategory,
    rule_id: &RuleId,
    existing: &[RuleOverride<P>],
) -> Result<(), AdminError> {
    if existing.iter().any(|e| &e.rule_id == rule_id) {
        Ok(())
    } else {
        Err(AdminError::OverrideNotFound {
            contract_id: contract_id.clone(),
            category,
            rule_id: rule_id.clone(),
        })
    }
}

fn ensure_base_new<P>(
    code: &ContractTypeCode,
    category: RuleCategory,
    rule_id: &RuleId,
    existing: &[BaseRule<P>],
) -> Result<(), AdminError> {
    if existing.iter().any(|e| &e.rule_id == rule_id) {
        return Err(AdminError::DuplicateBaseRule {
            code: code.clone(),
            category,
            rule_id: rule_id.clone(),
        });
    }
    Ok(())
}

fn ensure_base_exists<P>(
    code: &ContractTypeCode,
    category: RuleCategory,
    rule_id: &RuleId,
    existing: &[BaseRule<P>],
) -> Result<(), AdminError> {
    if existing.iter().any(|e| &e.rule_id == rule_id) {
        Ok(())
    } else {
        Err(AdminError::BaseRuleNotFound {
            code: code.clone(),
            category,
            rule_id: rule_id.clone(),
        })
    }
}

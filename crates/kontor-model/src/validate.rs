// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use chrono::NaiveDate;

use crate::category::{PricingStepKind, RuleCategory};
use crate::payload::{PricingStepPayload, RateAdjustmentPayload, ValidationPayload};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RuleValidationError {
    MissingField {
        category: RuleCategory,
        field: &'static str,
    },
    NonFinite {
        field: &'static str,
    },
    NonPositive {
        field: &'static str,
    },
    WindowEndNotAfterStart {
        starts_on: NaiveDate,
        ends_on: NaiveDate,
    },
}

impl fmt::Display for RuleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { category, field } => {
                write!(f, "{} payload requires `{field}`", category.as_str())
            }
            Self::NonFinite { field } => write!(f, "`{field}` must be a finite number"),
            Self::NonPositive { field } => write!(f, "`{field}` must be > 0"),
            Self::WindowEndNotAfterStart { starts_on, ends_on } => write!(
                f,
                "window end {ends_on} must be strictly after start {starts_on}"
            ),
        }
    }
}

impl std::error::Error for RuleValidationError {}

/// `Full` is the base-rule and REPLACE bar: the payload must stand on
/// its own. `Partial` is the MODIFY/DISABLE bar: fields are patches and
/// only well-formedness of what is present is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadMode {
    Full,
    Partial,
}

pub trait ValidatePayload {
    fn validate(&self, mode: PayloadMode) -> Result<(), RuleValidationError>;
}

fn require<T>(
    value: &Option<T>,
    category: RuleCategory,
    field: &'static str,
) -> Result<(), RuleValidationError> {
    if value.is_none() {
        return Err(RuleValidationError::MissingField { category, field });
    }
    Ok(())
}

fn check_finite(value: Option<f64>, field: &'static str) -> Result<(), RuleValidationError> {
    if let Some(v) = value {
        if !v.is_finite() {
            return Err(RuleValidationError::NonFinite { field });
        }
    }
    Ok(())
}

impl ValidatePayload for ValidationPayload {
    fn validate(&self, mode: PayloadMode) -> Result<(), RuleValidationError> {
        check_finite(self.threshold_hours, "threshold_hours")?;
        if let Some(threshold) = self.threshold_hours {
            if threshold <= 0.0 {
                return Err(RuleValidationError::NonPositive {
                    field: "threshold_hours",
                });
            }
        }

        if mode == PayloadMode::Partial {
            return Ok(());
        }

        let category = RuleCategory::Validation;
        require(&self.kind, category, "validation_type")?;
        match self.kind {
            Some(kind) if kind.is_flag() => require(&self.required, category, "required"),
            Some(_) => require(&self.threshold_hours, category, "threshold_hours"),
            None => Ok(()),
        }
    }
}

impl ValidatePayload for RateAdjustmentPayload {
    fn validate(&self, mode: PayloadMode) -> Result<(), RuleValidationError> {
        check_finite(self.percent, "percent")?;

        if mode == PayloadMode::Partial {
            return Ok(());
        }

        let category = RuleCategory::RateAdjustment;
        require(&self.kind, category, "adjustment_type")?;
        require(&self.percent, category, "percent")
    }
}

impl ValidatePayload for PricingStepPayload {
    fn validate(&self, mode: PayloadMode) -> Result<(), RuleValidationError> {
        check_finite(self.percent, "percent")?;

        if mode == PayloadMode::Partial {
            return Ok(());
        }

        let category = RuleCategory::PricingStep;
        require(&self.kind, category, "rule_step_type")?;
        match self.kind {
            Some(PricingStepKind::PercentDiscountOnSum) => {
                if self.percent.is_none() && self.parameter_key.is_none() {
                    return Err(RuleValidationError::MissingField {
                        category,
                        field: "percent or parameter_key",
                    });
                }
                Ok(())
            }
            Some(PricingStepKind::AdminFeePercent) => require(&self.percent, category, "percent"),
            Some(PricingStepKind::FixedDeduction) => {
                require(&self.amount_minor, category, "amount_minor")
            }
            Some(PricingStepKind::GeneralDiscountPercent | PricingStepKind::Rounding) | None => {
                Ok(())
            }
        }
    }
}

// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleCategory {
    Validation,
    RateAdjustment,
    PricingStep,
}

impl RuleCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION",
            Self::RateAdjustment => "RATE_ADJUSTMENT",
            Self::PricingStep => "PRICING_STEP",
        }
    }
}

/// Semantic sub-type of a validation rule. Two validation rules with
/// the same kind express the same constraint even under different
/// rule ids; a REPLACE override wins over every rule of its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ValidationKind {
    NotesRequired,
    AttachmentRequired,
    ApprovalRequired,
    MinHoursPerEntry,
    MaxHoursPerEntry,
}

impl ValidationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotesRequired => "NOTES_REQUIRED",
            Self::AttachmentRequired => "ATTACHMENT_REQUIRED",
            Self::ApprovalRequired => "APPROVAL_REQUIRED",
            Self::MinHoursPerEntry => "MIN_HOURS_PER_ENTRY",
            Self::MaxHoursPerEntry => "MAX_HOURS_PER_ENTRY",
        }
    }

    /// Kinds expressed as an on/off constraint carry a `required` flag;
    /// the remaining kinds carry an hours threshold.
    #[must_use]
    pub const fn is_flag(self) -> bool {
        matches!(
            self,
            Self::NotesRequired | Self::AttachmentRequired | Self::ApprovalRequired
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum AdjustmentKind {
    Indexation,
    Surcharge,
    Rebate,
}

impl AdjustmentKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Indexation => "INDEXATION",
            Self::Surcharge => "SURCHARGE",
            Self::Rebate => "REBATE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum AdjustmentFrequency {
    OneTime,
    Monthly,
    Quarterly,
    Yearly,
}

impl AdjustmentFrequency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneTime => "ONE_TIME",
            Self::Monthly => "MONTHLY",
            Self::Quarterly => "QUARTERLY",
            Self::Yearly => "YEARLY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum PricingStepKind {
    PercentDiscountOnSum,
    AdminFeePercent,
    FixedDeduction,
    GeneralDiscountPercent,
    Rounding,
}

impl PricingStepKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PercentDiscountOnSum => "PERCENT_DISCOUNT_ON_SUM",
            Self::AdminFeePercent => "ADMIN_FEE_PERCENT",
            Self::FixedDeduction => "FIXED_DEDUCTION",
            Self::GeneralDiscountPercent => "GENERAL_DISCOUNT_PERCENT",
            Self::Rounding => "ROUNDING",
        }
    }
}

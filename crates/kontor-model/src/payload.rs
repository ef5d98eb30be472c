// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::category::{AdjustmentFrequency, AdjustmentKind, PricingStepKind, ValidationKind};

/// Field-wise merge of a patch onto a base value. Every payload field
/// is optional; `None` in the patch means "inherit from base". MODIFY
/// overrides go through this, REPLACE overrides do not.
pub trait Overlay {
    #[must_use]
    fn overlay(base: &Self, patch: &Self) -> Self;
}

/// Exposes the category-specific semantic sub-type used to detect that
/// two differently-identified rules express the same kind of rule.
pub trait SemanticTyped {
    type Kind: Copy + PartialEq;

    fn semantic_kind(&self) -> Option<Self::Kind>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationPayload {
    #[serde(default)]
    pub kind: Option<ValidationKind>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub threshold_hours: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateAdjustmentPayload {
    #[serde(default)]
    pub kind: Option<AdjustmentKind>,
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default)]
    pub frequency: Option<AdjustmentFrequency>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PricingStepPayload {
    #[serde(default)]
    pub kind: Option<PricingStepKind>,
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default)]
    pub amount_minor: Option<i64>,
    #[serde(default)]
    pub parameter_key: Option<String>,
}

impl Overlay for ValidationPayload {
    fn overlay(base: &Self, patch: &Self) -> Self {
        Self {
            kind: patch.kind.or(base.kind),
            required: patch.required.or(base.required),
            threshold_hours: patch.threshold_hours.or(base.threshold_hours),
        }
    }
}

impl Overlay for RateAdjustmentPayload {
    fn overlay(base: &Self, patch: &Self) -> Self {
        Self {
            kind: patch.kind.or(base.kind),
            percent: patch.percent.or(base.percent),
            frequency: patch.frequency.or(base.frequency),
        }
    }
}

impl Overlay for PricingStepPayload {
    fn overlay(base: &Self, patch: &Self) -> Self {
        Self {
            kind: patch.kind.or(base.kind),
            percent: patch.percent.or(base.percent),
            amount_minor: patch.amount_minor.or(base.amount_minor),
            parameter_key: patch
                .parameter_key
                .clone()
                .or_else(|| base.parameter_key.clone()),
        }
    }
}

impl SemanticTyped for ValidationPayload {
    type Kind = ValidationKind;

    fn semantic_kind(&self) -> Option<ValidationKind> {
        self.kind
    }
}

impl SemanticTyped for RateAdjustmentPayload {
    type Kind = AdjustmentKind;

    fn semantic_kind(&self) -> Option<AdjustmentKind> {
        self.kind
    }
}

impl SemanticTyped for PricingStepPayload {
    type Kind = PricingStepKind;

    fn semantic_kind(&self) -> Option<PricingStepKind> {
        self.kind
    }
}

// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use chrono::NaiveDate;
use kontor_core::RuleId;

use crate::window::ValidityWindow;

/// Contract-type-wide rule. Ownership by a `ContractTypeCode` lives at
/// the store boundary; the rule itself only knows its id within the
/// (type code, category) scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaseRule<P> {
    pub rule_id: RuleId,
    pub label: String,
    pub priority: i32,
    pub active: bool,
    pub window: ValidityWindow,
    pub payload: P,
}

impl<P> BaseRule<P> {
    #[must_use]
    pub fn is_effective_on(&self, on: NaiveDate) -> bool {
        self.active && self.window.contains(on)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideAction {
    Replace,
    Disable,
    Modify,
}

impl OverrideAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "REPLACE",
            Self::Disable => "DISABLE",
            Self::Modify => "MODIFY",
        }
    }
}

/// Contract-specific rewrite of a base rule. `rule_id` references a
/// base rule but need not match one: REPLACE and MODIFY may introduce
/// rules the contract type never defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleOverride<P> {
    pub rule_id: RuleId,
    pub action: OverrideAction,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub priority: Option<i32>,
    pub window: ValidityWindow,
    pub payload: P,
}

impl<P> RuleOverride<P> {
    #[must_use]
    pub fn is_applicable_on(&self, on: NaiveDate) -> bool {
        self.window.contains(on)
    }
}

/// Which side last determined an effective entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum RuleOrigin {
    Base,
    Override,
}

/// Per-category output entry of the merge. Computed, never persisted;
/// recomputed on demand or served from the rule-set cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EffectiveRule<P> {
    pub rule_id: RuleId,
    pub label: String,
    pub priority: i32,
    pub payload: P,
    pub origin: RuleOrigin,
}

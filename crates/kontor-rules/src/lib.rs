#![forbid(unsafe_code)]
//! Contract rule override resolution.
//!
//! A contract type carries base rules for validation, rate adjustment,
//! and pricing; a contract may rewrite them with REPLACE / DISABLE /
//! MODIFY overrides. [`RuleResolver::resolve`] combines both sides
//! into the date-scoped, priority-ordered effective rule set that
//! downstream pricing and validation consume, behind a feature gate
//! with a deterministic percentage rollout and a per-contract
//! invalidated cache.

mod admin;
mod cache;
mod engine;
mod gate;
mod ports;
mod resolver;
mod store;

pub use admin::{AdminError, RuleAdmin};
pub use cache::{RuleSetCache, RuleSetKey};
pub use engine::merge_category;
pub use gate::{FeatureConfig, FeatureGate};
pub use ports::{
    BaseRuleRepository, BaseRuleSource, ContractDirectory, ContractRecord, OverrideRepository,
    OverrideSource, StoreError,
};
pub use resolver::{CacheInvalidator, ResolutionInputs, ResolvedRuleSet, RuleResolver};
pub use store::MemoryRuleStore;

pub const CRATE_NAME: &str = "kontor-rules";

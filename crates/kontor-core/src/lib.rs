#![forbid(unsafe_code)]

pub mod canonical;
mod errors;
mod ids;

pub use errors::{Error, Result};
pub use ids::{ContractId, ContractTypeCode, RuleId, ID_MAX_LEN};

pub const CRATE_NAME: &str = "kontor-core";

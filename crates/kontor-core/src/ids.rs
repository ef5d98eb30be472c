// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

pub const ID_MAX_LEN: usize = 64;

/// Identifier of a single contract, as issued by the contract register.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractId(String);

/// Code of a contract type, e.g. `CONSULTING_FIXED`. Shared by every
/// contract of that type; base rules are owned by this code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractTypeCode(String);

/// Identifier of a rule within one (owner, category) scope. An override
/// and the base rule it targets share the same `RuleId`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleId(String);

impl ContractId {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        validate_id("contract_id", &value, IdCharset::Mixed)?;
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ContractTypeCode {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        validate_id("contract_type_code", &value, IdCharset::UpperCode)?;
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RuleId {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        validate_id("rule_id", &value, IdCharset::Mixed)?;
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Copy)]
enum IdCharset {
    Mixed,
    UpperCode,
}

fn validate_id(kind: &'static str, value: &str, charset: IdCharset) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidIdentifier {
            kind,
            value: value.to_owned(),
            reason: "must not be empty",
        });
    }

    if value.len() > ID_MAX_LEN {
        return Err(Error::InvalidIdentifier {
            kind,
            value: value.to_owned(),
            reason: "must be at most 64 characters",
        });
    }

    let valid = match charset {
        IdCharset::Mixed => value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'),
        IdCharset::UpperCode => value
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'),
    };
    if !valid {
        let reason = match charset {
            IdCharset::Mixed => "must contain only [A-Za-z0-9._-]",
            IdCharset::UpperCode => "must contain only [A-Z0-9_]",
        };
        return Err(Error::InvalidIdentifier {
            kind,
            value: value.to_owned(),
            reason,
        });
    }

    Ok(())
}

macro_rules! impl_id_traits {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = Error;

            fn try_from(value: &str) -> Result<Self> {
                Self::new(value)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }
    };
}

impl_id_traits!(ContractId);
impl_id_traits!(ContractTypeCode);
impl_id_traits!(RuleId);

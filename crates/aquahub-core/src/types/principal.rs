//! Principal identity: a numeric account id plus the account's role.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Account roles. The role is fixed at registration and echoed into every
/// issued token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Marketplace administrator.
    Admin,
    /// End customer ordering water.
    Customer,
    /// Refilling station owner.
    Owner,
    /// Station staff member.
    Staff,
}

impl Role {
    /// Stable numeric code persisted in the `authentication` table.
    pub fn code(&self) -> i16 {
        match self {
            Self::Admin => 0,
            Self::Customer => 1,
            Self::Owner => 2,
            Self::Staff => 3,
        }
    }

    /// Inverse of [`Role::code`].
    pub fn from_code(code: i16) -> Result<Self, AppError> {
        match code {
            0 => Ok(Self::Admin),
            1 => Ok(Self::Customer),
            2 => Ok(Self::Owner),
            3 => Ok(Self::Staff),
            _ => Err(AppError::validation(format!("Invalid user type code: {code}"))),
        }
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "customer",
            Self::Owner => "owner",
            Self::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            "owner" => Ok(Self::Owner),
            "staff" => Ok(Self::Staff),
            _ => Err(AppError::validation(format!(
                "Invalid user type: '{s}'. Expected one of: admin, customer, owner, staff"
            ))),
        }
    }
}

/// An authenticated entity. The store trusts the id without checking it
/// against the business tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// Account id within the role's table.
    pub id: i64,
    /// Account role.
    pub role: Role,
}

impl Principal {
    /// Creates a principal.
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role, self.id)
    }
}

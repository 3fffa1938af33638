use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Permission tier asserted by the role claim.
///
/// Identifiers the backend adds later parse as [`Role::Other`] and only
/// match an allow-list entry with the same identifier. Roles compare by
/// identifier, so `Other("ADMIN")` equals `Admin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    SuperAdmin,
    Admin,
    SalesRep,
    Analyst,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::SalesRep => "SALES_REP",
            Role::Analyst => "ANALYST",
            Role::Other(s) => s,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.as_str(), "SUPER_ADMIN" | "ADMIN")
    }

    /// Roles a user with this role may hand out when creating users.
    /// `SUPER_ADMIN` is never assignable.
    pub fn assignable_roles(&self) -> Vec<Role> {
        if *self == Role::SuperAdmin {
            vec![Role::Admin, Role::Analyst, Role::SalesRep]
        } else {
            vec![Role::Analyst, Role::SalesRep]
        }
    }
}

impl PartialEq for Role {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Role {}

impl Hash for Role {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl FromStr for Role {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "SUPER_ADMIN" => Role::SuperAdmin,
            "ADMIN" => Role::Admin,
            "SALES_REP" => Role::SalesRep,
            "ANALYST" => Role::Analyst,
            other => Role::Other(other.to_string()),
        })
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(role) => role,
            Err(never) => match never {},
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform roles that own a term preference and a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Employer,
    Teacher,
    Admin,
}

impl Role {
    pub const fn ordered() -> [Self; 3] {
        [Self::Employer, Self::Teacher, Self::Admin]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Employer => "employer",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The signed-in user, as far as the core needs to know them.
///
/// Both parts are optional because session data may be incomplete; callers that key
/// storage by actor fall back to an anonymous scope in that case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub role: Option<Role>,
    pub user_id: Option<String>,
}

impl Actor {
    pub fn new(role: Role, user_id: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            user_id: Some(user_id.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

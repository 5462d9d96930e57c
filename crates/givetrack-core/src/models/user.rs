use serde::{Deserialize, Serialize};

/// Account role as reported by `GET user/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Hr,
    /// Any other role string; such users can browse and donate only
    Member(String),
}

impl Role {
    /// Admin and HR staff may create, edit and delete events
    pub fn can_manage_events(&self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Member(other) => other,
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "admin" => Role::Admin,
            "hr" => Role::Hr,
            _ => Role::Member(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub email: String,
}

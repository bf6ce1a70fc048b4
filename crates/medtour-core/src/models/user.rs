//! Users, roles and the acting identity passed to workflow operations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Agent,
    Client,
    Hospital,
    Finance,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Agent,
        Role::Client,
        Role::Hospital,
        Role::Finance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Agent => "agent",
            Role::Client => "client",
            Role::Hospital => "hospital",
            Role::Finance => "finance",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "agent" => Some(Role::Agent),
            "client" => Some(Role::Client),
            "hospital" => Some(Role::Hospital),
            "finance" => Some(Role::Finance),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is performing an operation. Copied verbatim into history and log
/// entries; the engine never looks the actor up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }
}

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique user ID (`user_` prefix)
    pub id: String,
    /// Login name, unique ignoring case
    pub username: String,
    /// SHA-256 hex of the password
    #[serde(skip_serializing, default)]
    pub credential_hash: String,
    pub role: Role,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// False until the user replaces the password they were issued
    pub password_changed: bool,
    /// Hospitals a hospital-role user works for
    pub hospital_ids: Vec<String>,
    pub created_at: String,
}

impl User {
    /// The actor identity for operations performed by this user.
    pub fn as_actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.full_name.clone(), self.role)
    }

    pub fn must_change_password(&self) -> bool {
        !self.password_changed
    }

    pub fn is_affiliated_with(&self, hospital_id: &str) -> bool {
        self.hospital_ids.iter().any(|id| id == hospital_id)
    }
}

/// Account creation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub hospital_ids: Vec<String>,
}

/// Profile update. `None` leaves a field alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub hospital_ids: Option<Vec<String>>,
}

impl UserPatch {
    pub fn apply(self, user: &mut User) {
        if let Some(full_name) = self.full_name {
            user.full_name = full_name;
        }
        if self.email.is_some() {
            user.email = self.email;
        }
        if self.phone.is_some() {
            user.phone = self.phone;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(hospital_ids) = self.hospital_ids {
            user.hospital_ids = hospital_ids;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_str_opt(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_str_opt("superuser"), None);
    }

    #[test]
    fn test_credential_not_serialized() {
        let user = User {
            id: "user_1".into(),
            username: "agent1".into(),
            credential_hash: "secret".into(),
            role: Role::Agent,
            full_name: "Agent One".into(),
            email: None,
            phone: None,
            password_changed: false,
            hospital_ids: vec![],
            created_at: "2024-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(user.must_change_password());
        assert_eq!(user.as_actor().role, Role::Agent);
    }
}

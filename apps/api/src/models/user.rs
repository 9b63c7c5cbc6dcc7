use serde::{Deserialize, Serialize};

/// Entry of the static `users.json` list. Passwords are stored and compared as plaintext.
///
/// Absent fields read as empty strings; login rejects empty credentials, so such
/// entries can never match.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct User {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// On-disk shape of `users.json`: `{ "users": [...] }`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UsersDocument {
    #[serde(default)]
    pub users: Vec<User>,
}

/// Identity returned by a successful login; never includes the password.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserSummary {
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            email: user.email.clone(),
            role: user.role.clone(),
            name: user.name.clone(),
        }
    }
}

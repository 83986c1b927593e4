use serde::{Deserialize, Serialize};

/// A registered account as persisted in the credential store.
///
/// The bcrypt hash is kept under the `password` key of the on-disk record; it never
/// leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(rename = "password")]
    pub password_hash: String,
}

impl User {
    /// The identifier following the highest one in `users`, starting at 1.
    pub fn next_id(users: &[User]) -> i64 {
        users.iter().map(|u| u.id).max().unwrap_or(0) + 1
    }
}

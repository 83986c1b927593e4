pub mod extractors;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use serde::{Deserialize, Serialize};

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use service::CredentialService;
pub use token::{Claims, TokenService};

/// Username/password payload shared by registration and login.
///
/// Absent fields deserialize as empty strings so the credential service, not the JSON
/// extractor, decides how a missing field is reported.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Response structure after successful authentication (login or registration).
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The signed bearer token.
    pub token: String,
    /// The authenticated user's name.
    pub username: String,
}

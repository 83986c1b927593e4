//! Registration and login over the credential store.

use actix_web::web;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::TokenService;
use crate::auth::AuthResponse;
use crate::error::AppError;
use crate::models::User;
use crate::store::JsonFileStore;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Clone)]
pub struct CredentialService {
    users: JsonFileStore<User>,
    tokens: TokenService,
    bcrypt_cost: u32,
}

impl CredentialService {
    pub fn new(users: JsonFileStore<User>, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self {
            users,
            tokens,
            bcrypt_cost,
        }
    }

    pub fn store(&self) -> &JsonFileStore<User> {
        &self.users
    }

    /// Creates an account and returns a token for it.
    ///
    /// Fails with `BadRequest` on an empty username or password and with `Conflict` when
    /// the username is taken (exact, case-sensitive match).
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, AppError> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::BadRequest(
                "Username and password are required".into(),
            ));
        }

        // Cheap early exit before paying for a hash; repeated under the lock below.
        if self.find(username).await.is_some() {
            return Err(user_exists());
        }

        let cost = self.bcrypt_cost;
        let password = password.to_string();
        let password_hash = web::block(move || hash_password(&password, cost)).await??;

        let user = self
            .users
            .update(|users| {
                if users.iter().any(|u| u.username == username) {
                    return Err(user_exists());
                }
                let user = User {
                    id: User::next_id(users),
                    username: username.to_string(),
                    password_hash,
                };
                users.push(user.clone());
                Ok(user)
            })
            .await?;

        log::info!("Registered user {} (id {})", user.username, user.id);
        self.issue(&user)
    }

    /// Checks a username/password pair and returns a fresh token.
    ///
    /// Unknown users and wrong passwords produce the same `Unauthorized` error.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, AppError> {
        let user = self
            .find(username)
            .await
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let valid = web::block(move || verify_password(&password, &hash)).await??;
        if !valid {
            log::debug!("Rejected login for {}", user.username);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        self.issue(&user)
    }

    async fn find(&self, username: &str) -> Option<User> {
        self.users
            .load()
            .await
            .into_iter()
            .find(|u| u.username == username)
    }

    fn issue(&self, user: &User) -> Result<AuthResponse, AppError> {
        Ok(AuthResponse {
            token: self.tokens.generate(user.id, &user.username)?,
            username: user.username.clone(),
        })
    }
}

fn user_exists() -> AppError {
    AppError::Conflict("User already exists".into())
}

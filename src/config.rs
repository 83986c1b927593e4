use std::env;
use std::io;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::auth::token::MAX_LIFETIME_HOURS;

/// bcrypt cost applied to new password hashes unless `BCRYPT_COST` says otherwise.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Costs bcrypt accepts.
pub const BCRYPT_COST_RANGE: RangeInclusive<u32> = 4..=31;

/// Process configuration, read once at start-up and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Path of the JSON array holding user records.
    pub users_file: PathBuf,
    /// Path of the JSON array holding tasks.
    pub tasks_file: PathBuf,
    /// Secret used to sign and verify bearer tokens.
    pub jwt_secret: String,
    /// Token lifetime. `None` issues tokens without an `exp` claim.
    pub jwt_expiration_hours: Option<i64>,
    pub bcrypt_cost: u32,
    /// `development` exposes internal error details in 500 responses.
    pub app_env: String,
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// `JWT_SECRET` is mandatory; every other variable has a default.
    pub fn from_env() -> io::Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| invalid_config("JWT_SECRET must be set"))?;

        let jwt_expiration_hours: Option<i64> = parse_var("JWT_EXPIRATION_HOURS")?;
        if let Some(hours) = jwt_expiration_hours {
            if !(1..=MAX_LIFETIME_HOURS).contains(&hours) {
                return Err(invalid_config(&format!(
                    "JWT_EXPIRATION_HOURS must be between 1 and {}, got {}",
                    MAX_LIFETIME_HOURS, hours
                )));
            }
        }

        let bcrypt_cost = parse_var("BCRYPT_COST")?.unwrap_or(DEFAULT_BCRYPT_COST);
        if !BCRYPT_COST_RANGE.contains(&bcrypt_cost) {
            return Err(invalid_config(&format!(
                "BCRYPT_COST must be between {} and {}, got {}",
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end(),
                bcrypt_cost
            )));
        }

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parse_var("SERVER_PORT")?.unwrap_or(3000),
            users_file: env::var("USERS_FILE")
                .unwrap_or_else(|_| "data/users.json".to_string())
                .into(),
            tasks_file: env::var("TASKS_FILE")
                .unwrap_or_else(|_| "data/tasks.json".to_string())
                .into(),
            jwt_secret,
            jwt_expiration_hours,
            bcrypt_cost,
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),
        })
    }

    /// A configuration storing both collections under `dir`, with defaults elsewhere.
    ///
    /// Used by tests and tools that run against a scratch directory.
    pub fn for_data_dir(dir: &Path, jwt_secret: &str) -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            users_file: dir.join("users.json"),
            tasks_file: dir.join("tasks.json"),
            jwt_secret: jwt_secret.to_string(),
            jwt_expiration_hours: None,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            app_env: "production".to_string(),
        }
    }

    pub fn is_development(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("development")
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: FromStr>(name: &str) -> io::Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid_config(&format!("{} must be a number, got {:?}", name, raw))),
        Err(_) => Ok(None),
    }
}

fn invalid_config(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg.to_string())
}

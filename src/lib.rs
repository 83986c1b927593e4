#![doc = "The `tareas_api` library crate."]
#![doc = ""]
#![doc = "Flat-file persistence, credential handling, bearer-token authentication, task"]
#![doc = "management, routing and error handling for the Tareas API. The binary (`main.rs`)"]
#![doc = "builds an [`state::AppState`] from [`config::Config`] and serves [`routes::config`]."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod tasks;

pub use error::AppError;
pub use state::AppState;

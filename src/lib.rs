#![doc = "The `taskpulse` library crate."]
#![doc = ""]
#![doc = "Personal task tracking: registration and login, owner-scoped task storage,"]
#![doc = "and a productivity dashboard computed from a user's tasks. The binary"]
#![doc = "(`main.rs`) loads configuration, builds an `AppState` and serves `routes::config`."]

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod state;

pub use crate::error::AppError;
pub use crate::state::AppState;

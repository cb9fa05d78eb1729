//! CineDB Backend Library
//!
//! Movie and director CRUD over SQLite with bcrypt credentials, one-hour JWT
//! access tokens and an `admin` role gate. The binary in `main.rs` only wires
//! configuration, logging and the listener around [`api::create_router`].

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod validation;

pub use api::{create_router, AppState};
pub use config::Config;

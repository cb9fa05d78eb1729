//! Authentication Module
//! Password hashing, JWT issuance/verification, credential storage and the
//! request pipeline stages that protect domain routes

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod user_store;

pub use api::AuthState;
pub use jwt::{JwtHandler, TokenError};
pub use middleware::{require_auth, require_role};
pub use models::{Identity, Role, User};
pub use password::{PasswordHasher, MIN_HASH_COST};
pub use user_store::UserStore;

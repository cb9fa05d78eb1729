//! Authentication API Endpoints
//! Registration, login and identity lookup

use crate::api::ApiError;
use crate::auth::{
    jwt::JwtHandler,
    models::{CredentialsRequest, Identity, LoginResponse, RegisterResponse, Role},
    password::PasswordHasher,
    user_store::UserStore,
};
use crate::validation::{self, ValidationError};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: UserStore,
    pub jwt_handler: Arc<JwtHandler>,
    pub hasher: PasswordHasher,
    /// Hash verified against when the username is unknown, so that branch
    /// costs the same bcrypt work as a wrong password. Created on first use.
    decoy_hash: Arc<OnceCell<String>>,
}

impl AuthState {
    pub fn new(user_store: UserStore, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            user_store,
            jwt_handler,
            hasher: PasswordHasher::default(),
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self.decoy_hash = Arc::new(OnceCell::new());
        self
    }

    /// Burn one bcrypt verification at the configured cost. Always fails.
    async fn verify_decoy(&self, password: String) -> anyhow::Result<()> {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.hasher.hash("decoy-password".to_string()))
            .await?;
        self.hasher.verify(password, decoy.clone()).await?;
        Ok(())
    }
}

/// Validated `{username, password}` pair.
struct Credentials {
    username: String,
    password: String,
}

fn credentials(
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Credentials, ValidationError> {
    let Json(body) = payload.map_err(|_| ValidationError::MalformedBody)?;

    let username = body.username.unwrap_or_default().trim().to_string();
    let password = body.password.unwrap_or_default();
    if username.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingFields("username and password"));
    }
    Ok(Credentials { username, password })
}

async fn register_with_role(
    state: &AuthState,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
    role: Role,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let creds = credentials(payload)?;
    validation::password(&creds.password)?;

    let password_hash = state.hasher.hash(creds.password).await?;
    let user_id = state
        .user_store
        .register(&creds.username, &password_hash, role)
        .await
        .inspect_err(|e| warn!(username = %creds.username, "Registration failed: {}", e))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: format!("Registered {} account", role),
            user_id,
        }),
    ))
}

/// Register endpoint - POST /auth/register
pub async fn register(
    State(state): State<AuthState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    register_with_role(&state, payload, Role::User).await
}

/// Admin register endpoint - POST /auth/register-admin
pub async fn register_admin(
    State(state): State<AuthState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    register_with_role(&state, payload, Role::Admin).await
}

/// Login endpoint - POST /auth/login
pub async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let creds = credentials(payload)?;
    info!("Login attempt: {}", creds.username);

    let Some(user) = state.user_store.find_by_username(&creds.username).await? else {
        state.verify_decoy(creds.password).await?;
        warn!("Failed login attempt: {}", creds.username);
        return Err(ApiError::InvalidCredentials);
    };

    let valid = state
        .hasher
        .verify(creds.password, user.password_hash.clone())
        .await?;
    if !valid {
        warn!("Failed login attempt: {}", creds.username);
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.jwt_handler.issue(&Identity::from(&user))?;
    info!("Login successful: {} ({})", user.username, user.role);

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}

/// Current identity - GET /auth/me
/// Built from the verified token alone, no database lookup
pub async fn me(identity: Identity) -> Json<Identity> {
    Json(identity)
}

//! CRUD endpoints shared by every [`Resource`]
//!
//! | Method | Path | Pipeline |
//! |---|---|---|
//! | GET | `/{path}`, `/{path}/:id` | public |
//! | POST | `/{path}` | auth |
//! | PUT | `/{path}/:id` | auth |
//! | DELETE | `/{path}/:id` | auth, admin role |

use crate::api::ApiError;
use crate::auth::{require_auth, require_role, JwtHandler, Role};
use crate::db::RecordStore;
use crate::models::Resource;
use crate::validation::{self, ValidationError};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tower::ServiceBuilder;

/// Ids that do not parse as integers cannot match any row.
fn record_id<R: Resource>(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    id.map(|Path(id)| id).map_err(|_| ApiError::NotFound(R::NAME))
}

fn json_object(payload: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, ValidationError> {
    match payload {
        Ok(Json(Value::Object(map))) => Ok(map),
        _ => Err(ValidationError::MalformedBody),
    }
}

pub async fn list<R: Resource>(State(store): State<RecordStore<R>>) -> Result<Json<Vec<R>>, ApiError> {
    Ok(Json(store.list().await?))
}

pub async fn show<R: Resource>(
    State(store): State<RecordStore<R>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<R>, ApiError> {
    let id = record_id::<R>(id)?;
    store
        .get(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(R::NAME))
}

pub async fn create<R: Resource>(
    State(store): State<RecordStore<R>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<R>), ApiError> {
    let body = json_object(payload)?;
    let draft = R::draft_from(&body, validation::current_year())?;

    let record = store.insert(draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update<R: Resource>(
    State(store): State<RecordStore<R>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<R>, ApiError> {
    let id = record_id::<R>(id)?;
    let body = json_object(payload)?;
    let draft = R::draft_from(&body, validation::current_year())?;

    store
        .update(id, draft)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(R::NAME))
}

pub async fn remove<R: Resource>(
    State(store): State<RecordStore<R>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = record_id::<R>(id)?;
    if !store.delete(id).await? {
        return Err(ApiError::NotFound(R::NAME));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Routes for one resource type, with its store bound as state.
pub fn resource_router<R: Resource>(store: RecordStore<R>, jwt_handler: Arc<JwtHandler>) -> Router {
    let collection = format!("/{}", R::PATH);
    let item = format!("/{}/:id", R::PATH);

    let public = Router::new()
        .route(&collection, get(list::<R>))
        .route(&item, get(show::<R>));

    let authenticated = Router::new()
        .route(&collection, post(create::<R>))
        .route(&item, put(update::<R>))
        .route_layer(middleware::from_fn_with_state(
            jwt_handler.clone(),
            require_auth,
        ));

    let admin = Router::new().route(&item, delete(remove::<R>)).route_layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn_with_state(jwt_handler, require_auth))
            .layer(middleware::from_fn_with_state(Role::Admin, require_role)),
    );

    public.merge(authenticated).merge(admin).with_state(store)
}

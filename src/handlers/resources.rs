//! The uniform CRUD contract: one generic handler set shared by all five
//! resource types, differing only in the `ResourceSpec` attached to the
//! router. Composition per operation is validator -> store adapter ->
//! response serialization.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Extension, Router,
};
use futures::future::try_join_all;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{require_auth, AuthUser};
use crate::resource::{expand_document, ResourceSpec};
use crate::store::Document;
use crate::AppState;

/// Builds the five-operation router for one resource type. GET routes are
/// public; POST/PUT/DELETE are wrapped by the bearer-token guard.
pub fn resource_router(spec: &'static ResourceSpec, state: &AppState) -> Router<AppState> {
    let mutating = Router::new()
        .route("/", post(create))
        .route("/:id", put(update).delete(remove))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/", get(list))
        .route("/:id", get(get_by_id))
        .merge(mutating)
        .layer(Extension(spec))
}

/// GET /api/<collection> - all records with declared references expanded
async fn list(
    State(state): State<AppState>,
    Extension(spec): Extension<&'static ResourceSpec>,
) -> Result<Json<Value>, ApiError> {
    let mut docs = state.store.find_all(spec.collection).await?;

    try_join_all(
        docs.iter_mut()
            .map(|doc| expand_document(state.store.as_ref(), spec, doc)),
    )
    .await?;

    Ok(Json(Value::Array(docs.into_iter().map(Value::Object).collect())))
}

/// GET /api/<collection>/:id - one record with declared references expanded
async fn get_by_id(
    State(state): State<AppState>,
    Extension(spec): Extension<&'static ResourceSpec>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, spec)?;
    let mut doc = state
        .store
        .find_by_id(spec.collection, id)
        .await?
        .ok_or_else(|| ApiError::not_found(spec.type_name))?;

    expand_document(state.store.as_ref(), spec, &mut doc).await?;
    Ok(Json(Value::Object(doc)))
}

/// POST /api/<collection> - validate and persist a new record
async fn create(
    State(state): State<AppState>,
    Extension(spec): Extension<&'static ResourceSpec>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let mut doc = validated_document(spec, payload)?;
    for field in spec.schema.fields {
        if let (None, Some(default)) = (doc.get(field.name), field.default) {
            doc.insert(field.name.to_string(), Value::String(default.to_string()));
        }
    }
    if spec.timestamps {
        doc.insert("createdAt".to_string(), serde_json::json!(chrono::Utc::now()));
    }

    let stored = state.store.insert(spec.collection, doc).await?;
    tracing::debug!(user = %user.user_id, collection = spec.collection, "record created");

    Ok((StatusCode::CREATED, Json(Value::Object(stored))))
}

/// PUT /api/<collection>/:id - validate and replace the named fields
async fn update(
    State(state): State<AppState>,
    Extension(spec): Extension<&'static ResourceSpec>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let fields = validated_document(spec, payload)?;
    let id = parse_id(&id, spec)?;

    let updated = state
        .store
        .update(spec.collection, id, fields)
        .await?
        .ok_or_else(|| ApiError::not_found(spec.type_name))?;
    tracing::debug!(user = %user.user_id, collection = spec.collection, "record updated");

    Ok(Json(Value::Object(updated)))
}

/// DELETE /api/<collection>/:id - remove the record
async fn remove(
    State(state): State<AppState>,
    Extension(spec): Extension<&'static ResourceSpec>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, spec)?;

    if !state.store.delete(spec.collection, id).await? {
        return Err(ApiError::not_found(spec.type_name));
    }
    tracing::debug!(user = %user.user_id, collection = spec.collection, "record deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// A malformed id can never match a record, so it reads as not-found.
fn parse_id(raw: &str, spec: &ResourceSpec) -> Result<Uuid, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found(spec.type_name))
}

fn validated_document(spec: &ResourceSpec, payload: Value) -> Result<Document, ApiError> {
    spec.schema.validate(&payload).map_err(ApiError::validation)?;
    match payload {
        Value::Object(map) => Ok(map),
        // validate() only passes objects
        _ => Err(ApiError::internal("payload lost between validation and storage")),
    }
}

//! Resource handlers: list, read, create, update, delete.

use crate::config::{ListFilter, Operation, ResolvedEntity};
use crate::error::AppError;
use crate::extractors::{JsonObject, PathParams};
use crate::response::{created, ok};
use crate::service::{CrudService, RequestValidator};
use crate::sql::FilterValue;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::collections::HashMap;

fn resolve_entity<'a>(state: &'a AppState, path_segment: &str, op: Operation) -> Result<&'a ResolvedEntity, AppError> {
    let entity = state
        .model
        .entity_by_path(path_segment)
        .ok_or_else(|| AppError::NotFound(format!("resource not found: {}", path_segment)))?;
    if !entity.allows(op) {
        return Err(AppError::MethodNotAllowed(format!(
            "{} not allowed on {}",
            op.as_str(),
            path_segment
        )));
    }
    Ok(entity)
}

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse::<i32>()
        .map(i64::from)
        .map_err(|_| AppError::Validation(format!("invalid id: {}", id_str)))
}

/// Read the entity's filter parameter from the query string. Blank means no filter.
fn list_filter(entity: &ResolvedEntity, params: &HashMap<String, String>) -> Result<Option<FilterValue>, AppError> {
    let Some(def) = &entity.filter else { return Ok(None) };
    let Some(raw) = params.get(def.param()).filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };
    Ok(Some(match def {
        ListFilter::Contains { .. } => FilterValue::Contains(raw.clone()),
        ListFilter::Equals { param, .. } => {
            let n = raw
                .trim()
                .parse::<i32>()
                .map_err(|_| AppError::Validation(format!("{} must be an integer", param)))?;
            FilterValue::Equals(i64::from(n))
        }
    }))
}

pub async fn list(
    State(state): State<AppState>,
    PathParams(path_segment): PathParams<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let entity = resolve_entity(&state, &path_segment, Operation::Read)?;
    let filter = list_filter(entity, &params)?;
    let rows = CrudService::list(&state.pool, entity, filter.as_ref()).await?;
    Ok(ok(rows))
}

pub async fn read(
    State(state): State<AppState>,
    PathParams((path_segment, id_str)): PathParams<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let entity = resolve_entity(&state, &path_segment, Operation::Read)?;
    let id = parse_id(&id_str)?;
    let row = CrudService::read(&state.pool, entity, id)
        .await?
        .ok_or_else(|| AppError::NotFound(entity.not_found_message.clone()))?;
    Ok(ok(row))
}

pub async fn create(
    State(state): State<AppState>,
    PathParams(path_segment): PathParams<String>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let entity = resolve_entity(&state, &path_segment, Operation::Create)?;
    let record = RequestValidator::normalize(&body, entity)?;
    let row = CrudService::create(&state.pool, entity, &record).await?;
    Ok(created(row))
}

pub async fn update(
    State(state): State<AppState>,
    PathParams((path_segment, id_str)): PathParams<(String, String)>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let entity = resolve_entity(&state, &path_segment, Operation::Update)?;
    let id = parse_id(&id_str)?;
    let record = RequestValidator::normalize(&body, entity)?;
    let row = CrudService::update(&state.pool, entity, id, &record)
        .await?
        .ok_or_else(|| AppError::NotFound(entity.not_found_message.clone()))?;
    Ok(ok(row))
}

pub async fn delete(
    State(state): State<AppState>,
    PathParams((path_segment, id_str)): PathParams<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let entity = resolve_entity(&state, &path_segment, Operation::Delete)?;
    let id = parse_id(&id_str)?;
    if !CrudService::delete(&state.pool, entity, id).await? {
        return Err(AppError::NotFound(entity.not_found_message.clone()));
    }
    Ok(StatusCode::NO_CONTENT)
}

// server/src/http/handlers.rs

use lib::repository::EntityRepository;
use log::{debug, info};
use models::{FieldMapping, Record};
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::Response;
use warp::Reply;

use crate::http::errors::ApiError;
use crate::http::routes::EntityRoute;

/// Shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub repository: Arc<EntityRepository>,
}

impl AppState {
    pub fn new(repository: EntityRepository) -> Self {
        AppState {
            repository: Arc::new(repository),
        }
    }
}

type HandlerResult = Result<Response, Infallible>;

fn json_reply<T: serde::Serialize>(body: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

fn row_reply(message: &str, field: &str, row: Record, status: StatusCode) -> Response {
    let mut body = Map::new();
    body.insert("message".to_string(), Value::from(message));
    body.insert(field.to_string(), Value::Object(row));
    json_reply(&body, status)
}

fn finish(result: Result<Response, ApiError>) -> HandlerResult {
    Ok(result.unwrap_or_else(|e| e.into_response()))
}

/// Request bodies must be JSON objects; anything else is a 400.
pub fn parse_mapping(body: &[u8]) -> Result<FieldMapping, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::bad_request("Request body must be a JSON object")),
        Err(e) => Err(ApiError::bad_request(format!("Malformed JSON body: {}", e))),
    }
}

pub async fn health() -> HandlerResult {
    Ok(warp::reply::with_status("ok", StatusCode::OK).into_response())
}

pub async fn list(route: &'static EntityRoute, state: AppState) -> HandlerResult {
    debug!("GET {} list", route.entity);
    let result = match state.repository.list(route.entity).await {
        Ok(rows) => match route.empty_list {
            Some(message) if rows.is_empty() => Err(ApiError::not_found(message)),
            _ => Ok(json_reply(&rows, StatusCode::OK)),
        },
        Err(e) => Err(ApiError::from_hospital(e, route)),
    };
    finish(result)
}

pub async fn get(route: &'static EntityRoute, id: String, state: AppState) -> HandlerResult {
    let result = state
        .repository
        .get_by_id(route.entity, &Value::String(id))
        .await
        .map(|row| json_reply(&row, StatusCode::OK))
        .map_err(|e| ApiError::from_hospital(e, route));
    finish(result)
}

pub async fn create(route: &'static EntityRoute, body: Bytes, state: AppState) -> HandlerResult {
    finish(insert_row(route, &body, &state.repository).await)
}

async fn insert_row(
    route: &EntityRoute,
    body: &[u8],
    repository: &EntityRepository,
) -> Result<Response, ApiError> {
    let record = parse_mapping(body)?;
    let row = repository
        .insert(route.entity, &record)
        .await
        .map_err(|e| ApiError::from_hospital(e, route))?;
    Ok(row_reply(route.created, route.created_field, row, StatusCode::CREATED))
}

pub async fn update(
    route: &'static EntityRoute,
    id: String,
    body: Bytes,
    state: AppState,
) -> HandlerResult {
    finish(update_row(route, id, &body, &state.repository).await)
}

async fn update_row(
    route: &EntityRoute,
    id: String,
    body: &[u8],
    repository: &EntityRepository,
) -> Result<Response, ApiError> {
    let mapping = parse_mapping(body)?;
    info!("Updating {} {} ({} fields)", route.entity, id, mapping.len());
    let row = repository
        .update(route.entity, &Value::String(id), &mapping)
        .await
        .map_err(|e| ApiError::from_hospital(e, route))?;
    Ok(row_reply(route.updated, route.field, row, StatusCode::OK))
}

pub async fn delete(route: &'static EntityRoute, id: String, state: AppState) -> HandlerResult {
    let result = state
        .repository
        .delete_by_id(route.entity, &Value::String(id))
        .await
        .map(|row| row_reply(route.deleted, route.field, row, StatusCode::OK))
        .map_err(|e| ApiError::from_hospital(e, route));
    finish(result)
}

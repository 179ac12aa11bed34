// server/src/http/errors.rs

use log::{error, warn};
use models::HospitalError;
use serde_json::json;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Rejection, Reply};

use crate::http::routes::EntityRoute;

/// An error reply: a status code and a `{"error": ...}` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Maps a repository failure for `route`. Store messages stay in the log.
    pub fn from_hospital(err: HospitalError, route: &EntityRoute) -> Self {
        match err {
            HospitalError::UnknownEntity(_) => ApiError::not_found(err.to_string()),
            HospitalError::NotFound { .. } => ApiError::not_found(route.not_found),
            HospitalError::StoreError(message) => {
                error!("Store failure on {}: {}", route.entity, message);
                ApiError::internal(format!("Database error while processing {}", route.entity))
            }
            validation => {
                warn!("Rejected {} request: {}", route.entity, validation);
                ApiError::bad_request(validation.to_string())
            }
        }
    }
}

impl Reply for ApiError {
    fn into_response(self) -> Response {
        let body = warp::reply::json(&json!({ "error": self.message }));
        warp::reply::with_status(body, self.status).into_response()
    }
}

/// Turns warp's own rejections (no such path, wrong verb, oversized body,
/// refused CORS preflight) into the same JSON error shape the handlers use.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let reply = if err.is_not_found() {
        ApiError::not_found("Not found")
    } else if let Some(forbidden) = err.find::<warp::cors::CorsForbidden>() {
        ApiError::new(StatusCode::FORBIDDEN, forbidden.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        ApiError::new(StatusCode::LENGTH_REQUIRED, "A content-length header is required")
    } else {
        error!("Unhandled rejection: {:?}", err);
        ApiError::internal("Internal server error")
    };
    Ok(reply.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::routes::{PATIENT, STAFF};

    #[test]
    fn validation_errors_are_bad_requests() {
        let cases = vec![
            HospitalError::NoFieldsProvided,
            HospitalError::ImmutablePrimaryKey("patient_id".to_string()),
            HospitalError::UnknownColumn("ssn".to_string()),
            HospitalError::invalid_value("date_of_birth", "expected a date"),
            HospitalError::MissingRequiredFields(vec!["gender".to_string()]),
        ];
        for err in cases {
            let message = err.to_string();
            assert_eq!(ApiError::from_hospital(err, &PATIENT), ApiError::bad_request(message));
        }
    }

    #[test]
    fn not_found_uses_the_route_wording() {
        let err = HospitalError::not_found("patient", 9);
        assert_eq!(
            ApiError::from_hospital(err, &PATIENT),
            ApiError::not_found("Patient not found")
        );
    }

    #[test]
    fn store_messages_are_not_echoed() {
        let err = HospitalError::StoreError("relation \"staff\" does not exist".to_string());
        let reply = ApiError::from_hospital(err, &STAFF);
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!reply.message.contains("relation"));
    }
}

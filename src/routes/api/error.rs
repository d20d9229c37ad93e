use rocket::http::Status;
use rocket::response::{self, status, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use serde::Serialize;

/// # error body returned by the api
/// `{"error": ..., "field": ..., "message": ...}`, `field` is only set for
/// validation errors
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ApiError {
    #[serde(skip)]
    pub status: Status,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    pub message: String,
}

impl ApiError {
    pub fn new(status: Status, error: &'static str, message: impl Into<String>) -> ApiError {
        ApiError {
            status,
            error,
            field: None,
            message: message.into(),
        }
    }

    /// a rejected request parameter
    pub fn validation(field: &'static str, message: impl Into<String>) -> ApiError {
        ApiError {
            status: Status::BadRequest,
            error: "validation_error",
            field: Some(field),
            message: message.into(),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        status::Custom(self.status, Json(self)).respond_to(request)
    }
}

use rocket::http::Status;
use rocket::{catch, Request};

use crate::routes::api::error::ApiError;

#[catch(404)]
pub fn not_found(request: &Request) -> ApiError {
    ApiError::new(Status::NotFound, "not_found", format!("{} does not exist", request.uri().path()))
}

#[catch(422)]
pub fn unprocessable(request: &Request) -> ApiError {
    ApiError::new(
        Status::UnprocessableEntity,
        "unprocessable_entity",
        format!("the request to {} could not be processed", request.uri().path()),
    )
}

#[catch(500)]
pub fn internal_error(_request: &Request) -> ApiError {
    ApiError::new(Status::InternalServerError, "internal_error", "internal server error")
}

#[catch(default)]
pub fn default(status: Status, _request: &Request) -> ApiError {
    ApiError::new(status, "error", status.reason_lossy())
}

use file_vault::VaultError;
use rocket::form;
use rocket::http::Status;
use rocket::response::{self, status::Custom, Responder};
use rocket::serde::json::Json;
use rocket::{catch, Request};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// JSON error response: `{"error": "..."}` with the status of the error class.
#[derive(Debug)]
pub struct ApiError {
    status: Status,
    message: String,
}

impl ApiError {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// A multipart field that failed to parse. Oversized parts keep their 413.
    pub fn from_form(field: &str, errors: &form::Errors<'_>) -> Self {
        let missing = errors
            .iter()
            .all(|e| matches!(e.kind, form::error::ErrorKind::Missing));
        if missing {
            return Self::new(Status::BadRequest, format!("No {} provided", field));
        }

        let status = errors.status();
        if status == Status::PayloadTooLarge {
            Self::new(status, "File exceeds the upload size limit")
        } else {
            Self::new(Status::BadRequest, format!("Invalid {}: {}", field, errors))
        }
    }
}

impl From<VaultError> for ApiError {
    fn from(err: VaultError) -> Self {
        let status = Status::from_code(err.status_code()).unwrap_or(Status::InternalServerError);
        if status == Status::InternalServerError {
            error!(error = %err, "request failed");
        }
        Self::new(status, err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::from(VaultError::from(err))
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        Custom(self.status, Json(ErrorBody { error: self.message })).respond_to(req)
    }
}

#[catch(default)]
pub fn default_catcher(status: Status, _req: &Request<'_>) -> Custom<Json<ErrorBody>> {
    let error = match status.code {
        404 => "Not found".to_string(),
        413 => "File exceeds the upload size limit".to_string(),
        _ => status.reason().unwrap_or("Request failed").to_string(),
    };
    Custom(status, Json(ErrorBody { error }))
}

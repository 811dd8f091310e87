//! Computed groups error types.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use derive_more::{Display, Error, From};
use serde::Serialize;

use crate::directory::DirectoryError;

/// Errors raised while computing or managing computed groups.
///
/// Expression problems met while resolving a user never show up here: they
/// count as "not a member". Directory failures do, because the resulting
/// group set would otherwise be silently incomplete.
#[derive(Debug, Display, Error, From)]
pub enum ComputedGroupsError {
    /// The backing directory failed.
    #[display("directory error: {_0}")]
    #[from]
    Directory(DirectoryError),

    /// A group definition carries an expression that does not validate.
    #[display("invalid expression for group '{name}': {expression}")]
    InvalidExpression { name: String, expression: String },

    /// The group name is empty or otherwise unusable.
    #[display("invalid group name: '{_0}'")]
    InvalidName(#[error(not(source))] String),

    /// No group definition with that name.
    #[display("group not found: '{_0}'")]
    GroupNotFound(#[error(not(source))] String),

    /// No authenticated principal to compute groups for.
    #[display("Unauthorized: no authenticated principal")]
    Unauthenticated,

    /// No group computer registered with the application.
    #[display("no group computer configured")]
    NotConfigured,
}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl ResponseError for ComputedGroupsError {
    fn status_code(&self) -> StatusCode {
        match self {
            ComputedGroupsError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ComputedGroupsError::InvalidExpression { .. } | ComputedGroupsError::InvalidName(_) => {
                StatusCode::BAD_REQUEST
            }
            ComputedGroupsError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            ComputedGroupsError::Directory(_) | ComputedGroupsError::NotConfigured => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(ErrorBody {
            error: status.canonical_reason().unwrap_or("Error"),
            message: self.to_string(),
        })
    }
}

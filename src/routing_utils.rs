use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum_macros::{FromRequest, FromRequestParts};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// Contains diagnostic information about an API failure
#[derive(Serialize, Debug, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[schema(example = json!({
    "error_code": "not_found",
    "error_description": "The requested entity could not be found.",
    "extra_info": null
}))]
pub struct BasicErrorResponse {
    pub error_code: String,
    pub error_description: String,
    pub extra_info: Option<String>,
}

impl BasicErrorResponse {
    fn new(error_code: &str, error_description: &str, extra_info: Option<String>) -> Self {
        BasicErrorResponse {
            error_code: error_code.into(),
            error_description: error_description.into(),
            extra_info,
        }
    }
}

/// Response for a request naming an entity that doesn't exist
pub struct NotFoundErrorResponse;

impl IntoResponse for NotFoundErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::NOT_FOUND,
            Json(BasicErrorResponse::new(
                "not_found",
                "The requested entity could not be found.",
                None,
            )),
        )
            .into_response()
    }
}

/// Response type for failures the caller can't do anything about. The cause is logged, not returned.
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        error!("Internal failure while handling a request: {:#}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(BasicErrorResponse::new(
                "internal_error",
                "Could not access data to complete your request",
                None,
            )),
        )
            .into_response()
    }
}

/// Response for requests that lack valid credentials
pub struct UnauthorizedErrorResponse;

/// Value of the WWW-Authenticate header sent with 401 responses
pub const BASIC_AUTH_CHALLENGE: &str = "Basic realm=\"tasks-api\"";

impl IntoResponse for UnauthorizedErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, BASIC_AUTH_CHALLENGE)],
            Json(BasicErrorResponse::new(
                "unauthorized",
                "Valid basic authentication credentials are required.",
                None,
            )),
        )
            .into_response()
    }
}

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing a request body that couldn't be read as JSON.
/// Undecodable JSON is a 400; other failures such as an oversized body keep axum's status.
pub struct JsonErrorResponse {
    status: StatusCode,
    parse_problem: String,
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        let status = match &value {
            JsonRejection::JsonDataError(_)
            | JsonRejection::JsonSyntaxError(_)
            | JsonRejection::MissingJsonContentType(_) => StatusCode::BAD_REQUEST,
            other => other.status(),
        };

        JsonErrorResponse {
            status,
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(BasicErrorResponse::new(
                "invalid_json",
                "The passed request body contained malformed or unreadable JSON.",
                Some(self.parse_problem),
            )),
        )
            .into_response()
    }
}

/// Wrapper for [axum::extract::Path] which reports unparseable path parameters
/// using our data structure for API errors
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(PathErrorResponse))]
pub struct Path<T>(pub T);

/// Response type representing path parameters that couldn't be parsed
pub struct PathErrorResponse {
    parse_problem: String,
}

impl From<PathRejection> for PathErrorResponse {
    fn from(value: PathRejection) -> Self {
        PathErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for PathErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(BasicErrorResponse::new(
                "invalid_path",
                "A parameter in the request path could not be parsed.",
                Some(self.parse_problem),
            )),
        )
            .into_response()
    }
}

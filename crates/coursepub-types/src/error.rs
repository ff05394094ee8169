//! Error type shared by every coursepub crate.

use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
use serde::Serialize;

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	/// Authenticated, but the role does not allow the operation
	PermissionDenied,
	/// Missing or wrong credentials, or a publish attempt that is not allowed
	Unauthorized,
	DbError,
	Parse,
	ValidationError(String),
	Conflict(String),
	ConfigError(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<axum::http::Error> for Error {
	fn from(err: axum::http::Error) -> Self {
		Self::Internal(format!("http: {}", err))
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		tracing::warn!("JSON: {}", err);
		Self::Parse
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::Unauthorized => write!(f, "unauthorized"),
			Error::DbError => write!(f, "database error"),
			Error::Parse => write!(f, "parse error"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::Conflict(msg) => write!(f, "conflict: {}", msg),
			Error::ConfigError(msg) => write!(f, "config error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
	pub code: &'static str,
	pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: ErrorBody,
}

impl ErrorResponse {
	pub fn new(code: &'static str, message: impl Into<String>) -> Self {
		Self { error: ErrorBody { code, message: message.into() } }
	}
}

impl Error {
	/// HTTP status and stable error code for this error
	pub fn status(&self) -> (StatusCode, &'static str) {
		match self {
			Error::NotFound => (StatusCode::NOT_FOUND, "E-CORE-NOTFOUND"),
			Error::PermissionDenied => (StatusCode::FORBIDDEN, "E-AUTH-NOPERM"),
			Error::Unauthorized => (StatusCode::UNAUTHORIZED, "E-AUTH-UNAUTH"),
			Error::ValidationError(_) | Error::Parse => (StatusCode::BAD_REQUEST, "E-VAL-INVALID"),
			Error::Conflict(_) => (StatusCode::CONFLICT, "E-CORE-CONFLICT"),
			Error::DbError => (StatusCode::INTERNAL_SERVER_ERROR, "E-CORE-DBERR"),
			Error::ConfigError(_) | Error::Internal(_) | Error::Io(_) => {
				(StatusCode::INTERNAL_SERVER_ERROR, "E-CORE-INTERNAL")
			}
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let (status, code) = self.status();
		let message = match &self {
			// Do not leak internals to clients
			Error::DbError | Error::ConfigError(_) | Error::Internal(_) | Error::Io(_) => {
				tracing::error!("{}", self);
				"internal server error".to_string()
			}
			Error::ValidationError(msg) | Error::Conflict(msg) => msg.clone(),
			_ => self.to_string(),
		};
		(status, Json(ErrorResponse::new(code, message))).into_response()
	}
}


// vim: ts=4

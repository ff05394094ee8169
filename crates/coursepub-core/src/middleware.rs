//! Custom middlewares

use axum::{
	body::Body,
	extract::State,
	http::{HeaderValue, Request, header, response::Response},
	middleware::Next,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::Instrument;

use crate::extract::{Auth, RequestId};
use crate::prelude::*;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Splits an `Authorization: Basic ...` header value into username and password
pub fn parse_basic_auth(header_value: &str) -> ClResult<(String, String)> {
	let encoded = header_value
		.strip_prefix("Basic ")
		.map(str::trim)
		.ok_or(Error::Unauthorized)?;
	let decoded = STANDARD.decode(encoded).map_err(|_| Error::Unauthorized)?;
	let decoded = String::from_utf8(decoded).map_err(|_| Error::Unauthorized)?;
	let (username, password) = decoded.split_once(':').ok_or(Error::Unauthorized)?;
	if username.is_empty() {
		return Err(Error::Unauthorized);
	}
	Ok((username.to_string(), password.to_string()))
}

async fn authenticate(app: &App, header_value: &str) -> ClResult<Auth> {
	let (username, password) = parse_basic_auth(header_value)?;
	let user = app.auth_adapter.check_user_password(&username, &password).await?;
	Ok(Auth(user))
}

pub async fn require_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> ClResult<Response<Body>> {
	let auth_header = req
		.headers()
		.get(header::AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.ok_or(Error::Unauthorized)?;

	let auth = authenticate(&app, auth_header).await?;
	req.extensions_mut().insert(auth);

	Ok(next.run(req).await)
}

/// Authenticates when credentials are sent. Wrong credentials are still rejected.
pub async fn optional_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> ClResult<Response<Body>> {
	if let Some(auth_header) =
		req.headers().get(header::AUTHORIZATION).and_then(|h| h.to_str().ok())
	{
		let auth = authenticate(&app, auth_header).await?;
		req.extensions_mut().insert(auth);
	}

	Ok(next.run(req).await)
}

/// Assigns a request id, runs the request inside a span carrying it and
/// echoes it in the `x-request-id` response header.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response<Body> {
	let req_id = uuid::Uuid::new_v4().simple().to_string();
	req.extensions_mut().insert(RequestId(req_id.clone()));

	let span = info_span!("req", id = %req_id);
	let mut res = next.run(req).instrument(span).await;
	if let Ok(value) = HeaderValue::from_str(&req_id) {
		res.headers_mut().insert(REQUEST_ID_HEADER, value);
	}
	res
}


// vim: ts=4

//! Settings management handlers

use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};

use coursepub_types::types::ApiResponse;

use super::types::{PermissionLevel, SettingDefinition, SettingValue};
use crate::extract::{Auth, OptionalRequestId};
use crate::prelude::*;

/// A setting with its metadata
#[derive(Serialize)]
pub struct SettingResponse {
	pub key: String,
	pub value: SettingValue,
	pub permission: PermissionLevel,
	pub description: String,
}

impl SettingResponse {
	fn new(def: &SettingDefinition, value: SettingValue) -> Self {
		Self {
			key: def.key.clone(),
			value,
			permission: def.permission,
			description: def.description.clone(),
		}
	}
}

/// Settings are readable by staff and administrators
fn check_can_read(auth: &Auth) -> ClResult<()> {
	if auth.0.role.is_staff() { Ok(()) } else { Err(Error::PermissionDenied) }
}

/// GET /api/settings - All settings with their current values
pub async fn list_settings(
	State(app): State<App>,
	auth: Auth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<SettingResponse>>>)> {
	check_can_read(&auth)?;

	let mut settings = Vec::new();
	for def in app.settings_registry.list() {
		match app.settings.get(&def.key).await {
			Ok(value) => settings.push(SettingResponse::new(def, value)),
			Err(err) => debug!("Skipping setting {}: {}", def.key, err),
		}
	}

	let total = settings.len();
	let response = ApiResponse::with_pagination(settings, 0, total, total)
		.with_req_id(req_id.unwrap_or_default());

	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/settings/{key}
pub async fn get_setting(
	State(app): State<App>,
	auth: Auth,
	Path(key): Path<String>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<SettingResponse>>)> {
	check_can_read(&auth)?;

	let def = app.settings_registry.get(&key).ok_or(Error::NotFound)?;
	let value = app.settings.get(&key).await?;

	let response =
		ApiResponse::new(SettingResponse::new(def, value)).with_req_id(req_id.unwrap_or_default());

	Ok((StatusCode::OK, Json(response)))
}

#[derive(Deserialize)]
pub struct UpdateSettingRequest {
	pub value: SettingValue,
}

/// PUT /api/settings/{key}
pub async fn update_setting(
	State(app): State<App>,
	Auth(user): Auth,
	Path(key): Path<String>,
	OptionalRequestId(req_id): OptionalRequestId,
	Json(req): Json<UpdateSettingRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<SettingResponse>>)> {
	let def = app.settings_registry.get(&key).ok_or(Error::NotFound)?;

	let setting = app.settings.set(&key, req.value, user.role).await?;
	info!("User {} updated setting {}", user.username, key);

	let response = ApiResponse::new(SettingResponse::new(def, setting.value))
		.with_req_id(req_id.unwrap_or_default());

	Ok((StatusCode::OK, Json(response)))
}

/// DELETE /api/settings/{key} - Reset a setting to its default
pub async fn delete_setting(
	State(app): State<App>,
	Auth(user): Auth,
	Path(key): Path<String>,
) -> ClResult<StatusCode> {
	app.settings_registry.get(&key).ok_or(Error::NotFound)?;

	app.settings.delete(&key, user.role).await?;
	info!("User {} reset setting {}", user.username, key);

	Ok(StatusCode::NO_CONTENT)
}

// vim: ts=4

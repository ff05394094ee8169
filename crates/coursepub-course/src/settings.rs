//! Course settings registration

use crate::prelude::*;
use coursepub_core::settings::types::{
	PermissionLevel, SettingDefinition, SettingValue, SettingsRegistry,
};

pub const MAX_UPLOAD_SIZE: &str = "MAX_UPLOAD_SIZE";
pub const DEFAULT_MAX_UPLOAD_SIZE: i64 = 5_242_880;

pub fn register_settings(registry: &mut SettingsRegistry) -> ClResult<()> {
	registry.register(
		SettingDefinition::builder(MAX_UPLOAD_SIZE)
			.description("Maximum size of an uploaded course package in bytes")
			.default(SettingValue::Int(DEFAULT_MAX_UPLOAD_SIZE))
			.permission(PermissionLevel::Admin)
			.validator(|value| match value {
				SettingValue::Int(size) if *size > 0 => Ok(()),
				_ => Err(Error::ValidationError("MAX_UPLOAD_SIZE must be a positive integer".into())),
			})
			.build()?,
	)?;

	Ok(())
}

// vim: ts=4

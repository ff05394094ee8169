//! Settings types and definitions

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Debug};

use coursepub_types::auth_adapter::Role;

use crate::prelude::*;

/// Type alias for setting validator function
pub type SettingValidator = Box<dyn Fn(&SettingValue) -> ClResult<()> + Send + Sync>;

/// Setting permission level defines who can modify a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
	/// Cannot be changed at runtime (read-only)
	System,
	/// Only administrators
	Admin,
	/// Staff and administrators
	Staff,
}

impl PermissionLevel {
	/// Check if the given role satisfies this permission level
	pub fn check(&self, role: Role) -> bool {
		match self {
			PermissionLevel::System => false,
			PermissionLevel::Admin => role == Role::Admin,
			PermissionLevel::Staff => role.is_staff(),
		}
	}
}

/// Setting value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)] // No type tag - type inferred from SettingDefinition
pub enum SettingValue {
	Bool(bool), // Must be before Int to avoid bool -> int coercion
	Int(i64),
	String(String),
	Json(serde_json::Value),
}

impl SettingValue {
	/// Check if this value matches the type of another value
	pub fn matches_type(&self, other: &SettingValue) -> bool {
		matches!(
			(self, other),
			(SettingValue::String(_), SettingValue::String(_))
				| (SettingValue::Int(_), SettingValue::Int(_))
				| (SettingValue::Bool(_), SettingValue::Bool(_))
				| (SettingValue::Json(_), SettingValue::Json(_))
		)
	}

	/// Get the type name for error messages
	pub fn type_name(&self) -> &'static str {
		match self {
			SettingValue::String(_) => "string",
			SettingValue::Int(_) => "int",
			SettingValue::Bool(_) => "bool",
			SettingValue::Json(_) => "json",
		}
	}
}

/// Setting definition - metadata for one setting
pub struct SettingDefinition {
	/// Setting key (e.g. "MAX_UPLOAD_SIZE")
	pub key: String,

	pub description: String,

	/// If None and optional=false, the setting MUST be stored before startup
	pub default: Option<SettingValue>,

	/// Permission level required to modify this setting
	pub permission: PermissionLevel,

	/// Whether this setting may stay unconfigured without a default
	pub optional: bool,

	pub validator: Option<SettingValidator>,
}

impl Debug for SettingDefinition {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SettingDefinition")
			.field("key", &self.key)
			.field("description", &self.description)
			.field("default", &self.default)
			.field("permission", &self.permission)
			.field("optional", &self.optional)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl SettingDefinition {
	pub fn builder(key: impl Into<String>) -> SettingDefinitionBuilder {
		SettingDefinitionBuilder::new(key)
	}

	/// Type and custom validation of a candidate value
	pub fn validate(&self, value: &SettingValue) -> ClResult<()> {
		if let Some(default) = &self.default
			&& !value.matches_type(default)
		{
			return Err(Error::ValidationError(format!(
				"Type mismatch for setting '{}': expected {}, got {}",
				self.key,
				default.type_name(),
				value.type_name()
			)));
		}
		if let Some(validator) = &self.validator {
			validator(value)?;
		}
		Ok(())
	}
}

/// Builder for SettingDefinition with fluent API
pub struct SettingDefinitionBuilder {
	key: String,
	description: Option<String>,
	default: Option<SettingValue>,
	permission: PermissionLevel,
	optional: bool,
	validator: Option<SettingValidator>,
}

impl SettingDefinitionBuilder {
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			description: None,
			default: None,
			permission: PermissionLevel::Admin,
			optional: false,
			validator: None,
		}
	}

	/// Set the description (required)
	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn default(mut self, value: SettingValue) -> Self {
		self.default = Some(value);
		self
	}

	/// Set the permission level (defaults to Admin)
	pub fn permission(mut self, permission: PermissionLevel) -> Self {
		self.permission = permission;
		self
	}

	pub fn optional(mut self, optional: bool) -> Self {
		self.optional = optional;
		self
	}

	pub fn validator<F>(mut self, f: F) -> Self
	where
		F: Fn(&SettingValue) -> ClResult<()> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(f));
		self
	}

	pub fn build(self) -> ClResult<SettingDefinition> {
		let description = self
			.description
			.ok_or_else(|| Error::ConfigError("Setting description is required".into()))?;

		if let (Some(default), Some(validator)) = (&self.default, &self.validator) {
			validator(default).map_err(|e| {
				Error::ConfigError(format!("Default of '{}' fails validation: {}", self.key, e))
			})?;
		}

		Ok(SettingDefinition {
			key: self.key,
			description,
			default: self.default,
			permission: self.permission,
			optional: self.optional,
			validator: self.validator,
		})
	}
}

/// Runtime setting instance
#[derive(Debug, Clone)]
pub struct Setting {
	pub key: String,
	pub value: SettingValue,
	pub updated_at: Timestamp,
}

/// Mutable registry used during app initialization
#[derive(Default)]
pub struct SettingsRegistry {
	definitions: HashMap<String, SettingDefinition>,
}

impl SettingsRegistry {
	pub fn new() -> Self {
		Self { definitions: HashMap::new() }
	}

	pub fn register(&mut self, def: SettingDefinition) -> ClResult<()> {
		if self.definitions.contains_key(&def.key) {
			return Err(Error::ConfigError(format!("Setting '{}' is already registered", def.key)));
		}

		debug!("Registering setting: {}", def.key);
		self.definitions.insert(def.key.clone(), def);
		Ok(())
	}

	/// Freeze the registry (make it immutable)
	pub fn freeze(self) -> FrozenSettingsRegistry {
		info!("Freezing settings registry with {} definitions", self.definitions.len());
		FrozenSettingsRegistry { definitions: self.definitions }
	}

	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}

/// Immutable registry stored in AppState
pub struct FrozenSettingsRegistry {
	definitions: HashMap<String, SettingDefinition>,
}

impl FrozenSettingsRegistry {
	pub fn get(&self, key: &str) -> Option<&SettingDefinition> {
		self.definitions.get(key)
	}

	/// All definitions, sorted by key
	pub fn list(&self) -> Vec<&SettingDefinition> {
		let mut defs: Vec<_> = self.definitions.values().collect();
		defs.sort_by(|a, b| a.key.cmp(&b.key));
		defs
	}

	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}


// vim: ts=4

//! Settings subsystem: a registry of typed setting definitions, a cached
//! service resolving stored values over defaults, and HTTP handlers.
//!
//! - **Types** (`types.rs`): definitions, builder and registry
//! - **Service** (`service.rs`): resolution, validation and caching
//! - **Handler** (`handler.rs`): HTTP API endpoints
//!
//! Settings are instance-wide. Each definition carries a permission level
//! deciding which role may change it at runtime.

pub mod handler;
pub mod service;
pub mod types;

pub use types::{
	FrozenSettingsRegistry, PermissionLevel, Setting, SettingDefinition, SettingDefinitionBuilder,
	SettingValue, SettingsRegistry,
};

// vim: ts=4

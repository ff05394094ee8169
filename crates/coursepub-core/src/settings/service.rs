//! Settings service with caching, validation, and permission checks

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

use coursepub_types::auth_adapter::Role;
use coursepub_types::meta_adapter::MetaAdapter;

use super::types::{FrozenSettingsRegistry, Setting, SettingDefinition, SettingValue};
use crate::prelude::*;

const DEFAULT_CACHE_SIZE: NonZeroUsize = NonZeroUsize::MIN.saturating_add(99);

struct CacheInner {
	entries: LruCache<String, SettingValue>,
	/// Bumped on every invalidation
	generation: u64,
}

/// LRU cache for resolved settings values
pub struct SettingsCache {
	inner: parking_lot::RwLock<CacheInner>,
}

impl SettingsCache {
	pub fn new(capacity: usize) -> Self {
		let capacity = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CACHE_SIZE);
		Self {
			inner: parking_lot::RwLock::new(CacheInner {
				entries: LruCache::new(capacity),
				generation: 0,
			}),
		}
	}

	pub fn get(&self, key: &str) -> Option<SettingValue> {
		// LRU promotion needs a write lock
		self.inner.write().entries.get(key).cloned()
	}

	/// Current generation, to be taken before reading the backing store
	pub fn generation(&self) -> u64 {
		self.inner.read().generation
	}

	/// Caches a value read at `generation`, unless an invalidation happened since
	pub fn put(&self, key: String, value: SettingValue, generation: u64) -> bool {
		let mut inner = self.inner.write();
		if inner.generation != generation {
			return false;
		}
		inner.entries.put(key, value);
		true
	}

	pub fn invalidate(&self, key: &str) {
		let mut inner = self.inner.write();
		inner.entries.pop(key);
		inner.generation = inner.generation.wrapping_add(1);
	}
}

/// Settings service - main interface for accessing and managing settings
pub struct SettingsService {
	registry: Arc<FrozenSettingsRegistry>,
	cache: SettingsCache,
	meta: Arc<dyn MetaAdapter>,
}

impl SettingsService {
	pub fn new(
		registry: Arc<FrozenSettingsRegistry>,
		meta: Arc<dyn MetaAdapter>,
		cache_size: usize,
	) -> Self {
		Self { registry, cache: SettingsCache::new(cache_size), meta }
	}

	fn definition(&self, key: &str) -> ClResult<&SettingDefinition> {
		self.registry
			.get(key)
			.ok_or_else(|| Error::ValidationError(format!("Unknown setting: {}", key)))
	}

	/// Get setting value (stored value, then default)
	pub async fn get(&self, key: &str) -> ClResult<SettingValue> {
		if let Some(value) = self.cache.get(key) {
			debug!("Setting cache hit: {}", key);
			return Ok(value);
		}

		let def = self.definition(key)?;

		let generation = self.cache.generation();
		if let Some(json_value) = self.meta.read_setting(key).await? {
			match serde_json::from_value::<SettingValue>(json_value) {
				Ok(value) if def.validate(&value).is_ok() => {
					self.cache.put(key.to_string(), value.clone(), generation);
					return Ok(value);
				}
				// A stale or hand-edited row must not take the service down
				_ => warn!("Ignoring invalid stored value for setting '{}'", key),
			}
		}

		match &def.default {
			Some(default) => {
				self.cache.put(key.to_string(), default.clone(), generation);
				Ok(default.clone())
			}
			None => Err(Error::ValidationError(format!(
				"Setting '{}' has no default and must be configured",
				key
			))),
		}
	}

	/// Set setting value with validation and permission checks
	pub async fn set(&self, key: &str, value: SettingValue, role: Role) -> ClResult<Setting> {
		let def = self.definition(key)?;

		if !def.permission.check(role) {
			warn!("Permission denied for setting '{}': requires {:?}", key, def.permission);
			return Err(Error::PermissionDenied);
		}

		def.validate(&value)?;

		let json_value = serde_json::to_value(&value)?;
		self.meta.update_setting(key, Some(json_value)).await?;
		self.cache.invalidate(key);

		info!("Setting '{}' updated", key);
		Ok(Setting { key: key.to_string(), value, updated_at: Timestamp::now() })
	}

	/// Delete the stored value, falling back to the default
	pub async fn delete(&self, key: &str, role: Role) -> ClResult<()> {
		let def = self.definition(key)?;
		if !def.permission.check(role) {
			return Err(Error::PermissionDenied);
		}

		self.meta.update_setting(key, None).await?;
		self.cache.invalidate(key);

		info!("Setting '{}' reset to default", key);
		Ok(())
	}

	/// Validate that all required settings (no default and not optional) are configured
	pub async fn validate_required_settings(&self) -> ClResult<()> {
		for def in self.registry.list() {
			if def.optional || def.default.is_some() {
				continue;
			}

			if self.meta.read_setting(&def.key).await?.is_none() {
				return Err(Error::ConfigError(format!(
					"Required setting '{}' is not configured",
					def.key
				)));
			}
		}
		Ok(())
	}

	// Typed getters
	//***************
	pub async fn get_string(&self, key: &str) -> ClResult<String> {
		match self.get(key).await? {
			SettingValue::String(s) => Ok(s),
			v => Err(Error::ValidationError(format!(
				"Setting '{}' is not a string, got {}",
				key,
				v.type_name()
			))),
		}
	}

	pub async fn get_int(&self, key: &str) -> ClResult<i64> {
		match self.get(key).await? {
			SettingValue::Int(i) => Ok(i),
			v => Err(Error::ValidationError(format!(
				"Setting '{}' is not an integer, got {}",
				key,
				v.type_name()
			))),
		}
	}

	pub async fn get_bool(&self, key: &str) -> ClResult<bool> {
		match self.get(key).await? {
			SettingValue::Bool(b) => Ok(b),
			v => Err(Error::ValidationError(format!(
				"Setting '{}' is not a boolean, got {}",
				key,
				v.type_name()
			))),
		}
	}

	pub fn registry(&self) -> &Arc<FrozenSettingsRegistry> {
		&self.registry
	}
}


// vim: ts=4

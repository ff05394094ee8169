//! Settings key-value store
//!
//! Values are stored as JSON text.

use std::collections::HashMap;

use sqlx::{Row, SqlitePool};

use coursepub_types::prelude::*;

use crate::utils::inspect;

/// List all settings, optionally only those starting with `prefix`
pub(crate) async fn list(
	db: &SqlitePool,
	prefix: Option<&str>,
) -> ClResult<HashMap<String, serde_json::Value>> {
	let res = if let Some(prefix) = prefix {
		sqlx::query("SELECT name, value FROM settings WHERE name LIKE ? || '%'")
			.bind(prefix)
			.fetch_all(db)
			.await
	} else {
		sqlx::query("SELECT name, value FROM settings").fetch_all(db).await
	};
	let rows = res.inspect_err(inspect).map_err(|_| Error::DbError)?;

	let mut settings = HashMap::new();
	for row in rows {
		let name: String = row.get("name");
		let value: Option<String> = row.get("value");
		settings.insert(
			name,
			value
				.and_then(|v| serde_json::from_str(&v).ok())
				.unwrap_or(serde_json::Value::Null),
		);
	}

	Ok(settings)
}

/// Read a single setting by name
pub(crate) async fn read(db: &SqlitePool, name: &str) -> ClResult<Option<serde_json::Value>> {
	let row = sqlx::query("SELECT value FROM settings WHERE name = ?")
		.bind(name)
		.fetch_optional(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(row.and_then(|r| {
		let value: Option<String> = r.get("value");
		value.and_then(|v| serde_json::from_str(&v).ok())
	}))
}

/// Update or create a setting, `None` deletes it
pub(crate) async fn update(
	db: &SqlitePool,
	name: &str,
	value: Option<serde_json::Value>,
) -> ClResult<()> {
	if let Some(val) = value {
		sqlx::query(
			"INSERT INTO settings (name, value) VALUES (?1, ?2)
			ON CONFLICT(name) DO UPDATE SET value = ?2, updated_at = unixepoch()",
		)
		.bind(name)
		.bind(val.to_string())
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	} else {
		sqlx::query("DELETE FROM settings WHERE name = ?")
			.bind(name)
			.execute(db)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
	}

	Ok(())
}

// vim: ts=4

//! Database schema initialization

use sqlx::{Sqlite, SqlitePool, Transaction};

async fn get_db_version(tx: &mut Transaction<'_, Sqlite>) -> i64 {
	sqlx::query_scalar::<_, String>("SELECT value FROM vars WHERE key = 'db_version'")
		.fetch_optional(&mut **tx)
		.await
		.ok()
		.flatten()
		.and_then(|v| v.parse().ok())
		.unwrap_or(0)
}

async fn set_db_version(tx: &mut Transaction<'_, Sqlite>, version: i64) -> Result<(), sqlx::Error> {
	sqlx::query("INSERT OR REPLACE INTO vars (key, value) VALUES ('db_version', ?)")
		.bind(version.to_string())
		.execute(&mut **tx)
		.await?;
	Ok(())
}

const CURRENT_DB_VERSION: i64 = 1;

pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS vars (
		key text NOT NULL,
		value text NOT NULL,
		created_at INTEGER DEFAULT (unixepoch()),
		updated_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(key)
	)",
	)
	.execute(&mut *tx)
	.await?;

	let version = get_db_version(&mut tx).await;

	// Courses
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS courses (
			course_id integer NOT NULL,
			shortname text NOT NULL,
			title text NOT NULL,
			description text,
			version integer NOT NULL,
			owner_id integer NOT NULL,
			owner text NOT NULL,
			is_draft integer NOT NULL DEFAULT 0,
			blob_id text NOT NULL,
			file_size integer NOT NULL DEFAULT 0,
			created_at INTEGER DEFAULT (unixepoch()),
			updated_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(course_id)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_courses_shortname ON courses(shortname)")
		.execute(&mut *tx)
		.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_courses_owner ON courses(owner_id)")
		.execute(&mut *tx)
		.await?;

	// Tags
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS tags (
			tag_id integer NOT NULL,
			name text NOT NULL COLLATE NOCASE,
			created_by integer NOT NULL,
			created_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(tag_id)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_tags_name ON tags(name)")
		.execute(&mut *tx)
		.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS course_tags (
			course_id integer NOT NULL,
			tag_id integer NOT NULL,
			PRIMARY KEY(course_id, tag_id)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_course_tags_tag ON course_tags(tag_id)")
		.execute(&mut *tx)
		.await?;

	// Settings
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS settings (
			name text NOT NULL,
			value text,
			created_at INTEGER DEFAULT (unixepoch()),
			updated_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(name)
		)",
	)
	.execute(&mut *tx)
	.await?;

	if version < CURRENT_DB_VERSION {
		set_db_version(&mut tx, CURRENT_DB_VERSION).await?;
	}

	tx.commit().await?;
	Ok(())
}

// vim: ts=4

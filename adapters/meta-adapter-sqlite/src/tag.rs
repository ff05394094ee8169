//! Course tags
//!
//! Tag names are unique case-insensitively (`COLLATE NOCASE`). The first
//! spelling used for a tag is the one kept.

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use coursepub_types::meta_adapter::Tag;
use coursepub_types::prelude::*;

use crate::utils::{collect_res, inspect};

fn tag_from_row(row: &SqliteRow, with_count: bool) -> Result<Tag, sqlx::Error> {
	Ok(Tag {
		tag_id: row.try_get("tag_id")?,
		name: row.try_get::<&str, _>("name")?.into(),
		created_by: UserId(row.try_get("created_by")?),
		course_count: if with_count {
			Some(row.try_get::<i64, _>("course_count")? as u32)
		} else {
			None
		},
	})
}

/// Replaces the tag set of a course in one transaction
pub(crate) async fn set_course_tags(
	db: &SqlitePool,
	course_id: CourseId,
	tags: &[&str],
	created_by: UserId,
) -> ClResult<Vec<Tag>> {
	let mut tx = db.begin().await.inspect_err(inspect).map_err(|_| Error::DbError)?;

	sqlx::query("DELETE FROM course_tags WHERE course_id = ?1")
		.bind(course_id.0)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	let mut result = Vec::with_capacity(tags.len());
	for name in tags.iter().map(|tag| tag.trim()).filter(|tag| !tag.is_empty()) {
		sqlx::query(
			"INSERT INTO tags (name, created_by) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
		)
		.bind(name)
		.bind(created_by.0)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

		let row = sqlx::query("SELECT tag_id, name, created_by FROM tags WHERE name = ?1")
			.bind(name)
			.fetch_one(&mut *tx)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		let tag = tag_from_row(&row, false).inspect_err(inspect).map_err(|_| Error::DbError)?;

		sqlx::query("INSERT OR IGNORE INTO course_tags (course_id, tag_id) VALUES (?1, ?2)")
			.bind(course_id.0)
			.bind(tag.tag_id)
			.execute(&mut *tx)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;

		if !result.iter().any(|t: &Tag| t.tag_id == tag.tag_id) {
			result.push(tag);
		}
	}

	tx.commit().await.inspect_err(inspect).map_err(|_| Error::DbError)?;
	debug!("Course {} tagged with {} tags", course_id, result.len());

	Ok(result)
}

pub(crate) async fn list_course_tags(db: &SqlitePool, course_id: CourseId) -> ClResult<Vec<Tag>> {
	let rows = sqlx::query(
		"SELECT t.tag_id, t.name, t.created_by FROM course_tags ct
		JOIN tags t ON t.tag_id = ct.tag_id
		WHERE ct.course_id = ?1 ORDER BY t.name",
	)
	.bind(course_id.0)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	collect_res(rows.iter().map(|row| tag_from_row(row, false)))
}

/// All tags with the number of courses using them
pub(crate) async fn list(db: &SqlitePool) -> ClResult<Vec<Tag>> {
	let rows = sqlx::query(
		"SELECT t.tag_id, t.name, t.created_by, count(ct.course_id) AS course_count
		FROM tags t LEFT JOIN course_tags ct ON ct.tag_id = t.tag_id
		GROUP BY t.tag_id ORDER BY t.name",
	)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	collect_res(rows.iter().map(|row| tag_from_row(row, true)))
}

// vim: ts=4

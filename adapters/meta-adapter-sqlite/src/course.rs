//! Course records
//!
//! Tag names are folded into each row with `group_concat`, so a course and
//! its tags come back from a single query.

use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool, sqlite::SqliteRow};

use coursepub_types::meta_adapter::{Course, CreateCourse, ListCourseOptions, UpdateCourse};
use coursepub_types::prelude::*;

use crate::utils::{check_affected, collect_res, inspect, map_res, map_write_err};

const DEFAULT_LIMIT: u32 = 100;

const COURSE_SELECT: &str = "SELECT c.course_id, c.shortname, c.title, c.description, c.version,
	c.owner_id, c.owner, c.is_draft, c.blob_id, c.file_size, c.created_at, c.updated_at,
	(SELECT group_concat(t.name, ',') FROM course_tags ct JOIN tags t ON t.tag_id = ct.tag_id
		WHERE ct.course_id = c.course_id) AS tags
	FROM courses c";

fn course_from_row(row: &SqliteRow) -> Result<Course, sqlx::Error> {
	let tags: Option<&str> = row.try_get("tags")?;
	let mut tags: Vec<Box<str>> = tags
		.unwrap_or_default()
		.split(',')
		.filter(|tag| !tag.is_empty())
		.map(Into::into)
		.collect();
	tags.sort_by_key(|tag| tag.to_lowercase());

	Ok(Course {
		course_id: CourseId(row.try_get("course_id")?),
		shortname: row.try_get::<&str, _>("shortname")?.into(),
		title: row.try_get::<&str, _>("title")?.into(),
		description: row.try_get::<Option<&str>, _>("description")?.map(Into::into),
		version: row.try_get("version")?,
		owner_id: UserId(row.try_get("owner_id")?),
		owner: row.try_get::<&str, _>("owner")?.into(),
		is_draft: row.try_get("is_draft")?,
		blob_id: row.try_get::<&str, _>("blob_id")?.into(),
		file_size: row.try_get::<i64, _>("file_size")? as u64,
		tags,
		created_at: Timestamp(row.try_get("created_at")?),
		updated_at: Timestamp(row.try_get("updated_at")?),
	})
}

pub(crate) async fn read(db: &SqlitePool, shortname: &str) -> ClResult<Course> {
	let res = sqlx::query(&format!("{} WHERE c.shortname = ?1", COURSE_SELECT))
		.bind(shortname)
		.fetch_one(db)
		.await;

	map_res(res, course_from_row)
}

pub(crate) async fn read_by_id(db: &SqlitePool, course_id: CourseId) -> ClResult<Course> {
	let res = sqlx::query(&format!("{} WHERE c.course_id = ?1", COURSE_SELECT))
		.bind(course_id.0)
		.fetch_one(db)
		.await;

	map_res(res, course_from_row)
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, opts: &ListCourseOptions) {
	query.push(" WHERE 1=1");

	if let Some(tag) = opts.tag.as_deref().map(str::trim).filter(|tag| !tag.is_empty()) {
		query
			.push(
				" AND c.course_id IN (SELECT ct.course_id FROM course_tags ct
				JOIN tags t ON t.tag_id = ct.tag_id WHERE t.name = ",
			)
			.push_bind(tag.to_string())
			.push(")");
	}
	if let Some(q) = opts.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
		let pattern = format!("%{}%", q);
		query
			.push(" AND (c.title LIKE ")
			.push_bind(pattern.clone())
			.push(" OR c.shortname LIKE ")
			.push_bind(pattern)
			.push(")");
	}
	if let Some(owner_id) = opts.owner_id {
		query.push(" AND c.owner_id = ").push_bind(owner_id);
	}
	if !opts.include_drafts.unwrap_or(false) {
		match opts.drafts_of {
			Some(owner_id) => {
				query.push(" AND (c.is_draft = 0 OR c.owner_id = ").push_bind(owner_id).push(")");
			}
			None => {
				query.push(" AND c.is_draft = 0");
			}
		}
	}
}

/// Newest first
pub(crate) async fn list(db: &SqlitePool, opts: &ListCourseOptions) -> ClResult<Vec<Course>> {
	let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(COURSE_SELECT);
	push_filters(&mut query, opts);

	query.push(" ORDER BY c.updated_at DESC, c.course_id DESC LIMIT ");
	query.push_bind(i64::from(opts.limit.unwrap_or(DEFAULT_LIMIT)));
	query.push(" OFFSET ").push_bind(i64::from(opts.offset.unwrap_or(0)));

	let rows = query
		.build()
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	collect_res(rows.iter().map(course_from_row))
}

/// Number of courses matching the filters, ignoring limit and offset
pub(crate) async fn count(db: &SqlitePool, opts: &ListCourseOptions) -> ClResult<u64> {
	let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT count(*) FROM courses c");
	push_filters(&mut query, opts);

	let count: i64 = query
		.build_query_scalar()
		.fetch_one(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(count as u64)
}

pub(crate) async fn create(db: &SqlitePool, course: CreateCourse<'_>) -> ClResult<CourseId> {
	let course_id: i64 = sqlx::query_scalar(
		"INSERT INTO courses
			(shortname, title, description, version, owner_id, owner, is_draft, blob_id, file_size)
		VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
		RETURNING course_id",
	)
	.bind(course.shortname)
	.bind(course.title)
	.bind(course.description)
	.bind(course.version)
	.bind(course.owner_id.0)
	.bind(course.owner)
	.bind(course.is_draft)
	.bind(course.blob_id)
	.bind(course.file_size as i64)
	.fetch_one(db)
	.await
	.map_err(map_write_err)?;

	info!("Created course {} ({}) for {}", course.shortname, course_id, course.owner);
	Ok(CourseId(course_id))
}

/// Replaces the package of a course.
///
/// The write only lands while the stored blob is still `replaces_blob_id` and
/// the stored version is not newer, so concurrent publishes cannot lower the
/// version or lose track of a replaced blob.
pub(crate) async fn update(
	db: &SqlitePool,
	course_id: CourseId,
	course: UpdateCourse<'_>,
) -> ClResult<()> {
	let res = sqlx::query(
		"UPDATE courses SET title = ?2, description = ?3, version = ?4, is_draft = ?5,
			blob_id = ?6, file_size = ?7, updated_at = unixepoch()
		WHERE course_id = ?1 AND blob_id = ?8 AND version <= ?4",
	)
	.bind(course_id.0)
	.bind(course.title)
	.bind(course.description)
	.bind(course.version)
	.bind(course.is_draft)
	.bind(course.blob_id)
	.bind(course.file_size as i64)
	.bind(course.replaces_blob_id)
	.execute(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	if res.rows_affected() > 0 {
		return Ok(());
	}

	let stored: Option<i64> =
		sqlx::query_scalar("SELECT version FROM courses WHERE course_id = ?1")
			.bind(course_id.0)
			.fetch_optional(db)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;

	match stored {
		None => Err(Error::NotFound),
		Some(version) if version > course.version => Err(Error::ValidationError(format!(
			"A newer version of this course already exists (version {})",
			version
		))),
		Some(_) => {
			debug!("Course {} changed since it was read", course_id);
			Err(Error::Conflict(format!("Course {} was modified concurrently", course_id)))
		}
	}
}

pub(crate) async fn update_owner(
	db: &SqlitePool,
	course_id: CourseId,
	owner_id: UserId,
	owner: &str,
) -> ClResult<()> {
	let res = sqlx::query(
		"UPDATE courses SET owner_id = ?2, owner = ?3, updated_at = unixepoch()
		WHERE course_id = ?1",
	)
	.bind(course_id.0)
	.bind(owner_id.0)
	.bind(owner)
	.execute(db)
	.await;

	check_affected(res)?;
	info!("Course {} now owned by {} ({})", course_id, owner, owner_id);
	Ok(())
}

// vim: ts=4

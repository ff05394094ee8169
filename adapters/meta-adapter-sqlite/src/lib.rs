//! SQLite-backed metadata adapter for coursepub.
//!
//! Stores courses, their tags and the runtime settings rows in a single
//! `meta.db` file.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

mod course;
mod schema;
mod setting;
mod tag;
mod utils;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::{collections::HashMap, fmt::Debug, path::Path};

use coursepub_types::{
	meta_adapter::{Course, CreateCourse, ListCourseOptions, MetaAdapter, Tag, UpdateCourse},
	prelude::*,
};

use crate::schema::init_db;

const DB_FILE: &str = "meta.db";

#[derive(Debug)]
pub struct MetaAdapterSqlite {
	db: SqlitePool,
}

impl MetaAdapterSqlite {
	/// Opens (or creates) `meta.db` inside `path`
	pub async fn new(path: impl AsRef<Path>) -> ClResult<Self> {
		tokio::fs::create_dir_all(path.as_ref()).await?;
		let db_path = path.as_ref().join(DB_FILE);
		let opts = sqlite::SqliteConnectOptions::new()
			.filename(&db_path)
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		init_db(&db)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;
		debug!("Meta database at {}", db_path.display());

		Ok(Self { db })
	}
}

#[async_trait]
impl MetaAdapter for MetaAdapterSqlite {
	// Courses
	//*********
	async fn read_course(&self, shortname: &str) -> ClResult<Course> {
		course::read(&self.db, shortname).await
	}

	async fn read_course_by_id(&self, course_id: CourseId) -> ClResult<Course> {
		course::read_by_id(&self.db, course_id).await
	}

	async fn list_courses(&self, opts: &ListCourseOptions) -> ClResult<Vec<Course>> {
		course::list(&self.db, opts).await
	}

	async fn count_courses(&self, opts: &ListCourseOptions) -> ClResult<u64> {
		course::count(&self.db, opts).await
	}

	async fn create_course(&self, data: CreateCourse<'_>) -> ClResult<CourseId> {
		course::create(&self.db, data).await
	}

	async fn update_course(&self, course_id: CourseId, data: UpdateCourse<'_>) -> ClResult<()> {
		course::update(&self.db, course_id, data).await
	}

	async fn update_course_owner(
		&self,
		course_id: CourseId,
		owner_id: UserId,
		owner: &str,
	) -> ClResult<()> {
		course::update_owner(&self.db, course_id, owner_id, owner).await
	}

	// Tags
	//******
	async fn set_course_tags(
		&self,
		course_id: CourseId,
		tags: &[&str],
		created_by: UserId,
	) -> ClResult<Vec<Tag>> {
		tag::set_course_tags(&self.db, course_id, tags, created_by).await
	}

	async fn list_course_tags(&self, course_id: CourseId) -> ClResult<Vec<Tag>> {
		tag::list_course_tags(&self.db, course_id).await
	}

	async fn list_tags(&self) -> ClResult<Vec<Tag>> {
		tag::list(&self.db).await
	}

	// Settings
	//**********
	async fn read_setting(&self, name: &str) -> ClResult<Option<serde_json::Value>> {
		setting::read(&self.db, name).await
	}

	async fn update_setting(&self, name: &str, value: Option<serde_json::Value>) -> ClResult<()> {
		setting::update(&self.db, name, value).await
	}

	async fn list_settings(
		&self,
		prefix: Option<&str>,
	) -> ClResult<HashMap<String, serde_json::Value>> {
		setting::list(&self.db, prefix).await
	}
}

// vim: ts=4

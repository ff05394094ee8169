//! Adapter that manages course metadata, tags and runtime settings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::{collections::HashMap, fmt::Debug};

use crate::{prelude::*, types::serialize_timestamp_iso};

/// A published course
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
	pub course_id: CourseId,
	pub shortname: Box<str>,
	pub title: Box<str>,
	pub description: Option<Box<str>>,
	pub version: i64,
	pub owner_id: UserId,
	pub owner: Box<str>,
	pub is_draft: bool,
	pub blob_id: Box<str>,
	pub file_size: u64,
	pub tags: Vec<Box<str>>,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub created_at: Timestamp,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub updated_at: Timestamp,
}

#[derive(Debug)]
pub struct CreateCourse<'a> {
	pub shortname: &'a str,
	pub title: &'a str,
	pub description: Option<&'a str>,
	pub version: i64,
	pub owner_id: UserId,
	/// Owner username, kept next to the id for listings
	pub owner: &'a str,
	pub is_draft: bool,
	pub blob_id: &'a str,
	pub file_size: u64,
}

/// Fields replaced when a package is published over an existing course.
///
/// The owner is deliberately absent: publishing never changes ownership.
#[derive(Debug)]
pub struct UpdateCourse<'a> {
	pub title: &'a str,
	pub description: Option<&'a str>,
	pub version: i64,
	pub is_draft: bool,
	pub blob_id: &'a str,
	pub file_size: u64,
	/// Blob the caller read before deciding to update
	pub replaces_blob_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListCourseOptions {
	pub tag: Option<String>,
	pub q: Option<String>,
	pub owner_id: Option<i64>,
	/// All drafts
	pub include_drafts: Option<bool>,
	/// Drafts owned by this user, on top of published courses
	pub drafts_of: Option<i64>,
	pub limit: Option<u32>,
	pub offset: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
	pub tag_id: i64,
	pub name: Box<str>,
	pub created_by: UserId,
	pub course_count: Option<u32>,
}

#[async_trait]
pub trait MetaAdapter: Debug + Send + Sync {
	// Courses
	//*********
	async fn read_course(&self, shortname: &str) -> ClResult<Course>;
	async fn read_course_by_id(&self, course_id: CourseId) -> ClResult<Course>;
	async fn list_courses(&self, opts: &ListCourseOptions) -> ClResult<Vec<Course>>;
	async fn count_courses(&self, opts: &ListCourseOptions) -> ClResult<u64>;

	/// Creates a course, fails with `Conflict` if the shortname is taken
	async fn create_course(&self, course: CreateCourse<'_>) -> ClResult<CourseId>;

	/// Replaces the package of a course.
	///
	/// Fails with `ValidationError` if a newer version is stored and with
	/// `Conflict` if the course changed since `replaces_blob_id` was read.
	async fn update_course(&self, course_id: CourseId, course: UpdateCourse<'_>) -> ClResult<()>;
	async fn update_course_owner(
		&self,
		course_id: CourseId,
		owner_id: UserId,
		owner: &str,
	) -> ClResult<()>;

	// Tags
	//******
	/// Replaces the tag set of a course.
	///
	/// Tags are matched case-insensitively and created with `created_by` when missing.
	async fn set_course_tags(
		&self,
		course_id: CourseId,
		tags: &[&str],
		created_by: UserId,
	) -> ClResult<Vec<Tag>>;
	async fn list_course_tags(&self, course_id: CourseId) -> ClResult<Vec<Tag>>;
	async fn list_tags(&self) -> ClResult<Vec<Tag>>;

	// Settings
	//**********
	async fn read_setting(&self, name: &str) -> ClResult<Option<serde_json::Value>>;
	/// Stores a setting value, `None` deletes it
	async fn update_setting(&self, name: &str, value: Option<serde_json::Value>) -> ClResult<()>;
	async fn list_settings(
		&self,
		prefix: Option<&str>,
	) -> ClResult<HashMap<String, serde_json::Value>>;
}

// vim: ts=4

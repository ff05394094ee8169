//! Course listing, details and package download

use axum::{
	Json,
	body::Body,
	extract::{Path, Query, State},
	http::{StatusCode, header},
	response::Response,
};
use serde::Deserialize;

use coursepub_core::extract::{OptionalAuth, OptionalRequestId};
use coursepub_types::meta_adapter::{Course, ListCourseOptions, Tag};
use coursepub_types::types::ApiResponse;

use crate::perm::can_view_course;
use crate::prelude::*;

const DEFAULT_LIMIT: u32 = 30;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ListCourseQuery {
	pub tag: Option<String>,
	pub q: Option<String>,
	pub limit: Option<u32>,
	pub offset: Option<u32>,
}

/// Loads a course and hides drafts from users who may not see them
async fn read_visible_course(
	app: &App,
	auth: Option<&coursepub_types::auth_adapter::AuthUser>,
	shortname: &str,
) -> ClResult<Course> {
	let course = app.meta_adapter.read_course(shortname).await?;
	if can_view_course(auth, &course) { Ok(course) } else { Err(Error::NotFound) }
}

/// GET /api/course
pub async fn list_courses(
	State(app): State<App>,
	OptionalAuth(auth): OptionalAuth,
	Query(query): Query<ListCourseQuery>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<Course>>>)> {
	let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
	let offset = query.offset.unwrap_or(0);
	// Same rule as `can_view_course`, applied in the query so pages stay full
	let (include_drafts, drafts_of) = match &auth {
		Some(user) if user.role.is_staff() => (true, None),
		Some(user) => (false, Some(user.user_id.0)),
		None => (false, None),
	};
	let opts = ListCourseOptions {
		tag: query.tag,
		q: query.q,
		include_drafts: Some(include_drafts),
		drafts_of,
		limit: Some(limit),
		offset: Some(offset),
		..Default::default()
	};

	let courses = app.meta_adapter.list_courses(&opts).await?;
	let total = app.meta_adapter.count_courses(&opts).await?;

	let response =
		ApiResponse::with_pagination(courses, offset as usize, limit as usize, total as usize)
			.with_req_id(req_id.unwrap_or_default());

	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/course/{shortname}
pub async fn get_course(
	State(app): State<App>,
	OptionalAuth(auth): OptionalAuth,
	Path(shortname): Path<String>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Course>>)> {
	let course = read_visible_course(&app, auth.as_ref(), &shortname).await?;

	let response = ApiResponse::new(course).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/course/{shortname}/download
pub async fn download_course(
	State(app): State<App>,
	OptionalAuth(auth): OptionalAuth,
	Path(shortname): Path<String>,
) -> ClResult<Response<Body>> {
	let course = read_visible_course(&app, auth.as_ref(), &shortname).await?;
	let stream = app.blob_adapter.read_blob_stream(&course.blob_id).await?;
	info!("Download {} v{}", course.shortname, course.version);

	let response = Response::builder()
		.header(header::CONTENT_TYPE, "application/zip")
		.header(header::CONTENT_LENGTH, course.file_size)
		.header(
			header::CONTENT_DISPOSITION,
			format!("attachment; filename=\"{}_{}.zip\"", course.shortname, course.version),
		)
		// Package ids are content addressed, but the course URL is not
		.header(header::CACHE_CONTROL, "no-cache")
		.body(Body::from_stream(stream))?;

	Ok(response)
}

/// GET /api/tag
pub async fn list_tags(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<Tag>>>)> {
	let tags = app.meta_adapter.list_tags().await?;

	let response = ApiResponse::new(tags).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

// vim: ts=4

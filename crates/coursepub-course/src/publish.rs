//! Course publishing endpoint.
//!
//! `POST /api/publish/` takes a multipart form with credentials, tags, the
//! draft flag and a course package. Checks run in a fixed order: form
//! validation, authentication, role, package structure, ownership, version.

use axum::{
	Json,
	extract::{Multipart, State, multipart::MultipartError, multipart::MultipartRejection},
	http::StatusCode,
};

use coursepub_core::extract::OptionalRequestId;
use coursepub_types::auth_adapter::AuthUser;
use coursepub_types::hasher;
use coursepub_types::meta_adapter::{Course, CreateCourse, UpdateCourse};
use coursepub_types::types::ApiResponse;
use coursepub_types::utils::{parse_bool_flag, split_tags};

use crate::package::CoursePackage;
use crate::perm;
use crate::prelude::*;
use crate::settings::{DEFAULT_MAX_UPLOAD_SIZE, MAX_UPLOAD_SIZE};

/// Name of the multipart field carrying the package
pub const COURSE_FILE_FIELD: &str = "course_file";

/// Declared content types accepted for the package.
/// A missing or generic type is left to structural validation.
const ZIP_CONTENT_TYPES: [&str; 2] = ["application/zip", "application/x-zip-compressed"];
const GENERIC_CONTENT_TYPE: &str = "application/octet-stream";

const BYTES_PER_MB: f64 = 1_048_576.0;

struct UploadedFile {
	content_type: Option<String>,
	size: u64,
	/// Empty when `size` exceeds the limit
	data: Vec<u8>,
}

#[derive(Default)]
struct PublishForm {
	username: Option<String>,
	password: Option<String>,
	tags: Option<String>,
	is_draft: Option<String>,
	file: Option<UploadedFile>,
}

/// A fully validated publish request
struct PublishRequest {
	username: String,
	password: String,
	tags: Vec<String>,
	is_draft: bool,
	data: Vec<u8>,
}

fn multipart_error(err: MultipartError) -> Error {
	warn!("multipart: {}", err);
	Error::ValidationError(format!("invalid form data: {}", err.body_text()))
}

fn is_zip_content_type(content_type: &str) -> bool {
	let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
	essence == GENERIC_CONTENT_TYPE || ZIP_CONTENT_TYPES.contains(&essence.as_str())
}

impl PublishForm {
	/// Reads every field. The package is buffered up to `max_size` bytes,
	/// larger uploads are drained and only counted.
	async fn read(multipart: &mut Multipart, max_size: u64) -> ClResult<Self> {
		let mut form = PublishForm::default();

		while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
			let name = field.name().unwrap_or_default().to_string();
			let slot = match name.as_str() {
				COURSE_FILE_FIELD => {
					let content_type = field.content_type().map(str::to_string);
					let mut size: u64 = 0;
					let mut data = Vec::new();
					while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
						size += chunk.len() as u64;
						if size <= max_size {
							data.extend_from_slice(&chunk);
						} else if !data.is_empty() {
							data = Vec::new();
						}
					}
					form.file = Some(UploadedFile { content_type, size, data });
					continue;
				}
				"username" => &mut form.username,
				"password" => &mut form.password,
				"tags" => &mut form.tags,
				"is_draft" => &mut form.is_draft,
				_ => {
					debug!("Ignoring form field '{}'", name);
					continue;
				}
			};
			*slot = Some(field.text().await.map_err(multipart_error)?);
		}

		Ok(form)
	}

	/// Collects every form error before failing
	fn validate(self, max_size: u64) -> ClResult<PublishRequest> {
		let mut errors: Vec<String> = Vec::new();

		let mut required = |value: Option<String>, name: &str| match value {
			Some(v) if !v.trim().is_empty() => Some(v),
			_ => {
				errors.push(format!("{}: This field is required.", name));
				None
			}
		};
		let username = required(self.username, "username");
		let password = required(self.password, "password");
		let is_draft = required(self.is_draft, "is_draft");
		let tags = required(self.tags, "tags").map(|tags| {
			split_tags(&tags).into_iter().map(str::to_string).collect::<Vec<_>>()
		});
		if tags.as_ref().is_some_and(Vec::is_empty) {
			errors.push("tags: Please enter at least one tag.".into());
		}

		let data = match self.file {
			None => {
				errors.push(format!("{}: This field is required.", COURSE_FILE_FIELD));
				None
			}
			Some(file) => {
				if file.size > max_size {
					errors.push(format!(
						"{}: Your file is larger than the maximum allowed ({:.2} MB). \
						 You may want to check your course for large includes, such as images etc.",
						COURSE_FILE_FIELD,
						max_size as f64 / BYTES_PER_MB
					));
				} else if file.size == 0 {
					errors.push(format!("{}: The submitted file is empty.", COURSE_FILE_FIELD));
				}
				if let Some(content_type) = &file.content_type
					&& !is_zip_content_type(content_type)
				{
					errors.push(format!(
						"{}: You may only upload a zip file (got {})",
						COURSE_FILE_FIELD, content_type
					));
				}
				Some(file.data)
			}
		};

		match (username, password, tags, is_draft, data) {
			(Some(username), Some(password), Some(tags), Some(is_draft), Some(data))
				if errors.is_empty() =>
			{
				Ok(PublishRequest { username, password, tags, is_draft: parse_bool_flag(&is_draft), data })
			}
			_ => {
				warn!("Rejected publish form: {}", errors.join("; "));
				Err(Error::ValidationError(errors.join(" ")))
			}
		}
	}
}

/// Reads the current upload limit. A broken setting never disables the limit.
async fn max_upload_size(app: &App) -> u64 {
	match app.settings.get_int(MAX_UPLOAD_SIZE).await {
		Ok(size) if size > 0 => size as u64,
		Ok(_) => DEFAULT_MAX_UPLOAD_SIZE as u64,
		Err(err) => {
			warn!("Cannot read {}: {}", MAX_UPLOAD_SIZE, err);
			DEFAULT_MAX_UPLOAD_SIZE as u64
		}
	}
}

/// Attempts for a course write racing with another publish of the same course
const MAX_STORE_ATTEMPTS: u32 = 3;

async fn read_existing(app: &App, shortname: &str) -> ClResult<Option<Course>> {
	match app.meta_adapter.read_course(shortname).await {
		Ok(course) => Ok(Some(course)),
		Err(Error::NotFound) => Ok(None),
		Err(err) => Err(err),
	}
}

/// Ownership, then version: an equal version may be republished, an older one not
fn check_existing(
	user: &AuthUser,
	package: &CoursePackage,
	course: Option<&Course>,
) -> ClResult<()> {
	let Some(course) = course else {
		return Ok(());
	};
	perm::check_can_overwrite(user, course)?;
	if course.version > package.version {
		warn!(
			"Rejected {} v{}: stored version is {}",
			package.shortname, package.version, course.version
		);
		return Err(Error::ValidationError(format!(
			"A newer version of this course already exists (version {})",
			course.version
		)));
	}
	Ok(())
}

/// Creates or updates the course row, returning its id and the replaced blob.
///
/// A `Conflict` means another publish changed the course in between: the
/// course is read again and the checks are repeated.
async fn store_course(
	app: &App,
	user: &AuthUser,
	package: &CoursePackage,
	is_draft: bool,
	blob_id: &str,
	file_size: u64,
	mut existing: Option<Course>,
) -> ClResult<(CourseId, Option<Box<str>>)> {
	let mut attempt = 1;
	loop {
		let res = match &existing {
			Some(course) => app
				.meta_adapter
				.update_course(
					course.course_id,
					UpdateCourse {
						title: &package.title,
						description: package.description.as_deref(),
						version: package.version,
						is_draft,
						blob_id,
						file_size,
						replaces_blob_id: &course.blob_id,
					},
				)
				.await
				.map(|()| (course.course_id, Some(course.blob_id.clone()))),
			None => app
				.meta_adapter
				.create_course(CreateCourse {
					shortname: &package.shortname,
					title: &package.title,
					description: package.description.as_deref(),
					version: package.version,
					owner_id: user.user_id,
					owner: &user.username,
					is_draft,
					blob_id,
					file_size,
				})
				.await
				.map(|course_id| (course_id, None)),
		};

		match res {
			Err(Error::Conflict(msg)) if attempt < MAX_STORE_ATTEMPTS => {
				debug!("Course {} changed during publish, retrying: {}", package.shortname, msg);
				attempt += 1;
				existing = read_existing(app, &package.shortname).await?;
				check_existing(user, package, existing.as_ref())?;
			}
			res => return res,
		}
	}
}

/// Removes a freshly stored package that no course ended up referencing
async fn discard_blob(app: &App, shortname: &str, blob_id: &str) {
	match app.meta_adapter.read_course(shortname).await {
		// Identical bytes already back the stored course
		Ok(course) if *course.blob_id == *blob_id => return,
		Ok(_) | Err(Error::NotFound) => {}
		Err(err) => {
			warn!("Keeping package {} after failed publish: {}", blob_id, err);
			return;
		}
	}
	match app.blob_adapter.delete_blob(blob_id).await {
		Ok(()) => debug!("Discarded package {} of failed publish", blob_id),
		Err(err) => warn!("Cannot delete package {} of failed publish: {}", blob_id, err),
	}
}

/// POST /api/publish/
pub async fn post_publish(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
	multipart: Result<Multipart, MultipartRejection>,
) -> ClResult<(StatusCode, Json<ApiResponse<Course>>)> {
	let mut multipart = multipart.map_err(|err| {
		warn!("publish: {}", err);
		Error::ValidationError(format!("expected a multipart form: {}", err.body_text()))
	})?;

	// 1. Form
	let max_size = max_upload_size(&app).await;
	let req = PublishForm::read(&mut multipart, max_size).await?.validate(max_size)?;

	// 2. Credentials and role
	let user = app.auth_adapter.check_user_password(&req.username, &req.password).await?;
	perm::check_can_publish(&user)?;

	// 3. Package structure
	let (package, blob_id, data) = app
		.worker
		.try_run(move || {
			let package = CoursePackage::from_zip(&req.data)?;
			let blob_id = hasher::hash("p", &req.data);
			Ok((package, blob_id, req.data))
		})
		.await?;
	info!(
		"Package {} v{} by {}: {} sections, {} activities, {} media files",
		package.shortname,
		package.version,
		user.username,
		package.sections,
		package.activities,
		package.media_files
	);

	// 4. Ownership and version
	let existing = read_existing(&app, &package.shortname).await?;
	check_existing(&user, &package, existing.as_ref())?;

	// 5. Store
	app.blob_adapter.create_blob_buf(&blob_id, &data).await?;
	let file_size = data.len() as u64;

	let stored =
		store_course(&app, &user, &package, req.is_draft, &blob_id, file_size, existing).await;
	let course_id = match stored {
		Ok((course_id, replaced)) => {
			if let Some(replaced) = replaced
				&& *replaced != *blob_id
				&& let Err(err) = app.blob_adapter.delete_blob(&replaced).await
			{
				warn!("Cannot delete replaced package {}: {}", replaced, err);
			}
			course_id
		}
		Err(err) => {
			discard_blob(&app, &package.shortname, &blob_id).await;
			return Err(err);
		}
	};

	let tags: Vec<&str> = req.tags.iter().map(String::as_str).collect();
	app.meta_adapter.set_course_tags(course_id, &tags, user.user_id).await?;

	let course = app.meta_adapter.read_course_by_id(course_id).await?;
	info!("Published {} v{} (draft: {})", course.shortname, course.version, course.is_draft);

	let response = ApiResponse::new(course).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::CREATED, Json(response)))
}


// vim: ts=4

//! Course publishing endpoint tests
//!
//! Form validation, authentication, roles, package checks, ownership,
//! versioning and the upload size setting.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use common::{
	COURSE, Form, PACKAGE_VERSION, PASSWORD, course_zip, package_zip, publish_request, setup,
};
use coursepub::auth_adapter::Role;
use coursepub::settings::SettingValue;

#[tokio::test]
async fn test_no_get() {
	let t = setup().await;

	let req = Request::builder().uri("/api/publish/").body(Body::empty()).unwrap();
	let res = t.send(req).await;
	assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_required_params() {
	let t = setup().await;
	let zip = course_zip(PACKAGE_VERSION);

	// No username
	let form = Form::new()
		.text("tags", "demo")
		.text("password", "secret")
		.text("is_draft", "False")
		.course_file(&zip);
	let (status, body) = t.send_json(publish_request(form)).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["error"]["message"].as_str().unwrap().contains("username"));

	// No password
	let form = Form::new()
		.text("username", "demo")
		.text("tags", "demo")
		.text("is_draft", "False")
		.course_file(&zip);
	assert_eq!(t.send_json(publish_request(form)).await.0, StatusCode::BAD_REQUEST);

	// No tags
	let form = Form::new()
		.text("username", "demo")
		.text("password", "secret")
		.text("is_draft", "False")
		.course_file(&zip);
	assert_eq!(t.send_json(publish_request(form)).await.0, StatusCode::BAD_REQUEST);

	// No is_draft
	let form = Form::new()
		.text("username", "demo")
		.text("password", "secret")
		.text("tags", "demo")
		.course_file(&zip);
	assert_eq!(t.send_json(publish_request(form)).await.0, StatusCode::BAD_REQUEST);

	// No file
	let form = Form::publish("admin", PASSWORD);
	let (status, body) = t.send_json(publish_request(form)).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["error"]["message"].as_str().unwrap().contains("course_file"));
}

#[tokio::test]
async fn test_not_multipart() {
	let t = setup().await;

	let req = Request::builder()
		.method("POST")
		.uri("/api/publish/")
		.header("content-type", "application/json")
		.body(Body::from(r#"{"username":"admin"}"#))
		.unwrap();
	assert_eq!(t.send(req).await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tags_not_empty() {
	let t = setup().await;

	let form = Form::new()
		.text("username", "admin")
		.text("password", PASSWORD)
		.text("tags", "")
		.text("is_draft", "False")
		.course_file(&course_zip(PACKAGE_VERSION));
	assert_eq!(t.send_json(publish_request(form)).await.0, StatusCode::BAD_REQUEST);

	let form = Form::new()
		.text("username", "admin")
		.text("password", PASSWORD)
		.text("tags", " , ,")
		.text("is_draft", "False")
		.course_file(&course_zip(PACKAGE_VERSION));
	assert_eq!(t.send_json(publish_request(form)).await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_permission_admin() {
	let t = setup().await;

	let form = Form::publish("admin", PASSWORD).course_file(&course_zip(PACKAGE_VERSION));
	let (status, body) = t.send_json(publish_request(form)).await;
	assert_eq!(status, StatusCode::CREATED, "{}", body);
	assert_eq!(body["data"]["shortname"], COURSE);
	assert_eq!(body["data"]["version"], PACKAGE_VERSION);
	assert_eq!(body["data"]["owner"], "admin");
	assert_eq!(body["data"]["isDraft"], false);
	assert_eq!(body["data"]["tags"], json!(["demo"]));
}

#[tokio::test]
async fn test_upload_permission_staff() {
	let t = setup().await;
	t.set_course_owner("staff").await;

	let form = Form::publish("staff", PASSWORD).course_file(&course_zip(PACKAGE_VERSION));
	let (status, body) = t.send_json(publish_request(form)).await;
	assert_eq!(status, StatusCode::CREATED, "{}", body);
}

#[tokio::test]
async fn test_upload_permission_teacher() {
	let t = setup().await;
	t.set_course_owner("teacher").await;

	let form = Form::publish("teacher", PASSWORD).course_file(&course_zip(PACKAGE_VERSION));
	let (status, body) = t.send_json(publish_request(form)).await;
	assert_eq!(status, StatusCode::CREATED, "{}", body);
	assert_eq!(body["data"]["owner"], "teacher");
}

#[tokio::test]
async fn test_upload_permission_user() {
	let t = setup().await;

	let form = Form::publish("demo", PASSWORD).course_file(&course_zip(PACKAGE_VERSION));
	assert_eq!(t.send_json(publish_request(form)).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unauthorised_user() {
	let t = setup().await;

	let form = Form::publish("admin", "wrong_password").course_file(&course_zip(PACKAGE_VERSION));
	assert_eq!(t.send_json(publish_request(form)).await.0, StatusCode::UNAUTHORIZED);

	let form = Form::publish("nobody", PASSWORD).course_file(&course_zip(PACKAGE_VERSION));
	assert_eq!(t.send_json(publish_request(form)).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_inactive_user() {
	let t = setup().await;
	let teacher = t.app.auth_adapter.read_user_by_name("teacher").await.unwrap();
	t.app.auth_adapter.update_user_active(teacher.user_id, false).await.unwrap();
	t.set_course_owner("teacher").await;

	let form = Form::publish("teacher", PASSWORD).course_file(&course_zip(PACKAGE_VERSION));
	assert_eq!(t.send_json(publish_request(form)).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_file_format() {
	let t = setup().await;
	let video = b"\x00\x00\x00\x18ftypM4V \x00\x00\x00\x01M4V mp42isom";

	// Declared as a video
	let form = Form::publish("admin", PASSWORD).file(
		"course_file",
		"sample_video.m4v",
		"video/x-m4v",
		video,
	);
	assert_eq!(t.send_json(publish_request(form)).await.0, StatusCode::BAD_REQUEST);

	// Declared as a zip, but it is not one
	let form = Form::publish("admin", PASSWORD).file(
		"course_file",
		"sample_video.zip",
		"application/zip",
		video,
	);
	let (status, body) = t.send_json(publish_request(form)).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["error"]["message"].as_str().unwrap().contains("zip"));
}

#[tokio::test]
async fn test_overwriting_course_non_owner() {
	let t = setup().await;
	t.set_course_owner("admin").await;

	let form = Form::publish("teacher", PASSWORD).course_file(&course_zip(PACKAGE_VERSION));
	assert_eq!(t.send_json(publish_request(form)).await.0, StatusCode::UNAUTHORIZED);

	// Ownership is unchanged
	let course = t.app.meta_adapter.read_course(COURSE).await.unwrap();
	assert_eq!(course.owner.as_ref(), "admin");
	assert_eq!(course.version, 1);
}

#[tokio::test]
async fn test_staff_may_overwrite_any_course() {
	let t = setup().await;
	t.set_course_owner("teacher").await;

	let form = Form::publish("staff", PASSWORD).course_file(&course_zip(PACKAGE_VERSION));
	assert_eq!(t.send_json(publish_request(form)).await.0, StatusCode::CREATED);

	// The owner stays the teacher
	let course = t.app.meta_adapter.read_course(COURSE).await.unwrap();
	assert_eq!(course.owner.as_ref(), "teacher");
	assert_eq!(course.version, PACKAGE_VERSION);
}

#[tokio::test]
async fn test_course_filesize_limit() {
	let t = setup().await;
	t.app.settings.set("MAX_UPLOAD_SIZE", SettingValue::Int(1000), Role::Admin).await.unwrap();

	let form = Form::publish("admin", PASSWORD).course_file(&course_zip(PACKAGE_VERSION));
	let (status, body) = t.send_json(publish_request(form)).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["error"]["message"].as_str().unwrap().contains("larger than the maximum"));
}

#[tokio::test]
async fn test_overwriting_course_older_version() {
	let t = setup().await;
	let old_package = course_zip(1);
	let package = course_zip(PACKAGE_VERSION);

	let form = Form::publish("admin", PASSWORD).course_file(&package);
	assert_eq!(t.send_json(publish_request(form)).await.0, StatusCode::CREATED);
	// The replaced package is gone
	assert!(!t.has_package(&old_package).await);
	assert!(t.has_package(&package).await);

	// Older version
	let form = Form::publish("admin", PASSWORD).course_file(&course_zip(PACKAGE_VERSION - 1));
	let (status, body) = t.send_json(publish_request(form)).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["error"]["message"].as_str().unwrap().contains("newer version"));

	let course = t.app.meta_adapter.read_course(COURSE).await.unwrap();
	assert_eq!(course.version, PACKAGE_VERSION);
	assert!(!t.has_package(&course_zip(PACKAGE_VERSION - 1)).await);
}

#[tokio::test]
async fn test_republish_same_version() {
	let t = setup().await;
	let package = course_zip(PACKAGE_VERSION);

	let form = Form::publish("admin", PASSWORD).course_file(&package);
	assert_eq!(t.send_json(publish_request(form)).await.0, StatusCode::CREATED);

	// Same package again, to change the tags and the draft flag
	let form = Form::new()
		.text("username", "admin")
		.text("password", PASSWORD)
		.text("tags", "other")
		.text("is_draft", "True")
		.course_file(&package);
	let (status, body) = t.send_json(publish_request(form)).await;
	assert_eq!(status, StatusCode::CREATED, "{}", body);
	assert_eq!(body["data"]["version"], PACKAGE_VERSION);
	assert_eq!(body["data"]["isDraft"], true);
	assert_eq!(body["data"]["tags"], json!(["other"]));

	// The shared blob is kept
	assert!(t.has_package(&package).await);
}

#[tokio::test]
async fn test_publish_new_course_as_draft() {
	let t = setup().await;
	let zip = package_zip("anc2-all", 3);

	let form = Form::new()
		.text("username", "teacher")
		.text("password", PASSWORD)
		.text("tags", "Demo, anc , demo")
		.text("is_draft", "True")
		.course_file(&zip);
	let (status, body) = t.send_json(publish_request(form)).await;
	assert_eq!(status, StatusCode::CREATED, "{}", body);
	assert_eq!(body["data"]["shortname"], "anc2-all");
	assert_eq!(body["data"]["owner"], "teacher");
	assert_eq!(body["data"]["isDraft"], true);
	assert_eq!(body["data"]["tags"], json!(["anc", "Demo"]));
	assert!(body["reqId"].is_string());

	let stored = t.app.blob_adapter.stat_blob(body["data"]["blobId"].as_str().unwrap()).await;
	assert_eq!(stored, Some(zip.len() as u64));

	// Stored owner, not only the response view
	let teacher = t.app.auth_adapter.read_user_by_name("teacher").await.unwrap();
	let course = t.app.meta_adapter.read_course("anc2-all").await.unwrap();
	assert_eq!(course.owner_id, teacher.user_id);
	assert_eq!(course.owner.as_ref(), "teacher");
	assert_eq!(course.version, 3);
	assert!(course.is_draft);
}

#[tokio::test]
async fn test_publish_without_trailing_slash() {
	let t = setup().await;

	let form = Form::publish("admin", PASSWORD).course_file(&course_zip(PACKAGE_VERSION));
	let (status, _) = t.send_json(form.into_request("/api/publish")).await;
	assert_eq!(status, StatusCode::CREATED);
}

// vim: ts=4

//! Shared setup for endpoint tests
//!
//! Builds a full application on temporary storage with the fixture users
//! `admin`, `staff`, `teacher` and `demo` (all with password `password`) and
//! an existing course `anc1-all` at version 1, owned by `admin`.

#![allow(dead_code)]

use axum::{
	Router,
	body::Body,
	http::{Request, StatusCode, header},
	response::Response,
};
use base64::Engine;
use http_body_util::BodyExt;
use serde_json::Value;
use std::{io::Write, sync::Arc};
use tempfile::TempDir;
use tower::ServiceExt;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use coursepub::AppBuilder;
use coursepub::auth_adapter::{CreateUserData, Role};
use coursepub::hasher;
use coursepub::meta_adapter::{CreateCourse, MetaAdapter};
use coursepub::prelude::*;
use coursepub::worker::WorkerPool;
use coursepub_auth_adapter_sqlite::AuthAdapterSqlite;
use coursepub_blob_adapter_fs::BlobAdapterFs;
use coursepub_meta_adapter_sqlite::MetaAdapterSqlite;

pub const PASSWORD: &str = "password";
pub const COURSE: &str = "anc1-all";
/// versionid of the package produced by `course_zip` by default
pub const PACKAGE_VERSION: i64 = 2014011712245;

pub struct TestApp {
	pub app: App,
	pub router: Router,
	_tmp: TempDir,
}

pub async fn setup() -> TestApp {
	setup_with_meta(|meta| Arc::new(meta)).await
}

/// Like `setup`, with the metadata adapter wrapped by `wrap`
pub async fn setup_with_meta(
	wrap: impl FnOnce(MetaAdapterSqlite) -> Arc<dyn MetaAdapter>,
) -> TestApp {
	let tmp = TempDir::new().unwrap();
	let worker = Arc::new(WorkerPool::new(1, 1));

	let auth_adapter = AuthAdapterSqlite::new(worker.clone(), tmp.path().join("db")).await.unwrap();
	let meta_adapter = MetaAdapterSqlite::new(tmp.path().join("db")).await.unwrap();
	let blob_adapter = BlobAdapterFs::new(tmp.path().join("blob").into()).await.unwrap();

	let mut builder = AppBuilder::new();
	builder
		.base_username("admin")
		.base_password(PASSWORD)
		.worker(worker)
		.auth_adapter(Arc::new(auth_adapter))
		.meta_adapter(wrap(meta_adapter))
		.blob_adapter(Arc::new(blob_adapter));
	let (app, router) = builder.build().await.unwrap();

	for (username, role) in [("staff", Role::Staff), ("teacher", Role::Teacher), ("demo", Role::User)]
	{
		app.auth_adapter
			.create_user(CreateUserData { username, password: PASSWORD, email: None, role })
			.await
			.unwrap();
	}

	// Existing course, older than any package the tests upload
	let admin = app.auth_adapter.read_user_by_name("admin").await.unwrap();
	let data = course_zip(1);
	let blob_id = hasher::hash("p", &data);
	app.blob_adapter.create_blob_buf(&blob_id, &data).await.unwrap();
	let course_id = app
		.meta_adapter
		.create_course(CreateCourse {
			shortname: COURSE,
			title: "ANC Training",
			description: None,
			version: 1,
			owner_id: admin.user_id,
			owner: &admin.username,
			is_draft: false,
			blob_id: &blob_id,
			file_size: data.len() as u64,
		})
		.await
		.unwrap();
	app.meta_adapter.set_course_tags(course_id, &["anc"], admin.user_id).await.unwrap();

	TestApp { app, router, _tmp: tmp }
}

impl TestApp {
	pub async fn set_course_owner(&self, username: &str) {
		let user = self.app.auth_adapter.read_user_by_name(username).await.unwrap();
		let course = self.app.meta_adapter.read_course(COURSE).await.unwrap();
		self.app
			.meta_adapter
			.update_course_owner(course.course_id, user.user_id, &user.username)
			.await
			.unwrap();
	}

	/// Whether a package with these bytes is in blob storage
	pub async fn has_package(&self, data: &[u8]) -> bool {
		self.app.blob_adapter.stat_blob(&hasher::hash("p", data)).await.is_some()
	}

	pub async fn send(&self, req: Request<Body>) -> Response {
		self.router.clone().oneshot(req).await.unwrap()
	}

	/// Sends a request and parses the JSON body (`Null` when empty)
	pub async fn send_json(&self, req: Request<Body>) -> (StatusCode, Value) {
		let res = self.send(req).await;
		let status = res.status();
		let body = res.into_body().collect().await.unwrap().to_bytes();
		let json = if body.is_empty() { Value::Null } else { serde_json::from_slice(&body).unwrap() };
		(status, json)
	}
}

/// A course package for `anc1-all`, padded well above 1000 bytes
pub fn course_zip(version: i64) -> Vec<u8> {
	package_zip(COURSE, version)
}

pub fn package_zip(shortname: &str, version: i64) -> Vec<u8> {
	let module_xml = format!(
		r#"<?xml version="1.0" encoding="UTF-8"?>
<module>
	<meta>
		<versionid>{}</versionid>
		<priority>0</priority>
		<title lang="en">ANC Training</title>
		<title lang="fr">Formation ANC</title>
		<description lang="en">Antenatal care for community health workers</description>
		<shortname>{}</shortname>
	</meta>
	<structure>
		<section order="1">
			<title lang="en">Introduction</title>
			<activities>
				<activity type="page" order="1" digest="a1"><title lang="en">Welcome</title></activity>
				<activity type="quiz" order="2" digest="a2"><title lang="en">Pre-test</title></activity>
			</activities>
		</section>
	</structure>
	<media>
		<file filename="intro.m4v" download_url="http://example.com/intro.m4v" digest="m1"/>
	</media>
</module>"#,
		version, shortname
	);
	let page = "<p>Antenatal care</p>\n".repeat(100);

	let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
	let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
	zip.add_directory(format!("{}/", shortname), opts).unwrap();
	zip.start_file(format!("{}/module.xml", shortname), opts).unwrap();
	zip.write_all(module_xml.as_bytes()).unwrap();
	zip.start_file(format!("{}/page_1.html", shortname), opts).unwrap();
	zip.write_all(page.as_bytes()).unwrap();
	zip.finish().unwrap().into_inner()
}

pub fn basic_auth(username: &str, password: &str) -> String {
	let credentials = base64::engine::general_purpose::STANDARD
		.encode(format!("{}:{}", username, password));
	format!("Basic {}", credentials)
}

// Multipart //
//***********//
const BOUNDARY: &str = "----coursepub-test-boundary";

#[derive(Default)]
pub struct Form {
	body: Vec<u8>,
}

impl Form {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn text(mut self, name: &str, value: &str) -> Self {
		self.body.extend_from_slice(
			format!(
				"--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
				BOUNDARY, name, value
			)
			.as_bytes(),
		);
		self
	}

	pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
		self.body.extend_from_slice(
			format!(
				"--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
				 Content-Type: {}\r\n\r\n",
				BOUNDARY, name, filename, content_type
			)
			.as_bytes(),
		);
		self.body.extend_from_slice(data);
		self.body.extend_from_slice(b"\r\n");
		self
	}

	/// The usual publish form, without the file
	pub fn publish(username: &str, password: &str) -> Self {
		Self::new()
			.text("username", username)
			.text("password", password)
			.text("tags", "demo")
			.text("is_draft", "False")
	}

	pub fn course_file(self, data: &[u8]) -> Self {
		self.file("course_file", "anc_course.zip", "application/zip", data)
	}

	pub fn into_request(mut self, uri: &str) -> Request<Body> {
		self.body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
		Request::builder()
			.method("POST")
			.uri(uri)
			.header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
			.body(Body::from(self.body))
			.unwrap()
	}
}

pub fn publish_request(form: Form) -> Request<Body> {
	form.into_request("/api/publish/")
}

// vim: ts=4

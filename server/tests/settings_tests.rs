//! Settings endpoint tests

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;

use common::{Form, PACKAGE_VERSION, PASSWORD, basic_auth, course_zip, publish_request, setup};

fn request(
	method: &str,
	uri: &str,
	username: &str,
	body: Option<serde_json::Value>,
) -> Request<Body> {
	let req = Request::builder()
		.method(method)
		.uri(uri)
		.header(header::AUTHORIZATION, basic_auth(username, PASSWORD));
	match body {
		Some(body) => req
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(body.to_string()))
			.unwrap(),
		None => req.body(Body::empty()).unwrap(),
	}
}

#[tokio::test]
async fn test_settings_require_auth() {
	let t = setup().await;

	let req = Request::builder().uri("/api/settings").body(Body::empty()).unwrap();
	assert_eq!(t.send(req).await.status(), StatusCode::UNAUTHORIZED);

	// Teachers may publish, but not read settings
	let res = t.send(request("GET", "/api/settings", "teacher", None)).await;
	assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_and_get_settings() {
	let t = setup().await;

	let (status, body) = t.send_json(request("GET", "/api/settings", "staff", None)).await;
	assert_eq!(status, StatusCode::OK);
	let max = body["data"].as_array().unwrap().iter().find(|s| s["key"] == "MAX_UPLOAD_SIZE");
	assert_eq!(max.unwrap()["value"], 5_242_880);

	let (status, body) =
		t.send_json(request("GET", "/api/settings/MAX_UPLOAD_SIZE", "admin", None)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["permission"], "admin");

	let res = t.send(request("GET", "/api/settings/NO_SUCH_SETTING", "admin", None)).await;
	assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_setting_permissions_and_validation() {
	let t = setup().await;
	let uri = "/api/settings/MAX_UPLOAD_SIZE";

	// Admin level setting
	let res = t.send(request("PUT", uri, "staff", Some(json!({"value": 1000})))).await;
	assert_eq!(res.status(), StatusCode::FORBIDDEN);

	// Type and validator
	let res = t.send(request("PUT", uri, "admin", Some(json!({"value": "big"})))).await;
	assert_eq!(res.status(), StatusCode::BAD_REQUEST);
	let res = t.send(request("PUT", uri, "admin", Some(json!({"value": 0})))).await;
	assert_eq!(res.status(), StatusCode::BAD_REQUEST);

	let (status, body) =
		t.send_json(request("PUT", uri, "admin", Some(json!({"value": 1000})))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["value"], 1000);
}

#[tokio::test]
async fn test_upload_limit_follows_setting() {
	let t = setup().await;
	let uri = "/api/settings/MAX_UPLOAD_SIZE";

	let res = t.send(request("PUT", uri, "admin", Some(json!({"value": 1000})))).await;
	assert_eq!(res.status(), StatusCode::OK);

	let form = Form::publish("admin", PASSWORD).course_file(&course_zip(PACKAGE_VERSION));
	assert_eq!(t.send_json(publish_request(form)).await.0, StatusCode::BAD_REQUEST);

	// Back to the default
	let res = t.send(request("DELETE", uri, "admin", None)).await;
	assert_eq!(res.status(), StatusCode::NO_CONTENT);

	let form = Form::publish("admin", PASSWORD).course_file(&course_zip(PACKAGE_VERSION));
	assert_eq!(t.send_json(publish_request(form)).await.0, StatusCode::CREATED);
}

// vim: ts=4

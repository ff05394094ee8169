use axum::{
	Router,
	extract::DefaultBodyLimit,
	middleware,
	routing::{get, post},
};
use tower_http::trace::TraceLayer;

use coursepub_core::middleware::{optional_auth, request_id, require_auth};
use coursepub_course::{handler as course, publish};

use crate::prelude::*;
use crate::settings::handler as settings;

pub fn init(app: App) -> Router {
	let publish_router = Router::new()
		.route("/api/publish/", post(publish::post_publish))
		.route("/api/publish", post(publish::post_publish));

	let public_router = Router::new()
		.route("/api/course", get(course::list_courses))
		.route("/api/course/{shortname}", get(course::get_course))
		.route("/api/course/{shortname}/download", get(course::download_course))
		.route("/api/tag", get(course::list_tags))
		.route_layer(middleware::from_fn_with_state(app.clone(), optional_auth));

	let protected_router = Router::new()
		.route("/api/settings", get(settings::list_settings))
		.route(
			"/api/settings/{key}",
			get(settings::get_setting)
				.put(settings::update_setting)
				.delete(settings::delete_setting),
		)
		.route_layer(middleware::from_fn_with_state(app.clone(), require_auth));

	Router::new()
		.merge(publish_router)
		.merge(public_router)
		.merge(protected_router)
		.layer(DefaultBodyLimit::max(app.opts.max_request_size))
		.layer(TraceLayer::new_for_http())
		.layer(middleware::from_fn(request_id))
		.with_state(app)
}

// vim: ts=4

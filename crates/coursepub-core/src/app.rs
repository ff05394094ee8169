//! App state type

use std::sync::Arc;

use coursepub_types::auth_adapter::AuthAdapter;
use coursepub_types::blob_adapter::BlobAdapter;
use coursepub_types::meta_adapter::MetaAdapter;
use coursepub_types::worker;

use crate::settings::service::SettingsService;
use crate::settings::types::FrozenSettingsRegistry;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub worker: Arc<worker::WorkerPool>,
	pub opts: AppBuilderOpts,

	pub auth_adapter: Arc<dyn AuthAdapter>,
	pub meta_adapter: Arc<dyn MetaAdapter>,
	pub blob_adapter: Arc<dyn BlobAdapter>,

	// Settings subsystem
	pub settings: Arc<SettingsService>,
	pub settings_registry: Arc<FrozenSettingsRegistry>,
}

pub type App = Arc<AppState>;

#[derive(Debug)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	/// Administrator account created at startup when missing
	pub base_username: Box<str>,
	pub base_password: Option<Box<str>>,
	/// Router level request body cap in bytes
	pub max_request_size: usize,
	/// Threads serving only interactive jobs (password checks)
	pub worker_high: usize,
	/// Threads serving all jobs
	pub worker_normal: usize,
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		Self {
			listen: "127.0.0.1:8080".into(),
			base_username: "admin".into(),
			base_password: None,
			max_request_size: 256 * 1024 * 1024,
			worker_high: 1,
			worker_normal: 2,
		}
	}
}

// vim: ts=4

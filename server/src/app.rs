//! App builder - constructs and runs the coursepub application

use axum::Router;
use std::sync::Arc;

use crate::auth_adapter::AuthAdapter;
use crate::blob_adapter::BlobAdapter;
use crate::meta_adapter::MetaAdapter;
use crate::prelude::*;
use crate::settings::SettingsRegistry;
use crate::settings::service::SettingsService;
use crate::{bootstrap, routes, worker};
pub use coursepub_core::app::{App, AppBuilderOpts, AppState, VERSION};

const SETTINGS_CACHE_SIZE: usize = 100;

#[derive(Default)]
struct Adapters {
	auth_adapter: Option<Arc<dyn AuthAdapter>>,
	meta_adapter: Option<Arc<dyn MetaAdapter>>,
	blob_adapter: Option<Arc<dyn BlobAdapter>>,
}

pub struct AppBuilder {
	opts: AppBuilderOpts,
	worker: Option<Arc<worker::WorkerPool>>,
	adapters: Adapters,
}

impl AppBuilder {
	pub fn new() -> Self {
		// Tests build many apps in one process
		let _ignore = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder { opts: AppBuilderOpts::default(), worker: None, adapters: Adapters::default() }
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}

	pub fn base_username(&mut self, base_username: impl Into<Box<str>>) -> &mut Self {
		self.opts.base_username = base_username.into();
		self
	}

	pub fn base_password(&mut self, base_password: impl Into<Box<str>>) -> &mut Self {
		self.opts.base_password = Some(base_password.into());
		self
	}

	pub fn max_request_size(&mut self, max_request_size: usize) -> &mut Self {
		self.opts.max_request_size = max_request_size;
		self
	}

	pub fn worker_threads(&mut self, high: usize, normal: usize) -> &mut Self {
		self.opts.worker_high = high;
		self.opts.worker_normal = normal;
		self
	}

	pub fn worker(&mut self, worker: Arc<worker::WorkerPool>) -> &mut Self {
		self.worker = Some(worker);
		self
	}

	// Adapters
	pub fn auth_adapter(&mut self, auth_adapter: Arc<dyn AuthAdapter>) -> &mut Self {
		self.adapters.auth_adapter = Some(auth_adapter);
		self
	}

	pub fn meta_adapter(&mut self, meta_adapter: Arc<dyn MetaAdapter>) -> &mut Self {
		self.adapters.meta_adapter = Some(meta_adapter);
		self
	}

	pub fn blob_adapter(&mut self, blob_adapter: Arc<dyn BlobAdapter>) -> &mut Self {
		self.adapters.blob_adapter = Some(blob_adapter);
		self
	}

	/// Wires the application state, bootstraps the base user and builds the router
	pub async fn build(self) -> ClResult<(App, Router)> {
		let Some(auth_adapter) = self.adapters.auth_adapter else {
			error!("FATAL: No auth adapter configured");
			return Err(Error::ConfigError("No auth adapter configured".into()));
		};
		let Some(meta_adapter) = self.adapters.meta_adapter else {
			error!("FATAL: No meta adapter configured");
			return Err(Error::ConfigError("No meta adapter configured".into()));
		};
		let Some(blob_adapter) = self.adapters.blob_adapter else {
			error!("FATAL: No blob adapter configured");
			return Err(Error::ConfigError("No blob adapter configured".into()));
		};
		let worker = self.worker.unwrap_or_else(|| {
			Arc::new(worker::WorkerPool::new(self.opts.worker_high, self.opts.worker_normal))
		});

		// Settings
		let mut settings_registry = SettingsRegistry::new();
		coursepub_course::register_settings(&mut settings_registry)?;
		info!("Registered {} settings", settings_registry.len());

		let frozen_registry = Arc::new(settings_registry.freeze());
		let settings_service = Arc::new(SettingsService::new(
			frozen_registry.clone(),
			meta_adapter.clone(),
			SETTINGS_CACHE_SIZE,
		));
		settings_service.validate_required_settings().await?;
		info!("Settings subsystem initialized and validated");

		let app: App = Arc::new(AppState {
			worker,
			opts: self.opts,

			auth_adapter,
			meta_adapter,
			blob_adapter,

			settings: settings_service,
			settings_registry: frozen_registry,
		});

		bootstrap::bootstrap(&app).await.map_err(|e| {
			error!("FATAL: Bootstrap failed: {}", e);
			e
		})?;

		let router = routes::init(app.clone());
		Ok((app, router))
	}

	pub async fn run(self) -> ClResult<()> {
		info!("coursepub V{}", VERSION);

		let (app, router) = self.build().await?;

		let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await?;
		info!("Listening on HTTP {}", app.opts.listen);

		axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

		info!("Shut down");
		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		warn!("Cannot listen for shutdown signal: {}", e);
		std::future::pending::<()>().await;
	}
}

// vim: ts=4

//! coursepub server with SQLite metadata and filesystem package storage.
//!
//! Configured through environment variables:
//!
//! | variable | default |
//! |----------|---------|
//! | `LISTEN` | `127.0.0.1:8080` |
//! | `DATA_DIR` | `./data` |
//! | `BASE_USERNAME` | `admin` |
//! | `BASE_PASSWORD` | unset, no base user is created |
//! | `MAX_REQUEST_SIZE` | 256 MiB |
//! | `WORKER_THREADS` | `1,2` (high and normal priority) |

use std::{env, path::PathBuf, sync::Arc};

use coursepub::prelude::*;
use coursepub::worker::WorkerPool;
use coursepub_auth_adapter_sqlite::AuthAdapterSqlite;
use coursepub_blob_adapter_fs::BlobAdapterFs;
use coursepub_meta_adapter_sqlite::MetaAdapterSqlite;

pub struct Config {
	pub listen: Option<String>,
	pub data_dir: PathBuf,
	pub base_username: Option<String>,
	pub base_password: Option<String>,
	pub max_request_size: Option<usize>,
	pub worker_threads: Option<(usize, usize)>,
}

fn parse_env<T: std::str::FromStr>(name: &str) -> ClResult<Option<T>> {
	match env::var(name) {
		Ok(value) => value
			.trim()
			.parse()
			.map(Some)
			.map_err(|_| Error::ConfigError(format!("{} has an invalid value: {}", name, value))),
		Err(_) => Ok(None),
	}
}

impl Config {
	pub fn from_env() -> ClResult<Self> {
		let worker_threads = match env::var("WORKER_THREADS") {
			Ok(value) => {
				let (high, normal) = value.split_once(',').ok_or_else(|| {
					Error::ConfigError(format!("WORKER_THREADS must be <high>,<normal>: {}", value))
				})?;
				let parse = |n: &str| {
					n.trim().parse::<usize>().map_err(|_| {
						Error::ConfigError(format!("WORKER_THREADS has an invalid value: {}", value))
					})
				};
				Some((parse(high)?, parse(normal)?))
			}
			Err(_) => None,
		};

		Ok(Config {
			listen: env::var("LISTEN").ok(),
			data_dir: PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "./data".into())),
			base_username: env::var("BASE_USERNAME").ok(),
			base_password: env::var("BASE_PASSWORD").ok().filter(|p| !p.is_empty()),
			max_request_size: parse_env("MAX_REQUEST_SIZE")?,
			worker_threads,
		})
	}
}

#[tokio::main]
async fn main() -> ClResult<()> {
	let config = Config::from_env()?;

	let mut builder = coursepub::AppBuilder::new();
	if let Some(listen) = config.listen {
		builder.listen(listen);
	}
	if let Some(base_username) = config.base_username {
		builder.base_username(base_username);
	}
	if let Some(base_password) = config.base_password {
		builder.base_password(base_password);
	}
	if let Some(max_request_size) = config.max_request_size {
		builder.max_request_size(max_request_size);
	}
	let (high, normal) = config.worker_threads.unwrap_or((1, 2));
	let worker = Arc::new(WorkerPool::new(high, normal));

	let db_dir = config.data_dir.join("db");
	let auth_adapter = AuthAdapterSqlite::new(worker.clone(), &db_dir).await?;
	let meta_adapter = MetaAdapterSqlite::new(&db_dir).await?;
	let blob_adapter = BlobAdapterFs::new(config.data_dir.join("blob").into()).await?;

	builder
		.worker(worker)
		.auth_adapter(Arc::new(auth_adapter))
		.meta_adapter(Arc::new(meta_adapter))
		.blob_adapter(Arc::new(blob_adapter));

	builder.run().await
}

// vim: ts=4

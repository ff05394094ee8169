//! SQLite-backed authentication adapter for coursepub.
//!
//! Stores user accounts with their role and a bcrypt password hash. Hashing
//! and verification run on the worker pool.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

mod crypto;
mod schema;
mod user;
mod utils;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::{fmt::Debug, path::Path, sync::Arc};

use coursepub_types::{
	auth_adapter::{AuthAdapter, AuthUser, CreateUserData, Role},
	prelude::*,
	worker::WorkerPool,
};

use crate::schema::init_db;

const DB_FILE: &str = "auth.db";

#[derive(Debug)]
pub struct AuthAdapterSqlite {
	db: SqlitePool,
	worker: Arc<WorkerPool>,
}

impl AuthAdapterSqlite {
	/// Opens (or creates) `auth.db` inside `path`
	pub async fn new(worker: Arc<WorkerPool>, path: impl AsRef<Path>) -> ClResult<Self> {
		tokio::fs::create_dir_all(path.as_ref()).await?;
		let db_path = path.as_ref().join(DB_FILE);
		let opts = sqlite::SqliteConnectOptions::new()
			.filename(&db_path)
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		init_db(&db)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;
		debug!("Auth database at {}", db_path.display());

		Ok(Self { db, worker })
	}
}

#[async_trait]
impl AuthAdapter for AuthAdapterSqlite {
	async fn create_user(&self, data: CreateUserData<'_>) -> ClResult<UserId> {
		user::create_user(&self.db, &self.worker, data).await
	}

	async fn read_user(&self, user_id: UserId) -> ClResult<AuthUser> {
		user::read_user(&self.db, user_id).await
	}

	async fn read_user_by_name(&self, username: &str) -> ClResult<AuthUser> {
		user::read_user_by_name(&self.db, username).await
	}

	async fn list_users(&self) -> ClResult<Vec<AuthUser>> {
		user::list_users(&self.db).await
	}

	async fn check_user_password(&self, username: &str, password: &str) -> ClResult<AuthUser> {
		user::check_user_password(&self.db, &self.worker, username, password).await
	}

	async fn update_user_password(&self, username: &str, password: &str) -> ClResult<()> {
		user::update_user_password(&self.db, &self.worker, username, password).await
	}

	async fn update_user_role(&self, user_id: UserId, role: Role) -> ClResult<()> {
		user::update_user_role(&self.db, user_id, role).await
	}

	async fn update_user_active(&self, user_id: UserId, is_active: bool) -> ClResult<()> {
		user::update_user_active(&self.db, user_id, is_active).await
	}
}

// vim: ts=4

//! User accounts and password credentials

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use coursepub_types::{
	auth_adapter::{AuthUser, CreateUserData, Role},
	prelude::*,
	worker::WorkerPool,
};

use crate::crypto;
use crate::utils::{collect_res, inspect, map_res, map_write_err};

const USER_COLUMNS: &str = "user_id, username, email, role, is_active, created_at";

fn user_from_row(row: &SqliteRow) -> Result<AuthUser, sqlx::Error> {
	let role: &str = row.try_get("role")?;
	let role = role.parse::<Role>().map_err(|err| sqlx::Error::Decode(err.to_string().into()))?;
	Ok(AuthUser {
		user_id: UserId(row.try_get("user_id")?),
		username: row.try_get::<&str, _>("username")?.into(),
		email: row.try_get::<Option<&str>, _>("email")?.map(Into::into),
		role,
		is_active: row.try_get("is_active")?,
		created_at: Timestamp(row.try_get("created_at")?),
	})
}

pub(crate) async fn create_user(
	db: &SqlitePool,
	worker: &WorkerPool,
	data: CreateUserData<'_>,
) -> ClResult<UserId> {
	if data.username.trim().is_empty() {
		return Err(Error::ValidationError("username must not be empty".into()));
	}
	let password_hash = crypto::generate_password_hash(worker, data.password).await?;

	let user_id: i64 = sqlx::query_scalar(
		"INSERT INTO users (username, email, password, role) VALUES (?1, ?2, ?3, ?4)
		RETURNING user_id",
	)
	.bind(data.username)
	.bind(data.email)
	.bind(password_hash.as_ref())
	.bind(data.role.as_str())
	.fetch_one(db)
	.await
	.map_err(map_write_err)?;

	info!("Created user {} ({}) as {}", data.username, user_id, data.role);
	Ok(UserId(user_id))
}

pub(crate) async fn read_user(db: &SqlitePool, user_id: UserId) -> ClResult<AuthUser> {
	let res = sqlx::query(&format!("SELECT {} FROM users WHERE user_id = ?1", USER_COLUMNS))
		.bind(user_id.0)
		.fetch_one(db)
		.await;

	map_res(res, user_from_row)
}

pub(crate) async fn read_user_by_name(db: &SqlitePool, username: &str) -> ClResult<AuthUser> {
	let res = sqlx::query(&format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS))
		.bind(username)
		.fetch_one(db)
		.await;

	map_res(res, user_from_row)
}

pub(crate) async fn list_users(db: &SqlitePool) -> ClResult<Vec<AuthUser>> {
	let rows = sqlx::query(&format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS))
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	collect_res(rows.iter().map(user_from_row))
}

pub(crate) async fn check_user_password(
	db: &SqlitePool,
	worker: &WorkerPool,
	username: &str,
	password: &str,
) -> ClResult<AuthUser> {
	let res = sqlx::query(&format!(
		"SELECT {}, password FROM users WHERE username = ?1",
		USER_COLUMNS
	))
	.bind(username)
	.fetch_one(db)
	.await;

	let (user, password_hash) = match map_res(res, |row| {
		Ok((user_from_row(row)?, row.try_get::<String, _>("password")?.into_boxed_str()))
	}) {
		Ok(found) => found,
		Err(Error::NotFound) => {
			debug!("Login attempt for unknown user {}", username);
			return Err(Error::Unauthorized);
		}
		Err(err) => return Err(err),
	};

	crypto::check_password(worker, password, password_hash).await.inspect_err(|_| {
		debug!("Wrong password for user {}", username);
	})?;

	if !user.is_active {
		debug!("Login attempt for inactive user {}", username);
		return Err(Error::Unauthorized);
	}

	Ok(user)
}

/// Fails with `NotFound` when no row was touched
fn check_affected(res: Result<sqlx::sqlite::SqliteQueryResult, sqlx::Error>) -> ClResult<()> {
	let res = res.inspect_err(inspect).map_err(|_| Error::DbError)?;
	if res.rows_affected() == 0 { Err(Error::NotFound) } else { Ok(()) }
}

pub(crate) async fn update_user_password(
	db: &SqlitePool,
	worker: &WorkerPool,
	username: &str,
	password: &str,
) -> ClResult<()> {
	let password_hash = crypto::generate_password_hash(worker, password).await?;
	let res = sqlx::query(
		"UPDATE users SET password = ?2, updated_at = unixepoch() WHERE username = ?1",
	)
	.bind(username)
	.bind(password_hash.as_ref())
	.execute(db)
	.await;

	check_affected(res)
}

pub(crate) async fn update_user_role(db: &SqlitePool, user_id: UserId, role: Role) -> ClResult<()> {
	let res = sqlx::query("UPDATE users SET role = ?2, updated_at = unixepoch() WHERE user_id = ?1")
		.bind(user_id.0)
		.bind(role.as_str())
		.execute(db)
		.await;

	check_affected(res)
}

pub(crate) async fn update_user_active(
	db: &SqlitePool,
	user_id: UserId,
	is_active: bool,
) -> ClResult<()> {
	let res =
		sqlx::query("UPDATE users SET is_active = ?2, updated_at = unixepoch() WHERE user_id = ?1")
			.bind(user_id.0)
			.bind(is_active)
			.execute(db)
			.await;

	check_affected(res)
}

// vim: ts=4

//! Shared utilities for the SQLite adapter
//!
//! Error mapping helpers used across all domain modules.

use coursepub_types::prelude::*;
use sqlx::sqlite::{SqliteQueryResult, SqliteRow};

/// Log database errors
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Map a query result to a value using a closure
pub(crate) fn map_res<T, F>(row: Result<SqliteRow, sqlx::Error>, f: F) -> ClResult<T>
where
	F: FnOnce(&SqliteRow) -> Result<T, sqlx::Error>,
{
	match row {
		Ok(ref row) => f(row).inspect_err(inspect).map_err(|_| Error::DbError),
		Err(sqlx::Error::RowNotFound) => Err(Error::NotFound),
		Err(err) => {
			inspect(&err);
			Err(Error::DbError)
		}
	}
}

/// Collect result iterator into a vector
pub(crate) fn collect_res<T>(
	iter: impl Iterator<Item = Result<T, sqlx::Error>> + Unpin,
) -> ClResult<Vec<T>> {
	let mut items = Vec::new();
	for item in iter {
		items.push(item.inspect_err(inspect).map_err(|_| Error::DbError)?);
	}
	Ok(items)
}

/// Unique constraint violations become `Conflict`
pub(crate) fn map_write_err(err: sqlx::Error) -> Error {
	match &err {
		sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
			Error::Conflict(db_err.message().to_string())
		}
		_ => {
			inspect(&err);
			Error::DbError
		}
	}
}

/// Fails with `NotFound` when the statement touched no row
pub(crate) fn check_affected(res: Result<SqliteQueryResult, sqlx::Error>) -> ClResult<()> {
	let res = res.inspect_err(inspect).map_err(|_| Error::DbError)?;
	if res.rows_affected() == 0 { Err(Error::NotFound) } else { Ok(()) }
}

// vim: ts=4

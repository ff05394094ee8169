const BCRYPT_COST: u32 = 10;

use coursepub_types::{prelude::*, worker::WorkerPool};

fn generate_password_hash_sync(password: Box<str>) -> ClResult<Box<str>> {
	let hash = bcrypt::hash(password.as_ref(), BCRYPT_COST)
		.map_err(|err| Error::Internal(format!("bcrypt: {}", err)))?;

	Ok(hash.into())
}

pub async fn generate_password_hash(worker: &WorkerPool, password: &str) -> ClResult<Box<str>> {
	let password: Box<str> = password.into();
	worker.try_run_immed(move || generate_password_hash_sync(password)).await
}

fn check_password_sync(password: Box<str>, password_hash: Box<str>) -> ClResult<()> {
	// Malformed stored hashes are reported like a mismatch
	let res = bcrypt::verify(password.as_ref(), &password_hash).unwrap_or(false);
	if res { Ok(()) } else { Err(Error::Unauthorized) }
}

pub async fn check_password(
	worker: &WorkerPool,
	password: &str,
	password_hash: Box<str>,
) -> ClResult<()> {
	let password: Box<str> = password.into();
	worker.try_run_immed(move || check_password_sync(password, password_hash)).await
}


// vim: ts=4

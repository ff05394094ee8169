//! Adapter that manages user accounts, roles and password credentials.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Debug;

use crate::{prelude::*, types::serialize_timestamp_iso};

/// Role classification of a user account.
///
/// Ordered from least to most privileged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	User,
	Teacher,
	Staff,
	Admin,
}

impl Role {
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::User => "user",
			Role::Teacher => "teacher",
			Role::Staff => "staff",
			Role::Admin => "admin",
		}
	}

	/// Staff and administrators manage content they do not own
	pub fn is_staff(&self) -> bool {
		matches!(self, Role::Staff | Role::Admin)
	}
}

impl std::fmt::Display for Role {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for Role {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"user" => Ok(Role::User),
			"teacher" => Ok(Role::Teacher),
			"staff" => Ok(Role::Staff),
			"admin" => Ok(Role::Admin),
			_ => Err(Error::ValidationError(format!("unknown role: {}", s))),
		}
	}
}

/// An authenticated (or looked up) user account
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
	pub user_id: UserId,
	pub username: Box<str>,
	pub email: Option<Box<str>>,
	pub role: Role,
	pub is_active: bool,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub created_at: Timestamp,
}

/// Data needed to create a new user
#[derive(Debug)]
pub struct CreateUserData<'a> {
	pub username: &'a str,
	pub password: &'a str,
	pub email: Option<&'a str>,
	pub role: Role,
}

#[async_trait]
pub trait AuthAdapter: Debug + Send + Sync {
	/// Creates a user, fails with `Conflict` if the username is taken
	async fn create_user(&self, data: CreateUserData<'_>) -> ClResult<UserId>;

	async fn read_user(&self, user_id: UserId) -> ClResult<AuthUser>;
	async fn read_user_by_name(&self, username: &str) -> ClResult<AuthUser>;
	async fn list_users(&self) -> ClResult<Vec<AuthUser>>;

	/// Verifies a password.
	///
	/// Unknown users, wrong passwords and inactive accounts all fail with
	/// `Error::Unauthorized`, so callers cannot tell them apart.
	async fn check_user_password(&self, username: &str, password: &str) -> ClResult<AuthUser>;

	async fn update_user_password(&self, username: &str, password: &str) -> ClResult<()>;
	async fn update_user_role(&self, user_id: UserId, role: Role) -> ClResult<()>;
	async fn update_user_active(&self, user_id: UserId, is_active: bool) -> ClResult<()>;
}


// vim: ts=4

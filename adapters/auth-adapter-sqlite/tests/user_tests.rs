//! User account tests
//!
//! Creation, lookup, password checks and account updates against a
//! temporary database.

#[cfg(test)]
mod tests {
	use coursepub_auth_adapter_sqlite::AuthAdapterSqlite;
	use coursepub_types::auth_adapter::{AuthAdapter, CreateUserData, Role};
	use coursepub_types::prelude::*;
	use coursepub_types::worker::WorkerPool;
	use std::sync::Arc;
	use tempfile::TempDir;

	/// Helper to create a test auth adapter with temporary database
	async fn create_test_adapter() -> ClResult<(AuthAdapterSqlite, TempDir)> {
		let tmp_dir = TempDir::new().unwrap();
		let worker = Arc::new(WorkerPool::new(1, 1));
		let adapter = AuthAdapterSqlite::new(worker, tmp_dir.path()).await?;
		Ok((adapter, tmp_dir))
	}

	async fn create_test_user(
		adapter: &AuthAdapterSqlite,
		username: &str,
		password: &str,
		role: Role,
	) -> ClResult<UserId> {
		adapter
			.create_user(CreateUserData { username, password, email: None, role })
			.await
	}

	#[tokio::test]
	async fn test_create_and_read_user() {
		let (adapter, _tmp) = create_test_adapter().await.expect("Failed to create adapter");

		let user_id = adapter
			.create_user(CreateUserData {
				username: "teacher",
				password: "password",
				email: Some("teacher@example.com"),
				role: Role::Teacher,
			})
			.await
			.expect("Failed to create user");

		let user = adapter.read_user(user_id).await.expect("Failed to read user");
		assert_eq!(user.user_id, user_id);
		assert_eq!(user.username.as_ref(), "teacher");
		assert_eq!(user.email.as_deref(), Some("teacher@example.com"));
		assert_eq!(user.role, Role::Teacher);
		assert!(user.is_active);
		assert!(user.created_at.0 > 0);

		let by_name = adapter.read_user_by_name("teacher").await.expect("Failed to read user");
		assert_eq!(by_name.user_id, user_id);
	}

	#[tokio::test]
	async fn test_duplicate_username_conflicts() {
		let (adapter, _tmp) = create_test_adapter().await.expect("Failed to create adapter");

		create_test_user(&adapter, "demo", "password", Role::User).await.expect("first");
		let res = create_test_user(&adapter, "demo", "other", Role::Teacher).await;
		assert!(matches!(res, Err(Error::Conflict(_))), "expected conflict, got {:?}", res);
	}

	#[tokio::test]
	async fn test_unknown_user_not_found() {
		let (adapter, _tmp) = create_test_adapter().await.expect("Failed to create adapter");

		assert!(matches!(adapter.read_user_by_name("nobody").await, Err(Error::NotFound)));
		assert!(matches!(adapter.read_user(UserId(42)).await, Err(Error::NotFound)));
	}

	#[tokio::test]
	async fn test_password_check() {
		let (adapter, _tmp) = create_test_adapter().await.expect("Failed to create adapter");
		let user_id = create_test_user(&adapter, "staff", "correct_password_123", Role::Staff)
			.await
			.expect("Failed to create user");

		let user = adapter
			.check_user_password("staff", "correct_password_123")
			.await
			.expect("Correct password should verify");
		assert_eq!(user.user_id, user_id);
		assert_eq!(user.role, Role::Staff);

		assert!(matches!(
			adapter.check_user_password("staff", "wrong_password").await,
			Err(Error::Unauthorized)
		));
		assert!(matches!(
			adapter.check_user_password("nobody", "correct_password_123").await,
			Err(Error::Unauthorized)
		));
	}

	#[tokio::test]
	async fn test_inactive_user_cannot_log_in() {
		let (adapter, _tmp) = create_test_adapter().await.expect("Failed to create adapter");
		let user_id = create_test_user(&adapter, "teacher", "password", Role::Teacher)
			.await
			.expect("Failed to create user");

		adapter.update_user_active(user_id, false).await.expect("Failed to deactivate");
		assert!(matches!(
			adapter.check_user_password("teacher", "password").await,
			Err(Error::Unauthorized)
		));

		adapter.update_user_active(user_id, true).await.expect("Failed to activate");
		assert!(adapter.check_user_password("teacher", "password").await.is_ok());
	}

	#[tokio::test]
	async fn test_update_password() {
		let (adapter, _tmp) = create_test_adapter().await.expect("Failed to create adapter");
		create_test_user(&adapter, "demo", "old_password", Role::User).await.expect("create");

		adapter.update_user_password("demo", "new_password").await.expect("update");

		assert!(adapter.check_user_password("demo", "old_password").await.is_err());
		assert!(adapter.check_user_password("demo", "new_password").await.is_ok());

		assert!(matches!(
			adapter.update_user_password("nobody", "x").await,
			Err(Error::NotFound)
		));
	}

	#[tokio::test]
	async fn test_update_role_and_list() {
		let (adapter, _tmp) = create_test_adapter().await.expect("Failed to create adapter");
		let demo = create_test_user(&adapter, "demo", "password", Role::User).await.unwrap();
		create_test_user(&adapter, "admin", "password", Role::Admin).await.unwrap();

		adapter.update_user_role(demo, Role::Teacher).await.expect("update role");
		assert_eq!(adapter.read_user(demo).await.unwrap().role, Role::Teacher);

		let users = adapter.list_users().await.expect("list");
		let names: Vec<&str> = users.iter().map(|u| u.username.as_ref()).collect();
		assert_eq!(names, vec!["admin", "demo"]);

		assert!(matches!(
			adapter.update_user_role(UserId(999), Role::Admin).await,
			Err(Error::NotFound)
		));
	}

	#[tokio::test]
	async fn test_reopen_keeps_users() {
		let tmp_dir = TempDir::new().unwrap();
		let worker = Arc::new(WorkerPool::new(1, 1));
		{
			let adapter = AuthAdapterSqlite::new(worker.clone(), tmp_dir.path()).await.unwrap();
			create_test_user(&adapter, "admin", "password", Role::Admin).await.unwrap();
		}
		let adapter = AuthAdapterSqlite::new(worker, tmp_dir.path()).await.unwrap();
		assert!(adapter.check_user_password("admin", "password").await.is_ok());
	}
}

// vim: ts=4

//! Bootstrap: creates the base administrator on first start

use crate::auth_adapter::{CreateUserData, Role};
use crate::prelude::*;

pub async fn bootstrap(app: &App) -> ClResult<()> {
	let username = app.opts.base_username.as_ref();

	match app.auth_adapter.read_user_by_name(username).await {
		Ok(user) => {
			debug!("Base user {} exists ({})", user.username, user.role);
		}
		Err(Error::NotFound) => {
			let Some(password) = app.opts.base_password.as_deref() else {
				warn!("Base user {} does not exist and no base password is set", username);
				return Ok(());
			};
			let user_id = app
				.auth_adapter
				.create_user(CreateUserData { username, password, email: None, role: Role::Admin })
				.await?;
			info!("Created base user {} ({})", username, user_id);
		}
		Err(e) => return Err(e),
	}

	Ok(())
}

// vim: ts=4

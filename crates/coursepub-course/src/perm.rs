//! Course permission rules

use coursepub_types::auth_adapter::{AuthUser, Role};
use coursepub_types::meta_adapter::Course;

use crate::prelude::*;

/// Administrators, staff and teachers may publish
pub fn check_can_publish(user: &AuthUser) -> ClResult<()> {
	if user.is_active && user.role >= Role::Teacher {
		Ok(())
	} else {
		warn!("User {} ({}) is not allowed to publish", user.username, user.role);
		Err(Error::Unauthorized)
	}
}

/// Only the owner, staff or administrators may overwrite an existing course
pub fn check_can_overwrite(user: &AuthUser, course: &Course) -> ClResult<()> {
	if course.owner_id == user.user_id || user.role.is_staff() {
		Ok(())
	} else {
		warn!(
			"User {} tried to overwrite course {} owned by {}",
			user.username, course.shortname, course.owner
		);
		Err(Error::Unauthorized)
	}
}

/// Published courses are public, drafts only visible to their owner and staff
pub fn can_view_course(user: Option<&AuthUser>, course: &Course) -> bool {
	if !course.is_draft {
		return true;
	}
	user.is_some_and(|u| u.user_id == course.owner_id || u.role.is_staff())
}


// vim: ts=4

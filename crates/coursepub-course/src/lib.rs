//! Course subsystem. Package validation, publishing, listing and download.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod handler;
pub mod manifest;
pub mod package;
pub mod perm;
pub mod publish;
pub mod settings;

mod prelude;

use prelude::*;

pub use publish::COURSE_FILE_FIELD;

pub fn register_settings(
	registry: &mut coursepub_core::settings::SettingsRegistry,
) -> ClResult<()> {
	settings::register_settings(registry)
}

// vim: ts=4

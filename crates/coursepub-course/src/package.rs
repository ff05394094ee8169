//! Course package validation.
//!
//! A package is a zip archive holding a single top-level directory with a
//! `module.xml` manifest. Packages are inspected in memory and never extracted.

use std::{
	io::{Cursor, Read},
	path::Component,
};

use coursepub_types::utils::validate_shortname;

use crate::manifest::CourseManifest;
use crate::prelude::*;

pub const MODULE_XML: &str = "module.xml";
const MAX_MANIFEST_SIZE: u64 = 1024 * 1024;
/// Metadata folders added by archivers, ignored
const IGNORED_DIRS: [&str; 1] = ["__MACOSX"];

#[derive(Debug, Clone)]
pub struct CoursePackage {
	/// The single top-level directory
	pub dir_name: Box<str>,
	pub shortname: Box<str>,
	pub title: Box<str>,
	pub description: Option<Box<str>>,
	pub version: i64,
	pub sections: u32,
	pub activities: u32,
	pub media_files: u32,
	pub entries: usize,
}

fn not_a_package(msg: &str) -> Error {
	Error::ValidationError(format!("invalid course package: {}", msg))
}

impl CoursePackage {
	pub fn from_zip(data: &[u8]) -> ClResult<Self> {
		let mut archive = zip::ZipArchive::new(Cursor::new(data))
			.map_err(|_| Error::ValidationError("You may only upload a zip file".into()))?;

		let mut dir_name: Option<String> = None;
		let mut entries = 0;
		for i in 0..archive.len() {
			let file = archive.by_index(i).map_err(|_| not_a_package("unreadable entry"))?;
			let Some(path) = file
				.enclosed_name()
				.filter(|path| !path.components().any(|c| c == Component::ParentDir))
			else {
				warn!("Rejecting package entry with unsafe path: {:?}", file.name());
				return Err(not_a_package("entry path escapes the package"));
			};
			let mut components = path.components();
			let Some(Component::Normal(top)) = components.next() else {
				return Err(not_a_package("entry path escapes the package"));
			};
			let top = top.to_str().ok_or_else(|| not_a_package("entry name is not UTF-8"))?;
			if IGNORED_DIRS.contains(&top) {
				continue;
			}
			if components.next().is_none() && !file.is_dir() {
				return Err(not_a_package("files must be inside the course directory"));
			}
			match &dir_name {
				None => dir_name = Some(top.to_string()),
				Some(dir) if dir == top => {}
				Some(_) => return Err(not_a_package("more than one top-level directory")),
			}
			entries += 1;
		}
		let dir_name = dir_name.ok_or_else(|| not_a_package("empty archive"))?;

		let manifest_path = format!("{}/{}", dir_name, MODULE_XML);
		let manifest_file = archive
			.by_name(&manifest_path)
			.map_err(|_| not_a_package("module.xml not found in the course directory"))?;
		let mut xml = String::new();
		manifest_file
			.take(MAX_MANIFEST_SIZE + 1)
			.read_to_string(&mut xml)
			.map_err(|_| not_a_package("module.xml is not readable UTF-8"))?;
		if xml.len() as u64 > MAX_MANIFEST_SIZE {
			return Err(not_a_package("module.xml is too large"));
		}

		let manifest = CourseManifest::parse(&xml)?;
		let shortname = manifest.shortname.as_deref().unwrap_or(dir_name.as_str()).trim().to_lowercase();
		validate_shortname(&shortname)?;
		let title = manifest.title().ok_or_else(|| not_a_package("missing title"))?;

		Ok(CoursePackage {
			shortname: shortname.into(),
			title: title.into(),
			description: manifest.description().map(Into::into),
			version: manifest.version,
			sections: manifest.sections,
			activities: manifest.activities,
			media_files: manifest.media_files,
			entries,
			dir_name: dir_name.into(),
		})
	}
}


// vim: ts=4

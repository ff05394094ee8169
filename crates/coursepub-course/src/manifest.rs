//! `module.xml` parser.
//!
//! Only the parts needed for publishing are extracted: version, titles,
//! shortname, descriptions and the size of the course structure.

use quick_xml::{Reader, events::Event};

use crate::prelude::*;

const ROOT: &str = "module";

#[derive(Debug, Default, Clone)]
pub struct CourseManifest {
	pub version: i64,
	/// `(lang, title)` pairs in document order
	pub titles: Vec<(Box<str>, Box<str>)>,
	pub shortname: Option<Box<str>>,
	/// `(lang, description)` pairs in document order
	pub descriptions: Vec<(Box<str>, Box<str>)>,
	pub sections: u32,
	pub activities: u32,
	pub media_files: u32,
}

/// Picks the English entry, or the first one
fn pick_localized(entries: &[(Box<str>, Box<str>)]) -> Option<&str> {
	entries
		.iter()
		.find(|(lang, _)| lang.eq_ignore_ascii_case("en"))
		.or_else(|| entries.first())
		.map(|(_, text)| &**text)
}

fn invalid(msg: impl std::fmt::Display) -> Error {
	Error::ValidationError(format!("module.xml: {}", msg))
}

impl CourseManifest {
	pub fn title(&self) -> Option<&str> {
		pick_localized(&self.titles)
	}

	pub fn description(&self) -> Option<&str> {
		pick_localized(&self.descriptions)
	}

	pub fn parse(xml: &str) -> ClResult<Self> {
		let mut reader = Reader::from_str(xml);
		reader.config_mut().trim_text(true);

		let mut manifest = CourseManifest::default();
		let mut version: Option<String> = None;
		let mut path: Vec<String> = Vec::new();
		let mut lang = String::new();
		let mut text = String::new();

		loop {
			match reader.read_event().map_err(invalid)? {
				Event::Start(e) => {
					let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
					if path.is_empty() && name != ROOT {
						return Err(invalid(format!("unexpected root element <{}>", name)));
					}
					manifest.count_element(&path, &name);
					lang = match e.try_get_attribute("lang").map_err(invalid)? {
						Some(attr) => attr.unescape_value().map_err(invalid)?.into_owned(),
						None => String::new(),
					};
					text.clear();
					path.push(name);
				}
				Event::Empty(e) => {
					let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
					if path.is_empty() {
						return Err(invalid("empty document"));
					}
					manifest.count_element(&path, &name);
				}
				Event::Text(t) => text.push_str(&t.unescape().map_err(invalid)?),
				Event::CData(t) => text.push_str(&String::from_utf8_lossy(&t.into_inner())),
				Event::End(_) => {
					let segments: Vec<&str> = path.iter().map(String::as_str).collect();
					let value = text.trim();
					match segments.as_slice() {
						[ROOT, "meta", "versionid"] => {
							version = Some(value.to_string());
						}
						[ROOT, "meta", "title"] if !value.is_empty() => {
							manifest.titles.push((lang.as_str().into(), value.into()));
						}
						[ROOT, "meta", "description"] if !value.is_empty() => {
							manifest.descriptions.push((lang.as_str().into(), value.into()));
						}
						[ROOT, "meta", "shortname"] if !value.is_empty() => {
							manifest.shortname = Some(value.into());
						}
						_ => {}
					}
					text.clear();
					path.pop();
				}
				Event::Eof => break,
				_ => {}
			}
		}

		if !path.is_empty() {
			return Err(invalid("unexpected end of document"));
		}
		let version = version.ok_or_else(|| invalid("missing versionid"))?;
		manifest.version = match version.parse::<i64>() {
			Ok(v) if v > 0 => v,
			_ => return Err(invalid(format!("invalid versionid '{}'", version))),
		};
		if manifest.titles.is_empty() {
			return Err(invalid("missing title"));
		}

		Ok(manifest)
	}

	fn count_element(&mut self, parents: &[String], name: &str) {
		let in_structure = parents.len() >= 2 && parents[1] == "structure";
		match (parents.last().map(String::as_str), name) {
			(Some("structure"), "section") => self.sections += 1,
			(_, "activity") if in_structure => self.activities += 1,
			(Some("media"), "file") if parents.len() == 2 => self.media_files += 1,
			_ => {}
		}
	}
}


// vim: ts=4

//! Utility functions

use rand::RngExt;

use crate::prelude::*;

pub const ID_LENGTH: usize = 24;
pub const SAFE: [char; 62] = [
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
	'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
	'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
	'V', 'W', 'X', 'Y', 'Z',
];

pub fn random_id() -> String {
	let mut rng = rand::rng();
	let mut result = String::with_capacity(ID_LENGTH);

	for _ in 0..ID_LENGTH {
		result.push(SAFE[rng.random_range(0..SAFE.len())]);
	}
	result
}

/// Interprets a form flag. Only "true", "True" and "1" are truthy.
pub fn parse_bool_flag(value: &str) -> bool {
	matches!(value.trim(), "true" | "True" | "1")
}

/// Splits a comma separated tag list.
///
/// Entries are trimmed, empty ones dropped, duplicates removed
/// case-insensitively keeping the first spelling.
pub fn split_tags(value: &str) -> Vec<&str> {
	let mut res: Vec<&str> = Vec::new();
	for tag in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
		if !res.iter().any(|t| t.to_lowercase() == tag.to_lowercase()) {
			res.push(tag);
		}
	}
	res
}

/// Validates a course shortname: lowercase ascii letters, digits, `-` and `_`
pub fn validate_shortname(shortname: &str) -> ClResult<()> {
	if shortname.is_empty() || shortname.len() > 200 {
		return Err(Error::ValidationError("invalid shortname length".into()));
	}
	if !shortname.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
	{
		return Err(Error::ValidationError(format!("invalid shortname: {}", shortname)));
	}
	Ok(())
}


// vim: ts=4

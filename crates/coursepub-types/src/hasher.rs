//! Hasher format for content-addressing. The version tag is part of the id so the format can change.

use base64::Engine;
use sha2::{Digest, Sha256};

pub enum Hasher {
	V1(Sha256),
}

impl Default for Hasher {
	fn default() -> Self {
		Self::new()
	}
}

impl Hasher {
	pub fn new() -> Self {
		Self::V1(Sha256::new())
	}

	pub fn update(&mut self, data: &[u8]) {
		match self {
			Self::V1(hasher) => hasher.update(data),
		}
	}

	/// Produces `<prefix>1~<base64url(sha256)>`
	pub fn finalize(self, prefix: &str) -> String {
		match self {
			Self::V1(hasher) => {
				prefix.to_string()
					+ "1~" + &base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hasher.finalize())
			}
		}
	}
}

pub fn hash(prefix: &str, data: &[u8]) -> Box<str> {
	let mut hasher = Hasher::new();
	hasher.update(data);
	hasher.finalize(prefix).into()
}

/// Checks that an id has the shape produced by `hash`
pub fn is_valid_id(id: &str) -> bool {
	let Some((tag, digest)) = id.split_once('~') else { return false };
	!tag.is_empty()
		&& tag.chars().all(|c| c.is_ascii_alphanumeric())
		&& digest.len() == 43
		&& digest.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}


// vim: ts=4

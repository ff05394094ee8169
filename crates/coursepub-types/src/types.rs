//! Common types used throughout coursepub.

use serde::{Deserialize, Serialize, Serializer};
use serde_with::skip_serializing_none;
use std::time::SystemTime;

// UserId //
//********//
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

// CourseId //
//**********//
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub i64);

impl std::fmt::Display for CourseId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

// Timestamp //
//***********//
/// Unix timestamp in seconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(res.as_secs() as i64)
	}

	pub fn from_now(delta_secs: i64) -> Timestamp {
		Timestamp(Self::now().0 + delta_secs)
	}

	/// RFC 3339 representation (UTC, second precision)
	pub fn to_iso_string(&self) -> String {
		chrono::DateTime::from_timestamp(self.0, 0)
			.unwrap_or_default()
			.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

pub fn serialize_timestamp_iso<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_str(&ts.to_iso_string())
}

pub fn serialize_timestamp_iso_opt<S>(
	ts: &Option<Timestamp>,
	serializer: S,
) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	match ts {
		Some(ts) => serializer.serialize_str(&ts.to_iso_string()),
		None => serializer.serialize_none(),
	}
}

// ApiResponse //
//*************//
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
	pub offset: usize,
	pub limit: usize,
	pub total: usize,
}

/// Envelope for every successful API response
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
	pub data: T,
	pub pagination: Option<Pagination>,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub time: Timestamp,
	pub req_id: Option<String>,
}

impl<T> ApiResponse<T> {
	pub fn new(data: T) -> Self {
		Self { data, pagination: None, time: Timestamp::now(), req_id: None }
	}

	pub fn with_pagination(data: T, offset: usize, limit: usize, total: usize) -> Self {
		Self {
			data,
			pagination: Some(Pagination { offset, limit, total }),
			time: Timestamp::now(),
			req_id: None,
		}
	}

	pub fn with_req_id(mut self, req_id: String) -> Self {
		if !req_id.is_empty() {
			self.req_id = Some(req_id);
		}
		self
	}
}


// vim: ts=4

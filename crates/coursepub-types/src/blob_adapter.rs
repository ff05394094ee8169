//! Adapter that stores blobs (immutable package data)

use async_trait::async_trait;
use futures_core::Stream;
use std::{fmt::Debug, pin::Pin};

use crate::prelude::*;

pub type BlobStream = Pin<Box<dyn Stream<Item = Result<axum::body::Bytes, std::io::Error>> + Send>>;

#[async_trait]
pub trait BlobAdapter: Debug + Send + Sync {
	/// Creates a new blob from a buffer. Storing an existing blob id is a no-op.
	async fn create_blob_buf(&self, blob_id: &str, data: &[u8]) -> ClResult<()>;

	/// Checks if a blob exists, returns its size
	async fn stat_blob(&self, blob_id: &str) -> Option<u64>;

	async fn read_blob_buf(&self, blob_id: &str) -> ClResult<Box<[u8]>>;

	async fn read_blob_stream(&self, blob_id: &str) -> ClResult<BlobStream>;

	async fn delete_blob(&self, blob_id: &str) -> ClResult<()>;
}

// vim: ts=4

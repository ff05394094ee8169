//! Filesystem blob storage for course packages.
//!
//! Blobs are content addressed (`p1~<hash>`) and sharded into two directory
//! levels taken from the first four hash characters:
//! `<base>/ab/cd/p1~abcd…`. Writes go through a temporary file and a rename,
//! so readers never see a partial package.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use std::{
	fmt::Debug,
	io::ErrorKind,
	path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{
	fs::{File, create_dir_all, metadata, remove_file, rename},
	io::{AsyncReadExt, AsyncWriteExt},
};
use tokio_util::io::ReaderStream;

use coursepub_types::{
	blob_adapter::{BlobAdapter, BlobStream},
	hasher,
	prelude::*,
	utils::random_id,
};

const TMP_DIR: &str = "tmp";

/// Calculates the path of the directory for a blob
fn obj_dir(base_dir: &Path, blob_id: &str) -> ClResult<PathBuf> {
	if !hasher::is_valid_id(blob_id) {
		warn!("Invalid blob id: {:?}", blob_id);
		return Err(Error::Parse);
	}
	let hash_start = blob_id.find('~').ok_or(Error::Parse)? + 1;

	Ok(base_dir
		.join(&blob_id[hash_start..hash_start + 2])
		.join(&blob_id[hash_start + 2..hash_start + 4]))
}

fn obj_file_path(base_dir: &Path, blob_id: &str) -> ClResult<PathBuf> {
	Ok(obj_dir(base_dir, blob_id)?.join(blob_id))
}

fn obj_tmp_file_path(base_dir: &Path) -> PathBuf {
	base_dir.join(TMP_DIR).join(format!("tmp-{}", random_id()))
}

/// Missing files are `NotFound`, anything else stays an I/O error
fn map_io_err(err: std::io::Error) -> Error {
	if err.kind() == ErrorKind::NotFound { Error::NotFound } else { Error::Io(err) }
}

#[derive(Debug)]
pub struct BlobAdapterFs {
	base_dir: Box<Path>,
}

impl BlobAdapterFs {
	pub async fn new(base_dir: Box<Path>) -> ClResult<Self> {
		create_dir_all(base_dir.join(TMP_DIR)).await?;
		Ok(Self { base_dir })
	}
}

#[async_trait]
impl BlobAdapter for BlobAdapterFs {
	async fn create_blob_buf(&self, blob_id: &str, data: &[u8]) -> ClResult<()> {
		let path = obj_file_path(&self.base_dir, blob_id)?;
		if metadata(&path).await.is_ok() {
			debug!("Blob {} already stored", blob_id);
			return Ok(());
		}
		create_dir_all(obj_dir(&self.base_dir, blob_id)?).await?;

		let tmp_path = obj_tmp_file_path(&self.base_dir);
		let res = async {
			let mut file = File::create(&tmp_path).await?;
			file.write_all(data).await?;
			file.sync_all().await?;
			rename(&tmp_path, &path).await?;
			Ok::<(), std::io::Error>(())
		}
		.await;

		if let Err(err) = res {
			warn!("Storing blob {} failed: {}", blob_id, err);
			if let Err(err) = remove_file(&tmp_path).await
				&& err.kind() != ErrorKind::NotFound
			{
				warn!("Cannot remove {:?}: {}", tmp_path, err);
			}
			return Err(Error::Io(err));
		}

		info!("Stored blob {} ({} bytes)", blob_id, data.len());
		Ok(())
	}

	async fn stat_blob(&self, blob_id: &str) -> Option<u64> {
		let path = obj_file_path(&self.base_dir, blob_id).ok()?;
		let file_metadata = metadata(&path).await.ok()?;
		Some(file_metadata.len())
	}

	async fn read_blob_buf(&self, blob_id: &str) -> ClResult<Box<[u8]>> {
		let mut file =
			File::open(obj_file_path(&self.base_dir, blob_id)?).await.map_err(map_io_err)?;
		let mut buf: Vec<u8> = Vec::new();
		file.read_to_end(&mut buf).await?;

		Ok(buf.into_boxed_slice())
	}

	async fn read_blob_stream(&self, blob_id: &str) -> ClResult<BlobStream> {
		let file =
			File::open(obj_file_path(&self.base_dir, blob_id)?).await.map_err(map_io_err)?;
		let stream = ReaderStream::new(file);

		Ok(Box::pin(stream))
	}

	async fn delete_blob(&self, blob_id: &str) -> ClResult<()> {
		remove_file(obj_file_path(&self.base_dir, blob_id)?).await.map_err(map_io_err)?;
		info!("Deleted blob {}", blob_id);
		Ok(())
	}
}


// vim: ts=4

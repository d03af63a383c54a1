//! JSON file token-list storage
//!
//! Each adapter's entry lives in `<dir>/<adapterId>.json` as
//! `{adapterId, data, fetchedAt}`. Writes go to a temporary file first and are
//! renamed into place, so a reader never sees a half-written list.

use async_trait::async_trait;
use bridge_types::{StorageError, StorageResult, TokenListEntry, TokenListStorage};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory-backed storage for token-list entries
#[derive(Debug, Clone)]
pub struct FileStore {
	dir: PathBuf,
}

impl FileStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	fn path_for(&self, adapter_id: &str) -> StorageResult<PathBuf> {
		// adapter ids become file names
		if adapter_id.is_empty()
			|| adapter_id.contains(['/', '\\'])
			|| adapter_id.starts_with('.')
		{
			return Err(StorageError::Operation {
				message: format!("invalid adapter id '{}'", adapter_id),
			});
		}
		Ok(self.dir.join(format!("{}.json", adapter_id)))
	}
}

fn io_error(path: &Path, error: std::io::Error) -> StorageError {
	StorageError::Io {
		path: path.display().to_string(),
		message: error.to_string(),
	}
}

#[async_trait]
impl TokenListStorage for FileStore {
	async fn get(&self, adapter_id: &str) -> StorageResult<Option<TokenListEntry>> {
		let path = self.path_for(adapter_id)?;
		let bytes = match tokio::fs::read(&path).await {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(io_error(&path, e)),
		};

		let entry: TokenListEntry =
			serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization {
				message: format!("{}: {}", path.display(), e),
			})?;
		if entry.adapter_id != adapter_id {
			warn!(
				"Token list file {} belongs to {}, ignoring",
				path.display(),
				entry.adapter_id
			);
			return Ok(None);
		}
		Ok(Some(entry))
	}

	async fn put(&self, entry: &TokenListEntry) -> StorageResult<()> {
		let path = self.path_for(&entry.adapter_id)?;
		tokio::fs::create_dir_all(&self.dir)
			.await
			.map_err(|e| io_error(&self.dir, e))?;

		let json = serde_json::to_vec_pretty(entry).map_err(|e| StorageError::Serialization {
			message: e.to_string(),
		})?;
		let tmp = path.with_extension("json.tmp");
		tokio::fs::write(&tmp, json)
			.await
			.map_err(|e| io_error(&tmp, e))?;
		tokio::fs::rename(&tmp, &path)
			.await
			.map_err(|e| io_error(&path, e))?;

		debug!("Wrote token list for {} to {}", entry.adapter_id, path.display());
		Ok(())
	}

	async fn list(&self) -> StorageResult<Vec<String>> {
		let mut dir = match tokio::fs::read_dir(&self.dir).await {
			Ok(dir) => dir,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(io_error(&self.dir, e)),
		};

		let mut ids = Vec::new();
		while let Some(item) = dir.next_entry().await.map_err(|e| io_error(&self.dir, e))? {
			let path = item.path();
			if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
				continue;
			}
			if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
				ids.push(stem.to_string());
			}
		}
		ids.sort();
		Ok(ids)
	}

	async fn health_check(&self) -> StorageResult<bool> {
		match tokio::fs::metadata(&self.dir).await {
			Ok(meta) => Ok(meta.is_dir()),
			// created on first write
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
			Err(e) => Err(io_error(&self.dir, e)),
		}
	}
}

//! Read-only [`SecretStore`] backed by a JSON object file of named secrets.

// std
use std::{
	fs,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	secrets::{SecretFuture, SecretStore, SecretStoreError},
};

/// Serves secrets from a JSON object file loaded once at open time.
#[derive(Clone, Debug)]
pub struct FileSecretStore {
	path: PathBuf,
	inner: Arc<BTreeMap<String, Value>>,
}
impl FileSecretStore {
	/// Opens the store at `path`, eagerly loading its contents.
	///
	/// A missing or blank file yields an empty store; anything but a JSON object is rejected.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, SecretStoreError> {
		let path = path.into();
		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(snapshot) })
	}

	/// Path the store was loaded from.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<BTreeMap<String, Value>, SecretStoreError> {
		if !path.exists() {
			return Ok(BTreeMap::new());
		}

		let bytes = fs::read(path).map_err(|e| SecretStoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(BTreeMap::new());
		}

		serde_json::from_slice(&bytes).map_err(|e| SecretStoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}
}
impl SecretStore for FileSecretStore {
	fn get_secret<'a>(&'a self, name: &'a str) -> SecretFuture<'a, Value> {
		Box::pin(async move {
			self.inner
				.get(name)
				.cloned()
				.ok_or_else(|| SecretStoreError::NotFound { name: name.to_owned() })
		})
	}
}

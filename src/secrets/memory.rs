//! Thread-safe in-memory [`SecretStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	secrets::{SecretFuture, SecretStore, SecretStoreError},
};

type SecretMap = Arc<RwLock<HashMap<String, Value>>>;

/// Thread-safe secret backend that keeps values in-process.
#[derive(Clone, Debug, Default)]
pub struct MemorySecretStore(SecretMap);
impl MemorySecretStore {
	/// Stores (or replaces) the secret under `name`.
	pub fn insert(&self, name: impl Into<String>, value: Value) {
		self.0.write().insert(name.into(), value);
	}

	/// Removes the secret under `name`, returning it if present.
	pub fn remove(&self, name: &str) -> Option<Value> {
		self.0.write().remove(name)
	}

	fn get_now(map: SecretMap, name: &str) -> Result<Value, SecretStoreError> {
		map.read()
			.get(name)
			.cloned()
			.ok_or_else(|| SecretStoreError::NotFound { name: name.to_owned() })
	}
}
impl<K> FromIterator<(K, Value)> for MemorySecretStore
where
	K: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
		let map = iter.into_iter().map(|(name, value)| (name.into(), value)).collect();

		Self(Arc::new(RwLock::new(map)))
	}
}
impl SecretStore for MemorySecretStore {
	fn get_secret<'a>(&'a self, name: &'a str) -> SecretFuture<'a, Value> {
		let map = self.0.clone();

		Box::pin(async move { Self::get_now(map, name) })
	}
}

//! Secret lookup contracts and built-in secret stores used to source client credentials.
//!
//! The client never talks to a secret store on its own; callers resolve a named secret into
//! [`ClientCredentials`] and hand them to [`ClientConfigBuilder::credentials`].
//!
//! [`ClientConfigBuilder::credentials`]: crate::config::ClientConfigBuilder::credentials

pub mod file;
pub mod memory;

pub use file::FileSecretStore;
pub use memory::MemorySecretStore;

// self
use crate::{_prelude::*, auth::Secret};

/// Boxed future returned by [`SecretStore`] lookups.
pub type SecretFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, SecretStoreError>> + 'a + Send>>;

/// Key-value secret backend returning parsed JSON values.
pub trait SecretStore
where
	Self: Send + Sync,
{
	/// Fetches the secret stored under `name`.
	fn get_secret<'a>(&'a self, name: &'a str) -> SecretFuture<'a, Value>;
}

/// Error type produced by [`SecretStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum SecretStoreError {
	/// No secret exists under the requested name.
	#[error("Secret `{name}` not found.")]
	NotFound {
		/// Requested secret name.
		name: String,
	},
	/// The secret exists but does not have the expected shape.
	#[error("Secret `{name}` is malformed: {message}.")]
	Malformed {
		/// Requested secret name.
		name: String,
		/// Human-readable error payload.
		message: String,
	},
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Client id and secret pair resolved from a secret store.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ClientCredentials {
	/// OAuth 2.0 client identifier.
	#[serde(alias = "clientId")]
	pub client_id: String,
	/// OAuth 2.0 client secret.
	#[serde(alias = "clientSecret")]
	pub client_secret: Secret,
}
impl ClientCredentials {
	/// Creates credentials from raw parts.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret>) -> Self {
		Self { client_id: client_id.into(), client_secret: client_secret.into() }
	}

	/// Parses credentials out of a secret value.
	///
	/// Accepts an object with `clientId`/`clientSecret` (or snake_case) keys, or a string holding
	/// such an object as JSON text.
	pub fn from_secret(name: &str, value: &Value) -> Result<Self, SecretStoreError> {
		let malformed =
			|message: String| SecretStoreError::Malformed { name: name.to_owned(), message };
		let parsed = match value {
			Value::String(text) => serde_json::from_str(text),
			other => serde_json::from_value(other.clone()),
		};

		parsed.map_err(|e| malformed(e.to_string()))
	}

	/// Looks up `name` in `store` and parses the credentials it holds.
	pub async fn load(store: &dyn SecretStore, name: &str) -> Result<Self, SecretStoreError> {
		let value = store.get_secret(name).await?;

		Self::from_secret(name, &value)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn parses_camel_and_snake_case_objects() {
		let camel = serde_json::json!({ "clientId": "c", "clientSecret": "s" });
		let snake = serde_json::json!({ "client_id": "c", "client_secret": "s" });

		for value in [camel, snake] {
			let credentials = ClientCredentials::from_secret("svc", &value)
				.expect("Credential object should parse.");

			assert_eq!(credentials, ClientCredentials::new("c", "s"));
		}
	}

	#[test]
	fn parses_json_text_secrets() {
		let value = Value::String(r#"{"clientId":"c","clientSecret":"s"}"#.into());
		let credentials =
			ClientCredentials::from_secret("svc", &value).expect("Secret string should parse.");

		assert_eq!(credentials.client_secret.expose(), "s");
	}

	#[test]
	fn malformed_secret_names_the_secret() {
		let err = ClientCredentials::from_secret("svc", &serde_json::json!({ "clientId": "c" }))
			.expect_err("Missing secret field should be rejected.");

		assert!(matches!(&err, SecretStoreError::Malformed { name, .. } if name == "svc"));
	}

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = SecretStoreError::Backend { message: "vault unreachable".into() };
		let client_error: Error = store_error.clone().into();

		assert!(matches!(client_error, Error::Secret(_)));
		assert!(client_error.to_string().contains("vault unreachable"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}

//! Immutable client configuration and its serde surface.
//!
//! A [`ClientConfig`] is produced once, either through [`ClientConfig::builder`] or by
//! deserializing the camelCase configuration object (`apiEndpoint`, `tenantId`, `clientId`,
//! `clientSecret`, `scope`, and the optional `authority`, `timeout`, `retries`, `retryDelay`
//! keys, with durations in milliseconds). Both paths run the same validation.

pub mod builder;

pub use builder::*;

// self
use crate::{
	_prelude::*,
	auth::{Secret, TenantId},
	error::ConfigError,
};

/// Authority used to derive the token endpoint when none is configured.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
/// Base delay between retries; the n-th retry waits `n` times this value.
pub const DEFAULT_RETRY_DELAY: StdDuration = StdDuration::from_millis(1_000);

/// Validated, immutable configuration shared by the token manager and executor.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "RawClientConfig")]
pub struct ClientConfig {
	/// Base URL every request path is appended to.
	pub api_endpoint: Url,
	/// Directory tenant the token endpoint is derived from.
	pub tenant_id: TenantId,
	/// Token endpoint (`{authority}/{tenant}/oauth2/v2.0/token`).
	pub token_endpoint: Url,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret; never logged.
	pub client_secret: Secret,
	/// Scope requested with every token (e.g. `api://resource/.default`).
	pub scope: String,
	/// Upper bound for each individual HTTP call; `None` waits indefinitely.
	pub timeout: Option<StdDuration>,
	/// Number of retries after the initial attempt.
	pub retries: u32,
	/// Base delay for linear retry backoff.
	pub retry_delay: StdDuration,
}
impl ClientConfig {
	/// Creates a new builder.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Joins the configured endpoint and a request path.
	///
	/// The path is appended verbatim; a separating `/` is inserted only when the path does not
	/// start with one (or with a query string).
	pub fn request_url(&self, path: &str) -> Result<Url, ConfigError> {
		let base = self.api_endpoint.as_str().trim_end_matches('/');
		let raw = if path.is_empty() || path.starts_with('/') || path.starts_with('?') {
			format!("{base}{path}")
		} else {
			format!("{base}/{path}")
		};

		Url::parse(&raw).map_err(|source| ConfigError::InvalidRequestUrl { url: raw, source })
	}
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClientConfig {
	api_endpoint: String,
	tenant_id: String,
	client_id: String,
	client_secret: Secret,
	scope: String,
	#[serde(default)]
	authority: Option<String>,
	#[serde(default)]
	timeout: Option<u64>,
	#[serde(default)]
	retries: Option<u32>,
	#[serde(default)]
	retry_delay: Option<u64>,
}
impl TryFrom<RawClientConfig> for ClientConfig {
	type Error = ClientConfigError;

	fn try_from(raw: RawClientConfig) -> Result<Self, Self::Error> {
		let mut builder = ClientConfig::builder()
			.api_endpoint(raw.api_endpoint)
			.tenant_id(raw.tenant_id)
			.client_id(raw.client_id)
			.client_secret(raw.client_secret)
			.scope(raw.scope)
			.retries(raw.retries.unwrap_or_default());

		if let Some(authority) = raw.authority {
			builder = builder.authority(authority);
		}
		if let Some(millis) = raw.timeout {
			builder = builder.timeout(StdDuration::from_millis(millis));
		}
		if let Some(millis) = raw.retry_delay {
			builder = builder.retry_delay(StdDuration::from_millis(millis));
		}

		builder.build()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config(endpoint: &str) -> ClientConfig {
		ClientConfig::builder()
			.api_endpoint(endpoint)
			.tenant_id("t")
			.client_id("c")
			.client_secret("s")
			.scope("sc")
			.build()
			.expect("Fixture configuration should be valid.")
	}

	#[test]
	fn request_url_appends_path() {
		let config = config("https://x");

		for path in ["/test", "test"] {
			let url = config.request_url(path).expect("Request URL should build.");

			assert_eq!(url.as_str(), "https://x/test");
		}
	}

	#[test]
	fn request_url_keeps_base_path() {
		let config = config("https://api.example.com/v1/");

		assert_eq!(
			config.request_url("/items?top=5").expect("URL should build.").as_str(),
			"https://api.example.com/v1/items?top=5"
		);
	}

	#[test]
	fn deserializes_camel_case_surface() {
		let config: ClientConfig = serde_json::from_value(serde_json::json!({
			"apiEndpoint": "https://x",
			"tenantId": "t",
			"clientId": "c",
			"clientSecret": "s",
			"scope": "sc",
			"timeout": 2500,
			"retries": 1
		}))
		.expect("Configuration object should deserialize.");

		assert_eq!(
			config.token_endpoint.as_str(),
			"https://login.microsoftonline.com/t/oauth2/v2.0/token"
		);
		assert_eq!(config.timeout, Some(StdDuration::from_millis(2_500)));
		assert_eq!(config.retries, 1);
		assert_eq!(config.retry_delay, DEFAULT_RETRY_DELAY);
		assert_eq!(config.client_secret.expose(), "s");
	}

	#[test]
	fn deserialization_runs_builder_validation() {
		let err = serde_json::from_value::<ClientConfig>(serde_json::json!({
			"apiEndpoint": "http://api.example.com",
			"tenantId": "t",
			"clientId": "c",
			"clientSecret": "s",
			"scope": "sc"
		}))
		.expect_err("Plain HTTP endpoints should be rejected.");

		assert!(err.to_string().contains("must use HTTPS"));
	}

	#[test]
	fn debug_output_redacts_secret() {
		let rendered = format!("{:?}", config("https://x"));

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("client_secret: Secret(\"s\")"));
	}
}

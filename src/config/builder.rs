//! Validating builder for [`ClientConfig`].

// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, Secret, TenantId},
	config::{ClientConfig, DEFAULT_AUTHORITY, DEFAULT_RETRY_DELAY},
	secrets::ClientCredentials,
};

/// Errors raised while constructing or validating a [`ClientConfig`].
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ClientConfigError {
	/// A required field was not supplied (or was blank).
	#[error("Missing required configuration field `{field}`.")]
	MissingField {
		/// Name of the missing field.
		field: &'static str,
	},
	/// An endpoint could not be parsed as an absolute URL.
	#[error("The {endpoint} endpoint `{url}` is not a valid URL.")]
	InvalidUrl {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Raw value that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Tenant identifier failed validation.
	#[error(transparent)]
	InvalidTenant(#[from] IdentifierError),
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
	api_endpoint: Option<String>,
	tenant_id: Option<String>,
	authority: Option<String>,
	client_id: Option<String>,
	client_secret: Option<Secret>,
	scope: Option<String>,
	timeout: Option<StdDuration>,
	retries: u32,
	retry_delay: Option<StdDuration>,
}
impl ClientConfigBuilder {
	/// Sets the API base URL.
	pub fn api_endpoint(mut self, url: impl Into<String>) -> Self {
		self.api_endpoint = Some(url.into());

		self
	}

	/// Sets the directory tenant.
	pub fn tenant_id(mut self, tenant: impl Into<String>) -> Self {
		self.tenant_id = Some(tenant.into());

		self
	}

	/// Overrides the authority the token endpoint is derived from (defaults to
	/// [`DEFAULT_AUTHORITY`]).
	pub fn authority(mut self, authority: impl Into<String>) -> Self {
		self.authority = Some(authority.into());

		self
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<Secret>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Sets client id and secret from credentials loaded out of a secret store.
	pub fn credentials(self, credentials: ClientCredentials) -> Self {
		self.client_id(credentials.client_id).client_secret(credentials.client_secret)
	}

	/// Sets the scope requested with every token.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Bounds every individual HTTP call.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Sets how many times a transient failure is retried (defaults to 0).
	pub fn retries(mut self, retries: u32) -> Self {
		self.retries = retries;

		self
	}

	/// Overrides the base delay of the linear retry backoff (defaults to one second).
	pub fn retry_delay(mut self, delay: StdDuration) -> Self {
		self.retry_delay = Some(delay);

		self
	}

	/// Validates the inputs and produces a [`ClientConfig`].
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		let api_endpoint = require("api_endpoint", self.api_endpoint)?;
		let api_endpoint = validate_endpoint("api", &api_endpoint)?;
		let tenant_id = TenantId::new(require("tenant_id", self.tenant_id)?)?;
		let client_id = require("client_id", self.client_id)?;
		let client_secret = self
			.client_secret
			.filter(|secret| !secret.is_empty())
			.ok_or(ClientConfigError::MissingField { field: "client_secret" })?;
		let scope = require("scope", self.scope)?;
		let authority = self.authority.unwrap_or_else(|| DEFAULT_AUTHORITY.to_owned());
		let token_endpoint = validate_endpoint(
			"token",
			&format!("{}/{tenant_id}/oauth2/v2.0/token", authority.trim_end_matches('/')),
		)?;

		Ok(ClientConfig {
			api_endpoint,
			tenant_id,
			token_endpoint,
			client_id,
			client_secret,
			scope,
			timeout: self.timeout,
			retries: self.retries,
			retry_delay: self.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY),
		})
	}
}

fn require(field: &'static str, value: Option<String>) -> Result<String, ClientConfigError> {
	value
		.map(|value| value.trim().to_owned())
		.filter(|value| !value.is_empty())
		.ok_or(ClientConfigError::MissingField { field })
}

fn validate_endpoint(endpoint: &'static str, raw: &str) -> Result<Url, ClientConfigError> {
	let url = Url::parse(raw).map_err(|source| ClientConfigError::InvalidUrl {
		endpoint,
		url: raw.to_owned(),
		source,
	})?;

	match url.scheme() {
		"https" => Ok(url),
		"http" if is_loopback(&url) => Ok(url),
		_ => Err(ClientConfigError::InsecureEndpoint { endpoint, url: raw.to_owned() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}

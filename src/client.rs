//! Authenticated request executor.
//!
//! [`ApiClient`] attaches the cached bearer token to every request, classifies the response,
//! and resubmits transient failures through a bounded [`RetryPolicy`]. A rejected token (HTTP
//! 401) makes the next attempt bypass the cache so the resubmission carries a fresh token; a
//! second rejection within the same call is returned to the caller.

pub mod retry;

mod classify;

pub use retry::*;

// self
use crate::{
	_prelude::*,
	auth::Secret,
	config::ClientConfig,
	error::ConfigError,
	http::{self, HttpTransport, Method, TransportRequest},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::TokenManager,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// [`ApiClient`] backed by the default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Per-call request description.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
	/// HTTP method; defaults to `GET`.
	#[serde(default)]
	pub method: Method,
	/// Path appended to the configured API endpoint.
	pub path: String,
	/// Extra headers; names are matched case-insensitively.
	#[serde(default)]
	pub headers: BTreeMap<String, String>,
	/// JSON body sent with the request.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub body: Option<Value>,
}
impl RequestOptions {
	/// Creates options for `method` against `path`.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), ..Default::default() }
	}

	/// Adds a header; `authorization` is ignored because the client always sets it.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Sets the JSON body.
	pub fn with_body(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Serializes `body` into the JSON body.
	pub fn with_json<B>(self, body: &B) -> Result<Self>
	where
		B: ?Sized + Serialize,
	{
		let body = serde_json::to_value(body).map_err(ConfigError::InvalidRequestBody)?;

		Ok(self.with_body(body))
	}
}

/// Authenticated JSON API client for one endpoint and one set of client credentials.
pub struct ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	config: Arc<ClientConfig>,
	transport: Arc<T>,
	tokens: TokenManager<T>,
	retry: RetryPolicy,
}
impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client that sends every token and API call through `transport`.
	pub fn with_transport(config: ClientConfig, transport: impl Into<Arc<T>>) -> Self {
		let config = Arc::new(config);
		let transport = transport.into();
		let tokens = TokenManager::new(config.clone(), transport.clone());
		let retry = RetryPolicy::from_config(&config);

		Self { config, transport, tokens, retry }
	}

	/// Returns the configuration the client was built with.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Returns the token manager shared by every call on this client.
	pub fn tokens(&self) -> &TokenManager<T> {
		&self.tokens
	}

	/// Sends the request and returns the decoded JSON body.
	///
	/// Transient failures are resubmitted up to the configured retry budget; once the budget is
	/// spent the last observed error is returned.
	pub async fn execute(&self, options: RequestOptions) -> Result<Value> {
		const KIND: FlowKind = FlowKind::ApiRequest;

		let span = FlowSpan::new(KIND, "execute");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.execute_with_retries(&options)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(err) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				obs::log_flow_failure(KIND, err);
			},
		}

		result
	}

	/// Sends the request and deserializes the JSON body into `R`.
	pub async fn execute_as<R>(&self, options: RequestOptions) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let url = self.config.request_url(&options.path)?;
		let value = self.execute(options).await?;

		serde_path_to_error::deserialize(value)
			.map_err(|source| Error::InvalidResponse { url: url.to_string(), source })
	}

	/// Sends a `GET` request to `path`.
	pub async fn get(&self, path: impl Into<String>) -> Result<Value> {
		self.execute(RequestOptions::new(Method::Get, path)).await
	}

	/// Sends a `POST` request to `path` with a JSON body.
	pub async fn post(&self, path: impl Into<String>, body: Value) -> Result<Value> {
		self.execute(RequestOptions::new(Method::Post, path).with_body(body)).await
	}

	/// Sends a `PUT` request to `path` with a JSON body.
	pub async fn put(&self, path: impl Into<String>, body: Value) -> Result<Value> {
		self.execute(RequestOptions::new(Method::Put, path).with_body(body)).await
	}

	/// Sends a `DELETE` request to `path`.
	pub async fn delete(&self, path: impl Into<String>) -> Result<Value> {
		self.execute(RequestOptions::new(Method::Delete, path)).await
	}

	async fn execute_with_retries(&self, options: &RequestOptions) -> Result<Value> {
		let mut retries_used = 0;
		// Set by a 401 and cleared only once a replacement token has been obtained.
		let mut refresh_pending = false;
		let mut rejection_seen = false;

		loop {
			let result = match self.token(refresh_pending).await {
				Ok(token) => {
					refresh_pending = false;

					self.send(options, &token).await
				},
				Err(err) => Err(err),
			};
			let err = match result {
				Ok(value) => return Ok(value),
				Err(err) => err,
			};

			// One refresh per call; a second rejection is final.
			if err.requires_token_refresh() && rejection_seen {
				return Err(err);
			}
			if !self.retry.should_retry(&err, retries_used) {
				return Err(err);
			}
			if err.requires_token_refresh() {
				refresh_pending = true;
				rejection_seen = true;
			}

			retries_used += 1;

			let delay = self.retry.delay_for(retries_used);

			obs::record_flow_outcome(FlowKind::ApiRequest, FlowOutcome::Retry);
			obs::log_retry(retries_used, delay, &err);

			if !delay.is_zero() {
				tokio::time::sleep(delay).await;
			}
		}
	}

	async fn token(&self, force_refresh: bool) -> Result<Secret> {
		if force_refresh {
			self.tokens.force_refresh().await
		} else {
			self.tokens.get_valid_token().await
		}
	}

	async fn send(&self, options: &RequestOptions, token: &Secret) -> Result<Value> {
		let url = self.config.request_url(&options.path)?;
		let mut request = TransportRequest::new(options.method, url.clone())
			.with_header("content-type", "application/json")
			.with_header("accept", "application/json");

		for (name, value) in &options.headers {
			if !name.eq_ignore_ascii_case("authorization") {
				request = request.with_header(name, value.as_str());
			}
		}

		request = request.with_header("authorization", token.bearer());

		if let Some(body) = &options.body {
			let body = serde_json::to_vec(body).map_err(ConfigError::InvalidRequestBody)?;

			request = request.with_body(body);
		}

		let response =
			http::send_with_timeout(self.transport.as_ref(), request, self.config.timeout)
				.await
				.map_err(|source| Error::Network { url: url.to_string(), source })?;

		classify::classify_response(&url, &response)
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client backed by a default reqwest client.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Ok(Self::with_transport(config, ReqwestTransport::with_client(client)))
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("api_endpoint", &self.config.api_endpoint.as_str())
			.field("retry", &self.retry)
			.field("tokens", &self.tokens)
			.finish()
	}
}

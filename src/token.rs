//! Client-credentials token acquisition with caching + single-flight refreshes.
//!
//! [`TokenManager`] hands out the cached bearer token while it is valid and only calls the
//! token endpoint when the cache is empty, expired, or explicitly bypassed. Refreshes are
//! serialized by an async guard: callers that queue up behind an in-flight refresh re-check
//! the cache once they acquire the guard and piggy-back on the fresh token instead of
//! stampeding the token endpoint. The cache is only written after a fully successful token
//! response, so a cancelled or failed refresh leaves the previous state untouched.

pub mod cached;

mod response;

pub use cached::*;

// self
use crate::{
	_prelude::*,
	auth::Secret,
	config::ClientConfig,
	http::{self, HttpTransport, Method, TransportRequest},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

#[derive(Debug, Default)]
struct TokenState {
	token: Option<CachedToken>,
	// Bumped on every successful refresh so queued force-refreshes can detect a newer token.
	generation: u64,
}

/// Acquires and caches one bearer token for a single client configuration.
pub struct TokenManager<T>
where
	T: ?Sized + HttpTransport,
{
	config: Arc<ClientConfig>,
	transport: Arc<T>,
	state: RwLock<TokenState>,
	refresh_guard: AsyncMutex<()>,
}
impl<T> TokenManager<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a manager with an empty cache.
	pub fn new(config: impl Into<Arc<ClientConfig>>, transport: impl Into<Arc<T>>) -> Self {
		Self {
			config: config.into(),
			transport: transport.into(),
			state: Default::default(),
			refresh_guard: AsyncMutex::new(()),
		}
	}

	/// Returns the cached token if still valid, refreshing it otherwise.
	pub async fn get_valid_token(&self) -> Result<Secret> {
		if let Some(token) = self.valid_token(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let _singleflight = self.refresh_guard.lock().await;

		if let Some(token) = self.valid_token(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		self.refresh_locked().await
	}

	/// Fetches a new token regardless of the cached one.
	///
	/// When another caller completed a refresh while this one waited for the guard, that token
	/// is returned instead of issuing a second request.
	pub async fn force_refresh(&self) -> Result<Secret> {
		let observed = self.state.read().generation;
		let _singleflight = self.refresh_guard.lock().await;

		{
			let state = self.state.read();
			let now = OffsetDateTime::now_utc();
			let fresh = state.token.as_ref().filter(|token| token.is_valid_at(now));

			if let Some(token) = fresh.filter(|_| state.generation != observed) {
				return Ok(token.access_token.clone());
			}
		}

		self.refresh_locked().await
	}

	/// Returns a snapshot of the cached token, valid or not.
	pub fn cached(&self) -> Option<CachedToken> {
		self.state.read().token.clone()
	}

	/// Drops the cached token so the next call refreshes.
	pub fn invalidate(&self) {
		self.state.write().token = None;
	}

	fn valid_token(&self, now: OffsetDateTime) -> Option<Secret> {
		self.state
			.read()
			.token
			.as_ref()
			.filter(|token| token.is_valid_at(now))
			.map(|token| token.access_token.clone())
	}

	// Callers must hold `refresh_guard`.
	async fn refresh_locked(&self) -> Result<Secret> {
		const KIND: FlowKind = FlowKind::TokenRefresh;

		let span = FlowSpan::new(KIND, "refresh");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.request_token()).await;

		match &result {
			Ok(token) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
				obs::log_token_refreshed(token.expires_at);
			},
			Err(err) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				obs::log_flow_failure(KIND, err);
			},
		}

		let token = result?;
		let secret = token.access_token.clone();
		let mut state = self.state.write();

		state.token = Some(token);
		state.generation = state.generation.wrapping_add(1);

		Ok(secret)
	}

	async fn request_token(&self) -> Result<CachedToken> {
		let config = self.config.as_ref();
		let endpoint = &config.token_endpoint;
		let form = url::form_urlencoded::Serializer::new(String::new())
			.append_pair("grant_type", "client_credentials")
			.append_pair("client_id", &config.client_id)
			.append_pair("client_secret", config.client_secret.expose())
			.append_pair("scope", &config.scope)
			.finish();
		let request = TransportRequest::new(Method::Post, endpoint.clone())
			.with_header("content-type", "application/x-www-form-urlencoded")
			.with_header("accept", "application/json")
			.with_body(form);
		let response = http::send_with_timeout(self.transport.as_ref(), request, config.timeout)
			.await
			.map_err(|source| Error::Network { url: endpoint.to_string(), source })?;

		if !response.is_success() {
			return Err(Error::Api {
				status: response.status,
				url: endpoint.to_string(),
				message: response.error_message(),
			});
		}

		Ok(response::parse_token_response(&response.body, OffsetDateTime::now_utc())?)
	}
}
impl<T> Debug for TokenManager<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("token_endpoint", &self.config.token_endpoint.as_str())
			.field("client_id", &self.config.client_id)
			.field("cached", &self.state.read().token)
			.finish()
	}
}

#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	sync::atomic::{AtomicUsize, Ordering},
	time::Duration as StdDuration,
};
// crates.io
use parking_lot::Mutex;
use serde_json::Value;
// self
use oauth2_api_client::{
	ClientConfig,
	error::TransportError,
	http::{HttpTransport, TransportFuture, TransportRequest, TransportResponse},
};

pub const TOKEN_PATH: &str = "/tenant-it/oauth2/v2.0/token";

/// One scripted reaction of [`ScriptedTransport`].
#[derive(Clone, Debug)]
pub enum Step {
	/// Responds with `access_token = "tok{n}"` where `n` counts token calls.
	Token { expires_in: i64 },
	/// Responds with the given status and JSON body.
	Json(u16, Value),
	/// Responds with the given status and raw body.
	Text(u16, &'static str),
	/// Fails before any response arrives.
	Fail,
	/// Never completes on its own.
	Stall,
}

#[derive(Debug, Default)]
struct Script {
	steps: Mutex<VecDeque<Step>>,
	calls: AtomicUsize,
	requests: Mutex<Vec<TransportRequest>>,
}
impl Script {
	// The final step repeats once the queue is drained.
	fn next(&self, request: TransportRequest) -> (usize, Step) {
		let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
		let mut steps = self.steps.lock();
		let step = if steps.len() > 1 { steps.pop_front() } else { steps.front().cloned() };

		self.requests.lock().push(request);

		(call, step.unwrap_or(Step::Text(599, "script exhausted")))
	}
}

/// Test transport with separate scripts for the token endpoint and the API endpoint.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
	token: Script,
	api: Script,
}
impl ScriptedTransport {
	pub fn new(token: impl IntoIterator<Item = Step>, api: impl IntoIterator<Item = Step>) -> Self {
		let transport = Self::default();

		transport.token.steps.lock().extend(token);
		transport.api.steps.lock().extend(api);

		transport
	}

	pub fn token_calls(&self) -> usize {
		self.token.calls.load(Ordering::SeqCst)
	}

	pub fn api_calls(&self) -> usize {
		self.api.calls.load(Ordering::SeqCst)
	}

	pub fn api_requests(&self) -> Vec<TransportRequest> {
		self.api.requests.lock().clone()
	}

	pub fn token_requests(&self) -> Vec<TransportRequest> {
		self.token.requests.lock().clone()
	}
}
impl HttpTransport for ScriptedTransport {
	fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
		let (call, step) = if request.url.path() == TOKEN_PATH {
			self.token.next(request)
		} else {
			self.api.next(request)
		};

		Box::pin(async move {
			match step {
				Step::Token { expires_in } => Ok(TransportResponse::json_body(
					200,
					&serde_json::json!({
						"token_type": "Bearer",
						"access_token": format!("tok{call}"),
						"expires_in": expires_in,
					}),
				)),
				Step::Json(status, body) => Ok(TransportResponse::json_body(status, &body)),
				Step::Text(status, body) => Ok(TransportResponse::new(status, body)),
				Step::Fail => Err(TransportError::Io(std::io::Error::other("connection reset"))),
				Step::Stall => {
					tokio::time::sleep(StdDuration::from_secs(3_600)).await;

					Ok(TransportResponse::new(200, "{}"))
				},
			}
		})
	}
}

/// Configuration pointing at fake hosts with the given retry budget and no backoff.
pub fn scripted_config(retries: u32) -> ClientConfig {
	ClientConfig::builder()
		.api_endpoint("https://api.test")
		.authority("https://login.test")
		.tenant_id("tenant-it")
		.client_id("client-it")
		.client_secret("secret-it")
		.scope("api://resource/.default")
		.retries(retries)
		.retry_delay(StdDuration::ZERO)
		.build()
		.expect("Scripted configuration should be valid.")
}

/// Configuration pointing both endpoints at a local mock server.
pub fn mock_config(base_url: &str, retries: u32) -> ClientConfig {
	ClientConfig::builder()
		.api_endpoint(base_url)
		.authority(base_url)
		.tenant_id("tenant-it")
		.client_id("client-it")
		.client_secret("secret-it")
		.scope("api://resource/.default")
		.retries(retries)
		.retry_delay(StdDuration::from_millis(10))
		.build()
		.expect("Mock server configuration should be valid.")
}

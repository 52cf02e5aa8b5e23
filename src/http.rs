//! Transport primitives for token and API requests.
//!
//! The module exposes [`HttpTransport`] alongside the crate-owned [`TransportRequest`] and
//! [`TransportResponse`] types so downstream crates can plug in custom HTTP clients (or test
//! doubles) without the client ever depending on a specific HTTP stack. Non-success statuses
//! are ordinary responses; only failures that prevent a response from arriving surface as
//! [`TransportError`].

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing a single request.
///
/// The trait acts as the client's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so one transport can be shared between the token manager and the
/// executor behind an `Arc`. Timeouts are enforced by the caller, so implementations may
/// leave them unset.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves once the full response body is available.
	fn send(&self, request: TransportRequest) -> TransportFuture<'_>;
}

/// HTTP methods accepted by the client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	#[default]
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical request-line token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

/// Fully assembled outbound request.
///
/// Header names are stored lower-cased so lookups and overrides are case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Lower-cased header names mapped to their values.
	pub headers: BTreeMap<String, String>,
	/// Raw request body, if any.
	pub body: Option<Vec<u8>>,
}
impl TransportRequest {
	/// Creates a request without headers or body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: BTreeMap::new(), body: None }
	}

	/// Sets (or replaces) a header; the name is lower-cased.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Attaches a raw body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Looks up a header case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}
}

/// Response returned by a transport, regardless of status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Lower-cased header names mapped to their values.
	pub headers: BTreeMap<String, String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl TransportResponse {
	/// Creates a response with the given status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: BTreeMap::new(), body: body.into() }
	}

	/// Creates a JSON response from a [`Value`].
	pub fn json_body(status: u16, value: &Value) -> Self {
		Self::new(status, value.to_string()).with_header("content-type", "application/json")
	}

	/// Sets (or replaces) a header; the name is lower-cased.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns the body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as JSON, reporting the path of the first mismatch.
	pub fn json<T>(&self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(&self.body))
	}

	/// Extracts a human-readable message from an error body.
	///
	/// Recognizes `{"error": {"message": ..}}`, `{"error_description": ..}`,
	/// `{"error": ".."}`, and `{"message": ..}`. Bodies that are not JSON, or carry none of those
	/// fields, degrade to the raw text.
	pub fn error_message(&self) -> String {
		let text = self.text();
		let Ok(value) = serde_json::from_str::<Value>(&text) else {
			return text;
		};
		let candidates = [
			value.pointer("/error/message"),
			value.get("error_description"),
			value.get("error"),
			value.get("message"),
		];

		candidates
			.into_iter()
			.flatten()
			.find_map(|candidate| candidate.as_str().map(str::to_owned))
			.unwrap_or(text)
	}
}

/// Sends `request`, aborting the in-flight call once `timeout` elapses.
pub(crate) async fn send_with_timeout<T>(
	transport: &T,
	request: TransportRequest,
	timeout: Option<StdDuration>,
) -> Result<TransportResponse, TransportError>
where
	T: ?Sized + HttpTransport,
{
	match timeout {
		Some(limit) => tokio::time::timeout(limit, transport.send(request))
			.await
			.map_err(|_| TransportError::Timeout)?,
		None => transport.send(request).await,
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Redirects are followed according to the wrapped client's policy; token endpoints never
/// redirect in practice, so the default client is fine for both token and API calls.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let TransportRequest { method, url, headers, body } = request;
			let mut builder = client.request(method.into(), url);

			for (name, value) in &headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
				})
				.collect();
			let body = response.bytes().await?.to_vec();

			Ok(TransportResponse { status, headers, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	struct StalledTransport;
	impl HttpTransport for StalledTransport {
		fn send(&self, _request: TransportRequest) -> TransportFuture<'_> {
			Box::pin(async {
				tokio::time::sleep(StdDuration::from_secs(30)).await;

				Ok(TransportResponse::new(200, "{}"))
			})
		}
	}

	fn response(body: &str) -> TransportResponse {
		TransportResponse::new(500, body)
	}

	#[test]
	fn error_message_prefers_structured_fields() {
		assert_eq!(response(r#"{"error":{"code":"E1","message":"boom"}}"#).error_message(), "boom");
		assert_eq!(
			response(r#"{"error":"invalid_client","error_description":"AADSTS7000215"}"#)
				.error_message(),
			"AADSTS7000215"
		);
		assert_eq!(response(r#"{"error":"jwt expired"}"#).error_message(), "jwt expired");
		assert_eq!(response(r#"{"message":"nope"}"#).error_message(), "nope");
	}

	#[test]
	fn error_message_degrades_to_raw_text() {
		let html = "<html>Bad Gateway</html>";

		assert_eq!(response(html).error_message(), html);
		assert_eq!(response(r#"{"status":500}"#).error_message(), r#"{"status":500}"#);
		assert_eq!(response("").error_message(), "");
	}

	#[test]
	fn request_headers_are_case_insensitive() {
		let url = Url::parse("https://api.example.com/items").expect("Fixture URL should parse.");
		let request = TransportRequest::new(Method::Get, url)
			.with_header("Content-Type", "text/plain")
			.with_header("content-type", "application/json");

		assert_eq!(request.headers.len(), 1);
		assert_eq!(request.header("CONTENT-TYPE"), Some("application/json"));
	}

	#[test]
	fn method_serializes_uppercase() {
		let payload = serde_json::to_string(&Method::Delete).expect("Method should serialize.");

		assert_eq!(payload, "\"DELETE\"");
		assert_eq!(Method::default(), Method::Get);
		assert_eq!(Method::Put.to_string(), "PUT");
	}

	#[tokio::test]
	async fn timeout_aborts_in_flight_call() {
		let url = Url::parse("https://api.example.com/slow").expect("Fixture URL should parse.");
		let err = send_with_timeout(
			&StalledTransport,
			TransportRequest::new(Method::Get, url),
			Some(StdDuration::from_millis(20)),
		)
		.await
		.expect_err("Stalled transport should time out.");

		assert!(matches!(err, TransportError::Timeout));
	}
}

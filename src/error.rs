//! Client-level error types shared by the token manager, executor, and secret stores.

// self
use crate::{_prelude::*, config::ClientConfigError, secrets::SecretStoreError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// Every variant that stems from an outbound call carries the URL that failed so callers can
/// tell the token endpoint apart from the API endpoint.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem or malformed token endpoint response.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Secret store lookup failed while sourcing credentials.
	#[error("{0}")]
	Secret(
		#[from]
		#[source]
		SecretStoreError,
	),
	/// Transport failure (DNS, TCP, TLS, timeout) before any response arrived.
	#[error("API call to {url} did not complete: {source}")]
	Network {
		/// URL of the request that failed.
		url: String,
		/// Transport-level cause.
		#[source]
		source: TransportError,
	},
	/// Upstream rejected the bearer token (HTTP 401).
	#[error("Token expired while making API call to {url}: {message}.")]
	TokenExpired {
		/// URL of the request that failed.
		url: String,
		/// Upstream-supplied message.
		message: String,
	},
	/// Upstream denied access to the resource (HTTP 403).
	#[error("API call to {url} was denied: {message}.")]
	AccessDenied {
		/// URL of the request that failed.
		url: String,
		/// Upstream-supplied message.
		message: String,
	},
	/// Any other non-success status, including token endpoint rejections.
	#[error("API call to {url} failed with status {status}: {message}.")]
	Api {
		/// HTTP status code returned by the upstream.
		status: u16,
		/// URL of the request that failed.
		url: String,
		/// Upstream-supplied message, or the raw body when it carried no message field.
		message: String,
	},
	/// A success response carried a body that could not be decoded.
	#[error("API call to {url} returned a body that could not be decoded.")]
	InvalidResponse {
		/// URL of the request whose body failed to decode.
		url: String,
		/// Structured decoding failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	/// Returns the coarse classification of this error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Config(_) | Self::Secret(_) => ErrorKind::Config,
			Self::Network { .. } => ErrorKind::Network,
			Self::TokenExpired { .. } => ErrorKind::TokenExpired,
			Self::AccessDenied { .. } => ErrorKind::AccessDenied,
			Self::Api { .. } | Self::InvalidResponse { .. } => ErrorKind::Api,
		}
	}

	/// URL of the failed request, when the error came from an outbound call.
	pub fn url(&self) -> Option<&str> {
		match self {
			Self::Network { url, .. }
			| Self::TokenExpired { url, .. }
			| Self::AccessDenied { url, .. }
			| Self::Api { url, .. }
			| Self::InvalidResponse { url, .. } => Some(url),
			Self::Config(_) | Self::Secret(_) => None,
		}
	}

	/// HTTP status associated with the error, if a response was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::TokenExpired { .. } => Some(401),
			Self::AccessDenied { .. } => Some(403),
			Self::Api { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` when the transport gave up because the configured timeout elapsed.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Network { source: TransportError::Timeout, .. })
	}

	/// Returns `true` for failures that may succeed when the request is resubmitted.
	///
	/// Network failures, rejected tokens, and upstream 5xx responses are transient; permission
	/// failures, other client errors, and configuration problems are not.
	pub fn is_retriable(&self) -> bool {
		match self {
			Self::Network { .. } | Self::TokenExpired { .. } => true,
			Self::Api { status, .. } => (500..600).contains(status),
			_ => false,
		}
	}

	/// Returns `true` when the next attempt must bypass the cached token.
	pub fn requires_token_refresh(&self) -> bool {
		matches!(self, Self::TokenExpired { .. })
	}
}

/// Coarse error classes used for inspection and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// HTTP 401 from the API endpoint.
	TokenExpired,
	/// HTTP 403 from the API endpoint.
	AccessDenied,
	/// Any other non-success response, or an undecodable success body.
	Api,
	/// Transport-level failure or timeout.
	Network,
	/// Configuration, credential, or token-response problem.
	Config,
}
impl ErrorKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorKind::TokenExpired => "token_expired",
			ErrorKind::AccessDenied => "access_denied",
			ErrorKind::Api => "api",
			ErrorKind::Network => "network",
			ErrorKind::Config => "config",
		}
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Client configuration failed validation.
	#[error(transparent)]
	InvalidClientConfig(#[from] ClientConfigError),
	/// Request URL assembled from the endpoint and path is invalid.
	#[error("Request URL `{url}` is invalid.")]
	InvalidRequestUrl {
		/// URL that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized to JSON.")]
	InvalidRequestBody(#[source] serde_json::Error),
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token endpoint response omitted `access_token`.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an `expires_in` string that is not a number.
	#[error("The expires_in value `{value}` is not a number of seconds.")]
	InvalidExpiresIn {
		/// Raw value returned by the token endpoint.
		value: String,
	},
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ClientConfigError> for Error {
	fn from(e: ClientConfigError) -> Self {
		ConfigError::from(e).into()
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The configured timeout elapsed before a response arrived.
	#[error("Request timed out.")]
	Timeout,
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while sending the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}

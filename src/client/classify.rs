//! Maps API responses onto the client's error taxonomy.

// self
use crate::{_prelude::*, http::TransportResponse};

/// Turns a response from `url` into the decoded JSON body or a classified error.
///
/// 2xx bodies are decoded as JSON (an empty body yields [`Value::Null`]), 401 becomes
/// [`Error::TokenExpired`], 403 becomes [`Error::AccessDenied`], and every other status becomes
/// [`Error::Api`] carrying the upstream message.
pub(crate) fn classify_response(url: &Url, response: &TransportResponse) -> Result<Value> {
	if response.is_success() {
		if response.body.iter().all(u8::is_ascii_whitespace) {
			return Ok(Value::Null);
		}

		return response
			.json()
			.map_err(|source| Error::InvalidResponse { url: url.to_string(), source });
	}

	let url = url.to_string();
	let message = response.error_message();

	Err(match response.status {
		401 => Error::TokenExpired { url, message },
		403 => Error::AccessDenied { url, message },
		status => Error::Api { status, url, message },
	})
}

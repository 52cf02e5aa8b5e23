//! Token endpoint response decoding.

// self
use crate::{_prelude::*, auth::Secret, error::ConfigError, token::CachedToken};

#[derive(Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	expires_in: Option<ExpiresIn>,
}

// Some authorities emit `expires_in` as a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
	Seconds(i64),
	Text(String),
}
impl ExpiresIn {
	fn seconds(self) -> Result<i64, ConfigError> {
		match self {
			Self::Seconds(secs) => Ok(secs),
			Self::Text(raw) =>
				raw.trim().parse().map_err(|_| ConfigError::InvalidExpiresIn { value: raw }),
		}
	}
}

/// Decodes a successful token endpoint body into a [`CachedToken`] issued at `issued_at`.
pub(crate) fn parse_token_response(
	body: &[u8],
	issued_at: OffsetDateTime,
) -> Result<CachedToken, ConfigError> {
	let response: TokenResponse =
		serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(body))
			.map_err(|source| ConfigError::TokenResponseParse { source })?;
	let access_token = response
		.access_token
		.filter(|token| !token.is_empty())
		.ok_or(ConfigError::MissingAccessToken)?;
	let expires_in = response.expires_in.ok_or(ConfigError::MissingExpiresIn)?.seconds()?;

	if expires_in <= 0 {
		return Err(ConfigError::NonPositiveExpiresIn);
	}

	CachedToken::issue(Secret::new(access_token), issued_at, Duration::seconds(expires_in))
		.ok_or(ConfigError::ExpiresInOutOfRange)
}

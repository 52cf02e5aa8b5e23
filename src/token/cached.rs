//! Cached bearer token and its expiry arithmetic.

// self
use crate::{_prelude::*, auth::Secret};

/// Margin subtracted from the declared lifetime so a token never expires mid-flight.
pub const EXPIRY_SAFETY_MARGIN: Duration = Duration::minutes(5);

/// Bearer token held by a [`TokenManager`](crate::token::TokenManager).
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
	/// Access token secret; callers must avoid logging it.
	pub access_token: Secret,
	/// Instant the token response was received.
	pub issued_at: OffsetDateTime,
	/// Instant after which the token is no longer handed out.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Builds a token whose expiry is `issued_at + lifetime - EXPIRY_SAFETY_MARGIN`.
	///
	/// Lifetimes no longer than the margin keep their full duration instead of producing a token
	/// that is expired on arrival. Returns `None` when the expiry overflows the calendar.
	pub fn issue(
		access_token: Secret,
		issued_at: OffsetDateTime,
		lifetime: Duration,
	) -> Option<Self> {
		let expires_at = issued_at.checked_add(effective_lifetime(lifetime))?;

		Some(Self { access_token, issued_at, expires_at })
	}

	/// Returns `true` while `instant` is strictly before the expiry.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		instant < self.expires_at
	}

	/// Convenience helper that checks validity against the current UTC clock.
	pub fn is_valid(&self) -> bool {
		self.is_valid_at(OffsetDateTime::now_utc())
	}

	/// Expiry as milliseconds since the Unix epoch.
	pub fn expires_at_epoch_millis(&self) -> i64 {
		let millis = self.expires_at.unix_timestamp_nanos() / 1_000_000;

		i64::try_from(millis).unwrap_or(i64::MAX)
	}
}
impl Debug for CachedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedToken")
			.field("access_token", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

fn effective_lifetime(lifetime: Duration) -> Duration {
	if lifetime <= EXPIRY_SAFETY_MARGIN { lifetime } else { lifetime - EXPIRY_SAFETY_MARGIN }
}

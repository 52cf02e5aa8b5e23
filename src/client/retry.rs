//! Bounded linear retry policy.

// self
use crate::{_prelude::*, config::ClientConfig};

/// Decides whether a failed attempt is resubmitted and how long to wait first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Retries allowed after the initial attempt.
	pub max_retries: u32,
	/// Delay before the first retry; later retries wait a multiple of it.
	pub base_delay: StdDuration,
}
impl RetryPolicy {
	/// Creates a policy with the given budget and base delay.
	pub const fn new(max_retries: u32, base_delay: StdDuration) -> Self {
		Self { max_retries, base_delay }
	}

	/// Derives the policy from a client configuration.
	pub fn from_config(config: &ClientConfig) -> Self {
		Self::new(config.retries, config.retry_delay)
	}

	/// Delay before the `retry`-th retry (1-based): `base_delay * retry`.
	pub fn delay_for(&self, retry: u32) -> StdDuration {
		self.base_delay.saturating_mul(retry)
	}

	/// Returns `true` when `error` is transient and `retries_used` has not exhausted the budget.
	pub fn should_retry(&self, error: &Error, retries_used: u32) -> bool {
		retries_used < self.max_retries && error.is_retriable()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn api(status: u16) -> Error {
		Error::Api { status, url: "u".into(), message: "m".into() }
	}

	#[test]
	fn delay_grows_linearly() {
		let policy = RetryPolicy::new(3, StdDuration::from_millis(250));

		assert_eq!(policy.delay_for(1), StdDuration::from_millis(250));
		assert_eq!(policy.delay_for(2), StdDuration::from_millis(500));
		assert_eq!(policy.delay_for(3), StdDuration::from_millis(750));
	}

	#[test]
	fn respects_budget_and_error_class() {
		let policy = RetryPolicy::new(2, StdDuration::ZERO);

		assert!(policy.should_retry(&api(502), 0));
		assert!(policy.should_retry(&api(502), 1));
		assert!(!policy.should_retry(&api(502), 2));
		assert!(!policy.should_retry(&api(400), 0));
		assert!(
			!policy.should_retry(&Error::AccessDenied { url: "u".into(), message: "m".into() }, 0)
		);
		assert!(!RetryPolicy::new(0, StdDuration::ZERO).should_retry(&api(500), 0));
	}
}

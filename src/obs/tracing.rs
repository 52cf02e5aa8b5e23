// self
use crate::{_prelude::*, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by the token manager and the request executor.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_api_client.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event once a new token has been cached. The token itself is never logged.
pub fn log_token_refreshed(expires_at: OffsetDateTime) {
	#[cfg(feature = "tracing")]
	tracing::debug!(%expires_at, "Cached a new access token.");
	#[cfg(not(feature = "tracing"))]
	let _ = expires_at;
}

/// Emits a warning before a transient failure is retried.
pub fn log_retry(retry: u32, delay: StdDuration, error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		retry,
		delay_ms = delay.as_millis() as u64,
		kind = error.kind().as_str(),
		status = error.status(),
		error = %error,
		"Retrying API request after a transient failure."
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (retry, delay, error);
}

/// Emits a warning when a flow gives up and returns an error to the caller.
pub fn log_flow_failure(kind: FlowKind, error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		flow = kind.as_str(),
		kind = error.kind().as_str(),
		url = error.url(),
		error = %error,
		"Flow failed."
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (kind, error);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::ApiRequest, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn log_helpers_accept_every_error_kind() {
		let error = Error::Api {
			status: 503,
			url: "https://api.example.com".into(),
			message: "busy".into(),
		};

		log_retry(1, StdDuration::from_millis(5), &error);
		log_flow_failure(FlowKind::ApiRequest, &error);
		log_token_refreshed(OffsetDateTime::UNIX_EPOCH);
	}
}

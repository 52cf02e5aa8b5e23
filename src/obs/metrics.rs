// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_api_client_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_stable() {
		assert_eq!(FlowKind::TokenRefresh.as_str(), "token_refresh");
		assert_eq!(FlowKind::ApiRequest.to_string(), "api_request");
		assert_eq!(FlowOutcome::Retry.as_str(), "retry");
		assert_eq!(FlowOutcome::Failure.to_string(), "failure");
	}

	#[test]
	fn record_flow_outcome_is_safe_without_recorder() {
		record_flow_outcome(FlowKind::ApiRequest, FlowOutcome::Retry);
		record_flow_outcome(FlowKind::TokenRefresh, FlowOutcome::Failure);
	}
}

// self
use crate::{
	_prelude::*,
	obs::{FlowKind, FlowOutcome},
};

/// Counter incremented once per flow outcome.
pub const FLOW_COUNTER: &str = "oauth2_orchestrator_flow_total";

/// Records a flow outcome for `stage` via the global metrics recorder (when enabled).
///
/// `stage` names the orchestrator call site and matches the `stage` field of [`FlowSpan`].
///
/// [`FlowSpan`]: crate::obs::FlowSpan
pub fn record_flow_outcome(kind: FlowKind, stage: &'static str, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			FLOW_COUNTER,
			"flow" => kind.as_str(),
			"stage" => stage,
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, stage, outcome);
	}
}

/// Records success or failure for `stage` depending on `result`.
pub fn record_flow_result<T>(kind: FlowKind, stage: &'static str, result: &Result<T>) {
	let outcome = if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure };

	record_flow_outcome(kind, stage, outcome);
}

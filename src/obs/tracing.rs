// self
use crate::{
	_prelude::*,
	auth::Subject,
	obs::{FlowKind, RetryEvent},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by orchestrator flows.
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
			let span = tracing::info_span!("oauth2_orchestrator.flow", flow = kind.as_str(), stage);

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

/// Emits a retry decision for `subject` inside the current span (when enabled).
///
/// Exhausted budgets and rejected refresh tokens log at `warn`; the rest at `debug`.
pub fn record_retry_event(event: RetryEvent, subject: Subject, attempt: u32) {
	#[cfg(feature = "tracing")]
	{
		let subject = subject.to_string();

		match event {
			RetryEvent::Exhausted | RetryEvent::RefreshRejected => tracing::warn!(
				event = event.as_str(),
				subject = subject.as_str(),
				attempt,
				"Retry decision."
			),
			RetryEvent::Unauthorized | RetryEvent::Coalesced => tracing::debug!(
				event = event.as_str(),
				subject = subject.as_str(),
				attempt,
				"Retry decision."
			),
		}
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (event, subject, attempt);
	}
}

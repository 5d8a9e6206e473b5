//! Optional observability helpers for orchestrator flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_orchestrator.flow` with the `flow`
//!   (request path) and `stage` (call site) fields, plus debug/warn events for retry decisions.
//! - Enable `metrics` to increment the `oauth2_orchestrator_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow`, `stage`, and `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, request::RequestClass};

/// Flow kinds observed by the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Token endpoint call issued by the caller.
	TokenAcquisition,
	/// Resource call authorized with the client token.
	ClientResource,
	/// Resource call authorized with a user token.
	UserResource,
	/// `refresh_token` grant after a 401.
	Refresh,
	/// Full reissuance after a 401 (client credentials).
	Reissue,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::TokenAcquisition => "token_acquisition",
			FlowKind::ClientResource => "client_resource",
			FlowKind::UserResource => "user_resource",
			FlowKind::Refresh => "refresh",
			FlowKind::Reissue => "reissue",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl From<RequestClass> for FlowKind {
	fn from(class: RequestClass) -> Self {
		match class {
			RequestClass::TokenAcquisition => FlowKind::TokenAcquisition,
			RequestClass::ClientResource => FlowKind::ClientResource,
			RequestClass::UserResource => FlowKind::UserResource,
		}
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to an orchestrator operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Retry decisions taken while recovering from a 401.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RetryEvent {
	/// A resource call was rejected as unauthorized.
	Unauthorized,
	/// Another caller already replaced the stale token.
	Coalesced,
	/// The refresh grant failed with a client error; falling back to reissuance.
	RefreshRejected,
	/// The retry budget is exhausted.
	Exhausted,
}
impl RetryEvent {
	/// Returns a stable label suitable for event fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RetryEvent::Unauthorized => "unauthorized",
			RetryEvent::Coalesced => "coalesced",
			RetryEvent::RefreshRejected => "refresh_rejected",
			RetryEvent::Exhausted => "exhausted",
		}
	}
}
impl Display for RetryEvent {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

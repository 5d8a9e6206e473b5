// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for the 401 recovery protocol.
#[derive(Debug, Default)]
pub struct RetryMetrics {
	unauthorized: AtomicU64,
	refreshes: AtomicU64,
	reissues: AtomicU64,
	exhausted: AtomicU64,
}
impl RetryMetrics {
	/// Returns the number of resource calls rejected with 401.
	pub fn unauthorized(&self) -> u64 {
		self.unauthorized.load(Ordering::Relaxed)
	}

	/// Returns the number of successful `refresh_token` grants.
	pub fn refreshes(&self) -> u64 {
		self.refreshes.load(Ordering::Relaxed)
	}

	/// Returns the number of successful client-credentials reissuances.
	pub fn reissues(&self) -> u64 {
		self.reissues.load(Ordering::Relaxed)
	}

	/// Returns the number of requests that exhausted their retry budget.
	pub fn exhausted(&self) -> u64 {
		self.exhausted.load(Ordering::Relaxed)
	}

	pub(crate) fn record_unauthorized(&self) {
		self.unauthorized.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh(&self) {
		self.refreshes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_reissue(&self) {
		self.reissues.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_exhausted(&self) {
		self.exhausted.fetch_add(1, Ordering::Relaxed);
	}
}

//! Opt-in signature mismatch reporting.
//!
//! Invoking a dynamic callable with a pack built for another signature is a
//! silent no-op. Attaching a [`MismatchObserver`] makes those calls visible
//! without changing what they do.

use std::sync::atomic::{AtomicU64, Ordering};

use callkit_core::Signature;

/// A rejected call: the pack's signature did not match the callable's.
#[derive(Debug, Clone, Copy)]
pub struct SignatureMismatch<'a> {
    /// Signature of the callable
    pub expected: &'a Signature,
    /// Signature the pack was built for
    pub actual: &'a Signature,
}

/// Receives signature mismatch events.
pub trait MismatchObserver: Send + Sync {
    /// Called once per rejected invocation.
    fn on_mismatch(&self, event: &SignatureMismatch<'_>);
}

impl<F> MismatchObserver for F
where
    F: Fn(&SignatureMismatch<'_>) + Send + Sync,
{
    fn on_mismatch(&self, event: &SignatureMismatch<'_>) {
        (self)(event)
    }
}

/// Counts mismatches.
#[derive(Debug, Default)]
pub struct MismatchCounter {
    count: AtomicU64,
}

impl MismatchCounter {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mismatches seen so far.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Reset to zero, returning the previous count.
    pub fn reset(&self) -> u64 {
        self.count.swap(0, Ordering::Relaxed)
    }
}

impl MismatchObserver for MismatchCounter {
    fn on_mismatch(&self, _event: &SignatureMismatch<'_>) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

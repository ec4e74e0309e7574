//! Detection port: asks the outside world whether a crisis is pending.

use std::future::Future;
use std::sync::Arc;

use crisiswatch_domain::crisis::DetectionOutcome;
use crisiswatch_domain::error::DetectionError;

/// Inspects the monitored inbox and reports at most one crisis per call.
///
/// Implementations keep a deduplication cache: a message that already
/// produced a crisis is not reported again until [`reset_dedup_cache`] runs.
///
/// [`reset_dedup_cache`]: CrisisDetector::reset_dedup_cache
pub trait CrisisDetector {
    /// Check the inbox once.
    fn check_for_crisis(
        &self,
    ) -> impl Future<Output = Result<DetectionOutcome, DetectionError>> + Send;

    /// Forget every message seen so far so the next check rescans them all.
    fn reset_dedup_cache(&self) -> impl Future<Output = Result<(), DetectionError>> + Send;
}

impl<T: CrisisDetector + Send + Sync> CrisisDetector for Arc<T> {
    fn check_for_crisis(
        &self,
    ) -> impl Future<Output = Result<DetectionOutcome, DetectionError>> + Send {
        (**self).check_for_crisis()
    }

    fn reset_dedup_cache(&self) -> impl Future<Output = Result<(), DetectionError>> + Send {
        (**self).reset_dedup_cache()
    }
}

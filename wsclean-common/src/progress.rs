// wsclean-common/src/progress.rs
//! Observer contract for uninstall progress. Purely observational: the
//! engine never waits on a sink and a sink must not block it meaningfully.

use crate::model::UninstallProgress;

pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: UninstallProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(UninstallProgress) + Send + Sync,
{
    fn report(&self, progress: UninstallProgress) {
        self(progress)
    }
}

/// Sink that discards all events.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _progress: UninstallProgress) {}
}

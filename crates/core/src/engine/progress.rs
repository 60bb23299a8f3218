//! Progress reporting seam.
//!
//! The engine drives an injected observer instead of global callbacks, so a
//! run has no hidden shared state. Implementations needing mutability use
//! interior mutability; the engine only ever holds a shared reference.

/// Observer the engine notifies during a run.
pub trait ProgressObserver: Send + Sync {
    /// Completion percentage, monotonically non-decreasing from 0 to 100.
    fn on_progress(&self, percent: f64);

    /// Human-readable status line.
    fn on_status(&self, status: &str);
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn on_progress(&self, _percent: f64) {}
    fn on_status(&self, _status: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_is_object_safe() {
        let observer: &dyn ProgressObserver = &NoopProgress;
        observer.on_progress(50.0);
        observer.on_status("working");
    }
}

//! Timing helpers for the per-call log output.

use std::time::Instant;

/// Drop timer: logs the elapsed time of a phase when it goes out of scope.
///
/// ```ignore
/// let _t = Timed::at("post-processing", log::Level::Debug);
/// // ... work ...
/// // logs "post-processing: 1.234ms" when `_t` is dropped
/// ```
pub struct Timed {
    name: &'static str,
    start: Instant,
    level: log::Level,
}

impl Timed {
    /// Timer logging at `level`.
    pub fn at(name: &'static str, level: log::Level) -> Self {
        log::trace!("{}...", name);
        Self { name, start: Instant::now(), level }
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        log::log!(self.level, "{}: {:.3?}", self.name, self.start.elapsed());
    }
}

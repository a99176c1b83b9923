//! Stop criterion on absolute and relative error

/// Tracks the last observed error and whether training should stop
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceMonitor {
    absolute_tolerance: f64,
    relative_tolerance: f64,
    last_error: f64,
    should_stop: bool,
}

impl ConvergenceMonitor {
    pub fn new(absolute_tolerance: f64, relative_tolerance: f64) -> Self {
        Self {
            absolute_tolerance,
            relative_tolerance,
            last_error: f64::MAX,
            should_stop: false,
        }
    }

    /// Record `error` and recompute the stop flag.
    ///
    /// Stops when `error < absolute_tolerance` or when it moved by less than
    /// `relative_tolerance` since the previous observation.
    pub fn observe(&mut self, error: f64) -> bool {
        self.should_stop = error < self.absolute_tolerance
            || (self.last_error - error).abs() < self.relative_tolerance;
        self.last_error = error;
        self.should_stop
    }

    pub fn should_stop(&self) -> bool {
        self.should_stop
    }

    /// Error from the previous `observe`, `f64::MAX` before the first one
    pub fn last_error(&self) -> f64 {
        self.last_error
    }
}

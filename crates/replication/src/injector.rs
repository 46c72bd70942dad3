//! Failure injection policy
//!
//! Forces one callback kind to fail with a chosen code for a bounded number
//! of invocations. The injector is armed for a fail point when it targets
//! that point and its budget is above zero; every firing spends one unit of
//! budget, and an exhausted injector is inert until re-armed.

use tracing::warn;
use walrep_core::{ErrorCode, FailPoint};

/// Budget large enough to mean "fail for the rest of the test".
pub const UNLIMITED_FAILURES: u32 = 8192;

/// Configurable failure policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureInjector {
    target: Option<FailPoint>,
    code: ErrorCode,
    remaining: u32,
    default_budget: u32,
    fired: u64,
}

impl Default for FailureInjector {
    fn default() -> Self {
        Self::with_default_budget(UNLIMITED_FAILURES)
    }
}

impl FailureInjector {
    /// Create a disarmed injector with the standard budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a disarmed injector that restores `budget` on reset.
    pub fn with_default_budget(budget: u32) -> Self {
        Self {
            target: None,
            code: ErrorCode::ERROR,
            remaining: budget,
            default_budget: budget,
            fired: 0,
        }
    }

    /// Target `point`, keeping the current budget.
    ///
    /// After a reset the budget is effectively unlimited, so this makes every
    /// call to `point` fail until the injector is disarmed.
    pub fn arm(&mut self, point: FailPoint, code: ErrorCode) {
        self.target = Some(point);
        self.code = code;
    }

    /// Target `point` for exactly `times` invocations.
    pub fn arm_times(&mut self, point: FailPoint, code: ErrorCode, times: u32) {
        self.arm(point, code);
        self.remaining = times;
    }

    /// Set the remaining budget without changing the target.
    pub fn set_remaining(&mut self, times: u32) {
        self.remaining = times;
    }

    /// Stop targeting any callback.
    pub fn disarm(&mut self) {
        self.target = None;
    }

    /// Restore the disarmed default.
    pub fn reset(&mut self) {
        *self = Self::with_default_budget(self.default_budget);
    }

    /// Check if the next call to `point` would fail.
    pub fn is_armed(&self, point: FailPoint) -> bool {
        self.target == Some(point) && self.remaining > 0
    }

    /// Fire for `point` if armed, spending one unit of budget.
    ///
    /// Returns the code the callback must fail with.
    pub fn fire(&mut self, point: FailPoint) -> Option<ErrorCode> {
        if !self.is_armed(point) {
            return None;
        }
        self.remaining -= 1;
        self.fired += 1;
        warn!(
            target: "walrep::replication",
            point = %point,
            code = %self.code,
            remaining = self.remaining,
            "Injecting failure"
        );
        Some(self.code)
    }

    /// Targeted fail point, if any.
    pub fn target(&self) -> Option<FailPoint> {
        self.target
    }

    /// Code returned when the injector fires.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Remaining budget.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Number of failures injected since the last reset.
    pub fn fired(&self) -> u64 {
        self.fired
    }
}

//! Harness configuration.
//!
//! Controls the failure budget restored on reset, the allocation ceiling for
//! follower forwarding buffers, and the page sizes the Frames callback accepts.

use crate::injector::UNLIMITED_FAILURES;

/// Harness configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Failure budget the injector holds after a reset (default: 8192).
    ///
    /// Large enough that arming a fail point without an explicit count makes
    /// it fail for the rest of a test.
    pub default_failure_budget: u32,

    /// Upper bound in bytes for the buffers built to forward one frame batch.
    ///
    /// `None` means only the allocator limits the buffers. A batch whose
    /// buffers would exceed the bound fails as out-of-memory.
    pub forward_buffer_limit: Option<usize>,

    /// Most frames the ledger may hold between resets.
    ///
    /// `None` means only the allocator limits the ledger. A batch that would
    /// push the ledger past the bound fails as out-of-memory and records
    /// none of its frames.
    pub ledger_frame_limit: Option<usize>,

    /// Schema a follower is attached under when none is named (default: "main").
    pub default_schema: String,

    /// Smallest accepted page size in bytes (default: 512).
    pub min_page_size: u32,

    /// Largest accepted page size in bytes (default: 65536).
    pub max_page_size: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            default_failure_budget: UNLIMITED_FAILURES,
            forward_buffer_limit: None,
            ledger_frame_limit: None,
            default_schema: "main".to_string(),
            min_page_size: 512,
            max_page_size: 65536,
        }
    }
}

impl HarnessConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration for tests (16MB forwarding ceiling).
    pub fn for_testing() -> Self {
        HarnessConfig {
            forward_buffer_limit: Some(16 * 1024 * 1024),
            ..Default::default()
        }
    }

    /// Set the failure budget restored on reset (builder pattern).
    pub fn with_default_failure_budget(mut self, budget: u32) -> Self {
        self.default_failure_budget = budget;
        self
    }

    /// Set the forwarding buffer ceiling (builder pattern).
    pub fn with_forward_buffer_limit(mut self, bytes: usize) -> Self {
        self.forward_buffer_limit = Some(bytes);
        self
    }

    /// Remove the forwarding buffer ceiling (builder pattern).
    pub fn without_forward_buffer_limit(mut self) -> Self {
        self.forward_buffer_limit = None;
        self
    }

    /// Set the default follower schema (builder pattern).
    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    /// Set the ledger frame ceiling (builder pattern).
    pub fn with_ledger_frame_limit(mut self, frames: usize) -> Self {
        self.ledger_frame_limit = Some(frames);
        self
    }

    /// Set the accepted page size range (builder pattern).
    pub fn with_page_size_range(mut self, min: u32, max: u32) -> Self {
        self.min_page_size = min;
        self.max_page_size = max;
        self
    }

    /// Check if `page_size` is a power of two within the accepted range.
    pub fn accepts_page_size(&self, page_size: u32) -> bool {
        page_size.is_power_of_two()
            && page_size >= self.min_page_size
            && page_size <= self.max_page_size
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_failure_budget == 0 {
            return Err(ConfigError::ZeroFailureBudget);
        }
        if self.default_schema.is_empty() {
            return Err(ConfigError::EmptySchema);
        }
        if !self.min_page_size.is_power_of_two() || !self.max_page_size.is_power_of_two() {
            return Err(ConfigError::PageSizeNotPowerOfTwo);
        }
        if self.min_page_size > self.max_page_size {
            return Err(ConfigError::InvertedPageSizeRange {
                min: self.min_page_size,
                max: self.max_page_size,
            });
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Failure budget restored on reset must be positive.
    #[error("Default failure budget must be at least 1")]
    ZeroFailureBudget,

    /// Default follower schema name is empty.
    #[error("Default schema name must not be empty")]
    EmptySchema,

    /// Page size bound is not a power of two.
    #[error("Page size bounds must be powers of two")]
    PageSizeNotPowerOfTwo,

    /// Minimum page size exceeds maximum.
    #[error("Minimum page size {min} exceeds maximum {max}")]
    InvertedPageSizeRange {
        /// Configured minimum
        min: u32,
        /// Configured maximum
        max: u32,
    },
}

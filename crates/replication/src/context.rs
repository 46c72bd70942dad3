//! Replication context
//!
//! The single piece of mutable state shared by every callback: lifecycle
//! state, failure policy, optional follower, and frame ledger. The harness
//! owns one context and passes it to each callback; only one transaction
//! drives it at a time.

use crate::config::{ConfigError, HarnessConfig};
use crate::follower::{Follower, FollowerLink};
use crate::injector::FailureInjector;
use crate::ledger::FrameLedger;
use crate::state::{Callback, ReplicationState};
use tracing::{debug, info};

/// Shared state behind the replication callbacks
#[derive(Debug)]
pub struct ReplicationContext {
    pub(crate) state: ReplicationState,
    pub(crate) injector: FailureInjector,
    pub(crate) follower: Option<FollowerLink>,
    pub(crate) ledger: FrameLedger,
    pub(crate) config: HarnessConfig,
}

impl Default for ReplicationContext {
    fn default() -> Self {
        Self::from_valid_config(HarnessConfig::default())
    }
}

impl ReplicationContext {
    /// Create a context with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a validated configuration.
    pub fn with_config(config: HarnessConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: HarnessConfig) -> Self {
        ReplicationContext {
            state: ReplicationState::Idle,
            injector: FailureInjector::with_default_budget(config.default_failure_budget),
            follower: None,
            ledger: FrameLedger::new(),
            config,
        }
    }

    /// Return to the initial state between test cases.
    ///
    /// Idle, empty ledger, no follower, and a disarmed injector holding the
    /// configured default budget. Resetting twice is the same as once.
    pub fn reset(&mut self) {
        self.state = ReplicationState::Idle;
        self.injector.reset();
        self.follower = None;
        self.ledger.clear();
        info!(target: "walrep::replication", "Replication context reset");
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReplicationState {
        self.state
    }

    /// Frames observed since the last reset.
    pub fn ledger(&self) -> &FrameLedger {
        &self.ledger
    }

    /// Failure policy.
    pub fn injector(&self) -> &FailureInjector {
        &self.injector
    }

    /// Failure policy, for reconfiguration between test cases.
    pub fn injector_mut(&mut self) -> &mut FailureInjector {
        &mut self.injector
    }

    /// Configuration this context was built with.
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Forward frame batches to `follower` under the default schema.
    pub fn attach_follower(&mut self, follower: impl Follower + 'static) {
        let schema = self.config.default_schema.clone();
        self.attach_follower_to(follower, schema);
    }

    /// Forward frame batches to `follower` under `schema`.
    ///
    /// Replaces any follower already attached.
    pub fn attach_follower_to(&mut self, follower: impl Follower + 'static, schema: impl Into<String>) {
        let schema = schema.into();
        info!(target: "walrep::replication", schema = %schema, "Follower attached");
        self.follower = Some(FollowerLink {
            follower: Box::new(follower),
            schema,
        });
    }

    /// Stop forwarding, returning the follower that was attached.
    pub fn detach_follower(&mut self) -> Option<Box<dyn Follower>> {
        let link = self.follower.take()?;
        info!(target: "walrep::replication", schema = %link.schema, "Follower detached");
        Some(link.follower)
    }

    /// Check if frames are being forwarded.
    pub fn has_follower(&self) -> bool {
        self.follower.is_some()
    }

    /// Schema the attached follower applies frames to.
    pub fn follower_schema(&self) -> Option<&str> {
        self.follower.as_ref().map(|link| link.schema.as_str())
    }

    /// Panic unless `callback` is legal in the current state.
    ///
    /// Calls out of order are a bug in the driver, not a runtime condition.
    pub(crate) fn expect_state(&self, callback: Callback) {
        assert!(
            self.state.accepts(callback),
            "replication protocol violation: {} called in state {}",
            callback,
            self.state
        );
    }

    pub(crate) fn transition(&mut self, callback: Callback, to: ReplicationState) {
        debug!(
            target: "walrep::replication",
            callback = %callback,
            from = %self.state,
            to = %to,
            "State transition"
        );
        self.state = to;
    }
}

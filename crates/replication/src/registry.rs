//! Replication registry
//!
//! Name-keyed registry of replication implementations, the way the storage
//! engine keeps them. Registration order is preserved; one entry may be the
//! default returned by a lookup without a name. Registering the harness
//! under two names yields two entries backed by the same state machine.

use crate::descriptor::WalReplication;
use std::sync::Arc;
use tracing::info;

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No implementation is registered under the name
    #[error("no replication registered as '{0}'")]
    NotRegistered(String),

    /// Implementation has an empty name
    #[error("replication name must not be empty")]
    EmptyName,
}

/// Ordered, name-keyed set of replication implementations
#[derive(Default)]
pub struct ReplicationRegistry {
    entries: Vec<Arc<dyn WalReplication>>,
    default: Option<&'static str>,
}

impl std::fmt::Debug for ReplicationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicationRegistry")
            .field("names", &self.names())
            .field("default", &self.default)
            .finish()
    }
}

impl ReplicationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `replication` under its descriptor name.
    ///
    /// An entry with the same name is replaced in place. The entry becomes
    /// the default when `make_default` is set or when there is no default yet.
    pub fn register(
        &mut self,
        replication: Arc<dyn WalReplication>,
        make_default: bool,
    ) -> Result<(), RegistryError> {
        let name = replication.name();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        match self.position(name) {
            Some(i) => self.entries[i] = replication,
            None => self.entries.push(replication),
        }
        if make_default || self.default.is_none() {
            self.default = Some(name);
        }
        info!(
            target: "walrep::replication",
            name,
            default = self.default == Some(name),
            "Replication registered"
        );
        Ok(())
    }

    /// Remove the entry registered as `name`.
    ///
    /// If it was the default, the earliest remaining entry becomes default.
    pub fn unregister(&mut self, name: &str) -> Result<Arc<dyn WalReplication>, RegistryError> {
        let i = self
            .position(name)
            .ok_or_else(|| RegistryError::NotRegistered(name.to_string()))?;
        let removed = self.entries.remove(i);
        if self.default == Some(removed.name()) {
            self.default = self.entries.first().map(|r| r.name());
        }
        info!(target: "walrep::replication", name, "Replication unregistered");
        Ok(removed)
    }

    /// Look up `name`, or the default entry when `name` is `None`.
    pub fn find(&self, name: Option<&str>) -> Option<Arc<dyn WalReplication>> {
        let name = name.or(self.default)?;
        self.position(name).map(|i| Arc::clone(&self.entries[i]))
    }

    /// Name of the default entry.
    pub fn default_name(&self) -> Option<&'static str> {
        self.default
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|r| r.name()).collect()
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|r| r.name() == name)
    }
}

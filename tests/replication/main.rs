//! Integration tests for the replication harness.
//!
//! These tests drive the public callbacks the way the storage engine does
//! and check what an observer can see afterwards: the lifecycle state, the
//! frame ledger, the injector's budget, and what a follower received.
//! Unit tests in crates/replication/src/ cover each component in isolation.

#[path = "../common/mod.rs"]
mod common;

mod failure_injection;
mod ledger_inspection;
mod registration;

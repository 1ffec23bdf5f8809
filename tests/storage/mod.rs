//! Shared storage integration tests.
//!
//! Tests the TriggerStore, TriggerHistoryStore, NodeGroupLinkStore and
//! ChannelStore interfaces against all implementations. Each implementation
//! module imports these test functions and runs them.

pub mod channel_store_tests;
pub mod history_store_tests;
pub mod link_store_tests;
pub mod trigger_store_tests;

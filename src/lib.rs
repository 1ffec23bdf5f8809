//! Syncmesh - trigger resolution for replication topologies
//!
//! Resolves which capture triggers a node group must install: the ones an
//! administrator persisted plus the configuration triggers implied by the
//! node group link topology. Also caches the channel list and the trigger
//! history shared by the routing and trigger-build engines.

pub mod config;
pub mod model;
pub mod parameters;
pub mod services;
pub mod storage;
pub mod utils;

//! syncmesh-resolve: print the active triggers of the local node group
//!
//! Resolves persisted and virtual triggers for the configured node group
//! against the configured store and writes them to stdout as YAML.
//!
//! ## Configuration
//! - SYNCMESH_CONFIG: configuration file (optional, `syncmesh.yaml` otherwise)
//! - SYNCMESH__NODE__GROUP_ID: group to resolve
//! - SYNCMESH__STORAGE__TYPE, SYNCMESH__STORAGE__SQLITE__PATH, ...: overrides
//! - SYNCMESH_LOG: log filter (default: info)

use std::sync::Arc;

use tracing::info;

use syncmesh::config::Config;
use syncmesh::parameters::StaticParameters;
use syncmesh::services::ConfigurationServices;
use syncmesh::storage::init_storage;
use syncmesh::utils::bootstrap::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Config::load(None)?;
    let stores = init_storage(&config.storage, config.dialect.catalog_equals_schema).await?;
    let parameters = Arc::new(StaticParameters::from_config(&config));
    let services = ConfigurationServices::new(&config, stores, parameters);

    let triggers = services.local_triggers().await?;
    info!(source_group_id = %services.group_id(), count = triggers.len(), "Resolved triggers");

    print!("{}", serde_yaml::to_string(&triggers)?);
    Ok(())
}

//! ChannelStore interface tests.
//!
//! These tests verify the contract of the ChannelStore trait.
//! Each storage implementation should run these tests.

use syncmesh::model::Channel;
use syncmesh::storage::ChannelStore;

pub async fn test_channels_ordered_with_defaults<S: ChannelStore>(store: &S) {
    store
        .save_channel(&Channel::new("cs_sales", 20))
        .await
        .expect("save should succeed");
    store
        .save_channel(&Channel {
            max_batch_size: 50,
            enabled: false,
            ..Channel::new("cs_config", 5)
        })
        .await
        .expect("save should succeed");

    let channels = store
        .node_channels("cs_node")
        .await
        .expect("node_channels should succeed");
    let ids: Vec<_> = channels
        .iter()
        .map(|c| c.id())
        .filter(|id| id.starts_with("cs_"))
        .collect();
    assert_eq!(ids, vec!["cs_config", "cs_sales"]);

    let config = channels
        .iter()
        .find(|c| c.id() == "cs_config")
        .expect("channel should exist");
    assert_eq!(config.channel.max_batch_size, 50);
    assert!(!config.channel.enabled);
    assert_eq!(config.node_id, "cs_node");
    assert!(!config.suspended && !config.ignored, "no control row means active");
}

pub async fn test_channel_control_is_node_scoped<S: ChannelStore>(store: &S) {
    store
        .save_channel(&Channel::new("cs_ctl", 1))
        .await
        .expect("save should succeed");
    store
        .save_channel_control("cs_n1", "cs_ctl", true, false)
        .await
        .expect("control save should succeed");
    store
        .save_channel_control("cs_n1", "cs_ctl", true, true)
        .await
        .expect("control update should succeed");

    let find = |channels: Vec<syncmesh::model::NodeChannel>| {
        channels
            .into_iter()
            .find(|c| c.id() == "cs_ctl")
            .expect("channel should exist")
    };

    let n1 = find(store.node_channels("cs_n1").await.expect("load should succeed"));
    assert!(n1.suspended);
    assert!(n1.ignored);

    let n2 = find(store.node_channels("cs_n2").await.expect("load should succeed"));
    assert!(!n2.suspended);
    assert!(!n2.ignored);
}

pub async fn test_save_channel_updates<S: ChannelStore>(store: &S) {
    store
        .save_channel(&Channel::new("cs_upd", 1))
        .await
        .expect("save should succeed");
    store
        .save_channel(&Channel {
            batch_algorithm: "transactional".to_string(),
            ..Channel::new("cs_upd", 9)
        })
        .await
        .expect("update should succeed");

    let channels = store
        .node_channels("cs_node")
        .await
        .expect("node_channels should succeed");
    let updated: Vec<_> = channels.iter().filter(|c| c.id() == "cs_upd").collect();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].channel.processing_order, 9);
    assert_eq!(updated[0].channel.batch_algorithm, "transactional");
}

pub async fn test_delete_channel<S: ChannelStore>(store: &S) {
    store
        .save_channel(&Channel::new("cs_gone", 1))
        .await
        .expect("save should succeed");
    store
        .save_channel_control("cs_node", "cs_gone", true, false)
        .await
        .expect("control save should succeed");

    store
        .delete_channel("cs_gone")
        .await
        .expect("delete should succeed");
    store
        .delete_channel("cs_never_existed")
        .await
        .expect("deleting a missing channel should succeed");

    let channels = store
        .node_channels("cs_node")
        .await
        .expect("node_channels should succeed");
    assert!(channels.iter().all(|c| c.id() != "cs_gone"));
}

/// Run all ChannelStore tests against an implementation.
#[macro_export]
macro_rules! run_channel_store_tests {
    ($store:expr) => {
        use $crate::storage::channel_store_tests::*;

        test_channels_ordered_with_defaults($store).await;
        println!("  test_channels_ordered_with_defaults: PASSED");

        test_channel_control_is_node_scoped($store).await;
        println!("  test_channel_control_is_node_scoped: PASSED");

        test_save_channel_updates($store).await;
        println!("  test_save_channel_updates: PASSED");

        test_delete_channel($store).await;
        println!("  test_delete_channel: PASSED");
    };
}

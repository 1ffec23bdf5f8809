//! NodeGroupLinkStore interface tests.
//!
//! These tests verify the contract of the NodeGroupLinkStore trait.
//! Each storage implementation should run these tests.

use syncmesh::model::{DataEventAction, NodeGroupLink};
use syncmesh::storage::NodeGroupLinkStore;

pub async fn test_links_for_unknown_group<S: NodeGroupLinkStore>(store: &S) {
    let links = store
        .group_links_for("ls_nobody")
        .await
        .expect("group_links_for should succeed");
    assert!(links.is_empty());
}

pub async fn test_links_for_group_ordered<S: NodeGroupLinkStore>(store: &S) {
    for (target, action) in [
        ("ls_store", DataEventAction::Push),
        ("ls_region", DataEventAction::WaitForPull),
    ] {
        store
            .save_group_link(&NodeGroupLink::new("ls_corp", target, action))
            .await
            .expect("save should succeed");
    }

    let links = store
        .group_links_for("ls_corp")
        .await
        .expect("group_links_for should succeed");
    let targets: Vec<_> = links.iter().map(|l| l.target_group_id.as_str()).collect();
    assert_eq!(targets, vec!["ls_region", "ls_store"]);
    assert_eq!(links[0].data_event_action, DataEventAction::WaitForPull);
    assert_eq!(links[1].data_event_action, DataEventAction::Push);

    let all = store.group_links().await.expect("group_links should succeed");
    assert!(all.len() >= 2);
}

pub async fn test_save_link_replaces_action<S: NodeGroupLinkStore>(store: &S) {
    store
        .save_group_link(&NodeGroupLink::new("ls_a", "ls_b", DataEventAction::Push))
        .await
        .expect("save should succeed");
    store
        .save_group_link(&NodeGroupLink::new("ls_a", "ls_b", DataEventAction::WaitForPull))
        .await
        .expect("second save should succeed");

    let links = store
        .group_links_for("ls_a")
        .await
        .expect("group_links_for should succeed");
    assert_eq!(links.len(), 1);

    let action = store
        .data_event_action("ls_a", "ls_b")
        .await
        .expect("data_event_action should succeed");
    assert_eq!(action, Some(DataEventAction::WaitForPull));
}

pub async fn test_unknown_action_survives<S: NodeGroupLinkStore>(store: &S) {
    store
        .save_group_link(&NodeGroupLink::new(
            "ls_odd",
            "ls_x",
            DataEventAction::from_code("Z"),
        ))
        .await
        .expect("save should succeed");

    let action = store
        .data_event_action("ls_odd", "ls_x")
        .await
        .expect("data_event_action should succeed");
    assert_eq!(action, Some(DataEventAction::Other("Z".to_string())));

    let missing = store
        .data_event_action("ls_odd", "ls_y")
        .await
        .expect("data_event_action should succeed");
    assert!(missing.is_none());
}

/// Run all NodeGroupLinkStore tests against an implementation.
#[macro_export]
macro_rules! run_link_store_tests {
    ($store:expr) => {
        use $crate::storage::link_store_tests::*;

        test_links_for_unknown_group($store).await;
        println!("  test_links_for_unknown_group: PASSED");

        test_links_for_group_ordered($store).await;
        println!("  test_links_for_group_ordered: PASSED");

        test_save_link_replaces_action($store).await;
        println!("  test_save_link_replaces_action: PASSED");

        test_unknown_action_survives($store).await;
        println!("  test_unknown_action_survives: PASSED");
    };
}

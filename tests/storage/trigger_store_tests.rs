//! TriggerStore interface tests.
//!
//! These tests verify the contract of the TriggerStore trait.
//! Each storage implementation should run these tests.
//! Every test uses its own source group so tests can share one database.

use chrono::Utc;

use syncmesh::model::Trigger;
use syncmesh::storage::TriggerStore;

/// Create a capturing trigger.
pub fn make_trigger(id: i64, table: &str, source: &str, target: &str, channel: &str) -> Trigger {
    Trigger {
        trigger_id: id,
        source_table_name: table.to_string(),
        source_group_id: source.to_string(),
        target_group_id: target.to_string(),
        channel_id: channel.to_string(),
        sync_on_insert: true,
        sync_on_update: true,
        sync_on_delete: true,
        initial_load_order: 1,
        ..Default::default()
    }
}

// =============================================================================
// TriggerStore::save_trigger / trigger_by_id tests
// =============================================================================

pub async fn test_trigger_by_id_nonexistent<S: TriggerStore>(store: &S) {
    let trigger = store
        .trigger_by_id(987_654)
        .await
        .expect("trigger_by_id should succeed");
    assert!(trigger.is_none(), "nonexistent trigger should be None");
}

pub async fn test_save_preserves_fields<S: TriggerStore>(store: &S) {
    let trigger = Trigger {
        source_catalog_name: Some("cat".to_string()),
        source_schema_name: Some("sales".to_string()),
        target_table_name: Some("item_copy".to_string()),
        sync_on_delete: false,
        sync_on_incoming_batch: true,
        sync_on_insert_condition: Some("$(curTriggerValue).qty > 0".to_string()),
        name_for_insert_trigger: Some("on_i_item".to_string()),
        excluded_column_names: Some("notes".to_string()),
        router_name: Some("column".to_string()),
        router_expression: Some("STORE_ID=:NODE_ID".to_string()),
        initial_load_order: 7,
        initial_load_select: Some("qty > 0".to_string()),
        updated_by: Some("admin".to_string()),
        ..make_trigger(1001, "item", "ts_fields", "store", "default")
    };
    store.save_trigger(&trigger).await.expect("save should succeed");

    let stored = store
        .trigger_by_id(1001)
        .await
        .expect("trigger_by_id should succeed")
        .expect("trigger should exist");

    assert!(stored.last_modified.is_some(), "save stamps last_modified");
    assert!(stored.build_epoch.is_none());
    let expected = Trigger {
        last_modified: stored.last_modified,
        ..trigger
    };
    assert_eq!(stored, expected);
}

pub async fn test_blank_conditions_read_as_none<S: TriggerStore>(store: &S) {
    let trigger = Trigger {
        sync_on_update_condition: Some("  ".to_string()),
        router_expression: Some(String::new()),
        ..make_trigger(1002, "item", "ts_blank", "store", "default")
    };
    store.save_trigger(&trigger).await.expect("save should succeed");

    let stored = store
        .trigger_by_id(1002)
        .await
        .expect("trigger_by_id should succeed")
        .expect("trigger should exist");
    assert!(stored.sync_on_update_condition.is_none());
    assert!(stored.router_expression.is_none());
}

pub async fn test_save_updates_existing<S: TriggerStore>(store: &S) {
    store
        .save_trigger(&make_trigger(1003, "item", "ts_update", "store", "default"))
        .await
        .expect("save should succeed");
    store
        .save_trigger(&Trigger {
            channel_id: "sales".to_string(),
            ..make_trigger(1003, "item", "ts_update", "store", "default")
        })
        .await
        .expect("second save should succeed");

    let all = store
        .triggers_for_group("ts_update")
        .await
        .expect("triggers_for_group should succeed");
    assert_eq!(all.len(), 1, "save should update, not insert");
    assert_eq!(all[0].channel_id, "sales");
}

// =============================================================================
// TriggerStore active/inactive tests
// =============================================================================

pub async fn test_active_triggers_ordered<S: TriggerStore>(store: &S) {
    for (id, table, order) in [(1012, "sale", 2), (1011, "price", 2), (1010, "item", 1)] {
        store
            .save_trigger(&Trigger {
                initial_load_order: order,
                ..make_trigger(id, table, "ts_order", "store", "default")
            })
            .await
            .expect("save should succeed");
    }

    let active = store
        .active_triggers_for_source_group("ts_order")
        .await
        .expect("active_triggers_for_source_group should succeed");
    let ids: Vec<_> = active.iter().map(|t| t.trigger_id).collect();
    assert_eq!(ids, vec![1010, 1011, 1012], "ordered by load order, then id");
}

pub async fn test_active_excludes_inactive<S: TriggerStore>(store: &S) {
    store
        .save_trigger(&make_trigger(1020, "item", "ts_inactive", "store", "default"))
        .await
        .expect("save should succeed");
    store
        .save_trigger(&Trigger {
            inactive_time: Some(Utc::now()),
            ..make_trigger(1021, "sale", "ts_inactive", "store", "default")
        })
        .await
        .expect("save should succeed");

    let active = store
        .active_triggers_for_source_group("ts_inactive")
        .await
        .expect("active query should succeed");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].trigger_id, 1020);

    let inactive = store
        .inactive_triggers_for_source_group("ts_inactive")
        .await
        .expect("inactive query should succeed");
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].trigger_id, 1021);
    assert!(inactive[0].inactive_time.is_some());
}

pub async fn test_unknown_group_is_empty<S: TriggerStore>(store: &S) {
    let active = store
        .active_triggers_for_source_group("ts_nobody")
        .await
        .expect("active query should succeed");
    assert!(active.is_empty());
}

// =============================================================================
// TriggerStore lookup tests
// =============================================================================

pub async fn test_trigger_for_table_case_insensitive<S: TriggerStore>(store: &S) {
    store
        .save_trigger(&make_trigger(1030, "Item", "ts_table", "store", "default"))
        .await
        .expect("save should succeed");

    let found = store
        .trigger_for_table("ITEM", "ts_table")
        .await
        .expect("trigger_for_table should succeed")
        .expect("trigger should match");
    assert_eq!(found.trigger_id, 1030);

    let missing = store
        .trigger_for_table("item", "ts_other")
        .await
        .expect("trigger_for_table should succeed");
    assert!(missing.is_none());
}

pub async fn test_trigger_for_target<S: TriggerStore>(store: &S) {
    store
        .save_trigger(&make_trigger(1040, "item", "ts_target", "store", "default"))
        .await
        .expect("save should succeed");
    store
        .save_trigger(&make_trigger(1041, "item", "ts_target", "region", "default"))
        .await
        .expect("save should succeed");

    let found = store
        .trigger_for_target("item", "ts_target", "region", "default")
        .await
        .expect("trigger_for_target should succeed")
        .expect("trigger should match");
    assert_eq!(found.trigger_id, 1041);

    let wrong_channel = store
        .trigger_for_target("item", "ts_target", "region", "sales")
        .await
        .expect("trigger_for_target should succeed");
    assert!(wrong_channel.is_none());
}

pub async fn test_triggers_for_reload_exclude_channel<S: TriggerStore>(store: &S) {
    store
        .save_trigger(&make_trigger(1050, "item", "ts_reload", "store", "default"))
        .await
        .expect("save should succeed");
    store
        .save_trigger(&make_trigger(1051, "sym_channel", "ts_reload", "store", "config"))
        .await
        .expect("save should succeed");
    store
        .save_trigger(&make_trigger(1052, "sale", "ts_reload", "region", "default"))
        .await
        .expect("save should succeed");

    let reload = store
        .active_triggers_for_reload("ts_reload", "store", "config")
        .await
        .expect("reload query should succeed");
    let ids: Vec<_> = reload.iter().map(|t| t.trigger_id).collect();
    assert_eq!(ids, vec![1050]);
}

/// Run all TriggerStore tests against an implementation.
#[macro_export]
macro_rules! run_trigger_store_tests {
    ($store:expr) => {
        use $crate::storage::trigger_store_tests::*;

        // save / lookup by id
        test_trigger_by_id_nonexistent($store).await;
        println!("  test_trigger_by_id_nonexistent: PASSED");

        test_save_preserves_fields($store).await;
        println!("  test_save_preserves_fields: PASSED");

        test_blank_conditions_read_as_none($store).await;
        println!("  test_blank_conditions_read_as_none: PASSED");

        test_save_updates_existing($store).await;
        println!("  test_save_updates_existing: PASSED");

        // active / inactive
        test_active_triggers_ordered($store).await;
        println!("  test_active_triggers_ordered: PASSED");

        test_active_excludes_inactive($store).await;
        println!("  test_active_excludes_inactive: PASSED");

        test_unknown_group_is_empty($store).await;
        println!("  test_unknown_group_is_empty: PASSED");

        // lookups
        test_trigger_for_table_case_insensitive($store).await;
        println!("  test_trigger_for_table_case_insensitive: PASSED");

        test_trigger_for_target($store).await;
        println!("  test_trigger_for_target: PASSED");

        test_triggers_for_reload_exclude_channel($store).await;
        println!("  test_triggers_for_reload_exclude_channel: PASSED");
    };
}

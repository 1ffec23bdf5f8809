//! TriggerHistoryStore interface tests.
//!
//! These tests verify the contract of the TriggerHistoryStore trait.
//! Each storage implementation should run these tests.

use chrono::{TimeZone, Utc};

use syncmesh::model::{TriggerHistory, TriggerRebuildReason};
use syncmesh::storage::TriggerHistoryStore;

/// Create a history row for a trigger and table.
pub fn make_history(trigger_id: i64, table: &str) -> TriggerHistory {
    TriggerHistory {
        trigger_history_id: 0,
        trigger_id,
        source_table_name: table.to_string(),
        table_hash: 12345,
        create_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        column_names: "id,name,qty".to_string(),
        pk_column_names: "id".to_string(),
        last_trigger_build_reason: TriggerRebuildReason::NewTriggers,
        name_for_insert_trigger: Some("on_i".to_string()),
        name_for_update_trigger: Some("on_u".to_string()),
        name_for_delete_trigger: None,
        source_schema_name: Some("public".to_string()),
        source_catalog_name: None,
        trigger_row_hash: 99,
    }
}

pub async fn test_history_by_id_nonexistent<S: TriggerHistoryStore>(store: &S) {
    let history = store
        .history_by_id(987_654)
        .await
        .expect("history_by_id should succeed");
    assert!(history.is_none());
}

pub async fn test_insert_assigns_increasing_ids<S: TriggerHistoryStore>(store: &S) {
    let first = store
        .insert_history(&make_history(2001, "hs_item"))
        .await
        .expect("insert should succeed");
    let second = store
        .insert_history(&make_history(2001, "hs_item"))
        .await
        .expect("insert should succeed");
    assert!(first > 0);
    assert!(second > first, "ids should increase");
}

pub async fn test_insert_preserves_fields<S: TriggerHistoryStore>(store: &S) {
    let history = TriggerHistory {
        last_trigger_build_reason: TriggerRebuildReason::TableSchemaChanged,
        ..make_history(2002, "hs_fields")
    };
    let id = store
        .insert_history(&history)
        .await
        .expect("insert should succeed");

    let stored = store
        .history_by_id(id)
        .await
        .expect("history_by_id should succeed")
        .expect("history should exist");
    let expected = TriggerHistory {
        trigger_history_id: id,
        ..history
    };
    assert_eq!(stored, expected);
    assert_eq!(stored.column_names(), vec!["id", "name", "qty"]);
}

pub async fn test_latest_for_trigger<S: TriggerHistoryStore>(store: &S) {
    store
        .insert_history(&make_history(2003, "hs_latest"))
        .await
        .expect("insert should succeed");
    let newest = store
        .insert_history(&make_history(2003, "hs_latest"))
        .await
        .expect("insert should succeed");

    let latest = store
        .latest_for_trigger(2003)
        .await
        .expect("latest_for_trigger should succeed")
        .expect("history should exist");
    assert_eq!(latest.trigger_history_id, newest);

    let none = store
        .latest_for_trigger(2999)
        .await
        .expect("latest_for_trigger should succeed");
    assert!(none.is_none());
}

pub async fn test_latest_for_source_table<S: TriggerHistoryStore>(store: &S) {
    store
        .insert_history(&make_history(2004, "hs_table"))
        .await
        .expect("insert should succeed");
    let newest = store
        .insert_history(&make_history(2005, "hs_table"))
        .await
        .expect("insert should succeed");

    let latest = store
        .latest_for_source_table("hs_table")
        .await
        .expect("latest_for_source_table should succeed")
        .expect("history should exist");
    assert_eq!(latest.trigger_history_id, newest);
    assert_eq!(latest.trigger_id, 2005);
}

pub async fn test_all_history_keyed_by_id<S: TriggerHistoryStore>(store: &S) {
    let id = store
        .insert_history(&make_history(2006, "hs_all"))
        .await
        .expect("insert should succeed");

    let all = store.all_history().await.expect("all_history should succeed");
    let entry = all.get(&id).expect("inserted row should be present");
    assert_eq!(entry.trigger_history_id, id);
    assert_eq!(entry.trigger_id, 2006);
}

/// Run all TriggerHistoryStore tests against an implementation.
#[macro_export]
macro_rules! run_history_store_tests {
    ($store:expr) => {
        use $crate::storage::history_store_tests::*;

        test_history_by_id_nonexistent($store).await;
        println!("  test_history_by_id_nonexistent: PASSED");

        test_insert_assigns_increasing_ids($store).await;
        println!("  test_insert_assigns_increasing_ids: PASSED");

        test_insert_preserves_fields($store).await;
        println!("  test_insert_preserves_fields: PASSED");

        test_latest_for_trigger($store).await;
        println!("  test_latest_for_trigger: PASSED");

        test_latest_for_source_table($store).await;
        println!("  test_latest_for_source_table: PASSED");

        test_all_history_keyed_by_id($store).await;
        println!("  test_all_history_keyed_by_id: PASSED");
    };
}

//! Tests for the CRM service.

use tempfile::TempDir;

use super::*;
use crate::{
    db::DatabaseManagerBuilder,
    params,
    params::{CustomerData, ListCustomers, ListViewingRecords, ViewingRecordData},
};

/// Helper function to create a test database manager
async fn create_test_db() -> (TempDir, DatabaseManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db = DatabaseManagerBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .init()
        .await
        .expect("Failed to initialize database");
    (temp_dir, db)
}

fn customer(name: &str, phone: &str) -> CustomerData {
    CustomerData {
        name: Some(name.to_string()),
        phone: Some(phone.to_string()),
        ..Default::default()
    }
}

fn viewing(customer_id: u64) -> ViewingRecordData {
    ViewingRecordData {
        customer_id: Some(customer_id),
        property_name: Some("测试楼盘".to_string()),
        viewing_status: Some(2),
        commission: Some(1000.0),
        ..Default::default()
    }
}

async fn count(db: &DatabaseManager, table: &str) -> i64 {
    db.query_one(&format!("SELECT COUNT(*) AS n FROM {table}"), &[])
        .await
        .expect("Count failed")
        .and_then(|row| row.get_i64("n"))
        .expect("Count row missing")
}

#[tokio::test]
async fn test_create_and_get_customer() {
    let (_temp_dir, db) = create_test_db().await;
    let crm = Crm::new(&db);

    let created = crm
        .create_customer(&CustomerData {
            community: Some("翠湖花园".to_string()),
            ..customer("张三", "13800138000")
        })
        .await
        .expect("Failed to create customer");

    assert!(created.id > 0);
    assert_eq!(created.name, "张三");
    assert_eq!(created.status, 1);
    assert_eq!(created.community.as_deref(), Some("翠湖花园"));

    let fetched = crm
        .get_customer(created.id)
        .await
        .expect("Failed to get customer")
        .expect("Customer should exist");
    assert_eq!(fetched, created);

    assert!(crm.get_customer(9999).await.expect("Query failed").is_none());
}

#[tokio::test]
async fn test_create_customer_requires_name_and_phone() {
    let (_temp_dir, db) = create_test_db().await;
    let crm = Crm::new(&db);

    let err = crm
        .create_customer(&CustomerData {
            name: Some("王五".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert_eq!(err.field(), Some("phone"));

    let err = crm
        .create_customer(&customer("王五", "110"))
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("phone"));
    assert_eq!(count(&db, "customers").await, 0);
}

#[tokio::test]
async fn test_duplicate_phone_is_conflict() {
    let (_temp_dir, db) = create_test_db().await;
    let crm = Crm::new(&db);

    crm.create_customer(&customer("张三", "13800138000"))
        .await
        .expect("Failed to create customer");
    let err = crm
        .create_customer(&customer("李四", "13800138000"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "CONFLICT");
    assert_eq!(count(&db, "customers").await, 1);
}

#[tokio::test]
async fn test_update_customer_partial() {
    let (_temp_dir, db) = create_test_db().await;
    let crm = Crm::new(&db);

    let created = crm
        .create_customer(&customer("张三", "13800138000"))
        .await
        .expect("Failed to create customer");

    let updated = crm
        .update_customer(
            created.id,
            &CustomerData {
                status: Some(3),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update customer");

    assert_eq!(updated.status, 3);
    assert_eq!(updated.name, "张三");
    assert_eq!(updated.phone, "13800138000");
    assert!(updated.updated_at >= created.updated_at);

    // Keeping one's own phone is not a conflict
    crm.update_customer(
        created.id,
        &CustomerData {
            phone: Some("13800138000".into()),
            ..Default::default()
        },
    )
    .await
    .expect("Re-saving own phone should succeed");
}

#[tokio::test]
async fn test_update_customer_errors() {
    let (_temp_dir, db) = create_test_db().await;
    let crm = Crm::new(&db);

    let first = crm
        .create_customer(&customer("张三", "13800138000"))
        .await
        .expect("Failed to create customer");
    crm.create_customer(&customer("李四", "13900139000"))
        .await
        .expect("Failed to create customer");

    let err = crm
        .update_customer(
            first.id,
            &CustomerData {
                phone: Some("13900139000".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "CONFLICT");

    let err = crm
        .update_customer(
            404,
            &CustomerData {
                name: Some("无名".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::NotFound { id: 404, .. }));

    let err = crm
        .update_customer(
            first.id,
            &CustomerData {
                status: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("status"));
}

#[tokio::test]
async fn test_list_customers_filters() {
    let (_temp_dir, db) = create_test_db().await;
    let crm = Crm::new(&db);

    crm.create_customer(&CustomerData {
        community: Some("翠湖花园".into()),
        ..customer("张三", "13800138000")
    })
    .await
    .expect("Failed to create customer");
    crm.create_customer(&CustomerData {
        status: Some(4),
        ..customer("李四", "13900139000")
    })
    .await
    .expect("Failed to create customer");
    crm.create_customer(&customer("王五", "13700137000"))
        .await
        .expect("Failed to create customer");

    let all = crm
        .list_customers(&ListCustomers::default())
        .await
        .expect("Failed to list customers");
    assert_eq!(all.len(), 3);

    let closed = crm
        .list_customers(&ListCustomers {
            status: Some(4),
            ..Default::default()
        })
        .await
        .expect("Failed to list customers");
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].name, "李四");

    let by_community = crm
        .list_customers(&ListCustomers {
            search: Some("翠湖".into()),
            ..Default::default()
        })
        .await
        .expect("Failed to search customers");
    assert_eq!(by_community.len(), 1);
    assert_eq!(by_community[0].name, "张三");

    let page = crm
        .list_customers(&ListCustomers {
            limit: Some(2),
            offset: Some(2),
            ..Default::default()
        })
        .await
        .expect("Failed to page customers");
    assert_eq!(page.len(), 1);
}

#[tokio::test]
async fn test_create_viewing_record_for_existing_customer() {
    let (_temp_dir, db) = create_test_db().await;
    let crm = Crm::new(&db);

    let owner = crm
        .create_customer(&customer("张三", "13800138000"))
        .await
        .expect("Failed to create customer");

    let record = crm
        .create_viewing_record(&viewing(owner.id))
        .await
        .expect("Failed to create viewing record");

    assert!(record.id > 0);
    assert_eq!(record.customer_id, owner.id);
    assert_eq!(record.customer_name.as_deref(), Some("张三"));
    assert_eq!(record.property_name, "测试楼盘");
    assert_eq!(record.commission, 1000.0);
    assert_eq!(record.viewing_status, 2);
    // No explicit time: falls back to the creation time
    assert!(record.viewing_time.is_some());
    assert_eq!(count(&db, "viewing_records").await, 1);
}

#[tokio::test]
async fn test_create_viewing_record_for_missing_customer_writes_nothing() {
    let (_temp_dir, db) = create_test_db().await;
    let crm = Crm::new(&db);

    let err = crm.create_viewing_record(&viewing(42)).await.unwrap_err();

    assert!(matches!(
        err,
        CrmError::NotFound {
            entity: "Customer",
            id: 42
        }
    ));
    assert_eq!(count(&db, "viewing_records").await, 0);
    assert_eq!(db.pool_status().in_use, 0);
}

#[tokio::test]
async fn test_viewing_record_validation_precedes_database() {
    let (_temp_dir, db) = create_test_db().await;
    let crm = Crm::new(&db);

    let err = crm
        .create_viewing_record(&ViewingRecordData {
            commission: Some(-1.0),
            ..viewing(1)
        })
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("commission"));

    let err = crm
        .create_viewing_record(&ViewingRecordData {
            customer_id: None,
            ..viewing(1)
        })
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("customer_id"));
}

#[tokio::test]
async fn test_default_property_name() {
    let (_temp_dir, db) = create_test_db().await;
    let crm = Crm::new(&db);
    let owner = crm
        .create_customer(&customer("张三", "13800138000"))
        .await
        .expect("Failed to create customer");

    let record = crm
        .create_viewing_record(&ViewingRecordData {
            customer_id: Some(owner.id),
            ..Default::default()
        })
        .await
        .expect("Failed to create viewing record");

    assert_eq!(record.property_name, "未知楼盘");
    assert_eq!(record.viewing_status, 1);
    assert_eq!(record.commission, 0.0);
}

#[tokio::test]
async fn test_update_and_delete_viewing_record() {
    let (_temp_dir, db) = create_test_db().await;
    let crm = Crm::new(&db);
    let owner = crm
        .create_customer(&customer("张三", "13800138000"))
        .await
        .expect("Failed to create customer");
    let record = crm
        .create_viewing_record(&viewing(owner.id))
        .await
        .expect("Failed to create viewing record");

    let updated = crm
        .update_viewing_record(
            record.id,
            &ViewingRecordData {
                viewing_status: Some(4),
                viewing_feedback: Some(1),
                viewing_time: Some("2024-05-01 14:30:00".into()),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update viewing record");
    assert_eq!(updated.viewing_status, 4);
    assert_eq!(updated.viewing_feedback, Some(1));
    assert_eq!(updated.viewing_time.as_deref(), Some("2024-05-01 14:30:00"));
    assert_eq!(updated.property_name, "测试楼盘");

    let err = crm
        .update_viewing_record(
            record.id,
            &ViewingRecordData {
                customer_id: Some(77),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::NotFound { id: 77, .. }));

    let deleted = crm
        .delete_viewing_record(record.id)
        .await
        .expect("Failed to delete viewing record");
    assert_eq!(deleted.id, record.id);
    assert!(crm
        .get_viewing_record(record.id)
        .await
        .expect("Query failed")
        .is_none());

    let err = crm.delete_viewing_record(record.id).await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_list_viewing_records_filters() {
    let (_temp_dir, db) = create_test_db().await;
    let crm = Crm::new(&db);
    let a = crm
        .create_customer(&customer("张三", "13800138000"))
        .await
        .expect("Failed to create customer");
    let b = crm
        .create_customer(&customer("李四", "13900139000"))
        .await
        .expect("Failed to create customer");

    crm.create_viewing_record(&viewing(a.id))
        .await
        .expect("Failed to create viewing record");
    crm.create_viewing_record(&ViewingRecordData {
        viewing_status: Some(1),
        ..viewing(a.id)
    })
    .await
    .expect("Failed to create viewing record");
    crm.create_viewing_record(&viewing(b.id))
        .await
        .expect("Failed to create viewing record");

    let for_a = crm
        .list_viewing_records(&ListViewingRecords {
            customer_id: Some(a.id),
            ..Default::default()
        })
        .await
        .expect("Failed to list viewing records");
    assert_eq!(for_a.len(), 2);
    assert!(for_a.iter().all(|r| r.customer_id == a.id));

    let viewed = crm
        .list_viewing_records(&ListViewingRecords {
            viewing_status: Some(2),
            ..Default::default()
        })
        .await
        .expect("Failed to list viewing records");
    assert_eq!(viewed.len(), 2);
}

#[tokio::test]
async fn test_viewing_times_in_mixed_formats_list_chronologically() {
    let (_temp_dir, db) = create_test_db().await;
    let crm = Crm::new(&db);
    let owner = crm
        .create_customer(&customer("张三", "13800138000"))
        .await
        .expect("Failed to create customer");

    let afternoon = crm
        .create_viewing_record(&ViewingRecordData {
            viewing_time: Some("2024-05-01 14:30".into()),
            ..viewing(owner.id)
        })
        .await
        .expect("Failed to create viewing record");
    let morning = crm
        .create_viewing_record(&ViewingRecordData {
            viewing_time: Some("2024-05-01T09:00:00Z".into()),
            ..viewing(owner.id)
        })
        .await
        .expect("Failed to create viewing record");
    assert_eq!(afternoon.viewing_time.as_deref(), Some("2024-05-01 14:30:00"));
    assert_eq!(morning.viewing_time.as_deref(), Some("2024-05-01 09:00:00"));

    let listed = crm
        .list_viewing_records(&ListViewingRecords::default())
        .await
        .expect("Failed to list viewing records");
    let ids: Vec<u64> = listed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![afternoon.id, morning.id]);

    // Moving the morning viewing to an evening slot in another offset
    let evening = crm
        .update_viewing_record(
            morning.id,
            &ViewingRecordData {
                viewing_time: Some("2024-05-02T02:00:00+08:00".into()),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update viewing record");
    assert_eq!(evening.viewing_time.as_deref(), Some("2024-05-01 18:00:00"));

    let listed = crm
        .list_viewing_records(&ListViewingRecords::default())
        .await
        .expect("Failed to list viewing records");
    let ids: Vec<u64> = listed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![morning.id, afternoon.id]);
}

#[tokio::test]
async fn test_delete_customer_removes_viewings() {
    let (_temp_dir, db) = create_test_db().await;
    let crm = Crm::new(&db);
    let owner = crm
        .create_customer(&customer("张三", "13800138000"))
        .await
        .expect("Failed to create customer");
    crm.create_viewing_record(&viewing(owner.id))
        .await
        .expect("Failed to create viewing record");

    let deleted = crm
        .delete_customer(owner.id)
        .await
        .expect("Failed to delete customer");
    assert_eq!(deleted.id, owner.id);
    assert_eq!(count(&db, "customers").await, 0);
    assert_eq!(count(&db, "viewing_records").await, 0);

    let err = crm.delete_customer(owner.id).await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_statistics() {
    let (_temp_dir, db) = create_test_db().await;
    let crm = Crm::new(&db);

    let empty = crm.statistics().await.expect("Failed to get statistics");
    assert_eq!(empty.total_customers, 0);
    assert_eq!(empty.total_viewings, 0);
    assert_eq!(empty.total_commission, 0.0);

    let owner = crm
        .create_customer(&customer("张三", "13800138000"))
        .await
        .expect("Failed to create customer");
    crm.create_customer(&CustomerData {
        status: Some(4),
        ..customer("李四", "13900139000")
    })
    .await
    .expect("Failed to create customer");
    crm.create_viewing_record(&viewing(owner.id))
        .await
        .expect("Failed to create viewing record");
    crm.create_viewing_record(&ViewingRecordData {
        viewing_status: Some(4),
        viewing_feedback: Some(1),
        commission: Some(5000.0),
        ..viewing(owner.id)
    })
    .await
    .expect("Failed to create viewing record");

    let stats = crm.statistics().await.expect("Failed to get statistics");
    assert_eq!(stats.total_customers, 2);
    assert_eq!(stats.customers_by_status.len(), 2);
    assert_eq!(stats.total_viewings, 2);
    assert_eq!(stats.interested_viewings, 1);
    assert_eq!(stats.total_commission, 6000.0);
    assert_eq!(stats.deal_commission, 5000.0);
    assert_eq!(stats.deal_rate(), 0.5);

    let deals = stats
        .viewings_by_status
        .iter()
        .find(|s| s.status == 4)
        .expect("Deal bucket should exist");
    assert_eq!(deals.count, 1);
    assert_eq!(deals.label, "已成交");
}

#[tokio::test]
async fn test_service_propagates_raw_queries() {
    let (_temp_dir, db) = create_test_db().await;
    let crm = Crm::new(&db);

    let inserted = crm
        .database()
        .execute(
            "INSERT INTO customers (name, phone, status, created_at, updated_at) VALUES (?1, ?2, 1, ?3, ?3)",
            &params!["赵六", "13600136000", "2024-01-01T00:00:00Z"],
        )
        .await
        .expect("Insert failed");
    assert_eq!(inserted.changes, 1);

    let found = crm
        .get_customer(inserted.last_insert_rowid as u64)
        .await
        .expect("Query failed")
        .expect("Customer should exist");
    assert_eq!(found.name, "赵六");
}

//! Record Store Client Tests
//!
//! HttpRecordStore against an httpmock server, MemoryRecordStore directly.

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;
    use serde_json::json;

    use crate::api::{HttpRecordStore, MemoryRecordStore, RecordStore, StoreOp};
    use crate::config::{AppConfig, DataSource, Environment};
    use crate::error::StoreError;
    use crate::models::{CreateItemRequest, RemotePriority, RemoteStatus, UpdateItemRequest};

    fn store_for(server: &MockServer, data_source: DataSource) -> HttpRecordStore {
        let mut config = AppConfig::for_environment(Environment::Development);
        config.base_url = server.base_url();
        config.data_source = data_source;
        HttpRecordStore::new(config)
    }

    fn sample_request() -> CreateItemRequest {
        CreateItemRequest {
            user: 1,
            name: "Nursing pillow".to_string(),
            description: "Boppy".to_string(),
            priority: RemotePriority::High,
            source_url: String::new(),
            status: RemoteStatus::Pending,
            cost: 45.0,
            notes: "Boppy".to_string(),
            category: "Feeding".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_items_sends_data_source_tag() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/shopping_item")
                    .header("X-Data-Source", "test");
                then.status(200).json_body(json!([
                    {"id": 1, "name": "Crib", "priority": "high", "status": "pending",
                     "cost": 0, "source_url": "", "notes": "", "category": "Sleep & Safety"},
                    {"id": 2, "name": "Wipes", "priority": "low", "status": "purchased",
                     "cost": 12.5, "source_url": "", "notes": "", "category": "Diapers"}
                ]));
            })
            .await;

        let store = store_for(&server, DataSource::Test);
        let items = store.list_items().await.expect("list failed");

        mock.assert_async().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].status, RemoteStatus::Purchased);
        assert_eq!(items[1].cost, 12.5);
    }

    #[tokio::test]
    async fn test_create_posts_json_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/shopping_item")
                    .header("X-Data-Source", "live")
                    .body_contains("\"name\":\"Nursing pillow\"")
                    .body_contains("\"priority\":\"high\"");
                then.status(200).json_body(json!({
                    "id": 42, "created_at": 1718000000000_i64, "user": 1, "name": "Nursing pillow",
                    "description": "Boppy", "priority": "high", "source_url": "",
                    "status": "pending", "cost": 45, "notes": "Boppy", "category": "Feeding"
                }));
            })
            .await;

        let store = store_for(&server, DataSource::Live);
        let created = store.create_item(&sample_request()).await.expect("create failed");

        mock.assert_async().await;
        assert_eq!(created.id, 42);
        assert_eq!(created.name, "Nursing pillow");
    }

    #[tokio::test]
    async fn test_update_uses_patch_on_item_path() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PATCH).path("/shopping_item/5").body_contains("\"cost\":3.5");
                then.status(200).json_body(json!({"id": 5, "name": "Socks", "cost": 3.5}));
            })
            .await;

        let store = store_for(&server, DataSource::Test);
        let patch = UpdateItemRequest {
            cost: Some(3.5),
            ..Default::default()
        };
        let updated = store.update_item(5, &patch).await.expect("update failed");

        mock.assert_async().await;
        assert_eq!(updated.cost, 3.5);
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PATCH).path("/shopping_item/9");
                then.status(400).body("record not found");
            })
            .await;

        let store = store_for(&server, DataSource::Test);
        let err = store
            .update_item(9, &UpdateItemRequest::default())
            .await
            .expect_err("should fail");

        assert_eq!(err.status, Some(400));
        assert_eq!(err.message, "HTTP 400: record not found");
        assert!(err.is_missing_record());
    }

    #[tokio::test]
    async fn test_error_without_body_uses_reason() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/shopping_item/3");
                then.status(500);
            })
            .await;

        let store = store_for(&server, DataSource::Test);
        let err = store.delete_item(3).await.expect_err("should fail");

        assert_eq!(err.status, Some(500));
        assert_eq!(err.message, "HTTP 500: Internal Server Error");
    }

    #[tokio::test]
    async fn test_undecodable_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/shopping_item");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let store = store_for(&server, DataSource::Test);
        let err = store.list_items().await.expect_err("should fail");

        assert_eq!(err, StoreError::new("Failed to parse response as JSON"));
    }

    #[tokio::test]
    async fn test_transport_failure_has_no_status() {
        let mut config = AppConfig::for_environment(Environment::Development);
        config.base_url = "http://127.0.0.1:1".to_string();
        let store = HttpRecordStore::new(config);

        let err = store.get_item(1).await.expect_err("should fail");
        assert_eq!(err.status, None);
        assert!(err.message.starts_with("Failed to fetch item 1"));
    }

    #[tokio::test]
    async fn test_memory_store_assigns_ids_and_rejects_unknown() {
        let store = MemoryRecordStore::new();

        let first = store.create_item(&sample_request()).await.unwrap();
        let second = store.create_item(&sample_request()).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        let err = store.update_item(99, &UpdateItemRequest::default()).await.unwrap_err();
        assert!(err.is_bad_request());

        store.delete_item(first.id).await.unwrap();
        assert_eq!(store.list_items().await.unwrap().len(), 1);
        assert!(store.get_item(first.id).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_store_injected_failure() {
        let store = MemoryRecordStore::new();
        store.fail_next(StoreOp::List, StoreError::with_status(503, "HTTP 503: down"));

        assert!(store.list_items().await.is_err());
        assert!(store.list_items().await.is_ok());
        assert_eq!(store.calls().lists, 2);
    }
}

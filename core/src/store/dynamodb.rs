use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::types::AttributeValue;
use tracing::debug;

use super::conversions::{
    Item, connection_to_item, group_to_item, image_to_item, item_to_connection, item_to_group,
    item_to_image,
};
use super::{ConnectionStore, GroupStore, ImageStore};
use crate::config::TableConfig;
use crate::errors::{Result, StorageError};
use crate::models::{Connection, Group, Image, Page};

/// DynamoDB backed store for all three tables.
pub struct DynamoDbStore {
    client: Client,
    tables: TableConfig,
}

impl DynamoDbStore {
    pub fn new(client: Client, tables: TableConfig) -> Self {
        Self { client, tables }
    }
}

fn throttled(table: &str, reason: &str) -> StorageError {
    StorageError::Throttled {
        table: table.to_string(),
        reason: reason.to_string(),
    }
}

fn failed(operation: &'static str, table: &str, reason: impl Into<String>) -> StorageError {
    StorageError::OperationFailed {
        operation,
        table: table.to_string(),
        reason: reason.into(),
    }
}

fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
    table: &str,
) -> StorageError {
    match err.into_service_error() {
        ScanError::ProvisionedThroughputExceededException(_) => {
            throttled(table, "Throughput exceeded, please retry")
        }
        ScanError::RequestLimitExceeded(_) => throttled(table, "Request limit exceeded, please retry"),
        ScanError::ResourceNotFoundException(_) => failed("Scan", table, "Table not found"),
        err => failed("Scan", table, format!("{:?}", err)),
    }
}

fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
    table: &str,
) -> StorageError {
    match err.into_service_error() {
        QueryError::ProvisionedThroughputExceededException(_) => {
            throttled(table, "Throughput exceeded, please retry")
        }
        QueryError::RequestLimitExceeded(_) => {
            throttled(table, "Request limit exceeded, please retry")
        }
        QueryError::ResourceNotFoundException(_) => failed("Query", table, "Table not found"),
        err => failed("Query", table, format!("{:?}", err)),
    }
}

fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
    table: &str,
) -> StorageError {
    match err.into_service_error() {
        GetItemError::ProvisionedThroughputExceededException(_) => {
            throttled(table, "Throughput exceeded, please retry")
        }
        GetItemError::RequestLimitExceeded(_) => {
            throttled(table, "Request limit exceeded, please retry")
        }
        GetItemError::ResourceNotFoundException(_) => failed("GetItem", table, "Table not found"),
        err => failed("GetItem", table, format!("{:?}", err)),
    }
}

fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    table: &str,
) -> StorageError {
    match err.into_service_error() {
        PutItemError::ProvisionedThroughputExceededException(_) => {
            throttled(table, "Throughput exceeded, please retry")
        }
        PutItemError::RequestLimitExceeded(_) => {
            throttled(table, "Request limit exceeded, please retry")
        }
        PutItemError::ResourceNotFoundException(_) => failed("PutItem", table, "Table not found"),
        err => failed("PutItem", table, format!("{:?}", err)),
    }
}

fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
    table: &str,
) -> StorageError {
    match err.into_service_error() {
        DeleteItemError::ProvisionedThroughputExceededException(_) => {
            throttled(table, "Throughput exceeded, please retry")
        }
        DeleteItemError::RequestLimitExceeded(_) => {
            throttled(table, "Request limit exceeded, please retry")
        }
        DeleteItemError::ResourceNotFoundException(_) => {
            failed("DeleteItem", table, "Table not found")
        }
        err => failed("DeleteItem", table, format!("{:?}", err)),
    }
}

fn string_key(name: &str, value: String) -> Item {
    HashMap::from([(name.to_string(), AttributeValue::S(value))])
}

#[async_trait]
impl GroupStore for DynamoDbStore {
    async fn list_groups(&self, limit: Option<i32>, next_key: Option<String>) -> Result<Page<Group>> {
        let table = &self.tables.groups;
        let output = self
            .client
            .scan()
            .table_name(table)
            .set_limit(limit)
            .set_exclusive_start_key(next_key.map(|id| string_key("id", id)))
            .send()
            .await
            .map_err(|e| map_scan_error(e, table))?;

        let items = output
            .items
            .unwrap_or_default()
            .iter()
            .map(|item| item_to_group(item, table))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let next_key = output
            .last_evaluated_key
            .and_then(|key| key.get("id").and_then(|id| id.as_s().ok()).cloned());

        debug!("Scanned {} groups from {}", items.len(), table);
        Ok(Page { items, next_key })
    }

    async fn create_group(&self, group: &Group) -> Result<()> {
        let table = &self.tables.groups;
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(group_to_item(group)))
            .send()
            .await
            .map_err(|e| map_put_item_error(e, table))?;
        Ok(())
    }

    async fn group_exists(&self, group_id: &str) -> Result<bool> {
        let table = &self.tables.groups;
        let output = self
            .client
            .get_item()
            .table_name(table)
            .key("id", AttributeValue::S(group_id.to_string()))
            .send()
            .await
            .map_err(|e| map_get_item_error(e, table))?;

        let exists = output.item.is_some();
        debug!("Group {} exists: {}", group_id, exists);
        Ok(exists)
    }
}

#[async_trait]
impl ImageStore for DynamoDbStore {
    async fn images_for_group(&self, group_id: &str) -> Result<Vec<Image>> {
        let table = &self.tables.images;
        let mut images = Vec::new();
        let mut start_key: Option<Item> = None;

        // Query pages at 1 MB; keep going until DynamoDB stops returning a key.
        loop {
            let output = self
                .client
                .query()
                .table_name(table)
                .key_condition_expression("groupId = :groupId")
                .expression_attribute_values(":groupId", AttributeValue::S(group_id.to_string()))
                .scan_index_forward(false)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| map_query_error(e, table))?;

            for item in output.items.unwrap_or_default() {
                images.push(item_to_image(&item, table)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(images)
    }

    async fn image_by_id(&self, image_id: &str) -> Result<Option<Image>> {
        let table = &self.tables.images;
        let output = self
            .client
            .query()
            .table_name(table)
            .index_name(&self.tables.image_id_index)
            .key_condition_expression("imageId = :imageId")
            .expression_attribute_values(":imageId", AttributeValue::S(image_id.to_string()))
            .send()
            .await
            .map_err(|e| map_query_error(e, table))?;

        match output.items.unwrap_or_default().first() {
            Some(item) => Ok(Some(item_to_image(item, table)?)),
            None => Ok(None),
        }
    }

    async fn create_image(&self, image: &Image) -> Result<()> {
        let table = &self.tables.images;
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(image_to_item(image)))
            .send()
            .await
            .map_err(|e| map_put_item_error(e, table))?;
        Ok(())
    }
}

#[async_trait]
impl ConnectionStore for DynamoDbStore {
    async fn add_connection(&self, connection: &Connection) -> Result<()> {
        let table = &self.tables.connections;
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(connection_to_item(connection)))
            .send()
            .await
            .map_err(|e| map_put_item_error(e, table))?;
        Ok(())
    }

    async fn remove_connection(&self, connection_id: &str) -> Result<()> {
        let table = &self.tables.connections;
        self.client
            .delete_item()
            .table_name(table)
            .key("id", AttributeValue::S(connection_id.to_string()))
            .send()
            .await
            .map_err(|e| map_delete_item_error(e, table))?;
        Ok(())
    }

    async fn list_connections(&self) -> Result<Vec<Connection>> {
        let table = &self.tables.connections;
        let mut connections = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(table)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| map_scan_error(e, table))?;

            for item in output.items.unwrap_or_default() {
                connections.push(item_to_connection(&item, table)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        debug!("Found {} open connections", connections.len());
        Ok(connections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UdagramError;
    use aws_sdk_dynamodb::operation::get_item::GetItemOutput;
    use aws_sdk_dynamodb::operation::put_item::PutItemOutput;
    use aws_sdk_dynamodb::operation::query::QueryOutput;
    use aws_sdk_dynamodb::operation::scan::ScanOutput;
    use aws_sdk_dynamodb::types::error::ProvisionedThroughputExceededException;
    use aws_smithy_mocks::{mock, mock_client};

    fn tables() -> TableConfig {
        TableConfig {
            groups: "Groups-test".to_string(),
            images: "Images-test".to_string(),
            image_id_index: "ImageIdIndex".to_string(),
            connections: "Connections-test".to_string(),
        }
    }

    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }

    fn group_item(id: &str, name: &str) -> Item {
        HashMap::from([
            ("id".to_string(), s(id)),
            ("name".to_string(), s(name)),
            ("description".to_string(), s("")),
        ])
    }

    fn image_item(image_id: &str) -> Item {
        HashMap::from([
            ("groupId".to_string(), s("g-1")),
            ("timestamp".to_string(), s("2024-03-01T10:00:00.000Z")),
            ("imageId".to_string(), s(image_id)),
            ("title".to_string(), s("Sunset")),
            ("imageUrl".to_string(), s("https://bucket.s3.amazonaws.com/img-1")),
        ])
    }

    #[tokio::test]
    async fn test_list_groups_returns_page_and_next_key() {
        let scan_rule = mock!(aws_sdk_dynamodb::Client::scan)
            .match_requests(|req| req.table_name() == Some("Groups-test") && req.limit() == Some(1))
            .then_output(|| {
                ScanOutput::builder()
                    .items(group_item("g-1", "Dogs"))
                    .last_evaluated_key("id", AttributeValue::S("g-1".to_string()))
                    .build()
            });
        let client = mock_client!(aws_sdk_dynamodb, [&scan_rule]);
        let store = DynamoDbStore::new(client, tables());

        let page = store.list_groups(Some(1), None).await.unwrap();

        assert_eq!(scan_rule.num_calls(), 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Dogs");
        assert_eq!(page.next_key.as_deref(), Some("g-1"));
    }

    #[tokio::test]
    async fn test_list_groups_passes_start_key() {
        let scan_rule = mock!(aws_sdk_dynamodb::Client::scan)
            .match_requests(|req| {
                req.exclusive_start_key()
                    .and_then(|key| key.get("id"))
                    .and_then(|id| id.as_s().ok())
                    .map(|id| id == "g-1")
                    .unwrap_or(false)
            })
            .then_output(|| ScanOutput::builder().items(group_item("g-2", "Cats")).build());
        let client = mock_client!(aws_sdk_dynamodb, [&scan_rule]);
        let store = DynamoDbStore::new(client, tables());

        let page = store.list_groups(None, Some("g-1".to_string())).await.unwrap();

        assert_eq!(page.items[0].id, "g-2");
        assert_eq!(page.next_key, None);
    }

    #[tokio::test]
    async fn test_throttled_scan_is_retryable() {
        let scan_rule = mock!(aws_sdk_dynamodb::Client::scan).then_error(|| {
            ScanError::ProvisionedThroughputExceededException(
                ProvisionedThroughputExceededException::builder()
                    .message("slow down")
                    .build(),
            )
        });
        let client = mock_client!(aws_sdk_dynamodb, [&scan_rule]);
        let store = DynamoDbStore::new(client, tables());

        let err = store.list_groups(None, None).await.unwrap_err();

        assert!(matches!(err, UdagramError::Storage(StorageError::Throttled { .. })));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_group_exists() {
        let get_rule = mock!(aws_sdk_dynamodb::Client::get_item)
            .match_requests(|req| req.table_name() == Some("Groups-test"))
            .then_output(|| GetItemOutput::builder().set_item(Some(group_item("g-1", "Dogs"))).build());
        let client = mock_client!(aws_sdk_dynamodb, [&get_rule]);
        let store = DynamoDbStore::new(client, tables());

        assert!(store.group_exists("g-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_group_missing() {
        let get_rule =
            mock!(aws_sdk_dynamodb::Client::get_item).then_output(|| GetItemOutput::builder().build());
        let client = mock_client!(aws_sdk_dynamodb, [&get_rule]);
        let store = DynamoDbStore::new(client, tables());

        assert!(!store.group_exists("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_images_for_group_queries_newest_first() {
        let query_rule = mock!(aws_sdk_dynamodb::Client::query)
            .match_requests(|req| {
                req.table_name() == Some("Images-test") && req.scan_index_forward() == Some(false)
            })
            .then_output(|| {
                QueryOutput::builder()
                    .items(image_item("img-2"))
                    .items(image_item("img-1"))
                    .build()
            });
        let client = mock_client!(aws_sdk_dynamodb, [&query_rule]);
        let store = DynamoDbStore::new(client, tables());

        let images = store.images_for_group("g-1").await.unwrap();

        assert_eq!(query_rule.num_calls(), 1);
        let ids: Vec<_> = images.iter().map(|image| image.image_id.as_str()).collect();
        assert_eq!(ids, vec!["img-2", "img-1"]);
    }

    #[tokio::test]
    async fn test_image_by_id_uses_index() {
        let query_rule = mock!(aws_sdk_dynamodb::Client::query)
            .match_requests(|req| req.index_name() == Some("ImageIdIndex"))
            .then_output(|| QueryOutput::builder().items(image_item("img-9")).build());
        let client = mock_client!(aws_sdk_dynamodb, [&query_rule]);
        let store = DynamoDbStore::new(client, tables());

        let image = store.image_by_id("img-9").await.unwrap();
        assert_eq!(image.unwrap().image_id, "img-9");
    }

    #[tokio::test]
    async fn test_image_by_id_not_found() {
        let query_rule =
            mock!(aws_sdk_dynamodb::Client::query).then_output(|| QueryOutput::builder().build());
        let client = mock_client!(aws_sdk_dynamodb, [&query_rule]);
        let store = DynamoDbStore::new(client, tables());

        assert!(store.image_by_id("img-0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_connection_writes_item() {
        let put_rule = mock!(aws_sdk_dynamodb::Client::put_item)
            .match_requests(|req| {
                req.table_name() == Some("Connections-test")
                    && req.item().and_then(|item| item.get("id")) == Some(&s("conn-1"))
            })
            .then_output(|| PutItemOutput::builder().build());
        let client = mock_client!(aws_sdk_dynamodb, [&put_rule]);
        let store = DynamoDbStore::new(client, tables());

        let connection = Connection {
            id: "conn-1".to_string(),
            timestamp: "2024-03-01T10:00:00.000Z".to_string(),
        };
        store.add_connection(&connection).await.unwrap();

        assert_eq!(put_rule.num_calls(), 1);
    }
}

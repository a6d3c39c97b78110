//! Mapping between domain records and DynamoDB items.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use crate::errors::StorageError;
use crate::models::{Connection, Group, Image};

pub(crate) type Item = HashMap<String, AttributeValue>;

fn required_string(item: &Item, table: &str, attribute: &str) -> Result<String, StorageError> {
    item.get(attribute)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .ok_or_else(|| StorageError::InvalidItem {
            table: table.to_string(),
            attribute: attribute.to_string(),
        })
}

fn optional_string(item: &Item, attribute: &str) -> Option<String> {
    item.get(attribute).and_then(|value| value.as_s().ok()).cloned()
}

fn string(value: &str) -> AttributeValue {
    AttributeValue::S(value.to_string())
}

pub(crate) fn group_to_item(group: &Group) -> Item {
    let mut item = HashMap::from([
        ("id".to_string(), string(&group.id)),
        ("name".to_string(), string(&group.name)),
        ("description".to_string(), string(&group.description)),
    ]);
    if let Some(user_id) = &group.user_id {
        item.insert("userId".to_string(), string(user_id));
    }
    item
}

pub(crate) fn item_to_group(item: &Item, table: &str) -> Result<Group, StorageError> {
    Ok(Group {
        id: required_string(item, table, "id")?,
        user_id: optional_string(item, "userId"),
        name: required_string(item, table, "name")?,
        description: optional_string(item, "description").unwrap_or_default(),
    })
}

pub(crate) fn image_to_item(image: &Image) -> Item {
    let mut item = HashMap::from([
        ("groupId".to_string(), string(&image.group_id)),
        ("timestamp".to_string(), string(&image.timestamp)),
        ("imageId".to_string(), string(&image.image_id)),
        ("title".to_string(), string(&image.title)),
        ("imageUrl".to_string(), string(&image.image_url)),
    ]);
    if let Some(user_id) = &image.user_id {
        item.insert("userId".to_string(), string(user_id));
    }
    item
}

pub(crate) fn item_to_image(item: &Item, table: &str) -> Result<Image, StorageError> {
    Ok(Image {
        group_id: required_string(item, table, "groupId")?,
        timestamp: required_string(item, table, "timestamp")?,
        image_id: required_string(item, table, "imageId")?,
        title: optional_string(item, "title").unwrap_or_default(),
        image_url: required_string(item, table, "imageUrl")?,
        user_id: optional_string(item, "userId"),
    })
}

pub(crate) fn connection_to_item(connection: &Connection) -> Item {
    HashMap::from([
        ("id".to_string(), string(&connection.id)),
        ("timestamp".to_string(), string(&connection.timestamp)),
    ])
}

pub(crate) fn item_to_connection(item: &Item, table: &str) -> Result<Connection, StorageError> {
    Ok(Connection {
        id: required_string(item, table, "id")?,
        timestamp: optional_string(item, "timestamp").unwrap_or_default(),
    })
}

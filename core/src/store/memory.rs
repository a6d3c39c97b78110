use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ConnectionStore, GroupStore, ImageStore};
use crate::errors::Result;
use crate::models::{Connection, Group, Image, Page};

/// Process-local store. Groups keep insertion order so paging is stable.
#[derive(Default)]
pub struct InMemoryStore {
    groups: RwLock<Vec<Group>>,
    images: RwLock<Vec<Image>>,
    connections: RwLock<BTreeMap<String, Connection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupStore for InMemoryStore {
    async fn list_groups(&self, limit: Option<i32>, next_key: Option<String>) -> Result<Page<Group>> {
        let groups = self.groups.read().await;

        let start = match next_key {
            Some(key) => groups
                .iter()
                .position(|group| group.id == key)
                .map(|index| index + 1)
                .unwrap_or(groups.len()),
            None => 0,
        };
        let remaining = &groups[start..];
        let take = limit
            .and_then(|limit| usize::try_from(limit).ok())
            .unwrap_or(remaining.len())
            .min(remaining.len());

        let items = remaining[..take].to_vec();
        let next_key = if take < remaining.len() {
            items.last().map(|group| group.id.clone())
        } else {
            None
        };

        Ok(Page { items, next_key })
    }

    async fn create_group(&self, group: &Group) -> Result<()> {
        let mut groups = self.groups.write().await;
        match groups.iter_mut().find(|existing| existing.id == group.id) {
            Some(existing) => *existing = group.clone(),
            None => groups.push(group.clone()),
        }
        Ok(())
    }

    async fn group_exists(&self, group_id: &str) -> Result<bool> {
        let groups = self.groups.read().await;
        Ok(groups.iter().any(|group| group.id == group_id))
    }
}

#[async_trait]
impl ImageStore for InMemoryStore {
    async fn images_for_group(&self, group_id: &str) -> Result<Vec<Image>> {
        let images = self.images.read().await;
        let mut matching: Vec<Image> = images
            .iter()
            .filter(|image| image.group_id == group_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(matching)
    }

    async fn image_by_id(&self, image_id: &str) -> Result<Option<Image>> {
        let images = self.images.read().await;
        Ok(images.iter().find(|image| image.image_id == image_id).cloned())
    }

    /// `(group_id, timestamp)` is the item key, so a repeated key replaces the image.
    async fn create_image(&self, image: &Image) -> Result<()> {
        let mut images = self.images.write().await;
        match images.iter_mut().find(|existing| {
            existing.group_id == image.group_id && existing.timestamp == image.timestamp
        }) {
            Some(existing) => *existing = image.clone(),
            None => images.push(image.clone()),
        }
        Ok(())
    }
}

#[async_trait]
impl ConnectionStore for InMemoryStore {
    async fn add_connection(&self, connection: &Connection) -> Result<()> {
        self.connections
            .write()
            .await
            .insert(connection.id.clone(), connection.clone());
        Ok(())
    }

    async fn remove_connection(&self, connection_id: &str) -> Result<()> {
        self.connections.write().await.remove(connection_id);
        Ok(())
    }

    async fn list_connections(&self) -> Result<Vec<Connection>> {
        Ok(self.connections.read().await.values().cloned().collect())
    }
}

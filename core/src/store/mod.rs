//! Persistence for groups, images and WebSocket connections.
//!
//! The handlers only see the traits below. `DynamoDbStore` backs them in
//! Lambda; `InMemoryStore` backs them in tests and local runs.

mod conversions;
pub mod dynamodb;
pub mod memory;

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::{Connection, Group, Image, Page};

pub use dynamodb::DynamoDbStore;
pub use memory::InMemoryStore;

#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Returns up to `limit` groups, starting after the group whose id is `next_key`.
    async fn list_groups(&self, limit: Option<i32>, next_key: Option<String>) -> Result<Page<Group>>;

    async fn create_group(&self, group: &Group) -> Result<()>;

    async fn group_exists(&self, group_id: &str) -> Result<bool>;
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Images of one group, newest first.
    async fn images_for_group(&self, group_id: &str) -> Result<Vec<Image>>;

    async fn image_by_id(&self, image_id: &str) -> Result<Option<Image>>;

    async fn create_image(&self, image: &Image) -> Result<()>;
}

#[async_trait]
pub trait ConnectionStore: Send + Sync {
    async fn add_connection(&self, connection: &Connection) -> Result<()>;

    async fn remove_connection(&self, connection_id: &str) -> Result<()>;

    async fn list_connections(&self) -> Result<Vec<Connection>>;
}

use serde::{Deserialize, Serialize};

use crate::errors::RequestError;

const MAX_FIELD_LENGTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    pub description: String,
}

/// Body of `POST /groups`. Server assigned fields are rejected, not ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl NewGroup {
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.name.trim().is_empty() {
            return Err(RequestError::Validation {
                field: "name",
                reason: "cannot be empty".to_string(),
            });
        }
        check_length("name", &self.name)?;
        check_length("description", &self.description)
    }

    pub fn into_group(self, id: String, user_id: Option<String>) -> Group {
        Group {
            id,
            user_id,
            name: self.name,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub group_id: String,
    pub timestamp: String,
    pub image_id: String,
    pub title: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Body of `POST /groups/{groupId}/images`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewImage {
    pub title: String,
}

impl NewImage {
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.title.trim().is_empty() {
            return Err(RequestError::Validation {
                field: "title",
                reason: "cannot be empty".to_string(),
            });
        }
        check_length("title", &self.title)
    }
}

fn check_length(field: &'static str, value: &str) -> Result<(), RequestError> {
    if value.chars().count() > MAX_FIELD_LENGTH {
        return Err(RequestError::Validation {
            field,
            reason: format!("must be at most {MAX_FIELD_LENGTH} characters"),
        });
    }
    Ok(())
}

/// An open WebSocket connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Connection {
    pub id: String,
    pub timestamp: String,
}

/// Document stored in the search index for every uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDocument {
    pub image_id: String,
    pub group_id: String,
    pub image_url: String,
    pub title: String,
    pub timestamp: String,
}

impl From<&Image> for ImageDocument {
    fn from(image: &Image) -> Self {
        Self {
            image_id: image.image_id.clone(),
            group_id: image.group_id.clone(),
            image_url: image.image_url.clone(),
            title: image.title.clone(),
            timestamp: image.timestamp.clone(),
        }
    }
}

/// One page of a scan. `next_key` is handed back by the client to continue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_key: Option<String>,
}

use chrono::{SecondsFormat, Utc};
use lambda_http::http::StatusCode;
use lambda_http::{Body, Error, Request, Response};
use serde_json::{Value, json};
use tracing::info;

use super::{authorization_header, parse_body, path_parameter, respond, user_id};
use crate::config::StorageConfig;
use crate::errors::{Result, StorageError};
use crate::media::ImageStorage;
use crate::models::{Image, NewImage};
use crate::store::{GroupStore, ImageStore};

async fn ensure_group(groups: &dyn GroupStore, group_id: &str) -> Result<()> {
    if groups.group_exists(group_id).await? {
        Ok(())
    } else {
        Err(StorageError::NotFound {
            entity: "Group",
            id: group_id.to_string(),
        }
        .into())
    }
}

async fn list_images(
    groups: &dyn GroupStore,
    images: &dyn ImageStore,
    request: &Request,
) -> Result<Value> {
    let group_id = path_parameter(request, "groupId")?;
    ensure_group(groups, &group_id).await?;

    let items = images.images_for_group(&group_id).await?;
    info!(%group_id, count = items.len(), "Listed images");
    Ok(json!({ "items": items }))
}

async fn find_image(images: &dyn ImageStore, request: &Request) -> Result<Image> {
    let image_id = path_parameter(request, "imageId")?;

    images
        .image_by_id(&image_id)
        .await?
        .ok_or_else(|| {
            StorageError::NotFound {
                entity: "Image",
                id: image_id,
            }
            .into()
        })
}

async fn add_image(
    groups: &dyn GroupStore,
    images: &dyn ImageStore,
    storage: &dyn ImageStorage,
    config: &StorageConfig,
    request: &Request,
) -> Result<Value> {
    let group_id = path_parameter(request, "groupId")?;
    let new_image: NewImage = parse_body(request)?;
    new_image.validate()?;
    ensure_group(groups, &group_id).await?;

    // Uploads are allowed anonymously; a presented token must still be well formed.
    let user_id = match authorization_header(request) {
        Some(_) => Some(user_id(request)?),
        None => None,
    };

    let image_id = uuid::Uuid::new_v4().to_string();
    let image = Image {
        group_id,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        image_url: config.image_url(&image_id),
        image_id,
        title: new_image.title,
        user_id,
    };

    // No record is written unless an upload URL was issued.
    let upload_url = storage.upload_url(&image.image_id).await?;
    images.create_image(&image).await?;
    info!(image_id = %image.image_id, group_id = %image.group_id, "Created image");

    Ok(json!({ "newItem": image, "uploadUrl": upload_url }))
}

/// `GET /groups/{groupId}/images`
pub async fn get_images(
    groups: &dyn GroupStore,
    images: &dyn ImageStore,
    request: &Request,
) -> std::result::Result<Response<Body>, Error> {
    respond(StatusCode::OK, list_images(groups, images, request).await)
}

/// `GET /images/{imageId}`
pub async fn get_image(
    images: &dyn ImageStore,
    request: &Request,
) -> std::result::Result<Response<Body>, Error> {
    respond(StatusCode::OK, find_image(images, request).await)
}

/// `POST /groups/{groupId}/images`
pub async fn create_image(
    groups: &dyn GroupStore,
    images: &dyn ImageStore,
    storage: &dyn ImageStorage,
    config: &StorageConfig,
    request: &Request,
) -> std::result::Result<Response<Body>, Error> {
    respond(
        StatusCode::CREATED,
        add_image(groups, images, storage, config, request).await,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::test_tokens::{expires_in, hs256};
    use crate::config::create_test_config;
    use crate::http::test_requests::{body_json, request, with_bearer, with_path};
    use crate::models::Group;
    use crate::store::InMemoryStore;
    use crate::test_support::FakeImageStorage;

    async fn store_with_group(group_id: &str) -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .create_group(&Group {
                id: group_id.to_string(),
                user_id: None,
                name: "Holidays".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        store
    }

    fn image(image_id: &str, group_id: &str, timestamp: &str) -> Image {
        Image {
            group_id: group_id.to_string(),
            timestamp: timestamp.to_string(),
            image_id: image_id.to_string(),
            title: format!("title {image_id}"),
            image_url: format!("https://udagram-images-test.s3.amazonaws.com/{image_id}"),
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_get_images_for_missing_group() {
        let store = InMemoryStore::new();
        let req = with_path(request(""), "groupId", "nope");

        let response = get_images(&store, &store, &req).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(&response), json!({ "error": "Group does not exist" }));
    }

    #[tokio::test]
    async fn test_get_images_newest_first() {
        let store = store_with_group("g-1").await;
        store.create_image(&image("a", "g-1", "2024-01-01T00:00:00.000Z")).await.unwrap();
        store.create_image(&image("b", "g-1", "2024-01-02T00:00:00.000Z")).await.unwrap();

        let req = with_path(request(""), "groupId", "g-1");
        let response = get_images(&store, &store, &req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(&response);
        assert_eq!(body["items"][0]["imageId"], "b");
        assert_eq!(body["items"][1]["imageId"], "a");
    }

    #[tokio::test]
    async fn test_get_images_without_path_parameter() {
        let store = InMemoryStore::new();

        let response = get_images(&store, &store, &request("")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_image() {
        let store = store_with_group("g-1").await;
        store.create_image(&image("img-1", "g-1", "2024-01-01T00:00:00.000Z")).await.unwrap();

        let found = get_image(&store, &with_path(request(""), "imageId", "img-1"))
            .await
            .unwrap();
        assert_eq!(found.status(), StatusCode::OK);
        assert_eq!(body_json(&found)["title"], "title img-1");

        let missing = get_image(&store, &with_path(request(""), "imageId", "img-2"))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(&missing)["error"], "Image does not exist");
    }

    #[tokio::test]
    async fn test_create_image_returns_upload_url() {
        let store = store_with_group("g-1").await;
        let storage = FakeImageStorage::default();
        let config = create_test_config();
        let req = with_bearer(
            with_path(request(r#"{"title": "Beach"}"#), "groupId", "g-1"),
            &hs256("auth0|5", expires_in(60)),
        );

        let response = create_image(&store, &store, &storage, &config.storage, &req)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(&response);
        let image_id = body["newItem"]["imageId"].as_str().unwrap().to_string();
        assert_eq!(body["newItem"]["groupId"], "g-1");
        assert_eq!(body["newItem"]["title"], "Beach");
        assert_eq!(body["newItem"]["userId"], "auth0|5");
        assert_eq!(
            body["newItem"]["imageUrl"],
            format!("https://udagram-images-test.s3.amazonaws.com/{image_id}")
        );
        assert_eq!(
            body["uploadUrl"],
            format!("https://upload.test/{image_id}?signature=fake")
        );
        assert!(body["newItem"]["timestamp"].as_str().unwrap().ends_with('Z'));

        let stored = store.image_by_id(&image_id).await.unwrap().unwrap();
        assert_eq!(stored.group_id, "g-1");
    }

    #[tokio::test]
    async fn test_create_image_anonymous() {
        let store = store_with_group("g-1").await;
        let storage = FakeImageStorage::default();
        let config = create_test_config();
        let req = with_path(request(r#"{"title": "Beach"}"#), "groupId", "g-1");

        let response = create_image(&store, &store, &storage, &config.storage, &req)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(body_json(&response)["newItem"].get("userId").is_none());
    }

    #[tokio::test]
    async fn test_create_image_for_missing_group() {
        let store = InMemoryStore::new();
        let storage = FakeImageStorage::default();
        let config = create_test_config();
        let req = with_path(request(r#"{"title": "Beach"}"#), "groupId", "nope");

        let response = create_image(&store, &store, &storage, &config.storage, &req)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(store.images_for_group("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_image_requires_title() {
        let store = store_with_group("g-1").await;
        let storage = FakeImageStorage::default();
        let config = create_test_config();
        let req = with_path(request(r#"{"title": ""}"#), "groupId", "g-1");

        let response = create_image(&store, &store, &storage, &config.storage, &req)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_image_presign_failure_stores_nothing() {
        let store = store_with_group("g-1").await;
        let storage = FakeImageStorage::failing_presign();
        let config = create_test_config();
        let req = with_path(request(r#"{"title": "Beach"}"#), "groupId", "g-1");

        let response = create_image(&store, &store, &storage, &config.storage, &req)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&response), json!({ "error": "Internal server error" }));
        assert!(store.images_for_group("g-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_image_rejects_client_supplied_fields() {
        let store = store_with_group("g-1").await;
        let storage = FakeImageStorage::default();
        let config = create_test_config();
        let req = with_path(
            request(r#"{"title": "Beach", "imageUrl": "https://evil.example/x.png"}"#),
            "groupId",
            "g-1",
        );

        let response = create_image(&store, &store, &storage, &config.storage, &req)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.images_for_group("g-1").await.unwrap().is_empty());
    }
}

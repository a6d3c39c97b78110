//! Fixtures shared by the unit tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_lambda_events::event::s3::S3Event;
use aws_lambda_events::event::sns::SnsEvent;
use image::{DynamicImage, ImageFormat};
use serde_json::{Value, json};

use crate::errors::{MediaError, Result};
use crate::media::ImageStorage;

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

pub fn s3_event_json(bucket: &str, keys: &[&str]) -> serde_json::Value {
    let records: Vec<_> = keys
        .iter()
        .map(|key| {
            json!({
                "eventVersion": "2.1",
                "eventSource": "aws:s3",
                "awsRegion": "us-east-1",
                "eventTime": "2024-03-01T10:00:00.000Z",
                "eventName": "ObjectCreated:Put",
                "userIdentity": { "principalId": "EXAMPLE" },
                "requestParameters": { "sourceIPAddress": "127.0.0.1" },
                "responseElements": {
                    "x-amz-request-id": "EXAMPLE123456789",
                    "x-amz-id-2": "EXAMPLE123/abcdefghijklmnopqrstuvwxyz"
                },
                "s3": {
                    "s3SchemaVersion": "1.0",
                    "configurationId": "ImageUploaded",
                    "bucket": {
                        "name": bucket,
                        "ownerIdentity": { "principalId": "EXAMPLE" },
                        "arn": format!("arn:aws:s3:::{bucket}")
                    },
                    "object": {
                        "key": key,
                        "size": 1024,
                        "eTag": "0123456789abcdef0123456789abcdef",
                        "sequencer": "0A1B2C3D4E5F678901"
                    }
                }
            })
        })
        .collect();

    json!({ "Records": records })
}

pub fn s3_event(bucket: &str, keys: &[&str]) -> S3Event {
    serde_json::from_value(s3_event_json(bucket, keys)).unwrap()
}

/// SNS event whose messages carry the given raw bodies.
pub fn sns_event(messages: &[String]) -> SnsEvent {
    let records: Vec<_> = messages
        .iter()
        .enumerate()
        .map(|(index, message)| {
            json!({
                "EventVersion": "1.0",
                "EventSubscriptionArn": "arn:aws:sns:us-east-1:123456789012:imagesTopic:sub",
                "EventSource": "aws:sns",
                "Sns": {
                    "SignatureVersion": "1",
                    "Timestamp": "2024-03-01T10:00:01.000Z",
                    "Signature": "EXAMPLE",
                    "SigningCertUrl": "https://sns.us-east-1.amazonaws.com/cert.pem",
                    "MessageId": format!("message-{index}"),
                    "Message": message,
                    "MessageAttributes": {},
                    "Type": "Notification",
                    "UnsubscribeUrl": "https://sns.us-east-1.amazonaws.com/unsubscribe",
                    "TopicArn": "arn:aws:sns:us-east-1:123456789012:imagesTopic",
                    "Subject": "Amazon S3 Notification"
                }
            })
        })
        .collect();

    serde_json::from_value(json!({ "Records": records })).unwrap()
}

/// One Images table stream record. A null `new_image` leaves `NewImage` out.
pub fn stream_record(event_name: &str, new_image: Value) -> Value {
    let mut change = json!({
        "Keys": { "groupId": { "S": "g-1" }, "timestamp": { "S": "2024-03-01T10:00:00.000Z" } },
        "SequenceNumber": "111",
        "SizeBytes": 26,
        "StreamViewType": "NEW_IMAGE"
    });
    if !new_image.is_null() {
        change["NewImage"] = new_image;
    }

    json!({
        "eventID": "c4ca4238a0b923820dcc509a6f75849b",
        "eventName": event_name,
        "eventVersion": "1.1",
        "eventSource": "aws:dynamodb",
        "awsRegion": "us-east-1",
        "dynamodb": change,
        "eventSourceARN": "arn:aws:dynamodb:us-east-1:123456789012:table/Images-dev/stream/2024-03-01T00:00:00.000"
    })
}

#[derive(Default)]
pub struct FakeImageStorage {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    thumbnails: Mutex<HashMap<String, Vec<u8>>>,
    presign_fails: bool,
}

impl FakeImageStorage {
    pub fn failing_presign() -> Self {
        Self {
            presign_fails: true,
            ..Self::default()
        }
    }

    pub fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), bytes);
    }

    pub fn thumbnail(&self, key: &str) -> Option<Vec<u8>> {
        self.thumbnails.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ImageStorage for FakeImageStorage {
    async fn upload_url(&self, key: &str) -> Result<String> {
        if self.presign_fails {
            return Err(MediaError::Presign {
                bucket: "udagram-images-test".to_string(),
                key: key.to_string(),
                reason: "credentials expired".to_string(),
            }
            .into());
        }
        Ok(format!("https://upload.test/{key}?signature=fake"))
    }

    async fn fetch_image(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| {
                MediaError::Download {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    reason: "NoSuchKey".to_string(),
                }
                .into()
            })
    }

    async fn store_thumbnail(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.thumbnails.lock().unwrap().insert(key.to_string(), bytes);
        Ok(())
    }
}

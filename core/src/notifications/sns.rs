use aws_lambda_events::event::s3::S3Event;
use aws_lambda_events::event::sns::SnsEvent;

use crate::errors::{NotificationError, Result};

/// S3 notifications fanned out through the images topic arrive as SNS
/// messages whose body is the original S3 event.
pub fn s3_events(event: &SnsEvent) -> Result<Vec<S3Event>> {
    event
        .records
        .iter()
        .map(|record| {
            serde_json::from_str::<S3Event>(&record.sns.message).map_err(|e| {
                NotificationError::MalformedMessage {
                    message_id: record.sns.message_id.clone(),
                    reason: e.to_string(),
                }
                .into()
            })
        })
        .collect()
}

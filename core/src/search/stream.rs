//! Images table stream records as delivered to Lambda.

use aws_lambda_events::event::dynamodb::EventRecord;

use crate::models::{Image, ImageDocument};

pub use aws_lambda_events::event::dynamodb::Event as StreamEvent;

pub fn is_insert(record: &EventRecord) -> bool {
    record.event_name == "INSERT"
}

/// The item written by the insert, as it is indexed.
pub fn image_document(record: &EventRecord) -> Result<ImageDocument, serde_dynamo::Error> {
    let image: Image = serde_dynamo::from_item(record.change.new_image.clone())?;
    Ok(ImageDocument::from(&image))
}

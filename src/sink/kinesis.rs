//! Kinesis event stream

use super::retry::is_retryable_sdk_error;
use super::{EventStream, StreamReceipt};
use crate::error::{Error, Result, SinkKind};
use async_trait::async_trait;
use aws_sdk_kinesis::error::DisplayErrorContext;
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::Client;
use bytes::Bytes;
use tracing::debug;

/// Event stream backed by a Kinesis data stream
#[derive(Debug, Clone)]
pub struct KinesisEventStream {
    client: Client,
    stream_name: String,
}

impl KinesisEventStream {
    /// Create a stream client from a loaded AWS config
    pub fn new(config: &aws_config::SdkConfig, stream_name: impl Into<String>) -> Self {
        Self {
            client: Client::new(config),
            stream_name: stream_name.into(),
        }
    }
}

#[async_trait]
impl EventStream for KinesisEventStream {
    fn name(&self) -> &str {
        &self.stream_name
    }

    async fn put_record(&self, partition_key: &str, payload: Bytes) -> Result<StreamReceipt> {
        let output = self
            .client
            .put_record()
            .stream_name(&self.stream_name)
            .partition_key(partition_key)
            .data(Blob::new(payload.to_vec()))
            .send()
            .await
            .map_err(|e| {
                Error::sink(
                    SinkKind::Stream,
                    partition_key,
                    DisplayErrorContext(&e).to_string(),
                    is_retryable_sdk_error(&e),
                )
            })?;

        debug!(
            "Record put to shard {} at sequence number {}",
            output.shard_id(),
            output.sequence_number()
        );

        Ok(StreamReceipt {
            shard_id: output.shard_id().to_string(),
            sequence_number: output.sequence_number().to_string(),
        })
    }
}

//! DynamoDB order table

use super::retry::is_retryable_sdk_error;
use super::{Item, ItemValue, OrderTable};
use crate::error::{Error, Result, SinkKind};
use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;
use tracing::debug;

/// Order table backed by a DynamoDB table keyed on `orderId`
#[derive(Debug, Clone)]
pub struct DynamoOrderTable {
    client: Client,
    table_name: String,
}

impl DynamoOrderTable {
    /// Create a table client from a loaded AWS config
    pub fn new(config: &aws_config::SdkConfig, table_name: impl Into<String>) -> Self {
        Self {
            client: Client::new(config),
            table_name: table_name.into(),
        }
    }
}

/// Map an item value onto the DynamoDB wire type
///
/// Numbers are sent as their exact decimal string.
pub fn attribute_value(value: &ItemValue) -> AttributeValue {
    match value {
        ItemValue::S(s) => AttributeValue::S(s.clone()),
        ItemValue::N(n) => AttributeValue::N(n.to_string()),
        ItemValue::Bool(b) => AttributeValue::Bool(*b),
        ItemValue::Null => AttributeValue::Null(true),
        ItemValue::L(list) => AttributeValue::L(list.iter().map(attribute_value).collect()),
        ItemValue::M(map) => AttributeValue::M(to_attribute_map(map)),
    }
}

fn to_attribute_map(item: &Item) -> HashMap<String, AttributeValue> {
    item.iter()
        .map(|(k, v)| (k.clone(), attribute_value(v)))
        .collect()
}

#[async_trait]
impl OrderTable for DynamoOrderTable {
    fn name(&self) -> &str {
        &self.table_name
    }

    async fn put_item(&self, order_id: &str, item: Item) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_attribute_map(&item)))
            .send()
            .await
            .map_err(|e| {
                Error::sink(
                    SinkKind::Table,
                    order_id,
                    DisplayErrorContext(&e).to_string(),
                    is_retryable_sdk_error(&e),
                )
            })?;

        debug!("Put item {} into table {}", order_id, self.table_name);
        Ok(())
    }
}

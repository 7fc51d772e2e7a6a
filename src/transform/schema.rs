//! Fixed Arrow schema of the flattened order table

use super::flatten::FlatRow;
use crate::error::{Error, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray, StructArray};
use arrow::buffer::NullBuffer;
use arrow::datatypes::{DataType, Field, Fields, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Partition column, encoded in directory names rather than stored
pub const PARTITION_COLUMN: &str = "createdDate";

fn payment_fields() -> Fields {
    Fields::from(vec![
        Field::new("attempts", DataType::Int64, true),
        Field::new("status", DataType::Utf8, true),
    ])
}

/// Schema of the Parquet files (without the partition column)
pub fn flat_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("eventId", DataType::Utf8, true),
        Field::new("eventTime", DataType::Utf8, true),
        Field::new("eventType", DataType::Utf8, true),
        Field::new("orderId", DataType::Utf8, true),
        Field::new("customerId", DataType::Utf8, true),
        Field::new("createdAt", DataType::Utf8, true),
        Field::new("totalAmount", DataType::Float64, true),
        Field::new("currency", DataType::Utf8, true),
        Field::new("status", DataType::Utf8, true),
        Field::new("fulfilmentWarehouse", DataType::Utf8, true),
        Field::new("payment", DataType::Struct(payment_fields()), true),
        Field::new("sku", DataType::Utf8, true),
        Field::new("qty", DataType::Int64, true),
        Field::new("price", DataType::Float64, true),
    ]))
}

/// Hive type name of an Arrow type, for catalog definitions
pub fn hive_type(data_type: &DataType) -> Result<String> {
    Ok(match data_type {
        DataType::Utf8 => "string".to_string(),
        DataType::Float64 => "double".to_string(),
        DataType::Int64 => "bigint".to_string(),
        DataType::Boolean => "boolean".to_string(),
        DataType::Date32 => "date".to_string(),
        DataType::Struct(fields) => {
            let members = fields
                .iter()
                .map(|f| Ok(format!("{}:{}", f.name(), hive_type(f.data_type())?)))
                .collect::<Result<Vec<_>>>()?;
            format!("struct<{}>", members.join(","))
        }
        other => {
            return Err(Error::output(format!(
                "No catalog type for Arrow type {other}"
            )))
        }
    })
}

fn strings<'a>(rows: &'a [FlatRow], f: impl Fn(&'a FlatRow) -> Option<&'a str>) -> ArrayRef {
    Arc::new(rows.iter().map(f).collect::<StringArray>())
}

fn payment_array(rows: &[FlatRow]) -> Result<ArrayRef> {
    let attempts: Int64Array = rows
        .iter()
        .map(|r| r.payment.as_ref().and_then(|p| p.attempts))
        .collect();
    let status: StringArray = rows
        .iter()
        .map(|r| r.payment.as_ref().and_then(|p| p.status.as_deref()))
        .collect();
    let validity = NullBuffer::from(rows.iter().map(|r| r.payment.is_some()).collect::<Vec<_>>());

    let array = StructArray::try_new(
        payment_fields(),
        vec![Arc::new(attempts), Arc::new(status)],
        Some(validity),
    )?;
    Ok(Arc::new(array))
}

/// Build a record batch from flat rows
pub fn rows_to_batch(rows: &[FlatRow]) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = vec![
        strings(rows, |r| r.event_id.as_deref()),
        strings(rows, |r| r.event_time.as_deref()),
        strings(rows, |r| r.event_type.as_deref()),
        strings(rows, |r| r.order_id.as_deref()),
        strings(rows, |r| r.customer_id.as_deref()),
        strings(rows, |r| r.created_at.as_deref()),
        Arc::new(rows.iter().map(|r| r.total_amount).collect::<Float64Array>()),
        strings(rows, |r| r.currency.as_deref()),
        strings(rows, |r| r.status.as_deref()),
        strings(rows, |r| r.fulfilment_warehouse.as_deref()),
        payment_array(rows)?,
        strings(rows, |r| r.sku.as_deref()),
        Arc::new(rows.iter().map(|r| r.qty).collect::<Int64Array>()),
        Arc::new(rows.iter().map(|r| r.price).collect::<Float64Array>()),
    ];

    Ok(RecordBatch::try_new(flat_schema(), columns)?)
}

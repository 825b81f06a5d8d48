//! Parquet encoding and decoding for [`RecordTable`] via Arrow record batches.

use super::{Column, RecordTable, TableError, Value};
use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Field, Float32Type, Float64Type, Int16Type, Int32Type,
    Int64Type, Int8Type, Schema, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow::record_batch::{RecordBatch, RecordBatchReader};
use bytes::Bytes;
use ::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use ::parquet::arrow::ArrowWriter;
use std::sync::Arc;

/// Decode a complete Parquet file held in memory.
pub fn decode_parquet(bytes: Bytes) -> Result<RecordTable, TableError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)?.build()?;
    let schema = reader.schema();

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); schema.fields().len()];
    for batch in reader {
        let batch = batch?;
        for (idx, field) in schema.fields().iter().enumerate() {
            columns[idx].extend(array_values(field.name(), batch.column(idx))?);
        }
    }

    let columns = schema
        .fields()
        .iter()
        .zip(columns)
        .map(|(field, values)| Column::new(field.name().clone(), values))
        .collect();
    RecordTable::from_columns(columns)
}

/// Encode a table as a single-row-group Parquet file.
///
/// Integer columns map to `Int64`, columns mixing integers and floats to
/// `Float64`, everything else to `Utf8`.
pub fn encode_parquet(table: &RecordTable) -> Result<Vec<u8>, TableError> {
    let mut fields = Vec::with_capacity(table.n_columns());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.n_columns());
    for column in table.columns() {
        let array = column_array(column);
        fields.push(Field::new(column.name(), array.data_type().clone(), true));
        arrays.push(array);
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(buf)
}

fn primitive_values<T, F>(array: &ArrayRef, convert: F) -> Vec<Value>
where
    T: ArrowPrimitiveType,
    F: Fn(T::Native) -> Value,
{
    let typed = array.as_primitive::<T>();
    (0..typed.len())
        .map(|i| {
            if typed.is_null(i) {
                Value::Null
            } else {
                convert(typed.value(i))
            }
        })
        .collect()
}

fn array_values(name: &str, array: &ArrayRef) -> Result<Vec<Value>, TableError> {
    let values = match array.data_type() {
        DataType::Int8 => primitive_values::<Int8Type, _>(array, |v| Value::Int(v.into())),
        DataType::Int16 => primitive_values::<Int16Type, _>(array, |v| Value::Int(v.into())),
        DataType::Int32 => primitive_values::<Int32Type, _>(array, |v| Value::Int(v.into())),
        DataType::Int64 => primitive_values::<Int64Type, _>(array, Value::Int),
        DataType::UInt8 => primitive_values::<UInt8Type, _>(array, |v| Value::Int(v.into())),
        DataType::UInt16 => primitive_values::<UInt16Type, _>(array, |v| Value::Int(v.into())),
        DataType::UInt32 => primitive_values::<UInt32Type, _>(array, |v| Value::Int(v.into())),
        DataType::UInt64 => primitive_values::<UInt64Type, _>(array, |v| {
            i64::try_from(v).map(Value::Int).unwrap_or(Value::Float(v as f64))
        }),
        DataType::Float32 => primitive_values::<Float32Type, _>(array, |v| Value::Float(v.into())),
        DataType::Float64 => primitive_values::<Float64Type, _>(array, Value::Float),
        DataType::Boolean => {
            let typed = array.as_boolean();
            (0..typed.len())
                .map(|i| {
                    if typed.is_null(i) {
                        Value::Null
                    } else {
                        Value::Int(typed.value(i) as i64)
                    }
                })
                .collect()
        }
        DataType::Utf8 => {
            let typed = array.as_string::<i32>();
            (0..typed.len())
                .map(|i| {
                    if typed.is_null(i) {
                        Value::Null
                    } else {
                        Value::Text(typed.value(i).to_string())
                    }
                })
                .collect()
        }
        DataType::LargeUtf8 => {
            let typed = array.as_string::<i64>();
            (0..typed.len())
                .map(|i| {
                    if typed.is_null(i) {
                        Value::Null
                    } else {
                        Value::Text(typed.value(i).to_string())
                    }
                })
                .collect()
        }
        DataType::Null => vec![Value::Null; array.len()],
        other => {
            return Err(TableError::UnsupportedType {
                column: name.to_string(),
                data_type: other.to_string(),
            })
        }
    };
    Ok(values)
}

fn column_array(column: &Column) -> ArrayRef {
    let values = column.values();
    let all_int = values
        .iter()
        .all(|v| matches!(v, Value::Int(_) | Value::Null));
    let all_numeric = values
        .iter()
        .all(|v| matches!(v, Value::Int(_) | Value::Float(_) | Value::Null));

    if all_int {
        Arc::new(
            values
                .iter()
                .map(|v| match v {
                    Value::Int(i) => Some(*i),
                    _ => None,
                })
                .collect::<Int64Array>(),
        )
    } else if all_numeric {
        Arc::new(values.iter().map(Value::as_f64).collect::<Float64Array>())
    } else {
        Arc::new(
            values
                .iter()
                .map(|v| (!v.is_null()).then(|| v.to_string()))
                .collect::<StringArray>(),
        )
    }
}

//! Point table (Feather v2 / Arrow IPC file)
//!
//! Column types vary with how the upstream dataframe was written, so each
//! column is cast to the one representation we need rather than matched
//! against a single expected schema.

use super::{parse_timestamp, PointRecord, TopicId};
use crate::error::{LoadError, LoadResult};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type, TimeUnit};
use arrow::ipc::reader::FileReader;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use std::io::Cursor;
use tracing::warn;

pub const X: &str = "x";
pub const Y: &str = "y";
pub const TOPIC_NUMBER: &str = "Topic Number";
pub const TOPIC_LABEL: &str = "Topic Label";
pub const TOXICITY: &str = "Toxicity";
pub const POSTS: &str = "Number of Posts";
pub const CREATED_AT: &str = "createdAt";
pub const MARKER_SIZE: &str = "marker_size";

/// Decode every record batch in the file
///
/// Rows without a creation time are dropped: they can never pass a date
/// cutoff and take no part in the slider's range.
pub fn parse(bytes: &[u8]) -> LoadResult<Vec<PointRecord>> {
    let reader = FileReader::try_new(Cursor::new(bytes), None)?;

    let mut points = Vec::new();
    let mut undated = 0usize;
    for batch in reader {
        undated += decode_batch(&batch?, &mut points)?;
    }

    if undated > 0 {
        warn!(undated, "dropped points without a createdAt value");
    }
    Ok(points)
}

/// Append the batch's rows, returning how many were dropped
fn decode_batch(batch: &RecordBatch, out: &mut Vec<PointRecord>) -> LoadResult<usize> {
    let xs = float_column(batch, X)?;
    let ys = float_column(batch, Y)?;
    let topics = topic_column(batch)?;
    let labels = string_column(batch, TOPIC_LABEL)?;
    let toxicity = float_column(batch, TOXICITY)?;
    let posts = int_column(batch, POSTS)?;
    let created = timestamp_column(batch)?;
    let sizes = float_column(batch, MARKER_SIZE)?;

    let mut dropped = 0;
    for row in 0..batch.num_rows() {
        let Some(created_at) = created[row] else {
            dropped += 1;
            continue;
        };
        out.push(PointRecord {
            x: xs[row].unwrap_or(f64::NAN),
            y: ys[row].unwrap_or(f64::NAN),
            topic: topics[row],
            label: labels[row].clone().unwrap_or_default(),
            toxicity: toxicity[row].unwrap_or(f64::NAN),
            posts: posts[row].unwrap_or(0),
            created_at,
            marker_size: sizes[row].unwrap_or(f64::NAN),
        });
    }
    Ok(dropped)
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> LoadResult<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
}

fn unsupported(name: &str, data_type: &DataType) -> LoadError {
    LoadError::UnsupportedType {
        column: name.to_string(),
        data_type: data_type.to_string(),
    }
}

fn float_column(batch: &RecordBatch, name: &str) -> LoadResult<Vec<Option<f64>>> {
    let array = column(batch, name)?;
    if !array.data_type().is_numeric() {
        return Err(unsupported(name, array.data_type()));
    }
    let floats = cast(array, &DataType::Float64)?;
    Ok(floats.as_primitive::<Float64Type>().iter().collect())
}

fn int_column(batch: &RecordBatch, name: &str) -> LoadResult<Vec<Option<i64>>> {
    let array = column(batch, name)?;
    if !array.data_type().is_numeric() {
        return Err(unsupported(name, array.data_type()));
    }
    // Safe cast: NaN and out-of-range floats come back as nulls
    let ints = cast(array, &DataType::Int64)?;
    Ok(ints.as_primitive::<Int64Type>().iter().collect())
}

fn string_column(batch: &RecordBatch, name: &str) -> LoadResult<Vec<Option<String>>> {
    let array = column(batch, name)?;
    let strings = cast(array, &DataType::Utf8)
        .map_err(|_| unsupported(name, array.data_type()))?;
    Ok(strings
        .as_string::<i32>()
        .iter()
        .map(|s| s.map(str::to_owned))
        .collect())
}

/// Integer, float (NaN = missing) or label-style strings
fn topic_column(batch: &RecordBatch) -> LoadResult<Vec<Option<TopicId>>> {
    let array = column(batch, TOPIC_NUMBER)?;
    if array.data_type().is_numeric() {
        let floats = cast(array, &DataType::Float64)?;
        return Ok(floats
            .as_primitive::<Float64Type>()
            .iter()
            .map(|v| v.and_then(TopicId::from_f64))
            .collect());
    }
    Ok(string_column(batch, TOPIC_NUMBER)?
        .into_iter()
        .map(|s| s.as_deref().and_then(TopicId::parse))
        .collect())
}

fn timestamp_column(batch: &RecordBatch) -> LoadResult<Vec<Option<DateTime<Utc>>>> {
    let array = column(batch, CREATED_AT)?;
    match array.data_type() {
        DataType::Timestamp(unit, _) => {
            let unit = *unit;
            // Arrow stores instants as UTC epoch offsets whatever the zone
            let raw = cast(array, &DataType::Int64)?;
            raw.as_primitive::<Int64Type>()
                .iter()
                .enumerate()
                .map(|(row, value)| match value {
                    None => Ok(None),
                    Some(v) => from_epoch(v, unit).map(Some).ok_or_else(|| {
                        invalid(row, format!("timestamp {} out of range", v))
                    }),
                })
                .collect()
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View | DataType::Dictionary(_, _) => {
            string_column(batch, CREATED_AT)?
                .into_iter()
                .enumerate()
                .map(|(row, text)| match text {
                    None => Ok(None),
                    Some(text) => parse_timestamp(&text)
                        .map(Some)
                        .ok_or_else(|| invalid(row, format!("unparseable timestamp '{}'", text))),
                })
                .collect()
        }
        other => Err(unsupported(CREATED_AT, other)),
    }
}

fn from_epoch(value: i64, unit: TimeUnit) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Second => DateTime::<Utc>::from_timestamp(value, 0),
        TimeUnit::Millisecond => DateTime::<Utc>::from_timestamp_millis(value),
        TimeUnit::Microsecond => DateTime::<Utc>::from_timestamp_micros(value),
        TimeUnit::Nanosecond => Some(DateTime::<Utc>::from_timestamp_nanos(value)),
    }
}

fn invalid(row: usize, reason: String) -> LoadError {
    LoadError::InvalidValue {
        column: CREATED_AT.to_string(),
        row,
        reason,
    }
}

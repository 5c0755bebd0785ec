//! Dataset serialization: raw CSV in, columnar parquet out
//!
//! The raw corpus arrives as delimited text with an encoding that is not
//! guaranteed to be UTF-8 (the SMS corpus ships as Latin-1); cleaned datasets
//! and prediction frames persist as parquet with no explicit row index.

use arrow::array::{Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;
use spamops_common::types::{Dataset, Label, RawTable, Record};
use spamops_common::{Result, SpamOpsError};
use std::sync::Arc;

/// A predictions table: the training set with a model prediction per row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PredictionFrame {
    pub rows: Vec<PredictionRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRow {
    pub label: Label,
    pub text: String,
    pub prediction: Label,
}

/// Decode raw source bytes, falling back to Latin-1 when not valid UTF-8.
///
/// Latin-1 maps every byte to the Unicode code point of the same value, so
/// the fallback cannot fail.
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Parse raw CSV bytes into a [`RawTable`].
///
/// Empty fields become missing values; short rows are padded with missing
/// values so every row spans the header width.
pub fn raw_table_from_csv(bytes: &[u8]) -> Result<RawTable> {
    let text = decode_text(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| SpamOpsError::Parse(format!("invalid CSV header: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SpamOpsError::Parse(format!("invalid CSV row: {e}")))?;
        let row: Vec<Option<String>> = (0..columns.len())
            .map(|i| {
                record
                    .get(i)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
            })
            .collect();
        rows.push(row);
    }

    Ok(RawTable { columns, rows })
}

fn string_batch(fields: Vec<(&str, Vec<String>)>) -> Result<(Arc<Schema>, RecordBatch)> {
    let schema = Arc::new(Schema::new(
        fields
            .iter()
            .map(|(name, _)| Field::new(*name, DataType::Utf8, false))
            .collect::<Vec<_>>(),
    ));
    let columns = fields
        .into_iter()
        .map(|(_, values)| Arc::new(StringArray::from(values)) as Arc<dyn Array>)
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), columns)
        .map_err(|e| SpamOpsError::Parse(format!("failed to build record batch: {e}")))?;
    Ok((schema, batch))
}

fn write_parquet(schema: Arc<Schema>, batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, Some(props))
        .map_err(|e| SpamOpsError::Parse(format!("failed to open parquet writer: {e}")))?;
    writer
        .write(batch)
        .map_err(|e| SpamOpsError::Parse(format!("failed to write parquet: {e}")))?;
    writer
        .close()
        .map_err(|e| SpamOpsError::Parse(format!("failed to finish parquet: {e}")))?;
    Ok(buffer)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    let index = batch
        .schema()
        .index_of(name)
        .map_err(|e| SpamOpsError::Parse(format!("missing parquet column '{name}': {e}")))?;
    batch
        .column(index)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| SpamOpsError::Parse(format!("parquet column '{name}' is not a string")))
}

/// Serialize a cleaned dataset to parquet bytes.
pub fn dataset_to_parquet(dataset: &Dataset) -> Result<Vec<u8>> {
    let labels = dataset
        .records
        .iter()
        .map(|r| r.label.to_string())
        .collect();
    let texts = dataset.records.iter().map(|r| r.text.clone()).collect();
    let (schema, batch) = string_batch(vec![("label", labels), ("text", texts)])?;
    write_parquet(schema, &batch)
}

/// Read a cleaned dataset back from parquet bytes.
pub fn dataset_from_parquet(bytes: Vec<u8>) -> Result<Dataset> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes))
        .map_err(|e| SpamOpsError::Parse(format!("failed to open parquet: {e}")))?
        .build()
        .map_err(|e| SpamOpsError::Parse(format!("failed to read parquet: {e}")))?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| SpamOpsError::Parse(format!("parquet batch error: {e}")))?;
        let labels = string_column(&batch, "label")?;
        let texts = string_column(&batch, "text")?;
        for i in 0..batch.num_rows() {
            let label: Label = labels.value(i).parse()?;
            records.push(Record::new(label, texts.value(i)));
        }
    }
    Ok(Dataset::new(records))
}

/// Serialize a predictions frame to parquet bytes.
pub fn predictions_to_parquet(frame: &PredictionFrame) -> Result<Vec<u8>> {
    let labels = frame.rows.iter().map(|r| r.label.to_string()).collect();
    let texts = frame.rows.iter().map(|r| r.text.clone()).collect();
    let predictions = frame
        .rows
        .iter()
        .map(|r| r.prediction.to_string())
        .collect();
    let (schema, batch) = string_batch(vec![
        ("label", labels),
        ("text", texts),
        ("prediction", predictions),
    ])?;
    write_parquet(schema, &batch)
}

/// Read a predictions frame back from parquet bytes.
pub fn predictions_from_parquet(bytes: Vec<u8>) -> Result<PredictionFrame> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes))
        .map_err(|e| SpamOpsError::Parse(format!("failed to open parquet: {e}")))?
        .build()
        .map_err(|e| SpamOpsError::Parse(format!("failed to read parquet: {e}")))?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| SpamOpsError::Parse(format!("parquet batch error: {e}")))?;
        let labels = string_column(&batch, "label")?;
        let texts = string_column(&batch, "text")?;
        let predictions = string_column(&batch, "prediction")?;
        for i in 0..batch.num_rows() {
            rows.push(PredictionRow {
                label: labels.value(i).parse()?,
                text: texts.value(i).to_string(),
                prediction: predictions.value(i).parse()?,
            });
        }
    }
    Ok(PredictionFrame { rows })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_csv_with_latin1_bytes() {
        // "café" encoded as Latin-1: the 0xe9 byte is invalid UTF-8.
        let bytes = b"v1,v2\nham,caf\xe9 later?\nspam,WIN NOW\n";
        let table = raw_table_from_csv(bytes).unwrap();

        assert_eq!(table.columns, vec!["v1", "v2"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][1].as_deref(), Some("café later?"));
    }

    #[test]
    fn empty_and_absent_fields_are_missing_values() {
        let bytes = b"label,text,extra\nham,,x\nspam,hello\n";
        let table = raw_table_from_csv(bytes).unwrap();

        assert_eq!(table.rows[0][1], None);
        // Short row padded to header width.
        assert_eq!(table.rows[1][2], None);
        assert_eq!(table.rows[1][1].as_deref(), Some("hello"));
    }

    #[test]
    fn dataset_survives_parquet_round_trip() {
        let dataset = Dataset::new(vec![
            Record::new(Label::Ham, "see you at lunch"),
            Record::new(Label::Spam, "win cash now"),
        ]);
        let bytes = dataset_to_parquet(&dataset).unwrap();
        assert_eq!(dataset_from_parquet(bytes).unwrap(), dataset);
    }

    #[test]
    fn predictions_survive_parquet_round_trip() {
        let frame = PredictionFrame {
            rows: vec![PredictionRow {
                label: Label::Spam,
                text: "win cash now".to_string(),
                prediction: Label::Ham,
            }],
        };
        let bytes = predictions_to_parquet(&frame).unwrap();
        assert_eq!(predictions_from_parquet(bytes).unwrap(), frame);
    }
}

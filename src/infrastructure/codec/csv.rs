//! CSV (delimited text) reading and writing.

use std::io::Cursor;
use std::sync::Arc;

use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use tracing::debug;

use crate::domain::entity::TabularDataset;
use crate::{Error, Result};

const BATCH_SIZE: usize = 8192;

/// CSVのバイト列をデータセットに変換する
///
/// ヘッダー行は必須。型はArrowのCSVリーダーの標準推論（全行を走査）に従う。
pub fn read_csv(bytes: &[u8]) -> Result<TabularDataset> {
    let format = Format::default().with_header(true);
    let (schema, records_read) = format
        .infer_schema(Cursor::new(bytes), None)
        .map_err(|e| Error::Decode(e.to_string()))?;

    if schema.fields().is_empty() {
        return Err(Error::Decode("CSV input has no header row".to_string()));
    }
    debug!(columns = schema.fields().len(), records_read, "inferred CSV schema");

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .with_batch_size(BATCH_SIZE)
        .build(Cursor::new(bytes))
        .map_err(|e| Error::Decode(e.to_string()))?;

    let batches = reader
        .collect::<std::result::Result<Vec<RecordBatch>, _>>()
        .map_err(|e| Error::Decode(e.to_string()))?;

    TabularDataset::try_new(schema, batches).map_err(|e| Error::Decode(e.to_string()))
}

/// データセットをCSVに書き出す（ヘッダー行あり、行インデックスなし）
pub fn write_csv(dataset: &TabularDataset) -> Result<Bytes> {
    let mut writer = WriterBuilder::new().with_header(true).build(Vec::new());

    if dataset.batches().is_empty() {
        // バッチが無くてもヘッダー行は出力する
        let empty = RecordBatch::new_empty(dataset.schema());
        writer.write(&empty).map_err(|e| Error::Export(e.to_string()))?;
    }
    for batch in dataset.batches() {
        writer.write(batch).map_err(|e| Error::Export(e.to_string()))?;
    }

    Ok(Bytes::from(writer.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{ColumnType, Value};

    #[test]
    fn infers_column_types() {
        let csv = b"id,name,score,active,day\n1,ana,1.5,true,2024-01-02\n2,rui,2.25,false,2024-02-03\n";
        let dataset = read_csv(csv).unwrap();
        let types: Vec<ColumnType> = dataset.columns().iter().map(|c| c.column_type).collect();
        assert_eq!(
            types,
            vec![
                ColumnType::Integer,
                ColumnType::Text,
                ColumnType::Float,
                ColumnType::Boolean,
                ColumnType::Temporal
            ]
        );
        assert_eq!(dataset.num_rows(), 2);
    }

    #[test]
    fn empty_fields_are_nulls() {
        let dataset = read_csv(b"a,b\n1,\n,x\n").unwrap();
        let rows = dataset.preview(10).unwrap();
        assert_eq!(rows[0].values, vec![Value::Integer(1), Value::Null]);
        assert_eq!(rows[1].values, vec![Value::Null, Value::from("x")]);
    }

    #[test]
    fn header_only_gives_zero_rows() {
        let dataset = read_csv(b"a,b\n").unwrap();
        assert_eq!(dataset.column_names(), vec!["a", "b"]);
        assert_eq!(dataset.num_rows(), 0);
    }

    #[test]
    fn empty_input_is_a_decode_error() {
        assert!(matches!(read_csv(b""), Err(Error::Decode(_))));
    }

    #[test]
    fn ragged_rows_are_a_decode_error() {
        assert!(matches!(read_csv(b"a,b\n1,2\n3,4,5\n"), Err(Error::Decode(_))));
    }

    #[test]
    fn writes_header_even_without_rows() {
        let dataset = read_csv(b"a,b\n").unwrap();
        let out = write_csv(&dataset).unwrap();
        assert_eq!(std::str::from_utf8(&out).unwrap().trim_end(), "a,b");
    }

    #[test]
    fn writes_rows_in_column_order() {
        let dataset = read_csv(b"x,y\n1,a\n2,b\n").unwrap();
        let out = write_csv(&dataset).unwrap();
        assert_eq!(std::str::from_utf8(&out).unwrap(), "x,y\n1,a\n2,b\n");
    }
}

//! Parquet (columnar binary) reading and writing.

use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use tracing::debug;

use crate::domain::entity::TabularDataset;
use crate::{Error, Result};

/// Parquetのバイト列をデータセットに変換する（スキーマはフッターから読む）
pub fn read_parquet(bytes: Bytes) -> Result<TabularDataset> {
    // Bytes implements ChunkReader directly
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes)
        .map_err(|e| Error::Decode(e.to_string()))?;

    let schema = builder.schema().clone();
    let row_group_count = builder.metadata().num_row_groups();
    debug!(columns = schema.fields().len(), row_group_count, "read Parquet footer");

    let reader = builder.build().map_err(|e| Error::Decode(e.to_string()))?;
    let batches = reader
        .collect::<std::result::Result<Vec<RecordBatch>, _>>()
        .map_err(|e| Error::Decode(e.to_string()))?;

    TabularDataset::try_new(schema, batches).map_err(|e| Error::Decode(e.to_string()))
}

/// データセットをParquetに書き出す（スキーマ埋め込み、行インデックスなし）
pub fn write_parquet(dataset: &TabularDataset) -> Result<Bytes> {
    let mut buffer = Vec::new();
    {
        let mut writer = ArrowWriter::try_new(&mut buffer, dataset.schema(), None)
            .map_err(|e| Error::Export(e.to_string()))?;

        for batch in dataset.batches() {
            writer.write(batch).map_err(|e| Error::Export(e.to_string()))?;
        }

        writer.close().map_err(|e| Error::Export(e.to_string()))?;
    }

    Ok(Bytes::from(buffer))
}

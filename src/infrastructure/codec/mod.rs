pub mod csv;
pub mod parquet;

use bytes::Bytes;

use crate::domain::entity::{ExportFormat, FileFormat, TabularDataset};
use crate::Result;

/// アップロードされたバイト列を宣言された形式で読み込む
///
/// 失敗時は `Error::Decode` をそのまま呼び出し元へ返す。
pub fn load(bytes: Bytes, format: FileFormat) -> Result<TabularDataset> {
    match format {
        FileFormat::DelimitedText => csv::read_csv(&bytes),
        FileFormat::ColumnarBinary => parquet::read_parquet(bytes),
    }
}

/// データセットを指定形式のバイト列に書き出す
pub fn export(dataset: &TabularDataset, format: ExportFormat) -> Result<Bytes> {
    match format {
        ExportFormat::DelimitedText => csv::write_csv(dataset),
        ExportFormat::ColumnarBinary => parquet::write_parquet(dataset),
    }
}

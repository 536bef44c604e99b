use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::EnumString;

/// ファイル形式（読み込みとエクスポートで共通）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
pub enum FileFormat {
    /// カンマ区切りテキスト（CSV）
    #[display(fmt = "CSV")]
    #[strum(serialize = "CSV")]
    #[serde(rename = "CSV")]
    DelimitedText,

    /// 列指向バイナリ（Parquet）
    #[display(fmt = "Parquet")]
    #[strum(serialize = "Parquet")]
    #[serde(rename = "Parquet")]
    ColumnarBinary,
}

/// エクスポート時に選択する形式
pub type ExportFormat = FileFormat;

impl FileFormat {
    /// ファイル名の拡張子から形式を判定する（大文字小文字は区別しない）
    pub fn from_file_name(file_name: &str) -> crate::Result<Self> {
        let lower = file_name.to_lowercase();
        [FileFormat::DelimitedText, FileFormat::ColumnarBinary]
            .into_iter()
            .find(|candidate| lower.ends_with(&format!(".{}", candidate.extension())))
            .ok_or_else(|| {
                crate::Error::UnsupportedFormat(format!(
                    "'{}' is not a .csv or .parquet file",
                    file_name
                ))
            })
    }

    /// 拡張子（ドットなし、小文字）
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::DelimitedText => "csv",
            FileFormat::ColumnarBinary => "parquet",
        }
    }

    /// エクスポートしたファイルの固定名
    pub fn export_file_name(&self) -> &'static str {
        match self {
            FileFormat::DelimitedText => "resultado_query.csv",
            FileFormat::ColumnarBinary => "resultado_query.parquet",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FileFormat::DelimitedText => "text/csv",
            FileFormat::ColumnarBinary => "application/octet-stream",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use test_case::test_case;

    #[test_case("sales.csv" => FileFormat::DelimitedText ; "lower csv")]
    #[test_case("SALES.CSV" => FileFormat::DelimitedText ; "upper csv")]
    #[test_case("sales.parquet" => FileFormat::ColumnarBinary ; "lower parquet")]
    #[test_case("Sales.Parquet" => FileFormat::ColumnarBinary ; "mixed parquet")]
    fn detects_format_from_extension(name: &str) -> FileFormat {
        FileFormat::from_file_name(name).unwrap()
    }

    #[test_case("sales.xlsx" ; "other extension")]
    #[test_case("csv" ; "no dot")]
    #[test_case("sales.csv.gz" ; "compressed")]
    fn rejects_other_extensions(name: &str) {
        assert!(matches!(
            FileFormat::from_file_name(name),
            Err(crate::Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn export_metadata() {
        assert_eq!(ExportFormat::DelimitedText.export_file_name(), "resultado_query.csv");
        assert_eq!(ExportFormat::DelimitedText.mime_type(), "text/csv");
        assert_eq!(ExportFormat::ColumnarBinary.export_file_name(), "resultado_query.parquet");
        assert_eq!(ExportFormat::ColumnarBinary.mime_type(), "application/octet-stream");
    }

    #[test]
    fn parses_and_displays_selection_names() {
        assert_eq!(ExportFormat::from_str("csv").unwrap(), ExportFormat::DelimitedText);
        assert_eq!(ExportFormat::from_str("PARQUET").unwrap(), ExportFormat::ColumnarBinary);
        assert!(ExportFormat::from_str("xlsx").is_err());
        assert_eq!(ExportFormat::DelimitedText.to_string(), "CSV");
        assert_eq!(ExportFormat::ColumnarBinary.to_string(), "Parquet");
    }
}

use arrow::datatypes::DataType as ArrowType;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::EnumString;

/// データセットのカラムに推論されたスカラー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
pub enum ColumnType {
    #[strum(serialize = "INTEGER")]
    Integer,

    #[strum(serialize = "FLOAT")]
    Float,

    #[strum(serialize = "TEXT")]
    Text,

    #[strum(serialize = "BOOLEAN")]
    Boolean,

    #[strum(serialize = "TEMPORAL")]
    Temporal,

    // バイナリ、ネスト型、全NULLのカラムなど
    #[strum(serialize = "OTHER")]
    Other,
}

impl ColumnType {
    /// Arrowのデータ型から分類する
    pub fn from_arrow(data_type: &ArrowType) -> Self {
        match data_type {
            ArrowType::Int8
            | ArrowType::Int16
            | ArrowType::Int32
            | ArrowType::Int64
            | ArrowType::UInt8
            | ArrowType::UInt16
            | ArrowType::UInt32
            | ArrowType::UInt64 => ColumnType::Integer,

            ArrowType::Float16
            | ArrowType::Float32
            | ArrowType::Float64
            | ArrowType::Decimal128(_, _)
            | ArrowType::Decimal256(_, _) => ColumnType::Float,

            ArrowType::Utf8 | ArrowType::LargeUtf8 | ArrowType::Utf8View => ColumnType::Text,

            ArrowType::Boolean => ColumnType::Boolean,

            ArrowType::Date32
            | ArrowType::Date64
            | ArrowType::Time32(_)
            | ArrowType::Time64(_)
            | ArrowType::Timestamp(_, _)
            | ArrowType::Duration(_)
            | ArrowType::Interval(_) => ColumnType::Temporal,

            ArrowType::Dictionary(_, value_type) => ColumnType::from_arrow(value_type),

            _ => ColumnType::Other,
        }
    }

    /// グラフ化の対象になる数値型かどうか
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::Temporal)
    }
}

use crate::domain::entity::column::Column;
use crate::domain::entity::column_type::ColumnType;
use crate::domain::entity::value::Value;
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType as ArrowType, Float64Type, Int64Type, SchemaRef, UInt64Type};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Column '{0}' appears more than once")]
    DuplicateColumn(String),

    #[error("Batch schema does not match dataset schema: expected [{expected}], got [{actual}]")]
    SchemaMismatch { expected: String, actual: String },

    #[error("Column index {0} out of range")]
    ColumnOutOfRange(usize),
}

impl From<DatasetError> for crate::Error {
    fn from(err: DatasetError) -> Self {
        crate::Error::Internal(err.to_string())
    }
}

/// インメモリの表形式データセット
///
/// Arrowのスキーマと、同じスキーマを持つレコードバッチの列で構成される。
/// 一度作成したら変更しない。クエリ結果などは新しいデータセットとして作る。
#[derive(Debug, Clone)]
pub struct TabularDataset {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl TabularDataset {
    /// スキーマとバッチからデータセットを作成する
    pub fn try_new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Self, DatasetError> {
        let mut seen = HashSet::new();
        for field in schema.fields() {
            if !seen.insert(field.name().as_str()) {
                return Err(DatasetError::DuplicateColumn(field.name().clone()));
            }
        }

        // 名前と型が一致していればメタデータやNULL許容の違いは問わない
        for batch in &batches {
            let batch_schema = batch.schema();
            let matches = batch_schema.fields().len() == schema.fields().len()
                && batch_schema
                    .fields()
                    .iter()
                    .zip(schema.fields().iter())
                    .all(|(a, b)| a.name() == b.name() && a.data_type() == b.data_type());
            if !matches {
                return Err(DatasetError::SchemaMismatch {
                    expected: describe_fields(&schema),
                    actual: describe_fields(&batch_schema),
                });
            }
        }

        Ok(Self { schema, batches })
    }

    /// 行を持たないデータセットを作成する
    pub fn empty(schema: SchemaRef) -> Self {
        Self {
            schema,
            batches: Vec::new(),
        }
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// カラム定義を元の順序で取得する
    pub fn columns(&self) -> Vec<Column> {
        self.schema
            .fields()
            .iter()
            .map(|f| Column::from_field(f))
            .collect()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.fields().iter().map(|f| f.name().clone()).collect()
    }

    /// 名前でカラムを検索する
    pub fn column(&self, name: &str) -> Option<Column> {
        self.schema
            .fields()
            .iter()
            .find(|f| f.name() == name)
            .map(|f| Column::from_field(f))
    }

    /// 先頭 `limit` 行を表示用の値に変換する
    pub fn preview(&self, limit: usize) -> crate::Result<Vec<Row>> {
        let columns = self.columns();
        let mut rows = Vec::with_capacity(limit.min(self.num_rows()));
        let mut remaining = limit;

        for batch in &self.batches {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(batch.num_rows());
            let cells = columns
                .iter()
                .enumerate()
                .map(|(i, c)| cells_of(&batch.column(i).slice(0, take), c.column_type))
                .collect::<crate::Result<Vec<_>>>()?;

            for row in 0..take {
                rows.push(Row {
                    values: cells.iter().map(|col| col[row].clone()).collect(),
                });
            }
            remaining -= take;
        }

        Ok(rows)
    }

    /// 指定カラムの全行を浮動小数点数として取り出す（NULLは `None`）
    pub fn numeric_values(&self, index: usize) -> crate::Result<Vec<Option<f64>>> {
        if index >= self.num_columns() {
            return Err(DatasetError::ColumnOutOfRange(index).into());
        }

        let mut values = Vec::with_capacity(self.num_rows());
        for batch in &self.batches {
            let floats = cast(batch.column(index), &ArrowType::Float64)?;
            values.extend(floats.as_primitive::<Float64Type>().iter());
        }
        Ok(values)
    }
}

/// 1行のデータを表現する（カラム順）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    /// 特定の位置の値を取得する
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn describe_fields(schema: &arrow::datatypes::Schema) -> String {
    schema
        .fields()
        .iter()
        .map(|f| format!("{}: {}", f.name(), f.data_type()))
        .join(", ")
}

// 1カラム分の配列を表示用の値に変換する
fn cells_of(array: &ArrayRef, column_type: ColumnType) -> crate::Result<Vec<Value>> {
    let len = array.len();
    let cells = match column_type {
        // i64に収まらない値はNULLにせず浮動小数点数で表示する
        ColumnType::Integer if array.data_type() == &ArrowType::UInt64 => array
            .as_primitive::<UInt64Type>()
            .iter()
            .map(|v| match v {
                Some(v) => i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer),
                None => Value::Null,
            })
            .collect(),
        ColumnType::Integer => {
            let ints = cast(array, &ArrowType::Int64)?;
            ints.as_primitive::<Int64Type>()
                .iter()
                .map(|v| v.map_or(Value::Null, Value::Integer))
                .collect()
        }
        ColumnType::Float => {
            let floats = cast(array, &ArrowType::Float64)?;
            floats
                .as_primitive::<Float64Type>()
                .iter()
                .map(|v| v.map_or(Value::Null, Value::Float))
                .collect()
        }
        ColumnType::Boolean => {
            let bools = cast(array, &ArrowType::Boolean)?;
            bools
                .as_boolean()
                .iter()
                .map(|v| v.map_or(Value::Null, Value::Boolean))
                .collect()
        }
        ColumnType::Text => {
            let strings = cast(array, &ArrowType::Utf8)?;
            strings
                .as_string::<i32>()
                .iter()
                .map(|v| v.map_or(Value::Null, |s| Value::Text(s.to_string())))
                .collect()
        }
        ColumnType::Temporal | ColumnType::Other => {
            let formatter = ArrayFormatter::try_new(array.as_ref(), &FormatOptions::default())?;
            (0..len)
                .map(|i| {
                    if array.is_null(i) {
                        Value::Null
                    } else if column_type.is_temporal() {
                        Value::Timestamp(formatter.value(i).to_string())
                    } else {
                        Value::Text(formatter.value(i).to_string())
                    }
                })
                .collect()
        }
    };
    Ok(cells)
}

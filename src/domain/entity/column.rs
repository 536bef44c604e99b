use crate::domain::entity::column_type::ColumnType;
use arrow::datatypes::Field;
use serde::{Deserialize, Serialize};
use std::fmt;
use typed_builder::TypedBuilder;

/// データセットのカラムを表すエンティティ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct Column {
    /// カラム名
    #[builder(setter(into))]
    pub name: String,

    /// 推論された型
    pub column_type: ColumnType,

    /// NULLを含み得るか
    #[builder(default = true)]
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
        }
    }

    /// Arrowのフィールド定義から作成する
    pub fn from_field(field: &Field) -> Self {
        Self {
            name: field.name().clone(),
            column_type: ColumnType::from_arrow(field.data_type()),
            nullable: field.is_nullable(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.column_type.is_numeric()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.column_type)?;
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        Ok(())
    }
}

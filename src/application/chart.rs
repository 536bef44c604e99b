use serde::Serialize;

use crate::domain::entity::TabularDataset;
use crate::Result;

/// 数値カラム1本分の折れ線
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub column: String,
    /// 行番号順の値（NULLは `None`）
    pub points: Vec<Option<f64>>,
}

/// クエリ結果から自動生成する折れ線グラフ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub series: Vec<ChartSeries>,
}

impl LineChart {
    pub fn len(&self) -> usize {
        self.series.first().map_or(0, |s| s.points.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 数値カラムごとに系列を作る。数値カラムが無ければ `None`
pub fn line_chart(dataset: &TabularDataset) -> Result<Option<LineChart>> {
    let mut series = Vec::new();
    for (index, column) in dataset.columns().into_iter().enumerate() {
        if column.is_numeric() {
            series.push(ChartSeries {
                column: column.name,
                points: dataset.numeric_values(index)?,
            });
        }
    }

    if series.is_empty() {
        Ok(None)
    } else {
        Ok(Some(LineChart { series }))
    }
}

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use typed_builder::TypedBuilder;

use crate::application::columns::filter_columns;
use crate::domain::engine::QueryEngine;
use crate::domain::entity::{Column, ExportFormat, FileFormat, QueryOutcome, TabularDataset};
use crate::infrastructure::codec;
use crate::{Error, Result};

/// セッションに読み込まれているファイル
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub file_name: String,
    pub format: FileFormat,
    pub dataset: TabularDataset,
    pub loaded_at: DateTime<Utc>,
}

/// ファイル読み込み結果の要約
#[derive(Debug, Clone, Serialize, TypedBuilder)]
pub struct LoadSummary {
    #[builder(setter(into))]
    pub file_name: String,
    pub format: FileFormat,
    pub row_count: usize,
    pub columns: Vec<Column>,
    #[builder(setter(into))]
    pub message: String,
    pub loaded_at: DateTime<Utc>,
}

/// ダウンロード用に書き出した結果
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Bytes,
}

/// 1ユーザー分の対話セッションの状態
///
/// 保持するのは「現在のデータセット」と「最後のクエリ結果」だけ。
#[derive(Debug, Default)]
pub struct Session {
    loaded: Option<LoadedDataset>,
    last_outcome: Option<QueryOutcome>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// ファイルを読み込み、成功した場合だけ現在のデータセットを置き換える
    pub fn load_file(&mut self, file_name: &str, bytes: Bytes) -> Result<LoadSummary> {
        let format = FileFormat::from_file_name(file_name)?;
        let dataset = codec::load(bytes, format)?;
        let loaded_at = Utc::now();

        info!(file_name, %format, rows = dataset.num_rows(), columns = dataset.num_columns(), "dataset loaded");

        let summary = LoadSummary::builder()
            .file_name(file_name)
            .format(format)
            .row_count(dataset.num_rows())
            .columns(dataset.columns())
            .message(format!("File `{}` loaded successfully", file_name))
            .loaded_at(loaded_at)
            .build();

        self.loaded = Some(LoadedDataset {
            file_name: file_name.to_string(),
            format,
            dataset,
            loaded_at,
        });
        self.last_outcome = None;

        Ok(summary)
    }

    pub fn loaded(&self) -> Option<&LoadedDataset> {
        self.loaded.as_ref()
    }

    /// 現在のデータセット
    pub fn dataset(&self) -> Result<&TabularDataset> {
        self.loaded.as_ref().map(|l| &l.dataset).ok_or(Error::NoDataset)
    }

    pub fn last_outcome(&self) -> Option<&QueryOutcome> {
        self.last_outcome.as_ref()
    }

    /// 現在のデータセットに対してSQLを実行し、結果を保持する
    ///
    /// クエリの失敗は `QueryOutcome::Failure` として返り、データセットはそのまま残る。
    pub async fn run_query(&mut self, engine: &dyn QueryEngine, sql: &str) -> Result<QueryOutcome> {
        let dataset = self.dataset()?;
        let outcome = engine.execute(dataset, sql).await;
        self.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// 最後に成功したクエリ結果を書き出す
    pub fn export_last(&self, format: ExportFormat) -> Result<ExportArtifact> {
        let result = self
            .last_outcome
            .as_ref()
            .and_then(QueryOutcome::dataset)
            .ok_or(Error::NoQueryResult)?;

        let bytes = codec::export(result, format)?;
        info!(%format, rows = result.num_rows(), size = bytes.len(), "query result exported");

        Ok(ExportArtifact {
            file_name: format.export_file_name(),
            mime_type: format.mime_type(),
            bytes,
        })
    }

    /// 読み込み済みデータセットのカラム名を検索する
    pub fn search_columns(&self, needle: &str) -> Result<Vec<String>> {
        Ok(filter_columns(&self.dataset()?.column_names(), needle))
    }
}

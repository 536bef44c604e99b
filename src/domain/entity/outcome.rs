use crate::domain::entity::dataset::TabularDataset;

/// クエリ実行の結果
///
/// 成功時は結果のデータセット、失敗時はエンジンのエラーメッセージをそのまま持つ。
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Success(TabularDataset),
    Failure(String),
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, QueryOutcome::Failure(_))
    }

    /// 成功した場合の結果データセット
    pub fn dataset(&self) -> Option<&TabularDataset> {
        match self {
            QueryOutcome::Success(dataset) => Some(dataset),
            QueryOutcome::Failure(_) => None,
        }
    }

    /// 失敗した場合のエラーメッセージ
    pub fn error(&self) -> Option<&str> {
        match self {
            QueryOutcome::Success(_) => None,
            QueryOutcome::Failure(message) => Some(message),
        }
    }
}

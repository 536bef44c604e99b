use async_trait::async_trait;
use crate::domain::entity::{QueryOutcome, TabularDataset};

/// クエリ対象のデータセットを登録する固定のテーブル名
pub const TABLE_NAME: &str = "data";

/// SQL入力欄の初期値
pub const DEFAULT_QUERY: &str = "SELECT * FROM data LIMIT 10";

// クエリエンジンアダプター - データセットに対してSQLを実行する抽象インターフェース
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// データセットを `data` テーブルとして登録し、SQLをそのまま実行する
    ///
    /// 実行時のエラーはすべてここで捕捉し、`QueryOutcome::Failure` として返す。
    async fn execute(&self, dataset: &TabularDataset, sql: &str) -> QueryOutcome;

    /// ログ用のエンジン名
    fn name(&self) -> &'static str;
}

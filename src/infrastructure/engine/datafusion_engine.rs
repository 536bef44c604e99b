use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use datafusion::arrow::datatypes::{Schema, SchemaRef};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::common::tree_node::{TreeNode, TreeNodeRecursion};
use datafusion::datasource::MemTable;
use datafusion::error::DataFusionError;
use datafusion::logical_expr::{DdlStatement, LogicalPlan};
use datafusion::prelude::SessionContext;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::engine::{QueryEngine, TABLE_NAME};
use crate::domain::entity::{DatasetError, QueryOutcome, TabularDataset};

/// クエリ実行時のエラー
#[derive(Error, Debug)]
enum QueryError {
    // エンジンのメッセージはそのまま返す
    #[error(transparent)]
    Engine(#[from] DataFusionError),

    #[error("{0} is not allowed: queries can only use the uploaded data")]
    NotAllowed(&'static str),

    #[error("Query result is not a valid table: {0}")]
    InvalidResult(#[from] DatasetError),
}

/// DataFusionを使ったインメモリのクエリエンジン
///
/// 実行ごとに空の `SessionContext` を作り、データセットを `data` テーブルとして
/// 登録してから SQL を実行する。コンテキストは実行後に破棄されるので、
/// DDL を含む SQL を受け付けても他のセッションには影響しない。
/// ファイルを読み書きする文（`COPY ... TO`、`CREATE EXTERNAL TABLE`）だけは
/// 計画の段階で拒否する。
#[derive(Debug, Default, Clone)]
pub struct DataFusionEngine;

impl DataFusionEngine {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, dataset: &TabularDataset, sql: &str) -> Result<TabularDataset, QueryError> {
        let ctx = SessionContext::new();

        let table = MemTable::try_new(dataset.schema(), vec![dataset.batches().to_vec()])?;
        ctx.register_table(TABLE_NAME, Arc::new(table))?;

        let plan = ctx.state().create_logical_plan(sql).await?;
        if let Some(statement) = file_access(&plan)? {
            return Err(QueryError::NotAllowed(statement));
        }

        let df = ctx.execute_logical_plan(plan).await?;
        let planned: SchemaRef = Arc::new(df.schema().as_arrow().clone());
        let batches = df.collect().await?;

        // 実際のバッチのスキーマを優先する（NULL許容などが計画時と異なることがある）
        let schema = batches.first().map(|b| b.schema()).unwrap_or(planned);
        let (schema, batches) = with_unique_names(schema, batches)?;
        Ok(TabularDataset::try_new(schema, batches)?)
    }
}

/// サーバーのファイルシステムに触れる文を探す（EXPLAIN ANALYZE の中も含む）
fn file_access(plan: &LogicalPlan) -> Result<Option<&'static str>, DataFusionError> {
    let mut found = None;
    plan.apply(|node| {
        found = match node {
            LogicalPlan::Copy(_) => Some("COPY"),
            LogicalPlan::Ddl(DdlStatement::CreateExternalTable(_)) => Some("CREATE EXTERNAL TABLE"),
            _ => None,
        };
        Ok(if found.is_some() {
            TreeNodeRecursion::Stop
        } else {
            TreeNodeRecursion::Continue
        })
    })?;
    Ok(found)
}

/// 同名のカラムに `_1`, `_2` ... を付けて区別する（自己結合の `a.id, b.id` など）
fn with_unique_names(
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
) -> Result<(SchemaRef, Vec<RecordBatch>), DataFusionError> {
    let taken: HashSet<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    if taken.len() == schema.fields().len() {
        return Ok((schema, batches));
    }

    let mut used = HashSet::new();
    let fields: Vec<_> = schema
        .fields()
        .iter()
        .map(|field| {
            let mut name = field.name().clone();
            let mut n = 0;
            while used.contains(&name) || (n > 0 && taken.contains(name.as_str())) {
                n += 1;
                name = format!("{}_{}", field.name(), n);
            }
            used.insert(name.clone());
            (**field).clone().with_name(name)
        })
        .collect();

    let renamed = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));
    let batches = batches
        .into_iter()
        .map(|b| RecordBatch::try_new(renamed.clone(), b.columns().to_vec()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((renamed, batches))
}

/// 大文字を含むカラム名を引用符なしで書いた場合のヒントを付ける
fn failure_message(error: &QueryError, dataset: &TabularDataset) -> String {
    let message = error.to_string();
    if !matches!(error, QueryError::Engine(_)) || !message.contains("No field named") {
        return message;
    }

    match dataset
        .column_names()
        .into_iter()
        .find(|name| name.chars().any(char::is_uppercase))
    {
        Some(name) => format!(
            "{} Hint: column names with upper-case letters must be double-quoted, e.g. \"{}\"",
            message, name
        ),
        None => message,
    }
}

#[async_trait]
impl QueryEngine for DataFusionEngine {
    async fn execute(&self, dataset: &TabularDataset, sql: &str) -> QueryOutcome {
        let started = Instant::now();

        match self.run(dataset, sql).await {
            Ok(result) => {
                info!(
                    engine = self.name(),
                    sql_len = sql.len(),
                    input_rows = dataset.num_rows(),
                    result_rows = result.num_rows(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "query executed"
                );
                QueryOutcome::Success(result)
            }
            Err(e) => {
                warn!(engine = self.name(), sql_len = sql.len(), error = %e, "query failed");
                QueryOutcome::Failure(failure_message(&e, dataset))
            }
        }
    }

    fn name(&self) -> &'static str {
        "datafusion"
    }
}

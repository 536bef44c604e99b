use bytes::Bytes;
use sqlviewer::application::{filter_columns, numeric_columns};
use sqlviewer::domain::engine::{QueryEngine, DEFAULT_QUERY};
use sqlviewer::domain::entity::{ExportFormat, FileFormat, TabularDataset, Value};
use sqlviewer::infrastructure::codec::{export, load};
use sqlviewer::infrastructure::engine::DataFusionEngine;
use sqlviewer::Error;
use test_case::test_case;

const SALES_CSV: &str = "\
id,region,amount,paid,day
1,north,10.5,true,2024-01-01
2,south,20.25,false,2024-01-02
3,north,,true,2024-01-03
4,east,7.0,true,2024-01-04
5,south,3.75,false,2024-01-05
";

fn sales() -> TabularDataset {
    load(Bytes::from_static(SALES_CSV.as_bytes()), FileFormat::DelimitedText).unwrap()
}

async fn run(dataset: &TabularDataset, sql: &str) -> TabularDataset {
    DataFusionEngine::new()
        .execute(dataset, sql)
        .await
        .dataset()
        .cloned()
        .unwrap_or_else(|| panic!("query failed: {}", sql))
}

#[test]
fn csv_and_parquet_load_the_same_data() {
    let from_csv = sales();
    let parquet = export(&from_csv, ExportFormat::ColumnarBinary).unwrap();
    let from_parquet = load(parquet, FileFormat::ColumnarBinary).unwrap();

    assert_eq!(from_parquet.column_names(), from_csv.column_names());
    assert_eq!(from_parquet.num_rows(), from_csv.num_rows());
    assert_eq!(from_parquet.preview(100).unwrap(), from_csv.preview(100).unwrap());
}

#[test]
fn csv_round_trip_keeps_names_rows_and_values() {
    let original = sales();
    let csv = export(&original, ExportFormat::DelimitedText).unwrap();
    let reloaded = load(csv, FileFormat::DelimitedText).unwrap();

    assert_eq!(reloaded.column_names(), original.column_names());
    assert_eq!(reloaded.num_rows(), original.num_rows());
    assert_eq!(reloaded.preview(100).unwrap(), original.preview(100).unwrap());
}

#[test]
fn exported_csv_has_header_and_no_index() {
    let csv = export(&sales(), ExportFormat::DelimitedText).unwrap();
    let text = std::str::from_utf8(&csv).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("id,region,amount,paid,day"));
    assert_eq!(lines.next(), Some("1,north,10.5,true,2024-01-01"));
    assert_eq!(text.lines().count(), 6);
}

#[test]
fn malformed_input_is_a_decode_error() {
    let parquet = load(Bytes::from_static(b"id,name\n1,a\n"), FileFormat::ColumnarBinary);
    assert!(matches!(parquet, Err(Error::Decode(_))));

    let csv = load(Bytes::from_static(b"a,b\n1,2,3\n"), FileFormat::DelimitedText);
    assert!(matches!(csv, Err(Error::Decode(_))));
}

#[tokio::test]
async fn select_star_keeps_rows_and_columns() {
    let dataset = sales();
    let result = run(&dataset, "SELECT * FROM data").await;
    assert_eq!(result.num_rows(), dataset.num_rows());
    assert_eq!(result.column_names(), dataset.column_names());
}

#[test_case(0 ; "zero")]
#[test_case(3 ; "fewer than rows")]
#[test_case(5 ; "exactly rows")]
#[test_case(50 ; "more than rows")]
#[tokio::test]
async fn limit_returns_min_of_n_and_rows(n: usize) {
    let dataset = sales();
    let result = run(&dataset, &format!("SELECT * FROM data LIMIT {}", n)).await;
    assert_eq!(result.num_rows(), n.min(dataset.num_rows()));
}

#[tokio::test]
async fn default_query_shows_first_rows() {
    let result = run(&sales(), DEFAULT_QUERY).await;
    assert_eq!(result.num_rows(), 5);
}

#[tokio::test]
async fn count_star_alias() {
    let result = run(&sales(), "SELECT COUNT(*) AS c FROM data").await;
    assert_eq!(result.column_names(), vec!["c"]);
    let rows = result.preview(10).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].values, vec![Value::Integer(5)]);
}

#[tokio::test]
async fn aggregation_result_is_a_new_dataset() {
    let dataset = sales();
    let result = run(
        &dataset,
        "SELECT region, SUM(amount) AS total FROM data GROUP BY region ORDER BY region",
    )
    .await;
    let rows = result.preview(10).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].values, vec![Value::from("east"), Value::Float(7.0)]);
    assert_eq!(rows[1].values, vec![Value::from("north"), Value::Float(10.5)]);
    assert_eq!(rows[2].values, vec![Value::from("south"), Value::Float(24.0)]);
    assert_eq!(numeric_columns(&result), vec!["total"]);
    // 元のデータセットは変わらない
    assert_eq!(dataset.num_rows(), 5);
}

#[test_case("NOT VALID SQL" ; "garbage")]
#[test_case("SELECT * FROM missing_table" ; "unknown table")]
#[test_case("SELECT no_such_column FROM data" ; "unknown column")]
#[test_case("SELECT region + 1 FROM data" ; "type mismatch")]
#[tokio::test]
async fn engine_errors_become_failures(sql: &str) {
    let outcome = DataFusionEngine::new().execute(&sales(), sql).await;
    let message = outcome.error().expect("query should fail");
    assert!(!message.is_empty());
}

#[test]
fn column_search_examples() {
    let names = ["alpha", "beta", "gamma"];
    assert_eq!(filter_columns(&names, "a"), vec!["alpha", "beta", "gamma"]);
    assert!(filter_columns(&names, "z").is_empty());
}

#[test]
fn numeric_columns_skip_text_boolean_and_dates() {
    assert_eq!(numeric_columns(&sales()), vec!["id", "amount"]);
}

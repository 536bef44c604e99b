use reqwest::Client;
use serde_json::{json, Value};

const SAMPLE_CSV: &str = "id,name,score\n1,ana,1.5\n2,rui,2.5\n3,eva,4.0\n";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::new();
    let base_url = "http://localhost:8080";

    println!("=== sqlviewer API テスト ===\n");

    // 1. ヘルスチェック
    println!("1. ヘルスチェック");
    let resp = client.get(format!("{}/health", base_url)).send().await?;
    println!("ステータス: {}", resp.status());
    println!("レスポンス: {}", resp.text().await?);
    println!();

    // 2. セッション作成
    println!("2. セッション作成");
    let resp = client.post(format!("{}/api/sessions", base_url)).send().await?;
    let created: Value = resp.json().await?;
    let session_id = created["session_id"].as_u64().ok_or("session_id missing")?;
    println!("セッションID: {}", session_id);
    println!();

    let session_url = format!("{}/api/sessions/{}", base_url, session_id);

    // 3. ファイルのアップロード
    println!("3. ファイルのアップロード");
    let resp = client
        .put(format!("{}/dataset?file_name=people.csv", session_url))
        .body(SAMPLE_CSV)
        .send()
        .await?;
    println!("ステータス: {}", resp.status());
    println!("レスポンス: {}", resp.text().await?);
    println!();

    // 4. カラム検索
    println!("4. カラム検索");
    let resp = client
        .get(format!("{}/columns?search=e", session_url))
        .send()
        .await?;
    println!("ステータス: {}", resp.status());
    println!("レスポンス: {}", resp.text().await?);
    println!();

    // 5. クエリ実行
    println!("5. クエリ実行");
    let select_query = json!({
        "sql": "SELECT name, score FROM data WHERE score > 2"
    });

    let resp = client
        .post(format!("{}/query", session_url))
        .json(&select_query)
        .send()
        .await?;

    println!("ステータス: {}", resp.status());
    let result_text = resp.text().await?;

    // JSON形式のレスポンスをきれいに表示
    if let Ok(result) = serde_json::from_str::<Value>(&result_text) {
        println!("整形レスポンス: {}", serde_json::to_string_pretty(&result)?);
    }
    println!();

    // 6. 不正なクエリ
    println!("6. 不正なクエリ");
    let resp = client
        .post(format!("{}/query", session_url))
        .json(&json!({ "sql": "NOT VALID SQL" }))
        .send()
        .await?;
    println!("ステータス: {}", resp.status());
    println!("レスポンス: {}", resp.text().await?);
    println!();

    // 7. 結果のエクスポート（直前の成功したクエリ）
    println!("7. 結果のエクスポート");
    let resp = client
        .post(format!("{}/query", session_url))
        .json(&json!({}))
        .send()
        .await?;
    println!("デフォルトクエリ: {}", resp.status());

    let resp = client
        .get(format!("{}/export?format=CSV", session_url))
        .send()
        .await?;
    println!("ステータス: {}", resp.status());
    println!("内容:\n{}", resp.text().await?);

    // 8. セッション削除
    let resp = client.delete(&session_url).send().await?;
    println!("8. セッション削除: {}", resp.status());

    println!("APIテスト完了！");

    Ok(())
}

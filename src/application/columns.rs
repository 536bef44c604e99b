use crate::domain::entity::TabularDataset;

/// カラム名を部分一致で絞り込む（大文字小文字を区別しない、元の順序を保つ）
pub fn filter_columns<S: AsRef<str>>(all_names: &[S], needle: &str) -> Vec<String> {
    let needle = needle.to_lowercase();
    all_names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| name.to_lowercase().contains(&needle))
        .map(str::to_string)
        .collect()
}

/// 表示用にカラム名を最大 `groups` 個の連続したグループに分ける
///
/// 各グループの大きさは `ceil(n / groups)`（最後のグループだけ小さくなり得る）。
pub fn column_groups(names: &[String], groups: usize) -> Vec<Vec<String>> {
    if names.is_empty() {
        return Vec::new();
    }
    let groups = groups.max(1);
    let chunk = (names.len() + groups - 1) / groups;

    names.chunks(chunk).map(|group| group.to_vec()).collect()
}

/// 数値型のカラム名を元の順序で返す（自動グラフの対象）
pub fn numeric_columns(dataset: &TabularDataset) -> Vec<String> {
    dataset
        .columns()
        .into_iter()
        .filter(|c| c.is_numeric())
        .map(|c| c.name)
        .collect()
}

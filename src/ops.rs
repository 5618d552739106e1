//! Shared operation wrappers for the CLI and the Nushell plugin.
//!
//! Each `op_*` function is a pure, synchronous wrapper around the `algo`
//! modules. Input and output are `serde_json::Value` — no dependency on clap
//! or nu-plugin. Rows are tab records with `id`, `title` and `url` fields; a
//! row without an `id` is keyed by its position (suffixed if another row
//! already uses that id).

use serde_json::{json, Value};

use crate::algo::config::ClusterConfig;
use crate::algo::grouping::{self, Tab};
use crate::algo::normalize;
use crate::algo::similarity::SimilarityMatrix;
use crate::algo::weighting::TermWeights;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Extract a text field from a JSON object, returning "" if missing.
pub fn get_text(row: &Value, field: &str) -> String {
    row.get(field)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// A JSON row viewed as a tab. The row itself is carried along untouched.
struct RowTab<'r> {
    id: String,
    title: String,
    url: String,
    row: &'r Value,
}

impl Tab for RowTab<'_> {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn url(&self) -> &str {
        &self.url
    }
}

fn row_tabs(rows: &[Value]) -> Vec<RowTab<'_>> {
    let ids = grouping::fill_missing_ids(
        rows.iter()
            .map(|row| match row.get("id") {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            })
            .collect(),
    );
    rows.iter()
        .zip(ids)
        .map(|(row, id)| RowTab {
            id,
            title: get_text(row, "title"),
            url: get_text(row, "url"),
            row,
        })
        .collect()
}

fn model_for(tabs: &[RowTab<'_>], extra_stop_words: &[String]) -> Result<TermWeights, String> {
    let config = ClusterConfig::default().with_stop_words(extra_stop_words.iter().cloned());
    grouping::build_model(tabs, grouping::stop_words_for(&config)).map_err(|e| e.to_string())
}

fn with_column(row: &Value, name: &str, value: Value) -> Value {
    let mut row = row.clone();
    match row.as_object_mut() {
        Some(obj) => {
            obj.insert(name.into(), value);
            row
        }
        None => json!({ "value": row, (name): value }),
    }
}

// ── Operations ───────────────────────────────────────────────────────────────

/// Cluster tab rows. Output is an array of buckets in display order:
/// `{name, kind, size, keywords, tabs}` where `tabs` are the input rows.
pub fn op_cluster(rows: &[Value], config: &ClusterConfig) -> Result<Value, String> {
    let tabs = row_tabs(rows);
    let set = grouping::cluster_tabs(&tabs, config).map_err(|e| e.to_string())?;

    let buckets: Vec<Value> = set
        .iter()
        .map(|bucket| {
            json!({
                "name": bucket.name,
                "kind": bucket.kind,
                "size": bucket.len(),
                "keywords": bucket.keywords,
                "tabs": bucket.items.iter().map(|t| t.row.clone()).collect::<Vec<Value>>(),
            })
        })
        .collect();

    Ok(Value::Array(buckets))
}

/// Append the cleaned clustering document of each row as `_document`.
pub fn op_clean(rows: &[Value]) -> Value {
    let output: Vec<Value> = rows
        .iter()
        .map(|row| {
            let doc = normalize::clean_title(&get_text(row, "title"), &get_text(row, "url"));
            with_column(row, "_document", Value::String(doc))
        })
        .collect();
    Value::Array(output)
}

/// Append the `count` highest-weighted terms of each row as `_terms`.
pub fn op_terms(
    rows: &[Value],
    count: usize,
    extra_stop_words: &[String],
) -> Result<Value, String> {
    let tabs = row_tabs(rows);
    let model = model_for(&tabs, extra_stop_words)?;

    let output: Vec<Value> = tabs
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            let terms: Vec<Value> = model
                .top_terms_at(i, count)
                .into_iter()
                .map(|(term, weight)| json!({"term": term, "weight": weight}))
                .collect();
            with_column(tab.row, "_terms", Value::Array(terms))
        })
        .collect();

    Ok(Value::Array(output))
}

/// Rank rows against a free-text query: `[{id, score, tab}]`, best first.
pub fn op_search(
    rows: &[Value],
    query: &str,
    count: usize,
    extra_stop_words: &[String],
) -> Result<Value, String> {
    let tabs = row_tabs(rows);
    let model = model_for(&tabs, extra_stop_words)?;

    let hits: Vec<Value> = model
        .search(query, count)
        .into_iter()
        .filter_map(|(id, score)| {
            let pos = model.position(&id)?;
            Some(json!({"id": id, "score": score, "tab": tabs[pos].row}))
        })
        .collect();

    Ok(Value::Array(hits))
}

/// Pairwise cosine similarity of all rows: `{ids, matrix}`.
pub fn op_similarity(rows: &[Value], extra_stop_words: &[String]) -> Result<Value, String> {
    let tabs = row_tabs(rows);
    let model = model_for(&tabs, extra_stop_words)?;
    let matrix = SimilarityMatrix::build(&model);

    let rows: Vec<Value> = (0..matrix.len())
        .map(|i| json!(matrix.row(i)))
        .collect();

    Ok(json!({
        "ids": model.ids(),
        "matrix": rows,
    }))
}

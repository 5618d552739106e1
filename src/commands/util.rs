use nu_plugin::EvaluatedCall;
use nu_protocol::{LabeledError, PipelineData, Record, Span, Value};

use crate::algo::config::ClusterConfig;
use crate::algo::grouping::{fill_missing_ids, Tab};

/// Normalize any PipelineData into a Vec<Value> of records.
///
/// Handles:
///   - Table (list of records) → pass through
///   - Single record → [record]
///   - List of strings → [{title: s1}, {title: s2}, ...]
///   - Single string → [{title: s}]
///   - Empty/Nothing → []
pub fn normalize_input(input: PipelineData, span: Span) -> Vec<Value> {
    match input {
        PipelineData::Value(value, _) => normalize_value(value, span),
        other => {
            let values: Vec<Value> = other.into_iter().collect();
            if matches!(values.first(), Some(Value::Record { .. }) | None) {
                values
            } else {
                values.into_iter().map(|v| wrap_value(v, span)).collect()
            }
        }
    }
}

fn normalize_value(value: Value, span: Span) -> Vec<Value> {
    match value {
        Value::List { vals, .. } => {
            if matches!(vals.first(), Some(Value::Record { .. }) | None) {
                vals
            } else {
                vals.into_iter().map(|v| wrap_value(v, span)).collect()
            }
        }
        Value::Record { .. } => vec![value],
        Value::Nothing { .. } => vec![],
        other => vec![wrap_value(other, span)],
    }
}

/// Bare strings are treated as tab titles.
fn wrap_value(v: Value, span: Span) -> Value {
    let mut record = Record::new();
    match &v {
        Value::String { .. } => record.push("title", v),
        _ => record.push("value", v),
    }
    Value::record(record, span)
}

/// Append one column to a record Value. Non-records get wrapped first.
pub fn append_column(row: Value, col_name: &str, col_value: Value, span: Span) -> Value {
    match row {
        Value::Record { val, .. } => {
            let mut record = val.into_owned();
            record.push(col_name, col_value);
            Value::record(record, span)
        }
        other => {
            let mut record = Record::new();
            record.push("value", other);
            record.push(col_name, col_value);
            Value::record(record, span)
        }
    }
}

/// A pipeline row viewed as a tab. A row without `id` is keyed by position.
pub struct NuTab {
    pub id: String,
    pub title: String,
    pub url: String,
    pub row: Value,
}

impl Tab for NuTab {
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

pub fn to_tabs(rows: Vec<Value>) -> Vec<NuTab> {
    let text = |row: &Value, key: &str| {
        row.get_data_by_key(key)
            .and_then(|v| v.coerce_string().ok())
    };
    let ids = fill_missing_ids(rows.iter().map(|row| text(row, "id")).collect());
    rows.into_iter()
        .zip(ids)
        .map(|(row, id)| {
            let title = text(&row, "title").unwrap_or_default();
            let url = text(&row, "url").unwrap_or_default();
            NuTab { id, title, url, row }
        })
        .collect()
}

/// `--stop-words` as a list of strings, empty when absent.
pub fn stop_words_flag(call: &EvaluatedCall) -> Result<Vec<String>, LabeledError> {
    Ok(call.get_flag::<Vec<String>>("stop-words")?.unwrap_or_default())
}

/// Build a validated [`ClusterConfig`] from `--threshold`, `--min-size` and `--stop-words`.
pub fn cluster_config(call: &EvaluatedCall) -> Result<ClusterConfig, LabeledError> {
    let mut config = ClusterConfig::default().with_stop_words(stop_words_flag(call)?);
    if let Some(threshold) = call.get_flag::<f64>("threshold")? {
        config = config.with_threshold(threshold);
    }
    if let Some(min) = call.get_flag::<i64>("min-size")? {
        let min = usize::try_from(min)
            .map_err(|_| LabeledError::new("--min-size must be a positive integer"))?;
        config = config.with_min_cluster_size(min);
    }
    config
        .validate()
        .map_err(|e| LabeledError::new(e.to_string()).with_label("invalid option", call.head))?;
    Ok(config)
}

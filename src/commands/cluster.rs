use std::collections::HashMap;

use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, ListStream, PipelineData, Record, Signature, Signals,
    SyntaxShape, Type, Value,
};

use crate::algo::grouping::{cluster_tabs, BucketKind};
use crate::TabClustersPlugin;

use super::util;

pub struct Cluster;

impl PluginCommand for Cluster {
    type Plugin = TabClustersPlugin;

    fn name(&self) -> &str {
        "tabclusters cluster"
    }

    fn description(&self) -> &str {
        "Group tabs into topical clusters by title similarity"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![
                (Type::table(), Type::table()),
                (Type::list(Type::Any), Type::list(Type::Any)),
            ])
            .named(
                "threshold",
                SyntaxShape::Number,
                "Minimum similarity that links two tabs, in (0, 1] (default: 0.25)",
                Some('t'),
            )
            .named(
                "min-size",
                SyntaxShape::Int,
                "Smaller clusters are folded into \"Other\" (default: 2)",
                Some('m'),
            )
            .named(
                "stop-words",
                SyntaxShape::List(Box::new(SyntaxShape::String)),
                "Extra words to ignore",
                Some('s'),
            )
            .switch(
                "grouped",
                "Return one record per cluster instead of tagging each tab",
                Some('g'),
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["cluster", "group", "tabs", "topics", "bm25"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: r#"[[id title url]; [1 "Rust ownership" "https://doc.rust-lang.org"] [2 "Rust lifetimes" "https://blog.rust-lang.org"]] | tabclusters cluster"#,
                description: "Tag each tab with its cluster name",
                result: None,
            },
            Example {
                example: r#"open tabs.json | tabclusters cluster --grouped --threshold 0.2"#,
                description: "One record per cluster with its tabs",
                result: None,
            },
        ]
    }

    fn run(
        &self,
        _plugin: &TabClustersPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let config = util::cluster_config(call)?;
        let grouped = call.has_flag("grouped")?;
        let head = call.head;

        let rows = util::normalize_input(input, head);
        if rows.is_empty() {
            return Ok(PipelineData::Value(Value::list(vec![], head), None));
        }

        let tabs = util::to_tabs(rows);
        let set = cluster_tabs(&tabs, &config)
            .map_err(|e| LabeledError::new(e.to_string()).with_label("clustering failed", head))?;

        if grouped {
            let results: Vec<Value> = set
                .iter()
                .map(|bucket| {
                    let mut record = Record::new();
                    record.push("name", Value::string(&bucket.name, head));
                    let kind = match bucket.kind {
                        BucketKind::Named => "named",
                        BucketKind::CatchAll => "catch_all",
                    };
                    record.push("kind", Value::string(kind, head));
                    record.push("size", Value::int(bucket.len() as i64, head));
                    record.push(
                        "keywords",
                        Value::list(
                            bucket.keywords.iter().map(|k| Value::string(k, head)).collect(),
                            head,
                        ),
                    );
                    record.push(
                        "tabs",
                        Value::list(bucket.items.iter().map(|t| t.row.clone()).collect(), head),
                    );
                    Value::record(record, head)
                })
                .collect();
            return Ok(ListStream::new(results.into_iter(), head, Signals::empty()).into());
        }

        // Ids are unique once clustering succeeds.
        let assignment: HashMap<&str, &str> = set
            .iter()
            .flat_map(|bucket| bucket.items.iter().map(|t| (t.id.as_str(), bucket.name.as_str())))
            .collect();

        let results: Vec<Value> = tabs
            .iter()
            .map(|tab| {
                let name = assignment.get(tab.id.as_str()).copied().unwrap_or_default();
                util::append_column(tab.row.clone(), "_cluster", Value::string(name, head), head)
            })
            .collect();

        Ok(ListStream::new(results.into_iter(), head, Signals::empty()).into())
    }
}

use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, ListStream, PipelineData, Record, Signature, Signals,
    SyntaxShape, Type, Value,
};

use crate::algo::config::ClusterConfig;
use crate::algo::grouping;
use crate::algo::weighting::DEFAULT_TOP_TERMS;
use crate::TabClustersPlugin;

use super::util;

pub struct Terms;

impl PluginCommand for Terms {
    type Plugin = TabClustersPlugin;

    fn name(&self) -> &str {
        "tabclusters terms"
    }

    fn description(&self) -> &str {
        "Extract the highest-weighted title terms of each tab"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![
                (Type::table(), Type::table()),
                (Type::list(Type::Any), Type::table()),
            ])
            .named(
                "count",
                SyntaxShape::Int,
                "Number of terms per tab (default: 10)",
                Some('n'),
            )
            .named(
                "stop-words",
                SyntaxShape::List(Box::new(SyntaxShape::String)),
                "Extra words to ignore",
                Some('s'),
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["terms", "keywords", "bm25", "tags"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: r#"["Rust ownership and borrowing" "Sourdough bread starter"] | tabclusters terms --count 2"#,
            description: "Top 2 terms per title as {term, weight} records",
            result: None,
        }]
    }

    fn run(
        &self,
        _plugin: &TabClustersPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let count = call
            .get_flag::<i64>("count")?
            .map(|n| n.max(0) as usize)
            .unwrap_or(DEFAULT_TOP_TERMS);
        let config = ClusterConfig::default().with_stop_words(util::stop_words_flag(call)?);
        let head = call.head;

        let rows = util::normalize_input(input, head);
        if rows.is_empty() {
            return Ok(PipelineData::Value(Value::list(vec![], head), None));
        }

        let tabs = util::to_tabs(rows);
        let model = grouping::build_model(&tabs, grouping::stop_words_for(&config))
            .map_err(|e| LabeledError::new(e.to_string()).with_label("weighting failed", head))?;

        let results: Vec<Value> = tabs
            .into_iter()
            .enumerate()
            .map(|(i, tab)| {
                let terms: Vec<Value> = model
                    .top_terms_at(i, count)
                    .into_iter()
                    .map(|(term, weight)| {
                        let mut record = Record::new();
                        record.push("term", Value::string(term, head));
                        record.push("weight", Value::float(weight, head));
                        Value::record(record, head)
                    })
                    .collect();
                util::append_column(tab.row, "_terms", Value::list(terms, head), head)
            })
            .collect();

        Ok(ListStream::new(results.into_iter(), head, Signals::empty()).into())
    }
}

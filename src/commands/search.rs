use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, ListStream, PipelineData, Signature, Signals, SyntaxShape,
    Type, Value,
};

use crate::algo::config::ClusterConfig;
use crate::algo::grouping;
use crate::TabClustersPlugin;

use super::util;

pub struct Search;

impl PluginCommand for Search {
    type Plugin = TabClustersPlugin;

    fn name(&self) -> &str {
        "tabclusters search"
    }

    fn description(&self) -> &str {
        "Rank tabs against a free-text query by BM25 weight"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![
                (Type::table(), Type::table()),
                (Type::list(Type::Any), Type::table()),
            ])
            .required("query", SyntaxShape::String, "Words to look for")
            .named(
                "count",
                SyntaxShape::Int,
                "Maximum number of hits (default: 10)",
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
        vec!["search", "find", "rank", "query"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: r#"open tabs.json | tabclusters search "borrow checker" --count 3"#,
            description: "Three tabs most relevant to the query, with a _score column",
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
        let query: String = call.req(0)?;
        let count = call.get_flag::<i64>("count")?.map(|n| n.max(0) as usize).unwrap_or(10);
        let config = ClusterConfig::default().with_stop_words(util::stop_words_flag(call)?);
        let head = call.head;

        let rows = util::normalize_input(input, head);
        if rows.is_empty() {
            return Ok(PipelineData::Value(Value::list(vec![], head), None));
        }

        let tabs = util::to_tabs(rows);
        let model = grouping::build_model(&tabs, grouping::stop_words_for(&config))
            .map_err(|e| LabeledError::new(e.to_string()).with_label("weighting failed", head))?;

        let results: Vec<Value> = model
            .search(&query, count)
            .into_iter()
            .filter_map(|(id, score)| {
                let pos = model.position(&id)?;
                Some(util::append_column(
                    tabs[pos].row.clone(),
                    "_score",
                    Value::float(score, head),
                    head,
                ))
            })
            .collect();

        Ok(ListStream::new(results.into_iter(), head, Signals::empty()).into())
    }
}

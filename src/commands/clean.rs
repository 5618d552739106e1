use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, ListStream, PipelineData, Signature, Signals, Type, Value,
};

use crate::algo::normalize;
use crate::TabClustersPlugin;

use super::util;

pub struct Clean;

impl PluginCommand for Clean {
    type Plugin = TabClustersPlugin;

    fn name(&self) -> &str {
        "tabclusters clean"
    }

    fn description(&self) -> &str {
        "Show the cleaned text each tab contributes to clustering"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![
                (Type::table(), Type::table()),
                (Type::list(Type::Any), Type::table()),
            ])
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["clean", "normalize", "title", "document"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: r#"[[title url]; ["Pod networking | Kubernetes" "https://kubernetes.io/docs"]] | tabclusters clean"#,
            description: "Strip the site name and punctuation from a title",
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
        let head = call.head;
        let rows = util::normalize_input(input, head);

        let results: Vec<Value> = util::to_tabs(rows)
            .into_iter()
            .map(|tab| {
                let doc = normalize::clean_title(&tab.title, &tab.url);
                util::append_column(tab.row, "_document", Value::string(doc, head), head)
            })
            .collect();

        Ok(ListStream::new(results.into_iter(), head, Signals::empty()).into())
    }
}

use nu_plugin::{serve_plugin, MsgPackSerializer};
use nu_plugin_tabclusters::TabClustersPlugin;

fn main() {
    serve_plugin(&TabClustersPlugin, MsgPackSerializer {})
}

//! Config command implementation

use crate::output::OutputWriter;
use anyhow::Result;
use pasargis_core::config::LayeredConfig;
use std::collections::BTreeMap;

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let values: BTreeMap<String, (String, _)> = config.to_inspection_map().into_iter().collect();

    if output.is_json() {
        let data: BTreeMap<&str, serde_json::Value> = values
            .iter()
            .map(|(key, (value, source))| {
                (key.as_str(), serde_json::json!({ "value": value, "source": source }))
            })
            .collect();
        return output.result(data);
    }

    output.section("Effective Configuration");
    for (key, (value, source)) in &values {
        output.kv(key, format!("{} ({:?})", value, source));
    }
    Ok(())
}

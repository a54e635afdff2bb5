use crate::ast::{DataPath, walk_leaves};
use crate::compiler::CompiledConfig;
use serde_json::{Map, Value as Json};

/// Copies every leaf of `data` to its mapped path.
pub(crate) fn map_data(data: &Json, config: &CompiledConfig) -> Json {
    let mut mapped = Json::Object(Map::new());
    walk_leaves(data, &DataPath::default(), &mut |path, value| {
        if !path.is_empty() {
            config.mapped_path(path).insert(&mut mapped, value.clone());
        }
    });
    mapped
}

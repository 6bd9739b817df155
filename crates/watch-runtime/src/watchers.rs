//! Listener bindings that log every routed change.

use storage_dispatch::{ListenerBinding, SchemaModule, StorageShape};
use tracing::{info, warn};

use crate::config::RuntimeConfig;

/// One logging binding per watched storage item of the schema.
///
/// Items with an unsupported shape are skipped; watched names missing from
/// the schema are reported.
pub fn logging_bindings(schema: &[SchemaModule], config: &RuntimeConfig) -> Vec<ListenerBinding> {
    let mut bindings = Vec::new();

    for module in schema {
        for item in &module.storage {
            if !config.watches(&module.name, &item.name) {
                continue;
            }
            match logging_binding(&module.name, &item.name, item.shape) {
                Some(binding) => bindings.push(binding),
                None => warn!(
                    "[lw-watch] Skipping {}.{}: unsupported storage shape",
                    module.name, item.name
                ),
            }
        }
    }

    for (module, item) in &config.watch {
        let known = schema
            .iter()
            .filter(|m| &m.name == module)
            .any(|m| m.storage.iter().any(|s| &s.name == item));
        if !known {
            warn!("[lw-watch] Watched item {}.{} is not in the schema", module, item);
        }
    }

    bindings
}

fn logging_binding(module: &str, item: &str, shape: StorageShape) -> Option<ListenerBinding> {
    let address = format!("{}.{}", module, item);
    let binding = match shape {
        StorageShape::Plain => ListenerBinding::plain(module, item, move |value| {
            info!(storage = %address, value = value.unwrap_or("<deleted>"), "change");
            Ok(())
        }),
        StorageShape::Map => ListenerBinding::map(module, item, move |key, value| {
            info!(storage = %address, key, value = value.unwrap_or("<deleted>"), "change");
            Ok(())
        }),
        StorageShape::DoubleMap => {
            ListenerBinding::double_map(module, item, move |key1, key2, value| {
                info!(
                    storage = %address,
                    key1,
                    key2,
                    value = value.unwrap_or("<deleted>"),
                    "change"
                );
                Ok(())
            })
        }
        StorageShape::Unsupported => return None,
    };
    Some(binding)
}

//! Display-name remapping over a written output file
//!
//! Directory names are emitted verbatim by the assembler; this pass rewrites
//! pillar names (and every `pillar` field) through a lookup table.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::infrastructure::traits::FileSystem;

/// Service rewriting pillar names in a squarified JSON file.
pub struct PillarNameService {
    fs: Arc<dyn FileSystem>,
    names: BTreeMap<String, String>,
}

impl PillarNameService {
    pub fn new(fs: Arc<dyn FileSystem>, names: BTreeMap<String, String>) -> Self {
        Self { fs, names }
    }

    /// Rewrite `path` in place. Returns the number of replaced values.
    pub fn rename_file(&self, path: &Path) -> ApplicationResult<usize> {
        debug!("rename_file: path={}", path.display());
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read output", path)?;
        let mut document: Value = serde_json::from_str(&content)
            .map_err(|e| ApplicationError::failed(format!("parse {}", path.display()), e))?;

        let count = rename_pillars(&mut document, &self.names);

        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| ApplicationError::failed("serialize output", e))?;
        self.fs
            .write(path, &json)
            .with_path_context("write output", path)?;
        Ok(count)
    }
}

/// Recursively rename pillar nodes and `pillar` fields in `value`.
pub fn rename_pillars(value: &mut Value, names: &BTreeMap<String, String>) -> usize {
    match value {
        Value::Object(map) => {
            let mut count = 0;
            let is_pillar = map.get("type").and_then(Value::as_str) == Some("pillar");
            if is_pillar {
                if let Some(Value::String(name)) = map.get_mut("name") {
                    count += replace(name, "name", names);
                }
            }
            if let Some(Value::String(pillar)) = map.get_mut("pillar") {
                count += replace(pillar, "pillar", names);
            }
            count
                + map
                    .values_mut()
                    .map(|v| rename_pillars(v, names))
                    .sum::<usize>()
        }
        Value::Array(items) => items.iter_mut().map(|v| rename_pillars(v, names)).sum(),
        _ => 0,
    }
}

fn replace(current: &mut String, field: &str, names: &BTreeMap<String, String>) -> usize {
    match names.get(current.as_str()) {
        Some(friendly) => {
            info!("updated {:?}: {:?} -> {:?}", field, current, friendly);
            *current = friendly.clone();
            1
        }
        None => 0,
    }
}

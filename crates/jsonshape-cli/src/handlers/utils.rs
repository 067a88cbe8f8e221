//! Shared utilities for command handlers

use crate::config::Config;
use crate::error::{Error, ErrorContext, Result};
use crate::logging::redaction;
use jsonshape_core::{Schema, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// Placeholder path meaning "no document"
pub const MISSING: &str = "-";

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false)
}

/// Read a JSON or YAML file into a JSON tree
pub fn read_tree(path: &Path) -> Result<serde_json::Value> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    debug!(path = %path.display(), bytes = content.len(), "Read file");

    if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|_| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "YAML".to_string(),
        })
    } else {
        serde_json::from_str(&content).map_err(|_| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON".to_string(),
        })
    }
}

/// Load a document; the `-` placeholder is the missing value
pub fn load_document(path: &Path) -> Result<Option<Value>> {
    if path.as_os_str() == MISSING {
        debug!("Document is missing");
        return Ok(None);
    }

    let tree = read_tree(path)?;
    trace!(path = %path.display(), document = %redaction::redacted(&tree), "Loaded document");
    Ok(Some(Value::from(tree)))
}

/// Load a schema file, resolving `@name` references to user patterns
pub fn load_schema(path: &Path, config: &Config) -> Result<Schema> {
    if path.as_os_str() == MISSING {
        return Err(Error::invalid_args("a schema file is required"));
    }

    let mut tree = read_tree(path)?;
    resolve_user_patterns(&mut tree, config);
    Ok(Schema::from_json(tree)?)
}

/// Replace `matches: "@name"` with the source of a configured pattern
///
/// Only schema positions are visited, so `equal`/`oneOf` data is left alone.
/// Built-in names are left for the schema decoder to resolve.
pub fn resolve_user_patterns(schema: &mut serde_json::Value, config: &Config) {
    let Some(node) = schema.as_object_mut() else {
        return;
    };

    if let Some(serde_json::Value::String(reference)) = node.get_mut("matches") {
        if let Some(source) = reference.strip_prefix('@').and_then(|name| config.pattern(name)) {
            debug!(reference = %reference, "Resolved user pattern");
            *reference = source.to_string();
        }
    }

    if let Some(serde_json::Value::Object(props)) = node.get_mut("props") {
        for prop in props.values_mut() {
            resolve_user_patterns(prop, config);
        }
    }
    if let Some(serde_json::Value::Array(items)) = node.get_mut("items") {
        for item in items.iter_mut() {
            resolve_user_patterns(item, config);
        }
    }
    for key in ["entry", "item"] {
        if let Some(child) = node.get_mut(key) {
            resolve_user_patterns(child, config);
        }
    }
}

/// Save a document, choosing JSON or YAML by extension
pub fn save_document(path: &Path, value: Option<&Value>) -> Result<()> {
    let content = if is_yaml(path) {
        serde_yaml::to_string(&value)?
    } else {
        let mut text = serde_json::to_string_pretty(&value)?;
        text.push('\n');
        text
    };
    fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "Wrote document");
    Ok(())
}

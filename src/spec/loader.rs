//! Spec Loader (§4.8, boundary): parses a workflow-specification file into a
//! [`WorkflowSet`] of validated [`TaskGraph`]s.

use std::collections::HashMap;
use std::path::Path;

use crate::dag::TaskGraph;
use crate::error::SpecError;
use crate::spec::model::SpecDocument;

/// All workflows loaded from one spec file, indexed by `(name, version)`
/// for the Decider Loop (§4.7 step d).
#[derive(Debug)]
pub struct WorkflowSet {
    workflows: HashMap<(String, String), TaskGraph>,
}

impl WorkflowSet {
    pub fn get(&self, name: &str, version: &str) -> Option<&TaskGraph> {
        self.workflows.get(&(name.to_string(), version.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskGraph> {
        self.workflows.values()
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}

/// Sniff the document format from the file extension. JSON is a YAML
/// subset, so anything that isn't explicitly `.json` is parsed as YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

fn sniff_format(path: &Path) -> Format {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Format::Json,
        _ => Format::Yaml,
    }
}

/// Load and validate a spec file from disk.
pub fn load_file(path: impl AsRef<Path>) -> Result<WorkflowSet, SpecError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SpecError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_str(&text, sniff_format(path), &path.display().to_string())
}

fn load_str(text: &str, format: Format, path: &str) -> Result<WorkflowSet, SpecError> {
    let doc: SpecDocument = match format {
        Format::Json => serde_json::from_str(text).map_err(|source| SpecError::Json {
            path: path.to_string(),
            source,
        })?,
        Format::Yaml => serde_yaml::from_str(text).map_err(|source| SpecError::Yaml {
            path: path.to_string(),
            source,
        })?,
    };

    let major = doc
        .version
        .split('.')
        .next()
        .unwrap_or(doc.version.as_str());
    if major != "1" {
        return Err(SpecError::UnsupportedVersion(doc.version));
    }

    let mut workflows = HashMap::with_capacity(doc.workflows.len());
    for raw in doc.workflows {
        let name = raw.name.clone();
        let version = raw.version.clone();
        let graph = TaskGraph::build(raw)?;
        if workflows.insert((name.clone(), version.clone()), graph).is_some() {
            return Err(SpecError::DuplicateWorkflow { name, version });
        }
    }

    Ok(WorkflowSet { workflows })
}

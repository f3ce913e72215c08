//! Pipeline orchestration: escaped model output → preview document.
//!
//! One shared implementation of the decode → transpile → assemble flow.
//! Every caller (preview surface, editor, archive export) goes through
//! [`run`]; none of them re-implements any stage, so the stages can never
//! drift apart.

use serde::{Deserialize, Serialize};

#[cfg(feature = "napi")]
use napi_derive::napi;

use crate::assemble::compose;
use crate::escape::unescape_literal;
use crate::files::{classify, transpiled_name, FileClass, FileMap};
use crate::transpile::{transpile, TranspileError};

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// The composed, self-contained HTML document.
    pub document: String,
    /// Decoded file contents under their original names — the editable
    /// truth handed back to the editor and the archive exporter, exported
    /// as-is with no further transformation.
    pub raw_files: FileMap,
}

/// A run-level failure. There is no partial result: when this is returned
/// the caller gets neither a document nor a raw-file mapping.
#[derive(Debug, Clone)]
pub enum PipelineError {
    Transpile {
        file: String,
        source: TranspileError,
    },
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transpile { file, source } => {
                write!(f, "Transpile failed for {}: {}", file, source)
            }
        }
    }
}

impl std::error::Error for PipelineError {}

/// Run the full pipeline over a project mapping of escaped file contents.
///
/// Each entry is decoded and recorded under its original name in the
/// returned raw mapping. Component files are additionally transpiled and
/// enter the processed mapping under their plain-script name; everything
/// else passes through (a second decode pass is a no-op on already-decoded
/// text). The processed mapping is then composed into one document.
///
/// The run is atomic: the first transpile failure aborts it and nothing is
/// committed. Editing a returned raw file changes nothing here — callers
/// regenerate by invoking `run` again with the edited mapping.
pub async fn run(project: &FileMap) -> Result<PipelineOutput, PipelineError> {
    let mut raw_files = FileMap::new();
    let mut processed = FileMap::new();

    for (name, escaped) in project.iter() {
        let decoded = unescape_literal(escaped);
        raw_files.insert(name, decoded.clone());

        if classify(name) == FileClass::Component {
            let transpiled = transpile(&decoded)
                .await
                .map_err(|source| PipelineError::Transpile {
                    file: name.to_string(),
                    source,
                })?;
            processed.insert(transpiled_name(name), transpiled);
        } else {
            // Defensive second pass; idempotent on clean input.
            processed.insert(name, unescape_literal(&decoded));
        }
    }

    let document = compose(&processed);
    Ok(PipelineOutput {
        document,
        raw_files,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI SURFACE
// Argument marshalling only — all logic lives in the modules above.
// ═══════════════════════════════════════════════════════════════════════════════

/// Upstream model output: `filename → { code }` with escaped contents.
#[derive(Debug, Clone, Deserialize)]
struct SourceEntry {
    code: String,
}

/// Parse the host's `filename → { code }` object into a project mapping,
/// preserving key order.
pub fn project_from_json(content_json: &str) -> Result<FileMap, serde_json::Error> {
    let entries: Vec<(String, SourceEntry)> =
        serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(content_json)?
            .into_iter()
            .map(|(name, value)| {
                serde_json::from_value::<SourceEntry>(value).map(|entry| (name, entry))
            })
            .collect::<Result<_, _>>()?;
    Ok(entries
        .into_iter()
        .map(|(name, entry)| (name, entry.code))
        .collect())
}

#[cfg(feature = "napi")]
#[napi(object)]
pub struct PipelineResultNative {
    /// Composed HTML document, ready to materialize as a preview resource.
    pub document: String,
    /// JSON object of decoded files, key order preserved.
    pub raw_files_json: String,
}

#[cfg(feature = "napi")]
#[napi]
pub async fn run_pipeline_native(content_json: String) -> napi::Result<PipelineResultNative> {
    let project = project_from_json(&content_json)
        .map_err(|e| napi::Error::from_reason(format!("Content parse error: {}", e)))?;
    let output = run(&project)
        .await
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    let raw_files_json = serde_json::to_string(&output.raw_files)
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))?;
    Ok(PipelineResultNative {
        document: output.document,
        raw_files_json,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_from_json_keeps_order_and_unwraps_code() {
        let json = r#"{"z.css":{"code":"body {}"},"App.jsx":{"code":"x"}}"#;
        let project = project_from_json(json).unwrap();
        let names: Vec<&str> = project.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["z.css", "App.jsx"]);
        assert_eq!(project.get("z.css"), Some("body {}"));
    }

    #[test]
    fn test_project_from_json_rejects_malformed_entries() {
        assert!(project_from_json(r#"{"a.js": "bare string"}"#).is_err());
        assert!(project_from_json("not json").is_err());
    }
}

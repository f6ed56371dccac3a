//! Structured source files.
//!
//! `YamlLoader` is the production `StructuredLoader`. Documents are transcoded
//! from YAML into the ordered JSON object model so that every consumer (and the
//! persistent cache) sees one representation. Non-string keys such as `404:`
//! become their string form.

pub mod discovery;

use std::{fs, path::Path};

use log::{debug, trace};

use crate::{
    core::{ResolveError, ResolveResult, StructuredLoader},
    hierarchy::MergedMapping,
};

#[derive(Clone, Copy, Debug, Default)]
pub struct YamlLoader;

impl YamlLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parse a YAML document held in memory
    pub fn parse_str(content: &str) -> Result<MergedMapping, String> {
        let deserializer = serde_yaml::Deserializer::from_str(content);
        let value = serde_transcode::transcode(deserializer, serde_json::value::Serializer)
            .map_err(|e| e.to_string())?;
        trace!("Parsed document: {value:?}");

        MergedMapping::from_value(value).map_err(|e| e.to_string())
    }
}

impl StructuredLoader for YamlLoader {
    fn load(&self, path: &Path) -> ResolveResult<MergedMapping> {
        let content = fs::read_to_string(path)?;
        debug!("Source file read from {}", path.display());

        Self::parse_str(&content).map_err(|message| ResolveError::MalformedSource {
            path: path.to_path_buf(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_preserves_order_and_stringifies_keys() {
        let m = YamlLoader::parse_str(
            r#"
index:
  path: /
404:
  path: /not-found
session:
  time: 3600
"#,
        )
        .unwrap();

        let keys: Vec<&str> = m.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["index", "404", "session"]);
        assert_eq!(m.get("session.time"), Some(&json!(3600)));
        assert_eq!(m.get("404.path"), Some(&json!("/not-found")));
    }

    #[test]
    fn test_empty_document_is_empty_mapping() {
        assert!(YamlLoader::parse_str("").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_file_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yml");
        fs::write(&path, "a: [1, 2\nb: : :").unwrap();

        match YamlLoader::new().load(&path) {
            Err(ResolveError::MalformedSource { path: p, message }) => {
                assert_eq!(p, path);
                assert!(!message.is_empty());
            }
            other => panic!("expected MalformedSource, got {other:?}"),
        }
    }

    #[test]
    fn test_scalar_root_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scalar.yml");
        fs::write(&path, "just a string").unwrap();

        assert!(matches!(
            YamlLoader::new().load(&path),
            Err(ResolveError::MalformedSource { .. })
        ));
    }
}

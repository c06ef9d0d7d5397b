// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Retrieve raw source documents over HTTP or from a local mirror.
// Author: Lukas Bower

use crate::config::SourceConfig;
use crate::error::RetrievalError;
use crate::logical::LogicalFile;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Supplies the two raw documents for a logical file.
pub trait DocumentSource {
    /// Decoded community tree for `file`.
    fn hierarchical_tree(&self, file: LogicalFile) -> Result<Value, RetrievalError>;

    /// Reference implementation module text for `file`.
    fn structural_text(&self, file: LogicalFile) -> Result<String, RetrievalError>;
}

/// Fetches documents from the configured remote locations.
pub struct HttpSource {
    agent: ureq::Agent,
    config: SourceConfig,
}

impl HttpSource {
    #[must_use]
    pub fn new(config: SourceConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .user_agent(&config.http.user_agent)
            .build();
        Self { agent, config }
    }

    fn get_text(&self, url: &str) -> Result<String, RetrievalError> {
        debug!("GET {url}");
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|err| RetrievalError::Http {
                url: url.to_owned(),
                message: err.to_string(),
            })?;
        response.into_string().map_err(|source| RetrievalError::Read {
            location: url.to_owned(),
            source,
        })
    }
}

impl DocumentSource for HttpSource {
    fn hierarchical_tree(&self, file: LogicalFile) -> Result<Value, RetrievalError> {
        let url = self.config.hierarchical_url(&file.file_name());
        let body = self.get_text(&url)?;
        decode_json(&body, url)
    }

    fn structural_text(&self, file: LogicalFile) -> Result<String, RetrievalError> {
        self.get_text(&self.config.structural_url(&file.structural_path()))
    }
}

/// Reads a mirrored copy of both sources from disk.
///
/// Layout: `<root>/hierarchical/<file>.json` and
/// `<root>/structural/<side>/<bound>.py`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn hierarchical_path(&self, file: LogicalFile) -> PathBuf {
        self.root.join("hierarchical").join(file.file_name())
    }

    #[must_use]
    pub fn structural_path(&self, file: LogicalFile) -> PathBuf {
        self.root.join("structural").join(file.structural_path())
    }
}

impl DocumentSource for DirectorySource {
    fn hierarchical_tree(&self, file: LogicalFile) -> Result<Value, RetrievalError> {
        let path = self.hierarchical_path(file);
        let body = read_text(&path)?;
        decode_json(&body, path.display().to_string())
    }

    fn structural_text(&self, file: LogicalFile) -> Result<String, RetrievalError> {
        read_text(&self.structural_path(file))
    }
}

fn read_text(path: &Path) -> Result<String, RetrievalError> {
    debug!("read {}", path.display());
    fs::read_to_string(path).map_err(|source| RetrievalError::Read {
        location: path.display().to_string(),
        source,
    })
}

fn decode_json(body: &str, location: String) -> Result<Value, RetrievalError> {
    serde_json::from_str(body).map_err(|source| RetrievalError::Json { location, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn directory_source_reads_mirror_layout() {
        let temp_dir = TempDir::new().expect("tempdir");
        let source = DirectorySource::new(temp_dir.path());
        let file = LogicalFile::TRIBULLE_SERVERBOUND;
        let tree_path = source.hierarchical_path(file);
        let module_path = source.structural_path(file);
        fs::create_dir_all(tree_path.parent().unwrap()).unwrap();
        fs::create_dir_all(module_path.parent().unwrap()).unwrap();
        fs::write(&tree_path, r#"{"1": "Hello"}"#).unwrap();
        fs::write(&module_path, "class HelloPacket(TribullePacket):\n    id = 1\n").unwrap();

        assert!(tree_path.ends_with("hierarchical/tribulle_serverbound.json"));
        assert!(module_path.ends_with("structural/serverbound/tribulle.py"));
        assert_eq!(source.hierarchical_tree(file).unwrap()["1"], "Hello");
        assert!(source.structural_text(file).unwrap().contains("HelloPacket"));
    }

    #[test]
    fn missing_document_is_a_read_error() {
        let temp_dir = TempDir::new().expect("tempdir");
        let source = DirectorySource::new(temp_dir.path());
        let err = source
            .structural_text(LogicalFile::CLIENTBOUND)
            .unwrap_err();
        assert!(matches!(err, RetrievalError::Read { .. }));
    }

    #[test]
    fn invalid_json_is_reported_with_location() {
        let temp_dir = TempDir::new().expect("tempdir");
        let source = DirectorySource::new(temp_dir.path());
        let path = source.hierarchical_path(LogicalFile::SERVERBOUND);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();
        let err = source
            .hierarchical_tree(LogicalFile::SERVERBOUND)
            .unwrap_err();
        assert!(err.to_string().contains("serverbound.json"));
    }
}

// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Load remote source locations and HTTP settings from TOML.
// Author: Lukas Bower

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DEFAULT_HIERARCHICAL_URL: &str =
    "https://gist.githubusercontent.com/Athesdrake/94dada5f4084e21e21077267467bc801/raw/";
const DEFAULT_STRUCTURAL_URL: &str = "https://github.com/friedkeenan/caseus/raw/refs/heads/main";
const DEFAULT_PACKETS_DIR: &str = "caseus/packets";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    #[serde(default)]
    pub hierarchical: HierarchicalSource,
    #[serde(default)]
    pub structural: StructuralSource,
    #[serde(default)]
    pub http: HttpSettings,
}

/// Community gist holding one nested JSON tree per logical file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HierarchicalSource {
    pub base_url: String,
}

impl Default for HierarchicalSource {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_HIERARCHICAL_URL.to_owned(),
        }
    }
}

/// Reference implementation repository with one module per logical file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructuralSource {
    pub base_url: String,
    #[serde(default = "default_packets_dir")]
    pub packets_dir: String,
}

impl Default for StructuralSource {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STRUCTURAL_URL.to_owned(),
            packets_dir: default_packets_dir(),
        }
    }
}

fn default_packets_dir() -> String {
    DEFAULT_PACKETS_DIR.to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    format!("pktnames/{}", env!("CARGO_PKG_VERSION"))
}

impl SourceConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: SourceConfig = toml::from_str(text).context("invalid source config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read source config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        for (field, url) in [
            ("hierarchical.base_url", &self.hierarchical.base_url),
            ("structural.base_url", &self.structural.base_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                bail!("{field} must be an http(s) URL, got {url:?}");
            }
        }
        if self.http.timeout_secs == 0 || self.http.timeout_secs > MAX_TIMEOUT_SECS {
            bail!(
                "http.timeout_secs {} must be between 1 and {}",
                self.http.timeout_secs,
                MAX_TIMEOUT_SECS
            );
        }
        Ok(())
    }

    /// URL of the community tree for the file named `file_name`.
    #[must_use]
    pub fn hierarchical_url(&self, file_name: &str) -> String {
        format!("{}{}", self.hierarchical.base_url, file_name)
    }

    /// URL of the reference module at `relative` under the packets dir.
    #[must_use]
    pub fn structural_url(&self, relative: &str) -> String {
        format!(
            "{}/{}/{}",
            self.structural.base_url.trim_end_matches('/'),
            self.structural.packets_dir.trim_matches('/'),
            relative
        )
    }
}

//! Configuration for urlfs routers.
//!
//! A config names the scheme the in-memory backend answers to and, optionally,
//! files to preload into it. Tests keep fixtures in a TOML file:
//!
//! ```toml
//! scheme = "internal"
//!
//! [[files]]
//! path = "/etc/app.conf"
//! contents = "debug = true\n"
//!
//! [[files]]
//! path = "/bin/blob"
//! contents = [0, 159, 146, 150]
//! ```
//!
//! Contents are either a string (stored as UTF-8) or an array of bytes.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use urlfs_types::is_valid_scheme;

use crate::vfs::{INTERNAL_SCHEME, InternalFs};

/// Configuration for a router with one in-memory backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlfsConfig {
    /// Scheme the backend is registered under.
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Files created in the backend before first use.
    #[serde(default)]
    pub files: Vec<SeedFile>,
}

fn default_scheme() -> String {
    INTERNAL_SCHEME.to_string()
}

impl Default for UrlfsConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            files: Vec::new(),
        }
    }
}

/// A file preloaded into the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFile {
    /// Registry key, i.e. the path component of the URL (`/a/b`).
    pub path: String,

    /// Initial contents.
    #[serde(default)]
    pub contents: SeedContents,
}

/// Initial contents of a [`SeedFile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedContents {
    Text(String),
    Bytes(Vec<u8>),
}

impl SeedContents {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            SeedContents::Text(text) => text.as_bytes(),
            SeedContents::Bytes(bytes) => bytes,
        }
    }
}

impl Default for SeedContents {
    fn default() -> Self {
        SeedContents::Text(String::new())
    }
}

impl From<&str> for SeedContents {
    fn from(text: &str) -> Self {
        SeedContents::Text(text.to_string())
    }
}

impl From<String> for SeedContents {
    fn from(text: String) -> Self {
        SeedContents::Text(text)
    }
}

impl From<Vec<u8>> for SeedContents {
    fn from(bytes: Vec<u8>) -> Self {
        SeedContents::Bytes(bytes)
    }
}

impl From<&[u8]> for SeedContents {
    fn from(bytes: &[u8]) -> Self {
        SeedContents::Bytes(bytes.to_vec())
    }
}

impl UrlfsConfig {
    /// Load configuration from a TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Invalid urlfs configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot: the scheme must be usable in a URL.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_scheme(&self.scheme) {
            bail!(
                "Invalid urlfs configuration: scheme {:?} must start with a letter \
                 followed by letters, digits, '+', '-' or '.'",
                self.scheme
            );
        }
        Ok(())
    }

    /// Use a different scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Preload a file. Contents may be text or raw bytes.
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<SeedContents>) -> Self {
        self.files.push(SeedFile {
            path: path.into(),
            contents: contents.into(),
        });
        self
    }

    /// Create an [`InternalFs`] holding the configured files.
    ///
    /// Later entries for the same path replace earlier ones.
    pub fn build_backend(&self) -> InternalFs {
        let fs = InternalFs::new();
        for file in &self.files {
            fs.seed(&file.path, file.contents.as_bytes());
        }
        tracing::debug!(
            scheme = %self.scheme,
            files = self.files.len(),
            "built in-memory backend from config"
        );
        fs
    }
}

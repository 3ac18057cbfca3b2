use std::path::PathBuf;

use anyhow::Context as _;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Standard key -> source key, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTable(IndexMap<String, String>);

impl MappingTable {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn standard_keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MappingTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Source of per-sheet-type translation tables. Failures are fatal to the
/// run; callers load each sheet type once.
pub trait MappingSource {
    fn load(&self, platform: Option<&str>, sheet_type: &str) -> anyhow::Result<MappingTable>;
}

/// Mapping files on disk: `<root>/<platform>/<sheet type>.json`, or
/// `<root>/<sheet type>.json` when the campaign has no platform label.
#[derive(Debug, Clone)]
pub struct MappingDir {
    root: PathBuf,
}

impl MappingDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn mapping_path(&self, platform: Option<&str>, sheet_type: &str) -> anyhow::Result<PathBuf> {
        let mut path = self.root.clone();
        if let Some(platform) = platform {
            ensure_plain_segment("platform label", platform)?;
            path.push(platform);
        }
        ensure_plain_segment("sheet type", sheet_type)?;
        path.push(format!("{sheet_type}.json"));
        Ok(path)
    }
}

impl MappingSource for MappingDir {
    fn load(&self, platform: Option<&str>, sheet_type: &str) -> anyhow::Result<MappingTable> {
        let path = self.mapping_path(platform, sheet_type)?;
        tracing::debug!(path = %path.display(), "load mapping");

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("read mapping file: {}", path.display()))?;
        let table: MappingTable = serde_json::from_str(&contents)
            .with_context(|| format!("parse mapping file: {}", path.display()))?;
        Ok(table)
    }
}

fn ensure_plain_segment(what: &str, segment: &str) -> anyhow::Result<()> {
    if segment.is_empty() || segment == "." || segment == ".." {
        anyhow::bail!("{what} is not a usable file name: {segment:?}");
    }
    if segment.contains(['/', '\\']) {
        anyhow::bail!("{what} must not contain path separators: {segment:?}");
    }
    Ok(())
}

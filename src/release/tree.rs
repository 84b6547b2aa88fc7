use serde::Deserialize;

use crate::core::LauncherError;

/// A git tree as returned by `GET /repos/{owner}/{repo}/git/trees/{sha}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub tree: Vec<TreeEntry>,
}

/// One entry of a git tree. Only the fields the launcher reads are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
}

impl Tree {
    /// Decode a tree, treating a wrong shape as a missing release.
    pub fn from_value(value: serde_json::Value) -> Result<Self, LauncherError> {
        serde_json::from_value(value)
            .map_err(|e| LauncherError::no_release(format!("unexpected tree layout: {e}")))
    }

    /// Find the entry whose path matches exactly.
    pub fn entry(&self, path: &str) -> Result<&TreeEntry, LauncherError> {
        self.tree
            .iter()
            .find(|entry| entry.path == path)
            .ok_or_else(|| LauncherError::no_release(format!("tree has no entry '{path}'")))
    }
}

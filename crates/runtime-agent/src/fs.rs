// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Filesystem Operator (§4.7): every primitive resolves a caller-supplied
//! path against a fixed root and rejects anything that escapes it.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("io error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for FsError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound(err.to_string()),
            std::io::ErrorKind::AlreadyExists => FsError::Conflict(err.to_string()),
            _ => FsError::IoError(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirEntryInfo {
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

/// Identifies the agent (duplex stream connection) a clipboard stash belongs
/// to, so two concurrent connections to the same workspace don't clobber
/// each other's pending `Cut`.
pub type AgentId = u64;

pub struct FilesystemOperator {
    root: PathBuf,
    clipboard: Mutex<HashMap<AgentId, PathBuf>>,
}

impl FilesystemOperator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), clipboard: Mutex::new(HashMap::new()) }
    }

    /// Normalizes `relative` against the root, rejecting any `..` component
    /// that would climb above it. Operates lexically: the target need not
    /// exist yet, which `CreateFile`/`CreateFolder` rely on.
    fn resolve(&self, relative: &str) -> Result<PathBuf, FsError> {
        let mut depth: Vec<std::ffi::OsString> = Vec::new();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => depth.push(part.to_owned()),
                Component::CurDir => {}
                Component::ParentDir => {
                    if depth.pop().is_none() {
                        return Err(FsError::InvalidPath(relative.to_string()));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {}
            }
        }
        let mut resolved = self.root.clone();
        resolved.extend(depth);
        Ok(resolved)
    }

    pub async fn fetch_dir(&self, subdir: &str) -> Result<Vec<DirEntryInfo>, FsError> {
        let path = self.resolve(subdir)?;
        let mut read_dir = tokio::fs::read_dir(&path).await?;
        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind: if metadata.is_dir() { EntryKind::Dir } else { EntryKind::File },
                size: metadata.len(),
            });
        }
        Ok(entries)
    }

    pub async fn fetch_content(&self, path: &str) -> Result<String, FsError> {
        let resolved = self.resolve(path)?;
        Ok(tokio::fs::read_to_string(&resolved).await?)
    }

    /// Applies a unified-style textual patch to an existing file. Fails
    /// `Conflict` if the patch's context doesn't match the file on disk.
    pub async fn save_file_diffs(&self, path: &str, patch: &str) -> Result<(), FsError> {
        let resolved = self.resolve(path)?;
        let original = tokio::fs::read_to_string(&resolved).await?;
        let patched = apply_unified_diff(&original, patch)
            .map_err(|reason| FsError::Conflict(format!("patch does not apply to {path}: {reason}")))?;
        tokio::fs::write(&resolved, patched).await?;
        Ok(())
    }

    pub async fn create_file(&self, path: &str) -> Result<(), FsError> {
        let resolved = self.resolve(path)?;
        if tokio::fs::metadata(&resolved).await.is_ok() {
            return Err(FsError::Conflict(path.to_string()));
        }
        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&resolved, []).await?;
        Ok(())
    }

    pub async fn create_folder(&self, path: &str) -> Result<(), FsError> {
        let resolved = self.resolve(path)?;
        if tokio::fs::metadata(&resolved).await.is_ok() {
            return Err(FsError::Conflict(path.to_string()));
        }
        tokio::fs::create_dir_all(&resolved).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), FsError> {
        let resolved = self.resolve(path)?;
        let metadata = tokio::fs::metadata(&resolved).await?;
        if metadata.is_dir() {
            tokio::fs::remove_dir_all(&resolved).await?;
        } else {
            tokio::fs::remove_file(&resolved).await?;
        }
        Ok(())
    }

    pub async fn rename(&self, old_path: &str, new_path: &str) -> Result<(), FsError> {
        let old_resolved = self.resolve(old_path)?;
        let new_resolved = self.resolve(new_path)?;
        tokio::fs::metadata(&old_resolved).await?;
        if tokio::fs::metadata(&new_resolved).await.is_ok() {
            return Err(FsError::Conflict(new_path.to_string()));
        }
        tokio::fs::rename(&old_resolved, &new_resolved).await?;
        Ok(())
    }

    pub async fn copy(&self, src: &str, dst: &str) -> Result<(), FsError> {
        let src_resolved = self.resolve(src)?;
        let dst_resolved = self.resolve(dst)?;
        if tokio::fs::metadata(&dst_resolved).await.is_ok() {
            return Err(FsError::Conflict(dst.to_string()));
        }
        copy_recursive(&src_resolved, &dst_resolved).await?;
        Ok(())
    }

    /// Stashes `source_path` for the calling agent. Overwrites any previous
    /// stash for the same agent.
    pub fn cut(&self, agent: AgentId, source_path: &str) -> Result<(), FsError> {
        let resolved = self.resolve(source_path)?;
        self.clipboard.lock().insert(agent, resolved);
        Ok(())
    }

    /// Moves the agent's stashed path to `target_path`, clearing the stash.
    pub async fn paste(&self, agent: AgentId, target_path: &str) -> Result<(), FsError> {
        let source = self
            .clipboard
            .lock()
            .remove(&agent)
            .ok_or_else(|| FsError::InvalidPath("nothing on clipboard".to_string()))?;
        let target_resolved = self.resolve(target_path)?;
        if tokio::fs::metadata(&target_resolved).await.is_ok() {
            return Err(FsError::Conflict(target_path.to_string()));
        }
        tokio::fs::rename(&source, &target_resolved).await?;
        Ok(())
    }
}

fn copy_recursive<'a>(
    src: &'a Path,
    dst: &'a Path,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + 'a>> {
    Box::pin(async move {
        let metadata = tokio::fs::metadata(src).await?;
        if metadata.is_dir() {
            tokio::fs::create_dir_all(dst).await?;
            let mut read_dir = tokio::fs::read_dir(src).await?;
            while let Some(entry) = read_dir.next_entry().await? {
                copy_recursive(&entry.path(), &dst.join(entry.file_name())).await?;
            }
            Ok(())
        } else {
            tokio::fs::copy(src, dst).await.map(|_| ())
        }
    })
}

/// Minimal unified-diff applier: supports the single-hunk `@@ -l,s +l,s @@`
/// format with ` `/`+`/`-` prefixed lines. Rejects the patch if a `-` or
/// context line doesn't match the corresponding source line.
fn apply_unified_diff(original: &str, patch: &str) -> Result<String, String> {
    let original_lines: Vec<&str> = original.lines().collect();
    let mut result = Vec::new();
    let mut cursor = 0usize;
    let mut applied_any_hunk = false;

    for line in patch.lines() {
        if line.starts_with("---") || line.starts_with("+++") {
            continue;
        }
        if let Some(header) = line.strip_prefix("@@ ") {
            let start = header.split(' ').next().and_then(|part| part.strip_prefix('-')).ok_or("malformed hunk header")?;
            let start_line: usize = start.split(',').next().ok_or("malformed hunk header")?.parse().map_err(|_| "malformed hunk header")?;
            let target = start_line.saturating_sub(1);
            if target < cursor {
                return Err("hunks must be ordered and non-overlapping".to_string());
            }
            result.extend(original_lines.get(cursor..target).ok_or("hunk starts past end of file")?);
            cursor = target;
            applied_any_hunk = true;
            continue;
        }
        if !applied_any_hunk {
            continue;
        }
        if let Some(added) = line.strip_prefix('+') {
            result.push(added);
        } else if let Some(removed) = line.strip_prefix('-') {
            let actual = original_lines.get(cursor).ok_or("patch removes a line past end of file")?;
            if *actual != removed {
                return Err(format!("context mismatch at line {}", cursor + 1));
            }
            cursor += 1;
        } else if let Some(context) = line.strip_prefix(' ') {
            let actual = original_lines.get(cursor).ok_or("patch context past end of file")?;
            if *actual != context {
                return Err(format!("context mismatch at line {}", cursor + 1));
            }
            result.push(context);
            cursor += 1;
        }
    }
    result.extend(original_lines.get(cursor..).unwrap_or_default());

    let mut text = result.join("\n");
    if original.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;

//! Path resolution inside the project sandbox.
//!
//! Every path a tool touches is resolved against the project root and must
//! stay inside it after `..` components and symlinks are resolved.

use std::path::{Component, Path, PathBuf};

use codeloop_core::error::ToolError;

/// Error returned when a path cannot be used by a tool.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("path is empty")]
    EmptyPath,

    #[error("path '{path}' is outside the project root")]
    OutsideRoot { path: String },

    #[error("failed to resolve '{path}': {reason}")]
    ResolveFailed { path: String, reason: String },
}

impl From<SandboxError> for ToolError {
    fn from(e: SandboxError) -> Self {
        ToolError::SandboxViolation(e.to_string())
    }
}

/// Resolve `path` (relative to `root`, or absolute) to a location inside `root`.
///
/// The path does not need to exist yet; the longest existing prefix is
/// canonicalized so symlinks pointing out of the root are caught.
pub fn resolve_in_root(root: &Path, path: &str) -> Result<PathBuf, SandboxError> {
    if path.trim().is_empty() {
        return Err(SandboxError::EmptyPath);
    }

    let root = root
        .canonicalize()
        .map_err(|e| SandboxError::ResolveFailed {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;

    let candidate = Path::new(path);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };

    let resolved = canonicalize_existing_prefix(&normalize(&joined), path)?;
    if !resolved.starts_with(&root) {
        return Err(SandboxError::OutsideRoot { path: path.into() });
    }

    Ok(resolved)
}

/// Path of `abs` relative to `root` for display, falling back to `abs`.
pub fn display_path(root: &Path, abs: &Path) -> String {
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    match abs.strip_prefix(&root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".into(),
        Ok(rel) => rel.display().to_string(),
        Err(_) => abs.display().to_string(),
    }
}

/// Lexically drop `.` and fold `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn canonicalize_existing_prefix(path: &Path, original: &str) -> Result<PathBuf, SandboxError> {
    let mut existing = path.to_path_buf();
    let mut missing = Vec::new();

    while !existing.exists() {
        match existing.file_name() {
            Some(name) => {
                missing.push(name.to_os_string());
                existing.pop();
            }
            None => break,
        }
    }

    let mut resolved = existing
        .canonicalize()
        .map_err(|e| SandboxError::ResolveFailed {
            path: original.into(),
            reason: e.to_string(),
        })?;
    for part in missing.iter().rev() {
        resolved.push(part);
    }
    Ok(resolved)
}

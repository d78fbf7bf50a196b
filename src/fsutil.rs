//! Small filesystem utilities.

use globset::{Glob, GlobSet, GlobSetBuilder};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{ReplayError, ReplayResult};

/// Expands CLI arguments into replay files.
///
/// Each argument may be a plain file, a directory (every file with
/// `extension` under it) or a glob pattern.
pub fn find_replay_files(patterns: &[String], extension: &str) -> ReplayResult<Vec<PathBuf>> {
    let mut out = BTreeSet::new();
    let mut globs = Vec::new();

    for pattern in patterns {
        let p = PathBuf::from(pattern);
        if has_glob_meta(pattern) {
            globs.push(pattern.clone());
        } else if p.is_file() {
            out.insert(p);
        } else if p.is_dir() {
            for file in walk_files(&p)? {
                if file.extension().and_then(|s| s.to_str()) == Some(extension) {
                    out.insert(file);
                }
            }
        } else {
            return Err(ReplayError::InvalidArgument(format!(
                "no such file or directory: {pattern}"
            )));
        }
    }

    if !globs.is_empty() {
        let set = compile_globset(&globs)?;
        for root in walk_roots(&globs) {
            for file in walk_files(&root)? {
                let rel = file.strip_prefix(".").unwrap_or(&file).to_path_buf();
                if set.is_match(&rel) {
                    out.insert(rel);
                }
            }
        }
    }
    Ok(out.into_iter().collect())
}

fn walk_files(root: &Path) -> ReplayResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !should_skip_dir(e.path()))
    {
        let entry = entry.map_err(|e| {
            let msg = e.to_string();
            ReplayError::Io(e.into_io_error().unwrap_or_else(|| std::io::Error::other(msg)))
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn walk_roots(patterns: &[String]) -> BTreeSet<PathBuf> {
    let mut roots = BTreeSet::new();
    for pattern in patterns {
        let prefix = pattern
            .split(['*', '?', '[', ']', '{', '}'])
            .next()
            .unwrap_or_default();
        let trimmed = prefix.trim_end_matches('/');
        let p = PathBuf::from(trimmed);
        if trimmed.is_empty() {
            roots.insert(PathBuf::from("."));
        } else if p.is_dir() {
            roots.insert(p);
        } else {
            match p.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => {
                    roots.insert(parent.to_path_buf());
                }
                _ => {
                    roots.insert(PathBuf::from("."));
                }
            }
        }
    }
    roots
}

fn should_skip_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name| matches!(name, ".git" | "target" | "node_modules"))
}

fn compile_globset(patterns: &[String]) -> ReplayResult<GlobSet> {
    let mut b = GlobSetBuilder::new();
    for p in patterns {
        let g = Glob::new(p)
            .map_err(|e| ReplayError::InvalidArgument(format!("invalid glob {p:?}: {e}")))?;
        b.add(g);
    }
    b.build()
        .map_err(|e| ReplayError::InvalidArgument(format!("invalid globset: {e}")))
}

fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', ']', '{', '}'])
}

/// `dir/name.replay` -> `dir/name.<tag>.replay`.
pub fn tagged_path(input: &Path, tag: &str) -> PathBuf {
    let parent = input
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("replay");
    let out_name = match input.extension().and_then(|s| s.to_str()) {
        Some(ext) => format!("{stem}.{tag}.{ext}"),
        None => format!("{stem}.{tag}"),
    };
    parent.join(out_name)
}

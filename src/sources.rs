//! Local document sources.
//!
//! Turns single files and directory trees into [`SourceFile`]s. The MIME
//! type is guessed from the file extension, the way a browser labels an
//! upload; extraction decides later whether the type is supported.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use walkdir::WalkDir;

use crate::config::SourcesConfig;
use crate::extract::mime_for_name;
use crate::models::SourceFile;

/// Reads one local file. The document name is the file name.
pub fn read_file(path: &Path) -> Result<SourceFile> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| anyhow::anyhow!("Not a file path: {}", path.display()))?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(SourceFile::new(name.clone(), mime_for_name(&name), bytes))
}

/// Walks `root` and returns every file matching the include globs and none
/// of the exclude globs, sorted by relative path.
///
/// Documents are named by their path relative to `root`, so two files
/// called `notes.md` in different folders stay distinct.
pub fn scan_dir(root: &Path, config: &SourcesConfig) -> Result<Vec<SourceFile>> {
    if !root.is_dir() {
        bail!("Source directory does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.include_globs)?;

    let mut default_excludes = vec!["**/.git/**".to_string(), "**/node_modules/**".to_string()];
    default_excludes.extend(config.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }

        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(SourceFile::new(rel_str.clone(), mime_for_name(&rel_str), bytes));
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(root = %root.display(), files = files.len(), "scanned source directory");
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{MIME_MARKDOWN, MIME_TEXT};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_file_guesses_mime() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.md");
        fs::write(&path, "# Notes").unwrap();

        let file = read_file(&path).unwrap();
        assert_eq!(file.name, "notes.md");
        assert_eq!(file.mime_type, MIME_MARKDOWN);
        assert_eq!(file.bytes, b"# Notes");
    }

    #[test]
    fn test_read_missing_file_fails() {
        assert!(read_file(Path::new("/nonexistent/file.txt")).is_err());
    }

    #[test]
    fn test_scan_dir_applies_globs() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("b.txt"), "bee").unwrap();
        fs::write(root.join("sub/a.md"), "ay").unwrap();
        fs::write(root.join("image.png"), [0u8, 1, 2]).unwrap();
        fs::write(root.join(".git/config.txt"), "ignored").unwrap();
        fs::write(root.join("skip.txt"), "excluded").unwrap();

        let config = SourcesConfig {
            exclude_globs: vec!["skip.txt".to_string()],
            ..SourcesConfig::default()
        };
        let files = scan_dir(root, &config).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "sub/a.md"]);
        assert_eq!(files[0].mime_type, MIME_TEXT);
    }

    #[test]
    fn test_scan_missing_dir_fails() {
        let err = scan_dir(Path::new("/nonexistent/dir"), &SourcesConfig::default()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}

//! Log file discovery.
//!
//! Expands the roots given on the command line into the list of files the
//! engine will scan. A file is selected when its name contains one of the
//! configured markers, which also picks up rotated files such as
//! `system.log.1` or `debug.log.2.zip`.

use std::path::{Path, PathBuf};

use nodelog_core::error::{NodelogError, Result};
use nodelog_core::settings::DEFAULT_LOG_MARKERS;
use tracing::debug;
use walkdir::WalkDir;

/// Which files count as logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Substrings matched against each file name.
    pub markers: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            markers: DEFAULT_LOG_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl DiscoveryConfig {
    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }

    /// Returns `true` when `file_name` contains any configured marker.
    pub fn is_log_file(&self, file_name: &str) -> bool {
        self.markers.iter().any(|m| file_name.contains(m.as_str()))
    }
}

/// Find every log file under each of `roots`, in visitation order.
///
/// Symlinks are not followed, so a dangling link named like a log is
/// still selected and later reported as an open failure. Any walk error
/// aborts discovery with [`NodelogError::Discovery`]; no partial list is
/// returned.
pub fn find_log_files<P: AsRef<Path>>(
    roots: &[P],
    config: &DiscoveryConfig,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in roots {
        let root = root.as_ref();
        let before = files.len();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| NodelogError::Discovery {
                root: root.to_path_buf(),
                source: e.into(),
            })?;
            if entry.file_type().is_dir() {
                continue;
            }
            if config.is_log_file(&entry.file_name().to_string_lossy()) {
                files.push(entry.into_path());
            }
        }
        debug!(
            "Found {} log files under {}",
            files.len() - before,
            root.display()
        );
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) -> PathBuf {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "line\n").unwrap();
        path
    }

    fn names(files: &[PathBuf]) -> BTreeSet<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_selects_marked_files_recursively() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "nodes/n1/logs/system.log");
        touch(dir.path(), "nodes/n1/logs/debug.log");
        touch(dir.path(), "nodes/n2/logs/system.log.1");
        touch(dir.path(), "nodes/n2/logs/gc.log");
        touch(dir.path(), "nodes/n2/conf/cassandra.yaml");

        let files = find_log_files(&[dir.path()], &DiscoveryConfig::default()).unwrap();
        assert_eq!(files.len(), 3);
        assert_eq!(
            names(&files),
            BTreeSet::from([
                "system.log".to_string(),
                "debug.log".to_string(),
                "system.log.1".to_string()
            ])
        );
    }

    #[test]
    fn test_directories_named_like_logs_are_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("system.log.d")).unwrap();
        touch(dir.path(), "system.log.d/notes.txt");

        let files = find_log_files(&[dir.path()], &DiscoveryConfig::default()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_root_may_be_a_file() {
        let dir = TempDir::new().unwrap();
        let path = touch(dir.path(), "system.log");

        let files = find_log_files(&[&path], &DiscoveryConfig::default()).unwrap();
        assert_eq!(files, vec![path]);
    }

    #[test]
    fn test_union_across_roots() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let pa = touch(a.path(), "system.log");
        let pb = touch(b.path(), "debug.log");

        let files = find_log_files(&[a.path(), b.path()], &DiscoveryConfig::default()).unwrap();
        assert_eq!(files, vec![pa, pb]);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "system.log");
        let missing = dir.path().join("does-not-exist");

        let err = find_log_files(&[dir.path(), missing.as_path()], &DiscoveryConfig::default())
            .unwrap_err();
        match err {
            NodelogError::Discovery { root, .. } => assert_eq!(root, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_roots_yields_nothing() {
        let roots: [&Path; 0] = [];
        let files = find_log_files(&roots, &DiscoveryConfig::default()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_custom_markers() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "output.log");
        touch(dir.path(), "system.log");
        let config = DiscoveryConfig::new(vec!["output.log".to_string()]);

        let files = find_log_files(&[dir.path()], &config).unwrap();
        assert_eq!(names(&files), BTreeSet::from(["output.log".to_string()]));
    }

    #[test]
    fn test_rediscovery_yields_same_set() {
        let dir = TempDir::new().unwrap();
        for n in 0..5 {
            touch(dir.path(), &format!("nodes/n{n}/system.log"));
        }
        let config = DiscoveryConfig::default();
        let first: BTreeSet<PathBuf> = find_log_files(&[dir.path()], &config)
            .unwrap()
            .into_iter()
            .collect();
        let second: BTreeSet<PathBuf> = find_log_files(&[dir.path()], &config)
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
    }
}

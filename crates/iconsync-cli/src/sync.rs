//! # Output Directory Reconciliation
//!
//! Makes an output directory mirror a fetched icon set. Two policies exist
//! and are selected explicitly; they are never combined:
//!
//! - [`SyncPolicy::Incremental`] (default): files present before the fetch
//!   whose names are not produced by any fetched icon are deleted, then every
//!   icon is written. Subdirectories are left alone.
//! - [`SyncPolicy::CleanSlate`]: the directory is removed recursively and
//!   recreated empty, then every icon is written. No removal accounting.
//!
//! The directory is listed in [`OutputDir::prepare`], before fetching, and
//! only mutated in [`OutputDir::apply`], after a successful fetch. A failed
//! fetch therefore leaves existing files untouched. Writes and deletions are
//! not transactional: an I/O failure part-way leaves earlier changes in place.

use std::collections::HashSet;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use iconsync_core::IconRecord;

/// How stale files are removed from the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// Delete only files that no fetched icon maps to.
    #[default]
    Incremental,
    /// Wipe and recreate the directory before writing.
    CleanSlate,
}

/// Counts reported at the end of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Icon files written.
    pub synced: usize,
    /// Stale files deleted (always zero under [`SyncPolicy::CleanSlate`]).
    pub removed: usize,
}

impl SyncReport {
    /// Print the end-of-run summary to stdout.
    pub fn print_summary(&self) {
        println!("----------------------------------");
        println!("Total icons synced: {}", self.synced);
        if self.removed > 0 {
            println!("Total icons removed: {}", self.removed);
        }
    }
}

/// An output directory captured before fetching.
#[derive(Debug)]
pub struct OutputDir {
    path: PathBuf,
    policy: SyncPolicy,
    existing: Vec<OsString>,
}

impl OutputDir {
    /// Capture the current state of `path` under `policy`.
    ///
    /// For [`SyncPolicy::Incremental`] this lists the regular files in the
    /// directory, creating it if it does not exist. Any listing error other
    /// than "not found" is returned. [`SyncPolicy::CleanSlate`] defers all
    /// work to [`apply`](Self::apply).
    pub async fn prepare(path: impl Into<PathBuf>, policy: SyncPolicy) -> Result<Self> {
        let path = path.into();
        let existing = match policy {
            SyncPolicy::Incremental => list_files(&path).await?,
            SyncPolicy::CleanSlate => Vec::new(),
        };

        tracing::debug!(
            path = %path.display(),
            ?policy,
            existing = existing.len(),
            "prepared output directory"
        );

        Ok(Self {
            path,
            policy,
            existing,
        })
    }

    /// Directory being reconciled.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reconcile the directory with `icons`.
    ///
    /// Every icon file name is checked before anything is touched: a name
    /// that is not a single plain path component fails the whole apply.
    /// Stale files are then removed, and all icons are written with at most
    /// `concurrency` writes in flight. Existing files are overwritten
    /// unconditionally.
    pub async fn apply(&self, icons: &[IconRecord], concurrency: usize) -> Result<SyncReport> {
        let files = icons
            .iter()
            .map(|icon| Ok((checked_file_name(icon)?, icon.svg.as_str())))
            .collect::<Result<Vec<_>>>()?;

        let removed = match self.policy {
            SyncPolicy::Incremental => self.remove_stale(&files).await?,
            SyncPolicy::CleanSlate => {
                self.recreate().await?;
                0
            }
        };

        let path = self.path.as_path();
        let writes = files.iter().map(|(file_name, svg)| async move {
            tokio::fs::write(path.join(file_name), svg)
                .await
                .with_context(|| format!("failed to write {}", path.join(file_name).display()))?;
            println!("Synced {file_name}");
            Ok::<_, anyhow::Error>(())
        });

        let synced = stream::iter(writes)
            .buffer_unordered(concurrency.max(1))
            .try_fold(0usize, |count, ()| async move { Ok(count + 1) })
            .await?;

        Ok(SyncReport { synced, removed })
    }

    /// Delete every pre-existing file that no icon maps to.
    async fn remove_stale(&self, files: &[(String, &str)]) -> Result<usize> {
        let expected: HashSet<&str> = files.iter().map(|(name, _)| name.as_str()).collect();

        let mut removed = 0;
        for name in &self.existing {
            let keep = name.to_str().is_some_and(|n| expected.contains(n));
            if keep {
                continue;
            }
            let target = self.path.join(name);
            tokio::fs::remove_file(&target)
                .await
                .with_context(|| format!("failed to remove {}", target.display()))?;
            println!("Removed {}", name.to_string_lossy());
            removed += 1;
        }
        Ok(removed)
    }

    async fn recreate(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to remove {}", self.path.display()));
            }
        }
        tokio::fs::create_dir_all(&self.path)
            .await
            .with_context(|| format!("failed to create {}", self.path.display()))
    }
}

/// Derive an icon's file name, refusing anything that would resolve outside
/// the output directory.
fn checked_file_name(icon: &IconRecord) -> Result<String> {
    let file_name = icon.file_name();
    let mut components = Path::new(&file_name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single {
        bail!(
            "icon {:?} maps to file name {file_name:?}, which is not a plain file name",
            icon.name
        );
    }
    Ok(file_name)
}

/// List regular files (and symlinks) directly inside `path`, sorted by
/// name. A missing directory is created and reported as empty.
async fn list_files(path: &Path) -> Result<Vec<OsString>> {
    let mut entries = match tokio::fs::read_dir(path).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "creating output directory");
            tokio::fs::create_dir_all(path)
                .await
                .with_context(|| format!("failed to create {}", path.display()))?;
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("failed to read {}", path.display()))?
    {
        let file_type = entry
            .file_type()
            .await
            .with_context(|| format!("failed to stat {}", entry.path().display()))?;
        if file_type.is_dir() {
            tracing::debug!(dir = %entry.path().display(), "skipping subdirectory");
            continue;
        }
        files.push(entry.file_name());
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use iconsync_core::parse_icon_name;

    fn icon(name: &str, raw_properties: &str, svg: &str) -> IconRecord {
        IconRecord {
            name: name.to_string(),
            properties: parse_icon_name(raw_properties),
            svg: svg.to_string(),
        }
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn incremental_removes_stale_and_writes_all() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.svg"), "old a").unwrap();
        std::fs::write(tmp.path().join("b.svg"), "old b").unwrap();

        let icons = vec![icon("A", "", "new a"), icon("C", "", "new c")];
        let out = OutputDir::prepare(tmp.path(), SyncPolicy::Incremental)
            .await
            .unwrap();
        let report = out.apply(&icons, 4).await.unwrap();

        assert_eq!(report, SyncReport { synced: 2, removed: 1 });
        assert_eq!(names(tmp.path()), vec!["a.svg", "c.svg"]);
        assert_eq!(std::fs::read_to_string(tmp.path().join("a.svg")).unwrap(), "new a");
        assert_eq!(std::fs::read_to_string(tmp.path().join("c.svg")).unwrap(), "new c");
    }

    #[tokio::test]
    async fn second_run_removes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let icons = vec![
            icon("Arrow Right", "Size=24, Color=Red", "<svg/>"),
            icon("Close", "Size=16", "<svg/>"),
        ];

        let first = OutputDir::prepare(tmp.path(), SyncPolicy::Incremental)
            .await
            .unwrap()
            .apply(&icons, 2)
            .await
            .unwrap();
        let after_first = names(tmp.path());

        let second = OutputDir::prepare(tmp.path(), SyncPolicy::Incremental)
            .await
            .unwrap()
            .apply(&icons, 2)
            .await
            .unwrap();

        assert_eq!(first, SyncReport { synced: 2, removed: 0 });
        assert_eq!(second, SyncReport { synced: 2, removed: 0 });
        assert_eq!(names(tmp.path()), after_first);
        assert_eq!(after_first, vec!["arrow_right-24-red.svg", "close-16.svg"]);
    }

    #[tokio::test]
    async fn missing_directory_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested").join("icons");

        let out = OutputDir::prepare(&target, SyncPolicy::Incremental)
            .await
            .unwrap();
        assert!(target.is_dir());
        assert!(out.existing.is_empty());

        let report = out.apply(&[icon("Home", "", "<svg/>")], 1).await.unwrap();
        assert_eq!(report.synced, 1);
        assert!(target.join("home.svg").is_file());
    }

    #[tokio::test]
    async fn subdirectories_are_left_alone() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("legacy")).unwrap();
        std::fs::write(tmp.path().join("legacy").join("x.svg"), "x").unwrap();

        let out = OutputDir::prepare(tmp.path(), SyncPolicy::Incremental)
            .await
            .unwrap();
        let report = out.apply(&[], 1).await.unwrap();

        assert_eq!(report, SyncReport::default());
        assert!(tmp.path().join("legacy").join("x.svg").is_file());
    }

    #[tokio::test]
    async fn non_icon_files_are_removed() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("README.md"), "notes").unwrap();
        std::fs::write(tmp.path().join("Home.svg"), "case differs").unwrap();

        let out = OutputDir::prepare(tmp.path(), SyncPolicy::Incremental)
            .await
            .unwrap();
        let report = out.apply(&[icon("Home", "", "<svg/>")], 1).await.unwrap();

        assert_eq!(report.removed, 2);
        assert_eq!(names(tmp.path()), vec!["home.svg"]);
    }

    #[tokio::test]
    async fn clean_slate_wipes_directory_on_apply_only() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("stale.svg"), "stale").unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();

        let out = OutputDir::prepare(tmp.path(), SyncPolicy::CleanSlate)
            .await
            .unwrap();
        // Nothing is touched until apply.
        assert!(tmp.path().join("stale.svg").is_file());

        let report = out.apply(&[icon("Home", "Size=24", "<svg/>")], 2).await.unwrap();
        assert_eq!(report, SyncReport { synced: 1, removed: 0 });
        assert_eq!(names(tmp.path()), vec!["home-24.svg"]);
    }

    #[tokio::test]
    async fn clean_slate_tolerates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("icons");

        let out = OutputDir::prepare(&target, SyncPolicy::CleanSlate)
            .await
            .unwrap();
        let report = out.apply(&[icon("Home", "", "<svg/>")], 1).await.unwrap();
        assert_eq!(report.synced, 1);
        assert!(target.join("home.svg").is_file());
    }

    #[tokio::test]
    async fn escaping_file_name_is_rejected_before_any_change() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("icons");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("stale.svg"), "stale").unwrap();

        for policy in [SyncPolicy::Incremental, SyncPolicy::CleanSlate] {
            let out = OutputDir::prepare(&target, policy).await.unwrap();
            let icons = [icon("Home", "", "<svg/>"), icon("../escaped", "", "<svg/>")];
            let err = out.apply(&icons, 1).await.unwrap_err();

            assert!(err.to_string().contains("../escaped.svg"), "unexpected error: {err}");
            assert!(!tmp.path().join("escaped.svg").exists());
            assert_eq!(names(&target), vec!["stale.svg"]);
        }
    }

    #[test]
    fn separators_in_names_are_rejected() {
        assert!(checked_file_name(&icon("a/b", "", "")).is_err());
        assert!(checked_file_name(&icon("/abs", "", "")).is_err());
        assert!(checked_file_name(&icon("Icons", "Size=a/b", "")).is_err());
        assert_eq!(
            checked_file_name(&icon("Arrow Right", "Size=24", "")).unwrap(),
            "arrow_right-24.svg"
        );
        assert_eq!(checked_file_name(&icon("..", "", "")).unwrap(), "...svg");
    }

    #[tokio::test]
    async fn listing_a_file_path_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();

        assert!(OutputDir::prepare(&file, SyncPolicy::Incremental).await.is_err());
    }
}

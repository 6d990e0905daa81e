//! Per-file change statistics from the recent history of a git repository.

use git2::{Repository, Sort};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// How many commits back from `HEAD` are read.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileChurn {
    /// Commits in the window that touched the file.
    pub commits: u64,
    /// Lines added plus lines deleted across those commits.
    pub changed_lines: u64,
}

/// Churn keyed by canonical absolute path.
#[derive(Debug, Clone, Default)]
pub struct History {
    files: HashMap<PathBuf, FileChurn>,
}

impl History {
    /// Read the last `depth` commits of the repository containing `path`. Each commit
    /// is diffed against its first parent; a root commit counts its whole tree as added.
    pub fn collect(path: &Path, depth: usize) -> Result<Self> {
        let repo = Repository::discover(path)?;
        let Some(workdir) = repo.workdir() else {
            return Err(git2::Error::from_str("bare repositories have no working tree").into());
        };
        let workdir = workdir
            .canonicalize()
            .map_err(|e| Error::io(workdir, e))?;

        let mut walk = repo.revwalk()?;
        walk.push_head()?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        let mut files: HashMap<PathBuf, FileChurn> = HashMap::new();
        let mut seen = 0usize;
        for oid in walk.take(depth) {
            let commit = repo.find_commit(oid?)?;
            let tree = commit.tree()?;
            let parent = commit.parents().next().map(|p| p.tree()).transpose()?;
            let diff = repo.diff_tree_to_tree(parent.as_ref(), Some(&tree), None)?;

            for idx in 0..diff.deltas().len() {
                let Some(delta) = diff.get_delta(idx) else {
                    continue;
                };
                let Some(rel) = delta.new_file().path().or_else(|| delta.old_file().path()) else {
                    continue;
                };
                let rel = rel.to_path_buf();
                // binary files have no patch; they still count as touched
                let lines = match git2::Patch::from_diff(&diff, idx)? {
                    Some(patch) => {
                        let (_, added, deleted) = patch.line_stats()?;
                        (added + deleted) as u64
                    }
                    None => 0,
                };
                let churn = files.entry(workdir.join(rel)).or_default();
                churn.commits += 1;
                churn.changed_lines += lines;
            }
            seen += 1;
        }

        tracing::debug!(workdir = %workdir.display(), commits = seen, files = files.len(), "read history");
        Ok(Self { files })
    }

    /// Untouched files have zero churn.
    pub fn churn(&self, path: &Path) -> FileChurn {
        path.canonicalize()
            .ok()
            .and_then(|p| self.files.get(&p).copied())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use git2::{Commit, Signature};

    pub(crate) fn commit(repo: &Repository, files: &[(&str, &str)], message: &str) {
        let root = repo.workdir().unwrap().to_path_buf();
        for (name, body) in files {
            std::fs::write(root.join(name), body).unwrap();
        }
        let mut index = repo.index().unwrap();
        for (name, _) in files {
            index.add_path(Path::new(name)).unwrap();
        }
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("dev", "dev@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents).unwrap();
    }

    /// `a.txt` is touched twice (2 lines added, then 1 removed and 2 added), `b.txt` once.
    pub(crate) fn two_commit_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit(&repo, &[("a.txt", "1\n2\n"), ("b.txt", "x\n")], "first");
        commit(&repo, &[("a.txt", "1\n3\n4\n")], "second");
        dir
    }

    #[test]
    fn counts_commits_and_changed_lines() {
        let dir = two_commit_repo();
        let history = History::collect(dir.path(), DEFAULT_HISTORY_DEPTH).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(
            history.churn(&dir.path().join("a.txt")),
            FileChurn {
                commits: 2,
                changed_lines: 5
            }
        );
        assert_eq!(
            history.churn(&dir.path().join("b.txt")),
            FileChurn {
                commits: 1,
                changed_lines: 1
            }
        );
        assert_eq!(history.churn(&dir.path().join("missing.txt")), FileChurn::default());
    }

    #[test]
    fn depth_limits_the_window() {
        let dir = two_commit_repo();
        let history = History::collect(dir.path(), 1).unwrap();
        assert_eq!(history.churn(&dir.path().join("a.txt")).commits, 1);
        assert_eq!(history.churn(&dir.path().join("b.txt")).commits, 0);
    }

    #[test]
    fn outside_a_repository_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // tempdirs may sit inside a checkout on some machines; only assert when they don't
        if Repository::discover(dir.path()).is_err() {
            assert!(History::collect(dir.path(), 10).is_err());
        }
    }
}

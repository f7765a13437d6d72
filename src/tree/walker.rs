//! Filesystem walker producing the files that take part in a fingerprint

use crate::cancel::CancellationToken;
use crate::error::FingerprintError;
use crate::tree::filter::{Candidate, EntryKind, PathFilter};
use crate::tree::path::ancestor_names;
use crate::types::{ExclusionPolicy, FileRecord};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

type EntryIter = Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + Send>;

/// Filesystem walker for one root
pub struct Walker {
    root: PathBuf,
    filter: PathFilter,
}

impl Walker {
    pub fn new(root: impl Into<PathBuf>, policy: ExclusionPolicy) -> Self {
        Self {
            root: root.into(),
            filter: PathFilter::new(policy),
        }
    }

    /// Start a lazy traversal.
    ///
    /// A root that is a regular file yields exactly that file, regardless of
    /// the exclusion policy. A root that cannot be read, or that is neither a
    /// file nor a directory, fails with `NotAccessible`.
    pub fn walk(self) -> Result<Traversal, FingerprintError> {
        let root = self.root;
        let metadata = fs::metadata(&root).map_err(|source| FingerprintError::NotAccessible {
            path: root.clone(),
            source,
        })?;

        if metadata.is_file() {
            let relative_path = root
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| root.clone());
            let record = FileRecord {
                path: root.clone(),
                relative_path,
            };
            return Ok(Traversal {
                root,
                filter: self.filter,
                state: State::Single(Some(record)),
                cancel: None,
            });
        }

        if !metadata.is_dir() {
            return Err(FingerprintError::NotAccessible {
                path: root,
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "not a regular file or directory",
                ),
            });
        }

        // Surface an unreadable root up front instead of as a skipped entry.
        fs::read_dir(&root).map_err(|source| FingerprintError::NotAccessible {
            path: root.clone(),
            source,
        })?;

        let filter = self.filter;
        let follow = filter.policy().follow_symlinks;
        let entry_filter = filter.clone();
        let filter_root = root.clone();
        let entries = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(follow)
            .into_iter()
            .filter_entry(move |entry| accept(&entry_filter, &filter_root, entry));

        Ok(Traversal {
            root,
            filter,
            state: State::Walk(Box::new(entries)),
            cancel: None,
        })
    }
}

/// Walk `root` under `policy`; see [`Walker::walk`]
pub fn enumerate(root: &Path, policy: &ExclusionPolicy) -> Result<Traversal, FingerprintError> {
    Walker::new(root, policy.clone()).walk()
}

enum State {
    Single(Option<FileRecord>),
    Walk(EntryIter),
    Done,
}

/// Lazy sequence of included files.
///
/// Items are `Err` for members that could not be listed or resolved; those
/// errors are always skippable. Sibling order follows the filesystem.
pub struct Traversal {
    root: PathBuf,
    filter: PathFilter,
    state: State,
    cancel: Option<CancellationToken>,
}

impl Traversal {
    /// Stop yielding files once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

impl Iterator for Traversal {
    type Item = Result<FileRecord, FingerprintError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            self.state = State::Done;
            return Some(Err(FingerprintError::Cancelled));
        }

        let entries = match &mut self.state {
            State::Single(record) => return record.take().map(Ok),
            State::Walk(entries) => entries,
            State::Done => return None,
        };

        loop {
            let entry = match entries.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let error = walk_error(&self.root, err);
                    // Links followed by walkdir fail before filtering; apply the file rules here.
                    let excluded = matches!(error, FingerprintError::ReadError { .. })
                        && error
                            .path()
                            .is_some_and(|p| excludes_broken_link(&self.filter, &self.root, p));
                    if excluded {
                        trace!(path = ?error.path(), "Excluded broken link");
                        continue;
                    }
                    return Some(Err(error));
                }
            };

            match resolve_kind(&entry) {
                Ok(EntryKind::File) => {
                    let path = entry.path().to_path_buf();
                    let relative_path = path
                        .strip_prefix(&self.root)
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|_| path.clone());
                    trace!(path = %relative_path.display(), "Discovered file");
                    return Some(Ok(FileRecord {
                        path,
                        relative_path,
                    }));
                }
                Ok(EntryKind::Directory) => continue,
                Ok(EntryKind::Other) => {
                    debug!(path = %entry.path().display(), "Ignoring special file");
                    continue;
                }
                Err(source) => {
                    return Some(Err(FingerprintError::ReadError {
                        path: entry.path().to_path_buf(),
                        source,
                    }))
                }
            }
        }
    }
}

/// Kind of an entry with symlinks resolved. A broken link is an error.
fn resolve_kind(entry: &DirEntry) -> io::Result<EntryKind> {
    let file_type = entry.file_type();
    let file_type = if file_type.is_symlink() {
        fs::metadata(entry.path())?.file_type()
    } else {
        file_type
    };

    Ok(if file_type.is_file() {
        EntryKind::File
    } else if file_type.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::Other
    })
}

/// Whether a link that could not be resolved would be excluded as a file
fn excludes_broken_link(filter: &PathFilter, root: &Path, path: &Path) -> bool {
    let name = match path.file_name() {
        Some(name) => name,
        None => return false,
    };
    let relative = path.strip_prefix(root).unwrap_or(path);
    let candidate = Candidate {
        name,
        kind: EntryKind::File,
        is_symlink: true,
    };
    !filter.include(&candidate, ancestor_names(relative))
}

fn accept(filter: &PathFilter, root: &Path, entry: &DirEntry) -> bool {
    let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
    // A broken link is matched by name as a file; if kept, the iterator records it.
    let kind = match resolve_kind(entry) {
        Ok(kind) => kind,
        Err(_) if entry.path_is_symlink() => EntryKind::File,
        Err(_) => EntryKind::Other,
    };
    let candidate = Candidate {
        name: entry.file_name(),
        kind,
        is_symlink: entry.path_is_symlink(),
    };
    let included = filter.include(&candidate, ancestor_names(relative));
    if !included {
        trace!(path = %relative.display(), "Excluded by policy");
    }
    included
}

fn walk_error(root: &Path, err: walkdir::Error) -> FingerprintError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());

    if err.loop_ancestor().is_some() {
        let message = err.to_string();
        return FingerprintError::NotAccessible {
            path,
            source: io::Error::new(io::ErrorKind::Other, message),
        };
    }

    let is_broken_link = fs::symlink_metadata(&path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
        && fs::metadata(&path).is_err();

    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "walk failed"));

    if is_broken_link {
        FingerprintError::ReadError { path, source }
    } else {
        FingerprintError::NotAccessible { path, source }
    }
}

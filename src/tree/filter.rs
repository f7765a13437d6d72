//! Inclusion predicate for members of a directory scan

use crate::types::ExclusionPolicy;
use std::ffi::OsStr;

/// What a candidate entry resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Sockets, FIFOs, devices, broken links
    Other,
}

/// An entry met during traversal
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub name: &'a OsStr,
    /// Kind of the entry after resolving symlinks
    pub kind: EntryKind,
    /// Whether the entry itself is a symlink
    pub is_symlink: bool,
}

/// Applies an [`ExclusionPolicy`] to traversal candidates.
///
/// Rejected directories are pruned by the walker, so none of their
/// descendants are ever seen.
#[derive(Debug, Clone)]
pub struct PathFilter {
    policy: ExclusionPolicy,
}

impl PathFilter {
    pub fn new(policy: ExclusionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ExclusionPolicy {
        &self.policy
    }

    /// Decide whether `candidate` is included.
    ///
    /// `ancestors` are the names of the directories strictly between the
    /// traversal root and the candidate.
    pub fn include<'a, I>(&self, candidate: &Candidate<'_>, ancestors: I) -> bool
    where
        I: IntoIterator<Item = &'a OsStr>,
    {
        include(candidate, ancestors, &self.policy)
    }
}

/// Free-standing form of [`PathFilter::include`]
pub fn include<'a, I>(candidate: &Candidate<'_>, ancestors: I, policy: &ExclusionPolicy) -> bool
where
    I: IntoIterator<Item = &'a OsStr>,
{
    if policy.ignore_hidden
        && (is_hidden_name(candidate.name) || ancestors.into_iter().any(is_hidden_name))
    {
        return false;
    }

    match candidate.kind {
        EntryKind::File => {
            let name = candidate.name.to_string_lossy();
            if policy.excluded_names.contains(name.as_ref()) {
                return false;
            }
            !policy.excluded_extensions.contains(extension_of(&name))
        }
        EntryKind::Directory => !(candidate.is_symlink && !policy.follow_symlinks),
        EntryKind::Other => true,
    }
}

/// Text after the last `.` of a file name; the whole name when it has no `.`
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

pub fn is_hidden_name(name: &OsStr) -> bool {
    name.as_encoded_bytes().first() == Some(&b'.')
}

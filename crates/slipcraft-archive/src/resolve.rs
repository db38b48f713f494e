//! Where a layout's payload lands under a naive extractor.
//!
//! The model replays the archive the way an extractor that joins entry names
//! onto its root and follows symlinks segment by segment would, without ever
//! canonicalizing or checking containment.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::layout::{ArchiveEntry, ArchiveLayout};

/// A location relative to the extraction root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    ascent: usize,
    names: Vec<String>,
}

impl Location {
    /// Levels above the extraction root before descending into `names`.
    pub fn ascent(&self) -> usize {
        self.ascent
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// True when the location is outside the extraction root.
    pub fn escapes(&self) -> bool {
        self.ascent > 0
    }

    fn join(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.names.push(name.to_string());
        next
    }

    fn parent(&self) -> Self {
        let mut next = self.clone();
        if next.names.pop().is_none() {
            next.ascent += 1;
        }
        next
    }

    /// Apply a relative link target to this directory, lexically.
    fn follow(&self, target: &str) -> Self {
        target.split('/').fold(self.clone(), |loc, part| match part {
            "" | "." => loc,
            ".." => loc.parent(),
            name => loc.join(name),
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = std::iter::repeat_n("..", self.ascent)
            .chain(self.names.iter().map(String::as_str))
            .collect();
        if parts.is_empty() {
            f.write_str(".")
        } else {
            f.write_str(&parts.join("/"))
        }
    }
}

/// Replay `layout` and return where its payload file ends up.
pub fn landing(layout: &ArchiveLayout) -> Result<Location> {
    let mut resolved: HashMap<&str, Location> = HashMap::new();
    let mut payload = None;

    for entry in layout.entries() {
        let path = entry.path().trim_end_matches('/');
        let (parent, name) = match path.rsplit_once('/') {
            Some((parent, name)) => (walk(&resolved, parent)?, name),
            None => (Location::default(), path),
        };

        let location = match entry {
            ArchiveEntry::Symlink { target, .. } => {
                if target.starts_with('/') {
                    return Err(Error::invalid_path(target, "absolute symlink target"));
                }
                parent.follow(target)
            }
            ArchiveEntry::Directory { .. } => parent.join(name),
            ArchiveEntry::File { .. } => {
                payload = Some(parent.join(name));
                continue;
            }
        };
        resolved.insert(path, location);
    }

    payload.ok_or_else(|| Error::invalid_path("", "layout has no payload entry"))
}

/// Resolve a directory path, substituting every prefix already declared.
fn walk(resolved: &HashMap<&str, Location>, path: &str) -> Result<Location> {
    let mut location = Location::default();
    let mut end = 0;
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(Error::invalid_path(path, "empty path component"));
        }
        end += segment.len();
        location = match resolved.get(&path[..end]) {
            Some(declared) => declared.clone(),
            None => location.join(segment),
        };
        end += 1;
    }
    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::plan;

    fn land(path: &str) -> Location {
        landing(&ArchiveLayout::build(&plan(path).unwrap(), "payload")).unwrap()
    }

    #[test]
    fn zero_depth_lands_one_above_root() {
        let location = land("name.txt");
        assert_eq!(location.ascent(), 1);
        assert_eq!(location.names(), ["name.txt"]);
        assert_eq!(location.to_string(), "../name.txt");
    }

    #[test]
    fn each_chained_link_adds_one_level() {
        for depth in 0..8 {
            let path = format!("{}tmp/pwn.sh", "../".repeat(depth));
            let location = land(&path);
            assert_eq!(location.ascent(), depth + 1, "depth {depth}");
            assert_eq!(location.names(), ["tmp", "pwn.sh"]);
            assert!(location.escapes());
        }
    }

    #[test]
    fn display_of_two_level_escape() {
        assert_eq!(land("../../etc/passwd").to_string(), "../../../etc/passwd");
    }

    #[test]
    fn follow_is_lexical() {
        let root = Location::default();
        assert_eq!(root.follow("../"), root.parent());
        assert_eq!(root.follow("a/./b/.."), root.join("a"));
        assert_eq!(root.to_string(), ".");
    }

    #[test]
    fn undeclared_prefix_is_a_plain_directory() {
        let resolved = HashMap::new();
        let location = walk(&resolved, "a/b").unwrap();
        assert_eq!(location.ascent(), 0);
        assert_eq!(location.names(), ["a", "b"]);
    }
}

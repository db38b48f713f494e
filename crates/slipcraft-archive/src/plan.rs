use crate::error::{Error, Result};

/// Marker stripped from the front of a relative path, once per ascent.
pub const ASCENT_PREFIX: &str = "../";

/// Parsed form of a relative escape path such as `../../tmp/pwn.sh`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraversalPlan {
    depth: usize,
    components: Vec<String>,
}

impl TraversalPlan {
    /// Number of leading `../` markers.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Everything after the ascent prefix, split on `/`. Never empty.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Directories to recreate beneath the ascended location.
    pub fn directories(&self) -> &[String] {
        &self.components[..self.components.len() - 1]
    }

    /// Base name of the payload.
    pub fn file_name(&self) -> &str {
        &self.components[self.components.len() - 1]
    }
}

/// Split `path` into its ascent depth and the components that follow it.
///
/// Only a leading run of `../` counts towards the depth; a `..` further in
/// the path is rejected rather than counted.
pub fn plan(path: &str) -> Result<TraversalPlan> {
    if path.is_empty() {
        return Err(Error::invalid_path(path, "path is empty"));
    }

    let mut depth = 0;
    let mut rest = path;
    while let Some(stripped) = rest.strip_prefix(ASCENT_PREFIX) {
        depth += 1;
        rest = stripped;
    }

    if rest.is_empty() {
        return Err(Error::invalid_path(path, "no file name after the ascent prefix"));
    }

    let mut components = Vec::new();
    for component in rest.split('/') {
        match component {
            "" => return Err(Error::invalid_path(path, "empty path component")),
            "." | ".." => {
                return Err(Error::invalid_path(
                    path,
                    "'.' or '..' after the ascent prefix",
                ));
            }
            name => components.push(name.to_string()),
        }
    }

    Ok(TraversalPlan { depth, components })
}

//! Locating the target of an operation
//!
//! [`locate`] walks a [`Path`] from the document element downwards and
//! reports where an element for the path's terminal segment would go, and
//! whether one is already there.
//!
//! A segment matches a child element when:
//!
//! - the element's local name equals the segment's element type,
//! - the segment's identity attribute (if any) has exactly the given value
//!   (case-sensitive, no normalization),
//! - the element's namespace URI starts with the segment's namespace filter
//!   (if any).
//!
//! Two or more matching siblings break the one-element-per-identity rule of
//! the configuration schema and are reported as [`Error::AmbiguousMatch`]
//! rather than resolved by picking one.

use log::debug;
use xot::Node;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::path::{Path, PathSegment};

/// Outcome of [`locate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateResult {
    /// All ancestors exist and so does a sibling matching the terminal segment.
    Found { parent: Node, existing: Node },
    /// All ancestors exist; nothing matches the terminal segment yet.
    ParentFound { parent: Node },
    /// The non-terminal segment at `depth` (0-based) has no matching element.
    AncestorMissing { depth: usize },
}

/// Find the parent of `path`'s terminal segment and any existing match for it.
pub fn locate(document: &Document, path: &Path) -> Result<LocateResult> {
    let mut parent = document.document_element()?;

    for (depth, segment) in path.parent().iter().enumerate() {
        match find_child(document, parent, segment, path)? {
            Some(child) => parent = child,
            None => {
                debug!("{}: no element matches '{}'", path, segment);
                return Ok(LocateResult::AncestorMissing { depth });
            }
        }
    }

    let result = match find_child(document, parent, path.last(), path)? {
        Some(existing) => LocateResult::Found { parent, existing },
        None => LocateResult::ParentFound { parent },
    };
    debug!("{}: {:?}", path, result);
    Ok(result)
}

/// The single child of `parent` matching `segment`, if any.
pub fn find_child(
    document: &Document,
    parent: Node,
    segment: &PathSegment,
    path: &Path,
) -> Result<Option<Node>> {
    let mut matches = document
        .child_elements(parent)
        .filter(|&child| matches_segment(document, child, segment));

    let first = matches.next();
    let extra = matches.count();
    if extra > 0 {
        return Err(Error::AmbiguousMatch {
            path: path.to_string(),
            segment: segment.to_string(),
            count: extra + 1,
        });
    }
    Ok(first)
}

/// Whether `element` is addressed by `segment`.
pub fn matches_segment(document: &Document, element: Node, segment: &PathSegment) -> bool {
    if document.local_name(element) != Some(segment.element_type()) {
        return false;
    }
    if let Some(prefix) = segment.namespace() {
        let uri = document.namespace_uri(element).unwrap_or_default();
        if !uri.starts_with(prefix) {
            return false;
        }
    }
    match segment.identity() {
        Some(identity) => document.attribute(element, identity.attribute()) == Some(identity.value()),
        None => true,
    }
}

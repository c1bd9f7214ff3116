//! # Applying operations
//!
//! The [`Mutator`] turns an [`OperationDescriptor`] into a change of a
//! [`Document`]:
//!
//! 1. [`locate`] the target.
//! 2. A missing ancestor fails with [`Error::StructureMissing`]; missing
//!    structure is never created.
//! 3. An existing element under [`ConflictPolicy::Fail`] fails with
//!    [`Error::CommandFailed`].
//! 4. An existing element under [`ConflictPolicy::Replace`] is replaced by
//!    the new element at the same position among its siblings.
//! 5. Otherwise the new element is appended as the parent's last child.
//!
//! Every check happens before the tree is touched, so a failed `apply`
//! leaves the document as it was.

use log::{info, warn};
use xot::Node;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::layout::LayoutRegistry;
use crate::locate::{locate, LocateResult};
use crate::operation::{ConflictPolicy, OperationDescriptor};
use crate::subtree;

/// Applies operations to documents using a set of canonical layouts
#[derive(Debug, Clone)]
pub struct Mutator {
    layouts: LayoutRegistry,
}

impl Default for Mutator {
    fn default() -> Self {
        Self::new(LayoutRegistry::builtin())
    }
}

impl Mutator {
    pub fn new(layouts: LayoutRegistry) -> Self {
        Self { layouts }
    }

    pub fn layouts(&self) -> &LayoutRegistry {
        &self.layouts
    }

    /// Apply one operation. All-or-nothing: on error the document is unchanged.
    pub fn apply(&self, document: &mut Document, operation: &OperationDescriptor) -> Result<()> {
        check_identity(operation)?;
        let path = operation.path();

        match (locate(document, path)?, operation.on_conflict()) {
            (LocateResult::AncestorMissing { depth }, _) => Err(Error::StructureMissing {
                path: path.to_string(),
                segment: path.segments()[depth].to_string(),
            }),
            (LocateResult::Found { .. }, ConflictPolicy::Fail) => Err(Error::CommandFailed {
                path: path.to_string(),
                message: "already exists".to_string(),
            }),
            (LocateResult::Found { parent, existing }, ConflictPolicy::Replace) => {
                warn!("{}: replacing existing element", path);
                self.replace(document, parent, existing, operation)?;
                info!("{}: replaced", path);
                Ok(())
            }
            (LocateResult::ParentFound { parent }, _) => {
                self.append(document, parent, operation)?;
                info!("{}: added", path);
                Ok(())
            }
        }
    }

    /// Apply operations in order, each seeing the effects of the previous
    /// ones. Stops at the first failure; earlier operations stay applied.
    pub fn apply_all<'a, I>(&self, document: &mut Document, operations: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a OperationDescriptor>,
    {
        for operation in operations {
            self.apply(document, operation)?;
        }
        Ok(())
    }

    fn replace(
        &self,
        document: &mut Document,
        parent: Node,
        existing: Node,
        operation: &OperationDescriptor,
    ) -> Result<()> {
        let step = document.indent_step(parent);
        let indent = document.effective_indentation(existing, &step);
        let node = subtree::build(document, &self.layouts, parent, operation, &indent, &step)?;
        document.insert_before(existing, node)?;
        document.remove(existing)
    }

    fn append(
        &self,
        document: &mut Document,
        parent: Node,
        operation: &OperationDescriptor,
    ) -> Result<()> {
        let step = document.indent_step(parent);
        let parent_indent = document.effective_indentation(parent, &step);
        let indent = format!("{}{}", parent_indent, step);
        let node = subtree::build(document, &self.layouts, parent, operation, &indent, &step)?;

        let closing_whitespace = document
            .last_child(parent)
            .filter(|&last| document.text(last).is_some_and(is_blank));

        match closing_whitespace {
            Some(closing) => {
                if document.child_elements(parent).next().is_none() {
                    document.set_text(closing, &format!("\n{}", parent_indent));
                }
                document.insert_before(closing, node)?;
                document.insert_text_before(node, &format!("\n{}", indent))
            }
            None => {
                document.append_text(parent, &format!("\n{}", indent))?;
                document.append(parent, node)?;
                document.append_text(parent, &format!("\n{}", parent_indent))
            }
        }
    }
}

/// Apply one operation with the built-in layouts.
pub fn apply(document: &mut Document, operation: &OperationDescriptor) -> Result<()> {
    Mutator::default().apply(document, operation)
}

fn check_identity(operation: &OperationDescriptor) -> Result<()> {
    let Some(identity) = operation.path().last().identity() else {
        return Ok(());
    };
    match operation.attributes().get(identity.attribute()) {
        Some(value) if value != identity.value() => Err(Error::InvalidCommand {
            message: format!(
                "attribute {}=\"{}\" contradicts the target {}",
                identity.attribute(),
                value,
                operation.path()
            ),
        }),
        _ => Ok(()),
    }
}

fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

//! Building the element tree for an operation
//!
//! The new element takes its tag from the terminal path segment and its
//! namespace from the element it is inserted under. Attributes and children
//! are written in the canonical order of the element type's
//! [`ElementLayout`](crate::layout::ElementLayout); element types without a
//! layout keep the order they were given in. The identity attribute from the
//! path is always written, first when the caller did not set it explicitly.
//!
//! Nested elements are indented one `step` deeper than their parent, and an
//! element without children is written in its empty form (`<level/>`).

use xot::Node;

use crate::document::Document;
use crate::error::Result;
use crate::layout::LayoutRegistry;
use crate::operation::{ChildSpec, OperationDescriptor};

/// Build the detached element for `operation`.
///
/// `context` is the element the result will be inserted under; `indent` is
/// the indentation of the new element's own start tag.
pub fn build(
    document: &mut Document,
    layouts: &LayoutRegistry,
    context: Node,
    operation: &OperationDescriptor,
    indent: &str,
    step: &str,
) -> Result<Node> {
    let segment = operation.path().last();
    let mut attributes: Vec<(String, String)> = Vec::new();
    if let Some(identity) = segment.identity() {
        if !operation.attributes().contains(identity.attribute()) {
            attributes.push((identity.attribute().to_string(), identity.value().to_string()));
        }
    }
    attributes.extend(
        operation
            .attributes()
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string())),
    );

    build_element(
        document,
        layouts,
        context,
        segment.element_type(),
        attributes,
        operation.children(),
        indent,
        step,
    )
}

#[allow(clippy::too_many_arguments)]
fn build_element(
    document: &mut Document,
    layouts: &LayoutRegistry,
    context: Node,
    element_type: &str,
    mut attributes: Vec<(String, String)>,
    children: &[ChildSpec],
    indent: &str,
    step: &str,
) -> Result<Node> {
    let node = document.new_element_like(context, element_type);

    layouts.order_attributes(element_type, &mut attributes, |(name, _)| name.as_str());
    for (name, value) in &attributes {
        document.set_attribute(node, name, value);
    }

    let mut ordered: Vec<&ChildSpec> = children.iter().collect();
    layouts.order_children(element_type, &mut ordered, |child| child.element_type());

    if !ordered.is_empty() {
        let child_indent = format!("{}{}", indent, step);
        for child in ordered {
            document.append_text(node, &format!("\n{}", child_indent))?;
            let child_attributes = child
                .attributes()
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
            let child_node = build_element(
                document,
                layouts,
                context,
                child.element_type(),
                child_attributes,
                child.children(),
                &child_indent,
                step,
            )?;
            document.append(node, child_node)?;
        }
        document.append_text(node, &format!("\n{}", indent))?;
    }

    Ok(node)
}

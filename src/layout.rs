//! Canonical attribute and child order per element type
//!
//! Configuration schemas are order-sensitive: a `console-handler` must list
//! `level` before `encoding` before `formatter`, whatever order the caller
//! supplied them in. A [`LayoutRegistry`] maps element types to an
//! [`ElementLayout`] describing that order. Element types without a layout
//! keep the order in which their attributes and children were given.

use std::collections::HashMap;

/// Canonical ordering for one element type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementLayout {
    attributes: Vec<String>,
    children: Vec<String>,
}

impl ElementLayout {
    pub fn new<A, C>(attributes: A, children: C) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
            children: children.into_iter().map(Into::into).collect(),
        }
    }

    /// Sort key for an attribute name; unknown names sort after known ones.
    pub fn attribute_rank(&self, name: &str) -> usize {
        rank(&self.attributes, name)
    }

    /// Sort key for a child element type; unknown types sort after known ones.
    pub fn child_rank(&self, element_type: &str) -> usize {
        rank(&self.children, element_type)
    }
}

fn rank(order: &[String], name: &str) -> usize {
    order
        .iter()
        .position(|known| known == name)
        .unwrap_or(order.len())
}

/// Element type to layout lookup
#[derive(Debug, Clone, Default)]
pub struct LayoutRegistry {
    layouts: HashMap<String, ElementLayout>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layouts for every element type the crate's own commands produce.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        crate::logging::register_layouts(&mut registry);
        registry
    }

    /// Register (or replace) the layout for `element_type`.
    pub fn register(&mut self, element_type: impl Into<String>, layout: ElementLayout) {
        self.layouts.insert(element_type.into(), layout);
    }

    pub fn with(mut self, element_type: impl Into<String>, layout: ElementLayout) -> Self {
        self.register(element_type, layout);
        self
    }

    pub fn get(&self, element_type: &str) -> Option<&ElementLayout> {
        self.layouts.get(element_type)
    }

    /// Sort `items` into canonical attribute order for `element_type`.
    ///
    /// The sort is stable, so unknown names keep their relative order.
    pub fn order_attributes<T>(
        &self,
        element_type: &str,
        items: &mut [T],
        name_of: impl Fn(&T) -> &str,
    ) {
        if let Some(layout) = self.get(element_type) {
            items.sort_by_key(|item| layout.attribute_rank(name_of(item)));
        }
    }

    /// Sort `items` into canonical child order for `element_type`.
    pub fn order_children<T>(
        &self,
        element_type: &str,
        items: &mut [T],
        type_of: impl Fn(&T) -> &str,
    ) {
        if let Some(layout) = self.get(element_type) {
            items.sort_by_key(|item| layout.child_rank(type_of(item)));
        }
    }
}

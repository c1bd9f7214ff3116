//! # Document Model
//!
//! [`Document`] is the in-memory form of one configuration file. The tree
//! itself lives in an [`xot::Xot`] arena: every element, text run and comment
//! is a [`Node`] handle (a plain `Copy` index), the document owns the arena,
//! and parent/child links are index relations inside it. Removing and
//! reinserting a subtree is therefore a splice of handles, not pointer
//! surgery.
//!
//! Parsing records where every node sits in the source text. Serializing
//! copies the source bytes of every node the edits never reached, so quoting,
//! attribute spacing, empty-element spelling, entity references, comments and
//! line endings come out exactly as they were read. Only inserted elements,
//! and the start or end tags whose form had to change, are rendered fresh.
//! Fresh text uses the line ending of the source file.
//!
//! Indentation helpers ([`Document::indentation_of`],
//! [`Document::indent_step`]) read the whitespace that precedes an element so
//! newly inserted nodes line up with their siblings.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use xot::{NameId, Node, SpanInfo, SpanInfoKey, Value, Xot};

use crate::error::{Error, Result};

/// Indentation used when the document gives no hint.
pub const DEFAULT_INDENT: &str = "    ";

/// A parsed configuration document
pub struct Document {
    xot: Xot,
    root: Node,
    source: String,
    line_ending: &'static str,
    source_map: SourceMap,
    /// Nodes whose subtree no longer matches the source.
    touched: HashSet<Node>,
    /// Source elements whose start tag must be rendered from the tree.
    retagged: HashSet<Node>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root)
            .field("line_ending", &self.line_ending)
            .field("touched", &self.touched.len())
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Parse configuration text into a document.
    pub fn parse(text: &str) -> Result<Self> {
        let mut xot = Xot::new();
        let (root, spans) = xot
            .parse_with_span_info(text)
            .map_err(|err| Error::XmlParse {
                message: err.to_string(),
            })?;

        let mut source_map = SourceMap::default();
        source_map.index_children(&xot, &spans, text, root, 0..text.len());

        let document = Self {
            xot,
            root,
            source: text.to_string(),
            line_ending: if text.contains("\r\n") { "\r\n" } else { "\n" },
            source_map,
            touched: HashSet::new(),
            retagged: HashSet::new(),
        };
        // a document without an element is rejected up front
        document.document_element()?;
        Ok(document)
    }

    /// Render the document back to text.
    ///
    /// Every node that no edit reached is copied byte for byte from the
    /// parsed text, including everything before and after the document
    /// element.
    pub fn serialize(&self) -> Result<String> {
        let element = self.document_element()?;
        let mut out = String::with_capacity(self.source.len());
        match self.source_map.ranges.get(&element) {
            Some(range) => {
                out.push_str(&self.source[..range.start]);
                self.write_node(element, &mut out)?;
                out.push_str(&self.source[range.end..]);
            }
            None => self.write_node(element, &mut out)?,
        }
        Ok(out)
    }

    fn write_node(&self, node: Node, out: &mut String) -> Result<()> {
        if !self.touched.contains(&node) {
            if let Some(range) = self.source_map.ranges.get(&node) {
                out.push_str(&self.source[range.clone()]);
                return Ok(());
            }
        }
        match self.xot.value(node) {
            Value::Element(element) => self.write_element(node, element.name(), out),
            Value::Text(text) => {
                push_escaped(out, text.get(), false, self.line_ending);
                Ok(())
            }
            _ => {
                let text = self.xot.to_string(node).map_err(serialization_error)?;
                out.push_str(&text);
                Ok(())
            }
        }
    }

    fn write_element(&self, node: Node, name: NameId, out: &mut String) -> Result<()> {
        let qualified = self.qualified_name(node, name)?;
        let source = self.source_map.elements.get(&node);
        let empty = self.xot.first_child(node).is_none()
            && source.is_none_or(ElementSource::is_empty_tag);

        match source.filter(|_| !self.retagged.contains(&node)) {
            Some(element) => {
                let tag = &self.source[element.start..element.open_end];
                match tag.strip_suffix("/>") {
                    Some(open) if !empty => {
                        out.push_str(open.trim_end());
                        out.push('>');
                    }
                    _ => out.push_str(tag),
                }
            }
            None => self.write_start_tag(node, &qualified, empty, out)?,
        }
        if empty {
            return Ok(());
        }

        for child in self.xot.children(node) {
            self.write_node(child, out)?;
        }

        match source.filter(|element| !element.is_empty_tag()) {
            Some(element) => out.push_str(&self.source[element.close_start..element.end]),
            None => {
                out.push_str("</");
                out.push_str(&qualified);
                out.push('>');
            }
        }
        Ok(())
    }

    fn write_start_tag(
        &self,
        node: Node,
        qualified: &str,
        empty: bool,
        out: &mut String,
    ) -> Result<()> {
        out.push('<');
        out.push_str(qualified);
        let namespaces = self.xot.namespaces(node);
        for (prefix, namespace) in namespaces.iter() {
            let prefix = self.xot.prefix_str(prefix);
            out.push_str(" xmlns");
            if !prefix.is_empty() {
                out.push(':');
                out.push_str(prefix);
            }
            out.push_str("=\"");
            push_escaped(out, self.xot.namespace_str(*namespace), true, self.line_ending);
            out.push('"');
        }
        let attributes = self.xot.attributes(node);
        for (name, value) in attributes.iter() {
            out.push(' ');
            out.push_str(&self.qualified_name(node, name)?);
            out.push_str("=\"");
            push_escaped(out, value, true, self.line_ending);
            out.push('"');
        }
        out.push_str(if empty { "/>" } else { ">" });
        Ok(())
    }

    fn qualified_name(&self, node: Node, name: NameId) -> Result<String> {
        self.xot.full_name(node, name).map_err(serialization_error)
    }

    /// The outermost element (`server` or `domain` for application-server configs).
    pub fn document_element(&self) -> Result<Node> {
        self.xot
            .document_element(self.root)
            .map_err(|err| Error::XmlParse {
                message: err.to_string(),
            })
    }

    /// Element children of `node`, in document order.
    pub fn child_elements(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        self.xot
            .children(node)
            .filter(move |&child| self.xot.is_element(child))
    }

    /// Local name of an element node.
    pub fn local_name(&self, node: Node) -> Option<&str> {
        let element = self.xot.element(node)?;
        Some(self.xot.name_ns_str(element.name()).0)
    }

    /// Namespace URI of an element node; empty when it has none.
    pub fn namespace_uri(&self, node: Node) -> Option<&str> {
        let element = self.xot.element(node)?;
        Some(self.xot.name_ns_str(element.name()).1)
    }

    /// Value of an attribute without namespace.
    pub fn attribute(&self, node: Node, name: &str) -> Option<&str> {
        let name = self.xot.name(name)?;
        self.xot.get_attribute(node, name)
    }

    pub fn parent_element(&self, node: Node) -> Option<Node> {
        self.xot
            .parent(node)
            .filter(|&parent| self.xot.is_element(parent))
    }

    /// The whitespace at the start of the line `node` starts on, when `node`
    /// is preceded by a line break and nothing but blanks.
    pub fn indentation_of(&self, node: Node) -> Option<String> {
        if self.parent_element(node).is_none() {
            return Some(String::new());
        }
        let previous = self.xot.previous_sibling(node)?;
        let text = self.xot.text(previous)?.get();
        let line_start = text.rfind('\n')? + 1;
        let line = &text[line_start..];
        if line.chars().all(|c| c == ' ' || c == '\t') {
            Some(line.to_string())
        } else {
            None
        }
    }

    /// The indentation increment used around `node`, detected by comparing
    /// the indentation of an element with that of its parent. Falls back to
    /// [`DEFAULT_INDENT`].
    pub fn indent_step(&self, node: Node) -> String {
        let mut current = Some(node);
        while let Some(element) = current {
            let parent = self.parent_element(element);
            if let (Some(inner), Some(outer)) = (
                self.indentation_of(element),
                parent.and_then(|p| self.indentation_of(p)),
            ) {
                if inner.len() > outer.len() && inner.starts_with(&outer) {
                    return inner[outer.len()..].to_string();
                }
            }
            current = parent;
        }
        DEFAULT_INDENT.to_string()
    }

    /// Indentation for `node`, derived from its depth when the document
    /// does not show one.
    pub fn effective_indentation(&self, node: Node, step: &str) -> String {
        self.indentation_of(node)
            .unwrap_or_else(|| step.repeat(self.depth(node)))
    }

    fn depth(&self, node: Node) -> usize {
        let mut depth = 0;
        let mut current = self.parent_element(node);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent_element(parent);
        }
        depth
    }

    // Structural edits. Each one marks the nodes whose source bytes no longer
    // describe them. xot merges text nodes that become adjacent, so text
    // next to an edit point is marked as well. Failures here mean the tree
    // invariants were broken, so they surface as serialization errors.

    /// A detached element named `local_name`, in the same namespace as `like`.
    pub(crate) fn new_element_like(&mut self, like: Node, local_name: &str) -> Node {
        let uri = self.namespace_uri(like).unwrap_or_default().to_string();
        let name = if uri.is_empty() {
            self.xot.add_name(local_name)
        } else {
            let namespace = self.xot.add_namespace(&uri);
            self.xot.add_name_ns(local_name, namespace)
        };
        self.xot.new_element(name)
    }

    pub(crate) fn set_attribute(&mut self, node: Node, name: &str, value: &str) {
        let name = self.xot.add_name(name);
        self.xot.attributes_mut(node).insert(name, value.to_string());
        self.retagged.insert(node);
        self.touch(node);
    }

    pub(crate) fn append(&mut self, parent: Node, child: Node) -> Result<()> {
        self.touch_text(self.xot.last_child(parent));
        self.xot.append(parent, child).map_err(edit_error)?;
        self.touch(parent);
        Ok(())
    }

    pub(crate) fn append_text(&mut self, parent: Node, text: &str) -> Result<()> {
        let text = self.xot.new_text(text);
        self.append(parent, text)
    }

    pub(crate) fn insert_before(&mut self, reference: Node, node: Node) -> Result<()> {
        self.touch_text(self.xot.previous_sibling(reference));
        self.touch_text(Some(reference));
        self.xot.insert_before(reference, node).map_err(edit_error)?;
        if let Some(parent) = self.xot.parent(reference) {
            self.touch(parent);
        }
        Ok(())
    }

    pub(crate) fn insert_text_before(&mut self, reference: Node, text: &str) -> Result<()> {
        let text = self.xot.new_text(text);
        self.insert_before(reference, text)
    }

    pub(crate) fn remove(&mut self, node: Node) -> Result<()> {
        self.touch_text(self.xot.previous_sibling(node));
        self.touch_text(self.xot.next_sibling(node));
        let parent = self.xot.parent(node);
        // removed slots are reused by the arena
        let removed: Vec<Node> = self.xot.descendants(node).collect();
        for removed in removed {
            self.source_map.forget(removed);
            self.touched.remove(&removed);
            self.retagged.remove(&removed);
        }
        self.xot.remove(node).map_err(edit_error)?;
        if let Some(parent) = parent {
            self.touch(parent);
        }
        Ok(())
    }

    pub(crate) fn last_child(&self, node: Node) -> Option<Node> {
        self.xot.last_child(node)
    }

    /// Text content of a text node.
    pub(crate) fn text(&self, node: Node) -> Option<&str> {
        self.xot.text(node).map(|text| text.get())
    }

    pub(crate) fn set_text(&mut self, node: Node, value: &str) {
        if let Some(text) = self.xot.text_mut(node) {
            text.set(value);
            self.touch(node);
        }
    }

    /// Mark `node` and its ancestors as changed.
    fn touch(&mut self, node: Node) {
        let mut current = Some(node);
        while let Some(node) = current {
            self.touched.insert(node);
            current = self.xot.parent(node);
        }
    }

    fn touch_text(&mut self, node: Option<Node>) {
        if let Some(node) = node.filter(|&node| self.xot.text(node).is_some()) {
            self.touch(node);
        }
    }
}

/// Where a source element and its tags sit in the parsed text.
#[derive(Debug, Clone)]
struct ElementSource {
    start: usize,
    open_end: usize,
    close_start: usize,
    end: usize,
}

impl ElementSource {
    /// `<a/>` rather than `<a></a>`.
    fn is_empty_tag(&self) -> bool {
        self.open_end == self.end
    }
}

/// Source ranges of the nodes read by the parser.
#[derive(Debug, Default)]
struct SourceMap {
    ranges: HashMap<Node, Range<usize>>,
    elements: HashMap<Node, ElementSource>,
}

impl SourceMap {
    /// Record the children of `parent`, whose content occupies `inner`.
    ///
    /// Text runs are taken as the gap between their neighbours, which keeps
    /// CDATA sections and entity references inside them.
    fn index_children(
        &mut self,
        xot: &Xot,
        spans: &SpanInfo,
        source: &str,
        parent: Node,
        inner: Range<usize>,
    ) {
        let children: Vec<Node> = xot.children(parent).collect();
        for &child in &children {
            match xot.value(child) {
                Value::Element(_) => {
                    if let Some(element) = element_source(spans, source, child) {
                        self.ranges.insert(child, element.start..element.end);
                        self.index_children(
                            xot,
                            spans,
                            source,
                            child,
                            element.open_end..element.close_start,
                        );
                        self.elements.insert(child, element);
                    }
                }
                Value::Comment(_) => {
                    if let Some(span) = spans.get(SpanInfoKey::Comment(child)) {
                        if let Some(start) = span.start.checked_sub(4) {
                            self.ranges.insert(child, start..span.end + 3);
                        }
                    }
                }
                Value::ProcessingInstruction(_) => {
                    if let Some(span) = spans.get(SpanInfoKey::PiTarget(child)) {
                        let end = source
                            .get(span.end..)
                            .and_then(|rest| rest.find("?>"))
                            .map(|offset| span.end + offset + 2);
                        if let (Some(start), Some(end)) = (span.start.checked_sub(2), end) {
                            self.ranges.insert(child, start..end);
                        }
                    }
                }
                _ => {}
            }
        }

        for (index, &child) in children.iter().enumerate() {
            if xot.text(child).is_none() {
                continue;
            }
            let start = match index.checked_sub(1) {
                Some(previous) => self.ranges.get(&children[previous]).map(|r| r.end),
                None => Some(inner.start),
            };
            let end = match children.get(index + 1) {
                Some(next) => self.ranges.get(next).map(|r| r.start),
                None => Some(inner.end),
            };
            if let (Some(start), Some(end)) = (start, end) {
                self.ranges.insert(child, start..end);
            }
        }
    }

    fn forget(&mut self, node: Node) {
        self.ranges.remove(&node);
        self.elements.remove(&node);
    }
}

fn element_source(spans: &SpanInfo, source: &str, node: Node) -> Option<ElementSource> {
    let name = spans.get(SpanInfoKey::ElementStart(node))?;
    let end_tag = spans.get(SpanInfoKey::ElementEnd(node))?;
    let start = name.start.checked_sub(1)?;
    if source.get(end_tag.start..end_tag.end)? == "/>" {
        return Some(ElementSource {
            start,
            open_end: end_tag.end,
            close_start: end_tag.end,
            end: end_tag.end,
        });
    }
    Some(ElementSource {
        start,
        open_end: start_tag_end(source, name.end)?,
        close_start: end_tag.start,
        end: end_tag.end,
    })
}

/// Offset just past the `>` closing a start tag, skipping quoted values.
fn start_tag_end(source: &str, from: usize) -> Option<usize> {
    let mut quote = None;
    for (offset, c) in source.get(from..)?.char_indices() {
        match quote {
            Some(open) if c == open => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(from + offset + 1),
            None => {}
        }
    }
    None
}

fn push_escaped(out: &mut String, text: &str, attribute: bool, line_ending: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\n' if !attribute => out.push_str(line_ending),
            _ => out.push(c),
        }
    }
}

fn serialization_error(err: xot::Error) -> Error {
    Error::Serialization {
        message: err.to_string(),
    }
}

fn edit_error(err: xot::Error) -> Error {
    Error::Serialization {
        message: format!("tree edit failed: {}", err),
    }
}

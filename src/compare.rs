//! Structural XML comparison
//!
//! Two documents are structurally identical when their element trees match:
//! same element names (local name and namespace URI), same attribute sets,
//! same text content, and the same child elements **in the same order**.
//! Whitespace is insignificant: whitespace-only text between elements is
//! ignored and runs of whitespace inside text collapse to a single space.
//! Comments and processing instructions are ignored. Entity spelling does not
//! matter either, since both sides are compared after parsing.
//!
//! This is the comparison used to check a rewritten configuration file
//! against a hand-written expectation.

use std::fmt;

use xot::{Node, Value, Xot};

use crate::error::{Error, Result};

/// The first place where two documents diverge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    /// Slash-separated element location in `{namespace}local` form, e.g.
    /// `/{urn:jboss:domain:4.0}server/{urn:jboss:domain:4.0}profile`
    pub location: String,
    pub message: String,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Element(Node),
    Text(String),
}

/// Compare two XML texts, returning the first difference found.
pub fn first_difference(expected: &str, actual: &str) -> Result<Option<Difference>> {
    let mut xot = Xot::new();
    let expected = parse_element(&mut xot, expected, "expected")?;
    let actual = parse_element(&mut xot, actual, "actual")?;
    Ok(compare_elements(&xot, expected, actual, ""))
}

/// Whether two XML texts are structurally identical.
pub fn structurally_equal(expected: &str, actual: &str) -> Result<bool> {
    Ok(first_difference(expected, actual)?.is_none())
}

/// Panic with the first difference unless both documents are structurally identical.
#[track_caller]
pub fn assert_xml_identical(expected: &str, actual: &str) {
    match first_difference(expected, actual) {
        Ok(None) => {}
        Ok(Some(difference)) => panic!(
            "XML documents differ at {}\n--- expected ---\n{}\n--- actual ---\n{}",
            difference, expected, actual
        ),
        Err(err) => panic!("XML comparison failed: {}", err),
    }
}

fn parse_element(xot: &mut Xot, text: &str, which: &str) -> Result<Node> {
    let root = xot.parse(text).map_err(|err| Error::XmlParse {
        message: format!("{} document: {}", which, err),
    })?;
    xot.document_element(root).map_err(|err| Error::XmlParse {
        message: format!("{} document: {}", which, err),
    })
}

fn compare_elements(xot: &Xot, expected: Node, actual: Node, parent: &str) -> Option<Difference> {
    let expected_name = element_name(xot, expected);
    let actual_name = element_name(xot, actual);
    let location = format!("{}/{}", parent, expected_name);
    if expected_name != actual_name {
        return Some(Difference {
            location,
            message: format!("expected element <{}> but found <{}>", expected_name, actual_name),
        });
    }

    let expected_attributes = attributes(xot, expected);
    let actual_attributes = attributes(xot, actual);
    if expected_attributes != actual_attributes {
        return Some(Difference {
            location,
            message: format!(
                "expected attributes {} but found {}",
                render_attributes(&expected_attributes),
                render_attributes(&actual_attributes)
            ),
        });
    }

    let expected_items = significant_children(xot, expected);
    let actual_items = significant_children(xot, actual);
    for (expected_item, actual_item) in expected_items.iter().zip(actual_items.iter()) {
        let difference = match (expected_item, actual_item) {
            (Item::Element(e), Item::Element(a)) => compare_elements(xot, *e, *a, &location),
            (Item::Text(e), Item::Text(a)) if e == a => None,
            (e, a) => Some(Difference {
                location: location.clone(),
                message: format!(
                    "expected {} but found {}",
                    describe(xot, e),
                    describe(xot, a)
                ),
            }),
        };
        if difference.is_some() {
            return difference;
        }
    }

    if expected_items.len() != actual_items.len() {
        return Some(Difference {
            location,
            message: format!(
                "expected {} child nodes but found {}",
                expected_items.len(),
                actual_items.len()
            ),
        });
    }
    None
}

fn element_name(xot: &Xot, node: Node) -> String {
    match xot.element(node) {
        Some(element) => qualified(xot.name_ns_str(element.name())),
        None => String::new(),
    }
}

fn qualified((local, namespace): (&str, &str)) -> String {
    if namespace.is_empty() {
        local.to_string()
    } else {
        format!("{{{}}}{}", namespace, local)
    }
}

fn attributes(xot: &Xot, node: Node) -> Vec<(String, String)> {
    let mut attributes: Vec<(String, String)> = xot
        .attributes(node)
        .iter()
        .map(|(name, value)| (qualified(xot.name_ns_str(name.clone())), value.to_string()))
        .collect();
    attributes.sort();
    attributes
}

fn render_attributes(attributes: &[(String, String)]) -> String {
    let rendered: Vec<String> = attributes
        .iter()
        .map(|(name, value)| format!("{}=\"{}\"", name, value))
        .collect();
    format!("[{}]", rendered.join(" "))
}

fn significant_children(xot: &Xot, node: Node) -> Vec<Item> {
    xot.children(node)
        .filter_map(|child| match xot.value(child) {
            Value::Element(_) => Some(Item::Element(child)),
            Value::Text(text) => {
                let normalized = text.get().split_whitespace().collect::<Vec<_>>().join(" ");
                (!normalized.is_empty()).then_some(Item::Text(normalized))
            }
            _ => None,
        })
        .collect()
}

fn describe(xot: &Xot, item: &Item) -> String {
    match item {
        Item::Element(node) => format!("element <{}>", element_name(xot, *node)),
        Item::Text(text) => format!("text \"{}\"", text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED: &str = r#"<server xmlns="urn:jboss:domain:4.0">
    <profile>
        <console-handler name="h" autoflush="false">
            <level name="FINEST"/>
            <filter-spec value="match(&quot;filter*&quot;)"/>
            <target name="System.out"/>
        </console-handler>
    </profile>
</server>"#;

    #[test]
    fn test_whitespace_is_insignificant() {
        let compact = r#"<server xmlns="urn:jboss:domain:4.0"><profile><console-handler autoflush="false" name="h"><level name="FINEST"/><filter-spec value='match("filter*")'/><target name="System.out"></target></console-handler></profile></server>"#;
        assert!(structurally_equal(EXPECTED, compact).unwrap());
    }

    #[test]
    fn test_child_order_is_significant() {
        let reordered = EXPECTED.replace(
            "<level name=\"FINEST\"/>\n            <filter-spec value=\"match(&quot;filter*&quot;)\"/>",
            "<filter-spec value=\"match(&quot;filter*&quot;)\"/>\n            <level name=\"FINEST\"/>",
        );
        assert_ne!(reordered, EXPECTED);
        let difference = first_difference(EXPECTED, &reordered).unwrap().unwrap();
        assert!(difference.message.contains("level"));
        assert!(difference.message.contains("filter-spec"));
        assert!(difference.location.contains("console-handler"));
    }

    #[test]
    fn test_attribute_value_difference() {
        let changed = EXPECTED.replace("System.out", "System.err");
        let difference = first_difference(EXPECTED, &changed).unwrap().unwrap();
        assert!(difference.message.contains("System.err"));
    }

    #[test]
    fn test_namespace_difference() {
        let changed = EXPECTED.replace("urn:jboss:domain:4.0", "urn:jboss:domain:5.0");
        assert!(!structurally_equal(EXPECTED, &changed).unwrap());
    }

    #[test]
    fn test_missing_child() {
        let changed = EXPECTED.replace("<target name=\"System.out\"/>", "");
        let difference = first_difference(EXPECTED, &changed).unwrap().unwrap();
        assert!(difference.message.contains("child nodes"));
    }

    #[test]
    fn test_text_content_is_normalized() {
        assert!(structurally_equal("<a>hello   world</a>", "<a>\n  hello world\n</a>").unwrap());
        assert!(!structurally_equal("<a>hello</a>", "<a>goodbye</a>").unwrap());
    }

    #[test]
    fn test_comments_are_ignored() {
        assert!(structurally_equal("<a><!-- note --><b/></a>", "<a><b/></a>").unwrap());
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        let result = first_difference(EXPECTED, "<server>");
        assert!(matches!(result, Err(Error::XmlParse { .. })));
    }

    #[test]
    #[should_panic(expected = "XML documents differ")]
    fn test_assert_panics_on_difference() {
        assert_xml_identical("<a/>", "<b/>");
    }
}

//! Addressing elements in the configuration tree
//!
//! A [`Path`] is an ordered, non-empty list of [`PathSegment`]s, relative to
//! the document element. Each segment names an element type and optionally
//! narrows it down by an identity attribute (usually `name`) and by a
//! namespace-URI prefix.
//!
//! Paths have a compact textual form used in operations files and log output:
//!
//! ```text
//! profile/subsystem{urn:jboss:domain:logging:}/console-handler[name=CONSOLE]
//! ```
//!
//! - `{...}` restricts the segment to elements whose namespace URI starts with
//!   the given prefix, so any schema version matches.
//! - `[attr=value]` matches on an identity attribute; `[value]` is shorthand
//!   for `[name=value]`.
//! - A backslash escapes the next character, for values that contain one of
//!   `/ [ ] { } = \`.
//!
//! ```
//! use creaper_offline::path::Path;
//!
//! let path: Path = "profile/subsystem{urn:jboss:domain:logging:}/console-handler[CONSOLE]"
//!     .parse()
//!     .unwrap();
//! assert_eq!(path.len(), 3);
//! assert_eq!(path.last().element_type(), "console-handler");
//! ```

use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};

use crate::error::{Error, Result};

/// Attribute used for identity when none is given explicitly.
pub const DEFAULT_IDENTITY_ATTRIBUTE: &str = "name";

const SPECIAL_CHARS: [char; 7] = ['/', '[', ']', '{', '}', '=', '\\'];

/// The attribute that disambiguates siblings of the same element type
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identity {
    attribute: String,
    value: String,
}

impl Identity {
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// One step of a [`Path`]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathSegment {
    element_type: String,
    identity: Option<Identity>,
    namespace: Option<String>,
}

impl PathSegment {
    /// A segment for an element that appears at most once under its parent.
    pub fn singleton(element_type: impl Into<String>) -> Self {
        Self {
            element_type: element_type.into(),
            identity: None,
            namespace: None,
        }
    }

    /// A segment identified by its `name` attribute.
    pub fn named(element_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::identified_by(element_type, DEFAULT_IDENTITY_ATTRIBUTE, name)
    }

    /// A segment identified by an arbitrary attribute, e.g. `category` for loggers.
    pub fn identified_by(
        element_type: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            element_type: element_type.into(),
            identity: Some(Identity::new(attribute, value)),
            namespace: None,
        }
    }

    /// Restrict matches to elements whose namespace URI starts with `prefix`.
    pub fn in_namespace(mut self, prefix: impl Into<String>) -> Self {
        self.namespace = Some(prefix.into());
        self
    }

    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn is_singleton(&self) -> bool {
        self.identity.is_none()
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&escape(&self.element_type))?;
        if let Some(namespace) = &self.namespace {
            write!(f, "{{{}}}", escape(namespace))?;
        }
        if let Some(identity) = &self.identity {
            write!(
                f,
                "[{}={}]",
                escape(&identity.attribute),
                escape(&identity.value)
            )?;
        }
        Ok(())
    }
}

/// A location in the configuration tree, relative to the document element
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Path {
    // never empty
    segments: Vec<PathSegment>,
}

impl Path {
    /// Build a path from its segments. An empty list is rejected.
    pub fn new(segments: Vec<PathSegment>) -> Result<Self> {
        if segments.is_empty() {
            return Err(Error::InvalidPath {
                message: "path must have at least one segment".to_string(),
            });
        }
        Ok(Self { segments })
    }

    /// Single-segment path.
    pub fn from_segment(segment: PathSegment) -> Self {
        Self {
            segments: vec![segment],
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// All segments but the last one.
    pub fn parent(&self) -> &[PathSegment] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The terminal segment.
    pub fn last(&self) -> &PathSegment {
        &self.segments[self.segments.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: a path has at least one segment.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// A new path with `segment` appended.
    pub fn join(&self, segment: PathSegment) -> Path {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Path { segments }
    }

    /// A new path with `prefix` put in front of this one.
    pub fn prefixed(&self, prefix: &[PathSegment]) -> Path {
        let mut segments = prefix.to_vec();
        segments.extend(self.segments.iter().cloned());
        Path { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut chars = input.trim().chars().peekable();

        loop {
            while chars.peek() == Some(&'/') {
                chars.next();
            }
            if chars.peek().is_none() {
                break;
            }
            segments.push(parse_segment(&mut chars, input)?);
        }

        Path::new(segments).map_err(|_| invalid(input, "path is empty"))
    }
}

fn parse_segment(chars: &mut Peekable<Chars<'_>>, input: &str) -> Result<PathSegment> {
    let element_type = read_token(chars, &['/', '[', '{'], input)?;
    if element_type.is_empty() {
        return Err(invalid(input, "segment is missing an element name"));
    }
    let mut segment = PathSegment::singleton(element_type);

    loop {
        match chars.peek().copied() {
            None | Some('/') => break,
            Some('{') => {
                chars.next();
                if segment.namespace.is_some() {
                    return Err(invalid(input, "segment has more than one namespace"));
                }
                let namespace = read_token(chars, &['}'], input)?;
                if chars.next() != Some('}') {
                    return Err(invalid(input, "unterminated '{'"));
                }
                segment.namespace = Some(namespace);
            }
            Some('[') => {
                chars.next();
                if segment.identity.is_some() {
                    return Err(invalid(input, "segment has more than one identity"));
                }
                let first = read_token(chars, &['=', ']'], input)?;
                let identity = match chars.next() {
                    Some('=') => {
                        let value = read_token(chars, &[']'], input)?;
                        if chars.next() != Some(']') {
                            return Err(invalid(input, "unterminated '['"));
                        }
                        Identity::new(first, value)
                    }
                    Some(']') => Identity::new(DEFAULT_IDENTITY_ATTRIBUTE, first),
                    _ => return Err(invalid(input, "unterminated '['")),
                };
                if identity.attribute.is_empty() || identity.value.is_empty() {
                    return Err(invalid(input, "identity attribute and value must not be empty"));
                }
                segment.identity = Some(identity);
            }
            Some(other) => {
                return Err(invalid(input, &format!("unexpected character '{}'", other)));
            }
        }
    }

    Ok(segment)
}

/// Read up to (not including) the first unescaped terminator.
fn read_token(
    chars: &mut Peekable<Chars<'_>>,
    terminators: &[char],
    input: &str,
) -> Result<String> {
    let mut token = String::new();
    while let Some(&ch) = chars.peek() {
        if terminators.contains(&ch) {
            break;
        }
        chars.next();
        if ch == '\\' {
            match chars.next() {
                Some(escaped) => token.push(escaped),
                None => return Err(invalid(input, "trailing backslash")),
            }
        } else {
            token.push(ch);
        }
    }
    Ok(token)
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if SPECIAL_CHARS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn invalid(input: &str, reason: &str) -> Error {
    Error::InvalidPath {
        message: format!("'{}': {}", input, reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_path() {
        let result = Path::new(Vec::new());
        assert!(matches!(result, Err(Error::InvalidPath { .. })));
    }

    #[test]
    fn test_parent_and_last() {
        let path = Path::new(vec![
            PathSegment::singleton("profile"),
            PathSegment::singleton("subsystem"),
            PathSegment::named("console-handler", "CONSOLE"),
        ])
        .unwrap();

        assert_eq!(path.parent().len(), 2);
        assert_eq!(path.parent()[1].element_type(), "subsystem");
        assert_eq!(path.last().identity().unwrap().value(), "CONSOLE");
        assert_eq!(path.last().identity().unwrap().attribute(), "name");
    }

    #[test]
    fn test_single_segment_has_empty_parent() {
        let path = Path::new(vec![PathSegment::singleton("profile")]).unwrap();
        assert!(path.parent().is_empty());
        assert_eq!(path.last().element_type(), "profile");
    }

    #[test]
    fn test_structural_equality() {
        let a: Path = "profile/console-handler[name=h]".parse().unwrap();
        let b = Path::new(vec![
            PathSegment::singleton("profile"),
            PathSegment::named("console-handler", "h"),
        ])
        .unwrap();
        assert_eq!(a, b);

        let c: Path = "profile/console-handler[name=H]".parse().unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_parse_shorthand_identity() {
        let path: Path = "profile/console-handler[CONSOLE]".parse().unwrap();
        assert_eq!(path.last(), &PathSegment::named("console-handler", "CONSOLE"));
    }

    #[test]
    fn test_parse_custom_identity_attribute() {
        let path: Path = "logger[category=org.jboss.as]".parse().unwrap();
        let identity = path.last().identity().unwrap();
        assert_eq!(identity.attribute(), "category");
        assert_eq!(identity.value(), "org.jboss.as");
    }

    #[test]
    fn test_parse_namespace_filter() {
        let path: Path = "/profile/subsystem{urn:jboss:domain:logging:}".parse().unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.last().namespace(), Some("urn:jboss:domain:logging:"));
        assert!(path.last().is_singleton());
    }

    #[test]
    fn test_parse_namespace_and_identity_in_any_order() {
        let a: Path = "handler[x]{urn:a}".parse().unwrap();
        let b: Path = "handler{urn:a}[x]".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_escaped_value() {
        let path: Path = r"file-handler[name=logs\/server\]]".parse().unwrap();
        assert_eq!(path.last().identity().unwrap().value(), "logs/server]");
    }

    #[test]
    fn test_display_round_trips() {
        let original = Path::new(vec![
            PathSegment::singleton("profile"),
            PathSegment::singleton("subsystem").in_namespace("urn:jboss:domain:logging:"),
            PathSegment::named("console-handler", "a/b=c"),
        ])
        .unwrap();
        let rendered = original.to_string();
        assert_eq!(
            rendered,
            r"profile/subsystem{urn:jboss:domain:logging:}/console-handler[name=a\/b\=c]"
        );
        assert_eq!(rendered.parse::<Path>().unwrap(), original);
    }

    #[test]
    fn test_parse_errors() {
        for input in ["", "/", "profile/[x]", "handler[x", "handler{urn", "handler[=x]", "a\\"] {
            let result = input.parse::<Path>();
            assert!(
                matches!(result, Err(Error::InvalidPath { .. })),
                "expected InvalidPath for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_join_and_prefixed() {
        let base: Path = "profile".parse().unwrap();
        let joined = base.join(PathSegment::named("logger", "x"));
        assert_eq!(joined.to_string(), "profile/logger[name=x]");

        let relative: Path = "console-handler[h]".parse().unwrap();
        let absolute = relative.prefixed(&[
            PathSegment::singleton("profiles"),
            PathSegment::named("profile", "default"),
        ]);
        assert_eq!(
            absolute.to_string(),
            "profiles/profile[name=default]/console-handler[name=h]"
        );
    }
}

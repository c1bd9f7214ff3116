//! # Operations File Schema and Parsing
//!
//! This module defines the YAML "operations file" consumed by the
//! `creaper-offline apply` command, and the logic for turning it into
//! [`OfflineCommand`]s.
//!
//! ## Format
//!
//! An operations file is a YAML list. Every item is a mapping with exactly one
//! key naming the operation type:
//!
//! ```yaml
//! - console-handler:
//!     name: CONSOLE
//!     level: INFO
//!     named-formatter: COLOR-PATTERN
//!     target: STDOUT
//!     replace-existing: true
//! - logger:
//!     category: com.example
//!     level: DEBUG
//!     handlers: [CONSOLE]
//! - element:
//!     path: subsystem{urn:jboss:domain:logging:}/periodic-rotating-file-handler[FILE]
//!     attributes:
//!       autoflush: true
//!     children:
//!       - element: suffix
//!         attributes: { value: .yyyy-MM-dd }
//!     on-conflict: replace
//! ```
//!
//! Operations run in file order. `element` paths are relative to the active
//! profile.
//!
//! ## Key Components
//!
//! - **`Operation`**: one entry of the file, one variant per operation type.
//! - **`Schema`**: the whole file, `Vec<Operation>`.
//! - **`parse`** / **`from_file`**: YAML text to `Schema`.
//! - **`Operation::into_command`**: validation through the command builders.

use serde::Deserialize;
use serde_yaml::Value;

use crate::client::{AddElement, OfflineCommand};
use crate::error::{Error, Result};
use crate::logging::{AddConsoleLogHandler, AddLogger, ConsoleTarget, LogLevel};
use crate::operation::{AttributeSet, ChildSpec, ConflictPolicy};
use crate::path::Path;

/// `console-handler` entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConsoleHandlerOp {
    pub name: String,
    #[serde(default)]
    pub level: Option<LogLevel>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default, alias = "auto-flush")]
    pub autoflush: Option<bool>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub named_formatter: Option<String>,
    #[serde(default)]
    pub pattern_formatter: Option<String>,
    #[serde(default)]
    pub target: Option<ConsoleTarget>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub replace_existing: bool,
}

/// `logger` entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LoggerOp {
    pub category: String,
    #[serde(default)]
    pub level: Option<LogLevel>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub use_parent_handlers: Option<bool>,
    #[serde(default)]
    pub handlers: Vec<String>,
    #[serde(default)]
    pub replace_existing: bool,
}

/// `element` entry: a raw element under the active profile
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ElementOp {
    pub path: String,
    #[serde(default)]
    pub attributes: AttributeSet,
    #[serde(default)]
    pub children: Vec<ChildSpec>,
    #[serde(default)]
    pub on_conflict: ConflictPolicy,
}

/// All operation types an operations file may contain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Add or replace a console log handler.
    ConsoleHandler(ConsoleHandlerOp),
    /// Add or replace a logger category.
    Logger(LoggerOp),
    /// Add or replace an arbitrary element.
    Element(ElementOp),
}

impl Operation {
    /// The key this operation is written under.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::ConsoleHandler(_) => "console-handler",
            Operation::Logger(_) => "logger",
            Operation::Element(_) => "element",
        }
    }

    /// Validate the entry and turn it into an executable command.
    pub fn into_command(self) -> Result<Box<dyn OfflineCommand>> {
        match self {
            Operation::ConsoleHandler(op) => {
                let mut builder = AddConsoleLogHandler::builder(op.name.as_str());
                if let Some(level) = op.level {
                    builder = builder.level(level);
                }
                if let Some(filter) = op.filter {
                    builder = builder.filter(filter);
                }
                if let Some(autoflush) = op.autoflush {
                    builder = builder.auto_flush(autoflush);
                }
                if let Some(enabled) = op.enabled {
                    builder = builder.enabled(enabled);
                }
                builder = match (op.named_formatter, op.pattern_formatter) {
                    (Some(_), Some(_)) => {
                        return Err(Error::ConfigParse {
                            message: format!(
                                "console-handler '{}' sets both named-formatter and pattern-formatter",
                                op.name
                            ),
                            hint: Some("keep only one of them".to_string()),
                        })
                    }
                    (Some(named), None) => builder.named_formatter(named),
                    (None, Some(pattern)) => builder.pattern_formatter(pattern),
                    (None, None) => builder,
                };
                if let Some(target) = op.target {
                    builder = builder.target(target);
                }
                if let Some(encoding) = op.encoding {
                    builder = builder.encoding(encoding);
                }
                if op.replace_existing {
                    builder = builder.replace_existing();
                }
                Ok(Box::new(builder.build()?))
            }
            Operation::Logger(op) => {
                let mut builder = AddLogger::builder(op.category).handlers(op.handlers);
                if let Some(level) = op.level {
                    builder = builder.level(level);
                }
                if let Some(filter) = op.filter {
                    builder = builder.filter(filter);
                }
                if let Some(use_parent_handlers) = op.use_parent_handlers {
                    builder = builder.use_parent_handlers(use_parent_handlers);
                }
                if op.replace_existing {
                    builder = builder.replace_existing();
                }
                Ok(Box::new(builder.build()?))
            }
            Operation::Element(op) => {
                let path: Path = op.path.parse()?;
                Ok(Box::new(AddElement::new(
                    path,
                    op.attributes,
                    op.children,
                    op.on_conflict,
                )))
            }
        }
    }
}

/// The complete operations file, in execution order.
pub type Schema = Vec<Operation>;

/// Parses a YAML string into a `Schema`.
///
/// An empty document is an empty schema.
pub fn parse(yaml_content: &str) -> Result<Schema> {
    let raw: Value = serde_yaml::from_str(yaml_content)?;
    let items = match raw {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(items) => items,
        _ => {
            return Err(Error::ConfigParse {
                message: "Operations file must be a list of operations".to_string(),
                hint: Some("start every operation with '- '".to_string()),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Mapping(map) => convert_yaml_mapping_to_operation(map),
            _ => Err(Error::ConfigParse {
                message: format!("Operation #{} is not a mapping", index + 1),
                hint: None,
            }),
        })
        .collect()
}

/// Convert a single-key YAML mapping to an Operation
fn convert_yaml_mapping_to_operation(map: serde_yaml::Mapping) -> Result<Operation> {
    if map.len() != 1 {
        return Err(Error::ConfigParse {
            message: format!("Operation mapping must have exactly one key, found {}", map.len()),
            hint: Some("write each operation as a separate list item".to_string()),
        });
    }
    let mut iter = map.into_iter();
    let (key, value) = iter.next().ok_or_else(|| Error::ConfigParse {
        message: "Empty operation mapping".to_string(),
        hint: None,
    })?;

    let op_type = key.as_str().ok_or_else(|| Error::ConfigParse {
        message: "Operation key must be string".to_string(),
        hint: None,
    })?;

    let invalid = |err: serde_yaml::Error| Error::ConfigParse {
        message: format!("Invalid {} operation: {}", op_type, err),
        hint: None,
    };

    match op_type {
        "console-handler" => serde_yaml::from_value(value)
            .map(Operation::ConsoleHandler)
            .map_err(invalid),
        "logger" => serde_yaml::from_value(value)
            .map(Operation::Logger)
            .map_err(invalid),
        "element" => serde_yaml::from_value(value)
            .map(Operation::Element)
            .map_err(invalid),
        _ => Err(Error::ConfigParse {
            message: format!("Unknown operation type: {}", op_type),
            hint: Some("expected one of: console-handler, logger, element".to_string()),
        }),
    }
}

/// Parse a Schema from a YAML file path
pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Schema> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

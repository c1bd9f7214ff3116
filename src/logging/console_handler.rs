use crate::client::{OfflineCommand, OfflineCommandContext};
use crate::error::{Error, Result};
use crate::operation::{ChildSpec, OperationBuilder, OperationDescriptor};
use crate::path::PathSegment;

use super::{filter_child, level_child, ConsoleTarget, Formatter, LogLevel, NAMESPACE_PREFIX};

/// Adds a `console-handler` to the logging subsystem
///
/// Fails with `CommandFailed` when a handler with the same name exists,
/// unless built with [`replace_existing`](AddConsoleLogHandlerBuilder::replace_existing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddConsoleLogHandler {
    name: String,
    level: Option<LogLevel>,
    filter: Option<String>,
    auto_flush: Option<bool>,
    enabled: Option<bool>,
    formatter: Option<Formatter>,
    target: Option<ConsoleTarget>,
    encoding: Option<String>,
    replace_existing: bool,
}

impl AddConsoleLogHandler {
    pub fn builder(name: impl Into<String>) -> AddConsoleLogHandlerBuilder {
        AddConsoleLogHandlerBuilder {
            name: name.into(),
            level: None,
            filter: None,
            auto_flush: None,
            enabled: None,
            formatter: None,
            target: None,
            encoding: None,
            replace_existing: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn replaces_existing(&self) -> bool {
        self.replace_existing
    }
}

impl OfflineCommand for AddConsoleLogHandler {
    fn operation(&self, ctx: &OfflineCommandContext) -> Result<OperationDescriptor> {
        let path = ctx
            .subsystem_path(NAMESPACE_PREFIX)
            .join(PathSegment::named("console-handler", self.name.as_str()));

        let mut builder = OperationBuilder::new(path)
            .attribute_opt("autoflush", self.auto_flush.map(|v| v.to_string()))
            .attribute_opt("enabled", self.enabled.map(|v| v.to_string()))
            .child_opt(self.level.map(level_child))
            .child_opt(self.filter.as_deref().map(filter_child))
            .child_opt(
                self.encoding
                    .as_deref()
                    .map(|encoding| ChildSpec::new("encoding").attribute("value", encoding)),
            )
            .child_opt(self.formatter.as_ref().map(Formatter::to_child))
            .child_opt(
                self.target
                    .map(|target| ChildSpec::new("target").attribute("name", target.as_str())),
            );
        if self.replace_existing {
            builder = builder.replace_existing();
        }
        Ok(builder.build())
    }
}

/// Builder for [`AddConsoleLogHandler`]
#[derive(Debug, Clone)]
pub struct AddConsoleLogHandlerBuilder {
    name: String,
    level: Option<LogLevel>,
    filter: Option<String>,
    auto_flush: Option<bool>,
    enabled: Option<bool>,
    formatter: Option<Formatter>,
    target: Option<ConsoleTarget>,
    encoding: Option<String>,
    replace_existing: bool,
}

impl AddConsoleLogHandlerBuilder {
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Filter expression, e.g. `match("filter*")`.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn auto_flush(mut self, auto_flush: bool) -> Self {
        self.auto_flush = Some(auto_flush);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Inline pattern formatter. Replaces any formatter set before.
    pub fn pattern_formatter(mut self, pattern: impl Into<String>) -> Self {
        self.formatter = Some(Formatter::Pattern(pattern.into()));
        self
    }

    /// Reference to a named formatter. Replaces any formatter set before.
    pub fn named_formatter(mut self, name: impl Into<String>) -> Self {
        self.formatter = Some(Formatter::Named(name.into()));
        self
    }

    pub fn target(mut self, target: ConsoleTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Character encoding name, e.g. `UTF-8`.
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    pub fn replace_existing(mut self) -> Self {
        self.replace_existing = true;
        self
    }

    pub fn build(self) -> Result<AddConsoleLogHandler> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidCommand {
                message: "console handler name must not be empty".to_string(),
            });
        }
        if let Some(Formatter::Pattern(pattern) | Formatter::Named(pattern)) = &self.formatter {
            if pattern.is_empty() {
                return Err(Error::InvalidCommand {
                    message: format!("console handler '{}' has an empty formatter", self.name),
                });
            }
        }
        Ok(AddConsoleLogHandler {
            name: self.name,
            level: self.level,
            filter: self.filter,
            auto_flush: self.auto_flush,
            enabled: self.enabled,
            formatter: self.formatter,
            target: self.target,
            encoding: self.encoding,
            replace_existing: self.replace_existing,
        })
    }
}

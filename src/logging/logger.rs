use crate::client::{OfflineCommand, OfflineCommandContext};
use crate::error::{Error, Result};
use crate::operation::{ChildSpec, OperationBuilder, OperationDescriptor};
use crate::path::PathSegment;

use super::{filter_child, level_child, LogLevel, NAMESPACE_PREFIX};

/// Adds a `logger` for a category to the logging subsystem
///
/// Loggers are identified by their `category` attribute rather than `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLogger {
    category: String,
    level: Option<LogLevel>,
    filter: Option<String>,
    use_parent_handlers: Option<bool>,
    handlers: Vec<String>,
    replace_existing: bool,
}

impl AddLogger {
    pub fn builder(category: impl Into<String>) -> AddLoggerBuilder {
        AddLoggerBuilder {
            category: category.into(),
            level: None,
            filter: None,
            use_parent_handlers: None,
            handlers: Vec::new(),
            replace_existing: false,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn handlers(&self) -> &[String] {
        &self.handlers
    }
}

impl OfflineCommand for AddLogger {
    fn operation(&self, ctx: &OfflineCommandContext) -> Result<OperationDescriptor> {
        let path = ctx.subsystem_path(NAMESPACE_PREFIX).join(PathSegment::identified_by(
            "logger",
            "category",
            self.category.as_str(),
        ));

        let handlers = (!self.handlers.is_empty()).then(|| {
            self.handlers
                .iter()
                .fold(ChildSpec::new("handlers"), |handlers, name| {
                    handlers.child(ChildSpec::new("handler").attribute("name", name.as_str()))
                })
        });

        let mut builder = OperationBuilder::new(path)
            .attribute_opt(
                "use-parent-handlers",
                self.use_parent_handlers.map(|v| v.to_string()),
            )
            .child_opt(self.level.map(level_child))
            .child_opt(self.filter.as_deref().map(filter_child))
            .child_opt(handlers);
        if self.replace_existing {
            builder = builder.replace_existing();
        }
        Ok(builder.build())
    }
}

/// Builder for [`AddLogger`]
#[derive(Debug, Clone)]
pub struct AddLoggerBuilder {
    category: String,
    level: Option<LogLevel>,
    filter: Option<String>,
    use_parent_handlers: Option<bool>,
    handlers: Vec<String>,
    replace_existing: bool,
}

impl AddLoggerBuilder {
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn use_parent_handlers(mut self, use_parent_handlers: bool) -> Self {
        self.use_parent_handlers = Some(use_parent_handlers);
        self
    }

    /// Attach a handler by name. Handlers keep the order they were added in.
    pub fn handler(mut self, name: impl Into<String>) -> Self {
        self.handlers.push(name.into());
        self
    }

    pub fn handlers<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.handlers.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn replace_existing(mut self) -> Self {
        self.replace_existing = true;
        self
    }

    pub fn build(self) -> Result<AddLogger> {
        if self.category.trim().is_empty() {
            return Err(Error::InvalidCommand {
                message: "logger category must not be empty".to_string(),
            });
        }
        if let Some(duplicate) = self
            .handlers
            .iter()
            .enumerate()
            .find_map(|(i, name)| self.handlers[..i].contains(name).then_some(name))
        {
            return Err(Error::InvalidCommand {
                message: format!(
                    "logger '{}' lists handler '{}' more than once",
                    self.category, duplicate
                ),
            });
        }
        Ok(AddLogger {
            category: self.category,
            level: self.level,
            filter: self.filter,
            use_parent_handlers: self.use_parent_handlers,
            handlers: self.handlers,
            replace_existing: self.replace_existing,
        })
    }
}

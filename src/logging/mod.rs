//! # Logging subsystem commands
//!
//! Offline commands for the application server's logging subsystem. Each
//! command is configured through a builder and turned into an
//! [`OperationDescriptor`](crate::operation::OperationDescriptor) addressed
//! under the logging `subsystem` element of the active profile.
//!
//! The logging subsystem is located by namespace prefix
//! ([`NAMESPACE_PREFIX`]), so every schema version of it matches.
//!
//! ```
//! use creaper_offline::logging::{AddConsoleLogHandler, ConsoleTarget, LogLevel};
//!
//! let command = AddConsoleLogHandler::builder("CONSOLE")
//!     .level(LogLevel::Info)
//!     .target(ConsoleTarget::Stdout)
//!     .named_formatter("COLOR-PATTERN")
//!     .build()
//!     .unwrap();
//! assert_eq!(command.name(), "CONSOLE");
//! ```

mod console_handler;
mod logger;

use std::fmt;

use serde::Deserialize;

use crate::layout::{ElementLayout, LayoutRegistry};
use crate::operation::ChildSpec;

pub use console_handler::{AddConsoleLogHandler, AddConsoleLogHandlerBuilder};
pub use logger::{AddLogger, AddLoggerBuilder};

/// Namespace URI prefix shared by every version of the logging subsystem.
pub const NAMESPACE_PREFIX: &str = "urn:jboss:domain:logging:";

/// Log levels understood by the logging subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    All,
    Finest,
    Finer,
    Trace,
    Debug,
    Fine,
    Config,
    Info,
    Warn,
    Warning,
    Error,
    Severe,
    Fatal,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::All => "ALL",
            LogLevel::Finest => "FINEST",
            LogLevel::Finer => "FINER",
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Fine => "FINE",
            LogLevel::Config => "CONFIG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Severe => "SEVERE",
            LogLevel::Fatal => "FATAL",
            LogLevel::Off => "OFF",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stream a console handler writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
}

impl ConsoleTarget {
    /// The value stored in the configuration file.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleTarget::Stdout => "System.out",
            ConsoleTarget::Stderr => "System.err",
        }
    }
}

/// Formatter reference of a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formatter {
    /// An inline pattern, e.g. `%d{HH:mm:ss,SSS} %-5p [%c] %s%e%n`
    Pattern(String),
    /// A formatter defined elsewhere in the subsystem
    Named(String),
}

impl Formatter {
    pub(crate) fn to_child(&self) -> ChildSpec {
        let inner = match self {
            Formatter::Pattern(pattern) => {
                ChildSpec::new("pattern-formatter").attribute("pattern", pattern.as_str())
            }
            Formatter::Named(name) => ChildSpec::new("named-formatter").attribute("name", name.as_str()),
        };
        ChildSpec::new("formatter").child(inner)
    }
}

/// Register the canonical layouts of the logging subsystem elements.
pub fn register_layouts(registry: &mut LayoutRegistry) {
    registry.register(
        "console-handler",
        ElementLayout::new(
            ["name", "autoflush", "enabled"],
            ["level", "filter-spec", "encoding", "formatter", "target"],
        ),
    );
    registry.register(
        "logger",
        ElementLayout::new(
            ["category", "use-parent-handlers"],
            ["level", "filter-spec", "handlers"],
        ),
    );
}

/// `<level name="..."/>`
pub(crate) fn level_child(level: LogLevel) -> ChildSpec {
    ChildSpec::new("level").attribute("name", level.as_str())
}

/// `<filter-spec value="..."/>`
pub(crate) fn filter_child(filter: &str) -> ChildSpec {
    ChildSpec::new("filter-spec").attribute("value", filter)
}

//! Shared test utilities for integration and E2E tests.
//!
//! This module provides configuration fixtures and a temporary-directory
//! helper shared by the test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_configuration(&fixtures::standalone(""))
//!         .with_operations(operations::CONSOLE_HANDLER);
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
#[allow(unused_imports)]
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::fixtures;
    pub use super::operations;
    pub use super::TestFixture;
}

/// Configuration documents used across tests.
#[allow(dead_code)]
pub mod fixtures {
    /// A standalone configuration whose logging subsystem contains `handlers`
    /// (already indented by the caller).
    pub fn standalone(handlers: &str) -> String {
        format!(
            concat!(
                "<server xmlns=\"urn:jboss:domain:4.0\">\n",
                "    <profile>\n",
                "        <subsystem xmlns=\"urn:jboss:domain:logging:3.0\">\n",
                "             {}",
                "        </subsystem>\n",
                "    </profile>\n",
                "</server>"
            ),
            handlers
        )
    }

    /// The console handler every scenario ends up with.
    pub const HANDLER_ADD_EXPECTED: &str = concat!(
        "<server xmlns=\"urn:jboss:domain:4.0\">\n",
        "    <profile>\n",
        "        <subsystem xmlns=\"urn:jboss:domain:logging:3.0\">\n",
        "            <console-handler name=\"consolehandler\" autoflush=\"false\" enabled=\"false\">\n",
        "                <level name=\"FINEST\"/>\n",
        "                <filter-spec value=\"match(&quot;filter*&quot;)\"/>",
        "                <encoding value=\"UTF-8\"/>\n",
        "                <formatter>\n",
        "                    <named-formatter name=\"PATTERN\"/>\n",
        "                </formatter>\n",
        "                <target name=\"System.out\"/>\n",
        "            </console-handler>\n",
        "        </subsystem>\n",
        "    </profile>\n",
        "</server>"
    );

    /// A differently configured handler with the same name.
    pub const EXISTING_DIFFERENT: &str = concat!(
        "            <console-handler name=\"consolehandler\" autoflush=\"true\" enabled=\"true\">\n",
        "                <level name=\"FINE\"/>\n",
        "                <filter-spec value=\"match(&quot;filter*&quot;)\"/>",
        "                <encoding value=\"UTF-8\"/>\n",
        "                <target name=\"System.err\"/>\n",
        "            </console-handler>\n"
    );

    /// A handler with the same name that is almost identical to the expected one.
    pub const EXISTING_SIMILAR: &str = concat!(
        "            <console-handler name=\"consolehandler\" autoflush=\"false\" enabled=\"false\">\n",
        "                <level name=\"FINEST\"/>\n",
        "                <filter-spec value=\"match(&quot;filter*&quot;)\"/>",
        "                <encoding value=\"UTF-8\"/>\n",
        "                <target name=\"System.out\"/>\n",
        "            </console-handler>\n"
    );

    /// A domain configuration with two profiles.
    pub const DOMAIN: &str = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<domain xmlns=\"urn:jboss:domain:4.0\">\n",
        "  <profiles>\n",
        "    <profile name=\"default\">\n",
        "      <subsystem xmlns=\"urn:jboss:domain:logging:3.0\">\n",
        "        <console-handler name=\"CONSOLE\"/>\n",
        "      </subsystem>\n",
        "    </profile>\n",
        "    <profile name=\"full\">\n",
        "      <subsystem xmlns=\"urn:jboss:domain:logging:3.0\">\n",
        "        <console-handler name=\"CONSOLE\"/>\n",
        "      </subsystem>\n",
        "    </profile>\n",
        "  </profiles>\n",
        "</domain>\n"
    );
}

/// Operations files used by the CLI tests.
#[allow(dead_code)]
pub mod operations {
    /// The full console handler of [`super::fixtures::HANDLER_ADD_EXPECTED`].
    pub const CONSOLE_HANDLER: &str = r#"
- console-handler:
    name: consolehandler
    level: FINEST
    filter: match("filter*")
    autoflush: false
    enabled: false
    named-formatter: PATTERN
    target: STDOUT
    encoding: UTF-8
"#;

    /// Same handler, replacing an existing one.
    pub const CONSOLE_HANDLER_REPLACE: &str = r#"
- console-handler:
    name: consolehandler
    level: FINEST
    filter: match("filter*")
    autoflush: false
    enabled: false
    named-formatter: PATTERN
    target: STDOUT
    encoding: UTF-8
    replace-existing: true
"#;

    /// An operation whose parent structure does not exist.
    pub const MISSING_SUBSYSTEM: &str = r#"
- element:
    path: subsystem{urn:jboss:domain:undertow:}/server[default-server]
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "- console-handler: [unterminated";
}

/// A temporary directory holding a configuration file and an operations file.
#[allow(dead_code)]
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `configuration.xml` with the given content.
    pub fn with_configuration(self, content: &str) -> Self {
        self.temp_dir
            .child("configuration.xml")
            .write_str(content)
            .expect("Failed to write configuration file");
        self
    }

    /// Write `operations.yaml` with the given content.
    pub fn with_operations(self, content: &str) -> Self {
        self.temp_dir
            .child("operations.yaml")
            .write_str(content)
            .expect("Failed to write operations file");
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn configuration_path(&self) -> PathBuf {
        self.temp_dir.path().join("configuration.xml")
    }

    pub fn operations_path(&self) -> PathBuf {
        self.temp_dir.path().join("operations.yaml")
    }

    /// Current content of the configuration file.
    pub fn configuration(&self) -> String {
        std::fs::read_to_string(self.configuration_path()).expect("Failed to read configuration")
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("creaper-offline");
        cmd.current_dir(self.path());
        cmd
    }

    /// `apply --file configuration.xml operations.yaml`, ready for more flags.
    pub fn apply_command(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("apply")
            .arg("--file")
            .arg(self.configuration_path())
            .arg(self.operations_path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

//! # Offline client
//!
//! [`OfflineManagementClient`] applies [`OfflineCommand`]s to a configuration
//! file on disk. Each call reads the whole file, applies every command to the
//! in-memory [`Document`], and writes the file back only when all of them
//! succeeded. Any failure leaves the file byte-identical.
//!
//! ```no_run
//! use creaper_offline::client::{OfflineManagementClient, OfflineOptions};
//! use creaper_offline::logging::{AddConsoleLogHandler, LogLevel};
//!
//! let options = OfflineOptions::standalone()
//!     .configuration_file("standalone.xml")
//!     .build()?;
//! let client = OfflineManagementClient::new(options);
//!
//! let command = AddConsoleLogHandler::builder("CONSOLE")
//!     .level(LogLevel::Info)
//!     .replace_existing()
//!     .build()?;
//! client.apply(&command)?;
//! # Ok::<(), creaper_offline::error::Error>(())
//! ```

use std::fmt;
use std::fs;
use std::path::{Path as FsPath, PathBuf};

use log::{debug, info};

use crate::document::Document;
use crate::error::{Error, Result};
use crate::layout::LayoutRegistry;
use crate::mutate::Mutator;
use crate::operation::{AttributeSet, ChildSpec, ConflictPolicy, OperationBuilder, OperationDescriptor};
use crate::path::{Path, PathSegment};

/// Kind of server the configuration file belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMode {
    /// `standalone.xml`: `<server>` with a single `<profile>`
    Standalone,
    /// `domain.xml`: `<domain>` with named profiles under `<profiles>`
    Domain { profile: String },
}

impl ServerMode {
    /// Expected document element.
    pub fn root_element(&self) -> &'static str {
        match self {
            ServerMode::Standalone => "server",
            ServerMode::Domain { .. } => "domain",
        }
    }
}

/// Where and how the offline client operates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineOptions {
    configuration_file: PathBuf,
    mode: ServerMode,
}

impl OfflineOptions {
    pub fn standalone() -> OfflineOptionsBuilder {
        OfflineOptionsBuilder {
            mode: ServerMode::Standalone,
            configuration_file: None,
        }
    }

    /// Options for a domain configuration, operating on `profile`.
    pub fn domain(profile: impl Into<String>) -> OfflineOptionsBuilder {
        OfflineOptionsBuilder {
            mode: ServerMode::Domain {
                profile: profile.into(),
            },
            configuration_file: None,
        }
    }

    pub fn configuration_file(&self) -> &FsPath {
        &self.configuration_file
    }

    pub fn mode(&self) -> &ServerMode {
        &self.mode
    }
}

/// Builder for [`OfflineOptions`]
#[derive(Debug, Clone)]
pub struct OfflineOptionsBuilder {
    mode: ServerMode,
    configuration_file: Option<PathBuf>,
}

impl OfflineOptionsBuilder {
    pub fn configuration_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.configuration_file = Some(path.into());
        self
    }

    pub fn build(self) -> Result<OfflineOptions> {
        let configuration_file = self.configuration_file.ok_or_else(|| Error::ConfigParse {
            message: "no configuration file given".to_string(),
            hint: Some("set one with configuration_file(...)".to_string()),
        })?;
        if !configuration_file.is_file() {
            return Err(Error::Filesystem {
                message: format!(
                    "Configuration file '{}' does not exist",
                    configuration_file.display()
                ),
            });
        }
        if let ServerMode::Domain { profile } = &self.mode {
            if profile.is_empty() {
                return Err(Error::ConfigParse {
                    message: "domain profile name is empty".to_string(),
                    hint: None,
                });
            }
        }
        Ok(OfflineOptions {
            configuration_file,
            mode: self.mode,
        })
    }
}

/// What a command knows about the configuration it is applied to
#[derive(Debug, Clone)]
pub struct OfflineCommandContext {
    mode: ServerMode,
}

impl OfflineCommandContext {
    pub fn new(mode: ServerMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> &ServerMode {
        &self.mode
    }

    /// Path of the profile commands operate on.
    pub fn profile_path(&self) -> Path {
        match &self.mode {
            ServerMode::Standalone => Path::from_segment(PathSegment::singleton("profile")),
            ServerMode::Domain { profile } => Path::from_segment(PathSegment::singleton("profiles"))
                .join(PathSegment::named("profile", profile.as_str())),
        }
    }

    /// Path of the subsystem whose namespace URI starts with `namespace_prefix`.
    pub fn subsystem_path(&self, namespace_prefix: &str) -> Path {
        self.profile_path()
            .join(PathSegment::singleton("subsystem").in_namespace(namespace_prefix))
    }
}

/// A change that can be applied to an offline configuration
pub trait OfflineCommand: fmt::Debug {
    /// Describe the change for the given configuration.
    fn operation(&self, ctx: &OfflineCommandContext) -> Result<OperationDescriptor>;
}

/// Generic command adding an element below the active profile
///
/// The path is relative to the profile, e.g.
/// `subsystem{urn:jboss:domain:logging:}/size-rotating-file-handler[FILE]`.
#[derive(Debug, Clone)]
pub struct AddElement {
    path: Path,
    attributes: AttributeSet,
    children: Vec<ChildSpec>,
    on_conflict: ConflictPolicy,
}

impl AddElement {
    pub fn new(
        path: Path,
        attributes: AttributeSet,
        children: Vec<ChildSpec>,
        on_conflict: ConflictPolicy,
    ) -> Self {
        Self {
            path,
            attributes,
            children,
            on_conflict,
        }
    }
}

impl OfflineCommand for AddElement {
    fn operation(&self, ctx: &OfflineCommandContext) -> Result<OperationDescriptor> {
        let path = self.path.prefixed(ctx.profile_path().segments());
        let mut builder = OperationBuilder::new(path)
            .attributes(self.attributes.clone())
            .on_conflict(self.on_conflict);
        for child in &self.children {
            builder = builder.child(child.clone());
        }
        Ok(builder.build())
    }
}

/// Applies commands to a configuration file without a running server
#[derive(Debug, Clone)]
pub struct OfflineManagementClient {
    options: OfflineOptions,
    mutator: Mutator,
}

impl OfflineManagementClient {
    pub fn new(options: OfflineOptions) -> Self {
        Self {
            options,
            mutator: Mutator::default(),
        }
    }

    /// Use `layouts` instead of the built-in canonical layouts.
    pub fn with_layouts(mut self, layouts: LayoutRegistry) -> Self {
        self.mutator = Mutator::new(layouts);
        self
    }

    pub fn options(&self) -> &OfflineOptions {
        &self.options
    }

    pub fn context(&self) -> OfflineCommandContext {
        OfflineCommandContext::new(self.options.mode.clone())
    }

    /// Apply one command and write the result back.
    pub fn apply(&self, command: &dyn OfflineCommand) -> Result<()> {
        self.apply_all([command])
    }

    /// Apply commands in order and write the result back once all succeeded.
    pub fn apply_all<'a, I>(&self, commands: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a dyn OfflineCommand>,
    {
        let rendered = self.render(commands)?;
        let path = self.options.configuration_file();
        fs::write(path, rendered).map_err(|err| Error::Filesystem {
            message: format!("Failed to write '{}': {}", path.display(), err),
        })?;
        info!("Wrote {}", path.display());
        Ok(())
    }

    /// Apply commands in memory and return the resulting text without
    /// touching the file.
    pub fn render<'a, I>(&self, commands: I) -> Result<String>
    where
        I: IntoIterator<Item = &'a dyn OfflineCommand>,
    {
        let mut document = self.read_document()?;
        let ctx = self.context();
        for command in commands {
            let operation = command.operation(&ctx)?;
            debug!("Applying {:?}", command);
            self.mutator.apply(&mut document, &operation)?;
        }
        document.serialize()
    }

    /// Read and parse the configuration file, checking its document element.
    pub fn read_document(&self) -> Result<Document> {
        let path = self.options.configuration_file();
        let text = fs::read_to_string(path).map_err(|err| Error::Filesystem {
            message: format!("Failed to read '{}': {}", path.display(), err),
        })?;
        let document = Document::parse(&text)?;

        let root = document.document_element()?;
        let expected = self.options.mode.root_element();
        let found = document.local_name(root).unwrap_or_default();
        if found != expected {
            return Err(Error::UnexpectedRoot {
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::assert_xml_identical;
    use tempfile::TempDir;

    const STANDALONE: &str = "<server xmlns=\"urn:jboss:domain:4.0\">\n    <profile>\n        <subsystem xmlns=\"urn:jboss:domain:logging:3.0\">\n        </subsystem>\n    </profile>\n</server>\n";

    const DOMAIN: &str = "<domain xmlns=\"urn:jboss:domain:4.0\">\n    <profiles>\n        <profile name=\"default\">\n            <subsystem xmlns=\"urn:jboss:domain:logging:3.0\"/>\n        </profile>\n        <profile name=\"ha\">\n            <subsystem xmlns=\"urn:jboss:domain:logging:3.0\"/>\n        </profile>\n    </profiles>\n</domain>\n";

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.xml");
        fs::write(&path, content).unwrap();
        path
    }

    fn add_element(path: &str, on_conflict: ConflictPolicy) -> AddElement {
        AddElement::new(path.parse().unwrap(), AttributeSet::new(), Vec::new(), on_conflict)
    }

    #[test]
    fn test_options_require_configuration_file() {
        let result = OfflineOptions::standalone().build();
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_options_require_existing_file() {
        let result = OfflineOptions::standalone()
            .configuration_file("/nonexistent/standalone.xml")
            .build();
        assert!(matches!(result, Err(Error::Filesystem { .. })));
    }

    #[test]
    fn test_profile_paths() {
        let standalone = OfflineCommandContext::new(ServerMode::Standalone);
        assert_eq!(standalone.profile_path().to_string(), "profile");

        let domain = OfflineCommandContext::new(ServerMode::Domain {
            profile: "ha".to_string(),
        });
        assert_eq!(
            domain.subsystem_path("urn:x:").to_string(),
            "profiles/profile[name=ha]/subsystem{urn:x:}"
        );
    }

    #[test]
    fn test_apply_writes_file() {
        let dir = TempDir::new().unwrap();
        let file = write_config(&dir, STANDALONE);
        let client = OfflineManagementClient::new(
            OfflineOptions::standalone().configuration_file(&file).build().unwrap(),
        );

        client
            .apply(&add_element("subsystem{urn:jboss:domain:logging:}/root-logger", ConflictPolicy::Fail))
            .unwrap();

        let written = fs::read_to_string(&file).unwrap();
        assert!(written.ends_with("</server>\n"));
        assert_xml_identical(
            "<server xmlns=\"urn:jboss:domain:4.0\"><profile><subsystem xmlns=\"urn:jboss:domain:logging:3.0\"><root-logger/></subsystem></profile></server>",
            &written,
        );
    }

    #[test]
    fn test_failed_batch_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let file = write_config(&dir, STANDALONE);
        let client = OfflineManagementClient::new(
            OfflineOptions::standalone().configuration_file(&file).build().unwrap(),
        );

        let first = add_element("subsystem{urn:jboss:domain:logging:}/root-logger", ConflictPolicy::Fail);
        let second = add_element("subsystem{urn:jboss:domain:logging:}/root-logger", ConflictPolicy::Fail);
        let commands: Vec<&dyn OfflineCommand> = vec![&first, &second];
        let result = client.apply_all(commands);

        assert!(result.unwrap_err().is_command_failed());
        assert_eq!(fs::read_to_string(&file).unwrap(), STANDALONE);
    }

    #[test]
    fn test_domain_profile_is_selected() {
        let dir = TempDir::new().unwrap();
        let file = write_config(&dir, DOMAIN);
        let client = OfflineManagementClient::new(
            OfflineOptions::domain("ha").configuration_file(&file).build().unwrap(),
        );

        let rendered = client
            .render([&add_element("subsystem{urn:jboss:domain:logging:}/root-logger", ConflictPolicy::Fail) as &dyn OfflineCommand])
            .unwrap();
        assert_xml_identical(
            "<domain xmlns=\"urn:jboss:domain:4.0\"><profiles><profile name=\"default\"><subsystem xmlns=\"urn:jboss:domain:logging:3.0\"/></profile><profile name=\"ha\"><subsystem xmlns=\"urn:jboss:domain:logging:3.0\"><root-logger/></subsystem></profile></profiles></domain>",
            &rendered,
        );
        // render never writes
        assert_eq!(fs::read_to_string(&file).unwrap(), DOMAIN);
    }

    #[test]
    fn test_wrong_root_element_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = write_config(&dir, DOMAIN);
        let client = OfflineManagementClient::new(
            OfflineOptions::standalone().configuration_file(&file).build().unwrap(),
        );
        match client.read_document() {
            Err(Error::UnexpectedRoot { expected, found }) => {
                assert_eq!(expected, "server");
                assert_eq!(found, "domain");
            }
            other => panic!("Expected UnexpectedRoot, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let file = write_config(&dir, "<server><profile></server>");
        let client = OfflineManagementClient::new(
            OfflineOptions::standalone().configuration_file(&file).build().unwrap(),
        );
        let command = add_element("subsystem/root-logger", ConflictPolicy::Fail);
        assert!(matches!(client.apply(&command), Err(Error::XmlParse { .. })));
        assert_eq!(fs::read_to_string(&file).unwrap(), "<server><profile></server>");
    }
}

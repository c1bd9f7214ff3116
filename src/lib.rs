//! # Offline Configuration Library
//!
//! This library edits application-server configuration files (`standalone.xml`,
//! `domain.xml`) while the server is not running. It is used by the
//! `creaper-offline` command-line tool but is designed to be embedded in test
//! suites and provisioning tools that prepare a server before starting it.
//!
//! ## Quick Example
//!
//! ```
//! use creaper_offline::document::Document;
//! use creaper_offline::mutate::apply;
//! use creaper_offline::operation::{ChildSpec, OperationBuilder};
//!
//! let mut document = Document::parse(
//!     "<server>\n    <profile>\n        <subsystem xmlns=\"urn:jboss:domain:logging:3.0\"/>\n    </profile>\n</server>",
//! )
//! .unwrap();
//!
//! let operation = OperationBuilder::new(
//!     "profile/subsystem{urn:jboss:domain:logging:}/console-handler[CONSOLE]"
//!         .parse()
//!         .unwrap(),
//! )
//! .child(ChildSpec::new("level").attribute("name", "INFO"))
//! .build();
//!
//! apply(&mut document, &operation).unwrap();
//! assert!(document.serialize().unwrap().contains("<console-handler name=\"CONSOLE\">"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Paths (`path`)**: Address an element by a sequence of segments, each an
//!   element type with an optional identity attribute and namespace filter.
//! - **Operations (`operation`)**: Immutable descriptions of one change: target
//!   path, attributes, children and the policy for an already existing target.
//! - **Documents (`document`)**: The parsed configuration file, serialized back
//!   with untouched regions left exactly as they were.
//! - **Mutation (`locate`, `mutate`, `subtree`, `layout`)**: Finding the target,
//!   deciding between add, replace and failure, and building the new element in
//!   the canonical order of its schema.
//! - **Client (`client`)**: File-level application of commands, all or nothing.
//! - **Commands (`logging`, `config`)**: Typed builders for common changes and
//!   the YAML operations file understood by the CLI.
//!
//! ## Execution Flow
//!
//! 1.  **Read**: The whole configuration file is read and parsed.
//! 2.  **Describe**: Every command produces an `OperationDescriptor` for the
//!     active server mode and profile.
//! 3.  **Apply**: Descriptors are applied in order to the in-memory document.
//! 4.  **Write**: The file is rewritten only if every operation succeeded.

pub mod client;
pub mod compare;
pub mod config;
pub mod document;
pub mod error;
pub mod layout;
pub mod locate;
pub mod logging;
pub mod mutate;
pub mod operation;
pub mod path;
pub mod subtree;

#[cfg(test)]
mod path_proptest;

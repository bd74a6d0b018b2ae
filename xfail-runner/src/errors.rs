// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by xfail-runner.

use crate::results::DottedName;
use camino::{Utf8Path, Utf8PathBuf};
use config::ConfigError;
use std::io;
use thiserror::Error;

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse xfail-gate config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing a config.
///
/// Returned by [`ConfigParseError::kind`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the config.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),
}

/// An error that occurred while reading the fail list.
#[derive(Debug, Error)]
#[error("failed to read fail list at `{path}`")]
pub struct BaselineReadError {
    path: Utf8PathBuf,
    #[source]
    error: io::Error,
}

impl BaselineReadError {
    pub(crate) fn new(path: impl Into<Utf8PathBuf>, error: io::Error) -> Self {
        Self {
            path: path.into(),
            error,
        }
    }

    /// Returns the path to the fail list.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns true if the fail list does not exist.
    pub fn is_not_found(&self) -> bool {
        self.error.kind() == io::ErrorKind::NotFound
    }
}

/// An error that occurred while writing out a new fail list.
#[derive(Debug, Error)]
#[error("failed to write fail list to `{path}`")]
pub struct BaselineWriteError {
    path: Utf8PathBuf,
    #[source]
    error: io::Error,
}

impl BaselineWriteError {
    pub(crate) fn new(path: impl Into<Utf8PathBuf>, error: io::Error) -> Self {
        Self {
            path: path.into(),
            error,
        }
    }

    /// Returns the path to the fail list.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

/// An error that occurred while launching the test binary.
#[derive(Debug, Error)]
#[error("failed to execute `{command}`")]
pub struct TestCommandError {
    command: String,
    #[source]
    error: io::Error,
}

impl TestCommandError {
    pub(crate) fn new(command: impl Into<String>, error: io::Error) -> Self {
        Self {
            command: command.into(),
            error,
        }
    }

    /// Returns the command line that failed to launch.
    pub fn command(&self) -> &str {
        &self.command
    }
}

/// The result stream produced by the test binary could not be parsed.
///
/// This usually means that the test binary crashed partway through a run. The test that was
/// running at the time is available through [`in_progress`](Self::in_progress).
#[derive(Debug, Error)]
#[error("result stream is malformed")]
pub struct ResultStreamError {
    in_progress: Option<DottedName>,
    #[source]
    kind: ResultStreamErrorKind,
}

impl ResultStreamError {
    pub(crate) fn new(in_progress: Option<DottedName>, kind: ResultStreamErrorKind) -> Self {
        Self { in_progress, kind }
    }

    /// Returns the suite or test case that was open when the stream broke, if any.
    pub fn in_progress(&self) -> Option<&DottedName> {
        self.in_progress.as_ref()
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ResultStreamErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing a result stream.
///
/// Returned by [`ResultStreamError::kind`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultStreamErrorKind {
    /// The stream is not well-formed XML, or reading it failed.
    #[error("error reading XML")]
    Xml(#[source] quick_xml::Error),

    /// The stream ended while elements were still open.
    #[error("stream ended with {open_elements} element(s) still open")]
    UnexpectedEof {
        /// The number of elements that were never closed.
        open_elements: usize,
    },

    /// The stream ended without producing a root element.
    #[error("stream ended before a root element was seen")]
    NoRootElement,

    /// Non-whitespace content was found outside the root element.
    #[error("found content outside the root element")]
    ContentOutsideRoot,

    /// A second root element was found after the first one was closed.
    #[error("found a second root element `{element}`")]
    MultipleRoots {
        /// The name of the extra element.
        element: String,
    },

    /// An element that carries results was missing a required attribute.
    #[error("element `{element}` is missing required attribute `{attribute}`")]
    MissingAttribute {
        /// The element name.
        element: String,

        /// The attribute that was missing.
        attribute: &'static str,
    },

    /// A suite or test case was exited without being entered.
    #[error("exit event without an open suite or test case")]
    UnbalancedExit,
}

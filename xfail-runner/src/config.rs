// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration support for xfail-gate.

use crate::errors::{ConfigParseError, ConfigParseErrorKind};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use serde::Deserialize;

/// Overall configuration for xfail-gate.
///
/// The configuration is made up of the default config embedded in this crate, with an optional
/// repository config layered on top.
#[derive(Clone, Debug)]
pub struct GateConfig {
    root: Utf8PathBuf,
    fail_list: Utf8PathBuf,
    reporter_args: Vec<String>,
    fflags: Vec<String>,
}

impl GateConfig {
    /// The default location of the config within the root directory: `.config/xfail-gate.toml`.
    pub const CONFIG_PATH: &'static str = ".config/xfail-gate.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Repository-specific configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config from the given file, or if not specified from `.config/xfail-gate.toml` in
    /// `root`.
    ///
    /// An explicitly specified file must exist. If no file is specified and `root` doesn't have
    /// `.config/xfail-gate.toml`, the default config is used. Relative paths in the config are
    /// resolved against `root`.
    pub fn from_sources(
        root: impl Into<Utf8PathBuf>,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        let root = root.into();
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = root.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config().add_source(source);
        let inner = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(config_file, kind))?;

        let GateConfigImpl {
            fail_list,
            reporter_args,
            fflags,
        } = inner;
        Ok(Self {
            fail_list: root.join(fail_list),
            root,
            reporter_args,
            fflags,
        })
    }

    /// Returns the absolute path to the fail list.
    pub fn fail_list(&self) -> &Utf8Path {
        &self.fail_list
    }

    /// Overrides the fail list path. Relative paths are resolved against the root directory.
    pub fn set_fail_list(&mut self, fail_list: impl AsRef<Utf8Path>) -> &mut Self {
        self.fail_list = self.root.join(fail_list);
        self
    }

    /// Returns the arguments that make the test binary report results as XML.
    pub fn reporter_args(&self) -> &[String] {
        &self.reporter_args
    }

    /// Returns the `--fflags=...` argument, or `None` if no feature flags are configured.
    pub fn fflags_arg(&self) -> Option<String> {
        (!self.fflags.is_empty()).then(|| format!("--fflags={}", self.fflags.join(",")))
    }

    // ---
    // Helper methods
    // ---

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<GateConfigImpl, ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|err| ConfigParseErrorKind::BuildError(Box::new(err)))?;

        serde_path_to_error::deserialize(config)
            .map_err(|err| ConfigParseErrorKind::DeserializeError(Box::new(err)))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct GateConfigImpl {
    fail_list: Utf8PathBuf,
    reporter_args: Vec<String>,
    fflags: Vec<String>,
}

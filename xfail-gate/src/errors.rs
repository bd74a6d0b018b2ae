// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING, StderrStyles};
use camino::FromPathBufError;
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;
use xfail_runner::{
    GateExitCode,
    errors::{
        BaselineReadError, BaselineWriteError, ConfigParseError, ResultStreamError,
        ResultStreamErrorKind, TestCommandError,
    },
};

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An error that ends a gate run with a non-zero exit code.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("could not determine current directory")]
    CurrentDirFailed {
        #[source]
        err: std::io::Error,
    },
    #[error("current directory is not valid UTF-8")]
    CurrentDirInvalidUtf8 {
        #[source]
        err: FromPathBufError,
    },
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("fail list read error")]
    BaselineReadError {
        #[from]
        err: BaselineReadError,
    },
    #[error("fail list write error")]
    BaselineWriteError {
        #[from]
        err: BaselineWriteError,
    },
    #[error("test binary exec failed")]
    TestCommandError {
        #[from]
        err: TestCommandError,
    },
    #[error("test binary wait failed")]
    TestProcessWaitFailed {
        command: String,
        #[source]
        err: std::io::Error,
    },
    #[error("result stream corrupted")]
    ResultStreamCorrupted {
        #[from]
        err: ResultStreamError,
    },
    #[error("tests were skipped")]
    SkippedTests { count: usize },
    #[error("unexpected test results")]
    UnexpectedResults { count: usize },
    #[error("error writing output")]
    WriteOutputError {
        #[source]
        err: std::io::Error,
    },
}

impl ExpectedError {
    pub(crate) fn test_process_wait_failed(command: String, err: std::io::Error) -> Self {
        Self::TestProcessWaitFailed { command, err }
    }

    pub(crate) fn write_output_error(err: std::io::Error) -> Self {
        Self::WriteOutputError { err }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::CurrentDirFailed { .. }
            | Self::CurrentDirInvalidUtf8 { .. }
            | Self::ConfigParseError { .. }
            | Self::BaselineReadError { .. }
            | Self::BaselineWriteError { .. }
            | Self::TestCommandError { .. }
            | Self::TestProcessWaitFailed { .. }
            | Self::ResultStreamCorrupted { .. }
            | Self::SkippedTests { .. }
            | Self::UnexpectedResults { .. }
            | Self::WriteOutputError { .. } => GateExitCode::GATE_FAILED,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::CurrentDirFailed { err } => {
                error!("could not determine current directory");
                Some(err as &dyn Error)
            }
            Self::CurrentDirInvalidUtf8 { err } => {
                error!(
                    "current directory `{}` is not valid UTF-8",
                    err.as_path().display().style(styles.bold)
                );
                None
            }
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse xfail-gate config at `{}`",
                    err.config_file().style(styles.bold)
                );
                err.source()
            }
            Self::BaselineReadError { err } => {
                if err.is_not_found() {
                    error!(
                        "fail list `{}` does not exist\n(hint: create it, or pass --fail-list)",
                        err.path().style(styles.bold)
                    );
                } else {
                    error!("failed to read fail list `{}`", err.path().style(styles.bold));
                }
                err.source()
            }
            Self::BaselineWriteError { err } => {
                error!(
                    "failed to write fail list `{}`",
                    err.path().style(styles.bold)
                );
                err.source()
            }
            Self::TestCommandError { err } => {
                error!("failed to execute `{}`", err.command().style(styles.bold));
                err.source()
            }
            Self::TestProcessWaitFailed { command, err } => {
                error!(
                    "failed to wait for `{}` to exit",
                    command.style(styles.bold)
                );
                Some(err as &dyn Error)
            }
            Self::ResultStreamCorrupted { err } => {
                let crashed = matches!(
                    err.kind(),
                    ResultStreamErrorKind::UnexpectedEof { .. } | ResultStreamErrorKind::Xml(_)
                );
                match err.in_progress() {
                    Some(name) if crashed => {
                        error!(
                            "result stream ended abruptly during test `{}`: \
                             that probably means the test crashed",
                            name.style(styles.bold)
                        );
                    }
                    Some(name) => {
                        error!(
                            "result stream is malformed in test `{}`",
                            name.style(styles.bold)
                        );
                    }
                    None => {
                        error!("result stream is malformed");
                    }
                }
                Some(err.kind() as &dyn Error)
            }
            Self::SkippedTests { count } => {
                error!(
                    "{} test(s) were skipped! {}",
                    count.style(styles.bold),
                    "That probably means that a test crashed the runner"
                        .style(styles.warning_text)
                );
                None
            }
            Self::UnexpectedResults { count } => {
                error!(
                    "{} test(s) did not match the fail list",
                    count.style(styles.bold)
                );
                None
            }
            Self::WriteOutputError { err } => {
                error!("error writing output");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
